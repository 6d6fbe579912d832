//! Example: Parse stdin and report the outcome.
//!
//! Run with: echo '{"a": [1, 2]}' | cargo run --example stdin_parse

use std::io;

use jot_core::Document;

fn main() {
    let mut doc = Document::new();
    match doc.parse_reader(io::stdin().lock()) {
        Ok(root) => {
            println!("parsed {} members", root.child_count());
            println!("{}", root.to_json("  "));
        }
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}
