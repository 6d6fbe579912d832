//! Example: Parse a document and read values out of the tree.
//!
//! Run with: cargo run --example simple_parse

use jot_core::Document;

fn main() {
    let input = br#"{
        "name": "jot",
        "version": 4,
        "precise": false,
        "tags": ["json", "tree", "writer"]
    }"#;

    let mut doc = Document::new();
    let root = match doc.parse(input) {
        Ok(root) => root,
        Err(err) => {
            eprintln!("parse failed: {err}");
            return;
        }
    };

    println!("name:    {:?}", root.member("name").and_then(|n| n.as_str()));
    println!("version: {:?}", root.member("version").and_then(|n| n.as_i32()));
    println!("precise: {:?}", root.member("precise").and_then(|n| n.as_bool()));

    if let Some(tags) = root.member("tags") {
        println!("tags ({}):", tags.child_count());
        for tag in tags.children() {
            println!("  - {}", tag.as_str().unwrap_or("?"));
        }
    }
}
