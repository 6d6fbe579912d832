//! Example: Re-emit a document with different pads and templates.
//!
//! Run with: cargo run --example pretty_print

use jot_core::Document;

fn main() {
    let input = br#"{"pi":3.14159,"answer":42,"label":"text","inner":{"list":[1,2,3],"none":{}}}"#;

    let mut doc = Document::new();
    doc.parse(input).expect("parse failed");

    println!("compact:\n{}\n", doc.root().expect("root").to_json(""));
    println!("two spaces:\n{}\n", doc.root().expect("root").to_json("  "));
    println!("tab pad:\n{}\n", doc.root().expect("root").to_json("\t"));

    // per-document templates: two float decimals, zero-padded integers
    doc.formats_mut().set_float_format("%.2f").expect("template");
    doc.formats_mut().set_int_format("%04d").expect("template");
    println!("custom templates:\n{}", doc.root().expect("root").to_json("  "));
}
