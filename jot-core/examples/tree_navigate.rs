//! Example: Walk a parsed tree with handles and cursors.
//!
//! Run with: cargo run --example tree_navigate

use jot_core::{Document, Node, NodeKind};

fn main() {
    let input = br#"{"library": {"books": [
        {"title": "one", "pages": 318},
        {"title": "two", "pages": 256}
    ], "open": true}}"#;

    let mut doc = Document::new();
    let root = doc.parse(input).expect("parse failed");

    println!("=== Recursive walk ===\n");
    print_node(root, 0);

    println!("\n=== Cursor walk, back to front ===\n");
    if let Some(books) = root.member("library").and_then(|l| l.member("books")) {
        let mut cursor = books.back();
        while let Some(book) = cursor.get() {
            let title = book.member("title").and_then(|n| n.as_str());
            println!("book: {}", title.unwrap_or("untitled"));
            cursor.retreat();
        }
    }
}

fn print_node(node: Node<'_>, depth: usize) {
    let indent = "  ".repeat(depth);
    let label = match node.name() {
        Some(name) => format!("{name}: "),
        None => String::new(),
    };

    match node.kind() {
        NodeKind::Null => println!("{indent}{label}null"),
        NodeKind::Bool(value) => println!("{indent}{label}{value}"),
        NodeKind::Int(value) => println!("{indent}{label}{value}"),
        NodeKind::Float(value) => println!("{indent}{label}{value}"),
        NodeKind::Str(value) => println!("{indent}{label}{value:?}"),
        NodeKind::Array | NodeKind::Object => {
            println!("{indent}{label}{}", node.kind().type_name());
            for child in node.children() {
                print_node(child, depth + 1);
            }
        }
    }
}
