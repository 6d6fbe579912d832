//! JOT Core Parser
//!
//! Tree-based parser and writer for a restricted JSON dialect: the top
//! level must be an object, numbers fit 32 bits, and `\u` escapes decode
//! to single bytes. A hand-written lexer feeds a recursive descent
//! parser that builds an index-addressed node arena; a configurable
//! writer emits the tree back as text.
//!
//! # Architecture
//!
//! - **lexer.rs** - symbol scanner with line/column tracking
//! - **parser.rs** - recursive descent over lexer symbols
//! - **tree.rs** - node arena, Document/Node/Cursor API
//! - **writer.rs** - format-controlled serialization, three sink kinds
//! - **span.rs** - source locations
//! - **error.rs** - error codes and error types
//!
//! # Example
//!
//! ```
//! use jot_core::Document;
//!
//! let mut doc = Document::new();
//! match doc.parse(br#"{"name": "jot", "stable": true}"#) {
//!     Ok(root) => {
//!         assert_eq!(root.member("name").and_then(|n| n.as_str()), Some("jot"));
//!         assert_eq!(root.to_json(""), r#"{"name":"jot","stable":true}"#);
//!     }
//!     Err(err) => eprintln!("parse failed: {err}"),
//! }
//! ```

pub mod error;
pub mod lexer;
mod parser;
pub mod span;
pub mod tree;
pub mod writer;

pub use error::{Error, ParseError, ParseErrorCode};
pub use lexer::{Lexer, Symbol};
pub use span::Location;
pub use tree::{Cursor, Document, Node, NodeId, NodeKind};
pub use writer::{BufferFull, FixedBuf, FormatError, WriterConfig};
