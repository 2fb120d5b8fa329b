//! Editable PBN documents.
//!
//! This crate reads Portable Bridge Notation into a [`Document`] that can be
//! queried and edited board by board, and writes it back:
//! - **Tokens** - every blank line, comment, `%` line, tag and table survives a
//!   read/write round trip
//! - **Board contexts** - tokens are grouped per deal and kept grouped while
//!   tokens are inserted, replaced and deleted
//! - **Manipulators** - stripping, removing and renumbering boards, attaching
//!   double dummy analysis
//!
//! # Example
//!
//! ```
//! use pbn_document::{read_document, write_document};
//!
//! let pbn_content = r#"% PBN 2.1
//! [Board "1"]
//! [Dealer "N"]
//! [Vulnerable "None"]
//! [Deal "N:K843.T542.J6.863 AQJ7.K.Q75.AT942 962.AJ7.KT82.J75 T5.Q9863.A943.KQ"]
//! "#;
//!
//! let mut document = read_document(pbn_content).unwrap();
//! assert_eq!(document.contexts().len(), 1);
//!
//! let board = document.get_board(1).unwrap().as_board().unwrap();
//! assert_eq!(board.number, Some(1));
//!
//! document.delete_at(0).unwrap();
//! assert!(!write_document(&document).contains("% PBN"));
//! ```

pub mod document;
mod error;
pub mod manipulators;
pub mod reader;
pub mod tags;
pub mod token;
mod version;
pub mod writer;

pub use document::{BoardContext, BoardView, ContextId, Document, TokenId, TokenRange};
pub use error::{ErrorKind, PbnError, Result};
pub use reader::{read_document, read_document_file, PbnReader, ReaderOptions, RecoveryMode};
pub use token::{Commentary, CommentaryFormat, EscapedLine, TableTag, Tag, Token};
pub use version::PbnVersion;
pub use writer::{output_path, serialize, write_document, write_document_file};

// Re-export bridge-types for convenience
pub use bridge_types::{Board, Deal, Direction, Vulnerability};
