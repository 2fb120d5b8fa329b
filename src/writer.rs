//! PBN document writer.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::document::Document;
use crate::error::Result;
use crate::token::{Commentary, CommentaryFormat, Token};

/// Extension given to output files that have none.
pub const DEFAULT_EXTENSION: &str = "pbn";

/// A multiline commentary that continues the line of the token before it.
/// Only a tag or another multiline commentary can be followed on the same
/// line; any other line would absorb the commentary when read back.
fn continues_line(previous: &Token, token: &Token) -> bool {
    let inline = matches!(
        token,
        Token::Commentary(Commentary {
            format: CommentaryFormat::Multiline,
            starts_on_new_line: false,
            ..
        })
    );
    inline
        && matches!(
            previous,
            Token::Tag(_)
                | Token::Commentary(Commentary {
                    format: CommentaryFormat::Multiline,
                    ..
                })
        )
}

/// Each token goes on its own line, except commentaries flagged as following
/// another token on the same line.
impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut previous: Option<&Token> = None;
        for token in self.tokens() {
            if let Some(previous) = previous {
                if continues_line(previous, token) {
                    f.write_str(" ")?;
                } else {
                    f.write_str("\n")?;
                }
            }
            write!(f, "{token}")?;
            previous = Some(token);
        }
        if previous.is_some() {
            f.write_str("\n")?;
        }
        Ok(())
    }
}

/// Write a document to PBN text
pub fn write_document(document: &Document) -> String {
    document.to_string()
}

/// Write a document to any output stream
pub fn serialize<W: io::Write>(document: &Document, mut writer: W) -> Result<()> {
    write!(writer, "{document}")?;
    writer.flush()?;
    Ok(())
}

/// Path a document is written to: `path` itself, or with `.pbn` appended when
/// it has no extension.
pub fn output_path(path: &Path) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension(DEFAULT_EXTENSION)
    }
}

/// Write a document to a file. Returns the path actually written.
pub fn write_document_file(document: &Document, path: &Path) -> Result<PathBuf> {
    let path = output_path(path);
    std::fs::write(&path, write_document(document))?;
    tracing::debug!(path = %path.display(), tokens = document.len(), "wrote PBN document");
    Ok(path)
}
