//! Streaming PBN tokenizer.
//!
//! Reads tokens from any `BufRead` source. A physical line may hold several
//! tokens (`[Board "1"] {note}`), and a token may span several lines
//! (multi-line commentary, table rows), so the reader keeps the unconsumed
//! rest of the current line between tokens and pulls more lines on demand.
//!
//! # Example
//!
//! ```
//! use pbn_document::{PbnReader, Token};
//! use std::io::Cursor;
//!
//! let input = "% PBN 2.1\n[Board \"1\"] ; first board\n";
//! let tokens: Vec<Token> = PbnReader::new(Cursor::new(input))
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(tokens.len(), 3);
//! ```

use std::io::{BufRead, Cursor};
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::document::Document;
use crate::error::{PbnError, Result};
use crate::token::{
    create_table_tag, create_tag, is_table_tag, Commentary, CommentaryFormat, EscapedLine, Token,
    ESCAPE_SEQUENCE, MULTILINE_COMMENT_END, MULTILINE_COMMENT_START, SINGLELINE_COMMENT_START,
};

static TAG_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^\s*\[\s*(\w+)\s*"(.*)"\s*\]\s*"#).unwrap());

/// What to do when the input is malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecoveryMode {
    /// Abort on the first error.
    #[default]
    Strict,
    /// Skip to the next tag and continue. Not implemented.
    SkipToNextTag,
    /// Skip to the next board and continue. Not implemented.
    SkipToNextBoard,
}

#[derive(Debug, Clone, Default)]
pub struct ReaderOptions {
    pub recovery: RecoveryMode,
}

/// Reads PBN tokens from a text source (file, stdin, network stream, etc.).
pub struct PbnReader<R: BufRead> {
    reader: R,
    line_buf: String,
    line_number: usize,
    /// Unconsumed rest of the current line, if any.
    pending: Option<String>,
    failed: bool,
}

impl<R: BufRead> PbnReader<R> {
    /// Create a strict reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_buf: String::new(),
            line_number: 0,
            pending: None,
            failed: false,
        }
    }

    /// Create a reader with explicit options. Only strict recovery is supported.
    pub fn with_options(reader: R, options: &ReaderOptions) -> Result<Self> {
        if options.recovery != RecoveryMode::Strict {
            return Err(PbnError::Unsupported(format!(
                "{:?} recovery mode, only strict parsing is supported",
                options.recovery
            )));
        }
        Ok(Self::new(reader))
    }

    /// Number of lines read so far.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Read one line without its terminator. Returns `None` at EOF.
    fn read_line(&mut self) -> Result<Option<String>> {
        self.line_buf.clear();
        if self.reader.read_line(&mut self.line_buf)? == 0 {
            return Ok(None);
        }
        self.line_number += 1;
        let line = self.line_buf.trim_end_matches(['\n', '\r']);
        Ok(Some(line.to_string()))
    }

    /// Parse one token from the front of `line`, leaving the rest of the line
    /// in place (empty once everything is consumed). May read further lines.
    ///
    /// `first_on_line` tells whether `line` is a fresh physical line.
    pub fn parse_token(&mut self, line: &mut String, first_on_line: bool) -> Result<Token> {
        let trimmed = line.trim_start();
        if trimmed.len() != line.len() {
            *line = trimmed.to_string();
        }

        let Some(first) = line.chars().next() else {
            return Ok(Token::EmptyLine);
        };

        let token = match first {
            ESCAPE_SEQUENCE => {
                let token = Token::Escaped(EscapedLine::from_content(&line[1..]));
                line.clear();
                token
            }
            '[' => self.parse_tag(line)?,
            SINGLELINE_COMMENT_START => {
                let token = Token::Commentary(Commentary::singleline(&line[1..]));
                line.clear();
                token
            }
            MULTILINE_COMMENT_START => self.parse_multiline_comment(line, first_on_line)?,
            _ => Token::TextLine(std::mem::take(line)),
        };

        tracing::trace!(line = self.line_number, kind = token.type_name(), "token");
        Ok(token)
    }

    fn parse_tag(&mut self, line: &mut String) -> Result<Token> {
        let line_number = self.line_number;
        let Some(captures) = TAG_REGEX.captures(line) else {
            return Err(PbnError::InvalidTag {
                line: line_number,
                text: line.clone(),
            });
        };

        let consumed = captures.get(0).map_or(0, |m| m.end());
        let name = captures[1].to_string();
        let value = captures[2].to_string();
        *line = line[consumed..].to_string();

        let token = if is_table_tag(&name) {
            let values = self.read_table_values(line)?;
            Token::TableTag(
                create_table_tag(&name, &value, values).map_err(|e| e.at_line(line_number))?,
            )
        } else {
            Token::Tag(create_tag(&name, &value))
        };

        if line.trim().is_empty() {
            line.clear();
        }
        Ok(token)
    }

    /// Collect whitespace separated cells until a tag line, an empty line or a
    /// `;` comment line. The stopping line is left in `line`.
    fn read_table_values(&mut self, line: &mut String) -> Result<Vec<String>> {
        let mut values = Vec::new();

        if line.trim().is_empty() {
            match self.read_line()? {
                Some(next) => *line = next.trim().to_string(),
                None => {
                    line.clear();
                    return Ok(values);
                }
            }
        }

        loop {
            let current = line.trim_start();
            if current.is_empty()
                || current.starts_with('[')
                || current.starts_with(SINGLELINE_COMMENT_START)
            {
                break;
            }
            values.extend(current.split_whitespace().map(str::to_string));

            match self.read_line()? {
                Some(next) => *line = next.trim().to_string(),
                None => {
                    line.clear();
                    break;
                }
            }
        }

        Ok(values)
    }

    fn parse_multiline_comment(&mut self, line: &mut String, first_on_line: bool) -> Result<Token> {
        let start_line = self.line_number;
        let mut rest = line[MULTILINE_COMMENT_START.len_utf8()..].to_string();
        let mut content = String::new();

        loop {
            if let Some(end) = rest.find(MULTILINE_COMMENT_END) {
                content.push_str(&rest[..end]);
                *line = rest[end + MULTILINE_COMMENT_END.len_utf8()..].to_string();
                break;
            }
            content.push_str(&rest);
            content.push('\n');
            rest = self
                .read_line()?
                .ok_or(PbnError::UnterminatedComment { line: start_line })?;
        }

        if line.trim().is_empty() {
            line.clear();
        }

        Ok(Token::Commentary(Commentary {
            format: CommentaryFormat::Multiline,
            starts_on_new_line: first_on_line,
            content,
        }))
    }

    /// Tokenize the whole input into a document. Fails on the first error.
    pub fn parse(self) -> Result<Document> {
        let mut document = Document::new();
        for token in self {
            document.append(token?);
        }
        tracing::debug!(
            tokens = document.len(),
            boards = document.contexts().len(),
            "parsed PBN document"
        );
        Ok(document)
    }
}

impl<R: BufRead> Iterator for PbnReader<R> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let (mut line, first_on_line) = match self.pending.take() {
            Some(rest) => (rest, false),
            None => match self.read_line() {
                Ok(Some(line)) => (line, true),
                Ok(None) => return None,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            },
        };

        let result = self.parse_token(&mut line, first_on_line);
        match &result {
            Ok(_) if !line.is_empty() => self.pending = Some(line),
            Ok(_) => {}
            Err(_) => self.failed = true,
        }
        Some(result)
    }
}

/// Parse a PBN document from a string.
pub fn read_document(content: &str) -> Result<Document> {
    PbnReader::new(Cursor::new(content)).parse()
}

/// Parse a PBN document from a file.
pub fn read_document_file(path: &Path) -> Result<Document> {
    let content = std::fs::read_to_string(path)?;
    read_document(&content)
}
