//! Tokens of a PBN document.
//!
//! One token is produced per syntactic unit of the input: a blank line, a
//! free text line, a commentary, an escaped `%` line, a tag pair or a table
//! tag with its rows. Every token renders itself back to PBN text through
//! [`fmt::Display`].

mod table;
mod tag;

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::version::PbnVersion;

pub use table::{parse_columns, ColumnAlignment, ColumnInfo, ColumnOrdering, TableTag};
pub use tag::{create_table_tag, create_tag, is_table_tag, Tag};

pub const ESCAPE_SEQUENCE: char = '%';
pub const SINGLELINE_COMMENT_START: char = ';';
pub const MULTILINE_COMMENT_START: char = '{';
pub const MULTILINE_COMMENT_END: char = '}';

const EXPORT_LINE: &str = " EXPORT";
const VERSION_PREFIX: &str = " PBN ";

static VERSION_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d\.\d$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentaryFormat {
    /// `;` to the end of the line.
    Singleline,
    /// Delimited by braces, may span lines.
    Multiline,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commentary {
    pub format: CommentaryFormat,
    /// False when the commentary follows another token on the same line.
    pub starts_on_new_line: bool,
    pub content: String,
}

impl Commentary {
    pub fn singleline(content: impl Into<String>) -> Self {
        Commentary {
            format: CommentaryFormat::Singleline,
            starts_on_new_line: true,
            content: content.into(),
        }
    }

    pub fn multiline(content: impl Into<String>) -> Self {
        Commentary {
            format: CommentaryFormat::Multiline,
            starts_on_new_line: true,
            content: content.into(),
        }
    }
}

impl fmt::Display for Commentary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.format {
            CommentaryFormat::Singleline => write!(f, "{SINGLELINE_COMMENT_START}{}", self.content),
            CommentaryFormat::Multiline => write!(
                f,
                "{MULTILINE_COMMENT_START}{}{MULTILINE_COMMENT_END}",
                self.content
            ),
        }
    }
}

/// A line starting with `%`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EscapedLine {
    /// `% PBN 2.1`
    Version(String),
    /// `% EXPORT`
    Export,
    /// Anything else, kept verbatim (without the leading `%`).
    Custom(String),
}

impl EscapedLine {
    /// Classify the text following the `%`.
    pub fn from_content(content: &str) -> Self {
        if content == EXPORT_LINE {
            return EscapedLine::Export;
        }
        if let Some(version) = content.strip_prefix(VERSION_PREFIX) {
            if VERSION_REGEX.is_match(version) {
                return EscapedLine::Version(version.to_string());
            }
        }
        EscapedLine::Custom(content.to_string())
    }

    /// Version and export lines are directives; custom lines are not.
    pub fn is_directive(&self) -> bool {
        matches!(self, EscapedLine::Version(_) | EscapedLine::Export)
    }

    pub fn version(&self) -> Option<PbnVersion> {
        match self {
            EscapedLine::Version(v) => Some(PbnVersion::from_version_string(v)),
            _ => None,
        }
    }
}

impl fmt::Display for EscapedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EscapedLine::Version(v) => write!(f, "{ESCAPE_SEQUENCE}{VERSION_PREFIX}{v}"),
            EscapedLine::Export => write!(f, "{ESCAPE_SEQUENCE}{EXPORT_LINE}"),
            EscapedLine::Custom(content) => write!(f, "{ESCAPE_SEQUENCE}{content}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    EmptyLine,
    TextLine(String),
    Commentary(Commentary),
    Escaped(EscapedLine),
    Tag(Tag),
    TableTag(TableTag),
}

impl Token {
    /// Name of a tag or table tag.
    pub fn tag_name(&self) -> Option<&str> {
        match self {
            Token::Tag(tag) => Some(tag.name()),
            Token::TableTag(table) => Some(table.name()),
            _ => None,
        }
    }

    /// Value of a tag or table tag (the column spec for tables).
    pub fn tag_value(&self) -> Option<&str> {
        match self {
            Token::Tag(tag) => Some(tag.value()),
            Token::TableTag(table) => Some(table.value()),
            _ => None,
        }
    }

    /// Name of the tag if it takes part in board context tracking.
    pub fn board_scope_name(&self) -> Option<&str> {
        self.tag_name().filter(|name| crate::tags::is_board_scope(name))
    }

    pub fn is_directive(&self) -> bool {
        matches!(self, Token::Escaped(line) if line.is_directive())
    }

    pub fn as_tag(&self) -> Option<&Tag> {
        match self {
            Token::Tag(tag) => Some(tag),
            _ => None,
        }
    }

    /// Short human readable kind, for listings and logs.
    pub fn type_name(&self) -> &'static str {
        match self {
            Token::EmptyLine => "Empty Line",
            Token::TextLine(_) => "Text Line",
            Token::Commentary(_) => "Commentary",
            Token::Escaped(EscapedLine::Version(_)) => "Version Directive",
            Token::Escaped(EscapedLine::Export) => "Export Directive",
            Token::Escaped(EscapedLine::Custom(_)) => "Escaped Line",
            Token::Tag(_) => "Tag",
            Token::TableTag(_) => "Table Tag",
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::EmptyLine => Ok(()),
            Token::TextLine(text) => f.write_str(text),
            Token::Commentary(commentary) => write!(f, "{commentary}"),
            Token::Escaped(line) => write!(f, "{line}"),
            Token::Tag(tag) => write!(f, "{tag}"),
            Token::TableTag(table) => write!(f, "{table}"),
        }
    }
}

impl From<Tag> for Token {
    fn from(tag: Tag) -> Self {
        Token::Tag(tag)
    }
}

impl From<TableTag> for Token {
    fn from(table: TableTag) -> Self {
        Token::TableTag(table)
    }
}

impl From<Commentary> for Token {
    fn from(commentary: Commentary) -> Self {
        Token::Commentary(commentary)
    }
}

impl From<EscapedLine> for Token {
    fn from(line: EscapedLine) -> Self {
        Token::Escaped(line)
    }
}
