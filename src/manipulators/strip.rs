//! Tag stripping.

use crate::document::Document;
use crate::error::Result;
use crate::tags;
use crate::token::Token;

/// Tags kept by [`Stripper::default`].
pub const DEFAULT_ALLOWED_TAGS: [&str; 9] = [
    "Generator",
    tags::BOARD,
    tags::DEALER,
    tags::VULNERABLE,
    tags::DEAL,
    "Ability",
    "Minimax",
    tags::OPTIMUM_SCORE,
    tags::OPTIMUM_RESULT_TABLE,
];

/// Removes every token except directives and allowed tags.
#[derive(Debug, Clone)]
pub struct Stripper {
    allowed_tags: Vec<String>,
}

impl Default for Stripper {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWED_TAGS)
    }
}

impl Stripper {
    pub fn new<I, S>(allowed_tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Stripper {
            allowed_tags: allowed_tags.into_iter().map(Into::into).collect(),
        }
    }

    pub fn allowed_tags(&self) -> &[String] {
        &self.allowed_tags
    }

    fn keeps(&self, token: &Token) -> bool {
        token.is_directive()
            || token
                .tag_name()
                .is_some_and(|name| self.allowed_tags.iter().any(|allowed| allowed == name))
    }

    /// Strip a document in place. Returns the number of removed tokens.
    pub fn strip(&self, document: &mut Document) -> Result<usize> {
        let mut removed = 0;
        let mut index = 0;
        while index < document.len() {
            if document.token(index).is_some_and(|token| self.keeps(token)) {
                index += 1;
            } else {
                document.delete_at(index)?;
                removed += 1;
            }
        }

        tracing::info!(removed, remaining = document.len(), "stripped document");
        Ok(removed)
    }
}
