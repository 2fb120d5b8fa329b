//! Editable PBN document.
//!
//! A [`Document`] owns the token sequence and the ordered list of
//! [`BoardContext`]s that group tokens by board. Contexts are derived from
//! board-scope tags as tokens are appended, and kept consistent by every
//! structural edit (insert, replace, delete).
//!
//! Each token slot records the context that owns it. Only board-scope tags are
//! owned; other tokens may sit inside a context's range without belonging to
//! it. A context that no longer owns any token is dropped.

use std::collections::HashMap;
use std::fmt;

use bridge_types::Board;

use crate::error::{PbnError, Result};
use crate::tags;
use crate::token::{EscapedLine, Tag, Token};
use crate::version::PbnVersion;

/// Identifies a board context for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(u32);

impl ContextId {
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifies a token while it is part of a document, wherever it moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenId(u64);

/// Inclusive range of token indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenRange {
    pub start: usize,
    pub end: usize,
}

impl TokenRange {
    fn single(index: usize) -> Self {
        TokenRange {
            start: index,
            end: index,
        }
    }

    /// Number of tokens covered. Never zero.
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn contains(&self, index: usize) -> bool {
        self.start <= index && index <= self.end
    }
}

/// The tokens describing one deal.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardContext {
    id: ContextId,
    range: TokenRange,
    board_number: Option<u32>,
    /// Owned tags by name, in the order they were attached.
    tags: HashMap<String, Vec<TokenId>>,
}

impl BoardContext {
    fn new(id: ContextId, range: TokenRange) -> Self {
        BoardContext {
            id,
            range,
            board_number: None,
            tags: HashMap::new(),
        }
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn range(&self) -> TokenRange {
        self.range
    }

    /// Number from the context's `Board` tag, if it has a valid one.
    pub fn board_number(&self) -> Option<u32> {
        self.board_number
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.contains_key(name)
    }

    /// Names of the board-scope tags this context owns.
    pub fn tag_names(&self) -> impl Iterator<Item = &str> {
        self.tags.keys().map(String::as_str)
    }

    /// Non-tags and inert tags are always accepted; a board-scope tag only if
    /// the context holds no tag of that name yet.
    pub fn accepts(&self, token: &Token) -> bool {
        token
            .board_scope_name()
            .map_or(true, |name| self.accepts_tag_name(name))
    }

    fn accepts_tag_name(&self, name: &str) -> bool {
        !self.tags.contains_key(name)
    }

    fn accepts_tag_name_replacing(&self, name: &str, replaced: TokenId) -> bool {
        self.tags
            .get(name)
            .map_or(true, |ids| ids.iter().all(|id| *id == replaced))
    }

    fn owns_nothing(&self) -> bool {
        self.tags.is_empty()
    }

    fn apply(&mut self, id: TokenId, token: &Token) {
        let Some(name) = token.board_scope_name() else {
            return;
        };
        self.tags.entry(name.to_string()).or_default().push(id);

        if let Some(number) = token.as_tag().and_then(Tag::board_number) {
            if self.board_number.is_none() {
                self.board_number = number.ok();
            }
        }
    }

    fn unapply(&mut self, id: TokenId, token: &Token) {
        let Some(name) = token.board_scope_name() else {
            return;
        };
        if let Some(ids) = self.tags.get_mut(name) {
            ids.retain(|owned| *owned != id);
            if ids.is_empty() {
                self.tags.remove(name);
            }
        }
        if name == tags::BOARD {
            self.board_number = None;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Slot {
    id: TokenId,
    owner: Option<ContextId>,
    token: Token,
}

/// Where a token lands when it is inserted or replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    Unowned,
    /// Attach to the context at this position of the context list.
    Existing(usize),
    /// Start a new context, inserted at this position of the context list.
    New(usize),
}

/// An ordered sequence of PBN tokens grouped into board contexts.
#[derive(Debug, Clone, Default)]
pub struct Document {
    slots: Vec<Slot>,
    contexts: Vec<BoardContext>,
    next_token_id: u64,
    next_context_id: u32,
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.slots == other.slots && self.contexts == other.contexts
    }
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.slots.iter().map(|slot| &slot.token)
    }

    pub fn token(&self, index: usize) -> Option<&Token> {
        self.slots.get(index).map(|slot| &slot.token)
    }

    pub fn token_id(&self, index: usize) -> Option<TokenId> {
        self.slots.get(index).map(|slot| slot.id)
    }

    /// Current index of a token.
    pub fn position(&self, id: TokenId) -> Option<usize> {
        self.slots.iter().position(|slot| slot.id == id)
    }

    /// Context owning the token at `index`, if any.
    pub fn owner(&self, index: usize) -> Option<ContextId> {
        self.slots.get(index).and_then(|slot| slot.owner)
    }

    /// All contexts in file order.
    pub fn contexts(&self) -> &[BoardContext] {
        &self.contexts
    }

    pub fn boards(&self) -> impl Iterator<Item = BoardView<'_>> {
        self.contexts.iter().map(move |context| BoardView {
            document: self,
            context,
        })
    }

    pub fn board(&self, id: ContextId) -> Option<BoardView<'_>> {
        self.contexts
            .iter()
            .find(|context| context.id == id)
            .map(|context| BoardView {
                document: self,
                context,
            })
    }

    /// First board with the given number.
    pub fn get_board(&self, number: u32) -> Option<BoardView<'_>> {
        self.boards()
            .find(|board| board.board_number() == Some(number))
    }

    pub fn has_board_with_number(&self, number: u32) -> bool {
        self.contexts
            .iter()
            .any(|context| context.board_number == Some(number))
    }

    /// Version from the first version directive.
    pub fn version(&self) -> PbnVersion {
        self.tokens()
            .find_map(|token| match token {
                Token::Escaped(line) => line.version(),
                _ => None,
            })
            .unwrap_or_default()
    }

    /// True if the document carries the `% EXPORT` directive.
    pub fn is_export_format(&self) -> bool {
        self.tokens()
            .any(|token| matches!(token, Token::Escaped(EscapedLine::Export)))
    }

    fn fresh_token_id(&mut self) -> TokenId {
        let id = TokenId(self.next_token_id);
        self.next_token_id += 1;
        id
    }

    fn new_context(&mut self, range: TokenRange) -> BoardContext {
        let id = ContextId(self.next_context_id);
        self.next_context_id += 1;
        tracing::debug!(context = %id, start = range.start, "new board context");
        BoardContext::new(id, range)
    }

    fn context_position(&self, id: ContextId) -> Option<usize> {
        self.contexts.iter().position(|context| context.id == id)
    }

    fn drop_empty_contexts(&mut self) {
        self.contexts.retain(|context| {
            let keep = !context.owns_nothing();
            if !keep {
                tracing::debug!(context = %context.id, "board context dropped");
            }
            keep
        });
    }

    /// Add a token at the end.
    ///
    /// A board-scope tag joins the last context if it accepts it, which
    /// extends that context's range up to the new token; otherwise it starts a
    /// new context.
    pub fn append(&mut self, token: Token) -> TokenId {
        let index = self.slots.len();
        let id = self.fresh_token_id();

        let mut owner = None;
        if token.board_scope_name().is_some() {
            let joins_last = self
                .contexts
                .last()
                .is_some_and(|context| context.accepts(&token));
            if !joins_last {
                let context = self.new_context(TokenRange::single(index));
                self.contexts.push(context);
            }
            if let Some(context) = self.contexts.last_mut() {
                context.range.end = index;
                context.apply(id, &token);
                owner = Some(context.id);
            }
        }

        self.slots.push(Slot { id, owner, token });
        id
    }

    /// Resolve which context a board-scope tag joins at a boundary.
    ///
    /// `after` is the index just past a preceding context's last token,
    /// `before` is the start of a following context.
    fn boundary_placement(&self, after: usize, before: usize, name: &str) -> Placement {
        let preceding = self
            .contexts
            .iter()
            .position(|c| c.range.end + 1 == after && c.accepts_tag_name(name));
        if let Some(pos) = preceding {
            return Placement::Existing(pos);
        }

        let following = self
            .contexts
            .iter()
            .position(|c| c.range.start == before && c.accepts_tag_name(name));
        if let Some(pos) = following {
            return Placement::Existing(pos);
        }

        Placement::New(
            self.contexts
                .iter()
                .position(|c| c.range.start >= before)
                .unwrap_or(self.contexts.len()),
        )
    }

    fn split_unsupported(&self, pos: usize, name: &str) -> PbnError {
        PbnError::Unsupported(format!(
            "splitting board context {} to make room for a second {name} tag",
            self.contexts[pos].id
        ))
    }

    fn insert_placement(&self, at: usize, token: &Token) -> Result<Placement> {
        let Some(name) = token.board_scope_name() else {
            return Ok(Placement::Unowned);
        };

        let interior = self
            .contexts
            .iter()
            .position(|c| c.range.start < at && at <= c.range.end);
        if let Some(pos) = interior {
            if self.contexts[pos].accepts_tag_name(name) {
                return Ok(Placement::Existing(pos));
            }
            return Err(self.split_unsupported(pos, name));
        }

        Ok(self.boundary_placement(at, at, name))
    }

    /// Insert a token before index `at` (`at == len()` appends).
    ///
    /// Contexts after `at` shift right. A context whose range contains `at`,
    /// or ends just before it, grows to cover the new token unless the token
    /// is a board-scope tag that belongs elsewhere. Inserting a board-scope tag
    /// into the middle of a context that already holds one of that name is not
    /// supported.
    pub fn insert(&mut self, at: usize, token: Token) -> Result<TokenId> {
        if at > self.slots.len() {
            return Err(PbnError::IndexOutOfRange {
                index: at,
                len: self.slots.len(),
            });
        }

        let placement = self.insert_placement(at, &token)?;
        let id = self.fresh_token_id();

        for (pos, context) in self.contexts.iter_mut().enumerate() {
            let target = placement == Placement::Existing(pos);
            if context.range.start >= at {
                if !target {
                    context.range.start += 1;
                }
                context.range.end += 1;
            } else if at <= context.range.end + 1 && (target || placement == Placement::Unowned) {
                context.range.end += 1;
            }
        }

        let owner = match placement {
            Placement::Unowned => None,
            Placement::Existing(pos) => {
                let context = &mut self.contexts[pos];
                context.apply(id, &token);
                Some(context.id)
            }
            Placement::New(pos) => {
                let mut context = self.new_context(TokenRange::single(at));
                context.apply(id, &token);
                let context_id = context.id;
                self.contexts.insert(pos, context);
                Some(context_id)
            }
        };

        self.slots.insert(at, Slot { id, owner, token });
        Ok(id)
    }

    /// Insert a token at the start of a given context and attach it there.
    fn insert_owned(&mut self, pos: usize, token: Token) {
        let at = self.contexts[pos].range.start;
        let id = self.fresh_token_id();

        for (p, context) in self.contexts.iter_mut().enumerate() {
            if p == pos {
                context.range.end += 1;
            } else if context.range.start >= at {
                context.range.start += 1;
                context.range.end += 1;
            }
        }

        let context = &mut self.contexts[pos];
        context.apply(id, &token);
        let owner = Some(context.id);
        self.slots.insert(at, Slot { id, owner, token });
    }

    /// Replace the token at `at`, returning the old one.
    ///
    /// The old token is detached from its context and the new one attached to
    /// the same context. A set board number can not be changed this way.
    pub fn replace(&mut self, at: usize, token: Token) -> Result<Token> {
        let len = self.slots.len();
        let slot = self
            .slots
            .get(at)
            .ok_or(PbnError::IndexOutOfRange { index: at, len })?;
        let slot_id = slot.id;
        let old_owner = slot.owner.and_then(|id| self.context_position(id));

        if let Some(pos) = old_owner {
            let current = self.contexts[pos].board_number;
            if let (Some(current), Token::Tag(Tag::Board(_))) = (current, &slot.token) {
                let replacement = token.as_tag().and_then(Tag::board_number);
                if !matches!(replacement, Some(Ok(number)) if number == current) {
                    return Err(PbnError::BoardNumberImmutable(current));
                }
            }
        }

        let placement = match token.board_scope_name() {
            None => Placement::Unowned,
            Some(name) => {
                if let Some(pos) = old_owner {
                    if !self.contexts[pos].accepts_tag_name_replacing(name, slot_id) {
                        return Err(PbnError::DuplicateTag(name.to_string()));
                    }
                    Placement::Existing(pos)
                } else if let Some(pos) = self.contexts.iter().position(|c| c.range.contains(at)) {
                    if !self.contexts[pos].accepts_tag_name(name) {
                        return Err(self.split_unsupported(pos, name));
                    }
                    Placement::Existing(pos)
                } else {
                    self.boundary_placement(at, at + 1, name)
                }
            }
        };

        if let Some(pos) = old_owner {
            self.contexts[pos].unapply(slot_id, &self.slots[at].token);
        }

        let owner = match placement {
            Placement::Unowned => None,
            Placement::Existing(pos) => {
                let context = &mut self.contexts[pos];
                context.range.start = context.range.start.min(at);
                context.range.end = context.range.end.max(at);
                context.apply(slot_id, &token);
                Some(context.id)
            }
            Placement::New(pos) => {
                let mut context = self.new_context(TokenRange::single(at));
                context.apply(slot_id, &token);
                let context_id = context.id;
                self.contexts.insert(pos, context);
                Some(context_id)
            }
        };

        let slot = &mut self.slots[at];
        slot.owner = owner;
        let old = std::mem::replace(&mut slot.token, token);
        self.drop_empty_contexts();
        Ok(old)
    }

    /// Remove the token at `at`, returning it.
    ///
    /// Deleting a `Board` tag clears the board number of its context.
    pub fn delete_at(&mut self, at: usize) -> Result<Token> {
        if at >= self.slots.len() {
            return Err(PbnError::IndexOutOfRange {
                index: at,
                len: self.slots.len(),
            });
        }

        let slot = self.slots.remove(at);
        for context in &mut self.contexts {
            if context.range.start > at {
                context.range.start -= 1;
                context.range.end -= 1;
            } else if at <= context.range.end {
                // A one-token context loses its only owned token and is dropped below.
                if context.range.end > context.range.start {
                    context.range.end -= 1;
                }
                if slot.owner == Some(context.id) {
                    context.unapply(slot.id, &slot.token);
                }
            }
        }

        self.drop_empty_contexts();
        Ok(slot.token)
    }

    /// Remove a token by identity.
    pub fn delete_token(&mut self, id: TokenId) -> Result<Token> {
        let at = self.position(id).ok_or(PbnError::TokenNotFound)?;
        self.delete_at(at)
    }

    /// Replace a token by identity, returning the old one.
    pub fn replace_token(&mut self, id: TokenId, token: Token) -> Result<Token> {
        let at = self.position(id).ok_or(PbnError::TokenNotFound)?;
        self.replace(at, token)
    }

    /// Delete every token in a context's range, removing the board.
    /// Returns the number of tokens removed.
    pub fn remove_context(&mut self, id: ContextId) -> Result<usize> {
        let pos = self
            .context_position(id)
            .ok_or(PbnError::ContextNotFound(id.0))?;
        let range = self.contexts[pos].range;
        for index in (range.start..=range.end).rev() {
            self.delete_at(index)?;
        }
        tracing::debug!(context = %id, tokens = range.len(), "board context removed");
        Ok(range.len())
    }

    /// Give one board a new number. See [`Document::set_board_numbers`].
    pub fn set_board_number(&mut self, id: ContextId, number: u32) -> Result<()> {
        self.set_board_numbers(&[(id, number)])
    }

    /// Renumber boards in one edit.
    ///
    /// Fails without changing anything if a resulting number would be shared
    /// with another board. Contexts without a `Board` tag get one at their start.
    pub fn set_board_numbers(&mut self, assignments: &[(ContextId, u32)]) -> Result<()> {
        let positions = assignments
            .iter()
            .map(|(id, _)| {
                self.context_position(*id)
                    .ok_or(PbnError::ContextNotFound(id.0))
            })
            .collect::<Result<Vec<_>>>()?;

        let resulting = |context: &BoardContext| {
            assignments
                .iter()
                .rev()
                .find(|(id, _)| *id == context.id)
                .map(|(_, number)| *number)
                .or(context.board_number)
        };
        for (id, number) in assignments {
            let clash = self
                .contexts
                .iter()
                .any(|context| context.id != *id && resulting(context) == Some(*number));
            if clash {
                return Err(PbnError::DuplicateBoardNumber(*number));
            }
        }

        for (pos, (_, number)) in positions.into_iter().zip(assignments) {
            self.write_board_number(pos, *number);
        }
        Ok(())
    }

    fn write_board_number(&mut self, pos: usize, number: u32) {
        let token = Token::Tag(Tag::board(number));
        let existing = self.contexts[pos]
            .tags
            .get(tags::BOARD)
            .and_then(|ids| ids.first())
            .copied();

        match existing.and_then(|id| self.position(id).map(|index| (id, index))) {
            Some((id, index)) => {
                let context = &mut self.contexts[pos];
                context.unapply(id, &self.slots[index].token);
                context.apply(id, &token);
                self.slots[index].token = token;
            }
            None => self.insert_owned(pos, token),
        }
    }

    /// Verify the context bookkeeping against the tokens.
    pub fn check_consistency(&self) -> Result<()> {
        let fail = |msg: String| Err(PbnError::Inconsistent(msg));

        for pair in self.contexts.windows(2) {
            if pair[0].range.end >= pair[1].range.start {
                return fail(format!(
                    "contexts {} and {} overlap or are out of order",
                    pair[0].id, pair[1].id
                ));
            }
        }

        for context in &self.contexts {
            if context.range.start > context.range.end || context.range.end >= self.slots.len() {
                return fail(format!("context {} has an invalid range", context.id));
            }
            if context.owns_nothing() {
                return fail(format!("context {} owns no tokens", context.id));
            }
            for (name, ids) in &context.tags {
                if ids.len() != 1 {
                    return fail(format!("context {} holds {} {name} tags", context.id, ids.len()));
                }
                for id in ids {
                    let owned = self
                        .position(*id)
                        .is_some_and(|index| self.slots[index].owner == Some(context.id));
                    if !owned {
                        return fail(format!("context {} indexes a token it does not own", context.id));
                    }
                }
            }
            let number = BoardView {
                document: self,
                context,
            }
            .tag(tags::BOARD)
            .and_then(Tag::board_number)
            .and_then(|n| n.ok());
            if number != context.board_number {
                return fail(format!("context {} has a stale board number", context.id));
            }
        }

        for (index, slot) in self.slots.iter().enumerate() {
            match (slot.token.board_scope_name(), slot.owner) {
                (Some(name), Some(owner)) => {
                    let valid = self.contexts.iter().any(|c| {
                        c.id == owner
                            && c.range.contains(index)
                            && c.tags.get(name).is_some_and(|ids| ids.contains(&slot.id))
                    });
                    if !valid {
                        return fail(format!("token {index} has a wrong owner"));
                    }
                }
                (Some(_), None) => return fail(format!("board-scope tag {index} has no owner")),
                (None, Some(_)) => return fail(format!("token {index} is owned but inert")),
                (None, None) => {}
            }
        }

        Ok(())
    }
}

impl Extend<Token> for Document {
    fn extend<I: IntoIterator<Item = Token>>(&mut self, iter: I) {
        for token in iter {
            self.append(token);
        }
    }
}

impl FromIterator<Token> for Document {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        let mut document = Document::new();
        document.extend(iter);
        document
    }
}

/// Read access to one board context and its tokens.
#[derive(Debug, Clone, Copy)]
pub struct BoardView<'a> {
    document: &'a Document,
    context: &'a BoardContext,
}

impl<'a> BoardView<'a> {
    pub fn id(&self) -> ContextId {
        self.context.id
    }

    pub fn range(&self) -> TokenRange {
        self.context.range
    }

    pub fn board_number(&self) -> Option<u32> {
        self.context.board_number
    }

    pub fn context(&self) -> &'a BoardContext {
        self.context
    }

    pub fn accepts(&self, token: &Token) -> bool {
        self.context.accepts(token)
    }

    fn span_slots(&self) -> impl Iterator<Item = (usize, &'a Slot)> {
        let document = self.document;
        let range = self.context.range;
        document.slots[range.start..=range.end]
            .iter()
            .enumerate()
            .map(move |(offset, slot)| (range.start + offset, slot))
    }

    /// Tokens owned by this board.
    pub fn tokens(&self) -> impl Iterator<Item = &'a Token> {
        let id = self.context.id;
        self.span_slots()
            .filter(move |(_, slot)| slot.owner == Some(id))
            .map(|(_, slot)| &slot.token)
    }

    /// Every token physically inside the range, with its document index.
    pub fn span(&self) -> impl Iterator<Item = (usize, &'a Token)> {
        self.span_slots().map(|(index, slot)| (index, &slot.token))
    }

    /// First tag or table tag with the given name, with its index.
    pub fn tag_token(&self, name: &str) -> Option<(usize, &'a Token)> {
        let document = self.document;
        if let Some(ids) = self.context.tags.get(name) {
            let index = ids.first().and_then(|id| document.position(*id))?;
            return Some((index, &document.slots[index].token));
        }
        self.span().find(|(_, token)| token.tag_name() == Some(name))
    }

    /// First plain tag with the given name.
    pub fn tag(&self, name: &str) -> Option<&'a Tag> {
        self.tag_token(name).and_then(|(_, token)| token.as_tag())
    }

    fn parsed<T>(
        &self,
        name: &'static str,
        get: impl Fn(&'a Tag) -> Option<Result<T>>,
    ) -> Result<T> {
        let tag = self.tag(name).ok_or(PbnError::IncompleteBoard(name))?;
        get(tag).unwrap_or_else(|| {
            Err(PbnError::InvalidTagValue {
                tag: name,
                value: tag.value().to_string(),
            })
        })
    }

    /// Build a board from the `Board`, `Dealer`, `Vulnerable` and `Deal` tags.
    pub fn as_board(&self) -> Result<Board> {
        let number = self.parsed(tags::BOARD, Tag::board_number)?;
        let dealer = self.parsed(tags::DEALER, Tag::position)?;
        let vulnerability = self.parsed(tags::VULNERABLE, Tag::vulnerability)?;
        let deal = self.parsed(tags::DEAL, Tag::deal)?;

        Ok(Board::new()
            .with_number(number)
            .with_dealer(dealer)
            .with_vulnerability(vulnerability)
            .with_deal(deal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::token::{create_tag, Commentary};
    use bridge_types::{Direction, Vulnerability};

    const DEAL_1: &str = "N:K843.T542.J6.863 AQJ7.K.Q75.AT942 962.AJ7.KT82.J75 T5.Q9863.A943.KQ";

    fn tag(name: &str, value: &str) -> Token {
        Token::Tag(create_tag(name, value))
    }

    fn comment(text: &str) -> Token {
        Token::Commentary(Commentary::singleline(text))
    }

    /// Board 1 (tokens 0..=3), then board 2 (token 4).
    fn two_boards() -> Document {
        let document: Document = vec![
            tag("Board", "1"),
            tag("Dealer", "N"),
            tag("Vulnerable", "None"),
            tag("Deal", DEAL_1),
            tag("Board", "2"),
        ]
        .into_iter()
        .collect();
        document.check_consistency().unwrap();
        document
    }

    fn ranges(document: &Document) -> Vec<(usize, usize)> {
        document
            .contexts()
            .iter()
            .map(|c| (c.range().start, c.range().end))
            .collect()
    }

    #[test]
    fn test_append_creates_contexts() {
        let document = two_boards();
        assert_eq!(document.contexts().len(), 2);
        assert_eq!(ranges(&document), vec![(0, 3), (4, 4)]);
        assert_eq!(document.contexts()[0].board_number(), Some(1));
        assert_eq!(document.contexts()[1].board_number(), Some(2));
    }

    #[test]
    fn test_append_plain_tokens() {
        let mut document = Document::new();
        document.append(Token::EmptyLine);
        assert_eq!(document.len(), 1);
        assert!(document.contexts().is_empty());
        assert_eq!(document.owner(0), None);
    }

    #[test]
    fn test_append_spans_unowned_tokens() {
        let document: Document = vec![
            Token::Escaped(EscapedLine::Export),
            tag("Board", "1"),
            comment(" dealer follows"),
            tag("Ability", "N:89ABC"),
            tag("Dealer", "N"),
            Token::EmptyLine,
        ]
        .into_iter()
        .collect();
        document.check_consistency().unwrap();

        assert_eq!(ranges(&document), vec![(1, 4)]);
        assert_eq!(document.owner(0), None);
        assert_eq!(document.owner(2), None);
        let board = document.boards().next().unwrap();
        let owned: Vec<_> = board.tokens().collect();
        assert_eq!(owned, vec![&tag("Board", "1"), &tag("Dealer", "N")]);
        assert_eq!(board.span().count(), 4);
        assert_eq!(board.tag("Ability").map(Tag::value), Some("N:89ABC"));
    }

    #[test]
    fn test_unrecognized_tags_repeat_freely() {
        let document: Document = vec![
            tag("Board", "1"),
            tag("Note", "a"),
            tag("Note", "b"),
            tag("Dealer", "S"),
        ]
        .into_iter()
        .collect();
        assert_eq!(document.contexts().len(), 1);
        let board = document.boards().next().unwrap();
        assert_eq!(board.tag("Note").map(Tag::value), Some("a"));
    }

    #[test]
    fn test_insert_plain_token_grows_context() {
        let mut document = two_boards();
        document.insert(2, comment("inside")).unwrap();
        assert_eq!(ranges(&document), vec![(0, 4), (5, 5)]);

        document.insert(5, comment("after board 1")).unwrap();
        assert_eq!(ranges(&document), vec![(0, 5), (6, 6)]);
        assert_eq!(document.owner(5), None);
        document.check_consistency().unwrap();
    }

    #[test]
    fn test_insert_before_context_shifts_it() {
        let mut document = two_boards();
        document.insert(0, Token::Escaped(EscapedLine::Export)).unwrap();
        assert_eq!(ranges(&document), vec![(1, 4), (5, 5)]);
        document.check_consistency().unwrap();
    }

    #[test]
    fn test_insert_accepted_tag_attaches() {
        let mut document = two_boards();
        document.insert(5, tag("Dealer", "E")).unwrap();
        assert_eq!(ranges(&document), vec![(0, 3), (4, 5)]);
        assert_eq!(document.owner(5), Some(document.contexts()[1].id()));
        document.check_consistency().unwrap();
    }

    #[test]
    fn test_insert_at_boundary_goes_to_following_context() {
        let mut document = two_boards();
        // Board 1 already has a dealer, board 2 starts at index 4.
        document.insert(4, tag("Dealer", "E")).unwrap();
        assert_eq!(ranges(&document), vec![(0, 3), (4, 5)]);
        assert_eq!(document.owner(4), Some(document.contexts()[1].id()));
        document.check_consistency().unwrap();
    }

    #[test]
    fn test_insert_at_boundary_starts_new_context() {
        let mut document = two_boards();
        document.insert(4, tag("Board", "9")).unwrap();
        assert_eq!(ranges(&document), vec![(0, 3), (4, 4), (5, 5)]);
        assert!(document.has_board_with_number(9));
        document.check_consistency().unwrap();
    }

    #[test]
    fn test_insert_into_interior_cannot_split() {
        let mut document = two_boards();
        let err = document.insert(2, tag("Board", "3")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
        assert_eq!(document, two_boards());
    }

    #[test]
    fn test_insert_out_of_range() {
        let mut document = two_boards();
        let err = document.insert(6, Token::EmptyLine).unwrap_err();
        assert!(matches!(err, PbnError::IndexOutOfRange { index: 6, len: 5 }));
    }

    #[test]
    fn test_insert_then_delete_restores_document() {
        let original = two_boards();
        let candidates = [
            comment("x"),
            tag("Board", "7"),
            tag("Dealer", "W"),
            tag("Ability", "N:1"),
        ];
        for token in candidates {
            for at in 0..=original.len() {
                let mut document = original.clone();
                if document.insert(at, token.clone()).is_err() {
                    continue;
                }
                document.check_consistency().unwrap();
                document.delete_at(at).unwrap();
                assert_eq!(document, original, "insert/delete of {token:?} at {at}");
            }
        }
    }

    #[test]
    fn test_delete_shrinks_and_unapplies() {
        let mut document = two_boards();
        let removed = document.delete_at(1).unwrap();
        assert_eq!(removed, tag("Dealer", "N"));
        assert_eq!(ranges(&document), vec![(0, 2), (3, 3)]);
        assert!(document.boards().next().unwrap().accepts(&tag("Dealer", "S")));
        document.check_consistency().unwrap();
    }

    #[test]
    fn test_delete_board_tag_clears_number() {
        let mut document = two_boards();
        document.delete_at(0).unwrap();
        assert_eq!(document.contexts()[0].board_number(), None);
        assert!(!document.has_board_with_number(1));
        document.insert(0, tag("Board", "11")).unwrap();
        assert_eq!(document.contexts()[0].board_number(), Some(11));
        document.check_consistency().unwrap();
    }

    #[test]
    fn test_delete_last_owned_token_drops_context() {
        let mut document = two_boards();
        document.delete_at(4).unwrap();
        assert_eq!(document.contexts().len(), 1);
        document.check_consistency().unwrap();
    }

    #[test]
    fn test_delete_out_of_range() {
        let mut document = Document::new();
        assert_eq!(document.delete_at(0).unwrap_err().kind(), ErrorKind::Invariant);
    }

    #[test]
    fn test_replace_keeps_owner() {
        let mut document = two_boards();
        let old = document.replace(1, tag("Dealer", "S")).unwrap();
        assert_eq!(old, tag("Dealer", "N"));
        assert_eq!(document.owner(1), Some(document.contexts()[0].id()));
        let board = document.boards().next().unwrap();
        assert_eq!(board.tag("Dealer").map(Tag::value), Some("S"));
        document.check_consistency().unwrap();
    }

    #[test]
    fn test_replace_board_number_in_place_fails() {
        let mut document = two_boards();
        let err = document.replace(0, tag("Board", "5")).unwrap_err();
        assert!(matches!(err, PbnError::BoardNumberImmutable(1)));
        assert_eq!(document, two_boards());

        document.replace(0, tag("Board", "1")).unwrap();
        assert_eq!(document.contexts()[0].board_number(), Some(1));
    }

    #[test]
    fn test_replace_board_tag_with_other_token_fails() {
        let mut document: Document = vec![tag("Board", "1"), tag("Dealer", "N")]
            .into_iter()
            .collect();
        let before = document.clone();

        let err = document.replace(0, Token::EmptyLine).unwrap_err();
        assert!(matches!(err, PbnError::BoardNumberImmutable(1)));
        let err = document.replace(0, tag("Event", "Club")).unwrap_err();
        assert!(matches!(err, PbnError::BoardNumberImmutable(1)));
        let err = document.replace(0, tag("Board", "x")).unwrap_err();
        assert!(matches!(err, PbnError::BoardNumberImmutable(1)));
        assert_eq!(document, before);

        document.delete_at(0).unwrap();
        document.insert(0, tag("Board", "5")).unwrap();
        assert_eq!(document.contexts()[0].board_number(), Some(5));
        document.check_consistency().unwrap();
    }

    #[test]
    fn test_replace_with_duplicate_name_fails() {
        let mut document = two_boards();
        let err = document.replace(1, tag("Deal", DEAL_1)).unwrap_err();
        assert!(matches!(err, PbnError::DuplicateTag(ref name) if name == "Deal"));
        assert_eq!(document, two_boards());
    }

    #[test]
    fn test_replace_tag_with_plain_token() {
        let mut document: Document = vec![tag("Board", "1"), tag("Dealer", "N"), tag("Dealer", "E")]
            .into_iter()
            .collect();
        assert_eq!(document.contexts().len(), 2);
        document.replace(2, Token::EmptyLine).unwrap();
        assert_eq!(document.contexts().len(), 1);
        assert_eq!(document.owner(2), None);
        document.check_consistency().unwrap();
    }

    #[test]
    fn test_replace_free_slot_with_board_scope_tag() {
        let mut document: Document = vec![
            Token::EmptyLine,
            tag("Board", "1"),
            comment("between"),
            tag("Board", "2"),
        ]
        .into_iter()
        .collect();
        document.replace(0, tag("Event", "Club")).unwrap();
        assert_eq!(ranges(&document), vec![(0, 1), (3, 3)]);

        document.replace(2, tag("Dealer", "N")).unwrap();
        assert_eq!(ranges(&document), vec![(0, 2), (3, 3)]);
        document.check_consistency().unwrap();
    }

    #[test]
    fn test_by_reference() {
        let mut document = Document::new();
        let first = document.append(tag("MyTag", "values"));
        document.append(Token::EmptyLine);
        document.delete_token(first).unwrap();
        assert_eq!(document.len(), 1);
        assert!(matches!(
            document.delete_token(first),
            Err(PbnError::TokenNotFound)
        ));
        assert!(matches!(
            document.replace_token(first, Token::EmptyLine),
            Err(PbnError::TokenNotFound)
        ));

        let id = document.token_id(0).unwrap();
        document.replace_token(id, comment("x")).unwrap();
        assert_eq!(document.token(0), Some(&comment("x")));
    }

    #[test]
    fn test_token_ids_follow_tokens() {
        let mut document = two_boards();
        let id = document.token_id(4).unwrap();
        document.insert(0, Token::EmptyLine).unwrap();
        assert_eq!(document.position(id), Some(5));
    }

    #[test]
    fn test_get_board() {
        let document = two_boards();
        assert_eq!(document.get_board(2).unwrap().range().start, 4);
        assert!(document.get_board(3).is_none());
        assert!(document.has_board_with_number(1));
        assert!(!document.has_board_with_number(3));
    }

    #[test]
    fn test_as_board() {
        let document = two_boards();
        let board = document.get_board(1).unwrap().as_board().unwrap();
        assert_eq!(board.number, Some(1));
        assert_eq!(board.dealer, Some(Direction::North));
        assert_eq!(board.vulnerable, Vulnerability::None);
        assert_eq!(board.deal.hand(Direction::South).len(), 13);
    }

    #[test]
    fn test_as_board_incomplete() {
        let document = two_boards();
        let err = document.get_board(2).unwrap().as_board().unwrap_err();
        assert!(matches!(err, PbnError::IncompleteBoard("Dealer")));
        assert_eq!(err.kind(), ErrorKind::Content);
    }

    #[test]
    fn test_as_board_bad_value() {
        let document: Document = vec![
            tag("Board", "1"),
            tag("Dealer", "Q"),
            tag("Vulnerable", "None"),
            tag("Deal", DEAL_1),
        ]
        .into_iter()
        .collect();
        let err = document.boards().next().unwrap().as_board().unwrap_err();
        assert!(matches!(err, PbnError::InvalidTagValue { tag: "Dealer", .. }));
    }

    #[test]
    fn test_unparsable_board_number_is_absent() {
        let document: Document = vec![tag("Board", "one")].into_iter().collect();
        assert_eq!(document.contexts()[0].board_number(), None);
        let err = document.boards().next().unwrap().as_board().unwrap_err();
        assert!(matches!(err, PbnError::InvalidTagValue { tag: "Board", .. }));
    }

    #[test]
    fn test_set_board_number() {
        let mut document = two_boards();
        let second = document.contexts()[1].id();
        document.set_board_number(second, 8).unwrap();
        assert_eq!(document.token(4), Some(&tag("Board", "8")));
        assert_eq!(document.get_board(8).unwrap().id(), second);

        let err = document.set_board_number(second, 1).unwrap_err();
        assert!(matches!(err, PbnError::DuplicateBoardNumber(1)));
        document.check_consistency().unwrap();
    }

    #[test]
    fn test_set_board_numbers_swaps() {
        let mut document = two_boards();
        let first = document.contexts()[0].id();
        let second = document.contexts()[1].id();
        document.set_board_numbers(&[(first, 2), (second, 1)]).unwrap();
        assert_eq!(document.contexts()[0].board_number(), Some(2));
        assert_eq!(document.contexts()[1].board_number(), Some(1));
        document.check_consistency().unwrap();
    }

    #[test]
    fn test_set_board_number_inserts_missing_tag() {
        let mut document: Document = vec![
            tag("Board", "1"),
            tag("Dealer", "N"),
            Token::EmptyLine,
            tag("Dealer", "E"),
            tag("Board", "2"),
        ]
        .into_iter()
        .collect();
        document.delete_at(4).unwrap();
        assert_eq!(document.contexts().len(), 2);
        let second = document.contexts()[1].id();
        document.set_board_number(second, 5).unwrap();
        assert_eq!(document.token(3), Some(&tag("Board", "5")));
        assert_eq!(ranges(&document), vec![(0, 1), (3, 4)]);
        document.check_consistency().unwrap();
    }

    #[test]
    fn test_remove_context() {
        let mut document: Document = vec![
            tag("Board", "1"),
            comment("note"),
            tag("Dealer", "N"),
            tag("Board", "2"),
        ]
        .into_iter()
        .collect();
        let first = document.contexts()[0].id();
        assert_eq!(document.remove_context(first).unwrap(), 3);
        assert_eq!(document.len(), 1);
        assert_eq!(ranges(&document), vec![(0, 0)]);
        assert!(matches!(
            document.remove_context(first),
            Err(PbnError::ContextNotFound(_))
        ));
        document.check_consistency().unwrap();
    }

    #[test]
    fn test_version_and_export() {
        let document: Document = vec![
            Token::Escaped(EscapedLine::Version("2.1".to_string())),
            Token::Escaped(EscapedLine::Export),
        ]
        .into_iter()
        .collect();
        assert_eq!(document.version(), PbnVersion::V2_1);
        assert!(document.is_export_format());
        assert_eq!(Document::new().version(), PbnVersion::NotSpecified);
        assert!(!Document::new().is_export_format());
    }
}
