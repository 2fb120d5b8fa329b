//! Board removal and renumbering.

use std::str::FromStr;

use crate::document::{ContextId, Document};
use crate::error::{PbnError, Result};

/// Inclusive range of board numbers, written `3` or `3-7`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumericRange {
    pub start: u32,
    pub end: u32,
}

impl NumericRange {
    pub fn new(start: u32, end: u32) -> Self {
        NumericRange { start, end }
    }

    pub fn single(number: u32) -> Self {
        NumericRange::new(number, number)
    }

    pub fn contains(&self, number: u32) -> bool {
        self.start <= number && number <= self.end
    }
}

impl FromStr for NumericRange {
    type Err = PbnError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || PbnError::InvalidOption(format!("invalid board range: {s:?}"));
        let number = |part: &str| part.trim().parse::<u32>().map_err(|_| invalid());

        let range = match s.split_once('-') {
            Some((start, end)) => NumericRange::new(number(start)?, number(end)?),
            None => NumericRange::single(number(s)?),
        };
        if range.start > range.end {
            return Err(invalid());
        }
        Ok(range)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenumberMode {
    /// Add a constant to every board number.
    ShiftNumbers,
    /// Number boards consecutively in file order.
    AssignNewNumbers,
}

/// How to renumber boards. Parsed from `+2`/`-2` (shift) or `5` (assign from 5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenumberOptions {
    pub mode: RenumberMode,
    /// Shift for [`RenumberMode::ShiftNumbers`], first number otherwise.
    pub number: i64,
}

impl Default for RenumberOptions {
    fn default() -> Self {
        RenumberOptions {
            mode: RenumberMode::AssignNewNumbers,
            number: 1,
        }
    }
}

impl FromStr for RenumberOptions {
    type Err = PbnError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(RenumberOptions::default());
        }

        let mode = if s.starts_with(['+', '-']) {
            RenumberMode::ShiftNumbers
        } else {
            RenumberMode::AssignNewNumbers
        };
        let number = s
            .parse::<i64>()
            .map_err(|_| PbnError::InvalidOption(format!("invalid renumbering: {s:?}")))?;
        Ok(RenumberOptions { mode, number })
    }
}

/// Remove every board whose number is in `range`. Returns how many were removed.
pub fn remove_boards(document: &mut Document, range: NumericRange) -> Result<usize> {
    let doomed: Vec<ContextId> = document
        .boards()
        .filter(|board| board.board_number().is_some_and(|n| range.contains(n)))
        .map(|board| board.id())
        .collect();

    for id in &doomed {
        document.remove_context(*id)?;
    }

    tracing::info!(removed = doomed.len(), start = range.start, end = range.end, "removed boards");
    Ok(doomed.len())
}

/// Renumber boards. Boards without a number are left alone when shifting and
/// get a `Board` tag when assigning.
pub fn renumber_boards(document: &mut Document, options: RenumberOptions) -> Result<()> {
    let out_of_range =
        |n: i64| PbnError::InvalidOption(format!("board number {n} is out of range"));

    let assignments: Vec<(ContextId, u32)> = match options.mode {
        RenumberMode::ShiftNumbers => document
            .contexts()
            .iter()
            .filter_map(|context| context.board_number().map(|n| (context.id(), n)))
            .map(|(id, n)| {
                let shifted = i64::from(n) + options.number;
                u32::try_from(shifted)
                    .map(|n| (id, n))
                    .map_err(|_| out_of_range(shifted))
            })
            .collect::<Result<_>>()?,
        RenumberMode::AssignNewNumbers => {
            let first = u32::try_from(options.number).map_err(|_| out_of_range(options.number))?;
            document
                .contexts()
                .iter()
                .zip(first..)
                .map(|(context, n)| (context.id(), n))
                .collect()
        }
    };

    document.set_board_numbers(&assignments)?;
    tracing::info!(boards = assignments.len(), mode = ?options.mode, "renumbered boards");
    Ok(())
}
