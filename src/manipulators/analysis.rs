//! Double dummy analysis attached to boards.
//!
//! The analysis itself comes from an [`AnalysisService`] (typically a double
//! dummy solver binding). This module only decides which boards need it and
//! how the results are written into the document. Three layouts exist in the
//! wild, see [`AnalysisFormat`].

use std::fmt;
use std::str::FromStr;

use bridge_types::{Board, Direction};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::document::{BoardView, ContextId, Document};
use crate::error::{PbnError, Result};
use crate::tags;
use crate::token::{create_tag, EscapedLine, Token};

const ABILITY: &str = "Ability";
const MINIMAX: &str = "Minimax";

static PS_BRIDGE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^%!R [0-9A-D]{20}$").unwrap());

/// Contract denomination, in the order analysis tables list them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Denomination {
    NoTrump,
    Spades,
    Hearts,
    Diamonds,
    Clubs,
}

impl Denomination {
    pub const ALL: [Denomination; 5] = [
        Denomination::NoTrump,
        Denomination::Spades,
        Denomination::Hearts,
        Denomination::Diamonds,
        Denomination::Clubs,
    ];

    pub fn to_char(self) -> char {
        match self {
            Denomination::NoTrump => 'N',
            Denomination::Spades => 'S',
            Denomination::Hearts => 'H',
            Denomination::Diamonds => 'D',
            Denomination::Clubs => 'C',
        }
    }
}

/// Best contract for both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParContract {
    pub level: u8,
    pub denomination: Denomination,
    pub declarer: Direction,
}

/// Tricks each seat takes in each denomination, plus the par result.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnalysisTable {
    /// Indexed by denomination, then seat (N, E, S, W).
    tricks: [[u8; 4]; 5],
    pub par_contract: Option<ParContract>,
    /// Par score from North-South's point of view.
    pub par_score: i32,
}

/// Seats in table order.
const SEATS: [Direction; 4] = [
    Direction::North,
    Direction::East,
    Direction::South,
    Direction::West,
];

fn seat_index(seat: Direction) -> usize {
    match seat {
        Direction::North => 0,
        Direction::East => 1,
        Direction::South => 2,
        Direction::West => 3,
    }
}

impl AnalysisTable {
    pub fn from_fn(mut tricks: impl FnMut(Denomination, Direction) -> u8) -> Self {
        let mut table = AnalysisTable::default();
        for (d, denomination) in Denomination::ALL.into_iter().enumerate() {
            for seat in SEATS {
                table.tricks[d][seat_index(seat)] = tricks(denomination, seat);
            }
        }
        table
    }

    pub fn with_par(mut self, contract: ParContract, score: i32) -> Self {
        self.par_contract = Some(contract);
        self.par_score = score;
        self
    }

    pub fn tricks(&self, denomination: Denomination, seat: Direction) -> u8 {
        self.tricks[denomination as usize][seat_index(seat)]
    }

    /// One hex digit per denomination for `seat`.
    fn hex_row(&self, seat: Direction) -> String {
        Denomination::ALL
            .into_iter()
            .map(|d| format!("{:X}", self.tricks(d, seat)))
            .collect()
    }
}

/// Black-box double dummy solver.
pub trait AnalysisService {
    fn analyze_board(&self, board: &Board) -> Result<AnalysisTable>;

    /// Analyze several boards. Solvers that batch should override this.
    fn analyze_boards(&self, boards: &[Board]) -> Result<Vec<AnalysisTable>> {
        boards.iter().map(|board| self.analyze_board(board)).collect()
    }
}

/// Layout of the analysis tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalysisFormat {
    /// `Ability` and `Minimax` tags, as written by Deep Finesse.
    #[default]
    Ability,
    /// `OptimumResultTable`, `OptimumScore` and `DoubleDummyTricks`, as written
    /// by Bridge Composer. Can be detected and removed but not generated.
    OptimumResultTable,
    /// A `%%!R` escaped line with 20 hex digits, as written by PS Bridge.
    PsBridge,
}

impl AnalysisFormat {
    pub const ALL: [AnalysisFormat; 3] = [
        AnalysisFormat::Ability,
        AnalysisFormat::OptimumResultTable,
        AnalysisFormat::PsBridge,
    ];

    pub fn analyzer(self) -> &'static dyn BoardAnalyzer {
        match self {
            AnalysisFormat::Ability => &AbilityAnalyzer,
            AnalysisFormat::OptimumResultTable => &OptimumResultTableAnalyzer,
            AnalysisFormat::PsBridge => &PsBridgeAnalyzer,
        }
    }
}

impl fmt::Display for AnalysisFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AnalysisFormat::Ability => "Ability",
            AnalysisFormat::OptimumResultTable => "OptimumResultTable",
            AnalysisFormat::PsBridge => "PsBridge",
        };
        f.write_str(s)
    }
}

impl FromStr for AnalysisFormat {
    type Err = PbnError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ability" => Ok(AnalysisFormat::Ability),
            "optimumresulttable" => Ok(AnalysisFormat::OptimumResultTable),
            "psbridge" => Ok(AnalysisFormat::PsBridge),
            _ => Err(PbnError::InvalidOption(format!("unknown analysis format: {s:?}"))),
        }
    }
}

/// Reads and writes one analysis layout.
pub trait BoardAnalyzer {
    /// Whether the token is part of this layout.
    fn is_analysis_token(&self, token: &Token) -> bool;

    /// Tokens to add after a board for the given analysis.
    fn create_tokens(&self, table: &AnalysisTable) -> Result<Vec<Token>>;

    /// Whether the board already carries a full analysis.
    fn has_analysis(&self, board: &BoardView<'_>) -> bool {
        board.span().any(|(_, token)| self.is_analysis_token(token))
    }

    /// Delete every analysis token of this layout. Returns the number deleted.
    fn purge(&self, document: &mut Document) -> Result<usize> {
        let doomed: Vec<usize> = document
            .tokens()
            .enumerate()
            .filter(|(_, token)| self.is_analysis_token(token))
            .map(|(index, _)| index)
            .collect();
        delete_indices(document, &doomed)
    }

    /// Delete this layout's tokens from one board.
    fn purge_board(&self, document: &mut Document, id: ContextId) -> Result<usize> {
        let board = document
            .board(id)
            .ok_or(PbnError::ContextNotFound(id.get()))?;
        let doomed: Vec<usize> = board
            .span()
            .filter(|(_, token)| self.is_analysis_token(token))
            .map(|(index, _)| index)
            .collect();
        delete_indices(document, &doomed)
    }
}

/// Delete tokens at ascending `indices`.
fn delete_indices(document: &mut Document, indices: &[usize]) -> Result<usize> {
    for index in indices.iter().rev() {
        document.delete_at(*index)?;
    }
    Ok(indices.len())
}

fn has_tag(board: &BoardView<'_>, name: &str) -> bool {
    board.span().any(|(_, token)| token.tag_name() == Some(name))
}

struct AbilityAnalyzer;

impl BoardAnalyzer for AbilityAnalyzer {
    fn is_analysis_token(&self, token: &Token) -> bool {
        matches!(token.tag_name(), Some(ABILITY | MINIMAX))
    }

    fn create_tokens(&self, table: &AnalysisTable) -> Result<Vec<Token>> {
        let ability = SEATS
            .into_iter()
            .map(|seat| format!("{}:{}", seat.to_char(), table.hex_row(seat)))
            .collect::<Vec<_>>()
            .join(" ");

        let minimax = match table.par_contract {
            Some(contract) => format!(
                "{}{}{}{}",
                contract.level,
                contract.denomination.to_char(),
                contract.declarer.to_char(),
                table.par_score
            ),
            None => String::new(),
        };

        Ok(vec![
            Token::Tag(create_tag(ABILITY, &ability)),
            Token::Tag(create_tag(MINIMAX, &minimax)),
        ])
    }

    fn has_analysis(&self, board: &BoardView<'_>) -> bool {
        has_tag(board, ABILITY) && has_tag(board, MINIMAX)
    }
}

struct OptimumResultTableAnalyzer;

impl BoardAnalyzer for OptimumResultTableAnalyzer {
    fn is_analysis_token(&self, token: &Token) -> bool {
        matches!(
            token.tag_name(),
            Some(tags::OPTIMUM_RESULT_TABLE | tags::OPTIMUM_SCORE | tags::DOUBLE_DUMMY_TRICKS)
        )
    }

    fn create_tokens(&self, _table: &AnalysisTable) -> Result<Vec<Token>> {
        Err(PbnError::Unsupported(
            "generating OptimumResultTable analysis".to_string(),
        ))
    }
}

struct PsBridgeAnalyzer;

impl BoardAnalyzer for PsBridgeAnalyzer {
    fn is_analysis_token(&self, token: &Token) -> bool {
        matches!(token, Token::Escaped(EscapedLine::Custom(content)) if PS_BRIDGE_REGEX.is_match(content))
    }

    fn create_tokens(&self, table: &AnalysisTable) -> Result<Vec<Token>> {
        // PS Bridge lists seats starting from East.
        let seats = [
            Direction::East,
            Direction::South,
            Direction::West,
            Direction::North,
        ];
        let digits: String = seats.into_iter().map(|seat| table.hex_row(seat)).collect();
        Ok(vec![Token::Escaped(EscapedLine::Custom(format!("%!R {digits}")))])
    }
}

/// Attach analyses in `format` to every board that lacks one.
///
/// Analyses in the other formats are removed. Boards already carrying a full
/// analysis are left alone; partial ones are replaced. The service is called
/// once for the whole batch and the new tokens go right after each board's
/// last token. The document is only modified once every pending board has
/// been analyzed. Returns the number of boards analyzed.
pub fn add_analyses<S>(document: &mut Document, service: &S, format: AnalysisFormat) -> Result<usize>
where
    S: AnalysisService + ?Sized,
{
    let analyzer = format.analyzer();
    let pending: Vec<ContextId> = document
        .boards()
        .filter(|board| !analyzer.has_analysis(board))
        .map(|board| board.id())
        .collect();

    let boards = pending
        .iter()
        .map(|id| {
            document
                .board(*id)
                .ok_or(PbnError::ContextNotFound(id.get()))?
                .as_board()
        })
        .collect::<Result<Vec<_>>>()?;

    let generated = if boards.is_empty() {
        Vec::new()
    } else {
        let tables = service.analyze_boards(&boards)?;
        if tables.len() != boards.len() {
            return Err(PbnError::Analysis(format!(
                "expected {} analyses, got {}",
                boards.len(),
                tables.len()
            )));
        }
        tables
            .iter()
            .map(|table| analyzer.create_tokens(table))
            .collect::<Result<Vec<_>>>()?
    };

    for other in AnalysisFormat::ALL {
        if other != format {
            let purged = other.analyzer().purge(document)?;
            if purged > 0 {
                tracing::debug!(format = %other, tokens = purged, "purged analysis");
            }
        }
    }
    if pending.is_empty() {
        return Ok(0);
    }

    for (id, tokens) in pending.iter().zip(generated) {
        analyzer.purge_board(document, *id)?;
        for token in tokens {
            let end = document
                .board(*id)
                .ok_or(PbnError::ContextNotFound(id.get()))?
                .range()
                .end;
            document.insert(end + 1, token)?;
        }
    }

    tracing::info!(boards = pending.len(), %format, "added analyses");
    Ok(pending.len())
}
