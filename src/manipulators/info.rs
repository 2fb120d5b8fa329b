//! Document overview.

use std::fmt;

use crate::document::Document;
use crate::manipulators::analysis::AnalysisFormat;
use crate::version::PbnVersion;

const GENERATOR: &str = "Generator";

/// Summary of a document, printable with `Display`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overview {
    pub boards: usize,
    pub first_board: Option<u32>,
    pub last_board: Option<u32>,
    pub version: PbnVersion,
    pub export: bool,
    /// Analysis formats found on at least one board.
    pub analyses: Vec<AnalysisFormat>,
    /// Value of the first `Generator` tag.
    pub generator: Option<String>,
}

impl Overview {
    pub fn of(document: &Document) -> Self {
        let contexts = document.contexts();
        let analyses = AnalysisFormat::ALL
            .into_iter()
            .filter(|format| {
                let analyzer = format.analyzer();
                document.boards().any(|board| analyzer.has_analysis(&board))
            })
            .collect();
        let generator = document
            .tokens()
            .find(|token| token.tag_name() == Some(GENERATOR))
            .and_then(|token| token.tag_value())
            .filter(|value| !value.is_empty())
            .map(str::to_string);

        Overview {
            boards: contexts.len(),
            first_board: contexts.first().and_then(|c| c.board_number()),
            last_board: contexts.last().and_then(|c| c.board_number()),
            version: document.version(),
            export: document.is_export_format(),
            analyses,
            generator,
        }
    }
}

fn number(n: Option<u32>) -> String {
    n.map_or_else(|| "?".to_string(), |n| n.to_string())
}

impl fmt::Display for Overview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.boards == 0 {
            writeln!(f, "Boards: None")?;
        } else {
            writeln!(
                f,
                "Boards: {} - {} ({} boards)",
                number(self.first_board),
                number(self.last_board),
                self.boards
            )?;
        }
        writeln!(f, "Version: {}", self.version)?;
        writeln!(f, "Export: {}", if self.export { "Yes" } else { "No" })?;
        if self.analyses.is_empty() {
            writeln!(f, "Analyses: No")?;
        } else {
            let names: Vec<String> = self.analyses.iter().map(ToString::to_string).collect();
            writeln!(f, "Analyses: {}", names.join(", "))?;
        }
        if let Some(generator) = &self.generator {
            writeln!(f, "Generated by: {generator}")?;
        }
        Ok(())
    }
}
