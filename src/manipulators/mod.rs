//! Whole-document edits built on the document API.
//!
//! - [`strip`] drops everything but directives and an allow-list of tags
//! - [`boards`] removes and renumbers boards
//! - [`analysis`] attaches double dummy analysis from an external service
//! - [`info`] summarizes a document

pub mod analysis;
pub mod boards;
pub mod info;
pub mod strip;

pub use analysis::{
    add_analyses, AnalysisFormat, AnalysisService, AnalysisTable, BoardAnalyzer, Denomination,
    ParContract,
};
pub use boards::{remove_boards, renumber_boards, NumericRange, RenumberMode, RenumberOptions};
pub use info::Overview;
pub use strip::Stripper;
