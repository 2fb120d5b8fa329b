//! Tag names known to the document model.
//!
//! A *board-scope* tag takes part in board context detection: a board context
//! holds at most one tag of each board-scope name, and a second one starts the
//! next board. Every other tag name is inert.

pub const EVENT: &str = "Event";
pub const SITE: &str = "Site";
pub const DATE: &str = "Date";
pub const BOARD: &str = "Board";
pub const WEST: &str = "West";
pub const NORTH: &str = "North";
pub const EAST: &str = "East";
pub const SOUTH: &str = "South";
pub const DEALER: &str = "Dealer";
pub const VULNERABLE: &str = "Vulnerable";
pub const DEAL: &str = "Deal";
pub const SCORING: &str = "Scoring";
pub const DECLARER: &str = "Declarer";
pub const CONTRACT: &str = "Contract";
pub const RESULT: &str = "Result";

pub const DOUBLE_DUMMY_TRICKS: &str = "DoubleDummyTricks";
pub const OPTIMUM_SCORE: &str = "OptimumScore";

pub const OPTIMUM_RESULT_TABLE: &str = "OptimumResultTable";
pub const ACTION_TABLE: &str = "ActionTable";
pub const AUCTION_TIME_TABLE: &str = "AuctionTimeTable";
pub const INSTANT_SCORE_TABLE: &str = "InstantScoreTable";
pub const OPTIMUM_PLAY_TABLE: &str = "OptimumPlayTable";
pub const PLAY_TIME_TABLE: &str = "PlayTimeTable";
pub const SCORE_TABLE: &str = "ScoreTable";
pub const TOTAL_SCORE_TABLE: &str = "TotalScoreTable";

/// The mandatory identification section, in export order.
pub const IDENTIFICATION_SECTION: [&str; 15] = [
    EVENT, SITE, DATE, BOARD, WEST, NORTH, EAST, SOUTH, DEALER, VULNERABLE, DEAL, SCORING,
    DECLARER, CONTRACT, RESULT,
];

/// Tags whose value is a column spec followed by rows of data.
pub const TABLE_TAGS: [&str; 8] = [
    OPTIMUM_RESULT_TABLE,
    ACTION_TABLE,
    AUCTION_TIME_TABLE,
    INSTANT_SCORE_TABLE,
    OPTIMUM_PLAY_TABLE,
    PLAY_TIME_TABLE,
    SCORE_TABLE,
    TOTAL_SCORE_TABLE,
];

/// Board-scope analysis tags that carry a plain value.
pub const ANALYSIS_TAGS: [&str; 2] = [DOUBLE_DUMMY_TRICKS, OPTIMUM_SCORE];

/// Whether the tag's value is followed by table rows.
pub fn is_table_tag(name: &str) -> bool {
    TABLE_TAGS.contains(&name)
}

/// Whether the tag participates in board context boundaries and uniqueness.
pub fn is_board_scope(name: &str) -> bool {
    IDENTIFICATION_SECTION.contains(&name) || is_table_tag(name) || ANALYSIS_TAGS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_scope_registry() {
        assert!(is_board_scope("Board"));
        assert!(is_board_scope("Result"));
        assert!(is_board_scope("ScoreTable"));
        assert!(is_board_scope("DoubleDummyTricks"));
        assert!(is_board_scope("OptimumScore"));
        assert!(!is_board_scope("Ability"));
        assert!(!is_board_scope("Generator"));
        assert!(!is_board_scope("board"));
    }

    #[test]
    fn test_table_tags() {
        for name in TABLE_TAGS {
            assert!(is_table_tag(name));
        }
        assert!(!is_table_tag(DOUBLE_DUMMY_TRICKS));
        assert!(!is_table_tag(OPTIMUM_SCORE));
        assert!(!is_table_tag(DEAL));
    }
}
