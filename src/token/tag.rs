//! Tag pairs and the tag factory.

use std::fmt;

use bridge_types::{Deal, Direction, Vulnerability};

use super::table::TableTag;
use crate::error::{PbnError, Result};
use crate::tags;

/// A `[Name "Value"]` tag pair, typed by its name.
///
/// Values are kept verbatim so that serializing reproduces the input.
/// The parsed accessors report bad values when they are called, not when
/// the tag is built.
#[derive(Debug, Clone, PartialEq)]
pub enum Tag {
    Event(String),
    Site(String),
    Date(String),
    Board(String),
    /// One of the `West`, `North`, `East` and `South` player tags.
    Player { seat: Direction, name: String },
    Dealer(String),
    Vulnerable(String),
    Deal(String),
    Scoring(String),
    Declarer(String),
    Contract(String),
    Result(String),
    /// Any tag without a dedicated variant.
    Other { name: String, value: String },
}

impl Tag {
    pub fn name(&self) -> &str {
        match self {
            Tag::Event(_) => tags::EVENT,
            Tag::Site(_) => tags::SITE,
            Tag::Date(_) => tags::DATE,
            Tag::Board(_) => tags::BOARD,
            Tag::Player { seat, .. } => seat_tag_name(*seat),
            Tag::Dealer(_) => tags::DEALER,
            Tag::Vulnerable(_) => tags::VULNERABLE,
            Tag::Deal(_) => tags::DEAL,
            Tag::Scoring(_) => tags::SCORING,
            Tag::Declarer(_) => tags::DECLARER,
            Tag::Contract(_) => tags::CONTRACT,
            Tag::Result(_) => tags::RESULT,
            Tag::Other { name, .. } => name,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Tag::Event(v)
            | Tag::Site(v)
            | Tag::Date(v)
            | Tag::Board(v)
            | Tag::Dealer(v)
            | Tag::Vulnerable(v)
            | Tag::Deal(v)
            | Tag::Scoring(v)
            | Tag::Declarer(v)
            | Tag::Contract(v)
            | Tag::Result(v) => v,
            Tag::Player { name, .. } => name,
            Tag::Other { value, .. } => value,
        }
    }

    /// Build a `Board` tag for a board number.
    pub fn board(number: u32) -> Self {
        Tag::Board(number.to_string())
    }

    /// Board number of a `Board` tag; `None` for any other tag.
    pub fn board_number(&self) -> Option<Result<u32>> {
        match self {
            Tag::Board(value) => Some(parse_board_number(value)),
            _ => None,
        }
    }

    /// Seat named by a `Dealer` or `Declarer` tag, or the seat of a player tag.
    pub fn position(&self) -> Option<Result<Direction>> {
        match self {
            Tag::Player { seat, .. } => Some(Ok(*seat)),
            Tag::Dealer(value) => Some(parse_position(tags::DEALER, value)),
            Tag::Declarer(value) => Some(parse_position(tags::DECLARER, value)),
            _ => None,
        }
    }

    /// Vulnerability of a `Vulnerable` tag.
    pub fn vulnerability(&self) -> Option<Result<Vulnerability>> {
        match self {
            Tag::Vulnerable(value) => Some(parse_vulnerability(value)),
            _ => None,
        }
    }

    /// Cards of a `Deal` tag.
    pub fn deal(&self) -> Option<Result<Deal>> {
        match self {
            Tag::Deal(value) => Some(
                Deal::from_pbn(value).ok_or_else(|| PbnError::InvalidTagValue {
                    tag: tags::DEAL,
                    value: value.clone(),
                }),
            ),
            _ => None,
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} \"{}\"]", self.name(), self.value())
    }
}

fn seat_tag_name(seat: Direction) -> &'static str {
    match seat {
        Direction::North => tags::NORTH,
        Direction::East => tags::EAST,
        Direction::South => tags::SOUTH,
        Direction::West => tags::WEST,
    }
}

fn parse_board_number(value: &str) -> Result<u32> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|_| PbnError::InvalidTagValue {
            tag: tags::BOARD,
            value: value.to_string(),
        })
}

/// Parse a seat from the first letter of a value (`N`, `East`, `s`...).
fn parse_position(tag: &'static str, value: &str) -> Result<Direction> {
    value
        .trim()
        .chars()
        .next()
        .and_then(|c| Direction::from_char(c.to_ascii_uppercase()))
        .ok_or_else(|| PbnError::InvalidTagValue {
            tag,
            value: value.to_string(),
        })
}

fn parse_vulnerability(value: &str) -> Result<Vulnerability> {
    Vulnerability::from_pbn(value.trim()).ok_or_else(|| PbnError::InvalidTagValue {
        tag: tags::VULNERABLE,
        value: value.to_string(),
    })
}

/// Build the most specific tag variant for a name. Unknown names give [`Tag::Other`].
pub fn create_tag(name: &str, value: &str) -> Tag {
    let value = value.to_string();
    match name {
        tags::EVENT => Tag::Event(value),
        tags::SITE => Tag::Site(value),
        tags::DATE => Tag::Date(value),
        tags::BOARD => Tag::Board(value),
        tags::WEST => Tag::Player {
            seat: Direction::West,
            name: value,
        },
        tags::NORTH => Tag::Player {
            seat: Direction::North,
            name: value,
        },
        tags::EAST => Tag::Player {
            seat: Direction::East,
            name: value,
        },
        tags::SOUTH => Tag::Player {
            seat: Direction::South,
            name: value,
        },
        tags::DEALER => Tag::Dealer(value),
        tags::VULNERABLE => Tag::Vulnerable(value),
        tags::DEAL => Tag::Deal(value),
        tags::SCORING => Tag::Scoring(value),
        tags::DECLARER => Tag::Declarer(value),
        tags::CONTRACT => Tag::Contract(value),
        tags::RESULT => Tag::Result(value),
        _ => Tag::Other {
            name: name.to_string(),
            value,
        },
    }
}

/// Whether `name` is followed by table rows when tokenizing.
pub fn is_table_tag(name: &str) -> bool {
    tags::is_table_tag(name)
}

/// Build a table tag, parsing `value` as its column spec.
pub fn create_table_tag(name: &str, value: &str, values: Vec<String>) -> Result<TableTag> {
    TableTag::new(name, value, values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_tag_picks_variant() {
        assert_eq!(create_tag("Board", "12"), Tag::Board("12".to_string()));
        assert_eq!(create_tag("Dealer", "E"), Tag::Dealer("E".to_string()));
        assert_eq!(
            create_tag("South", "Jane"),
            Tag::Player {
                seat: Direction::South,
                name: "Jane".to_string()
            }
        );
        assert_eq!(
            create_tag("Ability", "N:1"),
            Tag::Other {
                name: "Ability".to_string(),
                value: "N:1".to_string()
            }
        );
    }

    #[test]
    fn test_name_and_value_survive() {
        for name in tags::IDENTIFICATION_SECTION {
            let tag = create_tag(name, "x");
            assert_eq!(tag.name(), name);
            assert_eq!(tag.value(), "x");
        }
    }

    #[test]
    fn test_board_number() {
        assert_eq!(create_tag("Board", "7").board_number().unwrap().unwrap(), 7);
        let err = create_tag("Board", "seven").board_number().unwrap().unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Content);
        assert!(create_tag("Event", "7").board_number().is_none());
    }

    #[test]
    fn test_position() {
        let dealer = create_tag("Dealer", "w").position().unwrap().unwrap();
        assert_eq!(dealer, Direction::West);
        let declarer = create_tag("Declarer", "North").position().unwrap().unwrap();
        assert_eq!(declarer, Direction::North);
        assert!(create_tag("Dealer", "X").position().unwrap().is_err());
        assert!(create_tag("Dealer", "").position().unwrap().is_err());
    }

    #[test]
    fn test_vulnerability() {
        let vul = |s: &str| create_tag("Vulnerable", s).vulnerability().unwrap();
        assert_eq!(vul("None").unwrap(), Vulnerability::None);
        assert_eq!(vul(" None ").unwrap(), Vulnerability::None);
        assert_eq!(vul("NS").unwrap(), Vulnerability::NorthSouth);
        assert_eq!(vul("EW").unwrap(), Vulnerability::EastWest);
        assert_eq!(vul("All").unwrap(), Vulnerability::Both);
        assert!(vul("Some").is_err());
    }

    #[test]
    fn test_deal() {
        let tag = create_tag(
            "Deal",
            "N:K843.T542.J6.863 AQJ7.K.Q75.AT942 962.AJ7.KT82.J75 T5.Q9863.A943.KQ",
        );
        let deal = tag.deal().unwrap().unwrap();
        assert_eq!(deal.hand(Direction::North).len(), 13);
        assert!(create_tag("Deal", "garbage").deal().unwrap().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(create_tag("Event", "Club").to_string(), "[Event \"Club\"]");
        assert_eq!(Tag::board(3).to_string(), "[Board \"3\"]");
    }
}
