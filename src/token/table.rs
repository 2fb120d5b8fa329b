//! Table tags: a tag whose value is a column spec, followed by rows of values.
//!
//! ```text
//! [OptimumResultTable "Declarer;Denomination\2R;Result\2R"]
//! N NT  9
//! N  S 10
//! ```

use std::fmt;

use crate::error::{PbnError, Result};

const COLUMN_SEPARATOR: char = ';';
const FORMAT_SEPARATOR: char = '\\';

/// Sort order announced for a column. At most one column of a table is ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnOrdering {
    Ascending,
    Descending,
    #[default]
    None,
}

/// Where the content sits inside a padded column.
///
/// `Left` pads on the left, which right-aligns the content; `Right` pads on
/// the right. This is how PBN producers fill tables, so it is kept as is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnAlignment {
    Left,
    Right,
    #[default]
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnInfo {
    pub name: String,
    pub ordering: ColumnOrdering,
    pub alignment: ColumnAlignment,
    pub width: usize,
}

impl ColumnInfo {
    /// Parse one `;`-separated column segment such as `+Score\5R`.
    pub fn parse(segment: &str) -> Result<Self> {
        let invalid = || PbnError::InvalidColumnFormat(segment.to_string());

        let (ordering, rest) = if let Some(rest) = segment.strip_prefix('+') {
            (ColumnOrdering::Ascending, rest)
        } else if let Some(rest) = segment.strip_prefix('-') {
            (ColumnOrdering::Descending, rest)
        } else {
            (ColumnOrdering::None, segment)
        };

        let Some((name, format)) = rest.split_once(FORMAT_SEPARATOR) else {
            return Ok(ColumnInfo {
                name: rest.to_string(),
                ordering,
                ..Default::default()
            });
        };

        if format.contains(FORMAT_SEPARATOR) {
            return Err(invalid());
        }

        // The alignment letter normally follows the width (`5R`); `R5` is accepted too.
        let (alignment, width) = if let Some(w) = format.strip_suffix('L') {
            (ColumnAlignment::Left, w)
        } else if let Some(w) = format.strip_suffix('R') {
            (ColumnAlignment::Right, w)
        } else if let Some(w) = format.strip_prefix('L') {
            (ColumnAlignment::Left, w)
        } else if let Some(w) = format.strip_prefix('R') {
            (ColumnAlignment::Right, w)
        } else {
            (ColumnAlignment::None, format)
        };
        let width = width.parse::<usize>().map_err(|_| invalid())?;

        Ok(ColumnInfo {
            name: name.to_string(),
            ordering,
            alignment,
            width,
        })
    }

    fn pad(&self, f: &mut fmt::Formatter<'_>, item: &str) -> fmt::Result {
        let width = self.width;
        match self.alignment {
            ColumnAlignment::None => f.write_str(item),
            ColumnAlignment::Left => write!(f, "{item:>width$}"),
            ColumnAlignment::Right => write!(f, "{item:<width$}"),
        }
    }
}

/// Parse a full column spec.
pub fn parse_columns(spec: &str) -> Result<Vec<ColumnInfo>> {
    let columns = spec
        .split(COLUMN_SEPARATOR)
        .map(ColumnInfo::parse)
        .collect::<Result<Vec<_>>>()?;

    let ordered = columns
        .iter()
        .filter(|c| c.ordering != ColumnOrdering::None)
        .count();
    if ordered > 1 {
        return Err(PbnError::MultipleOrderedColumns(spec.to_string()));
    }

    Ok(columns)
}

/// A table tag with its column layout and the flattened cell values.
#[derive(Debug, Clone, PartialEq)]
pub struct TableTag {
    name: String,
    value: String,
    columns: Vec<ColumnInfo>,
    values: Vec<String>,
}

impl TableTag {
    pub fn new(name: &str, value: &str, values: Vec<String>) -> Result<Self> {
        Ok(TableTag {
            name: name.to_string(),
            value: value.to_string(),
            columns: parse_columns(value)?,
            values,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The raw column spec.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    /// All cells, row after row.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Cells grouped into rows of `columns().len()`; the last row may be short.
    pub fn rows(&self) -> impl Iterator<Item = &[String]> {
        self.values.chunks(self.columns.len().max(1))
    }

    /// Index of the ordered column, if any.
    pub fn ordered_column(&self) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.ordering != ColumnOrdering::None)
    }
}

impl fmt::Display for TableTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{} \"{}\"]", self.name, self.value)?;
        for row in self.rows() {
            for (i, (item, column)) in row.iter().zip(&self.columns).enumerate() {
                if i > 0 {
                    f.write_str(" ")?;
                }
                column.pad(f, item)?;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}
