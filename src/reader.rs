//! Import of pre-formatted experimental data.
//!
//! Two formats are supported: a whitespace-delimited text format holding one
//! [`DataPoint`] per line, and a CSV layout with two header rows where every
//! named column group contributes interleaved (x, y) pairs.
use std::fs;
use std::path::Path;

use crate::data::{DataManager, DataPoint};
use crate::EstimatorError;

/// Reads a whitespace-delimited text file into a [`DataManager`].
///
/// Each line holds up to seven values in [`crate::Field`] order; trailing
/// fields may be omitted and `nan` marks an unset field. Blank lines and
/// blank tokens are ignored.
pub fn read_txt<P: AsRef<Path>>(path: P) -> Result<DataManager, EstimatorError> {
    parse_txt(&fs::read_to_string(path)?)
}

/// The string-level counterpart of [`read_txt`].
pub fn parse_txt(contents: &str) -> Result<DataManager, EstimatorError> {
    let mut data = DataManager::new();
    for line in contents.lines() {
        let values = line
            .split_whitespace()
            .map(|token| token.parse::<f64>())
            .collect::<Result<Vec<f64>, _>>()?;
        if values.is_empty() {
            continue;
        }
        data.push(DataPoint::from_slice(&values)?);
    }
    Ok(data)
}

/// One (x, y) pair the CSV reader could not parse, with the data row it came
/// from and the parse failure.
#[derive(Clone, Debug)]
pub struct SkippedPair {
    pub row: usize,
    pub reason: String,
}

/// The pairs read for one named column group.
#[derive(Clone, Debug)]
pub struct CsvGroup {
    pub name: String,
    pub pairs: Vec<(f64, f64)>,
    pub skipped: Vec<SkippedPair>,
}

/// The contents of a two-row-header CSV file, one entry per column group.
#[derive(Clone, Debug, Default)]
pub struct CsvTable {
    groups: Vec<CsvGroup>,
}

impl CsvTable {
    pub fn groups(&self) -> &[CsvGroup] {
        &self.groups
    }

    /// Looks up a group by its header name.
    pub fn group(&self, name: &str) -> Option<&CsvGroup> {
        self.groups.iter().find(|group| group.name == name)
    }
}

/// Reads a two-row-header CSV file.
///
/// Row 0 holds the group names (empty cells are dropped), row 1 is ignored,
/// and data rows start at row 2. Group `g` reads columns `2g` and `2g + 1`
/// as an (x, y) pair. Pairs that fail to parse are not discarded silently;
/// they are reported per group in [`CsvGroup::skipped`].
pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<CsvTable, EstimatorError> {
    parse_csv(&fs::read_to_string(path)?)
}

/// The string-level counterpart of [`read_csv`].
pub fn parse_csv(contents: &str) -> Result<CsvTable, EstimatorError> {
    let rows: Vec<Vec<&str>> = contents
        .lines()
        .map(|line| line.split(',').map(str::trim).collect())
        .collect();
    let header = match rows.first() {
        Some(row) => row,
        None => return Ok(CsvTable::default()),
    };
    let mut groups: Vec<CsvGroup> = header
        .iter()
        .filter(|name| !name.is_empty())
        .map(|name| CsvGroup {
            name: (*name).to_owned(),
            pairs: Vec::new(),
            skipped: Vec::new(),
        })
        .collect();
    for (row_index, row) in rows.iter().enumerate().skip(2) {
        for (g, group) in groups.iter_mut().enumerate() {
            match parse_pair(row, 2 * g) {
                Ok(pair) => group.pairs.push(pair),
                Err(reason) => group.skipped.push(SkippedPair {
                    row: row_index,
                    reason,
                }),
            }
        }
    }
    Ok(CsvTable { groups })
}

fn parse_pair(row: &[&str], column: usize) -> Result<(f64, f64), String> {
    let cell = |offset: usize| -> Result<f64, String> {
        let index = column + offset;
        row.get(index)
            .ok_or_else(|| format!("column {} is missing", index))?
            .parse::<f64>()
            .map_err(|e| format!("column {}: {}", index, e))
    };
    Ok((cell(0)?, cell(1)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Field;

    #[test]
    fn parse_txt_reads_points_in_file_order() {
        let data = parse_txt("0 1.0 1073.15\n1 0.5 1073.15\n").unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data.points()[0].voltage(), Some(1.0));
        assert_eq!(data.points()[1].current_density(), Some(1.0));
        assert_eq!(data.points()[1].state().temperature(), Some(1073.15));
    }

    #[test]
    fn parse_txt_skips_blank_lines_and_tokens() {
        let data = parse_txt("\n  1.0   0.7  \n\n").unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data.points()[0].current_density(), Some(1.0));
    }

    #[test]
    fn parse_txt_reports_malformed_tokens() {
        let result = parse_txt("1.0 abc\n");
        assert!(matches!(result, Err(EstimatorError::ParseError(_))));
    }

    #[test]
    fn parse_txt_treats_nan_as_unset() {
        let data = parse_txt("1.0 nan 1073.15\n").unwrap();
        assert_eq!(data.points()[0].voltage(), None);
    }

    #[test]
    fn txt_round_trips_through_the_manager() {
        let mut data = DataManager::new();
        data.push(
            DataPoint::from_slice(&[1.0, 0.7, 1073.15, 101325.0, 60000.0, 21000.0, 20000.0])
                .unwrap(),
        );
        data.push(DataPoint::from_slice(&[2.0, 0.6]).unwrap());
        let restored = parse_txt(&data.to_txt()).unwrap();
        assert_eq!(restored, data);
    }

    #[test]
    fn parse_csv_groups_pairs_by_header() {
        let table = parse_csv(
            "cell A,cell B\n\
             j,E,j,E\n\
             0.0,1.0,0.5,0.9\n\
             1.0,0.5,1.5,0.4\n",
        )
        .unwrap();
        let a = table.group("cell A").unwrap();
        assert_eq!(a.pairs, vec![(0.0, 1.0), (1.0, 0.5)]);
        let b = table.group("cell B").unwrap();
        assert_eq!(b.pairs, vec![(0.5, 0.9), (1.5, 0.4)]);
        assert!(table.group("cell C").is_none());
    }

    #[test]
    fn parse_csv_reports_skipped_pairs_with_row_index() {
        let table = parse_csv(
            "cell A\n\
             j,E\n\
             0.0,oops\n\
             1.0,0.5\n",
        )
        .unwrap();
        let a = table.group("cell A").unwrap();
        // The malformed row is reported, the following row still parses.
        assert_eq!(a.pairs, vec![(1.0, 0.5)]);
        assert_eq!(a.skipped.len(), 1);
        assert_eq!(a.skipped[0].row, 2);
        assert!(a.skipped[0].reason.contains("column 1"));
    }

    #[test]
    fn parse_csv_reports_missing_columns() {
        let table = parse_csv(
            "cell A,cell B\n\
             j,E,j,E\n\
             0.0,1.0\n",
        )
        .unwrap();
        let b = table.group("cell B").unwrap();
        assert!(b.pairs.is_empty());
        assert_eq!(b.skipped[0].row, 2);
        assert!(b.skipped[0].reason.contains("missing"));
    }

    #[test]
    fn csv_pairs_feed_a_data_manager() {
        let table = parse_csv("cell A\nj,E\n0.0,1.0\n1.0,0.5\n").unwrap();
        let mut data = DataManager::new();
        for &(j, e) in &table.group("cell A").unwrap().pairs {
            data.push(DataPoint::from_slice(&[j, e]).unwrap());
        }
        data.fill(Field::Temperature, 1073.15).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data.points()[1].state().temperature(), Some(1073.15));
    }
}
