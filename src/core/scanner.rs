//! Line scanner for dependency (MDG) files.
//!
//! One record per line, tab-separated with a single-space fallback. The
//! trailing numeric fields are optional and detected right-to-left: every
//! column that parses as a number belongs to the tail, everything before it
//! is an entity name. The last entity is the dependency target, the ones
//! before it the sources.

use super::errors::{AnalysisError, Result};

/// One parsed dependency line.
#[derive(Debug, Clone, PartialEq)]
pub struct DependencyRecord {
    /// Source entities. More than one element denotes an aggregated
    /// association rule; graph, finder, and structure builders skip those.
    pub from: Vec<String>,
    pub to: String,
    pub support_count: usize,
    pub confidence: f64,
    pub commits_count: usize,
}

/// Iterator over the non-blank lines of a dependency stream.
pub struct DependencyScanner<'a> {
    lines: std::str::Lines<'a>,
}

impl<'a> DependencyScanner<'a> {
    pub fn new(input: &'a str) -> Self {
        DependencyScanner {
            lines: input.lines(),
        }
    }
}

impl Iterator for DependencyScanner<'_> {
    type Item = Result<DependencyRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        for line in self.lines.by_ref() {
            if line.trim().is_empty() {
                continue;
            }
            return Some(parse_line(line));
        }
        None
    }
}

fn parse_line(line: &str) -> Result<DependencyRecord> {
    let mut columns: Vec<&str> = line.trim().split('\t').collect();
    if columns.len() < 2 {
        // space-separated fallback; the raw line is split so that any
        // leading indentation stays attached to the first column and is
        // trimmed away later by canonicalization
        columns = line.split(' ').collect();
    }
    let mut split = columns.len();
    while split > 0 && columns[split - 1].parse::<f64>().is_ok() {
        split -= 1;
    }
    let (entities, numbers) = columns.split_at(split);
    if entities.is_empty() {
        return Err(AnalysisError::MalformedLine {
            line: line.to_string(),
        });
    }
    let support_count = parse_count(numbers.first(), line)?;
    let confidence = numbers
        .get(1)
        .and_then(|v| v.parse::<f64>().ok())
        .unwrap_or(0.0);
    let commits_count = parse_count(numbers.get(3), line)?;
    let to = entities[entities.len() - 1].to_string();
    let from = entities[..entities.len() - 1]
        .iter()
        .map(|s| s.to_string())
        .collect();
    Ok(DependencyRecord {
        from,
        to,
        support_count,
        confidence,
        commits_count,
    })
}

fn parse_count(field: Option<&&str>, line: &str) -> Result<usize> {
    match field {
        None => Ok(0),
        Some(value) => value.parse().map_err(|_| AnalysisError::InvalidNumber {
            value: value.to_string(),
            line: line.to_string(),
        }),
    }
}
