//! Reader for MUMmer delta files.
//!
//! ```text
//! /path/target.fa /path/query.fa
//! NUCMER
//! >target query target_length query_length
//! s1 e1 s2 e2 errors similarity_errors stop_codons
//! indel distances, one per line, terminated by 0
//! ```
//! Coordinates are 1-based and inclusive. A reversed query interval marks a
//! match on the reverse strand.

use super::aligner::{AlignmentMatch, AlignmentResult};
use crate::utils::{open_table_reader, Result};
use std::{io::BufRead, path::Path};

pub fn read_delta(path: &Path) -> Result<AlignmentResult> {
    let reader = open_table_reader(path)?;
    parse_delta(reader).map_err(|e| format!("File {}: {}", path.display(), e))
}

pub fn parse_delta<R: BufRead>(reader: R) -> Result<AlignmentResult> {
    let mut lines = reader.lines().enumerate();
    let mut next_line = |expected: &str| -> Result<String> {
        match lines.next() {
            Some((line_number, line)) => {
                line.map_err(|e| format!("Error reading line {}: {}", line_number + 1, e))
            }
            None => Err(format!("Missing {} line", expected)),
        }
    };
    next_line("file paths")?;
    let program = next_line("program")?;
    if program != "NUCMER" && program != "PROMER" {
        return Err(format!("Unexpected alignment program: {}", program));
    }

    let mut matches = Vec::new();
    let mut current: Option<(String, String)> = None;
    for (line_number, line) in lines {
        let line = line.map_err(|e| format!("Error reading line {}: {}", line_number + 1, e))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(header) = line.strip_prefix('>') {
            let mut fields = header.split_whitespace();
            match (fields.next(), fields.next()) {
                (Some(target), Some(query)) => {
                    current = Some((target.to_string(), query.to_string()))
                }
                _ => {
                    return Err(format!(
                        "Invalid header at line {}: {}",
                        line_number + 1,
                        line
                    ))
                }
            }
            continue;
        }

        let values = line
            .split_whitespace()
            .map(|v| v.parse::<i64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| format!("Invalid record at line {}: {}", line_number + 1, line))?;
        match values.len() {
            1 => continue,
            7 => {
                let (target, query) = current.as_ref().ok_or_else(|| {
                    format!("Alignment before any header at line {}", line_number + 1)
                })?;
                let (s1, e1, s2, e2) = (values[0], values[1], values[2], values[3]);
                matches.push(AlignmentMatch {
                    target: target.clone(),
                    query: query.clone(),
                    start: s1.min(e1) - 1,
                    end: s1.max(e1),
                    positive: (s2 <= e2) == (s1 <= e1),
                });
            }
            _ => {
                return Err(format!(
                    "Invalid record at line {}: {}",
                    line_number + 1,
                    line
                ))
            }
        }
    }
    Ok(AlignmentResult::new(matches))
}
