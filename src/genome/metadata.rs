use super::sequence::TaxId;
use crate::utils::{open_table_reader, split_table_line, Result};
use std::{collections::HashMap, io::BufRead, path::Path};

/// Per-sequence taxonomy settings read from a tab separated table with
/// columns `seq_id`, `taxid` and optionally `max_taxid`. Empty, `-` or
/// missing values keep whatever the GenBank record or command line provides.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Metadata {
    entries: HashMap<String, MetadataEntry>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct MetadataEntry {
    pub taxid: Option<TaxId>,
    pub max_taxid: Option<TaxId>,
}

impl Metadata {
    pub fn from_path(path: &Path) -> Result<Self> {
        Self::from_reader(open_table_reader(path)?)
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut entries = HashMap::new();
        for (line_number, line) in reader.lines().enumerate() {
            let line =
                line.map_err(|e| format!("Error reading line {}: {}", line_number + 1, e))?;
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            let fields = split_table_line(&line);
            let seq_id = fields[0];
            let parse_taxid = |index: usize| -> Result<Option<TaxId>> {
                match fields.get(index).copied() {
                    None | Some("") | Some("-") => Ok(None),
                    Some(value) => value.parse().map(Some).map_err(|_| {
                        format!("Invalid taxid at line {}: {}", line_number + 1, value)
                    }),
                }
            };
            let entry = MetadataEntry {
                taxid: parse_taxid(1)?,
                max_taxid: parse_taxid(2)?,
            };
            if entries.insert(seq_id.to_string(), entry).is_some() {
                return Err(format!(
                    "Duplicate sequence entry at line {}: {}",
                    line_number + 1,
                    seq_id
                ));
            }
        }
        Ok(Self { entries })
    }

    pub fn get(&self, seq_id: &str) -> MetadataEntry {
        self.entries.get(seq_id).copied().unwrap_or_default()
    }
}
