use crate::genome::TaxId;
use crate::utils::{open_table_reader, split_table_line, Result};
use std::{
    collections::{BTreeSet, HashMap},
    io::BufRead,
    path::Path,
};

/// Relatedness between taxa.
pub trait TaxonomyOracle: Send + Sync {
    /// Candidate taxa related to `taxid` through an ancestor no higher than
    /// `max_taxid`, closest first. `None` leaves the search unbounded.
    fn close_taxa(
        &self,
        taxid: TaxId,
        max_taxid: Option<TaxId>,
        candidates: &BTreeSet<TaxId>,
    ) -> Vec<TaxId>;
}

/// Taxonomy tree read from an NCBI `nodes.dmp` table.
#[derive(Debug, Clone, Default)]
pub struct TaxonomyTree {
    parents: HashMap<TaxId, TaxId>,
}

impl TaxonomyTree {
    pub fn from_path(path: &Path) -> Result<Self> {
        let tree = Self::from_reader(open_table_reader(path)?)
            .map_err(|e| format!("File {}: {}", path.display(), e))?;
        log::debug!("Loaded {} taxonomy nodes from {}", tree.len(), path.display());
        Ok(tree)
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut parents = HashMap::new();
        for (line_number, line) in reader.lines().enumerate() {
            let line =
                line.map_err(|e| format!("Error reading line {}: {}", line_number + 1, e))?;
            if line.trim().is_empty() {
                continue;
            }
            let fields = split_table_line(&line);
            if fields.len() < 2 {
                return Err(format!("Invalid node at line {}: {}", line_number + 1, line));
            }
            let parse = |value: &str| -> Result<TaxId> {
                value
                    .parse()
                    .map_err(|_| format!("Invalid taxid at line {}: {}", line_number + 1, value))
            };
            parents.insert(parse(fields[0])?, parse(fields[1])?);
        }
        Ok(Self { parents })
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Path from `taxid` up to the root, `taxid` included. `None` for unknown taxa.
    pub fn lineage(&self, taxid: TaxId) -> Option<Vec<TaxId>> {
        let mut lineage = vec![taxid];
        let mut current = *self.parents.get(&taxid)?;
        let mut node = taxid;
        while current != node && lineage.len() <= self.parents.len() {
            lineage.push(current);
            node = current;
            current = match self.parents.get(&node) {
                Some(parent) => *parent,
                None => break,
            };
        }
        Some(lineage)
    }
}

impl TaxonomyOracle for TaxonomyTree {
    fn close_taxa(
        &self,
        taxid: TaxId,
        max_taxid: Option<TaxId>,
        candidates: &BTreeSet<TaxId>,
    ) -> Vec<TaxId> {
        let Some(mut ancestors) = self.lineage(taxid) else {
            log::warn!("Taxid {} not found in taxonomy", taxid);
            return Vec::new();
        };
        if let Some(max_taxid) = max_taxid {
            match ancestors.iter().position(|&t| t == max_taxid) {
                Some(index) => ancestors.truncate(index + 1),
                None => {
                    log::warn!("Taxid {} is not an ancestor of {}", max_taxid, taxid);
                    return Vec::new();
                }
            }
        }
        let depth_from_target: HashMap<TaxId, usize> = ancestors
            .iter()
            .enumerate()
            .map(|(depth, &t)| (t, depth))
            .collect();

        let mut ranked: Vec<(usize, usize, TaxId)> = Vec::new();
        for &candidate in candidates {
            let Some(lineage) = self.lineage(candidate) else {
                log::debug!("Candidate taxid {} not found in taxonomy", candidate);
                continue;
            };
            let common = lineage
                .iter()
                .enumerate()
                .find_map(|(steps, t)| depth_from_target.get(t).map(|&depth| (depth, steps)));
            if let Some((depth, steps)) = common {
                ranked.push((depth, depth + steps, candidate));
            }
        }
        ranked.sort_unstable();
        ranked.into_iter().map(|(_, _, candidate)| candidate).collect()
    }
}
