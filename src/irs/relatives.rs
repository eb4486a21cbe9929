use super::taxonomy::TaxonomyOracle;
use crate::genome::TaxId;
use std::collections::BTreeSet;

/// Candidate taxa closest to the sequence's taxon, closest first.
pub fn find_close_relatives(
    oracle: &dyn TaxonomyOracle,
    seq_id: &str,
    taxid: Option<TaxId>,
    max_taxid: Option<TaxId>,
    candidates: &BTreeSet<TaxId>,
) -> Vec<TaxId> {
    let Some(taxid) = taxid else {
        log::warn!("Sequence {} has no taxid, cannot look for relatives", seq_id);
        return Vec::new();
    };
    let relatives = oracle.close_taxa(taxid, max_taxid, candidates);
    if relatives.is_empty() {
        log::warn!(
            "Sequence {} doesn't have close relative with IR partition",
            seq_id
        );
    } else {
        log::debug!("Sequence {} relatives: {:?}", seq_id, relatives);
    }
    relatives
}
