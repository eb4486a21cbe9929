use super::{
    orientation::check_orientation,
    partition::{find_partition, PartName, Partition},
    parts_desc::PartsDesc,
};
use crate::genome::{Sequence, TaxId};
use crate::irs::IrResolution;
use crate::utils::{CircularInterval, Result};
use std::sync::Arc;

/// Partition reconstructed from a relative's inverted repeats.
#[derive(Debug, Clone)]
pub struct TookParts {
    pub partition: Partition,
    pub resolution: IrResolution,
}

/// Analysis state of one sequence in a batch.
#[derive(Debug, Clone)]
pub struct SequenceDesc {
    pub seq: Arc<Sequence>,
    pub taxid: Option<TaxId>,
    pub max_taxid: Option<TaxId>,
    pub parts: Option<Partition>,
    pub took: Option<TookParts>,
}

/// One report row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceSummary {
    pub seq_id: String,
    pub length: usize,
    pub taxid: Option<TaxId>,
    pub num_genes: usize,
    pub num_cds: usize,
    pub parts: Option<PartsDesc>,
    pub offset: Option<i64>,
    pub trnh_gug: Option<i64>,
    pub part_orientation: Option<String>,
    pub irs_took_from: Option<String>,
    pub took_part_starts: Option<[i64; 4]>,
}

impl SequenceDesc {
    /// Looks for the partition in the sequence's own annotation. A malformed
    /// annotation is logged and leaves the sequence without a partition.
    pub fn new(seq: Arc<Sequence>, taxid: Option<TaxId>, max_taxid: Option<TaxId>) -> Self {
        let parts = find_partition(&seq).unwrap_or_else(|e| {
            log::error!("{}", e);
            None
        });
        if parts.is_none() {
            log::info!("Sequence {} has no annotated IR partition", seq.id);
        }
        Self {
            seq,
            taxid,
            max_taxid,
            parts,
            took: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.seq.id
    }

    /// IRA of the annotated partition, used as query source for relatives.
    pub fn ira(&self) -> Option<CircularInterval> {
        self.parts.as_ref().map(|p| p.part(PartName::Ira).interval)
    }

    pub fn set_took_parts(&mut self, resolution: IrResolution) -> Result<()> {
        let partition = Partition::from_ir_bounds(self.seq.len(), resolution.ira, resolution.irb)
            .map_err(|e| format!("{}: IRs from {}: {}", self.id(), resolution.donor, e))?;
        self.took = Some(TookParts {
            partition,
            resolution,
        });
        Ok(())
    }

    /// Reconstructed partition when there is one, else the annotated one.
    pub fn best_partition(&self) -> Option<&Partition> {
        self.took
            .as_ref()
            .map(|t| &t.partition)
            .or(self.parts.as_ref())
    }

    pub fn summary(&self) -> SequenceSummary {
        let genes = self.seq.genes();
        let num_cds = self.seq.cds().len();
        let parts = self.parts.as_ref().map(|p| PartsDesc::new(p, Some(genes.as_slice())));

        let (offset, trnh_gug, part_orientation) = match self.best_partition() {
            Some(partition) => {
                let best = PartsDesc::new(partition, Some(genes.as_slice()));
                let orientation = check_orientation(partition, &genes).describe();
                if let Some(flipped) = &orientation {
                    log::warn!(
                        "Sequence {} has non-standard orientation of parts: {}",
                        self.id(),
                        flipped
                    );
                }
                (Some(best.offset), best.trnh_gug, orientation)
            }
            None => (None, None, None),
        };

        SequenceSummary {
            seq_id: self.id().to_string(),
            length: self.seq.len(),
            taxid: self.taxid,
            num_genes: genes.len(),
            num_cds,
            parts,
            offset,
            trnh_gug,
            part_orientation,
            irs_took_from: self.took.as_ref().map(|t| t.resolution.donor.clone()),
            took_part_starts: self
                .took
                .as_ref()
                .map(|t| PartsDesc::new(&t.partition, None).starts),
        }
    }
}
