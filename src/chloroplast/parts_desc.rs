use super::partition::{PartName, Partition};
use crate::genome::Feature;
use crate::utils::circular_offset;

const TRNH_GUG: &str = "trnH-GUG";

/// Numbers describing a partition in the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartsDesc {
    /// LSC start as a signed offset from the origin, then raw IRA, SSC and IRB starts.
    pub starts: [i64; 4],
    pub lengths: [usize; 4],
    pub num_genes: Option<[usize; 4]>,
    pub offset: i64,
    pub trnh_gug: Option<i64>,
}

impl PartsDesc {
    pub fn new(partition: &Partition, genes: Option<&[&Feature]>) -> Self {
        let seq_length = partition.seq_length;
        let offset = circular_offset(seq_length, partition.part(PartName::Lsc).real_start());

        let mut starts = [0i64; 4];
        let mut lengths = [0usize; 4];
        for name in PartName::ALL {
            let part = partition.part(name);
            starts[name.index()] = part.real_start() as i64;
            lengths[name.index()] = part.len();
        }
        starts[PartName::Lsc.index()] = offset;

        let (num_genes, trnh_gug) = match genes {
            Some(genes) => {
                let buckets = partition.put_features_in_parts(genes);
                let counts = [0, 1, 2, 3].map(|i| buckets[i].len());
                (Some(counts), trnh_gug_offset(seq_length, offset, genes))
            }
            None => (None, None),
        };

        Self {
            starts,
            lengths,
            num_genes,
            offset,
            trnh_gug,
        }
    }
}

/// Smallest signed distance from the LSC start to a trnH-GUG gene.
pub fn trnh_gug_offset(seq_length: usize, lsc_offset: i64, genes: &[&Feature]) -> Option<i64> {
    genes
        .iter()
        .filter(|g| g.name() == Some(TRNH_GUG))
        .map(|g| {
            let relative = (g.location.start() as i64 - lsc_offset).rem_euclid(seq_length as i64);
            circular_offset(seq_length, relative as usize)
        })
        .min()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::{FeatureKind, Location};
    use crate::utils::Strand;

    fn gene(name: &str, start: usize) -> Feature {
        Feature {
            kind: FeatureKind::Gene {
                name: name.to_string(),
            },
            location: Location::Simple(start..start + 5),
            strand: Strand::Reverse,
        }
    }

    #[test]
    fn parts_desc_with_lsc_across_origin() {
        // irs 300..400 and 700..800, ssc 400..700, lsc 800..300
        let partition = Partition::from_ir_bounds(1000, (300, 400), (700, 800)).unwrap();
        let genes = [gene("trnH-GUG", 810), gene("psbA", 900), gene("rrn16", 350), gene("ndhF", 500)];
        let refs: Vec<&Feature> = genes.iter().collect();
        let desc = PartsDesc::new(&partition, Some(refs.as_slice()));
        assert_eq!(desc.offset, -200);
        assert_eq!(desc.starts, [-200, 300, 400, 700]);
        assert_eq!(desc.lengths, [500, 100, 300, 100]);
        assert_eq!(desc.num_genes, Some([2, 1, 1, 0]));
        assert_eq!(desc.trnh_gug, Some(10));
    }

    #[test]
    fn trnh_gug_before_lsc_start_is_negative() {
        let genes = [gene("trnH-GUG", 95), gene("trnH-GUG", 130)];
        let refs: Vec<&Feature> = genes.iter().collect();
        assert_eq!(trnh_gug_offset(1000, 100, &refs), Some(-5));
        assert_eq!(trnh_gug_offset(1000, 100, &[]), None);
    }

    #[test]
    fn parts_desc_without_genes() {
        let partition = Partition::from_ir_bounds(1000, (600, 700), (900, 1000)).unwrap();
        let desc = PartsDesc::new(&partition, None);
        assert_eq!(desc.starts, [0, 600, 700, 900]);
        assert_eq!(desc.num_genes, None);
        assert_eq!(desc.trnh_gug, None);
    }
}
