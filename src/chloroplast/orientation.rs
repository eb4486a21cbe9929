use super::partition::{PartName, Partition};
use crate::genome::Feature;
use itertools::Itertools;

/// Whether the marker genes of each part follow the usual plastome orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartOrientation {
    pub lsc: bool,
    pub ira: bool,
    pub ssc: bool,
}

impl PartOrientation {
    pub fn non_conforming(&self) -> Vec<PartName> {
        [
            (PartName::Lsc, self.lsc),
            (PartName::Ira, self.ira),
            (PartName::Ssc, self.ssc),
        ]
        .into_iter()
        .filter_map(|(name, conforming)| (!conforming).then_some(name))
        .collect()
    }

    /// Comma separated non-conforming parts, `None` when all parts conform.
    pub fn describe(&self) -> Option<String> {
        let parts = self.non_conforming();
        if parts.is_empty() {
            None
        } else {
            Some(parts.iter().join(","))
        }
    }
}

fn strand_sum(genes: &[&Feature], marker: impl Fn(&str) -> bool) -> i64 {
    genes
        .iter()
        .filter(|g| g.name().is_some_and(|name| marker(name)))
        .map(|g| g.strand.sign())
        .sum()
}

/// LSC ribosomal protein genes and SSC genes are expected mostly on the
/// reverse strand, IRA rRNA genes on the forward strand. A zero sum conforms.
pub fn check_orientation(partition: &Partition, genes: &[&Feature]) -> PartOrientation {
    let in_parts = partition.put_features_in_parts(genes);
    let lsc = strand_sum(&in_parts[PartName::Lsc.index()], |name| {
        name.contains("rpl") || name.contains("rps")
    });
    let ssc = strand_sum(&in_parts[PartName::Ssc.index()], |_| true);
    let ira = strand_sum(&in_parts[PartName::Ira.index()], |name| name.contains("rrn"));
    PartOrientation {
        lsc: lsc <= 0,
        ira: ira >= 0,
        ssc: ssc <= 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::{FeatureKind, Location};
    use crate::utils::Strand;

    fn gene(name: &str, start: usize, strand: Strand) -> Feature {
        Feature {
            kind: FeatureKind::Gene {
                name: name.to_string(),
            },
            location: Location::Simple(start..start + 10),
            strand,
        }
    }

    fn partition() -> Partition {
        // lsc 0..600, ira 600..700, ssc 700..900, irb 900..1000
        Partition::from_ir_bounds(1000, (600, 700), (900, 1000)).unwrap()
    }

    #[test]
    fn conforming_plastome() {
        let genes = [
            gene("rps16", 10, Strand::Reverse),
            gene("rpl2", 100, Strand::Reverse),
            gene("psbA", 200, Strand::Forward),
            gene("rrn16", 610, Strand::Forward),
            gene("ndhF", 710, Strand::Reverse),
        ];
        let refs: Vec<&Feature> = genes.iter().collect();
        let orientation = check_orientation(&partition(), &refs);
        assert_eq!(
            orientation,
            PartOrientation {
                lsc: true,
                ira: true,
                ssc: true
            }
        );
        assert_eq!(orientation.describe(), None);
    }

    #[test]
    fn flipped_lsc_and_ssc() {
        let genes = [
            gene("rps16", 10, Strand::Forward),
            gene("ndhF", 710, Strand::Forward),
            gene("ycf1", 750, Strand::Reverse),
            gene("ndhD", 800, Strand::Forward),
        ];
        let refs: Vec<&Feature> = genes.iter().collect();
        let orientation = check_orientation(&partition(), &refs);
        assert_eq!(orientation.non_conforming(), vec![PartName::Lsc, PartName::Ssc]);
        assert_eq!(orientation.describe(), Some("lsc,ssc".to_string()));
    }

    #[test]
    fn ira_without_rrn_genes_conforms() {
        let genes = [gene("ycf2", 610, Strand::Reverse)];
        let refs: Vec<&Feature> = genes.iter().collect();
        assert!(check_orientation(&partition(), &refs).ira);
    }

    #[test]
    fn ira_reversed_rrn() {
        let genes = [gene("rrn23", 610, Strand::Reverse)];
        let refs: Vec<&Feature> = genes.iter().collect();
        assert_eq!(
            check_orientation(&partition(), &refs).describe(),
            Some("ira".to_string())
        );
    }
}
