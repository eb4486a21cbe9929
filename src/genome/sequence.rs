use super::feature::{Feature, FeatureKind};
use crate::utils::Result;
use gb_io::seq::{Seq, Topology};

pub type TaxId = u32;

/// Circular genome with the features needed for partitioning.
#[derive(Debug, Clone)]
pub struct Sequence {
    pub id: String,
    pub taxon_id: Option<TaxId>,
    pub bases: Vec<u8>,
    pub features: Vec<Feature>,
}

impl Sequence {
    pub fn new(
        id: impl Into<String>,
        taxon_id: Option<TaxId>,
        bases: Vec<u8>,
        features: Vec<Feature>,
    ) -> Result<Self> {
        let id = id.into();
        if bases.is_empty() {
            return Err(format!("Sequence {} is empty", id));
        }
        Ok(Self {
            id,
            taxon_id,
            bases,
            features,
        })
    }

    pub fn from_genbank(record: Seq) -> Result<Self> {
        let id = record
            .accession
            .clone()
            .or_else(|| record.name.clone())
            .ok_or("GenBank record without accession or locus name")?;
        if record.topology == Topology::Linear {
            log::debug!("{}: record is linear, treating it as circular", id);
        }

        let taxon_id = record
            .features
            .iter()
            .filter(|f| f.kind.to_string() == "source")
            .flat_map(|f| f.qualifier_values("db_xref"))
            .find_map(|xref| xref.strip_prefix("taxon:").and_then(|t| t.parse().ok()));

        let mut features = Vec::new();
        for gb_feature in &record.features {
            if let Some(feature) =
                Feature::from_genbank(gb_feature).map_err(|e| format!("{}: {}", id, e))?
            {
                features.push(feature);
            }
        }

        let bases = record.seq.to_ascii_uppercase();
        Self::new(id, taxon_id, bases, features)
    }

    pub fn len(&self) -> usize {
        self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    /// Features of one kind, deduplicated by name: a later feature with an
    /// already seen name is kept only if it does not overlap any kept copy.
    /// Original feature order is preserved.
    pub fn unique_features<F>(&self, predicate: F) -> Vec<&Feature>
    where
        F: Fn(&Feature) -> bool,
    {
        let mut kept: Vec<&Feature> = Vec::new();
        for feature in self.features.iter().filter(|f| predicate(f)) {
            let name = feature.name();
            let overlaps_same_name = kept
                .iter()
                .any(|k| k.name() == name && k.location.intersects(&feature.location));
            if !overlaps_same_name {
                kept.push(feature);
            }
        }
        kept
    }

    pub fn genes(&self) -> Vec<&Feature> {
        self.unique_features(|f| matches!(f.kind, FeatureKind::Gene { .. }))
    }

    pub fn cds(&self) -> Vec<&Feature> {
        self.unique_features(|f| matches!(f.kind, FeatureKind::Cds { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::Location;
    use crate::utils::Strand;

    fn gene(name: &str, start: usize, end: usize) -> Feature {
        Feature {
            kind: FeatureKind::Gene {
                name: name.to_string(),
            },
            location: Location::Simple(start..end),
            strand: Strand::Forward,
        }
    }

    #[test]
    fn unique_genes_drop_overlapping_duplicates() {
        let features = vec![
            gene("rps12", 0, 100),
            gene("psbA", 200, 300),
            gene("rps12", 50, 150),
            gene("rps12", 500, 600),
        ];
        let seq = Sequence::new("s1", None, vec![b'A'; 1000], features).unwrap();
        let genes = seq.genes();
        let names: Vec<_> = genes.iter().map(|g| g.name().unwrap()).collect();
        assert_eq!(names, vec!["rps12", "psbA", "rps12"]);
        assert_eq!(genes[2].location, Location::Simple(500..600));
    }

    #[test]
    fn from_genbank_record() {
        use gb_io::seq::{Feature as GbFeature, Location as GbLocation};

        let mut record = Seq::empty();
        record.name = Some("LOCUS1".to_string());
        record.accession = Some("NC_000932".to_string());
        record.seq = b"acgtacgtac".to_vec();
        record.features = vec![
            GbFeature {
                kind: "source".into(),
                location: GbLocation::simple_range(0, 10),
                qualifiers: vec![("db_xref".into(), Some("taxon:3702".to_string()))],
            },
            GbFeature {
                kind: "gene".into(),
                location: GbLocation::simple_range(2, 6),
                qualifiers: vec![("gene".into(), Some("psbA".to_string()))],
            },
        ];
        let seq = Sequence::from_genbank(record).unwrap();
        assert_eq!(seq.id, "NC_000932");
        assert_eq!(seq.taxon_id, Some(3702));
        assert_eq!(seq.bases, b"ACGTACGTAC".to_vec());
        assert_eq!(seq.features.len(), 1);
        assert_eq!(seq.genes().len(), 1);
    }

    #[test]
    fn empty_sequence_err() {
        assert_eq!(
            Sequence::new("s1", None, Vec::new(), Vec::new()).err(),
            Some("Sequence s1 is empty".to_string())
        );
    }
}
