use super::sequence::Sequence;
use crate::utils::{open_table_reader, Result};
use gb_io::reader::SeqReader;
use std::{collections::HashMap, path::Path, sync::Arc};

/// Source of sequences and their annotation.
pub trait SequenceProvider: Send + Sync {
    fn get_sequence(&self, seq_id: &str) -> Result<Arc<Sequence>>;

    fn get_length(&self, seq_id: &str) -> Result<usize> {
        Ok(self.get_sequence(seq_id)?.len())
    }
}

/// Sequences loaded from GenBank files, kept in input order.
#[derive(Debug, Default)]
pub struct SequenceStore {
    sequences: Vec<Arc<Sequence>>,
    index: HashMap<String, usize>,
}

impl SequenceStore {
    /// Loads every record of every file. A record that cannot be converted is
    /// logged and skipped; unreadable files and duplicate ids are errors.
    pub fn from_paths(paths: &[impl AsRef<Path>]) -> Result<Self> {
        let mut store = SequenceStore::default();
        for path in paths {
            let path = path.as_ref();
            let reader = open_table_reader(path)?;
            let mut record_count = 0;
            for (record_index, record) in SeqReader::new(reader).enumerate() {
                let record = record.map_err(|e| {
                    format!(
                        "Error at GenBank record {} of {}: {}",
                        record_index + 1,
                        path.display(),
                        e
                    )
                })?;
                match Sequence::from_genbank(record) {
                    Ok(sequence) => {
                        store.insert(sequence)?;
                        record_count += 1;
                    }
                    Err(e) => log::error!("Skipping record in {}: {}", path.display(), e),
                }
            }
            log::debug!("Loaded {} record(s) from {}", record_count, path.display());
        }
        Ok(store)
    }

    pub fn insert(&mut self, sequence: Sequence) -> Result<()> {
        if self.index.contains_key(&sequence.id) {
            return Err(format!("Duplicate sequence identifier: {}", sequence.id));
        }
        self.index.insert(sequence.id.clone(), self.sequences.len());
        self.sequences.push(Arc::new(sequence));
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Sequence>> {
        self.sequences.iter()
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}

impl SequenceProvider for SequenceStore {
    fn get_sequence(&self, seq_id: &str) -> Result<Arc<Sequence>> {
        self.index
            .get(seq_id)
            .map(|&i| Arc::clone(&self.sequences[i]))
            .ok_or_else(|| format!("Unknown sequence identifier: {}", seq_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gb_io::seq::{Feature as GbFeature, Location as GbLocation, Seq};
    use std::fs::File;

    fn record(id: &str, gene_qualifier: &str) -> Seq {
        let mut record = Seq::empty();
        record.name = Some(id.to_string());
        record.accession = Some(id.to_string());
        record.seq = b"ACGT".repeat(50);
        record.len = Some(record.seq.len());
        record.features = vec![GbFeature {
            kind: "gene".into(),
            location: GbLocation::simple_range(10, 100),
            qualifiers: vec![(gene_qualifier.to_string().into(), Some("psbA".to_string()))],
        }];
        record
    }

    #[test]
    fn malformed_record_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch.gb");
        let file = File::create(&path).unwrap();
        for seq in [record("GOOD1", "gene"), record("BAD", "locus_tag"), record("GOOD2", "gene")] {
            gb_io::writer::write(&file, &seq).unwrap();
        }
        drop(file);

        let store = SequenceStore::from_paths(&[&path]).unwrap();
        let ids: Vec<_> = store.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["GOOD1", "GOOD2"]);
        assert!(store.get_sequence("BAD").is_err());
    }

    #[test]
    fn lookup_and_duplicates() {
        let mut store = SequenceStore::default();
        store
            .insert(Sequence::new("NC_1", Some(1), b"ACGT".to_vec(), Vec::new()).unwrap())
            .unwrap();
        assert_eq!(store.get_length("NC_1").unwrap(), 4);
        assert!(store.get_sequence("NC_2").is_err());
        let duplicate = Sequence::new("NC_1", None, b"AC".to_vec(), Vec::new()).unwrap();
        assert_eq!(
            store.insert(duplicate),
            Err("Duplicate sequence identifier: NC_1".to_string())
        );
    }
}
