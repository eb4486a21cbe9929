use crate::chloroplast::SequenceDesc;
use crate::cli::InputArgs;
use crate::genome::{Metadata, SequenceStore};
use crate::irs::{NucmerRunner, ResolverParams, TaxonomyTree};
use crate::utils::{default_num_threads, Result};

/// Sequences of one run with their taxonomy.
pub struct Batch {
    pub descs: Vec<SequenceDesc>,
    pub taxonomy: TaxonomyTree,
}

impl Batch {
    pub fn load(input: &InputArgs) -> Result<Self> {
        let store = SequenceStore::from_paths(&input.genbank_paths)?;
        if store.is_empty() {
            return Err("No sequences found in the GenBank input".to_string());
        }
        log::info!("Loaded {} sequence(s)", store.len());

        let metadata = match &input.metadata_path {
            Some(path) => Metadata::from_path(path)?,
            None => Metadata::default(),
        };
        let descs: Vec<SequenceDesc> = store
            .iter()
            .map(|seq| {
                let entry = metadata.get(&seq.id);
                let taxid = entry.taxid.or(seq.taxon_id);
                let max_taxid = entry.max_taxid.or(input.max_taxid);
                SequenceDesc::new(seq.clone(), taxid, max_taxid)
            })
            .collect();
        let with_parts = descs.iter().filter(|d| d.parts.is_some()).count();
        log::info!(
            "{} of {} sequence(s) have an annotated IR partition",
            with_parts,
            descs.len()
        );

        let taxonomy = TaxonomyTree::from_path(&input.nodes_path)?;
        Ok(Self { descs, taxonomy })
    }

    pub fn needs_alignment(&self) -> bool {
        self.descs.iter().any(|d| d.parts.is_none())
    }
}

pub fn resolver_params(input: &InputArgs) -> ResolverParams {
    ResolverParams {
        match_length: input.match_length,
        num_threads: input.num_threads.unwrap_or_else(default_num_threads),
        work_dir: input.work_dir.clone(),
    }
}

pub fn nucmer_runner(input: &InputArgs) -> NucmerRunner {
    let runner = match &input.nucmer_exe {
        Some(exe) => NucmerRunner::new(exe),
        None => NucmerRunner::default(),
    };
    if let Err(e) = runner.check() {
        log::warn!("{}", e);
    }
    runner
}
