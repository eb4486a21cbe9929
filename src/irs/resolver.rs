use super::{
    aligner::{write_fasta, AlignmentResult, AlignmentRunner},
    cache::{alignment_key, PropertiesStore},
    relatives::find_close_relatives,
    taxonomy::TaxonomyOracle,
    tiers::{best_overall, Bounds, Tier, END1, END2},
};
use crate::chloroplast::SequenceDesc;
use crate::genome::{Sequence, TaxId};
use crate::utils::{default_num_threads, CircularInterval, Result};
use crossbeam_channel::{bounded, Sender};
use rayon::{
    iter::{IntoParallelIterator, ParallelIterator},
    ThreadPoolBuilder,
};
use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    fmt, fs,
    path::{Path, PathBuf},
    sync::Arc,
    thread,
};
use tempfile::TempDir;

const CHANNEL_BUFFER_SIZE: usize = 2048;
pub const DEFAULT_MATCH_LENGTH: usize = 100;

#[derive(Debug, Clone)]
pub struct ResolverParams {
    /// Bases taken from each end of a relative's IRA.
    pub match_length: usize,
    pub num_threads: usize,
    /// Keeps alignment inputs and outputs under `<work_dir>/find_irs/<seq_id>`.
    /// Without it a temporary directory is used per sequence.
    pub work_dir: Option<PathBuf>,
}

impl Default for ResolverParams {
    fn default() -> Self {
        Self {
            match_length: DEFAULT_MATCH_LENGTH,
            num_threads: default_num_threads(),
            work_dir: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Stop at the first relative whose ends all match.
    FirstNice,
    /// Align every relative and keep the longest IRs of the best tier.
    BestOverall,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    Missing,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::Missing => write!(f, "missing"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrResolution {
    pub ira: Bounds,
    pub irb: Bounds,
    pub donor: String,
    pub tier: Tier,
    pub provenance: Provenance,
}

/// Relative with an annotated partition.
#[derive(Debug, Clone)]
pub struct Donor {
    pub seq: Arc<Sequence>,
    pub ira: CircularInterval,
}

impl Donor {
    pub fn from_desc(desc: &SequenceDesc) -> Option<Self> {
        Some(Self {
            seq: Arc::clone(&desc.seq),
            ira: desc.ira()?,
        })
    }

    /// First and last `match_length` bases of the IRA.
    fn ir_ends(&self, match_length: usize) -> (Vec<u8>, Vec<u8>) {
        let ira = self.ira.extract(&self.seq.bases);
        let length = match_length.min(ira.len());
        (ira[..length].to_vec(), ira[ira.len() - length..].to_vec())
    }
}

pub struct IrResolver<'a> {
    runner: &'a dyn AlignmentRunner,
    store: &'a dyn PropertiesStore,
    params: &'a ResolverParams,
}

impl<'a> IrResolver<'a> {
    pub fn new(
        runner: &'a dyn AlignmentRunner,
        store: &'a dyn PropertiesStore,
        params: &'a ResolverParams,
    ) -> Self {
        Self {
            runner,
            store,
            params,
        }
    }

    /// Aligns the IRA ends of `donors`, in order, onto `target`.
    pub fn resolve(
        &self,
        target: &Sequence,
        donors: &[Donor],
        selection: Selection,
    ) -> Result<Option<IrResolution>> {
        let (_guard, dir) = self.sequence_work_dir(&target.id)?;
        let target_fasta = dir.join(format!("{}.fa", target.id));
        write_fasta(
            &target_fasta,
            &[(target.id.as_str(), target.bases.as_slice())],
        )?;

        let mut collected: Vec<(&Donor, AlignmentResult)> = Vec::new();
        for donor in donors {
            let result = match self.align_donor(target, donor, &dir, &target_fasta) {
                Ok(result) => result,
                Err(e) => {
                    log::warn!(
                        "Sequence {}: alignment of {} IR ends failed: {}",
                        target.id,
                        donor.seq.id,
                        e
                    );
                    continue;
                }
            };
            if selection == Selection::FirstNice {
                if let Some((ira, irb)) = Tier::Nice.interpret(&result) {
                    return Ok(Some(resolution(ira, irb, donor, Tier::Nice)));
                }
            }
            collected.push((donor, result));
        }

        // Nice results were already taken in first-nice mode
        let tiers: &[Tier] = match selection {
            Selection::FirstNice => &[Tier::TwoOne, Tier::OneTwo],
            Selection::BestOverall => &Tier::ALL,
        };
        let results: Vec<AlignmentResult> = collected.iter().map(|(_, r)| r.clone()).collect();
        match best_overall(tiers, &results) {
            Some((tier, index, (ira, irb))) => {
                Ok(Some(resolution(ira, irb, collected[index].0, tier)))
            }
            None => {
                log::warn!("Sequence {}: no relative's IR ends matched", target.id);
                Ok(None)
            }
        }
    }

    fn align_donor(
        &self,
        target: &Sequence,
        donor: &Donor,
        dir: &Path,
        target_fasta: &Path,
    ) -> Result<AlignmentResult> {
        let key = alignment_key(&target.id, &donor.seq.id, self.params.match_length);
        let compute = || -> Result<AlignmentResult> {
            let (end1, end2) = donor.ir_ends(self.params.match_length);
            let query_fasta = dir.join(format!("qry_{}.fa", donor.seq.id));
            write_fasta(&query_fasta, &[(END1, end1.as_slice()), (END2, end2.as_slice())])?;
            self.runner.align(target_fasta, &query_fasta)
        };
        self.store.fetch_or_compute(&key, &compute)
    }

    fn sequence_work_dir(&self, seq_id: &str) -> Result<(Option<TempDir>, PathBuf)> {
        match &self.params.work_dir {
            Some(work_dir) => {
                let dir = work_dir.join("find_irs").join(seq_id);
                fs::create_dir_all(&dir)
                    .map_err(|e| format!("Failed to create {}: {}", dir.display(), e))?;
                Ok((None, dir))
            }
            None => {
                let temp = tempfile::Builder::new()
                    .prefix(&format!("cpir-{}-", seq_id))
                    .tempdir()
                    .map_err(|e| format!("Failed to create temporary directory: {}", e))?;
                let dir = temp.path().to_path_buf();
                Ok((Some(temp), dir))
            }
        }
    }
}

fn resolution(ira: Bounds, irb: Bounds, donor: &Donor, tier: Tier) -> IrResolution {
    IrResolution {
        ira,
        irb,
        donor: donor.seq.id.clone(),
        tier,
        provenance: Provenance::Missing,
    }
}

/// First sequence, in batch order, with an annotated partition per taxid.
fn donors_by_taxid(descs: &[SequenceDesc], exclude: Option<TaxId>) -> BTreeMap<TaxId, usize> {
    let mut by_taxid = BTreeMap::new();
    for (index, desc) in descs.iter().enumerate() {
        if desc.parts.is_none() || desc.took.is_some() {
            continue;
        }
        if let Some(taxid) = desc.taxid {
            if Some(taxid) != exclude {
                by_taxid.entry(taxid).or_insert(index);
            }
        }
    }
    by_taxid
}

fn donors_for(
    descs: &[SequenceDesc],
    desc: &SequenceDesc,
    oracle: &dyn TaxonomyOracle,
    by_taxid: &BTreeMap<TaxId, usize>,
) -> Vec<Donor> {
    let candidates: BTreeSet<TaxId> = by_taxid.keys().copied().collect();
    find_close_relatives(oracle, desc.id(), desc.taxid, desc.max_taxid, &candidates)
        .into_iter()
        .filter_map(|taxid| by_taxid.get(&taxid))
        .filter_map(|&index| Donor::from_desc(&descs[index]))
        .collect()
}

/// Reconstructs IRs of every sequence without an annotated partition from
/// its closest annotated relatives and stores them as taken parts.
pub fn find_missing_partitions(
    descs: &mut [SequenceDesc],
    oracle: &dyn TaxonomyOracle,
    resolver: &IrResolver,
) -> Result<HashMap<String, IrResolution>> {
    let missing = descs
        .iter()
        .filter(|d| d.parts.is_none() && d.took.is_none())
        .count();
    if missing == 0 {
        return Ok(HashMap::new());
    }
    let by_taxid = donors_by_taxid(descs, None);
    if by_taxid.is_empty() {
        log::warn!("All genomes miss IR parts");
        return Ok(HashMap::new());
    }

    let batch: &[SequenceDesc] = descs;
    let jobs: Vec<(Arc<Sequence>, Vec<Donor>)> = batch
        .iter()
        .filter(|d| d.parts.is_none() && d.took.is_none())
        .filter_map(|desc| {
            let donors = donors_for(batch, desc, oracle, &by_taxid);
            (!donors.is_empty()).then(|| (Arc::clone(&desc.seq), donors))
        })
        .collect();
    log::info!(
        "Reconstructing IRs of {} of {} sequence(s) without partition",
        jobs.len(),
        missing
    );

    let (sender, receiver) = bounded(CHANNEL_BUFFER_SIZE);
    let aggregator = thread::spawn(move || {
        let mut resolved = HashMap::new();
        for (seq_id, resolution) in &receiver {
            if let Some(resolution) = resolution {
                resolved.insert(seq_id, resolution);
            }
        }
        resolved
    });

    let pool = initialize_thread_pool(resolver.params.num_threads)?;
    pool.install(|| {
        jobs.into_par_iter()
            .for_each_with(&sender, |s, (target, donors)| {
                resolve_target(resolver, &target, &donors, s)
            });
    });

    drop(sender);
    let mut resolved = aggregator
        .join()
        .map_err(|_| "Result aggregation thread panicked".to_string())?;

    for desc in descs.iter_mut() {
        let Some(resolution) = resolved.get(desc.id()) else {
            continue;
        };
        match desc.set_took_parts(resolution.clone()) {
            Ok(()) => log::info!(
                "Sequence {}: IRs {:?} and {:?} taken from {} ({})",
                desc.id(),
                resolution.ira,
                resolution.irb,
                resolution.donor,
                resolution.tier
            ),
            Err(e) => {
                log::error!("{}", e);
                resolved.remove(desc.id());
            }
        }
    }
    Ok(resolved)
}

fn resolve_target(
    resolver: &IrResolver,
    target: &Sequence,
    donors: &[Donor],
    sender: &Sender<(String, Option<IrResolution>)>,
) {
    let resolution = match resolver.resolve(target, donors, Selection::FirstNice) {
        Ok(resolution) => resolution,
        Err(e) => {
            log::error!("Error resolving IRs of {}: {}", target.id, e);
            None
        }
    };
    if let Err(e) = sender.send((target.id.clone(), resolution)) {
        log::error!("Failed to send IR resolution to aggregator: {}", e);
    }
}

/// Best IRs for one sequence from all annotated relatives of other taxa.
pub fn find_best_irs_by_similar(
    descs: &[SequenceDesc],
    seq_id: &str,
    oracle: &dyn TaxonomyOracle,
    resolver: &IrResolver,
) -> Result<Option<IrResolution>> {
    let desc = descs
        .iter()
        .find(|d| d.id() == seq_id)
        .ok_or_else(|| format!("Unknown sequence identifier: {}", seq_id))?;
    let by_taxid = donors_by_taxid(descs, desc.taxid);
    if by_taxid.is_empty() {
        log::warn!("All genomes miss IR parts");
        return Ok(None);
    }
    let donors = donors_for(descs, desc, oracle, &by_taxid);
    if donors.is_empty() {
        return Ok(None);
    }
    resolver.resolve(&desc.seq, &donors, Selection::BestOverall)
}

fn initialize_thread_pool(num_threads: usize) -> Result<rayon::ThreadPool> {
    ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .thread_name(|i| format!("cpir-{}", i))
        .build()
        .map_err(|e| format!("Failed to initialize thread pool: {}", e))
}
