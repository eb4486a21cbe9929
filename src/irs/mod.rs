mod aligner;
mod cache;
mod delta;
mod relatives;
mod resolver;
mod taxonomy;
mod tiers;

pub use aligner::{write_fasta, AlignmentMatch, AlignmentResult, AlignmentRunner, NucmerRunner};
pub use cache::{alignment_key, MemoryStore, NoStore, PropertiesStore};
pub use delta::{parse_delta, read_delta};
pub use relatives::find_close_relatives;
pub use resolver::{
    find_best_irs_by_similar, find_missing_partitions, Donor, IrResolution, IrResolver,
    Provenance, ResolverParams, Selection, DEFAULT_MATCH_LENGTH,
};
pub use taxonomy::{TaxonomyOracle, TaxonomyTree};
pub use tiers::{best_of_tier, best_overall, ir_span, Bounds, Tier, END1, END2};
