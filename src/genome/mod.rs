mod feature;
mod metadata;
mod sequence;
mod store;

pub use feature::{Feature, FeatureKind, Location, RepeatType};
pub use metadata::{Metadata, MetadataEntry};
pub use sequence::{Sequence, TaxId};
pub use store::{SequenceProvider, SequenceStore};
