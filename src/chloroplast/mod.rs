mod orientation;
mod partition;
mod parts_desc;
mod sequence_desc;

pub use orientation::{check_orientation, PartOrientation};
pub use partition::{find_chloroplast_irs, find_partition, Part, PartName, Partition};
pub use parts_desc::{trnh_gug_offset, PartsDesc};
pub use sequence_desc::{SequenceDesc, SequenceSummary, TookParts};
