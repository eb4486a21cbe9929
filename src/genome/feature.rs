//! Typed view of the GenBank features the chloroplast analysis relies on.
//!
//! Only `repeat_region`, `gene` and `CDS` features are kept. Their qualifiers
//! are validated once, when the feature is converted from the GenBank record,
//! so later stages read plain struct fields.

use crate::utils::{circular_distance, CircularInterval, Result, Strand};
use gb_io::seq::{Feature as GbFeature, Location as GbLocation};
use std::{fmt, ops::Range, str::FromStr};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepeatType {
    Inverted,
    Direct,
    Tandem,
    Other(String),
}

impl FromStr for RepeatType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "inverted" => Ok(RepeatType::Inverted),
            "direct" => Ok(RepeatType::Direct),
            "tandem" => Ok(RepeatType::Tandem),
            "" => Err("rpt_type must not be empty".to_string()),
            other => Ok(RepeatType::Other(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureKind {
    RepeatRegion { rpt_type: RepeatType },
    Gene { name: String },
    Cds { name: String },
}

/// Location of a feature as `[start, end)` ranges. A compound location has
/// more than one range, e.g. a repeat that wraps around the origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Simple(Range<usize>),
    Compound(Vec<Range<usize>>),
}

impl Location {
    pub fn from_ranges(mut ranges: Vec<Range<usize>>) -> Result<Self> {
        if ranges.iter().any(|r| r.start >= r.end) {
            return Err(format!("Empty or inverted range in location {:?}", ranges));
        }
        match ranges.len() {
            0 => Err("Location without ranges".to_string()),
            1 => Ok(Location::Simple(ranges.remove(0))),
            _ => Ok(Location::Compound(ranges)),
        }
    }

    pub fn ranges(&self) -> &[Range<usize>] {
        match self {
            Location::Simple(range) => std::slice::from_ref(range),
            Location::Compound(ranges) => ranges,
        }
    }

    /// Smallest coordinate covered by the location.
    pub fn start(&self) -> usize {
        self.ranges().iter().map(|r| r.start).min().unwrap_or(0)
    }

    /// Start of the first listed range. For a location wrapping the origin
    /// this is the later of the two sub-ranges.
    pub fn real_start(&self) -> usize {
        self.ranges()[0].start
    }

    /// Number of bases covered by the location.
    pub fn len(&self) -> usize {
        self.ranges().iter().map(|r| r.end - r.start).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn intersects(&self, other: &Location) -> bool {
        self.ranges().iter().any(|a| {
            other
                .ranges()
                .iter()
                .any(|b| a.start < b.end && b.start < a.end)
        })
    }

    /// Circular interval covering all ranges. It starts after the widest
    /// uncovered stretch, so the order ranges are listed in does not matter.
    pub fn to_interval(&self, seq_length: usize) -> Result<CircularInterval> {
        if seq_length == 0 {
            return Err("Invalid interval: sequence length is 0".to_string());
        }
        let mut ranges: Vec<(usize, usize)> = self
            .ranges()
            .iter()
            .map(|r| (r.start % seq_length, r.end % seq_length))
            .collect();
        ranges.sort_unstable();

        let (mut start, mut end) = ranges[0];
        let mut widest_gap = 0;
        for (i, &(_, prev_end)) in ranges.iter().enumerate() {
            let (next_start, _) = ranges[(i + 1) % ranges.len()];
            let gap = circular_distance(seq_length, prev_end, next_start);
            if gap > widest_gap {
                widest_gap = gap;
                start = next_start;
                end = prev_end;
            }
        }
        let length = match circular_distance(seq_length, start, end) {
            0 => seq_length,
            length => length,
        };
        CircularInterval::new(seq_length, start, length)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded: Vec<String> = self
            .ranges()
            .iter()
            .map(|r| format!("{}..{}", r.start, r.end))
            .collect();
        match self {
            Location::Simple(_) => write!(f, "{}", encoded[0]),
            Location::Compound(_) => write!(f, "join({})", encoded.join(",")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    pub kind: FeatureKind,
    pub location: Location,
    pub strand: Strand,
}

impl Feature {
    /// Converts a GenBank feature. Kinds the analysis does not use map to `None`.
    pub fn from_genbank(feature: &GbFeature) -> Result<Option<Self>> {
        let kind_name = feature.kind.to_string();
        let kind = match kind_name.as_str() {
            "repeat_region" => {
                let rpt_type = match feature.qualifier_values("rpt_type").next() {
                    Some(value) => value.parse::<RepeatType>()?,
                    None => RepeatType::Inverted,
                };
                FeatureKind::RepeatRegion { rpt_type }
            }
            "gene" | "CDS" => {
                let name = feature
                    .qualifier_values("gene")
                    .next()
                    .map(|s| s.to_string())
                    .ok_or_else(|| {
                        format!(
                            "{} feature at {:?} has no gene qualifier",
                            kind_name, feature.location
                        )
                    })?;
                if kind_name == "gene" {
                    FeatureKind::Gene { name }
                } else {
                    FeatureKind::Cds { name }
                }
            }
            _ => return Ok(None),
        };

        let mut ranges = Vec::new();
        let mut strands = Vec::new();
        collect_ranges(&feature.location, false, &mut ranges, &mut strands);
        let location = Location::from_ranges(ranges)
            .map_err(|e| format!("{} feature at {:?}: {}", kind_name, feature.location, e))?;
        let reverse_count = strands.iter().filter(|is_reverse| **is_reverse).count();
        let strand = if reverse_count * 2 > strands.len() {
            Strand::Reverse
        } else {
            Strand::Forward
        };

        Ok(Some(Feature {
            kind,
            location,
            strand,
        }))
    }

    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            FeatureKind::Gene { name } | FeatureKind::Cds { name } => Some(name),
            FeatureKind::RepeatRegion { .. } => None,
        }
    }

    pub fn len(&self) -> usize {
        self.location.len()
    }

    pub fn is_empty(&self) -> bool {
        self.location.is_empty()
    }

    pub fn is_gene(&self) -> bool {
        matches!(self.kind, FeatureKind::Gene { .. })
    }

    pub fn is_cds(&self) -> bool {
        matches!(self.kind, FeatureKind::Cds { .. })
    }

    pub fn is_inverted_repeat(&self) -> bool {
        matches!(
            self.kind,
            FeatureKind::RepeatRegion {
                rpt_type: RepeatType::Inverted
            }
        )
    }
}

fn collect_ranges(
    location: &GbLocation,
    reverse: bool,
    ranges: &mut Vec<Range<usize>>,
    strands: &mut Vec<bool>,
) {
    match location {
        GbLocation::Range((from, _), (to, _)) => {
            if *from >= 0 && *to >= 0 {
                let (start, end) = if to < from { (*to, *from) } else { (*from, *to) };
                ranges.push(start as usize..end as usize);
                strands.push(reverse);
            }
        }
        GbLocation::Between(_, _) | GbLocation::Gap(_) => {}
        GbLocation::Complement(inner) => collect_ranges(inner, !reverse, ranges, strands),
        GbLocation::Join(parts)
        | GbLocation::Order(parts)
        | GbLocation::Bond(parts)
        | GbLocation::OneOf(parts) => {
            // Complement of a join lists the ranges in reverse transcription order
            if reverse {
                for part in parts.iter().rev() {
                    collect_ranges(part, reverse, ranges, strands);
                }
            } else {
                for part in parts {
                    collect_ranges(part, reverse, ranges, strands);
                }
            }
        }
        GbLocation::External(_, maybe_loc) => {
            if let Some(loc) = maybe_loc {
                collect_ranges(loc, reverse, ranges, strands);
            }
        }
    }
}
