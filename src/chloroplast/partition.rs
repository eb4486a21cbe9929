//! Split of a circular chloroplast genome into its four canonical parts.
//!
//! The two inverted repeats are taken either from annotated `repeat_region`
//! features or from bounds reconstructed by alignment. The remaining two gaps
//! become the large and small single copy regions.

use crate::genome::{Feature, Sequence};
use crate::utils::{circular_distance, CircularInterval, Result};
use arrayvec::ArrayVec;
use itertools::Itertools;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PartName {
    Lsc,
    Ira,
    Ssc,
    Irb,
}

impl PartName {
    /// Report order of the parts.
    pub const ALL: [PartName; 4] = [PartName::Lsc, PartName::Ira, PartName::Ssc, PartName::Irb];

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for PartName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PartName::Lsc => "lsc",
            PartName::Ira => "ira",
            PartName::Ssc => "ssc",
            PartName::Irb => "irb",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Part {
    pub name: PartName,
    pub interval: CircularInterval,
}

impl Part {
    /// Start of the part; for a part wrapping the origin this lies before the origin.
    pub fn real_start(&self) -> usize {
        self.interval.start
    }

    pub fn len(&self) -> usize {
        self.interval.length
    }

    pub fn is_empty(&self) -> bool {
        self.interval.length == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    pub seq_length: usize,
    /// Parts ordered by start coordinate.
    parts: ArrayVec<Part, 4>,
}

impl Partition {
    /// Builds the partition from the two inverted repeats by naming the gaps
    /// between them. The longer gap is the LSC. On equal lengths the gap
    /// that starts later is the LSC.
    pub fn from_irs(ira: CircularInterval, irb: CircularInterval) -> Result<Self> {
        if ira.seq_length != irb.seq_length {
            return Err(format!(
                "Inverted repeats on sequences of different length: {} and {}",
                ira.seq_length, irb.seq_length
            ));
        }
        let seq_length = ira.seq_length;
        let (first, second) = if ira.start <= irb.start {
            (ira, irb)
        } else {
            (irb, ira)
        };

        let gap_after = |from: &CircularInterval, to: &CircularInterval| -> Option<CircularInterval> {
            let distance = match circular_distance(seq_length, from.start, to.start) {
                0 => seq_length,
                d => d,
            };
            if distance <= from.length {
                return None;
            }
            CircularInterval::new(seq_length, from.end(), distance - from.length).ok()
        };
        let gaps: Vec<CircularInterval> = [gap_after(&first, &second), gap_after(&second, &first)]
            .into_iter()
            .flatten()
            .sorted_by_key(|gap| gap.start)
            .collect();
        let covered: usize = gaps.iter().map(|g| g.length).sum::<usize>() + ira.length + irb.length;
        if gaps.len() != 2 || covered != seq_length {
            return Err(format!(
                "Inverted repeats {}+{} and {}+{} do not leave two single copy regions on a sequence of length {}",
                ira.start, ira.length, irb.start, irb.length, seq_length
            ));
        }

        let (ssc, lsc) = if gaps[0].length > gaps[1].length {
            (gaps[1], gaps[0])
        } else {
            (gaps[0], gaps[1])
        };
        let mut parts: ArrayVec<Part, 4> = [
            (PartName::Lsc, lsc),
            (PartName::Ira, ira),
            (PartName::Ssc, ssc),
            (PartName::Irb, irb),
        ]
        .into_iter()
        .map(|(name, interval)| Part { name, interval })
        .collect();
        parts.sort_by_key(|p| p.interval.start);
        Ok(Self { seq_length, parts })
    }

    /// Builds the partition from signed `[start, end)` bounds of both repeats.
    pub fn from_ir_bounds(seq_length: usize, ira: (i64, i64), irb: (i64, i64)) -> Result<Self> {
        let ira = CircularInterval::from_bounds(seq_length, ira.0, ira.1)?;
        let irb = CircularInterval::from_bounds(seq_length, irb.0, irb.1)?;
        Self::from_irs(ira, irb)
    }

    pub fn part(&self, name: PartName) -> &Part {
        self.parts
            .iter()
            .find(|p| p.name == name)
            .unwrap_or_else(|| unreachable!("partition always holds all four parts"))
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn part_containing(&self, position: usize) -> Option<&Part> {
        self.parts.iter().find(|p| p.interval.contains(position))
    }

    /// Buckets features by the part holding their start, indexed by `PartName::index`.
    pub fn put_features_in_parts<'a>(&self, features: &[&'a Feature]) -> [Vec<&'a Feature>; 4] {
        let mut buckets: [Vec<&'a Feature>; 4] = Default::default();
        for feature in features {
            if let Some(part) = self.part_containing(feature.location.start()) {
                buckets[part.name.index()].push(*feature);
            }
        }
        buckets
    }
}

/// Picks the pair of longest inverted repeat features as (IRA, IRB).
/// Returns `None` unless exactly two inverted repeats share the maximal length.
pub fn find_chloroplast_irs(sequence: &Sequence) -> Option<(&Feature, &Feature)> {
    let repeats: Vec<&Feature> = sequence
        .features
        .iter()
        .filter(|f| f.is_inverted_repeat())
        .collect();
    let max_len = repeats.iter().map(|f| f.len()).max()?;
    let longest: Vec<&Feature> = repeats.into_iter().filter(|f| f.len() == max_len).collect();
    if longest.len() != 2 {
        log::debug!(
            "{}: {} inverted repeat(s) of maximal length {}",
            sequence.id,
            longest.len(),
            max_len
        );
        return None;
    }

    let (ira, irb) = (longest[0], longest[1]);
    let check_l = sequence.len() / 4;
    let (ira_start, irb_start) = (ira.location.start(), irb.location.start());
    if check_l < irb_start && irb_start < ira_start {
        Some((irb, ira))
    } else {
        Some((ira, irb))
    }
}

/// Partition from the sequence's own annotation.
pub fn find_partition(sequence: &Sequence) -> Result<Option<Partition>> {
    let Some((ira, irb)) = find_chloroplast_irs(sequence) else {
        return Ok(None);
    };
    let seq_length = sequence.len();
    let ira = ira.location.to_interval(seq_length)?;
    let irb = irb.location.to_interval(seq_length)?;
    Partition::from_irs(ira, irb)
        .map(Some)
        .map_err(|e| format!("{}: {}", sequence.id, e))
}
