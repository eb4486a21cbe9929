//! Interpretation of where the two IRA ends of a relative align on a target.
//!
//! `END1` is the first and `END2` the last `match_length` bases of the
//! relative's IRA. Each end matches once in IRA and once, reverse
//! complemented, in IRB. Ordered by target start, `END1` hits are
//! `[ira_1, irb_2]` and `END2` hits are `[ira_2, irb_1]`.

use super::aligner::{AlignmentMatch, AlignmentResult};
use std::fmt;

pub const END1: &str = "end1";
pub const END2: &str = "end2";

/// Signed `[start, end)` bounds on the target. An end smaller than the start
/// means the interval crosses the origin.
pub type Bounds = (i64, i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    /// Both ends matched twice.
    Nice,
    /// `END1` matched twice, `END2` once.
    TwoOne,
    /// `END1` matched once, `END2` twice.
    OneTwo,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Nice, Tier::TwoOne, Tier::OneTwo];

    /// IR bounds implied by `result`, if its match counts fit this tier.
    pub fn interpret(self, result: &AlignmentResult) -> Option<(Bounds, Bounds)> {
        let end1 = result.matches(None, END1);
        let end2 = result.matches(None, END2);
        match (self, end1.as_slice(), end2.as_slice()) {
            (Tier::Nice, [ira_1, irb_2], [ira_2, irb_1]) => Some((
                (ira_1.start, ira_2.end),
                (irb_1.start, irb_2.end),
            )),
            (Tier::TwoOne, [ira_1, irb_2], [hit]) => Some(two_one(ira_1, irb_2, hit)),
            (Tier::OneTwo, [hit], [ira_2, irb_1]) => Some(one_two(hit, ira_2, irb_1)),
            _ => None,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Tier::Nice => "nice",
            Tier::TwoOne => "2+1",
            Tier::OneTwo => "1+2",
        };
        write!(f, "{}", label)
    }
}

fn two_one(ira_1: &AlignmentMatch, irb_2: &AlignmentMatch, hit: &AlignmentMatch) -> (Bounds, Bounds) {
    let (x, y) = if hit.positive {
        let x = hit.end;
        (x, irb_2.end - (x - ira_1.start))
    } else {
        let y = hit.start;
        (ira_1.start + (irb_2.end - y), y)
    };
    ((ira_1.start, x), (y, irb_2.end))
}

fn one_two(hit: &AlignmentMatch, ira_2: &AlignmentMatch, irb_1: &AlignmentMatch) -> (Bounds, Bounds) {
    let (x, y) = if hit.positive {
        let x = hit.start;
        (x, irb_1.start + (ira_2.end - x))
    } else {
        let y = hit.end;
        (ira_2.end - (y - irb_1.start), y)
    };
    ((x, ira_2.end), (irb_1.start, y))
}

/// Length used to compare candidate IR pairs: IRA length unless IRA crosses
/// the origin, then IRB length.
pub fn ir_span((ira, irb): &(Bounds, Bounds)) -> i64 {
    if ira.1 > ira.0 {
        ira.1 - ira.0
    } else {
        irb.1 - irb.0
    }
}

/// Longest IR pair of one tier over all alignments, with the index of the
/// alignment it came from. Earlier alignments win ties.
pub fn best_of_tier(tier: Tier, results: &[AlignmentResult]) -> Option<(usize, (Bounds, Bounds))> {
    let mut best: Option<(usize, (Bounds, Bounds))> = None;
    for (index, result) in results.iter().enumerate() {
        if let Some(irs) = tier.interpret(result) {
            if best.as_ref().map_or(true, |(_, b)| ir_span(&irs) > ir_span(b)) {
                best = Some((index, irs));
            }
        }
    }
    best
}

/// First tier, in confidence order, that any alignment satisfies.
pub fn best_overall(
    tiers: &[Tier],
    results: &[AlignmentResult],
) -> Option<(Tier, usize, (Bounds, Bounds))> {
    tiers.iter().find_map(|&tier| {
        best_of_tier(tier, results).map(|(index, irs)| (tier, index, irs))
    })
}
