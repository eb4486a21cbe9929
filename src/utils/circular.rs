use crate::utils::Result;

/// Signed representative of `position` on a circle of `length` bases that is
/// closest to zero, so positions past the half-way point are reported as
/// negative distances from the origin.
pub fn circular_offset(length: usize, position: usize) -> i64 {
    let position = position as i64;
    let wrapped = position - length as i64;
    if position <= wrapped.abs() {
        position
    } else {
        wrapped
    }
}

/// Forward distance from `from` to `to` on a circle of `length` bases.
pub fn circular_distance(length: usize, from: usize, to: usize) -> usize {
    (to as i64 - from as i64).rem_euclid(length as i64) as usize
}

/// Interval on a circular sequence. It starts at `start` and extends for
/// `length` bases, possibly across the origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircularInterval {
    pub start: usize,
    pub length: usize,
    pub seq_length: usize,
}

impl CircularInterval {
    pub fn new(seq_length: usize, start: usize, length: usize) -> Result<Self> {
        if seq_length == 0 {
            return Err("Invalid interval: sequence length is 0".to_string());
        }
        if start >= seq_length {
            return Err(format!(
                "Invalid interval: start {} outside sequence of length {}",
                start, seq_length
            ));
        }
        if length == 0 || length > seq_length {
            return Err(format!(
                "Invalid interval: length {} for sequence of length {}",
                length, seq_length
            ));
        }
        Ok(Self {
            start,
            length,
            seq_length,
        })
    }

    /// Builds an interval from signed `[start, end)` bounds that may lie
    /// outside `0..seq_length`. Bounds are reduced modulo the sequence length.
    pub fn from_bounds(seq_length: usize, start: i64, end: i64) -> Result<Self> {
        if seq_length == 0 {
            return Err("Invalid interval: sequence length is 0".to_string());
        }
        if start == end {
            return Err(format!("Invalid interval: empty bounds ({}, {})", start, end));
        }
        let modulus = seq_length as i64;
        let real_start = start.rem_euclid(modulus) as usize;
        let real_end = end.rem_euclid(modulus) as usize;
        let length = match circular_distance(seq_length, real_start, real_end) {
            0 => seq_length,
            length => length,
        };
        Self::new(seq_length, real_start, length)
    }

    /// Exclusive end, reduced modulo the sequence length.
    pub fn end(&self) -> usize {
        (self.start + self.length) % self.seq_length
    }

    pub fn wraps_origin(&self) -> bool {
        self.start + self.length > self.seq_length
    }

    pub fn contains(&self, position: usize) -> bool {
        circular_distance(self.seq_length, self.start, position % self.seq_length) < self.length
    }

    /// Bases covered by the interval, in forward orientation.
    pub fn extract(&self, bases: &[u8]) -> Vec<u8> {
        if self.wraps_origin() {
            let mut extracted = bases[self.start..].to_vec();
            extracted.extend_from_slice(&bases[..self.end()]);
            extracted
        } else {
            bases[self.start..self.start + self.length].to_vec()
        }
    }
}
