use std::fmt;

/// Strand of an annotated feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strand {
    Forward,
    Reverse,
}

impl Strand {
    /// Vote used when summing feature orientations.
    pub fn sign(self) -> i64 {
        match self {
            Strand::Forward => 1,
            Strand::Reverse => -1,
        }
    }

    pub fn is_reverse(self) -> bool {
        self == Strand::Reverse
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strand::Forward => write!(f, "+"),
            Strand::Reverse => write!(f, "-"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_display() {
        assert_eq!(Strand::Forward.sign(), 1);
        assert_eq!(Strand::Reverse.sign(), -1);
        assert_eq!(Strand::Reverse.to_string(), "-");
        assert!(!Strand::Forward.is_reverse());
    }
}
