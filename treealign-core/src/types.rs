use serde::{Deserialize, Serialize};

/// A position within a genome's linear coordinate space (zero-based).
pub type GenomicPos = u64;

/// Stable arena index of a genome within an [`crate::graph::AlignmentGraph`].
pub type GenomeId = usize;

/// Index into a genome's Top or Bottom segment array.
pub type SegmentIndex = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strand {
    Forward,
    Reverse,
}

impl Strand {
    pub fn is_reverse(self) -> bool {
        matches!(self, Strand::Reverse)
    }
}

impl From<bool> for Strand {
    fn from(forward: bool) -> Self {
        if forward {
            Strand::Forward
        } else {
            Strand::Reverse
        }
    }
}

impl From<Strand> for char {
    fn from(strand: Strand) -> Self {
        match strand {
            Strand::Forward => '+',
            Strand::Reverse => '-',
        }
    }
}

/// DNA complement of a single base. Non-nucleotide bytes pass through
/// unchanged, matching how gap and N characters are handled everywhere else.
pub fn complement(base: u8) -> u8 {
    match base {
        b'A' => b'T',
        b'a' => b't',
        b'C' => b'G',
        b'c' => b'g',
        b'G' => b'C',
        b'g' => b'c',
        b'T' => b'A',
        b't' => b'a',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strand_conversions() {
        assert_eq!(char::from(Strand::Forward), '+');
        assert_eq!(char::from(Strand::Reverse), '-');
        assert_eq!(Strand::from(true), Strand::Forward);
        assert!(Strand::Reverse.is_reverse());
    }

    #[test]
    fn test_complement() {
        assert_eq!(complement(b'A'), b'T');
        assert_eq!(complement(b'c'), b'g');
        assert_eq!(complement(b'N'), b'N');
        assert_eq!(complement(b'-'), b'-');
    }
}
