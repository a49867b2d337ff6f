//! Dimension scan: the first of the two ingestion passes.
//!
//! Walks the MAF block stream once to learn, for every (genome, sequence)
//! pair, the declared source length and the order of first appearance
//! (which fixes each sequence's offset within its genome's linear
//! coordinate space). Cross-block coverage is tracked per sequence in a
//! [`PositionCache`] so overlapping blocks are caught here, before any
//! segment is written.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cache::PositionCache;
use crate::io::maf::{MafBlock, MafReader};
use crate::types::GenomicPos;

#[derive(Debug, Error)]
pub enum DimError {
    #[error(
        "genome {genome} sequence {sequence}: declared length {got} conflicts with earlier {expected}"
    )]
    LengthConflict {
        genome: String,
        sequence: String,
        expected: GenomicPos,
        got: GenomicPos,
    },

    #[error("genome {genome} sequence {sequence}: alignment blocks overlap at position {position}")]
    Overlap {
        genome: String,
        sequence: String,
        position: GenomicPos,
    },
}

pub type DimResult<T> = Result<T, DimError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceDim {
    pub name: String,
    pub length: GenomicPos,
}

/// Sequences of one genome, in first-appearance order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenomeDims {
    pub sequences: Vec<SequenceDim>,
    index: HashMap<String, usize>,
}

impl GenomeDims {
    pub fn total_length(&self) -> GenomicPos {
        self.sequences.iter().map(|s| s.length).sum()
    }
}

/// Mapping from genome name to its sequence dimensions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DimMap {
    genomes: HashMap<String, GenomeDims>,
}

impl DimMap {
    pub fn genome(&self, name: &str) -> Option<&GenomeDims> {
        self.genomes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.genomes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.genomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genomes.is_empty()
    }
}

/// Accumulates dimensions over a stream of blocks.
#[derive(Debug, Default)]
pub struct DimScanner {
    dims: DimMap,
    coverage: HashMap<(String, String), PositionCache>,
}

impl DimScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scan_block(&mut self, block: &MafBlock) -> DimResult<()> {
        for record in &block.records {
            let genome = self
                .dims
                .genomes
                .entry(record.genome.clone())
                .or_default();
            match genome.index.get(&record.sequence) {
                Some(&i) => {
                    let expected = genome.sequences[i].length;
                    if expected != record.src_size {
                        return Err(DimError::LengthConflict {
                            genome: record.genome.clone(),
                            sequence: record.sequence.clone(),
                            expected,
                            got: record.src_size,
                        });
                    }
                }
                None => {
                    genome
                        .index
                        .insert(record.sequence.clone(), genome.sequences.len());
                    genome.sequences.push(SequenceDim {
                        name: record.sequence.clone(),
                        length: record.src_size,
                    });
                }
            }

            let cache = self
                .coverage
                .entry((record.genome.clone(), record.sequence.clone()))
                .or_default();
            for pos in record.start..record.start + record.size {
                if !cache.insert(pos) {
                    return Err(DimError::Overlap {
                        genome: record.genome.clone(),
                        sequence: record.sequence.clone(),
                        position: pos,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn finish(self) -> DimMap {
        self.dims
    }
}

/// Convenience wrapper: scan a whole MAF file into a dimension map.
pub fn scan_maf<P: AsRef<Path>>(path: P) -> anyhow::Result<DimMap> {
    let mut scanner = DimScanner::new();
    for block in MafReader::open(&path)? {
        scanner.scan_block(&block?)?;
    }
    Ok(scanner.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::maf::MafRecord;
    use crate::types::Strand;

    fn record(genome: &str, sequence: &str, start: u64, size: u64, src_size: u64) -> MafRecord {
        MafRecord {
            genome: genome.into(),
            sequence: sequence.into(),
            start,
            size,
            strand: Strand::Forward,
            src_size,
            text: "N".repeat(size as usize),
        }
    }

    #[test]
    fn test_first_appearance_order() {
        let mut scanner = DimScanner::new();
        scanner
            .scan_block(&MafBlock {
                score: None,
                records: vec![record("g", "chr2", 0, 5, 50), record("g", "chr1", 0, 5, 40)],
            })
            .unwrap();
        let dims = scanner.finish();
        let g = dims.genome("g").unwrap();
        assert_eq!(g.sequences[0].name, "chr2");
        assert_eq!(g.sequences[1].name, "chr1");
        assert_eq!(g.total_length(), 90);
    }

    #[test]
    fn test_length_conflict() {
        let mut scanner = DimScanner::new();
        scanner
            .scan_block(&MafBlock {
                score: None,
                records: vec![record("g", "chr1", 0, 5, 40)],
            })
            .unwrap();
        let err = scanner.scan_block(&MafBlock {
            score: None,
            records: vec![record("g", "chr1", 10, 5, 44)],
        });
        assert!(matches!(err, Err(DimError::LengthConflict { got: 44, .. })));
    }

    #[test]
    fn test_overlap_detected() {
        let mut scanner = DimScanner::new();
        scanner
            .scan_block(&MafBlock {
                score: None,
                records: vec![record("g", "chr1", 0, 10, 40)],
            })
            .unwrap();
        let err = scanner.scan_block(&MafBlock {
            score: None,
            records: vec![record("g", "chr1", 9, 5, 40)],
        });
        assert!(matches!(err, Err(DimError::Overlap { position: 9, .. })));
    }

    #[test]
    fn test_adjacent_blocks_allowed() {
        let mut scanner = DimScanner::new();
        scanner
            .scan_block(&MafBlock {
                score: None,
                records: vec![record("g", "chr1", 0, 10, 40)],
            })
            .unwrap();
        assert!(scanner
            .scan_block(&MafBlock {
                score: None,
                records: vec![record("g", "chr1", 10, 5, 40)],
            })
            .is_ok());
    }
}
