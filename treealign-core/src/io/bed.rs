//! BED region input for the column exporter.
//!
//! Three-field lines describe a single half-open, zero-based interval.
//! Lines with ten or more fields additionally carry the
//! `blockCount, blockSizes, blockStarts` triple describing disjoint
//! sub-intervals; block starts are relative to the line start and are
//! converted to absolute sequence coordinates at parse time.

use std::io::{self, BufRead};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::GenomicPos;

#[derive(Debug, Error)]
pub enum BedError {
    #[error("Line {line}: expected at least 3 fields, got {got}")]
    TooFewFields { line: usize, got: usize },

    #[error("Line {line}: invalid coordinate {value}")]
    InvalidCoordinate { line: usize, value: String },

    #[error("Line {line}: malformed block list")]
    MalformedBlocks { line: usize },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type BedResult<T> = Result<T, BedError>;

/// One sub-interval of a blocked BED line, in absolute sequence
/// coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BedBlock {
    pub start: GenomicPos,
    pub length: GenomicPos,
}

/// Interval shape of a BED line, dispatched once at parse time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BedIntervals {
    /// Legacy whole-interval form: `[start, end)`.
    Single,
    /// BED12-style disjoint sub-intervals.
    Blocked(Vec<BedBlock>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BedLine {
    pub line_number: usize,
    pub chrom: String,
    pub start: GenomicPos,
    pub end: GenomicPos,
    pub intervals: BedIntervals,
}

/// Parse one BED line. `line_number` is 1-based and used in diagnostics.
pub fn parse_line(line: &str, line_number: usize) -> BedResult<BedLine> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 3 {
        return Err(BedError::TooFewFields {
            line: line_number,
            got: fields.len(),
        });
    }

    let parse_pos = |field: &str| {
        field.parse::<GenomicPos>().map_err(|_| BedError::InvalidCoordinate {
            line: line_number,
            value: field.to_string(),
        })
    };
    let chrom = fields[0].to_string();
    let start = parse_pos(fields[1])?;
    let end = parse_pos(fields[2])?;

    // nine or fewer fields is the whole-interval form; ten or more carries
    // the block triple
    let intervals = if fields.len() <= 9 {
        BedIntervals::Single
    } else {
        if fields.len() < 12 {
            return Err(BedError::MalformedBlocks { line: line_number });
        }
        let count: usize = fields[9]
            .parse()
            .map_err(|_| BedError::MalformedBlocks { line: line_number })?;
        let sizes = parse_list(fields[10], line_number)?;
        let starts = parse_list(fields[11], line_number)?;
        if sizes.len() != count || starts.len() != count {
            return Err(BedError::MalformedBlocks { line: line_number });
        }
        BedIntervals::Blocked(
            starts
                .into_iter()
                .zip(sizes)
                .map(|(rel_start, length)| BedBlock {
                    start: start + rel_start,
                    length,
                })
                .collect(),
        )
    };

    Ok(BedLine {
        line_number,
        chrom,
        start,
        end,
        intervals,
    })
}

fn parse_list(field: &str, line_number: usize) -> BedResult<Vec<GenomicPos>> {
    field
        .split(',')
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<GenomicPos>()
                .map_err(|_| BedError::MalformedBlocks { line: line_number })
        })
        .collect()
}

/// Read all regions from a BED stream. Malformed lines never abort the
/// batch: they are reported as diagnostics and skipped, matching the
/// per-unit error boundary of the exporter. Only I/O failures propagate.
pub fn read_regions<R: BufRead>(reader: R) -> BedResult<(Vec<BedLine>, Vec<String>)> {
    let mut lines = Vec::new();
    let mut diagnostics = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = i + 1;
        let trimmed = line.trim();
        if trimmed.is_empty()
            || trimmed.starts_with('#')
            || trimmed.starts_with("track")
            || trimmed.starts_with("browser")
        {
            continue;
        }
        match parse_line(trimmed, line_number) {
            Ok(bed) => lines.push(bed),
            Err(e) => {
                let msg = e.to_string();
                log::warn!("{}", msg);
                diagnostics.push(msg);
            }
        }
    }
    Ok((lines, diagnostics))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_single_interval() {
        let bed = parse_line("chr1\t100\t200", 1).unwrap();
        assert_eq!(bed.chrom, "chr1");
        assert_eq!(bed.start, 100);
        assert_eq!(bed.end, 200);
        assert_eq!(bed.intervals, BedIntervals::Single);
    }

    #[test]
    fn test_nine_fields_is_still_single() {
        let bed = parse_line("chr1 100 200 name 0 + 100 200 0,0,0", 1).unwrap();
        assert_eq!(bed.intervals, BedIntervals::Single);
    }

    #[test]
    fn test_blocked_line_absolute_starts() {
        let bed = parse_line(
            "chr1 100 200 name 0 + 100 200 0,0,0 2 10,20 0,50",
            4,
        )
        .unwrap();
        match bed.intervals {
            BedIntervals::Blocked(blocks) => {
                assert_eq!(
                    blocks,
                    vec![
                        BedBlock { start: 100, length: 10 },
                        BedBlock { start: 150, length: 20 },
                    ]
                );
            }
            other => panic!("expected blocked intervals, got {:?}", other),
        }
    }

    #[test]
    fn test_block_count_mismatch() {
        let err = parse_line("chr1 0 100 n 0 + 0 100 0 3 10,20 0,50", 2);
        assert!(matches!(err, Err(BedError::MalformedBlocks { line: 2 })));
    }

    #[test]
    fn test_malformed_coordinate() {
        let err = parse_line("chr1 abc 200", 7);
        assert!(matches!(
            err,
            Err(BedError::InvalidCoordinate { line: 7, .. })
        ));
    }

    #[test]
    fn test_read_regions_skips_malformed() {
        let input = "chr1\t0\t10\n\
                     chr1\tbad\t20\n\
                     # comment\n\
                     chr2\t5\t15\n";
        let (lines, diagnostics) = read_regions(Cursor::new(input)).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].line_number, 1);
        assert_eq!(lines[1].line_number, 4);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].starts_with("Line 2:"));
    }
}
