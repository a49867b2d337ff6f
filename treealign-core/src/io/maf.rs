//! MAF (Multiple Alignment Format) block reading and writing.
//!
//! Each alignment block begins with an "a" line and contains one "s" line
//! per participating sequence. Reverse-strand rows are converted to
//! forward coordinates as they are read (the strand flag is kept as a
//! reminder); the writer performs the inverse conversion, so `MafRecord`
//! coordinates are always forward-strand inside the library.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use anyhow::Context;
use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{GenomicPos, Strand};

#[derive(Debug, Error)]
pub enum MafError {
    #[error("Invalid MAF line format: {0}")]
    InvalidFormat(String),

    #[error("Invalid position value: {0}")]
    InvalidPosition(String),

    #[error("Invalid strand: {0}")]
    InvalidStrand(String),

    #[error("Sequence line outside of an alignment block at line {0}")]
    OrphanSequenceLine(usize),

    #[error("Line {line}: row {src} has {bases} bases but declares size {size}")]
    SizeMismatch {
        line: usize,
        src: String,
        bases: u64,
        size: u64,
    },

    #[error("Line {line}: row {src} extends past its declared source length")]
    RowOutOfBounds { line: usize, src: String },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type MafResult<T> = Result<T, MafError>;

/// One "s" line: a per-genome, per-block description of a column run.
/// `start` is the forward-strand start offset regardless of `strand`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MafRecord {
    pub genome: String,
    pub sequence: String,
    pub start: GenomicPos,
    pub size: GenomicPos,
    pub strand: Strand,
    pub src_size: GenomicPos,
    pub text: String,
}

impl MafRecord {
    pub fn src(&self) -> String {
        if self.genome == self.sequence {
            self.genome.clone()
        } else {
            format!("{}.{}", self.genome, self.sequence)
        }
    }
}

/// One alignment block: a fixed-width run of columns over the records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MafBlock {
    pub score: Option<f64>,
    pub records: Vec<MafRecord>,
}

fn parse_alignment_line(line: &str) -> MafBlock {
    let mut score = None;
    for part in line.split_whitespace().skip(1) {
        if let Some((key, value)) = part.split_once('=') {
            if key == "score" {
                score = value.parse::<f64>().ok();
            }
        }
    }
    MafBlock {
        score,
        records: Vec::new(),
    }
}

fn parse_sequence_line(line: &str, line_number: usize) -> MafResult<MafRecord> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 7 {
        return Err(MafError::InvalidFormat(format!(
            "expected at least 7 fields on line {}, got {}",
            line_number,
            parts.len()
        )));
    }

    let src = parts[1];
    let (genome, sequence) = match src.split_once('.') {
        Some((g, s)) => (g.to_string(), s.to_string()),
        None => (src.to_string(), src.to_string()),
    };

    let parse_pos = |field: &str| {
        field
            .parse::<GenomicPos>()
            .map_err(|_| MafError::InvalidPosition(field.to_string()))
    };
    let start = parse_pos(parts[2])?;
    let size = parse_pos(parts[3])?;
    let strand = match parts[4] {
        "+" => Strand::Forward,
        "-" => Strand::Reverse,
        other => return Err(MafError::InvalidStrand(other.to_string())),
    };
    let src_size = parse_pos(parts[5])?;
    let text = parts[6].to_string();

    if start + size > src_size {
        return Err(MafError::RowOutOfBounds {
            line: line_number,
            src: src.to_string(),
        });
    }
    let bases = text.bytes().filter(|&b| b != b'-').count() as u64;
    if bases != size {
        return Err(MafError::SizeMismatch {
            line: line_number,
            src: src.to_string(),
            bases,
            size,
        });
    }

    // convert reverse-strand rows to forward coordinates
    let start = match strand {
        Strand::Forward => start,
        Strand::Reverse => src_size - start - size,
    };

    Ok(MafRecord {
        genome,
        sequence,
        start,
        size,
        strand,
        src_size,
        text,
    })
}

/// Streaming block reader over any `BufRead` source.
pub struct MafReader<R: BufRead> {
    reader: R,
    line_buffer: String,
    line_number: usize,
    current_block: Option<MafBlock>,
}

impl MafReader<Box<dyn BufRead>> {
    /// Open a MAF file, transparently decompressing `.gz` input.
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let file = File::open(&path)
            .with_context(|| format!("failed to open MAF file {}", path.as_ref().display()))?;
        let reader: Box<dyn BufRead> = if path.as_ref().to_string_lossy().ends_with(".gz") {
            Box::new(BufReader::new(GzDecoder::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };
        Ok(Self::new(reader))
    }
}

impl<R: BufRead> MafReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_buffer: String::new(),
            line_number: 0,
            current_block: None,
        }
    }
}

impl<R: BufRead> Iterator for MafReader<R> {
    type Item = MafResult<MafBlock>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.line_buffer.clear();
            match self.reader.read_line(&mut self.line_buffer) {
                Ok(0) => return self.current_block.take().map(Ok),
                Ok(_) => {
                    self.line_number += 1;
                    let line = self.line_buffer.trim();
                    if line.is_empty() || line.starts_with('#') {
                        continue;
                    }
                    match line.chars().next() {
                        Some('a') => {
                            let previous = self.current_block.take();
                            self.current_block = Some(parse_alignment_line(line));
                            if let Some(block) = previous {
                                return Some(Ok(block));
                            }
                        }
                        Some('s') => match self.current_block.as_mut() {
                            Some(block) => {
                                match parse_sequence_line(line, self.line_number) {
                                    Ok(record) => block.records.push(record),
                                    Err(e) => return Some(Err(e)),
                                }
                            }
                            None => {
                                return Some(Err(MafError::OrphanSequenceLine(
                                    self.line_number,
                                )))
                            }
                        },
                        // insert/empty/quality annotations carry no segment
                        // information for us
                        Some('i') | Some('e') | Some('q') => continue,
                        _ => {
                            log::debug!(
                                "skipping unrecognized MAF line {}",
                                self.line_number
                            );
                        }
                    }
                }
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}

/// Block writer emitting `##maf version=1` output.
pub struct MafWriter<W: Write> {
    out: W,
}

impl<W: Write> MafWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn write_header(&mut self) -> io::Result<()> {
        writeln!(self.out, "##maf version=1 scoring=N/A")?;
        writeln!(self.out)
    }

    /// Write one block. Reverse-strand rows are converted back from the
    /// forward coordinates held in `MafRecord`.
    pub fn write_block(&mut self, block: &MafBlock) -> io::Result<()> {
        match block.score {
            Some(score) => writeln!(self.out, "a score={}", score)?,
            None => writeln!(self.out, "a")?,
        }
        for record in &block.records {
            let start = match record.strand {
                Strand::Forward => record.start,
                Strand::Reverse => record.src_size - record.start - record.size,
            };
            writeln!(
                self.out,
                "s {} {} {} {} {} {}",
                record.src(),
                start,
                record.size,
                char::from(record.strand),
                record.src_size,
                record.text
            )?;
        }
        writeln!(self.out)
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_forward_row() {
        let rec = parse_sequence_line("s hg.chr7 27707221 13 + 158545518 gcagctgaaaaca", 1)
            .unwrap();
        assert_eq!(rec.genome, "hg");
        assert_eq!(rec.sequence, "chr7");
        assert_eq!(rec.start, 27707221);
        assert_eq!(rec.size, 13);
        assert_eq!(rec.strand, Strand::Forward);
        assert_eq!(rec.src_size, 158545518);
    }

    #[test]
    fn test_reverse_row_converted_to_forward() {
        let rec = parse_sequence_line("s pt.chr6 10 4 - 100 ACGT", 1).unwrap();
        // reverse start 10 over a length-100 source: forward start 100-10-4
        assert_eq!(rec.start, 86);
        assert_eq!(rec.strand, Strand::Reverse);
    }

    #[test]
    fn test_src_without_dot() {
        let rec = parse_sequence_line("s scaffold 0 4 + 10 ACGT", 1).unwrap();
        assert_eq!(rec.genome, "scaffold");
        assert_eq!(rec.sequence, "scaffold");
        assert_eq!(rec.src(), "scaffold");
    }

    #[test]
    fn test_size_mismatch_rejected() {
        let err = parse_sequence_line("s g.chr1 0 5 + 10 AC-GT", 3);
        assert!(matches!(err, Err(MafError::SizeMismatch { line: 3, .. })));
    }

    #[test]
    fn test_row_out_of_bounds_rejected() {
        let err = parse_sequence_line("s g.chr1 8 4 + 10 ACGT", 2);
        assert!(matches!(err, Err(MafError::RowOutOfBounds { line: 2, .. })));
    }

    #[test]
    fn test_read_blocks() {
        let maf = "##maf version=1\n\
                   a score=12\n\
                   s hg.chr7 0 4 + 10 ACGT\n\
                   s pt.chr6 2 4 + 8 ACGT\n\
                   \n\
                   a\n\
                   s hg.chr7 4 3 + 10 AAA\n";
        let blocks: Vec<_> = MafReader::new(Cursor::new(maf))
            .collect::<MafResult<Vec<_>>>()
            .unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].score, Some(12.0));
        assert_eq!(blocks[0].records.len(), 2);
        assert_eq!(blocks[1].records.len(), 1);
        assert_eq!(blocks[1].records[0].start, 4);
    }

    #[test]
    fn test_orphan_sequence_line() {
        let maf = "s hg.chr7 0 4 + 10 ACGT\n";
        let result: MafResult<Vec<_>> = MafReader::new(Cursor::new(maf)).collect();
        assert!(matches!(result, Err(MafError::OrphanSequenceLine(1))));
    }

    #[test]
    fn test_write_then_read_round_trip() {
        let block = MafBlock {
            score: None,
            records: vec![
                MafRecord {
                    genome: "root".into(),
                    sequence: "chr1".into(),
                    start: 0,
                    size: 4,
                    strand: Strand::Forward,
                    src_size: 10,
                    text: "ACGT".into(),
                },
                MafRecord {
                    genome: "a".into(),
                    sequence: "chr2".into(),
                    start: 3,
                    size: 4,
                    strand: Strand::Reverse,
                    src_size: 12,
                    text: "ACGT".into(),
                },
            ],
        };
        let mut writer = MafWriter::new(Vec::new());
        writer.write_header().unwrap();
        writer.write_block(&block).unwrap();
        let text = String::from_utf8(writer.into_inner()).unwrap();
        // reverse row written in strand-local coordinates: 12 - 3 - 4 = 5
        assert!(text.contains("s a.chr2 5 4 - 12 ACGT"));

        let blocks: Vec<_> = MafReader::new(Cursor::new(text.as_str()))
            .collect::<MafResult<Vec<_>>>()
            .unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].records, block.records);
    }
}
