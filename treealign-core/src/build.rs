//! Segment-graph ingestion.
//!
//! Converts a stream of alignment blocks into the persistent graph: the
//! designated reference genome becomes the tree root and accumulates
//! Bottom Segments; every other genome becomes a child of the root and
//! accumulates Top Segments back-referencing the reference anchors.
//!
//! Ingestion is a single ordered pass. The builder threads explicit
//! per-genome cursors (next uncovered coordinate) through every block, so
//! segment arrays are append-only and monotonically increasing in
//! coordinate; input blocks must therefore be coordinate-sorted per
//! genome. Regions never covered by any block are filled with unlinked
//! segments so that, at finalize, every genome's segment array partitions
//! its declared length exactly.

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;

use crate::dims::DimMap;
use crate::graph::{AlignmentGraph, BottomSegment, ChildLink, GraphError, TopSegment};
use crate::io::maf::{MafBlock, MafReader};
use crate::types::{complement, GenomeId, GenomicPos};

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("reference genome {0} does not appear in the alignment dimensions")]
    UnknownRefGenome(String),

    #[error("genome {0} is missing from the dimension table")]
    UnknownGenome(String),

    #[error("sequence {sequence} of genome {genome} is missing from the dimension table")]
    UnknownSequence { genome: String, sequence: String },

    #[error("alignment block rows have differing column counts (row for genome {0})")]
    RaggedBlock(String),

    #[error(
        "genome {genome}: block at position {position} precedes already written segments at {cursor}"
    )]
    OutOfOrder {
        genome: String,
        position: GenomicPos,
        cursor: GenomicPos,
    },

    #[error(transparent)]
    Graph(#[from] GraphError),
}

pub type BuildResult<T> = Result<T, BuildError>;

#[derive(Debug, Clone, Copy)]
struct RowCtx {
    genome: GenomeId,
    reversed: bool,
    gstart: GenomicPos,
    gend: GenomicPos,
}

/// Incremental builder for the segment graph. One instance per ingestion
/// pass; [`GraphBuilder::finalize`] consumes it and runs the structural
/// validation, after which the graph is immutable.
pub struct GraphBuilder {
    graph: AlignmentGraph,
    dims: DimMap,
    ref_name: String,
    root: GenomeId,
    cursors: HashMap<GenomeId, GenomicPos>,
}

impl GraphBuilder {
    pub fn new(dims: DimMap, ref_genome: &str) -> BuildResult<Self> {
        if !dims.contains(ref_genome) {
            return Err(BuildError::UnknownRefGenome(ref_genome.to_string()));
        }
        let mut graph = AlignmentGraph::new();
        let root = graph.insert_genome(ref_genome, None);
        let mut builder = Self {
            graph,
            dims,
            ref_name: ref_genome.to_string(),
            root,
            cursors: HashMap::new(),
        };
        builder.init_sequences(root, ref_genome)?;
        Ok(builder)
    }

    fn init_sequences(&mut self, id: GenomeId, name: &str) -> BuildResult<()> {
        let dims = self
            .dims
            .genome(name)
            .ok_or_else(|| BuildError::UnknownGenome(name.to_string()))?;
        // clone to release the borrow on self.dims before mutating the graph
        let sequences = dims.sequences.clone();
        let genome = self.graph.genome_mut(id);
        for seq in &sequences {
            genome.add_sequence(&seq.name, seq.length);
        }
        self.cursors.insert(id, 0);
        Ok(())
    }

    /// Fetch or create a genome; creation is idempotent and keyed by name.
    fn ensure_genome(&mut self, name: &str) -> BuildResult<GenomeId> {
        if let Some(id) = self.graph.genome_by_name(name) {
            return Ok(id);
        }
        let id = self.graph.insert_genome(name, Some(self.root));
        self.init_sequences(id, name)?;
        log::debug!("created genome {} ({} sequences)", name, self.graph.genome(id).sequences.len());
        Ok(id)
    }

    fn cursor(&self, id: GenomeId) -> GenomicPos {
        self.cursors.get(&id).copied().unwrap_or(0)
    }

    /// Move a genome's cursor forward to `pos`, emitting an unlinked filler
    /// segment over the skipped region. A backward move means the input is
    /// not coordinate-sorted, which the append-only arrays cannot express.
    fn advance_to(&mut self, id: GenomeId, pos: GenomicPos) -> BuildResult<()> {
        let cursor = self.cursor(id);
        if pos < cursor {
            return Err(BuildError::OutOfOrder {
                genome: self.graph.genome(id).name.clone(),
                position: pos,
                cursor,
            });
        }
        if pos > cursor {
            let length = pos - cursor;
            let root = self.root;
            let genome = self.graph.genome_mut(id);
            if id == root {
                genome.bottom.push(BottomSegment {
                    start: cursor,
                    length,
                    children: Vec::new(),
                });
            } else {
                genome.top.push(TopSegment {
                    start: cursor,
                    length,
                    parent_index: None,
                    reversed: false,
                });
            }
            self.cursors.insert(id, pos);
        }
        Ok(())
    }

    fn append_bottom(
        &mut self,
        start: GenomicPos,
        length: GenomicPos,
    ) -> BuildResult<usize> {
        self.advance_to(self.root, start)?;
        let genome = self.graph.genome_mut(self.root);
        let index = genome.bottom.len();
        genome.bottom.push(BottomSegment {
            start,
            length,
            children: Vec::new(),
        });
        self.cursors.insert(self.root, start + length);
        Ok(index)
    }

    fn append_top(
        &mut self,
        id: GenomeId,
        start: GenomicPos,
        length: GenomicPos,
        parent_index: Option<usize>,
        reversed: bool,
    ) -> BuildResult<usize> {
        self.advance_to(id, start)?;
        let genome = self.graph.genome_mut(id);
        let index = genome.top.len();
        genome.top.push(TopSegment {
            start,
            length,
            parent_index,
            reversed,
        });
        self.cursors.insert(id, start + length);
        Ok(index)
    }

    /// Ingest one alignment block.
    ///
    /// The block is partitioned into maximal column runs with a constant
    /// gap pattern; each run becomes one segment-construction unit per
    /// participating row. An absent row means "not present here" (no
    /// coordinate advance); an explicit gap within a present row only
    /// forces a unit boundary and contributes no segment.
    pub fn add_block(&mut self, block: &MafBlock) -> BuildResult<()> {
        if block.records.is_empty() {
            return Ok(());
        }
        let width = block.records[0].text.len();
        if width == 0 {
            return Ok(());
        }

        let mut rows: Vec<RowCtx> = Vec::new();
        let mut texts: Vec<&[u8]> = Vec::new();
        let mut ref_row: Option<usize> = None;
        for record in &block.records {
            if record.text.len() != width {
                return Err(BuildError::RaggedBlock(record.genome.clone()));
            }
            let is_ref = record.genome == self.ref_name;
            if is_ref && ref_row.is_some() {
                log::warn!(
                    "skipping duplicate reference row {} within one block",
                    record.src()
                );
                continue;
            }
            let id = self.ensure_genome(&record.genome)?;
            let gstart = {
                let seq = self.graph.genome(id).sequence(&record.sequence).ok_or_else(
                    || BuildError::UnknownSequence {
                        genome: record.genome.clone(),
                        sequence: record.sequence.clone(),
                    },
                )?;
                seq.start + record.start
            };
            if is_ref {
                ref_row = Some(rows.len());
            }
            rows.push(RowCtx {
                genome: id,
                reversed: record.strand.is_reverse(),
                gstart,
                gend: gstart + record.size,
            });
            texts.push(record.text.as_bytes());
        }
        if rows.is_empty() {
            return Ok(());
        }

        // partition into maximal runs with a constant gap pattern
        let mut units: Vec<(usize, usize)> = Vec::new();
        let mut prev_mask: Vec<bool> = texts.iter().map(|t| t[0] == b'-').collect();
        let mut unit_start = 0;
        for c in 1..width {
            let changed = texts
                .iter()
                .zip(&prev_mask)
                .any(|(t, &gap)| (t[c] == b'-') != gap);
            if changed {
                units.push((unit_start, c));
                unit_start = c;
                for (r, t) in texts.iter().enumerate() {
                    prev_mask[r] = t[c] == b'-';
                }
            }
        }
        units.push((unit_start, width));

        // walk units, writing DNA and collecting each row's forward-strand
        // interval starts; reverse rows advance downward in forward space
        let mut cursor: Vec<GenomicPos> = rows
            .iter()
            .map(|r| if r.reversed { r.gend } else { r.gstart })
            .collect();
        let mut contributions: Vec<Vec<Option<GenomicPos>>> =
            vec![Vec::with_capacity(units.len()); rows.len()];
        for &(c0, c1) in &units {
            let len = (c1 - c0) as GenomicPos;
            for (r, row) in rows.iter().enumerate() {
                if texts[r][c0] == b'-' {
                    contributions[r].push(None);
                    continue;
                }
                let start = if row.reversed {
                    // the text is the reverse complement of the forward strand
                    let start = cursor[r] - len;
                    let dna = &mut self.graph.genome_mut(row.genome).dna;
                    for (k, c) in (c0..c1).enumerate() {
                        let pos = cursor[r] - 1 - k as GenomicPos;
                        dna[pos as usize] = complement(texts[r][c]);
                    }
                    cursor[r] = start;
                    start
                } else {
                    let start = cursor[r];
                    let dna = &mut self.graph.genome_mut(row.genome).dna;
                    for (k, c) in (c0..c1).enumerate() {
                        dna[(start + k as GenomicPos) as usize] = texts[r][c];
                    }
                    cursor[r] += len;
                    start
                };
                contributions[r].push(Some(start));
            }
        }

        let anchored = |r: usize| -> Vec<(usize, GenomicPos, GenomicPos)> {
            let mut list: Vec<_> = units
                .iter()
                .enumerate()
                .filter_map(|(u, &(c0, c1))| {
                    contributions[r][u].map(|start| (u, start, (c1 - c0) as GenomicPos))
                })
                .collect();
            if rows[r].reversed {
                // ascending coordinate order for append-only arrays
                list.reverse();
            }
            list
        };

        // reference units become Bottom Segments; remember their indices so
        // child rows can back-reference them
        let ref_reversed = ref_row.map(|r| rows[r].reversed).unwrap_or(false);
        let mut bottom_index: Vec<Option<usize>> = vec![None; units.len()];
        if let Some(rr) = ref_row {
            for (u, start, len) in anchored(rr) {
                bottom_index[u] = Some(self.append_bottom(start, len)?);
            }
        }

        // child units become Top Segments, linked to the concurrently
        // assigned Bottom Segment of the same unit (ref-gap units stay
        // unlinked: insertions relative to the root)
        for (r, row) in rows.iter().enumerate() {
            if Some(r) == ref_row {
                continue;
            }
            let rel_reversed = row.reversed != ref_reversed;
            for (u, start, len) in anchored(r) {
                let parent_index = bottom_index[u];
                let top_index =
                    self.append_top(row.genome, start, len, parent_index, rel_reversed)?;
                if let Some(bi) = parent_index {
                    let link = ChildLink {
                        child: row.genome,
                        top_index,
                        reversed: rel_reversed,
                    };
                    self.graph.genome_mut(self.root).bottom[bi].children.push(link);
                }
            }
        }
        Ok(())
    }

    /// Close the ingestion pass: pad every genome out to its declared
    /// length and run the structural validation. Any violation here is
    /// fatal for the whole run.
    pub fn finalize(mut self) -> BuildResult<AlignmentGraph> {
        let ids: Vec<GenomeId> = self.graph.genomes().map(|(id, _)| id).collect();
        for id in ids {
            let total = self.graph.genome(id).total_length;
            self.advance_to(id, total)?;
        }
        self.graph.validate()?;
        log::info!(
            "segment graph finalized: {} genomes",
            self.graph.len()
        );
        Ok(self.graph)
    }
}

/// Two-pass convenience: scan dimensions, then build the graph from the
/// same MAF file.
pub fn build_from_maf<P: AsRef<Path>>(path: P, ref_genome: &str) -> anyhow::Result<AlignmentGraph> {
    let dims = crate::dims::scan_maf(&path)?;
    let mut builder = GraphBuilder::new(dims, ref_genome)?;
    for block in MafReader::open(&path)? {
        builder.add_block(&block?)?;
    }
    Ok(builder.finalize()?)
}
