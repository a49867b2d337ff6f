//! Column export: reconstructing aligned MAF columns for a reference
//! interval across a target genome set.
//!
//! For every base of a validated reference interval the exporter walks the
//! segment graph — up through Top→Bottom back-references and down through
//! Bottom→child links — restricted to the spanning-tree selection of the
//! targets, then merges contiguous columns into MAF blocks. A genome that
//! is unreachable at a column contributes no row (absent); a genome that
//! drops out for part of a block is padded with gap characters.
//!
//! Export is read-only against a finalized graph; callers may run
//! independent intervals in parallel.

use std::collections::{HashMap, HashSet};
use std::io::{self, Write};

use thiserror::Error;

use crate::cache::PositionCache;
use crate::graph::AlignmentGraph;
use crate::io::bed::{BedIntervals, BedLine};
use crate::io::maf::{MafBlock, MafRecord, MafWriter};
use crate::select::{genomes_in_spanning_tree, SelectError};
use crate::types::{complement, GenomeId, GenomicPos, Strand};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("alignment graph has no root genome")]
    EmptyGraph,

    #[error("genome {0} not found in alignment")]
    GenomeNotFound(String),

    #[error("sequence {sequence} not found in genome {genome}")]
    SequenceNotFound { genome: String, sequence: String },

    #[error("invalid interval [{start}, {end}) in sequence {sequence}")]
    InvalidInterval {
        sequence: String,
        start: GenomicPos,
        end: GenomicPos,
    },

    #[error(transparent)]
    Select(#[from] SelectError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type ExportResult<T> = Result<T, ExportError>;

#[derive(Debug, Clone)]
pub struct ExportParams {
    /// Upper bound on emitted block width, in columns.
    pub max_block_length: usize,
    /// Target genome names; empty selects every genome in the graph.
    pub targets: Vec<String>,
}

impl Default for ExportParams {
    fn default() -> Self {
        Self {
            max_block_length: 10_000,
            targets: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ColumnEntry {
    genome: GenomeId,
    pos: GenomicPos,
    /// Orientation relative to the reference row.
    reversed: bool,
}

pub struct ColumnExporter<'a> {
    graph: &'a AlignmentGraph,
    params: ExportParams,
}

impl<'a> ColumnExporter<'a> {
    pub fn new(graph: &'a AlignmentGraph, params: ExportParams) -> Self {
        Self { graph, params }
    }

    /// Spanning-tree selection over the targets plus the reference genome.
    fn selection(&self, ref_genome: GenomeId) -> ExportResult<HashSet<GenomeId>> {
        let root = self.graph.root().ok_or(ExportError::EmptyGraph)?;
        let mut input: HashSet<GenomeId> = if self.params.targets.is_empty() {
            self.graph.genomes().map(|(id, _)| id).collect()
        } else {
            self.params
                .targets
                .iter()
                .map(|name| {
                    self.graph
                        .genome_by_name(name)
                        .ok_or_else(|| ExportError::GenomeNotFound(name.clone()))
                })
                .collect::<ExportResult<_>>()?
        };
        input.insert(ref_genome);
        Ok(genomes_in_spanning_tree(self.graph, root, &input)?)
    }

    /// Export one reference interval given in sequence-local coordinates.
    /// Interval validation here is a hard error; batch callers wanting the
    /// skip-and-continue behavior go through [`ColumnExporter::export_regions`].
    pub fn export_interval<W: Write>(
        &self,
        out: &mut MafWriter<W>,
        ref_genome: &str,
        sequence: &str,
        start: GenomicPos,
        length: GenomicPos,
    ) -> ExportResult<()> {
        let rg = self
            .graph
            .genome_by_name(ref_genome)
            .ok_or_else(|| ExportError::GenomeNotFound(ref_genome.to_string()))?;
        let seq = self
            .graph
            .genome(rg)
            .sequence(sequence)
            .ok_or_else(|| ExportError::SequenceNotFound {
                genome: ref_genome.to_string(),
                sequence: sequence.to_string(),
            })?;
        if length == 0 || start + length > seq.length {
            return Err(ExportError::InvalidInterval {
                sequence: sequence.to_string(),
                start,
                end: start + length,
            });
        }
        let gstart = seq.start + start;
        let selection = self.selection(rg)?;
        self.export_run(out, rg, gstart, length, &selection)
    }

    /// BED-driven batch export. Local validation failures (bad coordinates,
    /// unresolved sequence names) are reported as diagnostics and the unit
    /// is skipped; one invalid unit never aborts its siblings. The returned
    /// diagnostics are also logged as warnings.
    pub fn export_regions<W: Write>(
        &self,
        out: &mut MafWriter<W>,
        ref_genome: &str,
        regions: &[BedLine],
    ) -> ExportResult<Vec<String>> {
        let rg = self
            .graph
            .genome_by_name(ref_genome)
            .ok_or_else(|| ExportError::GenomeNotFound(ref_genome.to_string()))?;
        let selection = self.selection(rg)?;
        let genome = self.graph.genome(rg);

        let mut diagnostics = Vec::new();
        let mut diagnose = |msg: String| {
            log::warn!("{}", msg);
            diagnostics.push(msg);
        };

        for line in regions {
            let seq = match genome.sequence(&line.chrom) {
                Some(seq) => seq,
                None => {
                    diagnose(format!(
                        "Line {}: BED sequence {} not found in genome {}",
                        line.line_number, line.chrom, genome.name
                    ));
                    continue;
                }
            };
            match &line.intervals {
                BedIntervals::Single => {
                    if line.end <= line.start || line.end > seq.length {
                        diagnose(format!(
                            "Line {}: BED coordinates invalid",
                            line.line_number
                        ));
                    } else {
                        self.export_run(
                            out,
                            rg,
                            seq.start + line.start,
                            line.end - line.start,
                            &selection,
                        )?;
                    }
                }
                BedIntervals::Blocked(blocks) => {
                    for (i, block) in blocks.iter().enumerate() {
                        if block.length == 0 || block.start + block.length >= seq.length {
                            diagnose(format!(
                                "Line {}, block {}: BED coordinates invalid",
                                line.line_number, i
                            ));
                        } else {
                            self.export_run(
                                out,
                                rg,
                                seq.start + block.start,
                                block.length,
                                &selection,
                            )?;
                        }
                    }
                }
            }
        }
        Ok(diagnostics)
    }

    /// Emit the columns of one contiguous reference run (genome
    /// coordinates), flushing whenever a column cannot extend the open
    /// block or the block reaches its length cap.
    fn export_run<W: Write>(
        &self,
        out: &mut MafWriter<W>,
        ref_genome: GenomeId,
        gstart: GenomicPos,
        length: GenomicPos,
        selection: &HashSet<GenomeId>,
    ) -> ExportResult<()> {
        let mut block = BlockBuilder::new();
        for pos in gstart..gstart + length {
            let column = self.walk_column(ref_genome, pos, selection);
            if !block.try_push(self.graph, &column) {
                block.flush(self.graph, out)?;
                let pushed = block.try_push(self.graph, &column);
                debug_assert!(pushed, "empty block must accept any column");
            }
            if block.width >= self.params.max_block_length {
                block.flush(self.graph, out)?;
            }
        }
        block.flush(self.graph, out)?;
        Ok(())
    }

    /// One aligned column: every (genome, position, orientation) reachable
    /// from the reference position within the selection. The per-genome
    /// PositionCache guards against revisiting a position through
    /// duplication links.
    fn walk_column(
        &self,
        ref_genome: GenomeId,
        pos: GenomicPos,
        selection: &HashSet<GenomeId>,
    ) -> Vec<ColumnEntry> {
        let mut visited: HashMap<GenomeId, PositionCache> = HashMap::new();
        let mut stack = vec![ColumnEntry {
            genome: ref_genome,
            pos,
            reversed: false,
        }];
        let mut column = Vec::new();

        while let Some(entry) = stack.pop() {
            if !visited.entry(entry.genome).or_default().insert(entry.pos) {
                continue;
            }
            column.push(entry);
            let genome = self.graph.genome(entry.genome);

            // climb to the parent anchor
            if let Some(parent) = genome.parent {
                if selection.contains(&parent) {
                    if let Some((_, top)) = genome.top_at(entry.pos) {
                        if let Some(pi) = top.parent_index {
                            let bottom = &self.graph.genome(parent).bottom[pi];
                            let offset = entry.pos - top.start;
                            let (ppos, reversed) = if top.reversed {
                                (bottom.start + top.length - 1 - offset, !entry.reversed)
                            } else {
                                (bottom.start + offset, entry.reversed)
                            };
                            stack.push(ColumnEntry {
                                genome: parent,
                                pos: ppos,
                                reversed,
                            });
                        }
                    }
                }
            }

            // descend into anchored children
            if let Some((_, bottom)) = genome.bottom_at(entry.pos) {
                let offset = entry.pos - bottom.start;
                for link in &bottom.children {
                    if !selection.contains(&link.child) {
                        continue;
                    }
                    let top = &self.graph.genome(link.child).top[link.top_index];
                    let (cpos, reversed) = if link.reversed {
                        (top.start + top.length - 1 - offset, !entry.reversed)
                    } else {
                        (top.start + offset, entry.reversed)
                    };
                    stack.push(ColumnEntry {
                        genome: link.child,
                        pos: cpos,
                        reversed,
                    });
                }
            }
        }
        column
    }
}

/// One output row of an open block. Positions are genome coordinates;
/// reversed rows walk downward.
#[derive(Debug)]
struct BlockRow {
    genome: GenomeId,
    seq_index: usize,
    reversed: bool,
    first_pos: GenomicPos,
    last_pos: GenomicPos,
    text: Vec<u8>,
}

impl BlockRow {
    fn expected_next(&self) -> Option<GenomicPos> {
        if self.reversed {
            self.last_pos.checked_sub(1)
        } else {
            self.last_pos.checked_add(1)
        }
    }
}

/// Accumulates columns into a MAF block. The reference row is always row
/// zero; other rows open on first sight (padded with leading gaps) and are
/// padded with gaps over columns where their genome is absent.
#[derive(Debug, Default)]
struct BlockBuilder {
    rows: Vec<BlockRow>,
    width: usize,
}

impl BlockBuilder {
    fn new() -> Self {
        Self::default()
    }

    fn extends(&self, graph: &AlignmentGraph, row: &BlockRow, entry: &ColumnEntry) -> bool {
        row.genome == entry.genome
            && row.reversed == entry.reversed
            && row.expected_next() == Some(entry.pos)
            && graph.genome(entry.genome).sequence_index_at(entry.pos) == Some(row.seq_index)
    }

    /// Append one column. Returns false (leaving the block untouched) when
    /// the reference entry does not continue the reference row, which is
    /// the caller's signal to flush and retry.
    fn try_push(&mut self, graph: &AlignmentGraph, column: &[ColumnEntry]) -> bool {
        debug_assert!(!column.is_empty(), "column walk always yields the reference");

        let mut assignment: Vec<Option<usize>> = vec![None; column.len()];
        let mut taken = vec![false; self.rows.len()];
        for (i, entry) in column.iter().enumerate() {
            for (r, row) in self.rows.iter().enumerate() {
                if !taken[r] && self.extends(graph, row, entry) {
                    assignment[i] = Some(r);
                    taken[r] = true;
                    break;
                }
            }
        }
        if !self.rows.is_empty() && assignment[0] != Some(0) {
            return false;
        }

        let old_width = self.width;
        for (i, entry) in column.iter().enumerate() {
            let base = {
                let b = graph.genome(entry.genome).base(entry.pos);
                if entry.reversed {
                    complement(b)
                } else {
                    b
                }
            };
            match assignment[i] {
                Some(r) => {
                    let row = &mut self.rows[r];
                    row.last_pos = entry.pos;
                    row.text.push(base);
                }
                None => {
                    let seq_index = graph
                        .genome(entry.genome)
                        .sequence_index_at(entry.pos)
                        .unwrap_or_default();
                    let mut text = vec![b'-'; old_width];
                    text.push(base);
                    self.rows.push(BlockRow {
                        genome: entry.genome,
                        seq_index,
                        reversed: entry.reversed,
                        first_pos: entry.pos,
                        last_pos: entry.pos,
                        text,
                    });
                }
            }
        }
        for row in &mut self.rows {
            if row.text.len() == old_width {
                row.text.push(b'-');
            }
        }
        self.width = old_width + 1;
        true
    }

    fn flush<W: Write>(
        &mut self,
        graph: &AlignmentGraph,
        out: &mut MafWriter<W>,
    ) -> io::Result<()> {
        if self.rows.is_empty() {
            return Ok(());
        }
        let mut block = MafBlock::default();
        for row in &self.rows {
            let genome = graph.genome(row.genome);
            let seq = &genome.sequences[row.seq_index];
            let fwd_first = if row.reversed {
                row.last_pos
            } else {
                row.first_pos
            };
            let size = if row.reversed {
                row.first_pos - row.last_pos + 1
            } else {
                row.last_pos - row.first_pos + 1
            };
            block.records.push(MafRecord {
                genome: genome.name.clone(),
                sequence: seq.name.clone(),
                start: fwd_first - seq.start,
                size,
                strand: if row.reversed {
                    Strand::Reverse
                } else {
                    Strand::Forward
                },
                src_size: seq.length,
                text: String::from_utf8_lossy(&row.text).into_owned(),
            });
        }
        out.write_block(&block)?;
        self.rows.clear();
        self.width = 0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::GraphBuilder;
    use crate::dims::DimScanner;
    use crate::io::bed;
    use crate::io::maf::{MafReader, MafResult};
    use std::io::Cursor;

    fn build(maf: &str, ref_genome: &str) -> AlignmentGraph {
        let blocks: Vec<MafBlock> = MafReader::new(Cursor::new(maf))
            .collect::<MafResult<Vec<_>>>()
            .unwrap();
        let mut scanner = DimScanner::new();
        for block in &blocks {
            scanner.scan_block(block).unwrap();
        }
        let mut builder = GraphBuilder::new(scanner.finish(), ref_genome).unwrap();
        for block in &blocks {
            builder.add_block(block).unwrap();
        }
        builder.finalize().unwrap()
    }

    fn export_blocks(
        graph: &AlignmentGraph,
        params: ExportParams,
        run: impl FnOnce(&ColumnExporter, &mut MafWriter<Vec<u8>>) -> ExportResult<Vec<String>>,
    ) -> (Vec<MafBlock>, Vec<String>) {
        let exporter = ColumnExporter::new(graph, params);
        let mut writer = MafWriter::new(Vec::new());
        let diagnostics = run(&exporter, &mut writer).unwrap();
        let text = String::from_utf8(writer.into_inner()).unwrap();
        let blocks = MafReader::new(Cursor::new(text.as_str()))
            .collect::<MafResult<Vec<_>>>()
            .unwrap();
        (blocks, diagnostics)
    }

    const TWO_GENOME: &str = "a\n\
                              s root.chr1 0 4 + 4 ACGT\n\
                              s a.chr1 0 4 + 4 ACGT\n";

    #[test]
    fn test_round_trip_two_genomes() {
        let graph = build(TWO_GENOME, "root");
        let (blocks, _) = export_blocks(&graph, ExportParams::default(), |ex, w| {
            ex.export_interval(w, "root", "chr1", 0, 4)?;
            Ok(Vec::new())
        });
        assert_eq!(blocks.len(), 1);
        let block = &blocks[0];
        assert_eq!(block.records.len(), 2);
        assert_eq!(block.records[0].genome, "root");
        assert_eq!(block.records[0].text, "ACGT");
        assert_eq!(block.records[1].genome, "a");
        assert_eq!(block.records[1].text, "ACGT");
        assert_eq!(block.records[1].start, 0);
        assert_eq!(block.records[1].size, 4);
    }

    #[test]
    fn test_single_base_interval_accepted() {
        let graph = build(TWO_GENOME, "root");
        let (blocks, _) = export_blocks(&graph, ExportParams::default(), |ex, w| {
            ex.export_interval(w, "root", "chr1", 1, 1)?;
            Ok(Vec::new())
        });
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].records[0].text, "C");
        assert_eq!(blocks[0].records[0].start, 1);
    }

    #[test]
    fn test_invalid_intervals_rejected() {
        let graph = build(TWO_GENOME, "root");
        let exporter = ColumnExporter::new(&graph, ExportParams::default());
        let mut writer = MafWriter::new(Vec::new());
        assert!(matches!(
            exporter.export_interval(&mut writer, "root", "chr1", 2, 0),
            Err(ExportError::InvalidInterval { .. })
        ));
        assert!(matches!(
            exporter.export_interval(&mut writer, "root", "chr1", 2, 3),
            Err(ExportError::InvalidInterval { .. })
        ));
        assert!(matches!(
            exporter.export_interval(&mut writer, "root", "chr9", 0, 1),
            Err(ExportError::SequenceNotFound { .. })
        ));
    }

    #[test]
    fn test_target_restriction() {
        let maf = "a\n\
                   s root.chr1 0 4 + 4 ACGT\n\
                   s a.chr1 0 4 + 4 ACGT\n\
                   s b.chr1 0 4 + 4 AGGT\n";
        let graph = build(maf, "root");
        let params = ExportParams {
            targets: vec!["a".to_string()],
            ..Default::default()
        };
        let (blocks, _) = export_blocks(&graph, params, |ex, w| {
            ex.export_interval(w, "root", "chr1", 0, 4)?;
            Ok(Vec::new())
        });
        let names: Vec<_> = blocks[0].records.iter().map(|r| r.genome.as_str()).collect();
        assert_eq!(names, vec!["root", "a"]);
    }

    #[test]
    fn test_absent_genome_contributes_no_row() {
        // b only aligns over the first two reference bases
        let maf = "a\n\
                   s root.chr1 0 2 + 4 AC\n\
                   s a.chr1 0 2 + 4 AC\n\
                   s b.chr1 0 2 + 2 AC\n\
                   \n\
                   a\n\
                   s root.chr1 2 2 + 4 GT\n\
                   s a.chr1 2 2 + 4 GT\n";
        let graph = build(maf, "root");
        let (blocks, _) = export_blocks(&graph, ExportParams::default(), |ex, w| {
            ex.export_interval(w, "root", "chr1", 2, 2)?;
            Ok(Vec::new())
        });
        assert_eq!(blocks.len(), 1);
        let names: Vec<_> = blocks[0].records.iter().map(|r| r.genome.as_str()).collect();
        assert!(!names.contains(&"b"));
    }

    #[test]
    fn test_gap_padding_within_block() {
        // a is deleted over the middle two reference bases
        let maf = "a\n\
                   s root.chr1 0 4 + 4 ACGT\n\
                   s a.chr1 0 2 + 2 A--T\n";
        let graph = build(maf, "root");
        let (blocks, _) = export_blocks(&graph, ExportParams::default(), |ex, w| {
            ex.export_interval(w, "root", "chr1", 0, 4)?;
            Ok(Vec::new())
        });
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].records[0].text, "ACGT");
        assert_eq!(blocks[0].records[1].text, "A--T");
        assert_eq!(blocks[0].records[1].size, 2);
    }

    #[test]
    fn test_reverse_strand_row_rendered() {
        let maf = "a\n\
                   s root.chr1 0 4 + 4 ACGT\n\
                   s a.chr1 0 4 - 4 AAAA\n";
        let graph = build(maf, "root");
        let (blocks, _) = export_blocks(&graph, ExportParams::default(), |ex, w| {
            ex.export_interval(w, "root", "chr1", 0, 4)?;
            Ok(Vec::new())
        });
        let row = &blocks[0].records[1];
        assert_eq!(row.strand, Strand::Reverse);
        assert_eq!(row.text, "AAAA");
        assert_eq!(row.size, 4);
    }

    #[test]
    fn test_max_block_length_splits_output() {
        let graph = build(TWO_GENOME, "root");
        let params = ExportParams {
            max_block_length: 2,
            ..Default::default()
        };
        let (blocks, _) = export_blocks(&graph, params, |ex, w| {
            ex.export_interval(w, "root", "chr1", 0, 4)?;
            Ok(Vec::new())
        });
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].records[0].text, "AC");
        assert_eq!(blocks[1].records[0].text, "GT");
        assert_eq!(blocks[1].records[0].start, 2);
    }

    #[test]
    fn test_paralog_rows_rendered_separately() {
        // two rows of the same genome aligned to one reference segment:
        // the bottom segment carries two child links and export emits both
        let maf = "a\n\
                   s root.chr1 0 4 + 4 ACGT\n\
                   s dup.chr1 0 4 + 8 ACGT\n\
                   s dup.chr1 4 4 + 8 AGGT\n";
        let graph = build(maf, "root");
        let root = graph.genome_by_name("root").unwrap();
        assert_eq!(graph.genome(root).bottom[0].children.len(), 2);

        let (blocks, _) = export_blocks(&graph, ExportParams::default(), |ex, w| {
            ex.export_interval(w, "root", "chr1", 0, 4)?;
            Ok(Vec::new())
        });
        assert_eq!(blocks.len(), 1);
        let dup_rows: Vec<_> = blocks[0]
            .records
            .iter()
            .filter(|r| r.genome == "dup")
            .collect();
        assert_eq!(dup_rows.len(), 2);
        let mut starts: Vec<_> = dup_rows.iter().map(|r| r.start).collect();
        starts.sort_unstable();
        assert_eq!(starts, vec![0, 4]);
        let mut texts: Vec<_> = dup_rows.iter().map(|r| r.text.as_str()).collect();
        texts.sort_unstable();
        assert_eq!(texts, vec!["ACGT", "AGGT"]);
    }

    fn bed_lines(input: &str) -> Vec<bed::BedLine> {
        bed::read_regions(Cursor::new(input)).unwrap().0
    }

    #[test]
    fn test_bed_boundary_rejection() {
        let graph = build(TWO_GENOME, "root");
        // start == end; end past length; then a valid single-base region
        let regions = bed_lines("chr1\t2\t2\nchr1\t0\t5\nchr1\t1\t2\n");
        let (blocks, diagnostics) = export_blocks(&graph, ExportParams::default(), |ex, w| {
            ex.export_regions(w, "root", &regions)
        });
        assert_eq!(
            diagnostics,
            vec![
                "Line 1: BED coordinates invalid",
                "Line 2: BED coordinates invalid"
            ]
        );
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].records[0].text, "C");
    }

    #[test]
    fn test_bed_end_at_length_accepted() {
        let graph = build(TWO_GENOME, "root");
        let regions = bed_lines("chr1\t0\t4\n");
        let (blocks, diagnostics) = export_blocks(&graph, ExportParams::default(), |ex, w| {
            ex.export_regions(w, "root", &regions)
        });
        assert!(diagnostics.is_empty());
        assert_eq!(blocks.len(), 1);
    }

    #[test]
    fn test_bed_unknown_sequence_diagnostic() {
        let graph = build(TWO_GENOME, "root");
        let regions = bed_lines("chrX\t0\t2\n");
        let (blocks, diagnostics) = export_blocks(&graph, ExportParams::default(), |ex, w| {
            ex.export_regions(w, "root", &regions)
        });
        assert!(blocks.is_empty());
        assert_eq!(
            diagnostics,
            vec!["Line 1: BED sequence chrX not found in genome root"]
        );
    }

    #[test]
    fn test_bed_blocked_regions() {
        let maf = "a\n\
                   s root.chr1 0 8 + 8 ACGTACGT\n\
                   s a.chr1 0 8 + 8 ACGTACGT\n";
        let graph = build(maf, "root");
        // blocks [0,2) and [4,6); a third zero-length block is rejected
        // with its index
        let regions = bed_lines("chr1 0 8 n 0 + 0 8 0 3 2,2,0 0,4,6\n");
        let (blocks, diagnostics) = export_blocks(&graph, ExportParams::default(), |ex, w| {
            ex.export_regions(w, "root", &regions)
        });
        assert_eq!(diagnostics, vec!["Line 1, block 2: BED coordinates invalid"]);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].records[0].text, "AC");
        assert_eq!(blocks[1].records[0].text, "AC");
        assert_eq!(blocks[1].records[0].start, 4);
    }

    #[test]
    fn test_bed_block_touching_final_base_rejected() {
        let graph = build(TWO_GENOME, "root");
        // abs start 2 + length 2 == sequence length 4: rejected by the >=
        // comparison
        let regions = bed_lines("chr1 0 4 n 0 + 0 4 0 1 2 2\n");
        let (blocks, diagnostics) = export_blocks(&graph, ExportParams::default(), |ex, w| {
            ex.export_regions(w, "root", &regions)
        });
        assert!(blocks.is_empty());
        assert_eq!(diagnostics, vec!["Line 1, block 0: BED coordinates invalid"]);
    }
}
