//! The alignment graph: a rooted tree of genomes, each carrying ordered
//! Top/Bottom segment arrays that encode ancestry-linked coordinate
//! mappings, plus the DNA bases filled in during ingestion.
//!
//! Genomes live in an arena and reference each other by stable integer
//! ids; segment cross-links are plain indices into the neighbouring
//! genome's segment array. Everything here is immutable once ingestion
//! finalizes; export reads it concurrently without locking.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::types::{GenomeId, GenomicPos, SegmentIndex};

/// Structural errors detected by [`AlignmentGraph::validate`]. All of these
/// are fatal: a graph that fails validation cannot be trusted for any
/// genome.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("alignment graph has no root genome")]
    NoRoot,

    #[error("genome {genome}: segments cover {covered} of {declared} declared bases")]
    CoverageMismatch {
        genome: String,
        covered: GenomicPos,
        declared: GenomicPos,
    },

    #[error("genome {genome}: segment array not contiguous at position {position}")]
    NotContiguous { genome: String, position: GenomicPos },

    #[error("genome {genome}: top segment {index} references missing bottom segment {parent_index}")]
    DanglingParentRef {
        genome: String,
        index: SegmentIndex,
        parent_index: SegmentIndex,
    },

    #[error(
        "genome {genome}: bottom segment {index} references missing top segment {top_index} in child {child}"
    )]
    DanglingChildRef {
        genome: String,
        index: SegmentIndex,
        child: String,
        top_index: SegmentIndex,
    },

    #[error("genome {genome}: segment link {index} joins intervals of different lengths")]
    MismatchedLink { genome: String, index: SegmentIndex },
}

pub type GraphResult<T> = Result<T, GraphError>;

/// A named, contiguous coordinate sub-range within a genome's linear
/// coordinate space. `start` is the offset of the first base within the
/// genome; `length` is fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence {
    pub name: String,
    pub start: GenomicPos,
    pub length: GenomicPos,
}

/// An interval in a child genome's coordinate space with a back-reference
/// to the anchoring Bottom Segment in the parent. `parent_index` is `None`
/// for unaligned filler and for insertions relative to the parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopSegment {
    pub start: GenomicPos,
    pub length: GenomicPos,
    pub parent_index: Option<SegmentIndex>,
    /// Orientation of this interval relative to its parent anchor.
    pub reversed: bool,
}

/// Forward reference from a Bottom Segment to one anchored Top Segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildLink {
    pub child: GenomeId,
    pub top_index: SegmentIndex,
    pub reversed: bool,
}

/// An interval in an ancestor genome's coordinate space anchoring zero or
/// more Top Segments from its children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BottomSegment {
    pub start: GenomicPos,
    pub length: GenomicPos,
    pub children: Vec<ChildLink>,
}

impl TopSegment {
    pub fn end(&self) -> GenomicPos {
        self.start + self.length
    }
}

impl BottomSegment {
    pub fn end(&self) -> GenomicPos {
        self.start + self.length
    }
}

/// One node of the rooted genome tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Genome {
    pub name: String,
    pub parent: Option<GenomeId>,
    pub children: Vec<GenomeId>,
    pub sequences: Vec<Sequence>,
    seq_map: HashMap<String, usize>,
    pub total_length: GenomicPos,
    pub top: Vec<TopSegment>,
    pub bottom: Vec<BottomSegment>,
    /// One byte per genome position; positions never written by ingestion
    /// stay 'N'.
    pub dna: Vec<u8>,
}

impl Genome {
    fn new(name: &str, parent: Option<GenomeId>) -> Self {
        Self {
            name: name.to_string(),
            parent,
            children: Vec::new(),
            sequences: Vec::new(),
            seq_map: HashMap::new(),
            total_length: 0,
            top: Vec::new(),
            bottom: Vec::new(),
            dna: Vec::new(),
        }
    }

    /// Append a sequence; its offset is the running total length. Returns
    /// the sequence index within this genome.
    pub fn add_sequence(&mut self, name: &str, length: GenomicPos) -> usize {
        let index = self.sequences.len();
        self.sequences.push(Sequence {
            name: name.to_string(),
            start: self.total_length,
            length,
        });
        self.seq_map.insert(name.to_string(), index);
        self.total_length += length;
        self.dna.resize(self.total_length as usize, b'N');
        index
    }

    pub fn sequence(&self, name: &str) -> Option<&Sequence> {
        self.seq_map.get(name).map(|&i| &self.sequences[i])
    }

    /// Index of the sequence containing a genome position.
    pub fn sequence_index_at(&self, pos: GenomicPos) -> Option<usize> {
        if pos >= self.total_length {
            return None;
        }
        let i = self.sequences.partition_point(|s| s.start <= pos);
        // i > 0 because the first sequence starts at 0
        Some(i - 1)
    }

    pub fn base(&self, pos: GenomicPos) -> u8 {
        self.dna[pos as usize]
    }

    /// Top segment containing `pos`, with its array index.
    pub fn top_at(&self, pos: GenomicPos) -> Option<(SegmentIndex, &TopSegment)> {
        let i = self.top.partition_point(|t| t.start <= pos);
        if i == 0 {
            return None;
        }
        let seg = &self.top[i - 1];
        (pos < seg.end()).then_some((i - 1, seg))
    }

    /// Bottom segment containing `pos`, with its array index.
    pub fn bottom_at(&self, pos: GenomicPos) -> Option<(SegmentIndex, &BottomSegment)> {
        let i = self.bottom.partition_point(|b| b.start <= pos);
        if i == 0 {
            return None;
        }
        let seg = &self.bottom[i - 1];
        (pos < seg.end()).then_some((i - 1, seg))
    }
}

/// Arena of genomes forming a rooted tree. Exactly one genome has no
/// parent once any genome exists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlignmentGraph {
    genomes: Vec<Genome>,
    name_map: HashMap<String, GenomeId>,
    root: Option<GenomeId>,
}

impl AlignmentGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a genome if absent and return its id; idempotent, keyed by
    /// name. The first genome inserted with no parent becomes the root.
    pub fn insert_genome(&mut self, name: &str, parent: Option<GenomeId>) -> GenomeId {
        if let Some(&id) = self.name_map.get(name) {
            return id;
        }
        let id = self.genomes.len();
        self.genomes.push(Genome::new(name, parent));
        self.name_map.insert(name.to_string(), id);
        match parent {
            Some(p) => self.genomes[p].children.push(id),
            None => self.root = Some(id),
        }
        id
    }

    pub fn genome(&self, id: GenomeId) -> &Genome {
        &self.genomes[id]
    }

    pub(crate) fn genome_mut(&mut self, id: GenomeId) -> &mut Genome {
        &mut self.genomes[id]
    }

    pub fn genome_by_name(&self, name: &str) -> Option<GenomeId> {
        self.name_map.get(name).copied()
    }

    pub fn root(&self) -> Option<GenomeId> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.genomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genomes.is_empty()
    }

    pub fn genomes(&self) -> impl Iterator<Item = (GenomeId, &Genome)> {
        self.genomes.iter().enumerate()
    }

    /// Structural validation run at ingestion finalize: segment arrays must
    /// partition each genome's declared length exactly, and every segment
    /// cross-link must resolve to an interval of the same length.
    pub fn validate(&self) -> GraphResult<()> {
        if self.root.is_none() && !self.genomes.is_empty() {
            return Err(GraphError::NoRoot);
        }
        for genome in &self.genomes {
            if !genome.top.is_empty() || genome.parent.is_some() {
                Self::check_partition(
                    &genome.name,
                    genome.total_length,
                    genome.top.iter().map(|t| (t.start, t.length)),
                )?;
            }
            if !genome.bottom.is_empty() || !genome.children.is_empty() {
                Self::check_partition(
                    &genome.name,
                    genome.total_length,
                    genome.bottom.iter().map(|b| (b.start, b.length)),
                )?;
            }
            if let Some(parent) = genome.parent {
                let parent_genome = &self.genomes[parent];
                for (i, top) in genome.top.iter().enumerate() {
                    if let Some(pi) = top.parent_index {
                        let bottom = parent_genome.bottom.get(pi).ok_or_else(|| {
                            GraphError::DanglingParentRef {
                                genome: genome.name.clone(),
                                index: i,
                                parent_index: pi,
                            }
                        })?;
                        if bottom.length != top.length {
                            return Err(GraphError::MismatchedLink {
                                genome: genome.name.clone(),
                                index: i,
                            });
                        }
                    }
                }
            }
            for (i, bottom) in genome.bottom.iter().enumerate() {
                for link in &bottom.children {
                    let child = self
                        .genomes
                        .get(link.child)
                        .and_then(|c| c.top.get(link.top_index));
                    match child {
                        Some(top) if top.length == bottom.length => {}
                        Some(_) => {
                            return Err(GraphError::MismatchedLink {
                                genome: genome.name.clone(),
                                index: i,
                            })
                        }
                        None => {
                            return Err(GraphError::DanglingChildRef {
                                genome: genome.name.clone(),
                                index: i,
                                child: self
                                    .genomes
                                    .get(link.child)
                                    .map(|c| c.name.clone())
                                    .unwrap_or_else(|| format!("#{}", link.child)),
                                top_index: link.top_index,
                            })
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn check_partition(
        name: &str,
        declared: GenomicPos,
        segments: impl Iterator<Item = (GenomicPos, GenomicPos)>,
    ) -> GraphResult<()> {
        let mut cursor = 0;
        for (start, length) in segments {
            if start != cursor {
                return Err(GraphError::NotContiguous {
                    genome: name.to_string(),
                    position: start,
                });
            }
            cursor += length;
        }
        if cursor != declared {
            return Err(GraphError::CoverageMismatch {
                genome: name.to_string(),
                covered: cursor,
                declared,
            });
        }
        Ok(())
    }
}
