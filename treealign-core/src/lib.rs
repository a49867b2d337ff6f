//! TreeAlign Core Library
//!
//! Segment-graph engine for hierarchical multiple-genome alignments:
//! MAF/BED parsers, interval coverage cache, graph ingestion, spanning-tree
//! genome selection, and column export.

pub mod build;
pub mod cache;
pub mod dims;
pub mod export;
pub mod graph;
pub mod io;
pub mod select;
pub mod types;

// Re-export commonly used types and functions
pub use build::{build_from_maf, GraphBuilder};
pub use cache::PositionCache;
pub use dims::{scan_maf, DimMap, DimScanner};
pub use export::{ColumnExporter, ExportError, ExportParams};
pub use graph::{AlignmentGraph, BottomSegment, Genome, TopSegment};
pub use io as formats;
pub use select::genomes_in_spanning_tree;
pub use types::{GenomeId, GenomicPos, SegmentIndex, Strand};

/// Version information for the TreeAlign core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
