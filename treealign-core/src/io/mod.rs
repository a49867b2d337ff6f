//! Text-format I/O for the alignment graph: MAF block reading/writing and
//! BED region input.

pub mod bed;
pub mod maf;

pub use bed::{BedBlock, BedError, BedIntervals, BedLine};
pub use maf::{MafBlock, MafError, MafReader, MafRecord, MafWriter};
