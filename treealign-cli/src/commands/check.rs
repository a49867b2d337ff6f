//! Check command implementation - ingest a MAF and report graph statistics

use anyhow::{Context, Result};
use std::path::PathBuf;

use treealign_core::build_from_maf;

pub fn execute(maf: PathBuf, ref_genome: String) -> Result<()> {
    log::info!("Ingesting {}", maf.display());
    let graph = build_from_maf(&maf, &ref_genome)
        .with_context(|| format!("Failed to build alignment graph from {}", maf.display()))?;

    println!("Genomes: {}", graph.len());
    for (_, genome) in graph.genomes() {
        let role = if genome.parent.is_none() {
            "root"
        } else {
            "leaf"
        };
        println!(
            "  {} ({}): {} sequences, {} bases, {} top / {} bottom segments",
            genome.name,
            role,
            genome.sequences.len(),
            genome.total_length,
            genome.top.len(),
            genome.bottom.len(),
        );
    }

    Ok(())
}
