//! Extract command implementation - project reference intervals back to MAF

use anyhow::{anyhow, Context, Result};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;

use treealign_core::export::{ColumnExporter, ExportParams};
use treealign_core::io::bed;
use treealign_core::io::maf::MafWriter;
use treealign_core::build_from_maf;

use crate::config::Config;

pub fn execute(
    config: &Config,
    maf: PathBuf,
    ref_genome: String,
    out: Option<PathBuf>,
    sequence: Option<String>,
    start: u64,
    length: Option<u64>,
    bed_path: Option<PathBuf>,
    targets: Vec<String>,
    max_block_length: Option<usize>,
) -> Result<()> {
    if sequence.is_none() && bed_path.is_none() {
        return Err(anyhow!(
            "Nothing to extract: pass --sequence or --bed"
        ));
    }

    log::info!("Ingesting {}", maf.display());
    let graph = build_from_maf(&maf, &ref_genome)
        .with_context(|| format!("Failed to build alignment graph from {}", maf.display()))?;
    log::info!("Graph built: {} genomes", graph.len());

    let params = ExportParams {
        max_block_length: max_block_length.unwrap_or(config.export.max_block_length),
        targets: if targets.is_empty() {
            config.export.targets.clone()
        } else {
            targets
        },
    };
    let exporter = ColumnExporter::new(&graph, params);

    let sink: Box<dyn Write> = match &out {
        Some(path) => Box::new(BufWriter::new(
            File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    };
    let mut writer = MafWriter::new(sink);
    writer.write_header()?;

    if let Some(sequence) = sequence {
        let rg = graph
            .genome_by_name(&ref_genome)
            .ok_or_else(|| anyhow!("Reference genome {} not found", ref_genome))?;
        let seq = graph
            .genome(rg)
            .sequence(&sequence)
            .ok_or_else(|| anyhow!("Sequence {} not found in genome {}", sequence, ref_genome))?;
        let length = length.unwrap_or(seq.length.saturating_sub(start));
        exporter.export_interval(&mut writer, &ref_genome, &sequence, start, length)?;
    }

    if let Some(bed_path) = bed_path {
        let file = File::open(&bed_path)
            .with_context(|| format!("Failed to open BED file: {}", bed_path.display()))?;
        let (regions, parse_diagnostics) = bed::read_regions(BufReader::new(file))?;
        let export_diagnostics = exporter.export_regions(&mut writer, &ref_genome, &regions)?;
        let skipped = parse_diagnostics.len() + export_diagnostics.len();
        if skipped > 0 {
            log::warn!("Skipped {} invalid BED units", skipped);
        }
    }

    writer.into_inner().flush()?;
    if let Some(path) = out {
        log::info!("Output written to: {}", path.display());
    }

    Ok(())
}
