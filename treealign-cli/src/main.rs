use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "treealign")]
#[command(about = "TreeAlign - Segment-graph engine for multi-genome alignments")]
#[command(version)]
#[command(long_about = "
TreeAlign ingests MAF alignments into a reference-rooted segment graph and
exports aligned columns back to MAF for arbitrary reference intervals and
genome subsets.

Examples:
  treealign extract --maf aln.maf --ref-genome hg38 --sequence chr1 --start 1000 --length 500 --out slice.maf
  treealign extract --maf aln.maf.gz --ref-genome hg38 --bed regions.bed --targets mouse,rat --out slice.maf
  treealign check --maf aln.maf --ref-genome hg38
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract aligned columns for reference intervals as MAF
    Extract {
        /// Input MAF file (.maf or .maf.gz)
        #[arg(long, required = true)]
        maf: PathBuf,

        /// Reference genome name (graph root)
        #[arg(long, required = true)]
        ref_genome: String,

        /// Output MAF file (stdout if omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Reference sequence name (with --start/--length)
        #[arg(long, conflicts_with = "bed")]
        sequence: Option<String>,

        /// Interval start within the sequence, zero-based
        #[arg(long, requires = "sequence", default_value = "0")]
        start: u64,

        /// Interval length in bases (to sequence end if omitted)
        #[arg(long, requires = "sequence")]
        length: Option<u64>,

        /// BED file of reference regions to extract
        #[arg(long)]
        bed: Option<PathBuf>,

        /// Target genomes, comma-separated (all genomes if omitted)
        #[arg(long, value_delimiter = ',')]
        targets: Vec<String>,

        /// Maximum output block width in columns
        #[arg(long)]
        max_block_length: Option<usize>,
    },

    /// Ingest a MAF file and report graph statistics
    Check {
        /// Input MAF file (.maf or .maf.gz)
        #[arg(long, required = true)]
        maf: PathBuf,

        /// Reference genome name (graph root)
        #[arg(long, required = true)]
        ref_genome: String,
    },
}

fn setup_logging(verbose: u8, quiet: bool) -> Result<()> {
    if quiet {
        std::env::set_var("RUST_LOG", "error");
    } else {
        let level = match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        std::env::set_var("RUST_LOG", level);
    }

    env_logger::Builder::from_default_env()
        .format_timestamp_secs()
        .init();

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet)?;

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Extract {
            maf,
            ref_genome,
            out,
            sequence,
            start,
            length,
            bed,
            targets,
            max_block_length,
        } => {
            commands::extract::execute(
                &config,
                maf,
                ref_genome,
                out,
                sequence,
                start,
                length,
                bed,
                targets,
                max_block_length,
            )?;
        }

        Commands::Check { maf, ref_genome } => {
            commands::check::execute(maf, ref_genome)?;
        }
    }

    Ok(())
}
