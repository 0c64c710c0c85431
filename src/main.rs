use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{error, info, Level};
use simple_logger::init_with_level;

use ltrflank::config::{
    EXTRACTED_SEQUENCES, FILTERED_HITS, INDEX_SUFFIX, REPEATING_REGIONS, REPORT_SUFFIX,
};
use ltrflank::dir::expand_inputs;
use ltrflank::{alignment, pipeline, Assembler, HitIndex, RepeatIndex};

#[derive(Parser)]
#[command(name = "ltrflank")]
#[command(about = "ltrflank: LTR flank extraction and repeat filtering")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[arg(short = 'v', long = "verbose", global = true, help = "Log debug messages")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse motif-scan reports into per-source hit indexes
    Hits {
        #[arg(
            short = 'r',
            long = "reports",
            required = true,
            value_name = "PATHS",
            value_delimiter = ',',
            num_args = 1..,
            help = "Report files or directories holding .fuzznuc reports"
        )]
        reports: Vec<PathBuf>,

        #[arg(
            short = 'o',
            long = "outdir",
            value_name = "DIR",
            default_value = ".",
            help = "Directory for the <source>.json hit indexes"
        )]
        outdir: PathBuf,
    },
    /// Fill hit indexes with flank and motif sequences from the reads files
    Extract {
        #[arg(
            short = 'j',
            long = "json",
            required = true,
            value_name = "PATHS",
            value_delimiter = ',',
            num_args = 1..,
            help = "Hit index files or directories holding them"
        )]
        json: Vec<PathBuf>,

        #[arg(
            short = 'f',
            long = "fasta-dir",
            value_name = "DIR",
            default_value = ".",
            help = "Directory holding the <source>.FASTA reads files"
        )]
        fasta_dir: PathBuf,

        #[arg(
            short = 'o',
            long = "outdir",
            value_name = "DIR",
            default_value = ".",
            help = "Directory for the filled hit indexes"
        )]
        outdir: PathBuf,
    },
    /// Assemble filled hit indexes into the FASTA collection for alignment
    Assemble {
        #[arg(
            short = 'j',
            long = "json",
            required = true,
            value_name = "PATHS",
            value_delimiter = ',',
            num_args = 1..,
            help = "Hit index files or directories holding them"
        )]
        json: Vec<PathBuf>,

        #[arg(short = 'o', long = "output", value_name = "PATH", default_value = EXTRACTED_SEQUENCES)]
        output: PathBuf,
    },
    /// Convert a repeat-region table into the persisted repeat index
    Repeats {
        #[arg(short = 'i', long = "input", required = true, value_name = "PATH")]
        input: PathBuf,

        #[arg(short = 'o', long = "output", value_name = "PATH", default_value = REPEATING_REGIONS)]
        output: PathBuf,
    },
    /// Drop alignment hits that fall inside repeat regions
    Filter {
        #[arg(
            short = 'b',
            long = "blast",
            required = true,
            value_name = "PATHS",
            value_delimiter = ',',
            num_args = 1..,
            help = "Tabular alignment output files"
        )]
        blast: Vec<PathBuf>,

        #[arg(short = 'r', long = "repeats", required = true, value_name = "PATH")]
        repeats: PathBuf,

        #[arg(short = 'o', long = "output", value_name = "PATH", default_value = FILTERED_HITS)]
        output: PathBuf,
    },
}

fn main() {
    let start = std::time::Instant::now();
    let cli = Cli::parse();

    let level = if cli.verbose { Level::Debug } else { Level::Info };
    init_with_level(level).unwrap_or_else(|e| {
        eprintln!("ERROR: could not start logger: {}", e);
    });

    run(cli.command).unwrap_or_else(|e| {
        error!("{:#}", e);
        std::process::exit(1);
    });

    let elapsed = start.elapsed();
    info!("Elapsed time: {:?}", elapsed);
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Hits { reports, outdir } => {
            let reports = expand_inputs(&reports, REPORT_SUFFIX)?;
            if reports.is_empty() {
                bail!("No .{} reports found", REPORT_SUFFIX);
            }

            let (index, stats) = pipeline::index_reports(&reports);
            info!(
                "Kept {} hits, {} rejected for short flanks",
                stats.accepted, stats.rejected
            );
            for path in pipeline::write_per_source(&index, &outdir)? {
                info!("Wrote {}", path.display());
            }
        }
        Commands::Extract {
            json,
            fasta_dir,
            outdir,
        } => {
            let paths = expand_inputs(&json, INDEX_SUFFIX)?;
            let mut index = HitIndex::new();
            for loaded in pipeline::load_indexes(&paths) {
                index.merge(loaded);
            }
            if index.is_empty() {
                bail!("No hits found in the provided .{} files", INDEX_SUFFIX);
            }

            let stats = pipeline::extract_index(&mut index, &fasta_dir);
            info!(
                "Extracted {} sequences, {} reads missing",
                stats.filled, stats.missing
            );
            pipeline::write_per_source(&index, &outdir)?;
        }
        Commands::Assemble { json, output } => {
            let paths = expand_inputs(&json, INDEX_SUFFIX)?;
            if paths.is_empty() {
                bail!("No .{} files found", INDEX_SUFFIX);
            }

            let mut assembler = Assembler::new();
            for index in pipeline::load_indexes(&paths) {
                assembler.add_index(&index);
            }
            info!(
                "{} sequences kept, {} without a full flank",
                assembler.records().len(),
                assembler.skipped()
            );
            assembler.write_path(&output)?;
        }
        Commands::Repeats { input, output } => {
            let index = RepeatIndex::from_table_path(&input)
                .with_context(|| format!("could not load {}", input.display()))?;
            info!(
                "Indexed {} repeats on {} chromosomes",
                index.num_intervals(),
                index.num_chroms()
            );
            index.write_json_path(&output)?;
        }
        Commands::Filter {
            blast,
            repeats,
            output,
        } => {
            let index = RepeatIndex::from_json_path(&repeats)
                .with_context(|| format!("could not load {}", repeats.display()))?;

            for (i, input) in blast.iter().enumerate() {
                let output = if blast.len() > 1 {
                    output.with_extension(format!("{}.out", i))
                } else {
                    output.clone()
                };

                match alignment::filter_file(input, &output, &index) {
                    Ok(stats) => info!(
                        "{}: {} hits, {} invalid, {} in repeats, {} written to {}",
                        input.display(),
                        stats.read,
                        stats.invalid,
                        stats.in_repeats,
                        stats.written,
                        output.display()
                    ),
                    Err(e) => error!("Skipping {}: {}", input.display(), e),
                }
            }
        }
    }

    Ok(())
}
