//! # CLI Module
//!
//! Command-line interface for the image sweeper.
//!
//! ## Usage
//! ```bash
//! # Preview a sweep (dry-run is the default)
//! image-sweep sweep --dir /srv/uploads --refs /tmp/docs.json
//!
//! # Actually move files to quarantine
//! image-sweep sweep --config sweep.json --dry-run=false
//!
//! # Permanent deletes instead of quarantine moves
//! image-sweep sweep --config sweep.json --dry-run=false --delete
//! ```

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use console::{style, Term};
use image_sweeper::core::config::SweepConfig;
use image_sweeper::core::executor::ActionMode;
use image_sweeper::core::pipeline::{PipelineResult, SweepPipeline};
use image_sweeper::core::reference::JsonFileStore;
use image_sweeper::error::{ConfigError, SweeperError};
use image_sweeper::events::{AnalyzeEvent, ApplyEvent, Event, EventChannel, PipelineEvent, ScanEvent};
use image_sweeper::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

/// Image Sweeper - reconcile an image store against its system of record
#[derive(Parser, Debug)]
#[command(name = "image-sweep")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Find and quarantine orphaned, duplicate and invalid images
    Sweep {
        /// JSON config file; flags below override its values
        #[arg(long)]
        config: Option<PathBuf>,

        /// Image directory to sweep (repeatable)
        #[arg(long = "dir")]
        dirs: Vec<PathBuf>,

        /// Quarantine directory for relocated files
        #[arg(long)]
        quarantine: Option<PathBuf>,

        /// JSON document dump holding the live references
        #[arg(long)]
        refs: PathBuf,

        /// Simulate only; no filesystem mutation (safety default: true)
        #[arg(long, default_value_t = true, action = ArgAction::Set,
              num_args = 0..=1, default_missing_value = "true")]
        dry_run: bool,

        /// Permanently delete instead of moving to quarantine
        #[arg(long)]
        delete: bool,

        /// Grace period override in days
        #[arg(long)]
        min_age: Option<i64>,

        /// Worker pool size override
        #[arg(long)]
        max_workers: Option<usize>,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,

        /// Log every classified file
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable summary
    Pretty,
    /// JSON summary for scripting
    Json,
}

/// Run the CLI
pub fn run() -> Result<()> {
    image_sweeper::init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Sweep {
            config,
            dirs,
            quarantine,
            refs,
            dry_run,
            delete,
            min_age,
            max_workers,
            output,
            verbose,
        } => run_sweep(
            config,
            dirs,
            quarantine,
            refs,
            dry_run,
            delete,
            min_age,
            max_workers,
            output,
            verbose,
        ),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_sweep(
    config_path: Option<PathBuf>,
    dirs: Vec<PathBuf>,
    quarantine: Option<PathBuf>,
    refs_path: PathBuf,
    dry_run: bool,
    delete: bool,
    min_age: Option<i64>,
    max_workers: Option<usize>,
    output: OutputFormat,
    verbose: bool,
) -> Result<()> {
    let term = Term::stderr();

    // Config file first, flags on top
    let mut config = match config_path {
        Some(path) => SweepConfig::from_file(&path)?,
        None => SweepConfig::default(),
    };
    if !dirs.is_empty() {
        config.image_dirs = dirs;
    }
    if let Some(quarantine) = quarantine {
        config.quarantine_dir = quarantine;
    }
    if let Some(min_age) = min_age {
        config.min_age_days = min_age;
    }
    if let Some(max_workers) = max_workers {
        config.max_workers = max_workers;
    }
    config.validate().map_err(SweeperError::Config)?;

    let store = JsonFileStore::open(&refs_path)?;

    if matches!(output, OutputFormat::Pretty) {
        term.write_line(&format!(
            "{} {}",
            style("Image Sweeper").bold().cyan(),
            if dry_run {
                style("(simulation)").yellow()
            } else {
                style("(execute)").red()
            }
        ))
        .ok();
        term.write_line("").ok();
    }

    // SIGINT stops scheduling new work; in-flight moves complete
    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = Arc::clone(&cancel);
        ctrlc::set_handler(move || {
            cancel.store(true, Ordering::SeqCst);
        })
        .map_err(|e| ConfigError::SignalHandler {
            reason: e.to_string(),
        })?;
    }

    let mode = if delete {
        ActionMode::Delete
    } else {
        ActionMode::MoveToQuarantine
    };

    let pipeline = SweepPipeline::builder(config, &store)
        .dry_run(dry_run)
        .action_mode(mode)
        .cancel_flag(Arc::clone(&cancel))
        .build();

    let (sender, receiver) = EventChannel::new();

    let progress = if matches!(output, OutputFormat::Pretty) {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("█▓░"),
        );
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            match event {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                    if let Some(ref pb) = progress_clone {
                        pb.set_message(phase.to_string());
                    }
                }
                Event::Scan(ScanEvent::Completed { total_files }) => {
                    if let Some(ref pb) = progress_clone {
                        pb.set_length(total_files as u64);
                    }
                }
                Event::Analyze(AnalyzeEvent::Progress(p)) => {
                    if let Some(ref pb) = progress_clone {
                        pb.set_position(p.completed as u64);
                    }
                }
                Event::Apply(ApplyEvent::Classified { path, disposition }) => {
                    if verbose {
                        if let Some(ref pb) = progress_clone {
                            pb.println(format!("{}: {}", disposition, path.display()));
                        }
                    }
                }
                Event::Pipeline(PipelineEvent::Cancelled) => {
                    if let Some(ref pb) = progress_clone {
                        pb.println("cancelled - finishing in-flight work");
                    }
                }
                Event::Pipeline(PipelineEvent::Completed { .. }) => {
                    if let Some(ref pb) = progress_clone {
                        pb.finish_and_clear();
                    }
                }
                _ => {}
            }
        }
    });

    let result = pipeline.run_with_events(&sender);

    drop(sender);
    event_thread.join().ok();

    let result = result?;

    match output {
        OutputFormat::Pretty => print_pretty(&term, &result),
        OutputFormat::Json => println!("{}", result.summary.to_json()),
    }

    // Per-file errors are non-fatal by design; exit 0 either way
    Ok(())
}

fn print_pretty(term: &Term, result: &PipelineResult) {
    term.write_line("").ok();

    let marker = if result.summary.errors == 0 {
        style("✓").green().bold()
    } else {
        style("!").yellow().bold()
    };
    term.write_line(&format!("{} {}", marker, result.summary.render().trim_end()))
        .ok();

    if result.cancelled {
        term.write_line(&format!(
            "{}",
            style("Run was cancelled; re-run to finish the sweep.").yellow()
        ))
        .ok();
    }

    if result.summary.dry_run && result.summary.planned > 0 {
        term.write_line(&format!(
            "{}",
            style("Re-run with --dry-run=false to apply these actions.").dim()
        ))
        .ok();
    }
}
