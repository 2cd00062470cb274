//! # Multi Zopfli - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del logging con `tracing` (su stderr)
//! - Creazione della configurazione e avvio del `BatchOptimizer`
//! - Exit code diverso da zero se almeno un file fallisce
//!
//! ## Esempio di utilizzo:
//! ```bash
//! multi-zopfli "assets/**/*.png" -c 4 -m --filters=0me
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use multi_zopfli::progress::ProgressManager;
use multi_zopfli::{BatchOptimizer, Config, OutputMode, ZopfliFlags};

#[derive(Parser)]
#[command(name = "multi-zopfli")]
#[command(about = "Optimize PNG files matched by a glob with zopflipng, in parallel")]
struct Args {
    /// Glob pattern to match files
    glob: String,

    /// Number of parallel processes to run
    #[arg(short, long, default_value_t = Config::default_concurrency())]
    concurrency: usize,

    /// compress more: use more iterations (depending on file size)
    #[arg(short = 'm', long = "m")]
    more: bool,

    /// remove colors behind alpha channel 0. No visual difference, removes hidden information.
    #[arg(long = "lossy_transparent")]
    lossy_transparent: bool,

    /// convert 16-bit per channel image to 8-bit per channel.
    #[arg(long = "lossy_8bit")]
    lossy_8bit: bool,

    /// use quick, but not very good, compression (e.g. for only trying the PNG filter and color types)
    #[arg(short = 'q', long = "q")]
    quick: bool,

    /// number of iterations, more iterations makes it slower but provides slightly better compression.
    /// Default: 15 for small files, 5 for large files.
    #[arg(long)]
    iterations: Option<u32>,

    /// filter strategies to try (0-4, m, e, p, b), e.g. --filters=0me
    #[arg(long, default_value = "")]
    filters: String,

    /// keep metadata chunks with these names that would normally be removed, e.g. tEXt,zTXt,iTXt,gAMA
    #[arg(long, default_value = "")]
    keepchunks: String,

    /// Write in place, or to a sibling file renamed over the original on success
    #[arg(long, value_enum, default_value_t = OutputMode::InPlace)]
    mode: OutputMode,

    /// Path to the zopflipng executable (default: $ZOPFLIPNG, then PATH)
    #[arg(long)]
    zopflipng: Option<PathBuf>,

    /// Emit JSON lines on stdout
    #[arg(long)]
    json: bool,

    /// Show a progress bar
    #[arg(long)]
    progress: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let progress = if args.progress {
        ProgressManager::new()
    } else {
        ProgressManager::hidden()
    };

    // Initialize logging, stdout stays clean for piped data
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if args.verbose { "debug" } else { "info" }));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(progress.log_writer())
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config = Config {
        concurrency: args.concurrency,
        flags: ZopfliFlags {
            more: args.more,
            lossy_transparent: args.lossy_transparent,
            lossy_8bit: args.lossy_8bit,
            quick: args.quick,
            iterations: args.iterations,
            filters: args.filters,
            keepchunks: args.keepchunks,
        },
        output_mode: args.mode,
        zopflipng_path: args.zopflipng,
        json_output: args.json,
        show_progress: args.progress,
    };

    let optimizer = BatchOptimizer::with_progress(config, progress)?;
    let outcome = optimizer.run(&args.glob).await?;

    if !outcome.is_success() {
        return Err(anyhow::anyhow!(
            "{} of {} files failed to optimize",
            outcome.summary.failed(),
            outcome.summary.total
        ));
    }

    Ok(())
}
