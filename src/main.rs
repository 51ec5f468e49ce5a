use std::{
    fs::File,
    io::{self, prelude::*},
    path::PathBuf,
};

use anyhow::{bail, Context};
use clap::Parser;
use log::{debug, info};
use lzma_ffi::{engine, Decoder, DecoderFlags, DEFAULT_CHUNK_SIZE};
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, SimpleLogger, TermLogger, TerminalMode};

/// Decompress .xz and .lzma files with the system liblzma.
#[derive(Parser)]
#[command(name = "unlzma", version)]
struct Cli {
    /// Compressed files. Each is extracted next to itself, minus its extension.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Write decompressed data to standard output instead.
    #[arg(short = 'c', long)]
    stdout: bool,

    /// Destination file (only with a single input).
    #[arg(short, long, conflicts_with = "stdout")]
    output: Option<PathBuf>,

    /// Bytes read per decode step, and the size of output chunks.
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE as u64, value_parser = clap::value_parser!(u64).range(1..))]
    chunk_size: u64,

    /// Decoder memory usage limit, in bytes.
    #[arg(long)]
    memlimit: Option<u64>,

    /// Decode concatenated .xz streams as one.
    #[arg(long)]
    concatenated: bool,

    /// More log output (repeatable).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose)?;
    debug!("linked liblzma {}", engine::version_string());

    if cli.output.is_some() && cli.files.len() != 1 {
        bail!("--output needs exactly one input file");
    }

    let mut decoder = Decoder::new().chunk_size(cli.chunk_size as usize);
    if let Some(memlimit) = cli.memlimit {
        decoder = decoder.memlimit(memlimit);
    }
    if cli.concatenated {
        decoder = decoder.flags(DecoderFlags::CONCATENATED);
    }

    for file in &cli.files {
        if cli.stdout {
            let source =
                File::open(file).with_context(|| format!("couldn't open {}", file.display()))?;
            let mut out = io::stdout().lock();
            decoder
                .decompress_with(source, |chunk| out.write_all(chunk))
                .with_context(|| format!("couldn't decompress {}", file.display()))?;
            out.flush()?;
        } else {
            let destination = decoder
                .extract(file, cli.output.as_deref())
                .with_context(|| format!("couldn't decompress {}", file.display()))?;
            info!("{} -> {}", file.display(), destination.display());
        }
    }

    Ok(())
}

/// Log to stderr.
fn init_logger(verbosity: u8) -> anyhow::Result<()> {
    let mut builder = ConfigBuilder::new();
    builder.set_location_level(LevelFilter::Off);
    builder.set_target_level(LevelFilter::Off);
    builder.set_thread_level(LevelFilter::Off);
    builder.set_time_level(LevelFilter::Off);
    let config = builder.build();

    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    TermLogger::init(level, config.clone(), TerminalMode::Stderr, ColorChoice::Auto)
        .or_else(|_| SimpleLogger::init(level, config))
        .context("Couldn't init logger")
}
