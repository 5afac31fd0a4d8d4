/// stlscope - inspect and convert STL files from the terminal
///
///   stlscope inspect part.stl            decode and summarize
///   stlscope inspect part.stl --json     machine-readable summary
///   stlscope convert part.stl out.stl    ASCII to binary
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::terminal;
use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use stlscope_core::notify::DEFAULT_PROGRESS_INTERVAL;
use stlscope_core::{ascii_to_binary, DecodeOptions, Notification};
use stlscope_terminal::{inspect, ProgressLine, Summary};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stlscope")]
#[command(about = "Decode binary and ASCII STL files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log decoder internals to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a file and print its format, size and bounds
    Inspect {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Keep the original coordinates of off-center models
        #[arg(long)]
        no_recenter: bool,

        /// Report progress every N facets (0 disables)
        #[arg(long, default_value_t = DEFAULT_PROGRESS_INTERVAL)]
        progress_interval: u32,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rewrite an ASCII STL file as binary STL
    Convert {
        input: PathBuf,
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Inspect {
            file,
            no_recenter,
            progress_interval,
            json,
        } => {
            let options = DecodeOptions {
                recenter: !no_recenter,
                progress_interval,
            };
            run_inspect(&file, options, json)
        }
        Commands::Convert { input, output } => run_convert(&input, &output),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn progress_line(label_len: usize) -> Option<ProgressLine> {
    if !io::stderr().is_terminal() {
        return None;
    }
    let (columns, _) = terminal::size().unwrap_or((80, 24));
    Some(ProgressLine::for_columns(columns, label_len))
}

fn run_inspect(file: &Path, options: DecodeOptions, json: bool) -> Result<()> {
    let bytes = fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;
    info!(path = %file.display(), bytes = bytes.len(), "decoding");

    let mut stderr = io::stderr();
    let mut line = if json { None } else { progress_line(20) };
    let inspection = inspect(bytes, options, |label, percent| {
        if let Some(line) = line.as_mut() {
            // Drawing is cosmetic; a broken stderr must not abort the decode.
            let _ = line.draw(&mut stderr, label, percent);
        }
    });
    if let Some(line) = line.as_mut() {
        line.finish(&mut stderr)?;
    }
    let inspection = inspection.with_context(|| format!("failed to decode {}", file.display()))?;

    let summary = Summary::from_output(&inspection.output);
    let mut stdout = io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut stdout, &summary)?;
        writeln!(stdout)?;
    } else {
        for notice in &inspection.notices {
            writeln!(stdout, "note: {}", notice)?;
        }
        write!(stdout, "{}", summary.render_text())?;
    }
    Ok(())
}

fn run_convert(input: &Path, output: &Path) -> Result<()> {
    let text = fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;

    let mut stderr = io::stderr();
    let mut line = progress_line(10);
    let binary = ascii_to_binary(&text, &mut |notification: Notification| {
        if let (Some(line), Notification::ConvertProgress { percent }) = (line.as_mut(), notification) {
            let _ = line.draw(&mut stderr, "converting", percent);
        }
    });
    if let Some(line) = line.as_mut() {
        line.finish(&mut stderr)?;
    }
    let binary = binary.with_context(|| format!("failed to convert {}", input.display()))?;

    fs::write(output, &binary).with_context(|| format!("failed to write {}", output.display()))?;
    info!(path = %output.display(), bytes = binary.len(), "wrote binary STL");
    println!("{} -> {} ({} bytes)", input.display(), output.display(), binary.len());
    Ok(())
}
