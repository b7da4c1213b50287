use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;
use tram8pack::{PackOptions, package_firmware};

/// Package Intel HEX firmware into TRAM8 SysEx format for MIDI updates.
#[derive(Parser)]
#[command(name = "tram8pack")]
#[command(version)]
#[command(about = "Package Intel HEX firmware into TRAM8 SysEx format for MIDI updates")]
struct Cli {
    /// Input Intel HEX firmware file
    hex_file: PathBuf,

    /// Output directory (default: same as input)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Append one blank page after the firmware if it fits below the bootloader
    #[arg(long)]
    spare_page: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    // Guard: input must be an existing .hex file
    validate_exists(&cli.hex_file)?;
    if !is_hex_file(&cli.hex_file) {
        bail!(
            "Expected .hex file, got: {}",
            cli.hex_file.display()
        );
    }

    let mut options = PackOptions::default().with_spare_page(cli.spare_page);
    if let Some(dir) = &cli.output_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create output directory: {}", dir.display()))?;
        options = options.with_output_dir(dir);
    }

    let artifacts = package_firmware(&cli.hex_file, &options).context("Packaging failed")?;

    if cli.verbose {
        println!("Packaged firmware: {}", cli.hex_file.display());
        println!(
            "Pages:             {} ({} bytes, last address 0x{:04X})",
            artifacts.layout.num_pages, artifacts.layout.total_length, artifacts.last_addr
        );
        println!("Linear image:      {}", artifacts.linear_path.display());
        println!("Generated SysEx:   {}", artifacts.sysex_path.display());
    } else {
        let name = artifacts
            .sysex_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        println!("Created: {name}");
    }
    Ok(())
}

// =============================== HELPER FUNCTIONS ===============================

/// Check the file's extension is `.hex` (case-insensitive)
fn is_hex_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("hex"))
}

/// Validate that a path exists and is a file
fn validate_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        bail!("Firmware file not found: {}", path.display());
    }
    if !path.is_file() {
        bail!("Path is not a file: {}", path.display());
    }
    Ok(())
}
