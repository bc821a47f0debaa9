//! CLI front end for the `bindelta` delta-patch codec.
//!
//! This binary is pure ambient tooling: the interactive block-size prompt,
//! progress prints, and path conventions live here so the library crate
//! stays a pure, I/O-free codec. See `bindelta::encode`/`bindelta::decode`
//! for the actual contract.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use thiserror::Error;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "bindelta", about = "Compact binary delta patches between two versions of a blob")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Produce a patch that turns <old> into <new>.
    Encode {
        old: PathBuf,
        new: PathBuf,
        /// Block size in bytes (must be a positive multiple of 8, max 255).
        /// Prompted interactively if omitted.
        #[arg(short = 'b', long = "block-size")]
        block_size: Option<u32>,
        /// Output patch path. Defaults to `<old>_patch.bin`.
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
    },
    /// Apply a patch to <reference> to reproduce the original target.
    Decode {
        reference: PathBuf,
        patch: PathBuf,
        /// Output path. Defaults to `rebuilt.bin`.
        output: Option<PathBuf>,
    },
}

#[derive(Error, Debug)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, #[source] source: io::Error },
    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, #[source] source: io::Error },
    #[error("failed to read block size from stdin: {0}")]
    Prompt(io::Error),
    #[error(transparent)]
    Encode(#[from] bindelta::EncodeError),
    #[error(transparent)]
    Decode(#[from] bindelta::DecodeError),
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "bindelta failed");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Encode { old, new, block_size, output } => cmd_encode(&old, &new, block_size, output),
        Command::Decode { reference, patch, output } => cmd_decode(&reference, &patch, output),
    }
}

fn cmd_encode(old: &Path, new: &Path, block_size: Option<u32>, output: Option<PathBuf>) -> Result<(), CliError> {
    let reference = read_file(old)?;
    let target = read_file(new)?;

    let block_size = match block_size {
        Some(b) => b,
        None => prompt_block_size()?,
    };

    info!(old = %old.display(), new = %new.display(), block_size, "encoding patch");

    let patch = bindelta::encode(&reference, &target, block_size)?;

    let output = output.unwrap_or_else(|| default_patch_path(old));
    write_file(&output, &patch)?;

    info!(output = %output.display(), patch_bytes = patch.len(), "wrote patch");
    println!(
        "wrote {} ({} bytes, {} -> {} input)",
        output.display(),
        patch.len(),
        reference.len(),
        target.len()
    );

    Ok(())
}

fn cmd_decode(reference: &Path, patch: &Path, output: Option<PathBuf>) -> Result<(), CliError> {
    let reference_data = read_file(reference)?;
    let patch_data = read_file(patch)?;

    info!(reference = %reference.display(), patch = %patch.display(), "decoding patch");

    let rebuilt = bindelta::decode(&reference_data, &patch_data)?;

    let output = output.unwrap_or_else(|| PathBuf::from("rebuilt.bin"));
    write_file(&output, &rebuilt)?;

    info!(output = %output.display(), bytes = rebuilt.len(), "wrote rebuilt blob");
    println!("wrote {} ({} bytes)", output.display(), rebuilt.len());

    Ok(())
}

fn default_patch_path(old: &Path) -> PathBuf {
    let mut name = old.file_name().map(|n| n.to_owned()).unwrap_or_default();
    name.push("_patch.bin");
    old.with_file_name(name)
}

/// Prompt on stdin for a block size, re-prompting on invalid input. Defaults to 64.
fn prompt_block_size() -> Result<u32, CliError> {
    loop {
        print!("Block size [64]: ");
        io::stdout().flush().map_err(CliError::Prompt)?;

        let mut line = String::new();
        io::stdin().read_line(&mut line).map_err(CliError::Prompt)?;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            return Ok(64);
        }

        match trimmed.parse::<u32>() {
            Ok(b) if b > 0 && b % 8 == 0 && b <= 255 => return Ok(b),
            _ => eprintln!("block size must be a positive multiple of 8, at most 255; try again"),
        }
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>, CliError> {
    fs::read(path).map_err(|source| CliError::Read { path: path.to_owned(), source })
}

fn write_file(path: &Path, data: &[u8]) -> Result<(), CliError> {
    fs::write(path, data).map_err(|source| CliError::Write { path: path.to_owned(), source })
}
