use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::exit;

use anyhow::Context;
use clap::{error::ErrorKind, Parser};
use genfp::{convert, Config};
use log::info;

/// Convert a SMILES file into an HDF5 file of Morgan fingerprints.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// The SMILES file to read. Its first line is a header and is skipped;
    /// every other line holds a SMILES string and a name.
    infile: PathBuf,

    /// The HDF5 file to write, replacing any existing file.
    outfile: PathBuf,

    /// A TOML file setting `radius` and `nbits`.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// The Morgan fingerprinting radius. Overrides the config file.
    #[arg(short, long)]
    radius: Option<u32>,

    /// The fingerprint length in bits. Overrides the config file.
    #[arg(short, long)]
    nbits: Option<NonZeroUsize>,
}

fn usage() -> ! {
    let prog = std::env::args().next().unwrap_or_else(|| "genfp".to_owned());
    println!("usage: {prog} infile.smi outfile.h5");
    exit(1);
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e)
            if matches!(
                e.kind(),
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
            ) =>
        {
            e.exit()
        }
        Err(_) => usage(),
    };

    let mut config = match &cli.config {
        Some(path) => Config::load(path).with_context(|| {
            format!("failed to load config from {}", path.display())
        })?,
        None => Config::default(),
    };
    if let Some(radius) = cli.radius {
        config.radius = radius;
    }
    if let Some(nbits) = cli.nbits {
        config.nbits = nbits.get();
    }
    info!(
        "fingerprinting {} with radius {} and {} bits",
        cli.infile.display(),
        config.radius,
        config.nbits
    );

    let n = convert(&cli.infile, &cli.outfile, &config)?;
    info!("wrote {n} fingerprints to {}", cli.outfile.display());

    Ok(())
}
