use std::{io, path::Path};

use chem::{Builtin, Toolkit};
use dataset::Fingerprints;
use log::{debug, info, trace};
use reader::Record;
use utils::timed;

pub mod chem;
pub mod config;
pub mod dataset;
mod error;
pub mod reader;
pub mod utils;

pub use config::Config;
pub use error::{Error, Result};

/// how many input lines pass between progress messages
const PROGRESS_INTERVAL: usize = 100_000;

/// parse each line into a record, fingerprint its SMILES with `toolkit`, and
/// collect the results. lines with fewer than two fields and SMILES that the
/// toolkit rejects are skipped. I/O errors from `lines` abort the run, as does
/// an invalid `config`
pub fn generate_fingerprints<T, I>(
    toolkit: &T,
    lines: I,
    config: &Config,
) -> Result<Fingerprints>
where
    T: Toolkit,
    I: IntoIterator<Item = io::Result<String>>,
{
    config.validate()?;
    let mut fps = Fingerprints::new(config.nbits);
    let mut nlines = 0;
    let mut short = 0;
    let mut rejected = 0;
    for line in lines {
        let line = line?;
        nlines += 1;
        if nlines % PROGRESS_INTERVAL == 0 {
            debug!("processed {nlines} lines, kept {}", fps.len());
        }
        let Some(Record { smiles, name }) = Record::parse(&line) else {
            trace!("skipping line {nlines}: too few fields");
            short += 1;
            continue;
        };
        let Some(mol) = toolkit.parse(smiles) else {
            rejected += 1;
            continue;
        };
        let fp = toolkit.fingerprint(&mol, config.radius, config.nbits);
        fps.push(&fp, smiles, name);
    }
    info!(
        "kept {} of {nlines} records: {short} with too few fields, \
         {rejected} with unparsable SMILES",
        fps.len()
    );
    Ok(fps)
}

/// convert the SMILES file at `input` into an HDF5 fingerprint file at
/// `output`, returning the number of records written
pub fn convert(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &Config,
) -> Result<usize> {
    config.validate()?;
    let lines = reader::open(input)?;
    let fps = timed("generate_fingerprints", || {
        generate_fingerprints(&Builtin, lines, config)
    })?;
    let fp_array = timed("make_array", || fps.to_array())?;
    timed("save_data", || {
        dataset::save(output, &fp_array, fps.smiles(), fps.names())
    })?;
    Ok(fps.len())
}
