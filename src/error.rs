use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O operation failed: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("HDF5 operation failed: {source}")]
    Hdf5 {
        #[from]
        source: hdf5::Error,
    },

    /// a string column holds bytes outside ASCII. text pushed through
    /// [crate::dataset::Fingerprints] is already filtered, so this comes from
    /// columns passed straight to [crate::dataset::save]
    #[error("string is not storable as ASCII: {source}")]
    Encoding {
        #[from]
        source: hdf5::types::StringError,
    },

    #[error("failed to build the fingerprint array: {source}")]
    Shape {
        #[from]
        source: ndarray::ShapeError,
    },

    #[error("invalid configuration in {path}: {details}")]
    Config { path: PathBuf, details: String },

    #[error("invalid parameters: {0}")]
    Parameters(&'static str),

    #[error("dataset '{name}' has shape {shape:?}, expected {expected}")]
    Layout {
        name: &'static str,
        shape: Vec<usize>,
        expected: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
