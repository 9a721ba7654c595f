//! The accumulated fingerprint table and its HDF5 layout: a dense float32
//! `fp_list` of shape (N, nbits) beside `smiles_list` and `name_list`, each an
//! (N, 1) column of variable-length ASCII strings.

use std::borrow::Cow;
use std::path::Path;

use hdf5::types::VarLenAscii;
use log::debug;
use ndarray::Array2;

use crate::chem::bitvector::BitVector;
use crate::{Error, Result};

pub const FP_LIST: &str = "fp_list";
pub const SMILES_LIST: &str = "smiles_list";
pub const NAME_LIST: &str = "name_list";

/// keep only the ASCII characters of `s`. NUL is dropped as well since the
/// strings are stored as C strings
pub fn encode_ascii_lossy(s: &str) -> Vec<u8> {
    s.bytes().filter(|&b| b.is_ascii() && b != 0).collect()
}

/// Three index-aligned columns: row `i` of each belongs to the same input
/// record.
#[derive(Debug, PartialEq)]
pub struct Fingerprints {
    nbits: usize,
    fp_list: Vec<Vec<f32>>,
    smiles_list: Vec<Vec<u8>>,
    name_list: Vec<Vec<u8>>,
}

impl Fingerprints {
    pub fn new(nbits: usize) -> Self {
        Self {
            nbits,
            fp_list: Vec::new(),
            smiles_list: Vec::new(),
            name_list: Vec::new(),
        }
    }

    /// append one record to all three columns. panics if `fp` does not have
    /// `self.nbits()` bits
    pub fn push(&mut self, fp: &BitVector, smiles: &str, name: &str) {
        assert_eq!(fp.len(), self.nbits, "fingerprint length mismatch");
        self.fp_list.push(fp.to_dense());
        self.smiles_list.push(encode_ascii_lossy(smiles));
        self.name_list.push(encode_ascii_lossy(name));
    }

    pub fn len(&self) -> usize {
        self.fp_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fp_list.is_empty()
    }

    pub fn nbits(&self) -> usize {
        self.nbits
    }

    pub fn rows(&self) -> &[Vec<f32>] {
        &self.fp_list
    }

    pub fn smiles(&self) -> &[Vec<u8>] {
        &self.smiles_list
    }

    pub fn names(&self) -> &[Vec<u8>] {
        &self.name_list
    }

    /// materialize the fingerprint rows as an (N, nbits) array
    pub fn to_array(&self) -> Result<Array2<f32>> {
        let flat = self.fp_list.concat();
        Ok(Array2::from_shape_vec((self.len(), self.nbits), flat)?)
    }

    /// write all three columns to a new HDF5 file at `path`
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        save(path, &self.to_array()?, &self.smiles_list, &self.name_list)
    }

    /// read a file written by [Fingerprints::save] or by [save]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = hdf5::File::open(path)?;
        let ds = file.dataset(FP_LIST)?;
        let shape = ds.shape();
        let [n, nbits] = shape[..] else {
            return Err(Error::Layout {
                name: FP_LIST,
                shape,
                expected: "(N, nbits)",
            });
        };
        if nbits == 0 {
            return Err(Error::Layout {
                name: FP_LIST,
                shape,
                expected: "(N, nbits)",
            });
        }
        let fp_list = if n > 0 {
            ds.read_raw::<f32>()?
                .chunks(nbits)
                .map(<[f32]>::to_vec)
                .collect()
        } else {
            Vec::new()
        };
        Ok(Self {
            nbits,
            fp_list,
            smiles_list: read_strings(&file, SMILES_LIST, n)?,
            name_list: read_strings(&file, NAME_LIST, n)?,
        })
    }
}

/// create (or truncate) the HDF5 file at `path` and write the fingerprint
/// array and the two string columns into it. The file is closed when this
/// returns, including on error, but a partially written file may be left
/// behind.
pub fn save(
    path: impl AsRef<Path>,
    fps: &Array2<f32>,
    smiles: &[Vec<u8>],
    names: &[Vec<u8>],
) -> Result<()> {
    let (n, nbits) = fps.dim();
    assert_eq!(smiles.len(), n, "smiles column is not aligned");
    assert_eq!(names.len(), n, "name column is not aligned");

    let path = path.as_ref();
    debug!("writing {n} rows to {}", path.display());
    let file = hdf5::File::create(path)?;

    let ds = file.new_dataset::<f32>().shape((n, nbits)).create(FP_LIST)?;
    if n > 0 {
        let flat = match fps.as_slice() {
            Some(s) => Cow::Borrowed(s),
            None => Cow::Owned(fps.iter().copied().collect()),
        };
        ds.write_raw(&*flat)?;
    }
    write_strings(&file, SMILES_LIST, smiles)?;
    write_strings(&file, NAME_LIST, names)?;

    file.flush()?;
    Ok(())
}

fn write_strings(
    file: &hdf5::File,
    name: &str,
    values: &[Vec<u8>],
) -> Result<()> {
    let ds = file
        .new_dataset::<VarLenAscii>()
        .shape((values.len(), 1))
        .create(name)?;
    if !values.is_empty() {
        let data = values
            .iter()
            .map(VarLenAscii::from_ascii)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        ds.write_raw(data.as_slice())?;
    }
    Ok(())
}

fn read_strings(
    file: &hdf5::File,
    name: &'static str,
    n: usize,
) -> Result<Vec<Vec<u8>>> {
    let ds = file.dataset(name)?;
    let shape = ds.shape();
    if shape != [n, 1] {
        return Err(Error::Layout {
            name,
            shape,
            expected: "(N, 1) matching fp_list",
        });
    }
    if n == 0 {
        return Ok(Vec::new());
    }
    Ok(ds
        .read_raw::<VarLenAscii>()?
        .iter()
        .map(|s| s.as_bytes().to_vec())
        .collect())
}
