//! Line-oriented reading of SMILES files: one header line, then one
//! `<smiles> <name> [ignored...]` record per line.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::iter::Skip;
use std::path::Path;

use crate::Result;

pub type Lines<R> = Skip<io::Lines<R>>;

/// open `path` for reading and return its lines after the header
pub fn open(path: impl AsRef<Path>) -> Result<Lines<BufReader<File>>> {
    let f = File::open(path)?;
    Ok(lines(BufReader::new(f)))
}

/// the lines of `reader` with the first one dropped unconditionally
pub fn lines<R: BufRead>(reader: R) -> Lines<R> {
    reader.lines().skip(1)
}

#[derive(Debug, PartialEq)]
pub struct Record<'a> {
    pub smiles: &'a str,
    pub name: &'a str,
}

impl<'a> Record<'a> {
    /// split `line` on whitespace, returning `None` when there are fewer than
    /// two fields
    pub fn parse(line: &'a str) -> Option<Self> {
        let mut toks = line.split_whitespace();
        let smiles = toks.next()?;
        let name = toks.next()?;
        Some(Self { smiles, name })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn collect(s: &str) -> Vec<String> {
        lines(Cursor::new(s)).map(|l| l.unwrap()).collect()
    }

    #[test]
    fn skips_header() {
        assert_eq!(collect("smiles name\nCCO ethanol\nCC ethane\n"), vec![
            "CCO ethanol",
            "CC ethane"
        ]);
        // the first line is dropped even when it looks like data
        assert_eq!(collect("CCO ethanol\nCC ethane"), vec!["CC ethane"]);
        assert!(collect("header only\n").is_empty());
        assert!(collect("").is_empty());
    }

    #[test]
    fn parse_records() {
        let want = Some(Record {
            smiles: "CCO",
            name: "ethanol",
        });
        assert_eq!(Record::parse("CCO ethanol"), want);
        assert_eq!(Record::parse("  CCO ethanol  \r"), want);
        assert_eq!(Record::parse("CCO\tethanol"), want);
        assert_eq!(Record::parse("CCO ethanol 46.07 extra"), want);
        assert_eq!(Record::parse("CCO   ethanol"), want);
        assert_eq!(Record::parse("CCO"), None);
        assert_eq!(Record::parse("   "), None);
        assert_eq!(Record::parse(""), None);
    }

    #[test]
    fn missing_file() {
        let err = open("/nonexistent/input.smi").unwrap_err();
        assert!(matches!(err, crate::Error::Io { .. }));
    }
}
