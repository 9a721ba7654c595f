use std::fs::read_to_string;
use std::path::Path;

use serde::Deserialize;

use crate::{Error, Result};

/// Fingerprinting parameters, optionally loaded from a TOML file:
///
/// ```toml
/// radius = 3
/// nbits = 1024
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Morgan fingerprinting radius, in bonds. The default of 3 gives
    /// ECFP6-like fingerprints
    pub radius: u32,

    /// The length of each fingerprint in bits
    pub nbits: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            radius: 3,
            nbits: 1024,
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: Self =
            toml::from_str(&read_to_string(path)?).map_err(|e| {
                Error::Config {
                    path: path.to_owned(),
                    details: e.to_string(),
                }
            })?;
        if let Some(details) = config.problem() {
            return Err(Error::Config {
                path: path.to_owned(),
                details: details.to_owned(),
            });
        }
        Ok(config)
    }

    /// check parameters set in code rather than loaded from a file
    pub fn validate(&self) -> Result<()> {
        match self.problem() {
            Some(details) => Err(Error::Parameters(details)),
            None => Ok(()),
        }
    }

    fn problem(&self) -> Option<&'static str> {
        (self.nbits == 0).then_some("nbits must be greater than zero")
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_config(s: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(s.as_bytes()).unwrap();
        f
    }

    #[test]
    fn load() {
        let f = write_config("radius = 2\nnbits = 2048\n");
        let got = Config::load(f.path()).unwrap();
        assert_eq!(
            got,
            Config {
                radius: 2,
                nbits: 2048
            }
        );
    }

    #[test]
    fn defaults() {
        let f = write_config("nbits = 256\n");
        let got = Config::load(f.path()).unwrap();
        assert_eq!(got.radius, 3);
        assert_eq!(got.nbits, 256);

        let f = write_config("");
        assert_eq!(Config::load(f.path()).unwrap(), Config::default());
    }

    #[test]
    fn validate() {
        assert!(Config::default().validate().is_ok());
        let config = Config {
            radius: 3,
            nbits: 0,
        };
        assert!(matches!(config.validate(), Err(Error::Parameters(_))));
    }

    #[test]
    fn invalid() {
        let f = write_config("nbits = 0\n");
        assert!(matches!(
            Config::load(f.path()),
            Err(Error::Config { .. })
        ));

        let f = write_config("radius = \"three\"\n");
        assert!(matches!(
            Config::load(f.path()),
            Err(Error::Config { .. })
        ));

        let f = write_config("bits = 12\n");
        assert!(matches!(
            Config::load(f.path()),
            Err(Error::Config { .. })
        ));

        assert!(matches!(
            Config::load("/nonexistent/config.toml"),
            Err(Error::Io { .. })
        ));
    }
}
