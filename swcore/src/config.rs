//! Run-time toggles of the shrink-wrap transform.
use std::path::Path;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::utils::error::{ShrinkWrapError, ShrinkWrapResult};

bitflags! {
    /// Classes of error a library call may report through `errno`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ErrorKinds: u8 {
        /// The input lies outside the mathematical domain (`sqrt(-1)`).
        const DOMAIN = 1 << 0;
        /// The result overflows or underflows (`exp(1000)`).
        const RANGE = 1 << 1;
        /// The input is a singularity (`log(0)`).
        const POLE = 1 << 2;
    }
}

/// Which error classes the transform is allowed to guard.
///
/// A library routine is only considered when every class its error
/// condition depends on is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShrinkWrapConfig {
    /// Perform shrink-wrap on lib calls with domain errors.
    pub domain_error: bool,
    /// Perform shrink-wrap on lib calls with range errors.
    pub range_error: bool,
    /// Perform shrink-wrap on lib calls with pole errors.
    pub pole_error: bool,
}

impl Default for ShrinkWrapConfig {
    fn default() -> Self {
        Self {
            domain_error: true,
            range_error: true,
            pole_error: true,
        }
    }
}

/// Stands in for the file name of configurations parsed from a string.
const INLINE_SOURCE: &str = "<string>";

impl ShrinkWrapConfig {
    pub fn enabled_kinds(&self) -> ErrorKinds {
        let mut kinds = ErrorKinds::empty();
        kinds.set(ErrorKinds::DOMAIN, self.domain_error);
        kinds.set(ErrorKinds::RANGE, self.range_error);
        kinds.set(ErrorKinds::POLE, self.pole_error);
        kinds
    }

    pub fn from_toml_str(toml_str: &str) -> ShrinkWrapResult<Self> {
        toml::from_str(toml_str).map_err(|e| ShrinkWrapError::ConfigParse {
            source: e,
            file: INLINE_SOURCE.to_string(),
        })
    }

    /// Load the configuration from a TOML file. Missing keys keep their default.
    pub fn load_from_toml(path: &Path) -> ShrinkWrapResult<Self> {
        let toml_str = std::fs::read_to_string(path)?;

        toml::from_str(&toml_str).map_err(|e| ShrinkWrapError::ConfigParse {
            source: e,
            file: path.display().to_string(),
        })
    }

    pub fn to_toml_string(&self) -> ShrinkWrapResult<String> {
        Ok(toml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_everything() {
        let config = ShrinkWrapConfig::default();
        assert_eq!(config.enabled_kinds(), ErrorKinds::all());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = ShrinkWrapConfig::from_toml_str("range_error = false\n").unwrap();
        assert!(config.domain_error);
        assert!(!config.range_error);
        assert!(config.pole_error);
        assert_eq!(
            config.enabled_kinds(),
            ErrorKinds::DOMAIN | ErrorKinds::POLE
        );
    }

    #[test]
    fn malformed_toml_is_reported() {
        let err = ShrinkWrapConfig::from_toml_str("domain_error = \"yes\"").unwrap_err();
        let ShrinkWrapError::ConfigParse { file, .. } = err else {
            panic!("expected a parse error, got {:?}", err);
        };
        assert_eq!(file, "<string>");
    }

    #[test]
    fn toml_round_trip() {
        let config = ShrinkWrapConfig {
            pole_error: false,
            ..Default::default()
        };
        let text = config.to_toml_string().unwrap();
        assert_eq!(ShrinkWrapConfig::from_toml_str(&text).unwrap(), config);
    }
}
