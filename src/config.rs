//! File-level encoder settings that are not part of the company.

use chrono::NaiveDateTime;
use log::warn;
use std::env;

/// Layout version of the file header.
pub const FILE_LAYOUT_VERSION: &str = "089";

/// Recording density of the file header.
pub const RECORDING_DENSITY: &str = "01600";

/// Settings applied to every file the encoder produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderConfig {
    /// Overrides the bank name printed in the file header.
    pub bank_name: Option<String>,
    /// File sequence number (NSA); a request's own value wins.
    pub file_sequence: u32,
    /// Fixed generation timestamp; the local clock is used when absent.
    pub generated_at: Option<NaiveDateTime>,
    pub layout_version: String,
    pub density: String,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        EncoderConfig {
            bank_name: None,
            file_sequence: 1,
            generated_at: None,
            layout_version: FILE_LAYOUT_VERSION.to_string(),
            density: RECORDING_DENSITY.to_string(),
        }
    }
}

impl EncoderConfig {
    /// Reads `CNAB_FILE_SEQUENCE`, `CNAB_BANK_NAME` and `CNAB_GENERATED_AT`.
    ///
    /// Unparseable values are logged and replaced by the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a config from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = EncoderConfig::default();

        if let Some(name) = lookup("CNAB_BANK_NAME").filter(|v| !v.trim().is_empty()) {
            config.bank_name = Some(name.trim().to_string());
        }

        if let Some(raw) = lookup("CNAB_FILE_SEQUENCE") {
            match raw.trim().parse::<u32>() {
                Ok(sequence) => config.file_sequence = sequence,
                Err(e) => warn!(
                    "Ignoring CNAB_FILE_SEQUENCE {:?}: {}; using {}",
                    raw, e, config.file_sequence
                ),
            }
        }

        if let Some(raw) = lookup("CNAB_GENERATED_AT") {
            match raw.trim().parse::<NaiveDateTime>() {
                Ok(at) => config.generated_at = Some(at),
                Err(e) => warn!("Ignoring CNAB_GENERATED_AT {:?}: {}; using clock", raw, e),
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = EncoderConfig::default();
        assert_eq!(config.file_sequence, 1);
        assert_eq!(config.layout_version, "089");
        assert_eq!(config.density, "01600");
        assert!(config.generated_at.is_none());
    }

    #[test]
    fn test_reads_variables() {
        let config = EncoderConfig::from_lookup(lookup(&[
            ("CNAB_FILE_SEQUENCE", "17"),
            ("CNAB_BANK_NAME", " Banco Teste "),
            ("CNAB_GENERATED_AT", "2024-03-15T09:30:05"),
        ]));

        assert_eq!(config.file_sequence, 17);
        assert_eq!(config.bank_name.as_deref(), Some("Banco Teste"));
        assert_eq!(
            config.generated_at.map(|at| at.to_string()),
            Some("2024-03-15 09:30:05".to_string())
        );
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = EncoderConfig::from_lookup(lookup(&[
            ("CNAB_FILE_SEQUENCE", "abc"),
            ("CNAB_GENERATED_AT", "yesterday"),
        ]));
        assert_eq!(config, EncoderConfig::default());
    }
}
