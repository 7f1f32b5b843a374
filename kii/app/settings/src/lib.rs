// Copyright 2022-2023 Protocol Labs
// SPDX-License-Identifier: Apache-2.0, MIT
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context;
use config::{Config, ConfigError, Environment, File};
use kii_module::{BlockHeader, BlockHeight};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Chain the genesis commands pretend to run on.
    pub chain_id: String,
    /// Height of the context the genesis is imported at.
    pub block_height: BlockHeight,
    /// Log level, unless overridden on the command line.
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            chain_id: "kii-local".to_owned(),
            block_height: 0,
            log_level: "info".to_owned(),
        }
    }
}

impl Settings {
    /// Load the default configuration from a directory,
    /// then potential overrides specific to the run mode,
    /// then overrides from the environment, e.g. `KII_CHAIN_ID`.
    ///
    /// None of the files have to exist.
    pub fn new(config_dir: &Path, run_mode: &str) -> Result<Self, ConfigError> {
        let c = Config::builder()
            .add_source(File::from(config_dir.join("default")).required(false))
            .add_source(File::from(config_dir.join(run_mode)).required(false))
            .add_source(
                Environment::with_prefix("kii")
                    .prefix_separator("_")
                    .separator("__")
                    .ignore_empty(true),
            )
            .build()?;

        c.try_deserialize()
    }

    pub fn tracing_level(&self) -> anyhow::Result<tracing::Level> {
        tracing::Level::from_str(&self.log_level)
            .with_context(|| format!("invalid log level: {}", self.log_level))
    }

    /// Header of the context genesis operations run in.
    pub fn block_header(&self) -> BlockHeader {
        BlockHeader {
            chain_id: self.chain_id.clone(),
            block_height: self.block_height,
        }
    }
}

/// Expand a leading `~` to the home directory of the user.
pub fn expand_tilde<P: AsRef<Path>>(path: P) -> PathBuf {
    let p = path.as_ref();
    match p.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => p.to_path_buf(),
        },
        Err(_) => p.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{expand_tilde, Settings};

    #[test]
    fn defaults_without_files() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::new(dir.path(), "dev").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn mode_overrides_default() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("default.toml"),
            "chain_id = \"kii-devnet\"\nblock_height = 5\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("test.toml"), "block_height = 100\n").unwrap();

        let settings = Settings::new(dir.path(), "test").unwrap();

        assert_eq!(settings.chain_id, "kii-devnet");
        assert_eq!(settings.block_height, 100);
        assert_eq!(settings.log_level, "info");

        let header = settings.block_header();
        assert_eq!(header.chain_id, "kii-devnet");
        assert_eq!(header.block_height, 100);
    }

    #[test]
    fn parse_tracing_level() {
        let mut settings = Settings::default();
        assert_eq!(settings.tracing_level().unwrap(), tracing::Level::INFO);

        settings.log_level = "debug".to_owned();
        assert_eq!(settings.tracing_level().unwrap(), tracing::Level::DEBUG);

        settings.log_level = "chatty".to_owned();
        assert!(settings.tracing_level().is_err());
    }

    #[test]
    fn tilde_is_expanded() {
        let p = expand_tilde("~/.kii");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(p, home.join(".kii"));
        }
        assert_eq!(expand_tilde("/tmp/kii"), PathBuf::from("/tmp/kii"));
    }
}
