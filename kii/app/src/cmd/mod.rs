// Copyright 2022-2023 Protocol Labs
// SPDX-License-Identifier: Apache-2.0, MIT

//! CLI command implementations.

use crate::{
    options::{Commands, Options},
    settings::{expand_tilde, Settings},
};
use anyhow::{anyhow, Context};
use async_trait::async_trait;

pub mod genesis;

#[async_trait]
pub trait Cmd {
    async fn exec(&self, settings: Settings) -> anyhow::Result<()>;
}

/// Convenience macro to simplify declaring commands that either need or don't need settings.
///
/// ```text
/// cmd! {
///   <type-name>(self, settings) {
///     <exec-body>
///   }
/// }
/// ```
#[macro_export]
macro_rules! cmd {
    // A command which needs access to the settings.
    ($name:ident($self:ident, $settings:ident) $exec:expr) => {
        #[async_trait::async_trait]
        impl $crate::cmd::Cmd for $name {
            async fn exec(&$self, $settings: $crate::settings::Settings) -> anyhow::Result<()> {
                $exec
            }
        }
    };

    // A command which is self-contained and doesn't need the settings.
    ($name:ident($self:ident) $exec:expr) => {
        cmd!($name($self, _settings) $exec);
    };
}

/// Execute the command specified in the options.
pub async fn exec(opts: &Options, settings: Settings) -> anyhow::Result<()> {
    match &opts.command {
        Commands::Genesis(args) => args.exec(settings).await,
    }
}

/// Try to parse the settings in the configuration directory.
pub fn settings(opts: &Options) -> anyhow::Result<Settings> {
    let config_dir = expand_tilde(opts.config_dir());

    if config_dir.exists() && !config_dir.is_dir() {
        return Err(anyhow!("config '{config_dir:?}' is a not a directory"));
    }

    let settings = Settings::new(&config_dir, &opts.mode).context("error parsing settings")?;

    Ok(settings)
}
