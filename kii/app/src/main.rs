// Copyright 2022-2023 Protocol Labs
// SPDX-License-Identifier: Apache-2.0, MIT

use clap::Parser;
use tracing_subscriber::FmtSubscriber;

pub use kii_app_options as options;
pub use kii_app_settings as settings;

mod cmd;

use options::Options;

#[tokio::main]
async fn main() {
    let opts = Options::parse();

    let settings = match cmd::settings(&opts) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("failed to load settings: {e:?}");
            std::process::exit(1);
        }
    };

    let level = match opts.tracing_level() {
        Some(level) => level,
        None => match settings.tracing_level() {
            Ok(level) => level,
            Err(e) => {
                eprintln!("{e:?}");
                std::process::exit(1);
            }
        },
    };

    // Log events to stderr, so exported genesis on stdout can be piped.
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    if let Err(e) = cmd::exec(&opts, settings).await {
        tracing::error!("failed to execute {:?}: {e:?}", opts);
        std::process::exit(1);
    }
}
