// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::Parser;
use tracing::error;

use gatebot::config::Config;
use gatebot::kernel;
use gatebot::registry::CommandRegistry;

#[tokio::main]
async fn main() {
    let config = match Config::parse().apply_overlay() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err:#}");
            std::process::exit(2);
        }
    };

    if let Err(err) = config.validate() {
        eprintln!("error: {err}");
        std::process::exit(2);
    }

    kernel::init_tracing(&config);

    let registry = CommandRegistry::new();
    if let Err(err) = kernel::run(config, registry, kernel::RoutineSchedule::default()).await {
        error!("fatal: {err:#}");
        std::process::exit(1);
    }
}
