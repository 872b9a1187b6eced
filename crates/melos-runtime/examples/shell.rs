//! Windowed shell demo -- two terminal panes, a tick counter, a startup timer.
//!
//! Run with:
//!   cargo run --example shell --features renderer -p melos-runtime
//!
//! Controls:
//!   F11 -- toggle fullscreen
//!   LeftShift+F11 -- toggle window decorations
//!   LeftShift+Escape -- quit

use melos_runtime::prelude::*;
use melos_runtime::modules::{tally, terminal, timer};
use melos_runtime::render::{run_windowed, WindowConfig};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut registry = ComponentRegistry::new();

    terminal::spawn(
        &mut registry,
        Vec2::new(40.0, 60.0),
        Vec2::new(560.0, 400.0),
        "system log",
    )?;
    terminal::spawn(
        &mut registry,
        Vec2::new(660.0, 60.0),
        Vec2::new(560.0, 400.0),
        "console",
    )?;
    tally::spawn(&mut registry)?;
    // Self-removing countdown, visible in the logs at debug level.
    timer::spawn(&mut registry, 300)?;

    run_windowed(
        registry,
        RuntimeConfig::default(),
        WindowConfig {
            title: "melos shell".to_owned(),
            ..WindowConfig::default()
        },
    )
}
