#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Squad Defence session.

mod driver;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use squad_defence_tables::Tables;
use squad_defence_world::{query, World};
use tracing_subscriber::EnvFilter;

use crate::driver::{Driver, DriverConfig};

/// Headless Squad Defence simulation.
#[derive(Debug, Parser)]
#[command(name = "squad-defence")]
#[command(about = "Run a headless Squad Defence session and print its summary")]
struct Cli {
    /// Table file with roster, recipes and balance; bundled tables when omitted.
    #[arg(long)]
    tables: Option<PathBuf>,
    /// Seed of the summon driver.
    #[arg(long, default_value_t = 7)]
    seed: u64,
    /// Simulated seconds before the run stops.
    #[arg(long, default_value_t = 600)]
    duration: u64,
    /// Simulation step in milliseconds.
    #[arg(long, default_value_t = 100)]
    tick_ms: u64,
    /// Delay between a monster's final hit and its removal, in milliseconds.
    #[arg(long, default_value_t = 300)]
    settle_ms: u64,
    /// Characters summoned at the start of every wave.
    #[arg(long, default_value_t = 3)]
    summons: u32,
    /// Maximum number of units kept on the field.
    #[arg(long, default_value_t = 6)]
    field_size: usize,
}

impl Cli {
    fn driver_config(&self) -> DriverConfig {
        DriverConfig {
            seed: self.seed,
            duration: Duration::from_secs(self.duration),
            tick: Duration::from_millis(self.tick_ms.max(1)),
            settle_delay: Duration::from_millis(self.settle_ms),
            summons_per_wave: self.summons,
            field_size: self.field_size,
        }
    }
}

/// Entry point for the Squad Defence command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let tables = match &cli.tables {
        Some(path) => Tables::load(path)
            .with_context(|| format!("failed to load tables from {}", path.display()))?,
        None => Tables::bundled().context("bundled tables are invalid")?,
    };
    let world = World::new(tables.roster, tables.recipes, tables.balance);
    println!("{}", query::welcome_banner(&world));

    let summary = Driver::new(world, cli.driver_config()).run();
    println!("{summary}");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
