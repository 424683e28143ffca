//! Drives attach/detach/lookup scenarios against a fresh context registry.
//!
//! ```text
//! hostctx-sim scenarios/lifecycle.toml
//! HOSTCTX_LOG=hostctx_registry=trace hostctx-sim -v scenarios/lifecycle.toml
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

mod scenario;

use scenario::{Runner, Scenario};

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "hostctx-sim")]
#[command(about = "Replay host context lifecycle scenarios")]
struct Args {
	/// Scenario file (TOML)
	#[arg(value_name = "PATH")]
	scenario: PathBuf,

	/// Verbose logging
	#[arg(short, long)]
	verbose: bool,
}

fn main() -> anyhow::Result<()> {
	let args = Args::parse();
	setup_tracing(args.verbose);

	let scenario = Scenario::load(&args.scenario)?;
	info!(path = %args.scenario.display(), steps = scenario.steps.len(), "scenario loaded");

	let events = Runner::new(&scenario.registry, &scenario.engine).run(&scenario.steps)?;
	for event in &events {
		println!("{event}");
	}
	info!(events = events.len(), "scenario finished");
	Ok(())
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_env("HOSTCTX_LOG")
		.or_else(|_| EnvFilter::try_from_default_env())
		.unwrap_or_else(|_| {
			if verbose {
				EnvFilter::new("hostctx_registry=trace,hostctx_engine=debug,hostctx_sim=debug,info")
			} else {
				EnvFilter::new("warn")
			}
		});

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(true)
		.init();
}
