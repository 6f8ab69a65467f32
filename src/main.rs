mod batch;
mod cli;
mod config;
mod convert;
mod engine;
mod export;
mod render;

use anyhow::Result;
use clap::Parser;

use crate::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
	env_logger::Builder::new()
		.filter_level(log::LevelFilter::Info)
		.parse_default_env()
		.init();

	let cli = match Cli::try_parse() {
		Ok(cli) => cli,
		// --help and --version go to stdout and exit 0
		Err(e) if !e.use_stderr() => e.exit(),
		Err(e) => {
			eprintln!("{e}");
			std::process::exit(1);
		}
	};

	cli.run().await
}
