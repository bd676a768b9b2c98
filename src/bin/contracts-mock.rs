//! Runs the mock Contracts Server as its own process.

// std
use std::{fs, path::PathBuf};
// crates.io
use clap::{ArgAction, Parser, Subcommand};
use color_eyre::{Result, eyre::WrapErr};
use tracing_subscriber::EnvFilter;
// self
use contracts_client::mock::{MockBackend, Settings};

#[derive(Debug, Parser)]
#[command(name = "contracts-mock", about = "A mock contracts server for client testing")]
struct Cli {
	/// Log verbosity: WARN (-v), INFO (-vv), DEBUG (-vvv).
	#[arg(short, long, action = ArgAction::Count, global = true)]
	verbosity: u8,
	/// File where relevant non-log output is written.
	#[arg(short, long, global = true)]
	output: Option<PathBuf>,
	#[command(subcommand)]
	command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
	/// Print the settings `run` uses unless overridden.
	ShowDefaults,
	/// Serve the mock contracts server; the output file, if any, receives the bound address.
	Run {
		/// YAML settings file; defaults are used when omitted.
		settings: Option<PathBuf>,
		/// Overrides the address the server listens on.
		#[arg(short, long, env = "CONTRACTS_MOCK_ADDRESS")]
		address: Option<String>,
	},
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let cli = Cli::parse();

	init_tracing(cli.verbosity);

	match cli.command {
		Command::ShowDefaults => {
			let out = serde_yaml::to_string(&Settings::default())
				.wrap_err("Could not marshal default settings.")?;

			emit(cli.output.as_ref(), &out)
		},
		Command::Run { settings, address } => {
			let mut settings = match settings {
				Some(path) => {
					let raw = fs::read_to_string(&path)
						.wrap_err_with(|| format!("Could not read settings file {}.", path.display()))?;

					serde_yaml::from_str::<Settings>(&raw).wrap_err("Could not parse settings.")?
				},
				None => Settings::default(),
			};

			if let Some(address) = address {
				settings.address = address;
			}

			let backend = MockBackend::new(settings);
			let address = backend.serve().await?;

			if let Some(path) = cli.output.as_ref() {
				fs::write(path, &address)
					.wrap_err_with(|| format!("Could not write output file {}.", path.display()))?;
			}

			tracing::info!(%address, "serving; press Ctrl-C to stop");
			tokio::signal::ctrl_c().await.wrap_err("Could not listen for Ctrl-C.")?;
			backend.stop().await?;

			Ok(())
		},
	}
}

fn init_tracing(verbosity: u8) {
	let level = match verbosity {
		0 => "error",
		1 => "warn",
		2 => "info",
		_ => "debug",
	};
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn emit(output: Option<&PathBuf>, content: &str) -> Result<()> {
	match output {
		Some(path) => fs::write(path, content)
			.wrap_err_with(|| format!("Could not write output file {}.", path.display())),
		None => {
			println!("{content}");

			Ok(())
		},
	}
}
