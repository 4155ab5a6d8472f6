use std::process::ExitCode;

use clap::Parser;
use clap::Subcommand;
use getwatch::generate_client;
use getwatch::generate_server;
use getwatch::target_path_from_env;
use getwatch::GetwatchConfig;
use getwatch::ResourceDescriptor;
use getwatch::Result;
use tracing::error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Injects Get/Watch regions into the file named by `GETWATCH_FILE`
#[derive(Debug, Parser)]
#[command(name = "getwatch", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate the client accessors for a resource
    GenerateClient {
        /// Resource name, e.g. `Pod`
        name: String,
        /// Request field used as the store key; omit for singletons
        key_param: Option<String>,
    },
    /// Generate the server handlers for a resource
    GenerateServer {
        /// Region number inside the target file
        index: u32,
        /// Resource name, e.g. `Pod`
        name: String,
    },
}

fn main() -> ExitCode {
    init_observability();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("getwatch: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = GetwatchConfig::new()?.validate()?;
    let path = target_path_from_env(&config.codegen.target_env)?;

    match cli.command {
        Command::GenerateClient { name, key_param } => {
            let descriptor = ResourceDescriptor::new(name, key_param.as_deref())?;
            generate_client(&path, &descriptor, &config.codegen)
        }
        Command::GenerateServer { index, name } => {
            let descriptor = ResourceDescriptor::new(name, None)?;
            generate_server(&path, index, &descriptor, &config.codegen)
        }
    }
}

fn init_observability() {
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false);
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(fmt_layer)
        .init();
}
