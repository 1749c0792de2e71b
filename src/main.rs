use clap::Parser;

use hitstats::cli::{Cli, Commands, ConfigCommands};
use hitstats::config::AppConfig;
use hitstats::runtime::modes;
use hitstats::system::init_logging;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Config {
            action: ConfigCommands::Generate { output_path, force },
        }) => match modes::generate_config(output_path.as_deref(), force) {
            Ok(path) => println!("Sample configuration written to {}", path),
            Err(e) => {
                eprintln!("{}", e.format_colored());
                std::process::exit(1);
            }
        },
        Some(Commands::Serve) | None => {
            let config = AppConfig::load(cli.config.as_deref());

            let guard = match init_logging(&config.logging) {
                Ok(guard) => guard,
                Err(e) => {
                    eprintln!("{}", e.format_colored());
                    std::process::exit(1);
                }
            };

            if let Err(e) = modes::run_server(config).await {
                tracing::error!("Server exited with error: {:#}", e);
                drop(guard);
                std::process::exit(1);
            }
            drop(guard);
        }
    }
}
