use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use gemchat::{app, ask, logging, Config};

#[derive(Parser)]
#[command(name = "gemchat")]
#[command(version)]
#[command(about = "Chat with Gemini from your terminal", long_about = None)]
struct Cli {
    /// Path to config.toml (default: ~/.gemchat/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Model to use instead of the configured one
    #[arg(long, global = true)]
    model: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one prompt and print the reply
    Ask {
        #[arg(required = true, trailing_var_arg = true)]
        prompt: Vec<String>,
    },
    /// Show the resolved configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(model) = cli.model {
        config.model = model;
    }

    match cli.command {
        None => {
            logging::init_file(&config.log_path())?;
            app::run(config).await
        }
        Some(Commands::Ask { prompt }) => {
            logging::init_stderr()?;
            ask::run(&config, &prompt.join(" ")).await
        }
        Some(Commands::Config) => {
            let path = cli.config.unwrap_or_else(Config::default_path);
            println!("config file: {}", path.display());
            println!("model:       {}", config.model);
            println!("base url:    {}", config.base_url);
            println!("log file:    {}", config.log_path().display());
            println!(
                "api key:     {}",
                if config.has_api_key() { "found" } else { "missing" }
            );
            Ok(())
        }
    }
}
