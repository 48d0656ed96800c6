//! Configuration commands.

use clap::{Args, Subcommand};

use crate::config::Config;

/// Inspect configuration
#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    command: ConfigSubcommand,
}

#[derive(Subcommand)]
enum ConfigSubcommand {
    /// Show the effective configuration and where each value came from
    Show,
    /// Print the config file path
    Path,
}

impl ConfigCommand {
    pub fn run(&self, config: &Config) {
        match &self.command {
            ConfigSubcommand::Show => {
                println!(
                    "data_dir: {} ({})",
                    config.data_dir.value.display(),
                    config.data_dir.source
                );
                match &config.config_file {
                    Some(path) => println!("config_file: {}", path.display()),
                    None => println!("config_file: (none)"),
                }
                println!(
                    "sync.server_url: {}",
                    config.sync.server_url.as_deref().unwrap_or("(not set)")
                );
                println!(
                    "sync.api_key: {}",
                    if config.sync.api_key.is_some() {
                        "(set)"
                    } else {
                        "(not set)"
                    }
                );
                println!("sync.auto_sync: {}", config.sync.auto_sync);
            }
            ConfigSubcommand::Path => {
                let path = config
                    .config_file
                    .clone()
                    .unwrap_or_else(Config::default_config_path);
                println!("{}", path.display());
            }
        }
    }
}
