use clap::{Args, Subcommand};
use std::error::Error;

use gain::Config;

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show the effective configuration
    Show,
}

impl ConfigCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn Error>> {
        match self.command {
            ConfigSubcommand::Show => {
                println!("data_dir:    {}", config.data_dir.display());
                println!("device_id:   {}", config.device_id);
                println!("debounce_ms: {}", config.debounce_ms);
                if config.sync.is_configured() {
                    // never echo the api key itself
                    let url = config.sync.server_url.as_deref().unwrap_or_default();
                    println!("backend:     remote ({}), api key set", url);
                } else {
                    println!("backend:     local files");
                }
            }
        }
        Ok(())
    }
}
