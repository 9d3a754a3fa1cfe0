use crate::config::toml_config::FeedConfig;
use crate::utils::error::Result;
use clap::{Parser, Subcommand};
use std::path::Path;

#[derive(Debug, Clone, Parser)]
#[command(name = "item-feed")]
#[command(about = "Live view of the items service")]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "item-feed.toml")]
    pub config: String,

    /// Override api.base_url from the config file
    #[arg(long)]
    pub base_url: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Show the most recent items
    List,
    /// Show a single item
    Get { id: i64 },
    /// Create an item and show the refreshed list
    Add {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "0")]
        quantity: i64,
    },
    /// Keep the list up to date until Ctrl-C
    Watch {
        /// Apply items pushed over /ws/last-item instead of polling
        #[arg(long)]
        push: bool,
    },
}

impl CliArgs {
    /// 載入設定檔並套用命令列覆蓋；設定檔不存在時只用命令列的值
    pub fn load_config(&self) -> Result<FeedConfig> {
        let config = if Path::new(&self.config).exists() {
            FeedConfig::from_file(&self.config)?
        } else {
            tracing::debug!("Config file {} not found, using defaults", self.config);
            FeedConfig::default()
        };

        Ok(match &self.base_url {
            Some(base_url) => config.with_base_url(base_url.clone()),
            None => config,
        })
    }
}
