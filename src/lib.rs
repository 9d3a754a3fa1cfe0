pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::{CliArgs, Command};

pub use crate::adapters::http::ItemsClient;
pub use crate::config::FeedConfig;
pub use crate::core::{
    feed::ItemFeed,
    store::{Unsubscriber, Writable},
    ItemsStore,
};
pub use crate::domain::model::{Item, NewItem};
pub use crate::utils::error::{FeedError, Result};
