pub mod feed;
pub mod store;

use crate::domain::model::Item;

pub use crate::domain::model::NewItem;
pub use crate::domain::ports::{ConfigProvider, ItemSource, PushSource};
pub use crate::utils::error::Result;

/// UI 共用的 item 清單，初始為空
pub type ItemsStore = store::Writable<Vec<Item>>;
