use crate::domain::model::{Item, NewItem};
use crate::utils::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ItemSource: Send + Sync {
    async fn list_items(&self) -> Result<Vec<Item>>;
    async fn create_item(&self, item: &NewItem) -> Result<NewItem>;
}

/// 服務端推送的文字訊息來源；連線結束時回傳 `None`
#[async_trait]
pub trait PushSource: Send {
    async fn next_message(&mut self) -> Option<Result<String>>;
}

pub trait ConfigProvider: Send + Sync {
    fn base_url(&self) -> &str;
    fn timeout_seconds(&self) -> u64;
    fn poll_interval_seconds(&self) -> u64;
    fn prepend_pushed(&self) -> bool;
}
