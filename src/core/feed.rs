use crate::core::ItemsStore;
use crate::domain::model::{Item, NewItem};
use crate::domain::ports::{ConfigProvider, ItemSource, PushSource};
use crate::utils::error::{FeedError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// 把 item 來源接到共享的 [`ItemsStore`]
pub struct ItemFeed<S: ItemSource> {
    source: S,
    store: ItemsStore,
    prepend_pushed: bool,
}

impl<S: ItemSource> ItemFeed<S> {
    pub fn new(source: S, store: ItemsStore, prepend_pushed: bool) -> Self {
        Self {
            source,
            store,
            prepend_pushed,
        }
    }

    pub fn from_config<C: ConfigProvider>(source: S, store: ItemsStore, config: &C) -> Self {
        Self::new(source, store, config.prepend_pushed())
    }

    pub fn store(&self) -> ItemsStore {
        self.store.clone()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// 重新讀取清單並整個替換 store 內容
    pub async fn refresh(&self) -> Result<usize> {
        let items = self.source.list_items().await?;
        let count = items.len();
        self.store.set(items);
        tracing::debug!("Store refreshed with {} items", count);
        Ok(count)
    }

    /// 建立新項目後重新讀取，新 id 只能從清單得知
    pub async fn add_item(&self, item: NewItem) -> Result<NewItem> {
        let created = self.source.create_item(&item).await?;
        tracing::info!("✅ Created item '{}' (quantity {})", created.name, created.quantity);
        self.refresh().await?;
        Ok(created)
    }

    /// 套用服務端推送的「最新項目」訊息
    ///
    /// 同 id 的項目原地替換，否則依 `prepend_pushed` 插在最前或最後。
    /// 訊息不是合法的 item 時回傳 [`FeedError::MessageError`]，store 不變。
    pub fn apply_pushed(&self, message: &str) -> Result<Item> {
        let pushed: Item = serde_json::from_str(message).map_err(|e| FeedError::MessageError {
            message: format!("{} ({})", message.trim(), e),
        })?;

        let prepend = self.prepend_pushed;
        self.store
            .update(|current| merge_pushed(current, pushed.clone(), prepend));
        tracing::debug!("Applied pushed item {}", pushed.id);
        Ok(pushed)
    }

    /// 每隔 `interval` 重新讀取，直到 `shutdown` 完成；回傳成功的次數
    pub async fn watch<F>(&self, interval: Duration, shutdown: F) -> usize
    where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        let mut refreshes = 0;
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Stopping watch after {} refreshes", refreshes);
                    break;
                }
                _ = ticker.tick() => {
                    match self.refresh().await {
                        Ok(_) => refreshes += 1,
                        Err(e) => tracing::warn!("⚠️ Refresh failed, retrying next tick: {}", e),
                    }
                }
            }
        }
        refreshes
    }
}

impl<S: ItemSource> ItemFeed<S> {
    /// 持續套用推送的訊息，直到連線結束或 `shutdown` 完成；回傳套用的筆數
    ///
    /// 不是 item 的訊息 (服務端查詢失敗時送的錯誤文字) 只記 log，不中斷。
    pub async fn follow<P, F>(&self, pushes: &mut P, shutdown: F) -> Result<usize>
    where
        P: PushSource,
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let mut applied = 0;
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Stopping follow after {} pushed items", applied);
                    break;
                }
                message = pushes.next_message() => match message {
                    Some(Ok(text)) => match self.apply_pushed(&text) {
                        Ok(_) => applied += 1,
                        Err(e) => tracing::warn!("⚠️ Ignoring push message: {}", e),
                    },
                    Some(Err(e)) => return Err(e),
                    None => {
                        tracing::info!("Push stream closed after {} items", applied);
                        break;
                    }
                },
            }
        }
        Ok(applied)
    }
}

fn merge_pushed(current: &[Item], pushed: Item, prepend: bool) -> Vec<Item> {
    let mut merged = current.to_vec();
    if let Some(existing) = merged.iter_mut().find(|item| item.id == pushed.id) {
        *existing = pushed;
    } else if prepend {
        merged.insert(0, pushed);
    } else {
        merged.push(pushed);
    }
    merged
}
