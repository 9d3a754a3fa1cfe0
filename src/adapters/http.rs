use crate::domain::model::{Item, NewItem};
use crate::domain::ports::{ConfigProvider, ItemSource};
use crate::utils::error::{FeedError, Result};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use url::Url;

/// Items 服務的 HTTP client
#[derive(Debug, Clone)]
pub struct ItemsClient {
    client: Client,
    base_url: Url,
}

impl ItemsClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        // 確保以 '/' 結尾，join 時才不會吃掉最後一段路徑
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url = Url::parse(&normalized).map_err(|e| FeedError::InvalidConfigValueError {
            field: "api.base_url".to_string(),
            value: base_url.to_string(),
            reason: format!("Invalid URL format: {}", e),
        })?;

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { client, base_url })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::new(
            config.base_url(),
            Duration::from_secs(config.timeout_seconds()),
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).map_err(|e| FeedError::ConfigError {
            message: format!("Cannot build URL for '{}': {}", path, e),
        })
    }

    /// `GET /`
    pub async fn health(&self) -> Result<String> {
        let url = self.endpoint("")?;
        tracing::debug!("Making health request to: {}", url);
        let response = check_status(self.client.get(url).send().await?).await?;
        Ok(response.text().await?)
    }

    /// `GET /items`，服務端回傳最新的 10 筆，id 由大到小
    pub async fn list_items(&self) -> Result<Vec<Item>> {
        let url = self.endpoint("items")?;
        tracing::debug!("Making API request to: {}", url);
        let response = check_status(self.client.get(url).send().await?).await?;
        let items: Vec<Item> = response.json().await?;
        tracing::debug!("Received {} items", items.len());
        Ok(items)
    }

    /// `GET /item/{id}`
    pub async fn get_item(&self, id: i64) -> Result<Item> {
        let url = self.endpoint(&format!("item/{}", id))?;
        tracing::debug!("Making API request to: {}", url);
        let response = self.client.get(url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(FeedError::ItemNotFound { id });
        }

        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    /// `POST /new-item`，服務端回傳送出的內容 (不含新 id)
    pub async fn create_item(&self, item: &NewItem) -> Result<NewItem> {
        let url = self.endpoint("new-item")?;
        tracing::debug!("Posting new item '{}' to: {}", item.name, url);
        let response = check_status(self.client.post(url).json(item).send().await?).await?;
        Ok(response.json().await?)
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    tracing::debug!("API response status: {}", status);

    if status.is_success() {
        return Ok(response);
    }

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => format!("<unreadable body: {}>", e),
    };
    Err(FeedError::UnexpectedStatus {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl ItemSource for ItemsClient {
    async fn list_items(&self) -> Result<Vec<Item>> {
        ItemsClient::list_items(self).await
    }

    async fn create_item(&self, item: &NewItem) -> Result<NewItem> {
        ItemsClient::create_item(self, item).await
    }
}
