use crate::domain::ports::PushSource;
use crate::utils::error::{FeedError, Result};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use url::Url;

/// 由 HTTP base URL 推出 `/ws/last-item` 的位址 (http→ws, https→wss)
pub fn last_item_url(base_url: &Url) -> Result<Url> {
    let scheme = match base_url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(FeedError::InvalidConfigValueError {
                field: "api.base_url".to_string(),
                value: base_url.to_string(),
                reason: format!("Cannot derive a WebSocket URL from scheme {}", other),
            })
        }
    };

    let mut url = base_url.join("ws/last-item").map_err(|e| FeedError::ConfigError {
        message: format!("Cannot build WebSocket URL: {}", e),
    })?;
    url.set_scheme(scheme).map_err(|_| FeedError::ConfigError {
        message: format!("Cannot switch {} to the {} scheme", base_url, scheme),
    })?;
    Ok(url)
}

/// 服務端在每次新增項目後廣播最新一筆的 WebSocket 連線
pub struct LastItemSocket {
    url: Url,
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl LastItemSocket {
    pub async fn connect(base_url: &Url) -> Result<Self> {
        let url = last_item_url(base_url)?;
        tracing::debug!("Connecting to: {}", url);
        let (stream, _) = connect_async(url.as_str()).await?;
        tracing::info!("🔌 Listening for pushed items on {}", url);
        Ok(Self { url, stream })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl PushSource for LastItemSocket {
    async fn next_message(&mut self) -> Option<Result<String>> {
        while let Some(message) = self.stream.next().await {
            match message {
                Ok(Message::Text(text)) => return Some(Ok(text.as_str().to_string())),
                Ok(Message::Ping(data)) => {
                    if let Err(e) = self.stream.send(Message::Pong(data)).await {
                        return Some(Err(e.into()));
                    }
                }
                Ok(Message::Close(_)) => {
                    tracing::debug!("Server closed {}", self.url);
                    return None;
                }
                Ok(_) => {}
                Err(e) => return Some(Err(e.into())),
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_item_url_swaps_scheme() {
        let base = Url::parse("http://127.0.0.1:3000/").unwrap();
        assert_eq!(
            last_item_url(&base).unwrap().as_str(),
            "ws://127.0.0.1:3000/ws/last-item"
        );

        let base = Url::parse("https://items.example.com/api/").unwrap();
        assert_eq!(
            last_item_url(&base).unwrap().as_str(),
            "wss://items.example.com/api/ws/last-item"
        );
    }

    #[test]
    fn test_last_item_url_rejects_other_schemes() {
        let base = Url::parse("ftp://example.com/").unwrap();
        assert!(last_item_url(&base).is_err());
    }
}
