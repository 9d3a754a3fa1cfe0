use anyhow::Result;
use futures_util::SinkExt;
use item_feed::adapters::ws::LastItemSocket;
use item_feed::{FeedConfig, Item, ItemFeed, ItemsClient, ItemsStore};
use std::cell::RefCell;
use std::rc::Rc;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::Message;
use url::Url;

fn item(id: i64, name: &str, quantity: i64) -> Item {
    Item {
        id,
        name: name.to_string(),
        quantity,
    }
}

/// 模擬 `/ws/last-item`：送出給定的訊息後關閉連線，回傳客戶端請求的路徑
async fn serve_pushes(listener: TcpListener, messages: Vec<&'static str>) -> Result<String> {
    let (socket, _) = listener.accept().await?;
    let mut requested = String::new();
    let mut stream = tokio_tungstenite::accept_hdr_async(
        socket,
        |request: &Request, response: Response| -> std::result::Result<Response, ErrorResponse> {
            requested = request.uri().path().to_string();
            Ok(response)
        },
    )
    .await?;

    for message in messages {
        stream.send(Message::text(message)).await?;
    }
    stream.close(None).await?;
    Ok(requested)
}

#[tokio::test]
async fn test_pushed_items_flow_into_store() -> Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let address = listener.local_addr()?;
    let server = tokio::spawn(serve_pushes(
        listener,
        vec![
            r#"{"id":5,"name":"Lamb","quantity":20}"#,
            "sql: no rows in result set",
            r#"{"id":6,"name":"Eggs","quantity":12}"#,
        ],
    ));

    let config = FeedConfig::default().with_base_url(format!("http://{}", address));
    let client = ItemsClient::from_config(&config)?;
    let store = ItemsStore::default();
    store.set(vec![item(1, "Cheese", 5)]);
    let feed = ItemFeed::from_config(client, store.clone(), &config);

    let rendered = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&rendered);
    let handle = store.subscribe(move |items: &Vec<Item>| sink.borrow_mut().push(items.len()));

    let mut socket = LastItemSocket::connect(feed.source().base_url()).await?;
    assert_eq!(socket.url().scheme(), "ws");
    let applied = feed
        .follow(&mut socket, std::future::pending::<()>())
        .await?;

    let requested = server.await??;
    assert_eq!(requested, "/ws/last-item");
    assert_eq!(applied, 2);
    assert_eq!(
        *store.get(),
        vec![item(6, "Eggs", 12), item(5, "Lamb", 20), item(1, "Cheese", 5)]
    );
    assert_eq!(*rendered.borrow(), vec![1, 2, 3]);

    handle.unsubscribe();
    Ok(())
}

#[tokio::test]
async fn test_connect_fails_without_server() -> Result<()> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let address = listener.local_addr()?;
    drop(listener);

    let base = Url::parse(&format!("http://{}/", address))?;
    assert!(LastItemSocket::connect(&base).await.is_err());
    Ok(())
}
