use clap::Parser;
use item_feed::adapters::ws::LastItemSocket;
use item_feed::core::ConfigProvider;
use item_feed::utils::{logger, validation::Validate};
use item_feed::{
    CliArgs, Command, FeedConfig, Item, ItemFeed, ItemsClient, ItemsStore, NewItem, Result,
    Unsubscriber,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    let config = match args.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(e.exit_code());
        }
    };

    // 初始化日誌
    if config.log_format() == "json" {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("Starting item-feed");
    if args.verbose {
        tracing::debug!("CLI args: {:?}", args);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }

    if let Err(e) = run(&args.command, &config).await {
        tracing::error!(
            "❌ Command failed: {} (exit code {})",
            e,
            e.exit_code()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }

    Ok(())
}

async fn run(command: &Command, config: &FeedConfig) -> Result<()> {
    let client = ItemsClient::from_config(config)?;
    let feed = ItemFeed::from_config(client, ItemsStore::default(), config);

    match command {
        Command::Get { id } => {
            let item = feed.source().get_item(*id).await?;
            print_items(std::slice::from_ref(&item));
        }
        Command::List => {
            feed.refresh().await?;
            print_items(&feed.store().get());
        }
        Command::Add { name, quantity } => {
            let renderer = render_changes(&feed).await?;
            feed.add_item(NewItem::new(name.clone(), *quantity)).await?;
            println!("✅ Item '{}' added", name);
            renderer.unsubscribe();
        }
        Command::Watch { push } => {
            let greeting = feed.source().health().await?;
            tracing::debug!("Items service answered: {}", greeting.trim());

            let renderer = render_changes(&feed).await?;
            if *push {
                let mut socket = LastItemSocket::connect(feed.source().base_url()).await?;
                feed.follow(&mut socket, shutdown_signal()).await?;
            } else {
                let interval = Duration::from_secs(config.poll_interval_seconds());
                tracing::info!("🔍 Watching {} every {:?}", feed.source().base_url(), interval);
                feed.watch(interval, shutdown_signal()).await;
            }
            renderer.unsubscribe();
        }
    }

    Ok(())
}

/// 載入清單後訂閱 store，只在內容變動時重新輸出
async fn render_changes(feed: &ItemFeed<ItemsClient>) -> Result<Unsubscriber> {
    feed.refresh().await?;

    let last_rendered: Rc<RefCell<Option<Vec<Item>>>> = Rc::new(RefCell::new(None));
    Ok(feed.store().subscribe(move |items: &Vec<Item>| {
        let mut last = last_rendered.borrow_mut();
        if last.as_ref() != Some(items) {
            print_items(items);
            *last = Some(items.clone());
        }
    }))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("⚠️ Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

fn print_items(items: &[Item]) {
    if items.is_empty() {
        println!("(no items)");
        return;
    }

    println!("{:>6}  {:<24} {:>8}", "ID", "NAME", "QTY");
    for item in items {
        println!("{:>6}  {:<24} {:>8}", item.id, item.name, item.quantity);
    }
}
