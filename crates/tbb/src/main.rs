use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use tbb_books::GoogleBooksClient;
use tbb_core::{
    books::BookSearchClient, config::Config, dispatch::Dispatcher, poller::UpdatePoller,
};
use tbb_telegram::{build_bot, TelegramMessenger, TelegramUpdateSource};

#[tokio::main]
async fn main() -> Result<(), tbb_core::Error> {
    tbb_core::logging::init("tbb")?;

    let cfg = Config::load()?;

    let catalog = Arc::new(GoogleBooksClient::from_config(&cfg)?);
    let bot = build_bot(
        &cfg.telegram_bot_token,
        cfg.telegram_api_url.as_deref(),
        cfg.poll.long_poll_timeout,
    )?;

    let messenger = Arc::new(TelegramMessenger::new(bot.clone()));
    let source = Arc::new(TelegramUpdateSource::new(bot));
    let dispatcher = Dispatcher::new(messenger, BookSearchClient::new(catalog));
    let poller = UpdatePoller::new(source, dispatcher, cfg.poll);

    let stop = CancellationToken::new();
    tokio::spawn({
        let stop = stop.clone();
        async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for ctrl-c");
                return;
            }
            info!("shutdown requested");
            stop.cancel();
        }
    });

    info!("book bot started");
    let cursor = poller.run(&stop).await?;
    info!(last_update_id = cursor.last().0, "book bot stopped");

    Ok(())
}
