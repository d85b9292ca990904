use anyhow::Result;
use std::sync::Arc;
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::prelude::*;
use teloxide::types::CallbackQuery;
use tracing::info;

use spotbot::bot;
use spotbot::config::BotConfig;
use spotbot::context::AppContext;
use spotbot::dialogue::ResetDialogueState;
use spotbot::logging::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let config = BotConfig::from_env()?;
    init_logging(config.log_format);

    info!("Starting SpotBot");

    let bot = Bot::new(&config.token);
    let ctx = Arc::new(AppContext::new(&config)?);

    info!(storage_root = %ctx.store.root().display(), "Score storage ready, starting dispatcher");

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .enter_dialogue::<Message, InMemStorage<ResetDialogueState>, ResetDialogueState>()
                .endpoint(bot::message_handler),
        )
        .branch(
            Update::filter_callback_query()
                .enter_dialogue::<CallbackQuery, InMemStorage<ResetDialogueState>, ResetDialogueState>()
                .endpoint(bot::callback_handler),
        );

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![InMemStorage::<ResetDialogueState>::new(), ctx])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
