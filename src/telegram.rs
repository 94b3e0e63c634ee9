//! Telegram bot front end
//!
//! Mirrors the HTTP surface through chat: store data, preview it, fetch the
//! raw link, inspect stats and history, clear with confirmation. All state
//! changes go through the same [`SlotFacade`] the HTTP handlers use.
//!
//! Uses explicit Dispatcher pattern for reliable message polling.

use anyhow::Result;
use std::sync::Arc;
use teloxide::{
    dispatching::{Dispatcher, UpdateFilterExt},
    dptree,
    error_handlers::LoggingErrorHandler,
    prelude::*,
    types::{ParseMode, Update},
};
use tokio::sync::RwLock;

use crate::facade::SlotFacade;
use crate::metadata::AuthorDefault;
use crate::session::{SessionEvent, SessionMap, SessionState};
use crate::telegram_ui::{
    after_store_keyboard, confirm_clear_keyboard, format_history, format_links, format_stats,
    format_store_success, format_view_data, main_menu_keyboard, menu_button_keyboard, MenuAction,
};

struct BotData {
    facade: SlotFacade,
    sessions: RwLock<SessionMap>,
}

/// Run the bot with long polling until shutdown.
pub async fn run_bot(facade: SlotFacade) -> Result<()> {
    let token = facade
        .config()
        .bot_token
        .clone()
        .ok_or_else(|| anyhow::anyhow!("BOT_TOKEN not configured"))?;

    let bot = Bot::new(token);

    // Verify bot token by calling getMe
    tracing::info!("Verifying bot token...");
    match bot.get_me().await {
        Ok(me) => {
            tracing::info!(
                "Bot authenticated: @{} (ID: {})",
                me.username.as_deref().unwrap_or("unknown"),
                me.id
            );
        }
        Err(e) => {
            tracing::error!("Failed to authenticate bot: {}", e);
            anyhow::bail!("Bot authentication failed: {}", e);
        }
    }

    // Delete any existing webhook to ensure polling works
    if let Err(e) = bot.delete_webhook().await {
        tracing::warn!("Failed to delete webhook: {} (continuing anyway)", e);
    }

    let data = Arc::new(BotData {
        facade,
        sessions: RwLock::new(SessionMap::new()),
    });

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(message_handler))
        .branch(Update::filter_callback_query().endpoint(callback_handler));

    tracing::info!("Starting bot dispatcher with long polling...");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![data])
        .default_handler(|upd| async move {
            tracing::debug!("Unhandled update: {:?}", upd);
        })
        .error_handler(LoggingErrorHandler::with_custom_text(
            "Error in bot handler",
        ))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

/// Message handler endpoint for the dispatcher
async fn message_handler(bot: Bot, msg: Message, data: Arc<BotData>) -> ResponseResult<()> {
    let user_id = msg.from.as_ref().map(|u| u.id.0).unwrap_or(0);
    let chat_id = msg.chat.id;

    let text = match msg.text() {
        Some(t) => t.to_string(),
        None => {
            bot.send_message(chat_id, "Please send plain text to store.")
                .await?;
            return Ok(());
        }
    };

    if let Some(command) = text.strip_prefix('/') {
        return handle_command(&bot, chat_id, user_id, command, &msg, &data).await;
    }

    let state = data.sessions.read().await.get(user_id);
    if state == SessionState::AwaitingData {
        data.sessions
            .write()
            .await
            .apply(user_id, SessionEvent::TextReceived);

        let author = msg.from.as_ref().map(|u| u.first_name.clone());
        match data
            .facade
            .submit(text, author.as_deref(), AuthorDefault::Unknown)
        {
            Ok(metadata) => {
                bot.send_message(
                    chat_id,
                    format_store_success(&metadata, data.facade.config()),
                )
                .parse_mode(ParseMode::Markdown)
                .reply_markup(after_store_keyboard(data.facade.config()))
                .await?;
            }
            Err(e) => {
                tracing::error!("Store submission failed: {}", e);
                bot.send_message(
                    chat_id,
                    format!("Connection error: {}\n\nYour data was not stored.", e),
                )
                .await?;
            }
        }
        return Ok(());
    }

    // Regular message outside any flow - point at the menu
    bot.send_message(chat_id, "RAW Data Bot\n\nType /start to begin or use the button below:")
        .reply_markup(menu_button_keyboard())
        .await?;
    Ok(())
}

async fn handle_command(
    bot: &Bot,
    chat_id: ChatId,
    user_id: u64,
    command: &str,
    msg: &Message,
    data: &Arc<BotData>,
) -> ResponseResult<()> {
    match command.split_whitespace().next().unwrap_or("") {
        "start" => {
            let username = msg
                .from
                .as_ref()
                .map(|u| u.first_name.clone())
                .unwrap_or_else(|| "there".to_string());

            let mut welcome = format!(
                "Welcome to RAW Data Bot, {}!\n\n\
                 Features:\n\
                 - Store any text/data with a stable raw link\n\
                 - View data statistics\n\
                 - Data history tracking\n",
                username
            );
            if data.facade.config().is_public() {
                welcome.push_str("- Web interface\n");
            }
            welcome.push_str("\nSelect an option below:");

            bot.send_message(chat_id, welcome)
                .reply_markup(main_menu_keyboard(data.facade.config()))
                .await?;
        }
        "link" => {
            bot.send_message(chat_id, format_links(data.facade.config()))
                .parse_mode(ParseMode::Markdown)
                .await?;
        }
        "stats" => {
            bot.send_message(chat_id, format_stats(&data.facade.stats()))
                .parse_mode(ParseMode::Markdown)
                .await?;
        }
        "clear" => {
            let next = data
                .sessions
                .write()
                .await
                .apply(user_id, SessionEvent::ClearRequested);

            if next == SessionState::AwaitingClearConfirm {
                let stats = data.facade.stats();
                bot.send_message(
                    chat_id,
                    format!(
                        "Warning: this will clear ALL stored data!\n\n\
                         Current size: {} bytes\nHistory entries: {}\n\n\
                         Are you sure you want to continue?",
                        stats.current_size, stats.history_entries
                    ),
                )
                .reply_markup(confirm_clear_keyboard())
                .await?;
            } else {
                bot.send_message(chat_id, "Finish or /cancel the current operation first.")
                    .await?;
            }
        }
        "health" => {
            let health = data.facade.health();
            bot.send_message(
                chat_id,
                format!(
                    "Health Check:\n\n\
                     - Server: running\n\
                     - Data: {}\n\
                     - History: {} entries\n\
                     - Public URL: {}\n\
                     - Checked: {}",
                    if health.data_exists { "stored" } else { "empty" },
                    data.facade.history_len(),
                    if health.public_url { "available" } else { "local only" },
                    health.timestamp,
                ),
            )
            .await?;
        }
        "cancel" => {
            data.sessions
                .write()
                .await
                .apply(user_id, SessionEvent::Cancel);
            bot.send_message(chat_id, "Current operation cancelled.").await?;
        }
        _ => {
            bot.send_message(chat_id, "Unknown command. Type /start for the menu.")
                .await?;
        }
    }
    Ok(())
}

/// Callback query handler for inline keyboard buttons
async fn callback_handler(bot: Bot, query: CallbackQuery, data: Arc<BotData>) -> ResponseResult<()> {
    let user_id = query.from.id.0;

    let callback_data = match &query.data {
        Some(d) => d.clone(),
        None => {
            bot.answer_callback_query(&query.id).await?;
            return Ok(());
        }
    };

    let chat_id = query.message.as_ref().map(|m| m.chat().id);
    let message_id = query.message.as_ref().map(|m| m.id());

    let action = match MenuAction::decode(&callback_data) {
        Some(a) => a,
        None => {
            bot.answer_callback_query(&query.id).await?;
            return Ok(());
        }
    };

    let (Some(cid), Some(mid)) = (chat_id, message_id) else {
        bot.answer_callback_query(&query.id).await?;
        return Ok(());
    };

    match action {
        MenuAction::UpdateData => {
            data.sessions
                .write()
                .await
                .apply(user_id, SessionEvent::UpdateRequested);
            bot.answer_callback_query(&query.id).await?;
            bot.edit_message_text(
                cid,
                mid,
                "Send me the data/text you want to store:\n\n\
                 You can send plain text, JSON data, configuration files,\n\
                 code snippets, URLs or lists.\n\n\
                 Type /cancel to abort.",
            )
            .await?;
        }

        MenuAction::ViewData => {
            bot.answer_callback_query(&query.id).await?;
            if data.facade.has_data() {
                let (content, metadata) = data.facade.current();
                bot.edit_message_text(
                    cid,
                    mid,
                    format_view_data(&content, &metadata, data.facade.config()),
                )
                .parse_mode(ParseMode::Markdown)
                .await?;
            } else {
                bot.edit_message_text(
                    cid,
                    mid,
                    "No data stored yet!\n\nUse the 'Update Data' button to store your first data.",
                )
                .await?;
            }
        }

        MenuAction::GetLink => {
            bot.answer_callback_query(&query.id).await?;
            bot.edit_message_text(cid, mid, format_links(data.facade.config()))
                .parse_mode(ParseMode::Markdown)
                .await?;
        }

        MenuAction::Stats => {
            bot.answer_callback_query(&query.id).await?;
            bot.edit_message_text(cid, mid, format_stats(&data.facade.stats()))
                .parse_mode(ParseMode::Markdown)
                .await?;
        }

        MenuAction::History => {
            bot.answer_callback_query(&query.id).await?;
            bot.edit_message_text(cid, mid, format_history(&data.facade.history()))
                .await?;
        }

        MenuAction::Help => {
            bot.answer_callback_query(&query.id).await?;
            bot.edit_message_text(cid, mid, HELP_TEXT).await?;
        }

        MenuAction::Menu => {
            bot.answer_callback_query(&query.id).await?;
            bot.edit_message_text(cid, mid, "Main Menu\n\nSelect an option:")
                .reply_markup(main_menu_keyboard(data.facade.config()))
                .await?;
        }

        MenuAction::ConfirmClear => {
            // Confirm without a pending clear is a no-op
            let pending = data.sessions.read().await.get(user_id)
                == SessionState::AwaitingClearConfirm;
            if !pending {
                bot.answer_callback_query(&query.id)
                    .text("No clear pending")
                    .await?;
                return Ok(());
            }

            data.sessions
                .write()
                .await
                .apply(user_id, SessionEvent::ClearConfirmed);

            let old_size = data.facade.stats().current_size;
            let metadata = data.facade.wipe();
            bot.answer_callback_query(&query.id).await?;
            bot.edit_message_text(
                cid,
                mid,
                format!(
                    "All data cleared successfully!\n\n\
                     Cleared: {} bytes\nTime: {}\n\n\
                     Use /start to store new data.",
                    old_size, metadata.last_updated,
                ),
            )
            .await?;
        }

        MenuAction::CancelClear => {
            data.sessions
                .write()
                .await
                .apply(user_id, SessionEvent::ClearDenied);
            bot.answer_callback_query(&query.id).await?;
            bot.edit_message_text(cid, mid, "Clear operation cancelled.").await?;
        }
    }

    Ok(())
}

const HELP_TEXT: &str = "Help Guide\n\n\
Commands:\n\
/start - Show main menu\n\
/cancel - Cancel current operation\n\
/link - Get all RAW links\n\
/stats - View statistics\n\
/clear - Clear all data\n\
/health - Check server status\n\n\
Features:\n\
- Store any text/data with a stable raw link\n\
- Multiple format outputs (JSON, Text, HTML)\n\
- Data history tracking (last 10 updates)\n\
- Real-time statistics";
