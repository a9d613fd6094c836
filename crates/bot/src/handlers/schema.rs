//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{HandlerExt, UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;

use super::commands::handle_command;
use super::types::{HandlerDeps, HandlerError};
use super::uploads::upload_handler;
use crate::bot::Command;

/// Creates the main dispatcher schema for the Telegram bot.
///
/// The same schema is used in production and in integration tests.
/// Messages that are neither a known command nor a document fall through
/// unhandled.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    dptree::entry()
        .branch(command_handler())
        .branch(upload_handler(deps))
}

fn command_handler() -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(handle_command))
}
