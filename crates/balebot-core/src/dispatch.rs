//! Equality-gated dispatch helpers.

use std::future::Future;

use crate::events::IncomingEvent;
use crate::Result;

/// Outcome of [`on_message`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dispatch {
    Executed,
    Skipped,
}

/// Run `handler` when the event's textual payload equals `condition`.
///
/// This is deliberately a single equality gate, not a router. Photo and
/// unknown events carry no textual payload and never match. The handler is
/// an async closure capturing whatever context it needs (typically the bot
/// and the event).
pub async fn on_message<F, Fut>(
    event: &IncomingEvent,
    condition: &str,
    handler: F,
) -> Result<Dispatch>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<()>>,
{
    if event.data_str() == Some(condition) {
        handler().await?;
        return Ok(Dispatch::Executed);
    }
    Ok(Dispatch::Skipped)
}

/// Result of [`command_data`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandArg {
    /// Text between the first occurrence of the command and the next one
    /// (may be empty — distinct from [`CommandArg::NotFound`]).
    Found(String),
    /// The source had text but the command does not appear in it.
    NotFound,
    /// The source carries no textual payload at all.
    NoData,
}

/// Source for [`command_data`]: raw text or a normalized event.
#[derive(Clone, Copy, Debug)]
pub enum CommandSource<'a> {
    Text(&'a str),
    Event(&'a IncomingEvent),
}

impl<'a> From<&'a str> for CommandSource<'a> {
    fn from(text: &'a str) -> Self {
        Self::Text(text)
    }
}

impl<'a> From<&'a IncomingEvent> for CommandSource<'a> {
    fn from(event: &'a IncomingEvent) -> Self {
        Self::Event(event)
    }
}

/// Extract the text following `command` in the source.
///
/// The returned segment runs from the end of the first occurrence of
/// `command` to the start of the next occurrence, or to the end of the
/// text.
pub fn command_data<'a>(command: &str, source: impl Into<CommandSource<'a>>) -> CommandArg {
    let text = match source.into() {
        CommandSource::Text(t) => Some(t),
        CommandSource::Event(event) => event.data_str(),
    };
    let Some(text) = text else {
        return CommandArg::NoData;
    };
    if command.is_empty() {
        return CommandArg::NotFound;
    }
    match text.split(command).nth(1) {
        Some(rest) => CommandArg::Found(rest.to_string()),
        None => CommandArg::NotFound,
    }
}
