use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::transport::Transport;

/// Tuning for the blocking update poll.
#[derive(Clone, Debug, Default)]
pub struct PollOptions {
    /// Delay inserted after an empty poll before the next one. `None` keeps
    /// the source-compatible tight loop.
    pub idle_delay: Option<Duration>,
    /// Cancelling this token aborts an in-flight
    /// [`Bot::next_event`](crate::bot::Bot::next_event) with
    /// [`crate::Error::Cancelled`].
    pub cancel: CancellationToken,
}

/// Bot API client over a pluggable [`Transport`].
///
/// All state that changes between calls (the polling cursor) lives in
/// [`crate::session::Session`], passed in by the caller; the client itself
/// is immutable and can be shared.
pub struct Bot<T> {
    pub(crate) transport: T,
    pub(crate) poll: PollOptions,
}

impl<T: Transport> Bot<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            poll: PollOptions::default(),
        }
    }

    pub fn with_poll_options(mut self, poll: PollOptions) -> Self {
        self.poll = poll;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}
