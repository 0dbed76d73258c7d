use crate::config::BotConfig;

/// Mutable per-bot polling state.
///
/// The update cursor lives here, owned by the caller and handed to
/// [`crate::bot::Bot::next_event`] by `&mut`, so two concurrent polls over
/// the same session cannot race on it. The cursor starts at 0 for every new
/// session and is never persisted.
#[derive(Clone, Debug)]
pub struct Session {
    pub config: BotConfig,
    last_update_id: i64,
}

impl Session {
    pub fn new(config: BotConfig) -> Self {
        Self {
            config,
            last_update_id: 0,
        }
    }

    /// `offset` parameter for the next `getUpdates` call.
    pub fn offset(&self) -> i64 {
        self.last_update_id + 1
    }

    /// Highest update id inspected so far (0 before the first update).
    pub fn last_update_id(&self) -> i64 {
        self.last_update_id
    }

    /// Advance the cursor to an inspected update id.
    ///
    /// Called for every id the poll loop sees, including updates that
    /// normalize to unknown. Batches arrive in ascending id order, so plain
    /// assignment keeps the cursor non-decreasing.
    pub(crate) fn advance(&mut self, update_id: i64) {
        self.last_update_id = update_id;
    }
}
