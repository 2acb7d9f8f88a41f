//! Waiting for follow-up messages after a command
//!
//! A collector subscribes to the [`MessageBus`](crate::bus::MessageBus) and
//! consumes prefix-less messages until it reaches one of its terminal states:
//!
//! ```text
//! Idle -> Awaiting -> Completed | Cancelled | TimedOut | Failed
//! ```
//!
//! Because the bus is a broadcast, concurrently running collectors all see the
//! same messages. [`CollectorScope`] narrows what a collector considers, by
//! default to the channel the command was sent in.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

use crate::{
    HeraldError, Result,
    context::Context,
    gateway::{ChannelId, IncomingMessage, UserId},
};

/// Check run over a candidate message's content; an error aborts collection
pub type Filter = Arc<dyn Fn(&str) -> Result<()> + Send + Sync>;

pub const DEFAULT_CANCEL_WORD: &str = "c";

/// Built-in filters
pub mod filters {
    use crate::{HeraldError, Result};

    /// Accepts signed integers
    pub fn is_number(content: &str) -> Result<()> {
        content
            .parse::<i64>()
            .map(|_| ())
            .map_err(|_| HeraldError::filter_rejected("is_number", content))
    }
}

/// Which bus messages a collector looks at
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CollectorScope {
    /// Every prefix-less message, wherever it was sent
    Global,
    /// Messages in the triggering channel
    #[default]
    Channel,
    /// Messages from the triggering author in the triggering channel
    AuthorInChannel,
}

impl CollectorScope {
    fn admits(self, trigger: &Trigger, message: &IncomingMessage) -> bool {
        match self {
            Self::Global => true,
            Self::Channel => message.channel_id == trigger.channel_id,
            Self::AuthorInChannel => {
                message.channel_id == trigger.channel_id && message.author.id == trigger.author
            }
        }
    }
}

/// The parts of the command message a collector needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trigger {
    pub author: UserId,
    pub channel_id: ChannelId,
    pub timestamp: DateTime<Utc>,
}

impl From<&IncomingMessage> for Trigger {
    fn from(message: &IncomingMessage) -> Self {
        Self {
            author: message.author.id,
            channel_id: message.channel_id,
            timestamp: message.timestamp,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectorState {
    Idle,
    Awaiting,
    Completed,
    Cancelled,
    TimedOut,
    Failed,
}

impl CollectorState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Idle | Self::Awaiting)
    }
}

/// Result of offering one message to an awaiting collector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Out of scope or older than the trigger
    Ignored,
    /// Appended, still awaiting more
    Collected,
    /// Appended and the count bound was reached
    Completed,
}

pub struct MessageCollector {
    filters: Vec<Filter>,
    timeout: Duration,
    end_after: usize,
    scope: CollectorScope,
    cancel_word: String,
    collected: Vec<Arc<IncomingMessage>>,
    state: CollectorState,
}

impl MessageCollector {
    /// A collector that completes when `timeout` elapses
    ///
    /// Set [`end_after`](Self::end_after) to finish early after that many
    /// qualifying messages; the timeout then becomes a failure.
    pub fn new(timeout: Duration) -> Self {
        Self {
            filters: Vec::new(),
            timeout,
            end_after: 0,
            scope: CollectorScope::default(),
            cancel_word: DEFAULT_CANCEL_WORD.to_string(),
            collected: Vec::new(),
            state: CollectorState::Idle,
        }
    }

    pub fn filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&str) -> Result<()> + Send + Sync + 'static,
    {
        self.filters.push(Arc::new(filter));
        self
    }

    pub fn end_after(mut self, count: usize) -> Self {
        self.end_after = count;
        self
    }

    pub fn scope(mut self, scope: CollectorScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn cancel_word(mut self, word: impl Into<String>) -> Self {
        self.cancel_word = word.into().to_lowercase();
        self
    }

    pub fn state(&self) -> CollectorState {
        self.state
    }

    pub fn timeout_duration(&self) -> Duration {
        self.timeout
    }

    /// Messages collected so far, in arrival order
    pub fn collected(&self) -> &[Arc<IncomingMessage>] {
        &self.collected
    }

    pub fn into_collected(self) -> Vec<Arc<IncomingMessage>> {
        self.collected
    }

    /// Collect replies to the command behind `ctx`
    pub async fn collect(&mut self, ctx: &Context) -> Result<()> {
        let rx = ctx.subscribe();
        self.collect_from(rx, Trigger::from(ctx.message())).await
    }

    /// Run to a terminal state over an existing subscription
    ///
    /// Running a finished collector again starts over with an empty buffer.
    pub async fn collect_from(
        &mut self,
        mut rx: broadcast::Receiver<Arc<IncomingMessage>>,
        trigger: Trigger,
    ) -> Result<()> {
        self.collected.clear();
        self.state = CollectorState::Awaiting;

        let deadline = tokio::time::sleep(self.timeout);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                _ = &mut deadline => return self.on_timeout(),
                received = rx.recv() => match received {
                    Ok(message) => {
                        if self.offer(&trigger, message)? == Step::Completed {
                            return Ok(());
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Collector fell behind the message bus");
                    }
                    Err(RecvError::Closed) => {
                        self.state = CollectorState::Failed;
                        return Err(HeraldError::MessageBusClosed);
                    }
                },
            }
        }
    }

    /// Apply one message to an awaiting collector
    ///
    /// An idle collector starts awaiting; a finished one ignores everything.
    pub fn offer(&mut self, trigger: &Trigger, message: Arc<IncomingMessage>) -> Result<Step> {
        match self.state {
            CollectorState::Idle => self.state = CollectorState::Awaiting,
            CollectorState::Awaiting => {}
            _ => return Ok(Step::Ignored),
        }

        if !self.scope.admits(trigger, &message) {
            return Ok(Step::Ignored);
        }

        let fresh = message.timestamp > trigger.timestamp;
        if fresh
            && message.author.id == trigger.author
            && message.content.to_lowercase() == self.cancel_word
        {
            debug!(author = %trigger.author, "Collector cancelled");
            self.state = CollectorState::Cancelled;
            return Err(HeraldError::CollectorCancelled);
        }

        if !fresh {
            return Ok(Step::Ignored);
        }

        // Without filters or a count, only the timeout ends collection
        if self.filters.is_empty() && self.end_after == 0 {
            return Ok(Step::Ignored);
        }

        for filter in &self.filters {
            if let Err(e) = filter(&message.content) {
                debug!(error = %e, "Collector filter rejected message");
                self.state = CollectorState::Failed;
                return Err(e);
            }
        }

        self.collected.push(message);
        if self.end_after > 0 && self.collected.len() >= self.end_after {
            self.state = CollectorState::Completed;
            return Ok(Step::Completed);
        }
        Ok(Step::Collected)
    }

    fn on_timeout(&mut self) -> Result<()> {
        if self.end_after == 0 {
            self.state = CollectorState::Completed;
            return Ok(());
        }

        self.state = CollectorState::TimedOut;
        Err(HeraldError::DeadlineExceeded {
            timeout: self.timeout,
            collected: self.collected.len(),
            expected: self.end_after,
        })
    }
}

impl fmt::Debug for MessageCollector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageCollector")
            .field("filters", &self.filters.len())
            .field("timeout", &self.timeout)
            .field("end_after", &self.end_after)
            .field("scope", &self.scope)
            .field("cancel_word", &self.cancel_word)
            .field("collected", &self.collected.len())
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::Author;
    use chrono::Duration as TimeDelta;
    use pretty_assertions::assert_eq;

    fn trigger() -> Trigger {
        Trigger {
            author: UserId(7),
            channel_id: ChannelId(10),
            timestamp: Utc::now(),
        }
    }

    fn reply(trigger: &Trigger, author: u64, channel: u64, offset_ms: i64, content: &str) -> Arc<IncomingMessage> {
        Arc::new(IncomingMessage::new(
            1,
            channel,
            Author::new(author, "ana"),
            content,
            trigger.timestamp + TimeDelta::milliseconds(offset_ms),
        ))
    }

    fn numbers() -> MessageCollector {
        MessageCollector::new(Duration::from_secs(5))
            .filter(filters::is_number)
            .end_after(1)
    }

    #[test]
    fn test_is_number() {
        assert!(filters::is_number("42").is_ok());
        assert!(filters::is_number("-7").is_ok());
        assert!(filters::is_number("4.2").is_err());
        assert!(matches!(
            filters::is_number("abc"),
            Err(HeraldError::FilterRejected { ref filter, .. }) if filter == "is_number"
        ));
    }

    #[test]
    fn test_stale_then_fresh() {
        let trigger = trigger();
        let mut collector = numbers();

        assert_eq!(
            collector.offer(&trigger, reply(&trigger, 7, 10, -5, "hello")).unwrap(),
            Step::Ignored
        );
        assert_eq!(
            collector.offer(&trigger, reply(&trigger, 7, 10, 5, "42")).unwrap(),
            Step::Completed
        );
        assert_eq!(collector.state(), CollectorState::Completed);
        assert_eq!(collector.collected()[0].content, "42");
    }

    #[test]
    fn test_filter_failure_is_terminal() {
        let trigger = trigger();
        let mut collector = numbers();

        let err = collector
            .offer(&trigger, reply(&trigger, 7, 10, 5, "abc"))
            .unwrap_err();
        assert!(matches!(err, HeraldError::FilterRejected { .. }));
        assert_eq!(collector.state(), CollectorState::Failed);
        assert!(collector.collected().is_empty());
    }

    #[test]
    fn test_cancel_word_beats_filters() {
        let trigger = trigger();
        let mut collector = numbers();

        let err = collector
            .offer(&trigger, reply(&trigger, 7, 10, 5, "C"))
            .unwrap_err();
        assert!(matches!(err, HeraldError::CollectorCancelled));
        assert_eq!(collector.state(), CollectorState::Cancelled);
    }

    #[test]
    fn test_cancel_needs_same_author_and_fresh() {
        let trigger = trigger();
        let mut collector = MessageCollector::new(Duration::from_secs(5)).end_after(1);

        assert_eq!(
            collector.offer(&trigger, reply(&trigger, 7, 10, -5, "c")).unwrap(),
            Step::Ignored
        );
        assert_eq!(
            collector.offer(&trigger, reply(&trigger, 8, 10, 5, "c")).unwrap(),
            Step::Completed
        );
    }

    #[test]
    fn test_custom_cancel_word() {
        let trigger = trigger();
        let mut collector = MessageCollector::new(Duration::from_secs(5))
            .end_after(2)
            .cancel_word("Stop");

        assert_eq!(
            collector.offer(&trigger, reply(&trigger, 7, 10, 5, "c")).unwrap(),
            Step::Collected
        );
        assert!(collector
            .offer(&trigger, reply(&trigger, 7, 10, 6, "STOP"))
            .is_err());
    }

    #[test]
    fn test_scopes() {
        let trigger = trigger();
        let elsewhere = reply(&trigger, 7, 11, 5, "1");
        let stranger = reply(&trigger, 8, 10, 5, "2");

        let mut channel = MessageCollector::new(Duration::from_secs(5)).end_after(3);
        assert_eq!(channel.offer(&trigger, Arc::clone(&elsewhere)).unwrap(), Step::Ignored);
        assert_eq!(channel.offer(&trigger, Arc::clone(&stranger)).unwrap(), Step::Collected);

        let mut author = MessageCollector::new(Duration::from_secs(5))
            .end_after(3)
            .scope(CollectorScope::AuthorInChannel);
        assert_eq!(author.offer(&trigger, stranger).unwrap(), Step::Ignored);

        let mut global = MessageCollector::new(Duration::from_secs(5))
            .end_after(3)
            .scope(CollectorScope::Global);
        assert_eq!(global.offer(&trigger, elsewhere).unwrap(), Step::Collected);
    }

    #[test]
    fn test_unfiltered_open_ended_collects_nothing() {
        let trigger = trigger();
        let mut collector = MessageCollector::new(Duration::from_secs(5));

        assert_eq!(
            collector.offer(&trigger, reply(&trigger, 7, 10, 5, "hello")).unwrap(),
            Step::Ignored
        );
        assert_eq!(collector.state(), CollectorState::Awaiting);
        assert!(collector.collected().is_empty());

        let mut filtered = MessageCollector::new(Duration::from_secs(5)).filter(filters::is_number);
        assert_eq!(
            filtered.offer(&trigger, reply(&trigger, 7, 10, 5, "42")).unwrap(),
            Step::Collected
        );
    }

    #[test]
    fn test_end_after_accumulates() {
        let trigger = trigger();
        let mut collector = MessageCollector::new(Duration::from_secs(5)).end_after(3);

        for (i, content) in ["a", "b"].into_iter().enumerate() {
            let step = collector
                .offer(&trigger, reply(&trigger, 7, 10, i as i64 + 1, content))
                .unwrap();
            assert_eq!(step, Step::Collected);
        }
        assert_eq!(
            collector.offer(&trigger, reply(&trigger, 7, 10, 9, "z")).unwrap(),
            Step::Completed
        );
        assert_eq!(collector.collected().len(), 3);
    }

    #[test]
    fn test_timeout_outcomes() {
        let mut open_ended = MessageCollector::new(Duration::from_secs(1));
        assert!(open_ended.on_timeout().is_ok());
        assert_eq!(open_ended.state(), CollectorState::Completed);

        let mut bounded = MessageCollector::new(Duration::from_secs(1)).end_after(2);
        assert!(matches!(
            bounded.on_timeout(),
            Err(HeraldError::DeadlineExceeded {
                collected: 0,
                expected: 2,
                ..
            })
        ));
        assert_eq!(bounded.state(), CollectorState::TimedOut);
        assert!(bounded.state().is_terminal());
    }
}
