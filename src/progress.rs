// src/progress.rs
// =============================================================================
// Optional per-page progress notifications.
//
// The engine fires one CrawlEvent per page it actually tried to fetch
// (success or failure). Pages dropped before fetching (off-domain, already
// visited, disallowed) produce no event.
//
// Nobody has to listen: with no channel attached, or once the receiver is
// gone, events are simply discarded.
// =============================================================================

use serde::Serialize;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::error::Stage;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CrawlEvent {
    PageCrawled {
        seed: String,
        url: String,
        /// false when the page was too short to keep
        stored: bool,
    },
    PageFailed {
        seed: String,
        url: String,
        stage: Stage,
        reason: String,
    },
}

#[derive(Debug, Clone, Default)]
pub struct Progress {
    sender: Option<UnboundedSender<CrawlEvent>>,
}

impl Progress {
    // A notifier that drops every event
    pub fn disabled() -> Self {
        Self::default()
    }

    // A notifier plus the receiving end for the consumer
    pub fn channel() -> (Self, UnboundedReceiver<CrawlEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Progress { sender: Some(sender) }, receiver)
    }

    pub fn notify(&self, event: CrawlEvent) {
        if let Some(sender) = &self.sender {
            // a closed receiver just means nobody is watching anymore
            let _ = sender.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_events_reach_receiver() {
        let (progress, mut events) = Progress::channel();
        progress.notify(CrawlEvent::PageCrawled {
            seed: "https://a.com".to_string(),
            url: "https://a.com/x".to_string(),
            stored: true,
        });
        drop(progress);

        assert!(matches!(events.recv().await, Some(CrawlEvent::PageCrawled { stored: true, .. })));
        assert!(events.recv().await.is_none());
    }

    #[test]
    fn test_notify_without_listener_is_noop() {
        let (progress, events) = Progress::channel();
        drop(events);
        progress.notify(CrawlEvent::PageFailed {
            seed: "https://a.com".to_string(),
            url: "https://a.com/x".to_string(),
            stage: Stage::Fetch,
            reason: "timeout".to_string(),
        });
        Progress::disabled().notify(CrawlEvent::PageCrawled {
            seed: String::new(),
            url: String::new(),
            stored: false,
        });
    }
}
