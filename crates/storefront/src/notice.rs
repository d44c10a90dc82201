//! Transient user-facing notices.
//!
//! A notice stays visible for [`NOTICE_TTL`] and then clears itself. Showing
//! a new notice replaces the old one and gets its own full lifetime; the old
//! notice's timer never clears the new one.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

/// How long a notice stays visible.
pub const NOTICE_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.into(),
        }
    }

    pub fn failure(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Failure,
            text: text.into(),
        }
    }
}

#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    notice: Option<Notice>,
}

/// Holder for the currently visible notice.
///
/// Must be used inside a tokio runtime; the clear timer is aborted on drop.
pub struct Notices {
    slot: Arc<Mutex<Slot>>,
    ttl: Duration,
    timer: Option<JoinHandle<()>>,
}

impl Notices {
    pub fn new() -> Self {
        Self::with_ttl(NOTICE_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot::default())),
            ttl,
            timer: None,
        }
    }

    /// The visible notice, if it has not expired.
    pub fn current(&self) -> Option<Notice> {
        self.slot.lock().ok().and_then(|slot| slot.notice.clone())
    }

    /// Show `notice`, replacing any visible one.
    pub fn show(&mut self, notice: Notice) {
        let generation = match self.slot.lock() {
            Ok(mut slot) => {
                slot.generation += 1;
                slot.notice = Some(notice);
                slot.generation
            }
            Err(_) => return,
        };

        if let Some(timer) = self.timer.take() {
            timer.abort();
        }

        let slot = Arc::clone(&self.slot);
        let ttl = self.ttl;
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            if let Ok(mut slot) = slot.lock() {
                if slot.generation == generation {
                    slot.notice = None;
                }
            }
        }));
    }

    /// Clear the visible notice immediately.
    pub fn dismiss(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        if let Ok(mut slot) = self.slot.lock() {
            slot.generation += 1;
            slot.notice = None;
        }
    }
}

impl Default for Notices {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Notices {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl std::fmt::Debug for Notices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notices")
            .field("current", &self.current())
            .field("ttl", &self.ttl)
            .finish()
    }
}
