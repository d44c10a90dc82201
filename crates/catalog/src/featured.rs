//! Auto-rotating featured carousel.
//!
//! A featured strip shows one app of its window at a time and advances every
//! [`ROTATION_INTERVAL`]. A manual jump or a new window restarts the timer
//! from zero; a new window also rewinds to the first slide.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

/// Time between automatic slide changes.
pub const ROTATION_INTERVAL: Duration = Duration::from_millis(4000);

/// Slide position for a window of `len` items.
///
/// `generation` changes on every timer restart so a tick scheduled before the
/// restart can tell it is stale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Carousel {
    len: usize,
    index: usize,
    generation: u64,
}

impl Carousel {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            index: 0,
            generation: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    /// Move to the next slide, wrapping from the last back to the first.
    pub fn advance(&mut self) {
        if self.len == 0 {
            return;
        }
        self.index = if self.index + 1 >= self.len {
            0
        } else {
            self.index + 1
        };
    }

    /// Select a slide directly. Out-of-range indexes are ignored.
    pub fn jump(&mut self, index: usize) -> bool {
        if index >= self.len {
            return false;
        }
        self.index = index;
        true
    }

    /// Replace the window size and rewind to the first slide.
    pub fn reset(&mut self, len: usize) {
        self.len = len;
        self.index = 0;
    }

    fn bump(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }
}

/// A carousel over a window of app ids, driven by a tokio timer task.
///
/// Must be created inside a tokio runtime. The timer task is aborted when the
/// carousel is dropped.
pub struct FeaturedCarousel {
    window: Vec<String>,
    state: Arc<Mutex<Carousel>>,
    interval: Duration,
    timer: Option<JoinHandle<()>>,
}

impl FeaturedCarousel {
    /// Create a carousel with the default rotation interval.
    pub fn new(window: Vec<String>) -> Self {
        Self::with_interval(window, ROTATION_INTERVAL)
    }

    pub fn with_interval(window: Vec<String>, interval: Duration) -> Self {
        let state = Arc::new(Mutex::new(Carousel::new(window.len())));
        let mut carousel = Self {
            window,
            state,
            interval,
            timer: None,
        };
        carousel.restart_timer();
        carousel
    }

    /// The ids in the current window.
    pub fn window(&self) -> &[String] {
        &self.window
    }

    /// Index of the visible slide.
    pub fn current_index(&self) -> usize {
        self.state.lock().map(|c| c.index()).unwrap_or(0)
    }

    /// Id of the visible slide, or `None` for an empty window.
    pub fn current(&self) -> Option<&str> {
        self.window.get(self.current_index()).map(String::as_str)
    }

    /// Whether a rotation timer is active.
    pub fn is_running(&self) -> bool {
        self.timer.as_ref().map_or(false, |timer| !timer.is_finished())
    }

    /// Show slide `index` and restart the timer. Returns false if the index
    /// is out of range.
    pub fn jump_to(&mut self, index: usize) -> bool {
        let moved = match self.state.lock() {
            Ok(mut carousel) => carousel.jump(index),
            Err(_) => false,
        };
        if moved {
            self.restart_timer();
        }
        moved
    }

    /// Replace the window. A different window rewinds to the first slide and
    /// restarts the timer; an identical one changes nothing.
    pub fn set_window(&mut self, window: Vec<String>) {
        if window == self.window {
            return;
        }
        if let Ok(mut carousel) = self.state.lock() {
            carousel.reset(window.len());
        }
        self.window = window;
        self.restart_timer();
    }

    fn stop_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }

    fn restart_timer(&mut self) {
        self.stop_timer();

        let generation = match self.state.lock() {
            Ok(mut carousel) if !carousel.is_empty() => carousel.bump(),
            _ => return,
        };

        let state = Arc::clone(&self.state);
        let interval = self.interval;
        debug!(generation, "Starting featured rotation timer");

        self.timer = Some(tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                let Ok(mut carousel) = state.lock() else {
                    break;
                };
                if carousel.generation() != generation {
                    break;
                }
                carousel.advance();
            }
        }));
    }
}

impl Drop for FeaturedCarousel {
    fn drop(&mut self) {
        self.stop_timer();
    }
}

impl std::fmt::Debug for FeaturedCarousel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeaturedCarousel")
            .field("window", &self.window)
            .field("index", &self.current_index())
            .field("running", &self.is_running())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(prefix: &str) -> Vec<String> {
        (0..8).map(|i| format!("{}{}", prefix, i)).collect()
    }

    #[test]
    fn test_carousel_wraps() {
        let mut carousel = Carousel::new(3);
        carousel.advance();
        carousel.advance();
        assert_eq!(carousel.index(), 2);
        carousel.advance();
        assert_eq!(carousel.index(), 0);
        assert!(!carousel.jump(3));
        assert!(carousel.jump(1));
        carousel.reset(5);
        assert_eq!(carousel.index(), 0);
        assert_eq!(carousel.len(), 5);
    }

    #[test]
    fn test_empty_carousel_does_not_move() {
        let mut carousel = Carousel::new(0);
        carousel.advance();
        assert_eq!(carousel.index(), 0);
        assert!(!carousel.jump(0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_advances_every_interval() {
        let carousel = FeaturedCarousel::new(window("a"));
        assert_eq!(carousel.current(), Some("a0"));

        tokio::time::sleep(Duration::from_millis(3_950)).await;
        assert_eq!(carousel.current_index(), 0);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(carousel.current_index(), 1);
        assert_eq!(carousel.current(), Some("a1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wraps_last_to_first() {
        let mut carousel = FeaturedCarousel::new(window("a"));
        assert!(carousel.jump_to(7));
        assert_eq!(carousel.current_index(), 7);

        tokio::time::sleep(Duration::from_millis(4_050)).await;
        assert_eq!(carousel.current_index(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_change_resets_index_and_timer() {
        let mut carousel = FeaturedCarousel::new(window("a"));
        tokio::time::sleep(Duration::from_millis(4_050)).await;
        assert_eq!(carousel.current_index(), 1);

        tokio::time::sleep(Duration::from_millis(2_000)).await;
        carousel.set_window(window("b"));
        assert_eq!(carousel.current_index(), 0);
        assert_eq!(carousel.current(), Some("b0"));

        // The old timer would have fired 2s after the reset.
        tokio::time::sleep(Duration::from_millis(3_000)).await;
        assert_eq!(carousel.current_index(), 0);

        tokio::time::sleep(Duration::from_millis(1_050)).await;
        assert_eq!(carousel.current_index(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_window_keeps_position() {
        let mut carousel = FeaturedCarousel::new(window("a"));
        tokio::time::sleep(Duration::from_millis(4_050)).await;
        carousel.set_window(window("a"));
        assert_eq!(carousel.current_index(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_jump_restarts_timer() {
        let mut carousel = FeaturedCarousel::new(window("a"));
        tokio::time::sleep(Duration::from_millis(3_000)).await;
        assert!(carousel.jump_to(4));

        tokio::time::sleep(Duration::from_millis(3_000)).await;
        assert_eq!(carousel.current_index(), 4);

        tokio::time::sleep(Duration::from_millis(1_050)).await;
        assert_eq!(carousel.current_index(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_window_runs_no_timer() {
        let mut carousel = FeaturedCarousel::new(Vec::new());
        assert!(!carousel.is_running());
        assert_eq!(carousel.current(), None);
        assert!(!carousel.jump_to(0));

        carousel.set_window(window("a"));
        assert!(carousel.is_running());
    }
}
