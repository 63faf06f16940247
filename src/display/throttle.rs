//! Frame pacing for callers driving a [`Display`].
//!
//! The renderer itself draws on every call. A caller event loop owns a
//! `FrameClock` to hold the last rendered framebuffer and to avoid drawing
//! more often than once per interval.

use std::time::{Duration, Instant};

use tracing::trace;

use super::Display;
use crate::core::Framebuffer;

/// Default minimum time between frames (50 frames per second)
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Debug, Clone)]
pub struct FrameClock {
    interval: Duration,
    last_render: Option<Instant>,
    /// What the real terminal shows, once a first frame went out
    last_frame: Option<Framebuffer>,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_INTERVAL)
    }
}

impl FrameClock {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_render: None,
            last_frame: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// True once a first frame has been rendered
    pub fn is_initialized(&self) -> bool {
        self.last_frame.is_some()
    }

    /// The framebuffer the last frame brought the terminal to
    pub fn last_frame(&self) -> Option<&Framebuffer> {
        self.last_frame.as_ref()
    }

    /// Render `current` if the first frame is still due or the interval has
    /// elapsed since the last one. Returns `None` when it is too early.
    pub fn tick(
        &mut self,
        now: Instant,
        display: &Display,
        current: &Framebuffer,
    ) -> Option<Vec<u8>> {
        if !self.is_due(now) {
            return None;
        }
        Some(self.flush(now, display, current))
    }

    /// Time until the next frame may be rendered; zero when one is due
    pub fn wait_time(&self, now: Instant) -> Duration {
        match self.last_render {
            Some(at) => self
                .interval
                .saturating_sub(now.saturating_duration_since(at)),
            None => Duration::ZERO,
        }
    }

    /// Render `current` unconditionally
    pub fn flush(&mut self, now: Instant, display: &Display, current: &Framebuffer) -> Vec<u8> {
        let out = match &self.last_frame {
            Some(last) => display.new_frame(true, last, current),
            None => display.new_frame(false, current, current),
        };
        trace!("frame flushed: {} bytes", out.len());

        if let Some(last) = self.last_frame.as_mut() {
            if *last != *current {
                last.clone_from(current);
            }
        } else {
            self.last_frame = Some(current.clone());
        }
        self.last_render = Some(now);
        out
    }

    /// Forget the terminal contents so the next frame repaints everything
    pub fn invalidate(&mut self) {
        self.last_frame = None;
        self.last_render = None;
    }

    fn is_due(&self, now: Instant) -> bool {
        match self.last_render {
            Some(at) if self.last_frame.is_some() => {
                now.saturating_duration_since(at) >= self.interval
            }
            _ => true,
        }
    }
}
