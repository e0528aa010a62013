//! Receive → decode → apply, one step per tick
//!
//! Sessions own their frame source and all per-run state, so the GUI only
//! has to call `tick()` from its repaint loop.

use std::collections::VecDeque;
use tracing::trace;

use super::frame::decode_frame;
use super::histogram::{Accumulated, ProjectionHistograms};
use super::scene::SceneState;
use super::stats::FeedStats;

/// Discard label for frames whose L cannot bound the domain
pub const INVALID_DOMAIN: &str = "invalid_domain";

/// Anything that can hand out raw payloads without blocking
pub trait FrameSource {
    /// Next payload, or `None` if nothing is available right now
    fn poll(&mut self) -> Option<Vec<u8>>;
}

impl FrameSource for VecDeque<Vec<u8>> {
    fn poll(&mut self) -> Option<Vec<u8>> {
        self.pop_front()
    }
}

/// What a single tick did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing was available
    Idle,
    /// Session was stopped before the tick
    Stopped,
    /// A payload arrived but was dropped
    Discarded(&'static str),
    /// A frame was applied; `rebuilt` marks a (re)established domain
    Applied { particles: usize, rebuilt: bool },
}

impl TickOutcome {
    pub fn applied(&self) -> bool {
        matches!(self, TickOutcome::Applied { .. })
    }
}

/// 2D consumer state
pub struct HistogramSession<S> {
    source: S,
    pub histograms: ProjectionHistograms,
    pub stats: FeedStats,
}

impl<S: FrameSource> HistogramSession<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            histograms: ProjectionHistograms::default(),
            stats: FeedStats::default(),
        }
    }

    pub fn tick(&mut self) -> TickOutcome {
        let Some(payload) = self.source.poll() else {
            return TickOutcome::Idle;
        };
        self.stats.received += 1;

        let frame = match decode_frame(&payload) {
            Ok(frame) => frame,
            Err(e) => {
                trace!(error = %e, "Frame discarded");
                self.stats.record_discard(e.reason());
                return TickOutcome::Discarded(e.reason());
            }
        };

        match self.histograms.accumulate(&frame) {
            Accumulated::Binned {
                particles,
                established,
            } => {
                self.stats.record_applied(particles);
                TickOutcome::Applied {
                    particles,
                    rebuilt: established,
                }
            }
            Accumulated::InvalidDomain => {
                self.stats.record_discard(INVALID_DOMAIN);
                TickOutcome::Discarded(INVALID_DOMAIN)
            }
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

/// 3D consumer state
pub struct SceneSession<S> {
    source: S,
    pub scene: SceneState,
    pub stats: FeedStats,
    running: bool,
}

impl<S: FrameSource> SceneSession<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            scene: SceneState::default(),
            stats: FeedStats::default(),
            running: true,
        }
    }

    pub fn tick(&mut self) -> TickOutcome {
        if !self.running {
            return TickOutcome::Stopped;
        }
        let Some(payload) = self.source.poll() else {
            return TickOutcome::Idle;
        };
        self.stats.received += 1;

        let frame = match decode_frame(&payload) {
            Ok(frame) => frame,
            Err(e) => {
                trace!(error = %e, "Frame discarded");
                self.stats.record_discard(e.reason());
                return TickOutcome::Discarded(e.reason());
            }
        };
        if !frame.domain_size.is_finite() || frame.domain_size <= 0.0 {
            self.stats.record_discard(INVALID_DOMAIN);
            return TickOutcome::Discarded(INVALID_DOMAIN);
        }

        let update = self.scene.apply(&frame);
        self.stats.record_applied(update.markers);
        TickOutcome::Applied {
            particles: update.markers,
            rebuilt: update.rebuilt,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}
