//! Runtime defaults shared by all consumers
//!
//! The endpoint can be overridden with `PARTICLE_VIS_ENDPOINT`; everything
//! else is fixed at compile time.

use std::time::Duration;

/// Default publisher endpoint
pub const DEFAULT_ENDPOINT: &str = "tcp://localhost:5555";

/// Environment variable overriding [`DEFAULT_ENDPOINT`]
pub const ENDPOINT_ENV: &str = "PARTICLE_VIS_ENDPOINT";

/// Upper bound for a blocking receive
pub const RECV_TIMEOUT: Duration = Duration::from_millis(50);

/// Payloads buffered between the socket thread and the UI before new ones are dropped
pub const RECV_QUEUE_DEPTH: usize = 1000;

/// Pause before rebuilding the socket after the publisher went away
pub const RECONNECT_DELAY: Duration = Duration::from_millis(250);

/// Bins per axis of every projection histogram
pub const HISTOGRAM_BINS: usize = 40;

/// Coordinates are clipped into `[CLIP_MARGIN, L - CLIP_MARGIN]` before binning
pub const CLIP_MARGIN: f64 = 0.01;

/// Histogram repaint delay after a frame was accumulated
pub const BUSY_REPAINT: Duration = Duration::from_millis(1);
/// Histogram repaint delay when nothing arrived
pub const IDLE_REPAINT: Duration = Duration::from_millis(50);

/// Scene tick rate
pub const SCENE_TICK_HZ: f64 = 60.0;

/// Initial marker scale factor (display units per radius unit)
pub const DEFAULT_MARKER_SCALE: f32 = 8.0;
/// Multiplicative step for the enlarge/shrink keys
pub const MARKER_SCALE_STEP: f32 = 1.3;
pub const MIN_MARKER_SIZE: f32 = 2.0;
pub const MAX_MARKER_SIZE: f32 = 40.0;

/// Camera distance as a multiple of L
pub const CAMERA_DISTANCE_FACTOR: f32 = 1.75;

/// Status line refresh period
pub const STATUS_INTERVAL: Duration = Duration::from_secs(1);

/// Resolve the subscriber endpoint, honouring [`ENDPOINT_ENV`]
pub fn endpoint() -> String {
    std::env::var(ENDPOINT_ENV).unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string())
}

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "info,particle_vis=debug";

/// Install the fmt subscriber used by all binaries
#[cfg(any(feature = "cli", feature = "gui"))]
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    fmt().with_env_filter(filter).with_target(true).init();
}
