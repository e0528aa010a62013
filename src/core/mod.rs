//! Platform-agnostic core - shared between the GUI viewers and the CLI

pub mod camera;
pub mod colormap;
pub mod frame;
pub mod histogram;
pub mod scene;
pub mod session;
pub mod stats;

pub use camera::{Projected, TurntableCamera};
pub use frame::{decode_frame, DecodeError, Frame, Particle};
pub use histogram::{Plane, ProjectionHistograms};
pub use scene::{CubeWireframe, Marker, SceneState};
pub use session::{FrameSource, HistogramSession, SceneSession, TickOutcome};
pub use stats::{FeedStats, RateMeter, TickSchedule};
