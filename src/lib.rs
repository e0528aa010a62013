//! Particle stream viewers
//!
//! Subscribes to a simulation publisher and displays:
//! - Projection histograms (XY, XZ, YZ) accumulated over the run
//! - A 3D scene of the latest snapshot inside the domain cube

pub mod config;
pub mod core;
pub mod sub_state;
pub mod subscriber;
pub mod time;

#[cfg(feature = "gui")]
pub mod app;
#[cfg(feature = "gui")]
pub mod theme;

pub use subscriber::SubscriberClient;
