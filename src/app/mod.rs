//! egui viewers for the particle stream
//!
//! Both viewers poll the subscriber from their repaint loop; no work
//! happens between repaints.

mod diagnostics;
mod histogram;
mod scene;

use eframe::egui;
use tracing::info;

use crate::subscriber::SubscriberClient;

pub use histogram::HistogramApp;
pub use scene::{SceneApp, WINDOW_TITLE};

/// Close the viewport if the subscriber saw Ctrl-C.
///
/// Returns true when a close was requested.
fn close_on_interrupt(ctx: &egui::Context, client: &SubscriberClient, viewer: &str) -> bool {
    if client.state().is_interrupted() {
        info!(viewer, "Interrupted, closing viewer");
        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        return true;
    }
    false
}
