//! Projection histogram viewer
//!
//! Run with: cargo run --features gui --bin particle-histogram

use eframe::egui;
use particle_vis::app::HistogramApp;
use particle_vis::{config, SubscriberClient};
use tracing::info;

fn main() -> eframe::Result {
    config::init_tracing();

    let endpoint = config::endpoint();
    info!(
        endpoint = %endpoint,
        env_set = std::env::var(config::ENDPOINT_ENV).is_ok(),
        "Starting histogram viewer"
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Particle distribution histograms")
            .with_inner_size([1500.0, 540.0]),
        ..Default::default()
    };

    eframe::run_native(
        "particle-histogram",
        options,
        Box::new(move |cc| Ok(Box::new(HistogramApp::new(cc, SubscriberClient::connect(&endpoint))))),
    )?;

    // The app (and its subscriber) is dropped by the time run_native returns
    info!("Histogram viewer terminated");
    Ok(())
}
