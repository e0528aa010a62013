//! 3D particle scene viewer
//!
//! Run with: cargo run --features gui --bin particle-scene
//! Keys: Esc quits, p enlarges markers, o shrinks them.

use eframe::egui;
use particle_vis::app::{SceneApp, WINDOW_TITLE};
use particle_vis::{config, SubscriberClient};
use tracing::info;

fn main() -> eframe::Result {
    config::init_tracing();

    let endpoint = config::endpoint();
    info!(
        endpoint = %endpoint,
        env_set = std::env::var(config::ENDPOINT_ENV).is_ok(),
        "Starting scene viewer (Esc to quit)"
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size([1400.0, 900.0]),
        ..Default::default()
    };

    eframe::run_native(
        "particle-scene",
        options,
        Box::new(move |cc| Ok(Box::new(SceneApp::new(cc, SubscriberClient::connect(&endpoint))))),
    )?;

    info!("Scene viewer terminated");
    Ok(())
}
