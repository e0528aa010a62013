//! Headless monitor for the particle stream
//!
//! Run with: cargo run --features cli --bin particle-cli

use particle_vis::config::{self, RECV_TIMEOUT};
use particle_vis::core::{decode_frame, FeedStats, RateMeter};
use particle_vis::time::now_seconds;
use particle_vis::SubscriberClient;
use tracing::{info, trace};

/// Seconds between stats lines
const STATS_INTERVAL: f64 = 5.0;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    config::init_tracing();

    let endpoint = config::endpoint();
    info!(
        endpoint = %endpoint,
        env_set = std::env::var(config::ENDPOINT_ENV).is_ok(),
        "Subscribing to particle stream"
    );
    let client = SubscriberClient::connect(&endpoint);

    let mut stats = FeedStats::default();
    let mut frames = RateMeter::new(STATS_INTERVAL, now_seconds());
    let mut domain_size: Option<f64> = None;

    loop {
        if client.state().is_interrupted() {
            info!("Monitor stopped");
            break;
        }

        if let Some(payload) = client.recv_timeout(RECV_TIMEOUT) {
            stats.received += 1;
            match decode_frame(&payload) {
                Ok(frame) => {
                    if domain_size != Some(frame.domain_size) {
                        info!(domain_size = frame.domain_size, "Domain size");
                        domain_size = Some(frame.domain_size);
                    }
                    stats.record_applied(frame.particle_count());
                    frames.tick();
                }
                Err(e) => {
                    trace!(error = %e, "Frame discarded");
                    stats.record_discard(e.reason());
                }
            }
        }

        report(&client, &mut frames, &stats, domain_size);
    }

    client.close();
    Ok(())
}

/// Log a stats line once per interval
fn report(client: &SubscriberClient, frames: &mut RateMeter, stats: &FeedStats, domain_size: Option<f64>) {
    let Some(rate) = frames.poll(now_seconds()) else {
        return;
    };
    info!(
        state = client.state().label(),
        "frames/sec" = format!("{:.1}", rate),
        particles = stats.last_particles,
        received = stats.received,
        discarded = stats.discarded_total(),
        dropped = client.dropped(),
        domain_size = ?domain_size,
        "stats"
    );
    for (reason, count) in stats.discards() {
        trace!(reason, count, "discards");
    }
}
