//! Diagnostics overlay: connection status, rates, and discard counts

use eframe::egui;

use crate::core::FeedStats;
use crate::sub_state::SubState;
use crate::theme::{colors, status_color};

/// Format a count with human-readable suffix (1234 → "1234", 50000 → "50.0k")
pub(crate) fn format_count(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 10_000 {
        format!("{:.1}k", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// Format a rate with precision that shrinks as the value grows
pub(crate) fn format_rate(r: f64) -> String {
    if r >= 100.0 {
        format!("{:.0}", r)
    } else if r >= 1.0 {
        format!("{:.1}", r)
    } else {
        format!("{:.2}", r)
    }
}

/// Everything the overlay shows
pub(crate) struct Diagnostics<'a> {
    pub state: SubState,
    pub endpoint: &'a str,
    pub frames_per_sec: f64,
    pub stats: &'a FeedStats,
    /// Payloads dropped by the subscriber queue
    pub dropped: u64,
    pub domain_size: Option<f64>,
}

pub(crate) fn draw_diagnostics(ctx: &egui::Context, diag: &Diagnostics<'_>) {
    let indicator = if diag.state.is_connected() { "●" } else { "✕" };
    let title = egui::RichText::new(format!("{} {}", indicator, diag.state.label()))
        .color(status_color(&diag.state));

    egui::Area::new(egui::Id::new("diagnostics_area"))
        .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-8.0, -8.0))
        .show(ctx, |ui| {
            egui::Frame::new()
                .fill(colors::BG_ELEVATED.gamma_multiply(0.9))
                .corner_radius(4.0)
                .inner_margin(8.0)
                .show(ui, |ui| {
                    ui.set_min_width(220.0);
                    egui::CollapsingHeader::new(title)
                        .default_open(false)
                        .show(ui, |ui| {
                            let muted = |text: String| egui::RichText::new(text).color(colors::TEXT_MUTED);

                            ui.label(muted(diag.endpoint.to_string()));
                            ui.label(
                                egui::RichText::new(format!(
                                    "{} frames/s",
                                    format_rate(diag.frames_per_sec)
                                ))
                                .color(colors::TEXT_SECONDARY),
                            );
                            if let Some(l) = diag.domain_size {
                                ui.label(muted(format!("L = {:.1}", l)));
                            }
                            ui.label(muted(format!(
                                "{} received / {} applied",
                                format_count(diag.stats.received),
                                format_count(diag.stats.applied),
                            )));

                            // Discards and queue drops highlighted when non-zero
                            let discarded = diag.stats.discarded_total();
                            let lost_color = if discarded + diag.dropped > 0 {
                                colors::STATUS_BAD
                            } else {
                                colors::TEXT_MUTED
                            };
                            ui.label(
                                egui::RichText::new(format!(
                                    "{} discarded, {} dropped",
                                    format_count(discarded),
                                    format_count(diag.dropped),
                                ))
                                .color(lost_color),
                            );
                            for (reason, count) in diag.stats.discards() {
                                ui.label(muted(format!("  {}: {}", reason, format_count(count))));
                            }
                        });
                });
        });
}
