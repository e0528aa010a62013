//! Projection histogram viewer: three image panels (XY, XZ, YZ)

use eframe::egui;
use tracing::{info, trace};

use super::close_on_interrupt;
use super::diagnostics::{draw_diagnostics, Diagnostics};
use crate::config::{BUSY_REPAINT, IDLE_REPAINT, STATUS_INTERVAL};
use crate::core::colormap::grid_pixels;
use crate::core::{HistogramSession, Plane, RateMeter, TickOutcome};
use crate::subscriber::SubscriberClient;
use crate::theme::{colors, light_visuals};
use crate::time::now_seconds;

/// Cumulative density viewer
pub struct HistogramApp {
    session: HistogramSession<SubscriberClient>,
    /// One texture per plane, created once L is known
    textures: Option<[egui::TextureHandle; 3]>,
    /// Grids changed since the textures were last uploaded
    dirty: bool,
    frame_rate: RateMeter,
    closing: bool,
}

impl HistogramApp {
    pub fn new(cc: &eframe::CreationContext<'_>, client: SubscriberClient) -> Self {
        cc.egui_ctx.set_visuals(light_visuals());

        Self {
            session: HistogramSession::new(client),
            textures: None,
            dirty: false,
            frame_rate: RateMeter::new(STATUS_INTERVAL.as_secs_f64(), now_seconds()),
            closing: false,
        }
    }

    fn plane_image(&self, plane: Plane) -> Option<egui::ColorImage> {
        let grid = self.session.histograms.grid(plane)?;
        let n = grid.bins();
        Some(egui::ColorImage::from_rgba_unmultiplied(
            [n, n],
            &grid_pixels(grid),
        ))
    }

    /// Upload the grids as textures, creating them on first use
    fn refresh_textures(&mut self, ctx: &egui::Context) {
        let options = egui::TextureOptions::NEAREST;
        let images: Vec<egui::ColorImage> = Plane::ALL
            .iter()
            .filter_map(|&plane| self.plane_image(plane))
            .collect();
        let Ok(images) = <[egui::ColorImage; 3]>::try_from(images) else {
            return;
        };

        match self.textures.as_mut() {
            Some(textures) => {
                for (texture, image) in textures.iter_mut().zip(images) {
                    texture.set(image, options);
                }
            }
            None => {
                let [xy, xz, yz] = images;
                self.textures = Some([
                    ctx.load_texture("hist_xy", xy, options),
                    ctx.load_texture("hist_xz", xz, options),
                    ctx.load_texture("hist_yz", yz, options),
                ]);
            }
        }
        self.dirty = false;
    }

    fn render_header(&self, ui: &mut egui::Ui) {
        let hist = &self.session.histograms;
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("Particle distribution").color(colors::TEXT_PRIMARY));

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(
                    egui::RichText::new(format!("{} particles", hist.particles()))
                        .color(colors::TEXT_MUTED),
                );
                ui.label(egui::RichText::new("/").color(colors::TEXT_MUTED));
                ui.label(
                    egui::RichText::new(format!("{} frames", hist.frames()))
                        .color(colors::TEXT_MUTED),
                );
                if let Some(l) = hist.domain_size() {
                    ui.label(egui::RichText::new("/").color(colors::TEXT_MUTED));
                    ui.label(
                        egui::RichText::new(format!("L = {:.1}", l)).color(colors::TEXT_MUTED),
                    );
                }
            });
        });
    }

    fn render_panel(&self, ui: &mut egui::Ui, plane: Plane, texture: &egui::TextureHandle, l: f64) {
        use egui_plot::{Plot, PlotImage, PlotPoint};

        let (x_label, y_label) = plane.axis_labels();
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new(plane.title()).color(colors::TEXT_SECONDARY));
            ui.label(
                egui::RichText::new(format!("peak {}", self.session.histograms.max(plane)))
                    .color(colors::TEXT_MUTED),
            );
        });

        Plot::new(plane.title())
            .data_aspect(1.0)
            .show_grid(false)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .include_x(0.0)
            .include_x(l)
            .include_y(0.0)
            .include_y(l)
            .x_axis_label(x_label)
            .y_axis_label(y_label)
            .label_formatter(move |_name, value| {
                format!("{}={:.1} {}={:.1}", x_label, value.x, y_label, value.y)
            })
            .show(ui, |plot_ui| {
                // Image spans [0, L] x [0, L]
                plot_ui.image(PlotImage::new(
                    texture.id(),
                    PlotPoint::new(l * 0.5, l * 0.5),
                    egui::vec2(l as f32, l as f32),
                ));
            });
    }
}

impl eframe::App for HistogramApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.closing && close_on_interrupt(ctx, self.session.source(), "histogram") {
            self.closing = true;
        }

        let outcome = self.session.tick();
        if let TickOutcome::Applied { particles, rebuilt } = outcome {
            if rebuilt {
                info!(
                    domain_size = ?self.session.histograms.domain_size(),
                    "Histogram panels created"
                );
            }
            trace!(particles, "Frame accumulated");
            self.frame_rate.tick();
            self.dirty = true;
        }
        self.frame_rate.poll(now_seconds());

        if self.dirty {
            self.refresh_textures(ctx);
        }

        egui::TopBottomPanel::top("header")
            .frame(egui::Frame::new().fill(colors::BG_PRIMARY).inner_margin(4.0))
            .show(ctx, |ui| self.render_header(ui));

        let client = self.session.source();
        draw_diagnostics(
            ctx,
            &Diagnostics {
                state: client.state(),
                endpoint: client.endpoint(),
                frames_per_sec: self.frame_rate.rate(),
                stats: &self.session.stats,
                dropped: client.dropped(),
                domain_size: self.session.histograms.domain_size(),
            },
        );

        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(colors::BG_PRIMARY).inner_margin(8.0))
            .show(ctx, |ui| {
                let (Some(textures), Some(l)) =
                    (self.textures.as_ref(), self.session.histograms.domain_size())
                else {
                    ui.centered_and_justified(|ui| {
                        ui.label(
                            egui::RichText::new("Waiting for data...").color(colors::TEXT_MUTED),
                        );
                    });
                    return;
                };

                ui.columns(3, |columns| {
                    for ((column, &plane), texture) in
                        columns.iter_mut().zip(Plane::ALL).zip(textures.iter())
                    {
                        self.render_panel(column, plane, texture, l);
                    }
                });
            });

        // Poll again soon after data, back off when idle
        let delay = if outcome.applied() {
            BUSY_REPAINT
        } else {
            IDLE_REPAINT
        };
        ctx.request_repaint_after(delay);
    }
}
