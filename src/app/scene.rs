//! 3D point-cloud viewer
//!
//! Projects the cube and markers on the CPU and paints them with the egui
//! painter. Drag orbits the camera, scroll zooms.

use std::time::Duration;

use eframe::egui;
use glam::Vec2;
use tracing::{debug, info};

use super::close_on_interrupt;
use super::diagnostics::{draw_diagnostics, Diagnostics};
use crate::config::{SCENE_TICK_HZ, STATUS_INTERVAL};
use crate::core::{RateMeter, SceneSession, SceneState, TickOutcome, TickSchedule};
use crate::subscriber::SubscriberClient;
use crate::theme::{colors, light_visuals};
use crate::time::now_seconds;

pub const WINDOW_TITLE: &str = "Particle simulation";

/// Degrees of orbit per dragged pixel
const ORBIT_SPEED: f32 = 0.4;
/// Zoom factor per scrolled point
const ZOOM_SPEED: f32 = 0.002;
const CUBE_STROKE_WIDTH: f32 = 2.0;

pub struct SceneApp {
    session: SceneSession<SubscriberClient>,
    schedule: TickSchedule,
    /// Scheduled ticks per second, shown in the window title
    fps: RateMeter,
}

impl SceneApp {
    pub fn new(cc: &eframe::CreationContext<'_>, client: SubscriberClient) -> Self {
        cc.egui_ctx.set_visuals(light_visuals());

        Self {
            session: SceneSession::new(client),
            schedule: TickSchedule::new(SCENE_TICK_HZ, now_seconds()),
            fps: RateMeter::new(STATUS_INTERVAL.as_secs_f64(), now_seconds()),
        }
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        let (escape, enlarge, shrink) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::Escape),
                i.key_pressed(egui::Key::P),
                i.key_pressed(egui::Key::O),
            )
        });

        if escape {
            info!("Escape pressed, closing viewer");
            self.session.stop();
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return;
        }
        if enlarge {
            self.session.scene.enlarge_markers();
            info!(scale = format!("{:.1}", self.session.scene.marker_scale()), "Marker size");
        }
        if shrink {
            self.session.scene.shrink_markers();
            info!(scale = format!("{:.1}", self.session.scene.marker_scale()), "Marker size");
        }
    }

    fn render_scene(&mut self, ui: &mut egui::Ui) {
        let available = ui.available_size();
        let (response, painter) = ui.allocate_painter(available, egui::Sense::drag());
        let rect = response.rect;

        let scene = &mut self.session.scene;
        if response.dragged() {
            let delta = response.drag_delta();
            scene.camera.rotate(-delta.x * ORBIT_SPEED, delta.y * ORBIT_SPEED);
        }
        if response.hovered() {
            let scroll = ui.input(|i| i.smooth_scroll_delta.y);
            if scroll != 0.0 {
                scene.camera.zoom((-scroll * ZOOM_SPEED).exp());
            }
        }

        paint_scene(&painter, rect, scene);
    }
}

/// Draw the cube and markers into `rect`
fn paint_scene(painter: &egui::Painter, rect: egui::Rect, scene: &SceneState) {
    let size = Vec2::new(rect.width(), rect.height());
    let camera = &scene.camera;
    let view_proj = camera.view_proj(size.x / size.y.max(1.0));
    let to_screen = |p: Vec2| rect.min + egui::vec2(p.x, p.y);

    if let Some(cube) = scene.cube() {
        let stroke = egui::Stroke::new(CUBE_STROKE_WIDTH, colors::CUBE_EDGE);
        for (a, b) in cube.segments() {
            if let (Some(pa), Some(pb)) = (
                camera.project_with(&view_proj, a, size),
                camera.project_with(&view_proj, b, size),
            ) {
                painter.line_segment([to_screen(pa.pos), to_screen(pb.pos)], stroke);
            }
        }
    }

    // Far markers first so near ones paint over them
    let mut projected: Vec<(egui::Pos2, f32, f32)> = scene
        .markers()
        .iter()
        .filter_map(|m| {
            camera
                .project_with(&view_proj, m.position, size)
                .map(|p| (to_screen(p.pos), p.depth, m.size))
        })
        .collect();
    projected.sort_by(|a, b| b.1.total_cmp(&a.1));

    let outline = egui::Stroke::new(0.5, colors::MARKER_FILL.gamma_multiply(0.6));
    for (pos, depth, marker_size) in projected {
        // Markers scale with zoom: nominal size at the orbit distance
        let radius = 0.5 * marker_size * camera.distance / depth;
        if rect.expand(radius).contains(pos) {
            painter.circle(pos, radius, colors::MARKER_FILL, outline);
        }
    }
}

impl eframe::App for SceneApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.session.is_running() && close_on_interrupt(ctx, self.session.source(), "scene") {
            self.session.stop();
        }
        self.handle_keys(ctx);

        // Input repaints only redraw; the feed advances on the fixed schedule
        let now = now_seconds();
        if self.schedule.due(now) {
            self.fps.tick();
            if let TickOutcome::Applied { particles, rebuilt: true } = self.session.tick() {
                debug!(
                    particles,
                    rebuilds = self.session.scene.rebuilds(),
                    "Scene rebuilt for new domain size"
                );
            }
        }

        if let Some(fps) = self.fps.poll(now) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(format!(
                "{} | FPS: {:.1} | Particles: {}",
                WINDOW_TITLE, fps, self.session.stats.last_particles
            )));
        }

        let client = self.session.source();
        draw_diagnostics(
            ctx,
            &Diagnostics {
                state: client.state(),
                endpoint: client.endpoint(),
                frames_per_sec: self.fps.rate(),
                stats: &self.session.stats,
                dropped: client.dropped(),
                domain_size: self.session.scene.domain_size(),
            },
        );

        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(colors::BG_PRIMARY))
            .show(ctx, |ui| self.render_scene(ui));

        if self.session.is_running() {
            ctx.request_repaint_after(Duration::from_secs_f64(self.schedule.remaining(now)));
        }
    }
}
