//! 3D scene state: domain cube, markers and marker scale
//!
//! Unlike the histograms, nothing accumulates here. Each frame replaces the
//! whole marker set, and the cube is rebuilt whenever L changes.

use glam::Vec3;
use tracing::{debug, info};

use super::camera::TurntableCamera;
use super::frame::Frame;
use crate::config::{DEFAULT_MARKER_SCALE, MARKER_SCALE_STEP, MAX_MARKER_SIZE, MIN_MARKER_SIZE};

/// Vertices of the cube wireframe, consumed pairwise as segments
pub const CUBE_VERTEX_COUNT: usize = 24;

/// One rendered particle
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Marker {
    pub position: Vec3,
    /// Display diameter, already clamped
    pub size: f32,
}

/// Wireframe of the cube `[0, L]^3`: 12 edges as 24 vertices
#[derive(Clone, Debug, PartialEq)]
pub struct CubeWireframe {
    pub domain_size: f32,
    pub vertices: [Vec3; CUBE_VERTEX_COUNT],
}

impl CubeWireframe {
    pub fn new(l: f32) -> Self {
        let v = |x: f32, y: f32, z: f32| Vec3::new(x, y, z);
        #[rustfmt::skip]
        let vertices = [
            // bottom face
            v(0.0, 0.0, 0.0), v(l, 0.0, 0.0),
            v(l, 0.0, 0.0),   v(l, l, 0.0),
            v(l, l, 0.0),     v(0.0, l, 0.0),
            v(0.0, l, 0.0),   v(0.0, 0.0, 0.0),
            // top face
            v(0.0, 0.0, l),   v(l, 0.0, l),
            v(l, 0.0, l),     v(l, l, l),
            v(l, l, l),       v(0.0, l, l),
            v(0.0, l, l),     v(0.0, 0.0, l),
            // verticals
            v(0.0, 0.0, 0.0), v(0.0, 0.0, l),
            v(l, 0.0, 0.0),   v(l, 0.0, l),
            v(l, l, 0.0),     v(l, l, l),
            v(0.0, l, 0.0),   v(0.0, l, l),
        ];
        Self {
            domain_size: l,
            vertices,
        }
    }

    pub fn segments(&self) -> impl Iterator<Item = (Vec3, Vec3)> + '_ {
        self.vertices.chunks_exact(2).map(|pair| (pair[0], pair[1]))
    }
}

/// Marker diameter for a particle radius at the given scale
pub fn marker_size(radius: f64, scale: f32) -> f32 {
    let size = radius as f32 * scale;
    if size.is_nan() {
        return MIN_MARKER_SIZE;
    }
    size.clamp(MIN_MARKER_SIZE, MAX_MARKER_SIZE)
}

/// Result of applying one frame
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SceneUpdate {
    pub markers: usize,
    /// Cube and camera were rebuilt because L was unset or changed
    pub rebuilt: bool,
}

/// Everything the 3D view draws
pub struct SceneState {
    domain_size: Option<f64>,
    cube: Option<CubeWireframe>,
    markers: Vec<Marker>,
    /// Radii of the current markers, kept so rescaling applies immediately
    radii: Vec<f64>,
    marker_scale: f32,
    pub camera: TurntableCamera,
    rebuilds: u64,
}

impl Default for SceneState {
    fn default() -> Self {
        Self {
            domain_size: None,
            cube: None,
            markers: Vec::new(),
            radii: Vec::new(),
            marker_scale: DEFAULT_MARKER_SCALE,
            camera: TurntableCamera::default(),
            rebuilds: 0,
        }
    }
}

impl SceneState {
    /// Replace the scene contents with `frame`.
    pub fn apply(&mut self, frame: &Frame) -> SceneUpdate {
        let rebuilt = self.domain_size != Some(frame.domain_size);
        if rebuilt {
            let l = frame.domain_size as f32;
            self.cube = Some(CubeWireframe::new(l));
            self.camera.frame_domain(l);
            self.domain_size = Some(frame.domain_size);
            self.rebuilds += 1;
            info!(domain_size = frame.domain_size, "Scene geometry rebuilt");
        }

        self.radii.clear();
        self.radii.extend(frame.particles.iter().map(|p| p.radius));
        self.markers.clear();
        self.markers.extend(frame.particles.iter().map(|p| Marker {
            position: Vec3::new(p.x as f32, p.y as f32, p.z as f32),
            size: marker_size(p.radius, self.marker_scale),
        }));

        SceneUpdate {
            markers: self.markers.len(),
            rebuilt,
        }
    }

    pub fn enlarge_markers(&mut self) {
        self.set_marker_scale(self.marker_scale * MARKER_SCALE_STEP);
    }

    pub fn shrink_markers(&mut self) {
        self.set_marker_scale(self.marker_scale / MARKER_SCALE_STEP);
    }

    fn set_marker_scale(&mut self, scale: f32) {
        self.marker_scale = scale;
        for (marker, &radius) in self.markers.iter_mut().zip(&self.radii) {
            marker.size = marker_size(radius, scale);
        }
        debug!(scale = format!("{:.1}", scale), "Marker scale changed");
    }

    pub fn marker_scale(&self) -> f32 {
        self.marker_scale
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn cube(&self) -> Option<&CubeWireframe> {
        self.cube.as_ref()
    }

    pub fn domain_size(&self) -> Option<f64> {
        self.domain_size
    }

    /// Number of times the cube was (re)built
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }
}
