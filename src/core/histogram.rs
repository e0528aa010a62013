//! Projection histograms accumulated across the whole run
//!
//! Three square grids (XY, XZ, YZ) are allocated when the first valid frame
//! fixes the domain size and are only ever added to afterwards.

use tracing::{debug, info, warn};

use super::frame::Frame;
use crate::config::{CLIP_MARGIN, HISTOGRAM_BINS};

/// Coordinate plane a histogram projects onto
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Plane {
    XY,
    XZ,
    YZ,
}

impl Plane {
    pub const ALL: &'static [Plane] = &[Plane::XY, Plane::XZ, Plane::YZ];

    /// Component indices (horizontal, vertical) into a position triple
    pub fn axes(self) -> (usize, usize) {
        match self {
            Plane::XY => (0, 1),
            Plane::XZ => (0, 2),
            Plane::YZ => (1, 2),
        }
    }

    pub fn axis_labels(self) -> (&'static str, &'static str) {
        match self {
            Plane::XY => ("X", "Y"),
            Plane::XZ => ("X", "Z"),
            Plane::YZ => ("Y", "Z"),
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Plane::XY => "XY plane",
            Plane::XZ => "XZ plane",
            Plane::YZ => "YZ plane",
        }
    }

    fn idx(self) -> usize {
        match self {
            Plane::XY => 0,
            Plane::XZ => 1,
            Plane::YZ => 2,
        }
    }
}

/// Square grid of bin counts, indexed `[horizontal][vertical]`
#[derive(Clone, Debug)]
pub struct Grid {
    bins: usize,
    counts: Vec<u64>,
}

impl Grid {
    pub fn new(bins: usize) -> Self {
        Self {
            bins,
            counts: vec![0; bins * bins],
        }
    }

    pub fn bins(&self) -> usize {
        self.bins
    }

    pub fn get(&self, ix: usize, iy: usize) -> u64 {
        self.counts[ix * self.bins + iy]
    }

    fn bump(&mut self, ix: usize, iy: usize) {
        self.counts[ix * self.bins + iy] += 1;
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn max(&self) -> u64 {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    pub fn min(&self) -> u64 {
        self.counts.iter().copied().min().unwrap_or(0)
    }
}

/// Clip a coordinate into `[margin, L - margin]`
pub fn clip(value: f64, domain_size: f64) -> f64 {
    value.max(CLIP_MARGIN).min(domain_size - CLIP_MARGIN)
}

/// Bin index over `[0, L]` with `bins` equal bins; the last bin is closed.
///
/// Returns `None` for values outside the range or NaN.
pub fn bin_index(value: f64, domain_size: f64, bins: usize) -> Option<usize> {
    if !(0.0..=domain_size).contains(&value) {
        return None;
    }
    let idx = (value / domain_size * bins as f64) as usize;
    Some(idx.min(bins - 1))
}

/// Outcome of feeding one frame to the accumulator
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Accumulated {
    /// Particles were binned; `established` is true for the frame that fixed L
    Binned { particles: usize, established: bool },
    /// L was never established because the frame's L cannot bound a grid
    InvalidDomain,
}

/// Three persistent projection histograms
pub struct ProjectionHistograms {
    bins: usize,
    domain_size: Option<f64>,
    grids: Option<[Grid; 3]>,
    frames: u64,
    particles: u64,
    /// Frames whose L differed from the locked one
    domain_mismatches: u64,
}

impl Default for ProjectionHistograms {
    fn default() -> Self {
        Self::new(HISTOGRAM_BINS)
    }
}

impl ProjectionHistograms {
    pub fn new(bins: usize) -> Self {
        Self {
            bins: bins.max(1),
            domain_size: None,
            grids: None,
            frames: 0,
            particles: 0,
            domain_mismatches: 0,
        }
    }

    /// Add one frame into the grids.
    ///
    /// The first usable frame fixes L for the lifetime of the accumulator;
    /// later frames are binned against that extent even if they report a
    /// different L.
    pub fn accumulate(&mut self, frame: &Frame) -> Accumulated {
        let mut established = false;
        let domain_size = match self.domain_size {
            Some(l) => {
                if frame.domain_size != l {
                    if self.domain_mismatches == 0 {
                        warn!(
                            locked = l,
                            reported = frame.domain_size,
                            "Domain size changed, keeping the first one"
                        );
                    }
                    self.domain_mismatches += 1;
                }
                l
            }
            None => {
                let l = frame.domain_size;
                if !l.is_finite() || l <= 2.0 * CLIP_MARGIN {
                    debug!(domain_size = l, "Frame cannot establish a domain size");
                    return Accumulated::InvalidDomain;
                }
                info!(domain_size = l, bins = self.bins, "Domain size established");
                self.domain_size = Some(l);
                self.grids = Some([Grid::new(self.bins), Grid::new(self.bins), Grid::new(self.bins)]);
                established = true;
                l
            }
        };

        let bins = self.bins;
        let Some(grids) = self.grids.as_mut() else {
            return Accumulated::InvalidDomain;
        };

        let mut binned = 0usize;
        for particle in &frame.particles {
            let pos = particle.position();
            if pos.iter().any(|v| v.is_nan()) {
                continue;
            }
            let clipped = pos.map(|v| clip(v, domain_size));
            for &plane in Plane::ALL {
                let (h, v) = plane.axes();
                if let (Some(ix), Some(iy)) = (
                    bin_index(clipped[h], domain_size, bins),
                    bin_index(clipped[v], domain_size, bins),
                ) {
                    grids[plane.idx()].bump(ix, iy);
                }
            }
            binned += 1;
        }

        self.frames += 1;
        self.particles += binned as u64;

        Accumulated::Binned {
            particles: binned,
            established,
        }
    }

    pub fn domain_size(&self) -> Option<f64> {
        self.domain_size
    }

    pub fn bins(&self) -> usize {
        self.bins
    }

    pub fn grid(&self, plane: Plane) -> Option<&Grid> {
        self.grids.as_ref().map(|g| &g[plane.idx()])
    }

    pub fn count(&self, plane: Plane, ix: usize, iy: usize) -> u64 {
        self.grid(plane).map_or(0, |g| g.get(ix, iy))
    }

    pub fn total(&self, plane: Plane) -> u64 {
        self.grid(plane).map_or(0, Grid::total)
    }

    pub fn max(&self, plane: Plane) -> u64 {
        self.grid(plane).map_or(0, Grid::max)
    }

    /// Frames accumulated since L was established
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Particles accumulated since L was established
    pub fn particles(&self) -> u64 {
        self.particles
    }

    pub fn domain_mismatches(&self) -> u64 {
        self.domain_mismatches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::frame::Particle;

    fn frame(l: f64, positions: &[[f64; 3]]) -> Frame {
        Frame {
            domain_size: l,
            particles: positions
                .iter()
                .map(|p| Particle {
                    x: p[0],
                    y: p[1],
                    z: p[2],
                    radius: 0.5,
                })
                .collect(),
        }
    }

    #[test]
    fn test_two_particle_example() {
        let mut hist = ProjectionHistograms::default();
        let result = hist.accumulate(&frame(10.0, &[[1.0, 1.0, 1.0], [9.0, 9.0, 9.0]]));

        assert_eq!(
            result,
            Accumulated::Binned {
                particles: 2,
                established: true
            }
        );
        assert_eq!(hist.domain_size(), Some(10.0));
        // 40 bins over [0, 10]: width 0.25
        assert_eq!(hist.count(Plane::XY, 4, 4), 1);
        assert_eq!(hist.count(Plane::XY, 36, 36), 1);
        assert_eq!(hist.total(Plane::XY), 2);
        assert_eq!(hist.total(Plane::XZ), 2);
        assert_eq!(hist.total(Plane::YZ), 2);
    }

    #[test]
    fn test_accumulation_is_additive() {
        let mut hist = ProjectionHistograms::default();
        let frames = [
            frame(10.0, &[[1.0, 2.0, 3.0], [5.0, 5.0, 5.0]]),
            frame(10.0, &[[1.0, 2.0, 3.0]]),
            frame(10.0, &[[1.1, 2.1, 8.0], [5.0, 5.0, 5.0], [5.0, 5.0, 5.0]]),
        ];
        for f in &frames {
            hist.accumulate(f);
        }

        // (1.0, 2.0) and (1.1, 2.1) both land in XY bin (4, 8)
        assert_eq!(hist.count(Plane::XY, 4, 8), 3);
        assert_eq!(hist.count(Plane::XY, 20, 20), 3);
        // XZ separates z = 3.0 (bin 12) from z = 8.0 (bin 32)
        assert_eq!(hist.count(Plane::XZ, 4, 12), 2);
        assert_eq!(hist.count(Plane::XZ, 4, 32), 1);
        // Peak bins: (1.0, 2.0) three times in XY, (5.0, 5.0) three times in XZ
        assert_eq!(hist.max(Plane::XY), 3);
        assert_eq!(hist.max(Plane::XZ), 3);
        assert_eq!(hist.frames(), 3);
        assert_eq!(hist.particles(), 6);
        for &plane in Plane::ALL {
            assert_eq!(hist.total(plane), 6);
        }
    }

    #[test]
    fn test_edges_are_clipped_into_range() {
        let mut hist = ProjectionHistograms::default();
        hist.accumulate(&frame(10.0, &[[0.0, 10.0, 10.0], [-3.0, 12.0, 0.0]]));

        assert_eq!(hist.count(Plane::XY, 0, 39), 2);
        assert_eq!(hist.count(Plane::YZ, 39, 39), 1);
        assert_eq!(hist.count(Plane::YZ, 39, 0), 1);
        assert_eq!(hist.total(Plane::XY), 2);
    }

    #[test]
    fn test_clip_bounds() {
        assert_eq!(clip(0.0, 10.0), 0.01);
        assert_eq!(clip(10.0, 10.0), 10.0 - 0.01);
        assert_eq!(clip(4.2, 10.0), 4.2);
    }

    #[test]
    fn test_bin_index_last_edge_is_closed() {
        assert_eq!(bin_index(10.0, 10.0, 40), Some(39));
        assert_eq!(bin_index(0.0, 10.0, 40), Some(0));
        assert_eq!(bin_index(10.01, 10.0, 40), None);
        assert_eq!(bin_index(f64::NAN, 10.0, 40), None);
    }

    #[test]
    fn test_first_domain_size_is_kept() {
        let mut hist = ProjectionHistograms::default();
        hist.accumulate(&frame(10.0, &[[5.0, 5.0, 5.0]]));
        let result = hist.accumulate(&frame(20.0, &[[15.0, 15.0, 15.0]]));

        assert_eq!(
            result,
            Accumulated::Binned {
                particles: 1,
                established: false
            }
        );
        assert_eq!(hist.domain_size(), Some(10.0));
        assert_eq!(hist.domain_mismatches(), 1);
        // 15.0 is clipped against the locked L = 10
        assert_eq!(hist.count(Plane::XY, 39, 39), 1);
    }

    #[test]
    fn test_invalid_domain_does_not_establish() {
        let mut hist = ProjectionHistograms::default();
        assert_eq!(
            hist.accumulate(&frame(0.0, &[[0.0, 0.0, 0.0]])),
            Accumulated::InvalidDomain
        );
        assert_eq!(
            hist.accumulate(&frame(f64::NAN, &[[0.0, 0.0, 0.0]])),
            Accumulated::InvalidDomain
        );
        assert!(hist.domain_size().is_none());
        assert!(hist.grid(Plane::XY).is_none());
        assert_eq!(hist.frames(), 0);
    }

    #[test]
    fn test_nan_particles_are_skipped() {
        let mut hist = ProjectionHistograms::default();
        let result = hist.accumulate(&frame(10.0, &[[f64::NAN, 1.0, 1.0], [2.0, 2.0, 2.0]]));
        assert_eq!(
            result,
            Accumulated::Binned {
                particles: 1,
                established: true
            }
        );
        assert_eq!(hist.total(Plane::XY), 1);
    }
}
