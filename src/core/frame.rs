//! Frame decoder for the particle stream
//!
//! A frame is a flat buffer of little-endian f64 values:
//! `[L, x0, y0, z0, r0, x1, y1, z1, r1, ...]`.
//! Malformed buffers are reported as [`DecodeError`] so callers can count
//! and drop them; nothing here panics on bad input.

use thiserror::Error;
use tracing::trace;

/// Width of one encoded value in bytes
pub const VALUE_WIDTH: usize = std::mem::size_of::<f64>();

/// Values per particle record: x, y, z, radius
pub const RECORD_WIDTH: usize = 4;

/// One particle as carried on the wire
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub radius: f64,
}

impl Particle {
    pub fn position(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

/// A decoded snapshot: domain edge length plus all particles
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub domain_size: f64,
    pub particles: Vec<Particle>,
}

impl Frame {
    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }
}

/// Why a payload was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("payload of {len} bytes is not a whole number of f64 values")]
    Misaligned { len: usize },
    #[error("payload holds {values} values, need more than {min}", min = RECORD_WIDTH)]
    TooShort { values: usize },
    #[error("{values} particle values do not split into records of {width}", width = RECORD_WIDTH)]
    RaggedRecords { values: usize },
}

impl DecodeError {
    /// Stable label used for discard counters and logs
    pub fn reason(&self) -> &'static str {
        match self {
            DecodeError::Misaligned { .. } => "misaligned",
            DecodeError::TooShort { .. } => "too_short",
            DecodeError::RaggedRecords { .. } => "ragged",
        }
    }
}

/// Decode a raw payload into a [`Frame`].
pub fn decode_frame(bytes: &[u8]) -> Result<Frame, DecodeError> {
    if bytes.len() % VALUE_WIDTH != 0 {
        return Err(DecodeError::Misaligned { len: bytes.len() });
    }

    let values = bytes.len() / VALUE_WIDTH;
    if values <= RECORD_WIDTH {
        return Err(DecodeError::TooShort { values });
    }

    let mut decoded = bytes.chunks_exact(VALUE_WIDTH).map(|chunk| {
        let mut raw = [0u8; VALUE_WIDTH];
        raw.copy_from_slice(chunk);
        f64::from_le_bytes(raw)
    });

    // values > RECORD_WIDTH, so the first element exists
    let domain_size = decoded.next().unwrap_or_default();
    let rest: Vec<f64> = decoded.collect();
    if rest.len() % RECORD_WIDTH != 0 {
        return Err(DecodeError::RaggedRecords { values: rest.len() });
    }

    let particles: Vec<Particle> = rest
        .chunks_exact(RECORD_WIDTH)
        .map(|r| Particle {
            x: r[0],
            y: r[1],
            z: r[2],
            radius: r[3],
        })
        .collect();

    trace!(domain_size, particles = particles.len(), "Frame decoded");

    Ok(Frame {
        domain_size,
        particles,
    })
}

/// Encode values the way the publisher lays them out on the wire.
pub fn encode_values(values: &[f64]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_two_particles() {
        let bytes = encode_values(&[10.0, 1.0, 1.0, 1.0, 0.5, 9.0, 9.0, 9.0, 0.5]);
        let frame = decode_frame(&bytes).unwrap();

        assert_eq!(frame.domain_size, 10.0);
        assert_eq!(frame.particle_count(), 2);
        assert_eq!(frame.particles[0].position(), [1.0, 1.0, 1.0]);
        assert_eq!(frame.particles[1].radius, 0.5);
    }

    #[test]
    fn test_short_payloads_are_discarded() {
        for n in 0..=RECORD_WIDTH {
            let values: Vec<f64> = (0..n).map(|i| i as f64).collect();
            let result = decode_frame(&encode_values(&values));
            assert_eq!(result, Err(DecodeError::TooShort { values: n }), "n = {}", n);
        }
    }

    #[test]
    fn test_misaligned_payload() {
        let mut bytes = encode_values(&[10.0, 1.0, 1.0, 1.0, 0.5]);
        bytes.push(0);
        assert_eq!(
            decode_frame(&bytes),
            Err(DecodeError::Misaligned { len: 41 })
        );
    }

    #[test]
    fn test_ragged_records() {
        let bytes = encode_values(&[10.0, 1.0, 2.0, 3.0, 0.5, 4.0]);
        let err = decode_frame(&bytes).unwrap_err();
        assert_eq!(err, DecodeError::RaggedRecords { values: 5 });
        assert_eq!(err.reason(), "ragged");
    }

    #[test]
    fn test_record_count_matches_particles() {
        let n = 137;
        let mut values = vec![500.0];
        for i in 0..n {
            let v = i as f64;
            values.extend_from_slice(&[v, v + 0.25, v + 0.5, 1.0]);
        }
        let frame = decode_frame(&encode_values(&values)).unwrap();
        assert_eq!(frame.particle_count(), n);
        let last = frame.particles[n - 1];
        assert_eq!(last.x, (n - 1) as f64);
        assert_eq!(last.z, (n - 1) as f64 + 0.5);
    }
}
