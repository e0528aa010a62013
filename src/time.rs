//! Elapsed time in seconds since first use

use std::sync::OnceLock;
use std::time::Instant;

pub fn now_seconds() -> f64 {
    static START: OnceLock<Instant> = OnceLock::new();
    START.get_or_init(Instant::now).elapsed().as_secs_f64()
}
