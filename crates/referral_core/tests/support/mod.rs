#![allow(dead_code)]

pub mod strategies;

/// Relative float comparison for sums accumulated in different orders.
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}
