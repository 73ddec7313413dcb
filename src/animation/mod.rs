//! Interpolation curves and flyover-zoom planning.

pub mod easing;
pub mod plan;
