//! Flyover zoom planning for long pans.
//!
//! Panning a large geographic distance at a fixed zoom can drag the
//! camera across an arbitrarily long on-screen path. The planner picks
//! an intermediate "flyover" zoom level at which the projected pixel
//! displacement between start and target fits a fixed budget, so the
//! engine can zoom out, cross at that level, and zoom back in.

use glam::Vec2;

use crate::viewport::{GeoPoint, Viewport};

/// A planned flyover level for a long pan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlyoverPlan {
    /// Zoom level at which the pan stays within the pixel budget.
    /// Equal to the current zoom when no zoom-out phase is needed.
    pub zoom: i32,
    /// Screen displacement from center to target at that zoom.
    pub displacement: Vec2,
}

/// Choose the flyover zoom for a pan from the viewport center to
/// `target`.
///
/// Starting at the current zoom, levels are probed one at a time
/// downward until the projected `|Δx| + |Δy|` displacement fits
/// `budget_px`. Returns `None` when the next probe would cross
/// `floor_zoom` — the pan is too far to animate and should be applied
/// as an instant jump.
#[must_use]
pub fn plan_flyover(
    viewport: &Viewport,
    target: GeoPoint,
    budget_px: f32,
    floor_zoom: i32,
) -> Option<FlyoverPlan> {
    let mut probe = *viewport;
    let mut displacement = probe.screen_offset(target);

    while displacement.x.abs() + displacement.y.abs() > budget_px {
        let next = probe.zoom() - 1;
        if next <= floor_zoom {
            log::debug!(
                "flyover planning abandoned at floor zoom {floor_zoom}"
            );
            return None;
        }
        probe.set_fractional_zoom(next, probe.zoom_fraction());
        displacement = probe.screen_offset(target);
    }

    Some(FlyoverPlan {
        zoom: probe.zoom(),
        displacement,
    })
}
