//! Shared engine state, status snapshots, and target values.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use crate::util::sync::lock;
use crate::viewport::GeoPoint;

/// Lock-free f32 cell for the published interpolation value.
pub(crate) struct AtomicF32(AtomicU32);

impl AtomicF32 {
    pub(crate) fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    pub(crate) fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::SeqCst))
    }

    pub(crate) fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::SeqCst);
    }
}

/// Snapshot of the engine's lifecycle and per-kind animation flags.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineStatus {
    /// A worker thread is alive and has not been asked to stop.
    pub running: bool,
    /// Cooperative cancellation has been requested.
    pub stop_requested: bool,
    /// Eased progress of the current interpolation loop, in `[0, 1]`.
    pub interpolation: f32,
    /// A zoom interpolation loop is active.
    pub zooming: bool,
    /// A pan/move animation is active.
    pub moving: bool,
    /// A tilt interpolation loop is active.
    pub tilting: bool,
}

/// Target values of the current (or most recent) animation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CameraTargets {
    /// Target geographic center.
    pub center: GeoPoint,
    /// Target integer zoom level; 0 when targets are cleared.
    pub zoom: i32,
    /// Target fractional zoom part.
    pub zoom_fraction: f64,
}

/// State shared between the engine facade and its worker thread.
pub(crate) struct EngineShared {
    pub(crate) stop: AtomicBool,
    pub(crate) zooming: AtomicBool,
    pub(crate) moving: AtomicBool,
    pub(crate) tilting: AtomicBool,
    pub(crate) interpolation: AtomicF32,
    pub(crate) pending_rotation: Mutex<Option<f32>>,
    targets: Mutex<CameraTargets>,
}

impl EngineShared {
    pub(crate) fn new() -> Self {
        Self {
            stop: AtomicBool::new(false),
            zooming: AtomicBool::new(false),
            moving: AtomicBool::new(false),
            tilting: AtomicBool::new(false),
            interpolation: AtomicF32::new(0.0),
            pending_rotation: Mutex::new(None),
            targets: Mutex::new(CameraTargets::default()),
        }
    }

    pub(crate) fn set_targets(
        &self,
        zoom: i32,
        zoom_fraction: f64,
        center: GeoPoint,
    ) {
        *lock(&self.targets) = CameraTargets {
            center,
            zoom,
            zoom_fraction,
        };
    }

    /// Drop the zoom target, marking target values as stale.
    pub(crate) fn clear_targets(&self) {
        lock(&self.targets).zoom = 0;
    }

    pub(crate) fn targets(&self) -> CameraTargets {
        *lock(&self.targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atomic_f32_round_trip() {
        let cell = AtomicF32::new(0.0);
        cell.store(0.8);
        assert_eq!(cell.load(), 0.8);
        cell.store(-1.5);
        assert_eq!(cell.load(), -1.5);
    }

    #[test]
    fn test_targets_clear_drops_zoom_only() {
        let shared = EngineShared::new();
        shared.set_targets(12, 0.5, GeoPoint::new(1.0, 2.0));
        shared.clear_targets();
        let targets = shared.targets();
        assert_eq!(targets.zoom, 0);
        assert_eq!(targets.center, GeoPoint::new(1.0, 2.0));
    }
}
