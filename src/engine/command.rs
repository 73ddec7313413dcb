//! The engine's dispatchable request vocabulary.
//!
//! Every navigation intent — gesture handler, route follower, or
//! programmatic caller — can be expressed as a [`CameraCommand`] and
//! passed to [`CameraAnimator::execute`]. The engine never cares how a
//! command was triggered; the typed entry points and the command path
//! behave identically.

use glam::Vec2;

use super::requests::{FlyCallbacks, FlyToRequest, MoveRequest};
use super::CameraAnimator;

/// A discrete or parameterized camera operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraCommand {
    /// Animate to a target coordinate with optional zoom/rotation.
    MoveTo(MoveRequest),

    /// Long-distance pan with automatic flyover-zoom planning.
    FlyTo(FlyToRequest),

    /// Animate the continuous zoom.
    ZoomTo {
        /// Target integer zoom level.
        zoom: i32,
        /// Target fractional zoom part.
        fraction: f64,
        /// Whether viewport observers fire during interpolation.
        notify: bool,
    },

    /// Rotate to an absolute angle (pending catch-up when busy).
    RotateTo {
        /// Target rotation in degrees.
        degrees: f32,
    },

    /// Record a rotation target for opportunistic catch-up.
    PendRotation {
        /// Target rotation in degrees.
        degrees: f32,
    },

    /// Inertial fling released from a screen position.
    Fling {
        /// Release velocity in pixels over the fling window.
        velocity: Vec2,
        /// Release screen position.
        release: Vec2,
        /// Whether viewport observers fire during interpolation.
        notify: bool,
    },

    /// Animate the elevation/tilt angle.
    TiltTo {
        /// Target elevation in degrees (90 = straight down).
        degrees: f32,
    },

    /// Request cancellation without waiting.
    Stop,

    /// Cancel and join the worker.
    StopSync,
}

impl CameraAnimator {
    /// Execute a camera command.
    pub fn execute(&self, command: CameraCommand) {
        match command {
            CameraCommand::MoveTo(request) => self.move_to(request),
            CameraCommand::FlyTo(request) => {
                self.fly_to(request, FlyCallbacks::default());
            }
            CameraCommand::ZoomTo {
                zoom,
                fraction,
                notify,
            } => self.zoom_to(zoom, fraction, notify),
            CameraCommand::RotateTo { degrees } => self.rotate_to(degrees),
            CameraCommand::PendRotation { degrees } => {
                self.set_pending_rotation(degrees);
            }
            CameraCommand::Fling {
                velocity,
                release,
                notify,
            } => self.fling(velocity, release, notify),
            CameraCommand::TiltTo { degrees } => self.tilt_to(degrees),
            CameraCommand::Stop => self.stop(),
            CameraCommand::StopSync => self.stop_sync(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::super::tests::{test_rig, wait_idle};
    use super::*;
    use crate::viewport::{GeoPoint, ViewportHost};

    #[test]
    fn test_commands_reach_typed_entry_points() {
        let (viewport, engine) = test_rig();

        engine.execute(CameraCommand::ZoomTo {
            zoom: 8,
            fraction: 0.0,
            notify: false,
        });
        wait_idle(&engine, Duration::from_secs(5));
        assert_eq!(viewport.snapshot().zoom(), 8);

        engine.execute(CameraCommand::TiltTo { degrees: 60.0 });
        wait_idle(&engine, Duration::from_secs(5));
        assert_eq!(viewport.snapshot().elevation(), 60.0);

        engine.execute(CameraCommand::MoveTo(MoveRequest::to(
            GeoPoint::new(0.5, 0.5),
        )));
        wait_idle(&engine, Duration::from_secs(5));
        assert_eq!(viewport.snapshot().center().lat, 0.5);

        engine.execute(CameraCommand::StopSync);
        assert!(!engine.is_animating());
    }
}
