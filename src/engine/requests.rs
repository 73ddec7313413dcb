//! Animation request entry points.
//!
//! Requests are infallible: degenerate inputs are applied instantly or
//! snapped by policy. Every path that animates funnels through the
//! engine's single-worker primitive.

use std::sync::atomic::Ordering;
use std::time::Duration;

use glam::Vec2;

use super::CameraAnimator;
use crate::animation::plan::plan_flyover;
use crate::backend::{AnimatedChannel, AnimationSlot, TimingFunction};
use crate::util::angle::shortest_arc_degrees;
use crate::util::sync::lock;
use crate::viewport::projection::world31_from_geo;
use crate::viewport::{GeoPoint, ViewportHost};

/// Flyover planning abandons when the intermediate zoom lands this many
/// levels (or more) away from the start or end zoom.
const MAX_FLYOVER_ZOOM_SPAN: i32 = 3;

/// Completion/start notification invoked around an animation.
pub type AnimationCallback = Box<dyn FnOnce() + Send + 'static>;

/// Optional start/finish callbacks for a fly-to animation.
///
/// `on_start` runs on the calling thread before the worker launches;
/// `on_finish` runs after the animation has fully settled the viewport
/// (or immediately, when the request is applied instantly).
#[derive(Default)]
pub struct FlyCallbacks {
    /// Invoked when the request is accepted.
    pub on_start: Option<AnimationCallback>,
    /// Invoked after the viewport has settled on the target.
    pub on_finish: Option<AnimationCallback>,
}

/// A full move request: target coordinate with optional zoom, rotation,
/// and duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveRequest {
    /// Target geographic center.
    pub target: GeoPoint,
    /// Target integer zoom and fractional part, if zoom should change.
    pub zoom: Option<(i32, f64)>,
    /// Target rotation in degrees, if rotation should change.
    pub rotation: Option<f32>,
    /// Resolve rotation through the pending-rotation catch-up instead
    /// of a dedicated rotate tween.
    pub pending_rotation: bool,
    /// Requested duration; raised to the navigation floor.
    pub duration: Option<Duration>,
    /// Whether viewport observers fire during interpolation.
    pub notify: bool,
}

impl MoveRequest {
    /// Move to `target`, keeping zoom and rotation.
    #[must_use]
    pub fn to(target: GeoPoint) -> Self {
        Self {
            target,
            zoom: None,
            rotation: None,
            pending_rotation: false,
            duration: None,
            notify: true,
        }
    }

    /// Also tween to the given zoom.
    #[must_use]
    pub fn with_zoom(mut self, zoom: i32, fraction: f64) -> Self {
        self.zoom = Some((zoom, fraction));
        self
    }

    /// Also tween to the given rotation.
    #[must_use]
    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotation = Some(degrees);
        self
    }

    /// Let rotation catch up via the pending-rotation mechanism.
    #[must_use]
    pub fn with_pending_rotation(mut self) -> Self {
        self.pending_rotation = true;
        self
    }

    /// Request an explicit duration (raised to the navigation floor).
    #[must_use]
    pub fn over(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Suppress viewport-changed observers during interpolation.
    #[must_use]
    pub fn silent(mut self) -> Self {
        self.notify = false;
        self
    }
}

/// A long-distance pan to a target at an integer end zoom, with
/// automatic flyover-zoom planning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlyToRequest {
    /// Target geographic center.
    pub target: GeoPoint,
    /// Integer zoom level to end on.
    pub end_zoom: i32,
    /// Whether viewport observers fire during interpolation.
    pub notify: bool,
    /// Allow joining an in-flight fly-to that is nearly finished
    /// instead of restarting it.
    pub allow_join: bool,
}

impl FlyToRequest {
    /// Fly to `target`, ending at `end_zoom`.
    #[must_use]
    pub fn to(target: GeoPoint, end_zoom: i32) -> Self {
        Self {
            target,
            end_zoom,
            notify: true,
            allow_join: false,
        }
    }

    /// Allow joining a nearly finished in-flight animation.
    #[must_use]
    pub fn joining(mut self) -> Self {
        self.allow_join = true;
        self
    }

    /// Suppress viewport-changed observers during interpolation.
    #[must_use]
    pub fn silent(mut self) -> Self {
        self.notify = false;
        self
    }
}

impl CameraAnimator {
    /// Animate the viewport to a target coordinate, with optional zoom
    /// and rotation tweens.
    ///
    /// With a render backend attached, position/zoom/azimuth tweening
    /// is delegated to its channels (superseding navigation-slot
    /// animations already in flight, preserving their remaining
    /// duration) and the worker only pumps per-frame updates. Without
    /// one, the engine interpolates a pixel pan, zoom, and rotation
    /// itself.
    ///
    /// A target outside the representable visible extent is applied
    /// instantly with no interpolation frames.
    pub fn move_to(&self, request: MoveRequest) {
        self.stop_sync();

        let viewport = self.viewport().snapshot();
        let start_zoom = viewport.zoom();
        let start_fraction = viewport.zoom_fraction();
        let start_rotation = viewport.rotation();

        let (zoom, fraction) =
            request.zoom.unwrap_or((start_zoom, start_fraction));
        let rotation = request.rotation.unwrap_or(start_rotation);

        if !viewport.contains(request.target) {
            log::debug!(
                "move target ({:.5}, {:.5}) outside visible extent, applying instantly",
                request.target.lat,
                request.target.lon
            );
            self.viewport()
                .set_geo_center(request.target, request.notify);
            self.viewport()
                .set_fractional_zoom(zoom, fraction, request.notify);
            self.viewport().rotate_to(rotation);
            return;
        }

        let requested_ms = request
            .duration
            .map_or(0.0, |d| d.as_secs_f64() * 1000.0) as f32;
        let duration_ms = self
            .options()
            .scaled_ms(requested_ms.max(self.options().nav_duration_ms));

        let animate_zoom = request.zoom.is_some()
            && (zoom != start_zoom || start_fraction != 0.0);
        let animate_rotation =
            shortest_arc_degrees(start_rotation, rotation) != 0.0;

        let offset = viewport.screen_offset(request.target);

        if let Some(backend) = self.backend() {
            let target_anim = backend.current_animation(
                AnimationSlot::Navigation,
                AnimatedChannel::Target,
            );
            let zoom_anim = if animate_zoom {
                backend.current_animation(
                    AnimationSlot::Navigation,
                    AnimatedChannel::Zoom,
                )
            } else {
                None
            };

            backend.cancel_animation(
                AnimationSlot::UserInteraction,
                AnimatedChannel::Target,
            );
            if animate_zoom {
                backend.cancel_animation(
                    AnimationSlot::UserInteraction,
                    AnimatedChannel::Zoom,
                );
            }
            let azimuth_anim = backend.current_animation(
                AnimationSlot::Navigation,
                AnimatedChannel::Azimuth,
            );
            backend.cancel_animation(
                AnimationSlot::UserInteraction,
                AnimatedChannel::Azimuth,
            );

            if animate_rotation {
                let duration_s = azimuth_anim.map_or(
                    self.options().scaled_ms(self.options().azimuth_duration_ms)
                        / 1000.0,
                    |in_flight| {
                        backend.cancel_animation(
                            AnimationSlot::Navigation,
                            AnimatedChannel::Azimuth,
                        );
                        in_flight.remaining()
                    },
                );
                backend.animate_azimuth(
                    rotation,
                    duration_s,
                    TimingFunction::Linear,
                    AnimationSlot::Navigation,
                );
            }

            let start31 = world31_from_geo(viewport.center());
            let finish31 = world31_from_geo(request.target);
            if finish31 != start31 {
                if target_anim.is_some() {
                    backend.cancel_animation(
                        AnimationSlot::Navigation,
                        AnimatedChannel::Target,
                    );
                }
                backend.animate_target(
                    finish31,
                    duration_ms / 1000.0,
                    TimingFunction::Linear,
                    AnimationSlot::Navigation,
                );
            }

            if animate_zoom {
                let duration_s = zoom_anim.map_or(
                    self.options().scaled_ms(self.options().zoom_duration_ms)
                        / 1000.0,
                    |in_flight| {
                        backend.cancel_animation(
                            AnimationSlot::Navigation,
                            AnimatedChannel::Zoom,
                        );
                        in_flight.remaining()
                    },
                );
                backend.animate_zoom(
                    zoom as f32 + fraction as f32,
                    duration_s,
                    TimingFunction::Linear,
                    AnimationSlot::Navigation,
                );
            }
        }

        self.shared().set_targets(zoom, fraction, request.target);
        let driver = self.driver();
        let has_backend = self.backend().is_some();
        let notify = request.notify;
        let pending_rotation = request.pending_rotation;
        let target = request.target;
        let options = self.options;
        self.start_worker(move || {
            driver.shared.moving.store(true, Ordering::SeqCst);

            if has_backend {
                if animate_zoom {
                    driver.shared.zooming.store(true, Ordering::SeqCst);
                }
                driver.run_backend_frames(duration_ms);
                if animate_zoom {
                    driver.shared.zooming.store(false, Ordering::SeqCst);
                }
            } else {
                if animate_zoom {
                    driver.run_zoom(
                        start_zoom,
                        start_fraction,
                        zoom,
                        fraction,
                        options.scaled_ms(options.nav_duration_ms),
                        notify,
                    );
                }

                if pending_rotation {
                    driver.run_pending_rotation();
                } else if animate_rotation {
                    driver.run_rotate(
                        rotation,
                        options.scaled_ms(options.move_rotation_duration_ms),
                    );
                }

                driver.run_pixel_pan(offset, target, duration_ms, notify);
            }

            driver.shared.moving.store(false, Ordering::SeqCst);
        });
    }

    /// Fly to a target at an integer end zoom, zooming out through an
    /// automatically planned flyover level when the direct pan would
    /// exceed the on-screen displacement budget.
    ///
    /// The request is applied instantly (no tween) when the planner
    /// abandons at the floor zoom, when the planned level is too far
    /// from the start or end zoom, or when a previous animation is
    /// still in flight and cannot be joined.
    pub fn fly_to(&self, request: FlyToRequest, callbacks: FlyCallbacks) {
        let was_animating = self.is_animating();
        let join_progress = self.interpolation();
        self.stop_sync();

        if let Some(on_start) = callbacks.on_start {
            on_start();
        }

        let viewport = self.viewport().snapshot();
        let start_zoom = viewport.zoom();
        let start_fraction = viewport.zoom_fraction();

        let plan = plan_flyover(
            &viewport,
            request.target,
            self.options().pixel_displacement_budget,
            self.options().floor_zoom,
        )
        .filter(|plan| {
            (plan.zoom - start_zoom).abs() < MAX_FLYOVER_ZOOM_SPAN
                && (request.end_zoom - plan.zoom).abs()
                    <= MAX_FLYOVER_ZOOM_SPAN
        });

        let join = request.allow_join
            && join_progress >= self.options().join_threshold;

        let Some(plan) = plan.filter(|_| !was_animating || join) else {
            log::debug!(
                "fly-to applied instantly (plan abandoned or restart not joinable)"
            );
            self.viewport()
                .set_geo_center(request.target, request.notify);
            self.viewport().set_fractional_zoom(
                request.end_zoom,
                0.0,
                request.notify,
            );
            if let Some(on_finish) = callbacks.on_finish {
                on_finish();
            }
            return;
        };

        let normalized_length = (plan.displacement.x.abs()
            + plan.displacement.y.abs())
            / self.options().pixel_displacement_budget;
        let duration_ms = self.options().scaled_ms(
            (normalized_length * self.options().pan_duration_ms)
                .max(self.options().min_pan_duration_ms),
        );

        log::debug!(
            "fly-to z{start_zoom}->z{} via z{} over {duration_ms:.0}ms",
            request.end_zoom,
            plan.zoom
        );

        self.shared()
            .set_targets(request.end_zoom, 0.0, request.target);
        let driver = self.driver();
        let move_zoom = plan.zoom;
        let end_zoom = request.end_zoom;
        let target = request.target;
        let notify = request.notify;
        let options = self.options;
        let on_finish = callbacks.on_finish;
        self.start_worker(move || {
            driver.shared.moving.store(true, Ordering::SeqCst);

            if move_zoom != start_zoom {
                driver.run_zoom(
                    start_zoom,
                    start_fraction,
                    move_zoom,
                    start_fraction,
                    options.scaled_ms(options.flyover_zoom_duration_ms),
                    notify,
                );
            }

            if !driver.stopped() {
                let snapshot = driver.viewport.snapshot();
                if driver.backend.is_some() {
                    driver.run_world_pan(
                        world31_from_geo(snapshot.center()),
                        world31_from_geo(target),
                        target,
                        duration_ms,
                        notify,
                    );
                } else {
                    let offset = snapshot.screen_offset(target);
                    driver.run_pixel_pan(offset, target, duration_ms, notify);
                }
            }

            if !driver.stopped()
                && (move_zoom != end_zoom || start_fraction != 0.0)
            {
                driver.run_zoom(
                    move_zoom,
                    start_fraction,
                    end_zoom,
                    0.0,
                    options.scaled_ms(options.flyover_zoom_duration_ms),
                    notify,
                );
            }
            driver.viewport.set_fractional_zoom(end_zoom, 0.0, notify);

            driver.run_pending_rotation();
            if let Some(on_finish) = on_finish {
                on_finish();
            }
            driver.shared.moving.store(false, Ordering::SeqCst);
        });
    }

    /// Animate the continuous zoom to `zoom + fraction`.
    pub fn zoom_to(&self, zoom: i32, fraction: f64, notify: bool) {
        let duration_ms =
            self.options().scaled_ms(self.options().zoom_duration_ms);
        let driver = self.driver();
        self.start_worker(move || {
            let snapshot = driver.viewport.snapshot();
            driver.shared.set_targets(zoom, fraction, snapshot.center());
            driver.run_zoom(
                snapshot.zoom(),
                snapshot.zoom_fraction(),
                zoom,
                fraction,
                duration_ms,
                notify,
            );
            driver.run_pending_rotation();
        });
    }

    /// Rotate to the given angle.
    ///
    /// Idle engine: spawns a worker that converges via the
    /// pending-rotation catch-up. Animating engine: records the angle
    /// as the pending target for the in-flight animation to consume.
    pub fn rotate_to(&self, degrees: f32) {
        if self.is_animating() {
            *lock(&self.shared().pending_rotation) = Some(degrees);
            return;
        }
        self.shared().clear_targets();
        let driver = self.driver();
        self.start_worker(move || {
            *lock(&driver.shared.pending_rotation) = Some(degrees);
            driver.run_pending_rotation();
        });
    }

    /// Record a rotation target for opportunistic catch-up during or
    /// after the current animation, without starting a worker.
    pub fn set_pending_rotation(&self, degrees: f32) {
        *lock(&self.shared().pending_rotation) = Some(degrees);
    }

    /// Inertial fling from a release position with the given velocity
    /// (pixels over the full fling window, decayed along the
    /// decelerate curve).
    pub fn fling(&self, velocity: Vec2, release: Vec2, notify: bool) {
        self.shared().clear_targets();
        let duration_ms =
            self.options().scaled_ms(self.options().drag_duration_ms);
        let driver = self.driver();
        self.start_worker(move || {
            driver.run_drag(velocity, release, duration_ms, notify);
            driver.run_pending_rotation();
        });
    }

    /// Animate the elevation angle; duration grows with the angular
    /// delta so larger tilts take proportionally longer.
    pub fn tilt_to(&self, degrees: f32) {
        let start = self.viewport().snapshot().elevation();
        let duration_ms = self
            .options()
            .scaled_ms((degrees - start).abs() * self.options().tilt_ms_per_degree);
        let driver = self.driver();
        self.start_worker(move || {
            driver.shared.tilting.store(true, Ordering::SeqCst);
            driver.run_tilt(degrees, duration_ms);
            driver.run_pending_rotation();
            driver.shared.tilting.store(false, Ordering::SeqCst);
        });
    }
}
