//! Frame-paced interpolation loops executed on the worker thread.
//!
//! Every loop follows the same contract: poll the stop flag once per
//! frame, sleep the pacing interval between frames, and finish with an
//! exact-target write so wall-clock jitter can never leave the viewport
//! short of (or past) the requested value.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

use glam::{IVec2, Vec2};

use super::status::EngineShared;
use crate::animation::easing::EasingFunction;
use crate::backend::RenderBackend;
use crate::options::AnimationOptions;
use crate::util::angle::shortest_arc_degrees;
use crate::util::sync::lock;
use crate::viewport::{GeoPoint, ViewportHost};

/// Angular differences below this snap directly instead of animating.
const ROTATION_SNAP_THRESHOLD: f32 = 1.0;

/// Fraction of the remaining angle applied per pending-rotation frame.
const PENDING_ROTATION_DECAY: f32 = 5.0;

/// Normalized elapsed time since `started`; `> 1` once `duration_ms`
/// has passed. Non-positive durations report completion immediately.
fn normalized_since(started: Instant, duration_ms: f64) -> f64 {
    if duration_ms <= 0.0 {
        return f64::INFINITY;
    }
    started.elapsed().as_secs_f64() * 1000.0 / duration_ms
}

/// Per-animation bundle of everything a worker loop touches.
///
/// Cheap to clone into the worker closure: shared state and the
/// viewport/backend seams are all behind `Arc`s.
#[derive(Clone)]
pub(crate) struct AnimationDriver {
    pub(crate) shared: Arc<EngineShared>,
    pub(crate) viewport: Arc<dyn ViewportHost>,
    pub(crate) backend: Option<Arc<dyn RenderBackend>>,
    pub(crate) options: AnimationOptions,
}

impl AnimationDriver {
    pub(crate) fn stopped(&self) -> bool {
        self.shared.stop.load(Ordering::SeqCst)
    }

    fn sleep_frame(&self) {
        std::thread::sleep(self.options.frame_interval());
    }

    fn set_interpolation(&self, value: f32) {
        self.shared.interpolation.store(value);
    }

    fn reset_interpolation(&self) {
        self.shared.interpolation.store(0.0);
    }

    /// Pump the backend's timelines until `duration_ms` elapses.
    ///
    /// Backend-driven values are authoritative: the worker only feeds
    /// per-frame deltas and waits out the duration.
    pub(crate) fn run_backend_frames(&self, duration_ms: f32) {
        let Some(backend) = &self.backend else {
            return;
        };
        if !self.stopped() {
            backend.resume();
        }
        let started = Instant::now();
        let mut previous = started;
        while !self.stopped() {
            let now = Instant::now();
            backend.update(now.duration_since(previous).as_secs_f32());
            previous = now;

            if normalized_since(started, f64::from(duration_ms)) > 1.0 {
                break;
            }
            self.sleep_frame();
        }
    }

    /// Linear zoom tween over the combined continuous zoom value.
    ///
    /// `base_duration_ms` is scaled by the zoom distance, so a two-level
    /// change takes twice as long as a one-level change. The fractional
    /// part is re-bucketed every frame around a half-offset integer base
    /// so it never appears to jump across a level boundary, and the loop
    /// always ends on the exact target — even when cancelled.
    pub(crate) fn run_zoom(
        &self,
        from_zoom: i32,
        from_fraction: f64,
        to_zoom: i32,
        to_fraction: f64,
        base_duration_ms: f32,
        notify: bool,
    ) {
        self.shared.zooming.store(true, Ordering::SeqCst);

        // Fraction bucket: -1 for (-1, 0], 0 for (-0.5, 0.5], 1 for (0, 1]
        let bucket = (to_fraction * 2.0) as i32;
        let begin = f64::from(from_zoom) + from_fraction;
        let end = f64::from(to_zoom) + to_fraction;
        let duration_ms = f64::from(base_duration_ms) * (end - begin).abs();

        let started = Instant::now();
        while !self.stopped() {
            let t = normalized_since(started, duration_ms);
            if t > 1.0 {
                break;
            }
            self.set_interpolation(t as f32);
            let current = t.mul_add(end - begin, begin);
            let base = (current - 0.5 * f64::from(bucket)).round() as i32;
            self.viewport.set_fractional_zoom(
                base,
                current - f64::from(base),
                notify,
            );
            self.sleep_frame();
        }
        self.viewport.set_fractional_zoom(to_zoom, to_fraction, notify);

        self.reset_interpolation();
        self.shared.zooming.store(false, Ordering::SeqCst);
    }

    /// Eased rotation along the shortest arc.
    pub(crate) fn run_rotate(&self, target: f32, duration_ms: f32) {
        let easing = EasingFunction::AccelerateDecelerate;
        let start = self.viewport.snapshot().rotation();
        let diff = shortest_arc_degrees(start, target);
        if diff.abs() <= ROTATION_SNAP_THRESHOLD {
            self.viewport.rotate_to(target);
            return;
        }

        let started = Instant::now();
        while !self.stopped() {
            let t = normalized_since(started, f64::from(duration_ms));
            if t > 1.0 {
                self.viewport.rotate_to(target);
                break;
            }
            let eased = easing.evaluate(t as f32);
            self.set_interpolation(eased);
            self.viewport.rotate_to(diff.mul_add(eased, start));
            self.sleep_frame();
        }
        self.reset_interpolation();
    }

    /// Eased pan expressed as absolute pixel offsets from the start
    /// position, applied as incremental drags.
    pub(crate) fn run_pixel_pan(
        &self,
        offset: Vec2,
        target: GeoPoint,
        duration_ms: f32,
        notify: bool,
    ) {
        let easing = EasingFunction::AccelerateDecelerate;
        let mut current = Vec2::ZERO;

        let started = Instant::now();
        while !self.stopped() {
            let t = normalized_since(started, f64::from(duration_ms));
            if t > 1.0 {
                break;
            }
            let eased = easing.evaluate(t as f32);
            self.set_interpolation(eased);
            let next = offset * eased;
            self.viewport.drag_by(current, next, notify);
            current = next;
            self.sleep_frame();
        }
        self.reset_interpolation();
        if !self.stopped() {
            self.viewport.set_geo_center(target, notify);
        }
    }

    /// Linear pan through the backend's fixed-point world coordinates.
    pub(crate) fn run_world_pan(
        &self,
        start: IVec2,
        end: IVec2,
        target: GeoPoint,
        duration_ms: f32,
        notify: bool,
    ) {
        // i64 math: opposite world edges differ by more than i32::MAX
        let move_x = i64::from(end.x) - i64::from(start.x);
        let move_y = i64::from(end.y) - i64::from(start.y);

        let started = Instant::now();
        while !self.stopped() {
            let t = normalized_since(started, f64::from(duration_ms));
            if t > 1.0 {
                break;
            }
            self.set_interpolation(t as f32);
            let x = i64::from(start.x) + (t * move_x as f64) as i64;
            let y = i64::from(start.y) + (t * move_y as f64) as i64;
            self.viewport
                .set_world_center(IVec2::new(x as i32, y as i32), notify);
            self.sleep_frame();
        }
        self.reset_interpolation();
        if !self.stopped() {
            self.viewport.set_geo_center(target, notify);
        }
    }

    /// Inertial fling: velocity decays along the decelerate curve, and
    /// each frame applies the incremental pixel delta as a relative
    /// drag (drag is a relative-translation API, so no absolute offset
    /// can be recomputed from the start).
    pub(crate) fn run_drag(
        &self,
        velocity: Vec2,
        release: Vec2,
        duration_ms: f32,
        notify: bool,
    ) {
        let easing = EasingFunction::Decelerate;
        let mut current = release;
        let mut previous_t = 0.0f32;

        let started = Instant::now();
        while !self.stopped() {
            let t = normalized_since(started, f64::from(duration_ms)) as f32;
            if t >= 1.0 {
                break;
            }
            let eased = easing.evaluate(t);
            self.set_interpolation(eased);

            let next = current + velocity * (1.0 - eased) * (t - previous_t);
            self.viewport.drag_by(current, next, notify);
            current = next;
            previous_t = t;
            self.sleep_frame();
        }
        self.reset_interpolation();
    }

    /// Linear elevation tween; re-applies the unchanged center each
    /// frame so the rest of the viewport holds still mid-transition.
    pub(crate) fn run_tilt(&self, target: f32, duration_ms: f32) {
        let start = self.viewport.snapshot().elevation();
        let diff = target - start;

        let started = Instant::now();
        while !self.stopped() {
            let t = normalized_since(started, f64::from(duration_ms));
            if t > 1.0 {
                if self.viewport.snapshot().elevation() != target {
                    self.viewport.set_elevation(target);
                }
                break;
            }
            let eased = t as f32;
            self.set_interpolation(eased);
            self.viewport.set_elevation(diff.mul_add(eased, start));
            let center = self.viewport.snapshot().center();
            self.viewport.set_geo_center(center, false);
            self.sleep_frame();
        }
        self.reset_interpolation();
    }

    /// Frame-driven rotation catch-up toward the pending target.
    ///
    /// Consumes the pending target, then nudges the rotation by a fifth
    /// of the remaining shortest-arc difference per frame until the
    /// residue is negligible — a geometric decay that converges in a
    /// bounded frame count from any angle.
    pub(crate) fn run_pending_rotation(&self) {
        let Some(target) = lock(&self.shared.pending_rotation).take() else {
            return;
        };
        loop {
            let current = self.viewport.snapshot().rotation();
            let diff = shortest_arc_degrees(current, target);
            if diff.abs() < ROTATION_SNAP_THRESHOLD {
                if diff != 0.0 {
                    self.viewport.rotate_to(target);
                }
                break;
            }
            if self.stopped() {
                break;
            }
            self.sleep_frame();
            self.viewport
                .rotate_to(current + diff / PENDING_ROTATION_DECAY);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::util::sync::lock as lock_mutex;
    use crate::viewport::{SharedViewport, Viewport};

    fn fast_driver(viewport: &SharedViewport) -> AnimationDriver {
        AnimationDriver {
            shared: Arc::new(EngineShared::new()),
            viewport: Arc::new(viewport.clone()),
            backend: None,
            options: AnimationOptions {
                frame_interval_ms: 2,
                ..AnimationOptions::default()
            },
        }
    }

    #[test]
    fn test_normalized_since_zero_duration_is_complete() {
        assert!(normalized_since(Instant::now(), 0.0) > 1.0);
        assert!(normalized_since(Instant::now(), -5.0) > 1.0);
    }

    #[test]
    fn test_run_zoom_ends_exactly_on_target() {
        let viewport = SharedViewport::new(Viewport::new(
            GeoPoint::new(0.0, 0.0),
            5,
            800,
            600,
        ));
        let driver = fast_driver(&viewport);

        driver.run_zoom(5, 0.0, 7, 0.25, 20.0, false);

        let snapshot = viewport.snapshot();
        assert_eq!(snapshot.zoom(), 7);
        assert_eq!(snapshot.zoom_fraction(), 0.25);
    }

    #[test]
    fn test_run_zoom_fraction_stays_in_bucket() {
        let viewport = SharedViewport::new(Viewport::new(
            GeoPoint::new(0.0, 0.0),
            5,
            800,
            600,
        ));
        let frames: Arc<Mutex<Vec<(i32, f64)>>> =
            Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&frames);
        viewport.observe(move |v| {
            lock_mutex(&sink).push((v.zoom(), v.zoom_fraction()));
        });
        let driver = fast_driver(&viewport);

        driver.run_zoom(5, 0.0, 8, 0.6, 15.0, true);

        let frames = lock_mutex(&frames);
        assert!(!frames.is_empty());
        let mut previous = 5.0;
        for &(zoom, fraction) in frames.iter() {
            // Fraction bucketed for a positive target fraction: (0, 1]
            assert!(
                fraction > -0.5 && fraction <= 1.0,
                "fraction escaped bucket: {fraction}"
            );
            let continuous = f64::from(zoom) + fraction;
            assert!(
                continuous >= previous - 1e-9,
                "continuous zoom went backward: {continuous} < {previous}"
            );
            previous = continuous;
        }
        assert_eq!(*frames.last().unwrap(), (8, 0.6));
    }

    #[test]
    fn test_run_zoom_snaps_target_even_when_stopped() {
        let viewport = SharedViewport::new(Viewport::new(
            GeoPoint::new(0.0, 0.0),
            5,
            800,
            600,
        ));
        let driver = fast_driver(&viewport);
        driver.shared.stop.store(true, Ordering::SeqCst);

        driver.run_zoom(5, 0.0, 9, 0.0, 1000.0, false);

        assert_eq!(viewport.snapshot().zoom(), 9);
    }

    #[test]
    fn test_run_rotate_small_difference_snaps() {
        let viewport = SharedViewport::new(Viewport::default());
        viewport.rotate_to(10.0);
        let driver = fast_driver(&viewport);

        driver.run_rotate(10.5, 1000.0);

        assert_eq!(viewport.snapshot().rotation(), 10.5);
    }

    #[test]
    fn test_run_rotate_takes_shortest_arc() {
        let viewport = SharedViewport::new(Viewport::default());
        viewport.rotate_to(350.0); // stored as -10
        let driver = fast_driver(&viewport);

        let samples: Arc<Mutex<Vec<f32>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&samples);
        let probe = viewport.clone();
        let done = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let done_flag = Arc::clone(&done);
        let sampler = std::thread::spawn(move || {
            while !done_flag.load(Ordering::SeqCst) {
                lock_mutex(&sink).push(probe.snapshot().rotation());
                std::thread::sleep(std::time::Duration::from_millis(1));
            }
        });

        driver.run_rotate(10.0, 40.0);
        done.store(true, Ordering::SeqCst);
        let _ = sampler.join();

        assert_eq!(viewport.snapshot().rotation(), 10.0);
        for &sample in lock_mutex(&samples).iter() {
            // +20° through north: samples stay near zero, never near 180
            assert!(
                sample.abs() < 30.0,
                "rotation went the long way: {sample}"
            );
        }
    }

    #[test]
    fn test_run_pending_rotation_converges_and_consumes() {
        let viewport = SharedViewport::new(Viewport::default());
        let driver = fast_driver(&viewport);
        *lock_mutex(&driver.shared.pending_rotation) = Some(45.0);

        driver.run_pending_rotation();

        assert_eq!(viewport.snapshot().rotation(), 45.0);
        assert!(lock_mutex(&driver.shared.pending_rotation).is_none());
    }

    #[test]
    fn test_run_pending_rotation_without_target_is_noop() {
        let viewport = SharedViewport::new(Viewport::default());
        let driver = fast_driver(&viewport);
        driver.run_pending_rotation();
        assert_eq!(viewport.snapshot().rotation(), 0.0);
    }

    #[test]
    fn test_run_pixel_pan_lands_on_target() {
        let viewport = SharedViewport::new(Viewport::new(
            GeoPoint::new(0.0, 0.0),
            6,
            800,
            600,
        ));
        let driver = fast_driver(&viewport);
        let target = GeoPoint::new(1.0, 2.0);
        let offset = viewport.snapshot().screen_offset(target);

        driver.run_pixel_pan(offset, target, 30.0, false);

        let center = viewport.snapshot().center();
        assert_eq!(center.lat, target.lat);
        assert_eq!(center.lon, target.lon);
    }

    #[test]
    fn test_run_world_pan_lands_on_target() {
        use crate::viewport::projection::world31_from_geo;

        let viewport = SharedViewport::new(Viewport::new(
            GeoPoint::new(0.0, 0.0),
            6,
            800,
            600,
        ));
        let driver = fast_driver(&viewport);
        let target = GeoPoint::new(-3.0, 4.0);

        driver.run_world_pan(
            world31_from_geo(GeoPoint::new(0.0, 0.0)),
            world31_from_geo(target),
            target,
            30.0,
            false,
        );

        let center = viewport.snapshot().center();
        assert_eq!(center.lat, target.lat);
        assert_eq!(center.lon, target.lon);
    }

    #[test]
    fn test_run_drag_displacement_matches_velocity_integral() {
        let viewport = SharedViewport::new(Viewport::new(
            GeoPoint::new(0.0, 0.0),
            5,
            800,
            600,
        ));
        let driver = fast_driver(&viewport);

        // With e(t) = 1-(1-t)², the decayed velocity integrates to
        // velocity/3 over the full window.
        let velocity = Vec2::new(300.0, 0.0);
        driver.run_drag(velocity, Vec2::ZERO, 120.0, false);

        let lon = viewport.snapshot().center().lon;
        // 100 px east-drag at zoom 5 moves the center ~4.39° west
        let world_px = 256.0 * 32.0;
        let displaced_px = -lon / 360.0 * world_px;
        assert!(
            (displaced_px - 100.0).abs() < 25.0,
            "expected ~100 px of drag, got {displaced_px:.1}"
        );
    }

    #[test]
    fn test_run_drag_decelerates() {
        let viewport = SharedViewport::new(Viewport::new(
            GeoPoint::new(0.0, 0.0),
            5,
            800,
            600,
        ));
        let lons: Arc<Mutex<Vec<f64>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&lons);
        viewport.observe(move |v| lock_mutex(&sink).push(v.center().lon));
        let driver = fast_driver(&viewport);

        driver.run_drag(Vec2::new(400.0, 0.0), Vec2::ZERO, 150.0, true);

        let lons = lock_mutex(&lons);
        assert!(lons.len() >= 8, "too few frames: {}", lons.len());
        let quarter = lons.len() / 4;
        let early = (lons[quarter] - lons[0]).abs();
        let late = (lons[lons.len() - 1] - lons[lons.len() - 1 - quarter])
            .abs();
        assert!(
            late < early,
            "fling did not decelerate: early {early}, late {late}"
        );
    }

    #[test]
    fn test_run_tilt_exact_terminal() {
        let viewport = SharedViewport::new(Viewport::new(
            GeoPoint::new(10.0, 10.0),
            8,
            800,
            600,
        ));
        let driver = fast_driver(&viewport);

        driver.run_tilt(45.0, 30.0);

        let snapshot = viewport.snapshot();
        assert_eq!(snapshot.elevation(), 45.0);
        // Center untouched by the tilt loop
        assert_eq!(snapshot.center().lat, 10.0);
        assert_eq!(snapshot.center().lon, 10.0);
    }
}
