//! Camera viewport state and the seam to the embedding view layer.
//!
//! The [`Viewport`] struct is the camera's observable state: geographic
//! center, continuous zoom (integer level plus fractional part),
//! rotation, and elevation/tilt. It conceptually belongs to the view
//! layer; the engine only mutates it through the [`ViewportHost`] seam,
//! one worker at a time.
//!
//! [`SharedViewport`] is the reference host implementation for
//! embedders that have no view layer of their own (and for tests): a
//! mutex-guarded viewport plus registered change observers.

pub mod projection;

use std::sync::{Arc, Mutex};

use glam::{DVec2, IVec2, Vec2};

use crate::util::angle::normalize_degrees;
use crate::util::sync::lock;

/// A geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GeoPoint {
    /// Latitude in degrees, positive north.
    pub lat: f64,
    /// Longitude in degrees, positive east.
    pub lon: f64,
}

impl GeoPoint {
    /// Coordinate from latitude and longitude in degrees.
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Elevation angle of a camera looking straight down, in degrees.
pub const TOP_DOWN_ELEVATION: f32 = 90.0;

/// The camera's observable state.
///
/// Continuous zoom is `zoom + zoom_fraction`. The fraction is kept in
/// a half-open bucket around the integer level and may be transiently
/// negative while a zoom animation interpolates across a level
/// boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    center: GeoPoint,
    zoom: i32,
    zoom_fraction: f64,
    rotation: f32,
    elevation: f32,
    width: u32,
    height: u32,
}

impl Viewport {
    /// Viewport centered on `center` at an integer zoom level.
    #[must_use]
    pub fn new(center: GeoPoint, zoom: i32, width: u32, height: u32) -> Self {
        let mut viewport = Self {
            center: GeoPoint::default(),
            zoom,
            zoom_fraction: 0.0,
            rotation: 0.0,
            elevation: TOP_DOWN_ELEVATION,
            width,
            height,
        };
        viewport.set_center(center);
        viewport
    }

    /// Geographic center.
    #[must_use]
    pub fn center(&self) -> GeoPoint {
        self.center
    }

    /// Integer zoom level.
    #[must_use]
    pub fn zoom(&self) -> i32 {
        self.zoom
    }

    /// Fractional zoom part relative to [`zoom`](Self::zoom).
    #[must_use]
    pub fn zoom_fraction(&self) -> f64 {
        self.zoom_fraction
    }

    /// Combined continuous zoom value.
    #[must_use]
    pub fn continuous_zoom(&self) -> f64 {
        f64::from(self.zoom) + self.zoom_fraction
    }

    /// Map rotation in degrees, normalized to `(-180, 180]`.
    #[must_use]
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Camera elevation angle in degrees (90 = straight down).
    #[must_use]
    pub fn elevation(&self) -> f32 {
        self.elevation
    }

    /// Viewport size in pixels.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Set the center, clamping to the representable world.
    pub fn set_center(&mut self, center: GeoPoint) {
        self.center = GeoPoint::new(
            center
                .lat
                .clamp(-projection::MAX_LATITUDE, projection::MAX_LATITUDE),
            center.lon.clamp(-180.0, 180.0),
        );
    }

    /// Set the integer zoom level and fractional part.
    pub fn set_fractional_zoom(&mut self, zoom: i32, fraction: f64) {
        self.zoom = zoom;
        self.zoom_fraction = fraction;
    }

    /// Set the rotation angle; stored normalized.
    pub fn set_rotation(&mut self, degrees: f32) {
        self.rotation = normalize_degrees(degrees);
    }

    /// Set the elevation angle, clamped to `[0, 90]`.
    pub fn set_elevation(&mut self, degrees: f32) {
        self.elevation = degrees.clamp(0.0, TOP_DOWN_ELEVATION);
    }

    /// Set the viewport pixel size.
    pub fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Screen-pixel offset of `geo` relative to the viewport center,
    /// honoring the current zoom and rotation.
    #[must_use]
    pub fn screen_offset(&self, geo: GeoPoint) -> Vec2 {
        let zoom = self.continuous_zoom();
        let delta = projection::world_pixels(geo, zoom)
            - projection::world_pixels(self.center, zoom);
        let rotated =
            projection::rotate_vec(delta, -f64::from(self.rotation));
        Vec2::new(rotated.x as f32, rotated.y as f32)
    }

    /// Whether `geo` is representable and inside the visible extent.
    #[must_use]
    pub fn contains(&self, geo: GeoPoint) -> bool {
        if geo.lat.abs() > projection::MAX_LATITUDE
            || geo.lon.abs() > 180.0
        {
            return false;
        }
        let offset = self.screen_offset(geo);
        offset.x.abs() <= self.width as f32 / 2.0
            && offset.y.abs() <= self.height as f32 / 2.0
    }

    /// Center after the map content is dragged by `screen_delta`
    /// pixels (content follows the drag, so the center moves the
    /// opposite way in world space).
    #[must_use]
    pub fn dragged_center(&self, screen_delta: Vec2) -> GeoPoint {
        let zoom = self.continuous_zoom();
        let world_delta = projection::rotate_vec(
            DVec2::new(f64::from(screen_delta.x), f64::from(screen_delta.y)),
            f64::from(self.rotation),
        );
        projection::geo_from_world_pixels(
            projection::world_pixels(self.center, zoom) - world_delta,
            zoom,
        )
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(GeoPoint::default(), 0, 800, 600)
    }
}

// ── Host seam ───────────────────────────────────────────────────────────

/// Mutate-only access to a viewport owned by the view layer.
///
/// The engine calls these from its single active worker (or from the
/// caller's thread when an animation is skipped). Implementations
/// provide their own interior mutability; the `notify` flag controls
/// whether viewport-changed observers fire for the mutation.
pub trait ViewportHost: Send + Sync {
    /// Copy of the current viewport state.
    fn snapshot(&self) -> Viewport;

    /// Set the geographic center.
    fn set_geo_center(&self, center: GeoPoint, notify: bool);

    /// Set the integer zoom level and fractional part.
    fn set_fractional_zoom(&self, zoom: i32, fraction: f64, notify: bool);

    /// Set the rotation angle in degrees.
    fn rotate_to(&self, degrees: f32);

    /// Set the elevation angle in degrees.
    fn set_elevation(&self, degrees: f32);

    /// Apply a relative drag from one screen position to another.
    fn drag_by(&self, from: Vec2, to: Vec2, notify: bool);

    /// Set the center from a backend fixed-point world position.
    fn set_world_center(&self, world: IVec2, notify: bool);
}

/// Observer invoked after a notifying viewport mutation.
pub type ViewportObserver = Box<dyn Fn(&Viewport) + Send + 'static>;

/// Reference [`ViewportHost`]: a shared, observable viewport.
#[derive(Clone)]
pub struct SharedViewport {
    inner: Arc<Mutex<Viewport>>,
    observers: Arc<Mutex<Vec<ViewportObserver>>>,
}

impl SharedViewport {
    /// Wrap a viewport for shared mutation.
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            inner: Arc::new(Mutex::new(viewport)),
            observers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Register a viewport-changed observer.
    pub fn observe(
        &self,
        observer: impl Fn(&Viewport) + Send + 'static,
    ) {
        lock(&self.observers).push(Box::new(observer));
    }

    /// Mutate the viewport outside an animation (resize, hard jumps).
    pub fn update(&self, f: impl FnOnce(&mut Viewport)) {
        f(&mut lock(&self.inner));
    }

    fn apply(&self, notify: bool, f: impl FnOnce(&mut Viewport)) {
        let state = {
            let mut viewport = lock(&self.inner);
            f(&mut viewport);
            *viewport
        };
        if notify {
            for observer in lock(&self.observers).iter() {
                observer(&state);
            }
        }
    }
}

impl ViewportHost for SharedViewport {
    fn snapshot(&self) -> Viewport {
        *lock(&self.inner)
    }

    fn set_geo_center(&self, center: GeoPoint, notify: bool) {
        self.apply(notify, |v| v.set_center(center));
    }

    fn set_fractional_zoom(&self, zoom: i32, fraction: f64, notify: bool) {
        self.apply(notify, |v| v.set_fractional_zoom(zoom, fraction));
    }

    fn rotate_to(&self, degrees: f32) {
        self.apply(false, |v| v.set_rotation(degrees));
    }

    fn set_elevation(&self, degrees: f32) {
        self.apply(false, |v| v.set_elevation(degrees));
    }

    fn drag_by(&self, from: Vec2, to: Vec2, notify: bool) {
        self.apply(notify, |v| {
            let center = v.dragged_center(to - from);
            v.set_center(center);
        });
    }

    fn set_world_center(&self, world: IVec2, notify: bool) {
        self.apply(notify, |v| {
            v.set_center(projection::geo_from_world31(world));
        });
    }
}

impl std::fmt::Debug for SharedViewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedViewport")
            .field("viewport", &self.snapshot())
            .field("observers", &lock(&self.observers).len())
            .finish()
    }
}
