//! The camera animation engine.
//!
//! [`CameraAnimator`] owns the animation lifecycle: starting workers,
//! cooperative cancellation, synchronous join, and the per-kind
//! interpolation algorithms. Exactly one worker thread exists at any
//! instant — every animation start funnels through the same primitive,
//! which stops and joins the previous worker first, so animations are
//! strictly serialized and the viewport is only ever mutated from one
//! place.

mod command;
mod driver;
mod requests;
mod status;

pub use command::CameraCommand;
pub use requests::{AnimationCallback, FlyCallbacks, FlyToRequest, MoveRequest};
pub use status::{CameraTargets, EngineStatus};

use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use self::driver::AnimationDriver;
use self::status::EngineShared;
use crate::backend::RenderBackend;
use crate::options::AnimationOptions;
use crate::util::sync::lock;
use crate::viewport::ViewportHost;

/// The camera animation engine.
///
/// Holds mutate-only access to the viewport (owned by the view layer),
/// an optional render backend for hardware-accelerated tweening, and
/// the worker lifecycle state.
///
/// Animation requests never fail: degenerate inputs (zero displacement,
/// targets outside the representable extent, negligible angles) are
/// applied instantly or snapped instead of erroring, and controls on an
/// engine with no live worker are no-ops.
pub struct CameraAnimator {
    viewport: Arc<dyn ViewportHost>,
    backend: Option<Arc<dyn RenderBackend>>,
    options: AnimationOptions,
    shared: Arc<EngineShared>,
    worker: Mutex<Option<JoinHandle<()>>>,
    start_lock: Mutex<()>,
}

impl CameraAnimator {
    /// Engine with manual interpolation (no render backend).
    #[must_use]
    pub fn new(
        viewport: Arc<dyn ViewportHost>,
        options: AnimationOptions,
    ) -> Self {
        Self {
            viewport,
            backend: None,
            options,
            shared: Arc::new(EngineShared::new()),
            worker: Mutex::new(None),
            start_lock: Mutex::new(()),
        }
    }

    /// Engine delegating position/zoom/azimuth tweening to a backend.
    #[must_use]
    pub fn with_backend(
        viewport: Arc<dyn ViewportHost>,
        backend: Arc<dyn RenderBackend>,
        options: AnimationOptions,
    ) -> Self {
        let mut engine = Self::new(viewport, options);
        engine.backend = Some(backend);
        engine
    }

    /// The engine's animation options.
    #[must_use]
    pub fn options(&self) -> &AnimationOptions {
        &self.options
    }

    // ── Lifecycle ───────────────────────────────────────────────────

    /// Request cancellation and return immediately.
    ///
    /// The worker observes the flag at its next frame poll; there is no
    /// guarantee it has exited when this returns.
    pub fn stop(&self) {
        self.shared.stop.store(true, Ordering::SeqCst);
    }

    /// Cancel and block until the worker has fully exited.
    ///
    /// Pauses the backend timeline first so it cannot keep advancing
    /// while the engine winds down. Safe to call with no active worker;
    /// always returns with [`is_animating`](Self::is_animating) false.
    pub fn stop_sync(&self) {
        if let Some(backend) = &self.backend {
            backend.pause();
        }
        self.shared.stop.store(true, Ordering::SeqCst);
        let handle = lock(&self.worker).take();
        if let Some(handle) = handle {
            log::trace!("joining animation worker");
            let _ = handle.join();
        }
    }

    /// Whether a worker is alive and not yet asked to stop.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        !self.shared.stop.load(Ordering::SeqCst)
            && lock(&self.worker)
                .as_ref()
                .is_some_and(|handle| !handle.is_finished())
    }

    /// Whether a zoom interpolation loop is active.
    #[must_use]
    pub fn is_zooming(&self) -> bool {
        self.shared.zooming.load(Ordering::SeqCst)
    }

    /// Whether a pan/move animation is active.
    #[must_use]
    pub fn is_moving(&self) -> bool {
        self.shared.moving.load(Ordering::SeqCst)
    }

    /// Whether a tilt animation is active.
    #[must_use]
    pub fn is_tilting(&self) -> bool {
        self.shared.tilting.load(Ordering::SeqCst)
    }

    /// Eased progress of the current interpolation loop, in `[0, 1]`.
    #[must_use]
    pub fn interpolation(&self) -> f32 {
        self.shared.interpolation.load()
    }

    /// Snapshot of lifecycle and per-kind animation flags.
    #[must_use]
    pub fn status(&self) -> EngineStatus {
        EngineStatus {
            running: self.is_animating(),
            stop_requested: self.shared.stop.load(Ordering::SeqCst),
            interpolation: self.interpolation(),
            zooming: self.is_zooming(),
            moving: self.is_moving(),
            tilting: self.is_tilting(),
        }
    }

    /// Target values of the current (or most recent) animation.
    #[must_use]
    pub fn targets(&self) -> CameraTargets {
        self.shared.targets()
    }

    /// Rotation target waiting for opportunistic catch-up, if any.
    #[must_use]
    pub fn pending_rotation(&self) -> Option<f32> {
        *lock(&self.shared.pending_rotation)
    }

    // ── Internals ───────────────────────────────────────────────────

    /// Stop the previous worker and spawn exactly one new one.
    ///
    /// The start lock serializes concurrent callers; `stop_sync` joins
    /// the prior worker before the stop flag is cleared, which is what
    /// enforces the single-active-worker invariant.
    pub(crate) fn start_worker(
        &self,
        body: impl FnOnce() + Send + 'static,
    ) {
        let guard = lock(&self.start_lock);
        self.stop_sync();
        self.shared.stop.store(false, Ordering::SeqCst);
        match std::thread::Builder::new()
            .name("camera-animator".into())
            .spawn(body)
        {
            Ok(handle) => *lock(&self.worker) = Some(handle),
            Err(e) => {
                log::error!("failed to spawn animation worker: {e}");
            }
        }
        drop(guard);
    }

    pub(crate) fn driver(&self) -> AnimationDriver {
        AnimationDriver {
            shared: Arc::clone(&self.shared),
            viewport: Arc::clone(&self.viewport),
            backend: self.backend.clone(),
            options: self.options,
        }
    }

    pub(crate) fn shared(&self) -> &EngineShared {
        &self.shared
    }

    pub(crate) fn viewport(&self) -> &Arc<dyn ViewportHost> {
        &self.viewport
    }

    pub(crate) fn backend(&self) -> Option<&Arc<dyn RenderBackend>> {
        self.backend.as_ref()
    }
}

impl Drop for CameraAnimator {
    fn drop(&mut self) {
        self.stop_sync();
    }
}

impl std::fmt::Debug for CameraAnimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraAnimator")
            .field("animating", &self.is_animating())
            .field("status", &self.status())
            .field("backend", &self.backend.is_some())
            .finish_non_exhaustive()
    }
}
