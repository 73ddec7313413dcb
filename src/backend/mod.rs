//! Optional hardware render-backend adapter.
//!
//! A backend models a hardware-accelerated animator owning one tween
//! timeline per value kind ([`AnimatedChannel`]). Every channel
//! animation is tagged with the [`AnimationSlot`] of its originator so
//! a new automatic animation can supersede a previous automatic one
//! without disturbing a concurrent user-interaction tween, and vice
//! versa.
//!
//! When a backend is attached the engine does not interpolate position,
//! zoom, or azimuth itself — it starts channel animations, then pumps
//! [`RenderBackend::update`] once per frame until the requested
//! duration elapses. Backend absence is not an error; it selects the
//! engine's manual interpolation path.

use glam::IVec2;

/// An independently tweened value stream owned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimatedChannel {
    /// World-position target.
    Target,
    /// Continuous zoom value.
    Zoom,
    /// Azimuth / map rotation.
    Azimuth,
}

/// Originator tag of a channel animation, for supersession.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationSlot {
    /// Tween started by a direct user gesture.
    UserInteraction,
    /// Tween started by programmatic navigation (route follow,
    /// move-to-location).
    Navigation,
}

/// Timing profile for a backend-owned tween.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingFunction {
    /// Constant-rate interpolation.
    Linear,
    /// Symmetric ease-in/ease-out.
    EaseInOut,
}

/// Progress of an in-flight channel animation, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelProgress {
    /// Total duration of the tween.
    pub duration: f32,
    /// Time already elapsed.
    pub elapsed: f32,
}

impl ChannelProgress {
    /// Remaining tween time, never negative.
    ///
    /// A superseding animation runs for exactly this long, preserving
    /// the perceived rhythm of the tween it replaces.
    #[must_use]
    pub fn remaining(&self) -> f32 {
        (self.duration - self.elapsed).max(0.0)
    }
}

/// Capability contract of a hardware-accelerated render backend.
///
/// All durations are in seconds. Implementations own their internal
/// timelines; the engine only starts, queries, cancels, and pumps them.
pub trait RenderBackend: Send + Sync {
    /// Progress of the animation owned by `slot` on `channel`, if one
    /// is in flight.
    fn current_animation(
        &self,
        slot: AnimationSlot,
        channel: AnimatedChannel,
    ) -> Option<ChannelProgress>;

    /// Cancel the animation owned by `slot` on `channel`. No-op if none
    /// is running.
    fn cancel_animation(&self, slot: AnimationSlot, channel: AnimatedChannel);

    /// Tween the world-position target.
    fn animate_target(
        &self,
        world: IVec2,
        duration: f32,
        timing: TimingFunction,
        slot: AnimationSlot,
    );

    /// Tween the continuous zoom value.
    fn animate_zoom(
        &self,
        zoom: f32,
        duration: f32,
        timing: TimingFunction,
        slot: AnimationSlot,
    );

    /// Tween the azimuth, in degrees.
    fn animate_azimuth(
        &self,
        degrees: f32,
        duration: f32,
        timing: TimingFunction,
        slot: AnimationSlot,
    );

    /// Advance all running tweens by `dt` seconds. Called once per
    /// engine frame while a backend-driven animation runs.
    fn update(&self, dt: f32);

    /// Pause the global timeline (engine wind-down).
    fn pause(&self);

    /// Resume the global timeline.
    fn resume(&self);
}
