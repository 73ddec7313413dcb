// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]
// Float comparison: animation math frequently compares against 0.0, 1.0
#![allow(clippy::float_cmp)]
// Truncating casts between zoom levels and fixed-point world coordinates
// are intentional throughout
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_panics_doc)]

//! Camera animation engine for interactive map views.
//!
//! Swoop turns navigation intents — move, fly-to, zoom, rotate, fling,
//! tilt — into a time-ordered sequence of viewport states, stepped at a
//! fixed frame cadence on a single background worker.
//!
//! # Key entry points
//!
//! - [`engine::CameraAnimator`] - the animation engine
//! - [`viewport::Viewport`] / [`viewport::ViewportHost`] - camera state
//!   and the seam to the embedding view layer
//! - [`backend::RenderBackend`] - optional hardware-accelerated tween
//!   delegation
//! - [`options::AnimationOptions`] - durations, pacing, and the master
//!   animation switch
//!
//! # Architecture
//!
//! The engine owns exactly one worker thread at a time. Starting any
//! animation first stops and joins the previous worker, so animations
//! are strictly serialized and the viewport is only ever mutated from
//! one place. Cancellation is cooperative: every interpolation loop
//! polls a stop flag once per frame, which bounds `stop_sync` latency
//! by a single frame interval (15 ms by default).
//!
//! When a [`backend::RenderBackend`] is attached, position/zoom/azimuth
//! tweening is delegated to its per-channel animations and the worker
//! only pumps per-frame updates; without one, the engine interpolates
//! every value itself.

pub mod animation;
pub mod backend;
pub mod engine;
pub mod error;
pub mod options;
pub mod util;
pub mod viewport;
