//! Frame driver: the per-tick orchestration of the render pipeline.
//!
//! One logical thread runs the frame callback; input handlers run between
//! frames on the same thread and only write camera *target* state. The
//! driver owns timing and camera motion; a [`FrameSink`] owns GPU
//! resources and draw submission, so the loop is testable without a live
//! host event source.
//!
//! # Invariants
//! - The transform stack is rebuilt from scratch every tick, never cached
//!   across frames.
//! - The clock is injected; the loop has an explicit stop condition
//!   instead of rescheduling itself forever.

mod clock;
mod driver;

pub use clock::{Clock, ManualClock, SystemClock};
pub use driver::{EffectAnim, FrameContext, FrameDriver, FrameSink, Projection};
