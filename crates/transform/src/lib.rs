//! Transform stack: 4x4 homogeneous matrix construction and composition.
//!
//! One composition convention for the whole pipeline: column vectors,
//! `mvp = projection * view * model`, applied as `mvp * p`. Every operation
//! right-multiplies into the current value, so the last operation applied
//! is the first one a point passes through.
//!
//! # Invariants
//! - Stacks are value objects. Copying one deep-copies its 16 floats;
//!   two stacks never alias storage.
//! - Clip depth is the 0..1 range (wgpu convention), not -1..1.

mod stack;

pub use stack::TransformStack;
