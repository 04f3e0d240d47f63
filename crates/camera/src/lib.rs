//! Orbit camera controller.
//!
//! Two parameter sets are live at all times: `target`, written only by
//! input handlers, and `current`, advanced toward the target once per
//! frame. The render step reads `current` exclusively, so it always sees
//! a self-consistent state without locking.
//!
//! # Invariants
//! - Input events mutate target state only; `advance` mutates current only.
//! - Pitch target stays within a quarter turn either way.
//! - Recoil target never drops below its floor; the effective view
//!   distance is recoil squared.

mod orbit;

pub use orbit::{ButtonMask, CameraState, OrbitCamera};
