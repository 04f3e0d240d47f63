//! wgpu render backend for the orbit viewer.
//!
//! Owns the GPU resource lifecycle: shader programs with surfaced
//! compile/link diagnostics, immutable vertex/index buffers, and the
//! per-frame pass that clears, activates a pipeline and draws every
//! registered buffer in insertion order.
//!
//! # Invariants
//! - A shader program either compiled fully or is reported as an error;
//!   a failed program is never stored, so it can never be activated.
//! - Buffers are uploaded once at load time and never partially updated.
//!   The one exception is each instance buffer's effect uniform, written
//!   every frame before the pass.
//! - Bind state lives on the `wgpu::RenderPass`, which only exists inside
//!   one frame. Nothing assumes bindings persist across draws.

mod geometry;
mod gpu;
mod shader;
mod shaders;

pub use geometry::{InstanceBuffer, SceneryBuffer};
pub use gpu::{GpuFrame, MeshRenderer};
pub use shader::{ShaderError, ShaderProgram};
pub use shaders::{ShaderPair, shader_source};
