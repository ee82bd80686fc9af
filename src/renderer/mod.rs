//! WebGPU rendering module
//!
//! The engine's draw pass is collected into colored quads by `SceneBuilder`
//! and uploaded by `RenderState` each frame.

pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use pipeline::RenderState;
pub use scene::SceneBuilder;
pub use vertex::Vertex;
