/// Spinny Core Library - Shared geometry, camera and render pipeline
///
/// This library turns convex polyhedral shapes into flat-shaded screen-space
/// triangles. Drawing them, and feeding camera input back in, is left to a
/// front end.

pub mod camera;
pub mod colour;
pub mod error;
pub mod geometry;
pub mod linalg;
pub mod primitives;
pub mod render;

// Re-export commonly used types
pub use camera::{Camera, CameraConfig};
pub use colour::{Colour, Shader};
pub use error::{ColourError, LinalgError, ShapeError};
pub use geometry::{Face, OptimiseReport, Shape, TriangleFan};
pub use linalg::{Matrix, Vector};
pub use primitives::Primitive;
pub use render::{Frame, FrameStats, Polygon, RenderConfig, Renderer, Segment};
