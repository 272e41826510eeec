/// CSS3D Core Library - scene graph rendering through CSS 3D transforms
///
/// Each renderable scene node mirrors a DOM element. Every frame the renderer
/// derives a CSS `matrix3d` transform per element that reproduces the camera
/// projection, so HTML content can be placed in a 3D scene without a GPU.

pub mod billboard;
pub mod cache;
pub mod config;
pub mod css;
pub mod depth;
pub mod dom;
pub mod error;
pub mod headless;
pub mod projection;
pub mod renderer;
pub mod scene;
pub mod transform;

// Re-export commonly used types
pub use config::{Compositing, CompositingMode, RendererOptions};
pub use dom::{Document, Element};
pub use error::{Error, Result};
pub use projection::{Camera, Projection};
pub use renderer::{Css3dRenderer, Size};
pub use scene::{Billboard, Node, NodeId, NodeKind, Renderable, Scene, Variant};
pub use transform::{EulerAngles, Transform};
