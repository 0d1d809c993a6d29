pub mod app;
pub mod assets;
pub mod config;
pub mod render;
pub mod scenes;

// Re-export commonly used types
pub use assets::shaders::ShaderSource;
pub use config::AppConfig;
pub use render::gl::GlApi;
pub use render::mesh::{Mesh, MeshError, VertexLayout};
pub use render::shaders::{CompileError, FailurePolicy, ShaderError, ShaderProgram, ShaderStage};
pub use render::uniform::UniformValue;
pub use scenes::{Exercise, Scene};
