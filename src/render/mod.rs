pub mod gl;
pub mod mesh;
pub mod shaders;
pub mod uniform;

pub use mesh::Mesh;
pub use shaders::ShaderProgram;
