use super::{Exercise, Scene, SceneError, SceneSettings};
use crate::assets::shaders::{ShaderSource, VERTEX_COLORS_FS, VERTEX_COLORS_VS};
use crate::render::gl::GlApi;
use crate::render::mesh::{Mesh, VertexLayout};
use crate::render::shaders::{ShaderError, ShaderProgram};
use std::rc::Rc;

#[rustfmt::skip]
pub const VERTICES: [f32; 18] = [
    // position         // color
     0.5, -0.5, 0.0,    1.0, 0.0, 0.0, // right
    -0.5, -0.5, 0.0,    0.0, 1.0, 0.0, // left
     0.0,  0.5, 0.0,    0.0, 0.0, 1.0, // top
];

pub struct VertexColors<G: GlApi> {
    program: ShaderProgram<G>,
    mesh: Mesh<G>,
}

impl<G: GlApi> VertexColors<G> {
    /// Reads `vertex_colors.vs` / `vertex_colors.fs` from the shader directory.
    pub fn new(gl: &Rc<G>, settings: &SceneSettings) -> Result<Self, SceneError> {
        let source = ShaderSource::from_files(
            settings.shader_dir.join(VERTEX_COLORS_VS),
            settings.shader_dir.join(VERTEX_COLORS_FS),
        )?;
        let program = ShaderProgram::build(gl, &source, settings.policy)?;
        let mesh = Mesh::new(gl, &VERTICES, &VertexLayout::position_color())?;
        Ok(Self { program, mesh })
    }
}

impl<G: GlApi> Scene for VertexColors<G> {
    fn exercise(&self) -> Exercise {
        Exercise::VertexColors
    }

    fn draw(&mut self, _time: f32) -> Result<(), ShaderError> {
        self.program.activate();
        self.mesh.draw();
        Ok(())
    }
}
