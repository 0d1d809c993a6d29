use super::{Exercise, Scene, SceneError, SceneSettings};
use crate::assets::shaders::{ShaderSource, BLUE_FRAGMENT, POSITION_VERTEX};
use crate::render::gl::GlApi;
use crate::render::mesh::{Mesh, VertexLayout};
use crate::render::shaders::{ShaderError, ShaderProgram};
use std::rc::Rc;

#[rustfmt::skip]
pub const VERTICES: [f32; 15] = [
    -1.0, -0.5, 0.0, // left
     0.0, -0.5, 0.0, // shared: right of the left triangle, left of the right one
    -0.5,  0.5, 0.0, // left top
     1.0, -0.5, 0.0, // right
     0.5,  0.5, 0.0, // right top
];

pub const INDICES: [u32; 6] = [0, 1, 2, 1, 3, 4];

pub struct IndexedQuad<G: GlApi> {
    program: ShaderProgram<G>,
    mesh: Mesh<G>,
}

impl<G: GlApi> IndexedQuad<G> {
    pub fn new(gl: &Rc<G>, settings: &SceneSettings) -> Result<Self, SceneError> {
        let source = ShaderSource::new(POSITION_VERTEX, BLUE_FRAGMENT);
        let program = ShaderProgram::build(gl, &source, settings.policy)?;
        let mesh = Mesh::indexed(gl, &VERTICES, &INDICES, &VertexLayout::position())?;
        Ok(Self { program, mesh })
    }

    pub fn program(&self) -> &ShaderProgram<G> {
        &self.program
    }
}

impl<G: GlApi> Scene for IndexedQuad<G> {
    fn exercise(&self) -> Exercise {
        Exercise::IndexedQuad
    }

    fn draw(&mut self, _time: f32) -> Result<(), ShaderError> {
        self.program.activate();
        self.mesh.draw();
        Ok(())
    }
}
