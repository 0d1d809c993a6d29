use super::{Exercise, Scene, SceneError, SceneSettings};
use crate::assets::shaders::{ShaderSource, ORANGE_FRAGMENT, POSITION_VERTEX};
use crate::render::gl::GlApi;
use crate::render::mesh::{Mesh, VertexLayout};
use crate::render::shaders::{ShaderError, ShaderProgram};
use std::rc::Rc;

#[rustfmt::skip]
pub const FIRST_TRIANGLE: [f32; 9] = [
    -1.0, -0.5, 0.0, // left
     0.0, -0.5, 0.0, // right
    -0.5,  0.5, 0.0, // top
];

#[rustfmt::skip]
pub const SECOND_TRIANGLE: [f32; 9] = [
    0.0, -0.5, 0.0, // left
    1.0, -0.5, 0.0, // right
    0.5,  0.5, 0.0, // top
];

/// One mesh per triangle, both drawn with the orange program.
pub struct SplitTriangles<G: GlApi> {
    program: ShaderProgram<G>,
    meshes: [Mesh<G>; 2],
}

impl<G: GlApi> SplitTriangles<G> {
    pub fn new(gl: &Rc<G>, settings: &SceneSettings) -> Result<Self, SceneError> {
        let source = ShaderSource::new(POSITION_VERTEX, ORANGE_FRAGMENT);
        let program = ShaderProgram::build(gl, &source, settings.policy)?;
        let layout = VertexLayout::position();
        let meshes = [
            Mesh::new(gl, &FIRST_TRIANGLE, &layout)?,
            Mesh::new(gl, &SECOND_TRIANGLE, &layout)?,
        ];
        Ok(Self { program, meshes })
    }
}

impl<G: GlApi> Scene for SplitTriangles<G> {
    fn exercise(&self) -> Exercise {
        Exercise::SplitTriangles
    }

    fn draw(&mut self, _time: f32) -> Result<(), ShaderError> {
        self.program.activate();
        for mesh in &self.meshes {
            mesh.draw();
        }
        Ok(())
    }
}
