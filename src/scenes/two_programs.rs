use super::split_triangles::{FIRST_TRIANGLE, SECOND_TRIANGLE};
use super::{Exercise, Scene, SceneError, SceneSettings};
use crate::assets::shaders::{ShaderSource, ORANGE_FRAGMENT, POSITION_VERTEX, YELLOW_FRAGMENT};
use crate::render::gl::GlApi;
use crate::render::mesh::{Mesh, VertexLayout};
use crate::render::shaders::{ShaderError, ShaderProgram};
use std::rc::Rc;

/// Left triangle orange, right triangle yellow. Both programs share the
/// vertex stage source.
pub struct TwoPrograms<G: GlApi> {
    orange: ShaderProgram<G>,
    yellow: ShaderProgram<G>,
    left: Mesh<G>,
    right: Mesh<G>,
}

impl<G: GlApi> TwoPrograms<G> {
    pub fn new(gl: &Rc<G>, settings: &SceneSettings) -> Result<Self, SceneError> {
        let orange = ShaderProgram::build(
            gl,
            &ShaderSource::new(POSITION_VERTEX, ORANGE_FRAGMENT),
            settings.policy,
        )?;
        let yellow = ShaderProgram::build(
            gl,
            &ShaderSource::new(POSITION_VERTEX, YELLOW_FRAGMENT),
            settings.policy,
        )?;

        let layout = VertexLayout::position();
        Ok(Self {
            orange,
            yellow,
            left: Mesh::new(gl, &FIRST_TRIANGLE, &layout)?,
            right: Mesh::new(gl, &SECOND_TRIANGLE, &layout)?,
        })
    }
}

impl<G: GlApi> Scene for TwoPrograms<G> {
    fn exercise(&self) -> Exercise {
        Exercise::TwoPrograms
    }

    fn draw(&mut self, _time: f32) -> Result<(), ShaderError> {
        self.orange.activate();
        self.left.draw();
        self.yellow.activate();
        self.right.draw();
        Ok(())
    }
}
