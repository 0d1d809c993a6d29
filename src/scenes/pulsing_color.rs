use super::vertex_colors::VERTICES as COLORED_VERTICES;
use super::{Exercise, Scene, SceneError, SceneSettings};
use crate::assets::shaders::{ShaderSource, POSITION_VERTEX, UNIFORM_COLOR_FRAGMENT};
use crate::render::gl::GlApi;
use crate::render::mesh::{Mesh, VertexLayout};
use crate::render::shaders::{ShaderError, ShaderProgram};
use glam::Vec4;
use std::rc::Rc;

pub const COLOR_UNIFORM: &str = "ourColor";

/// Green channel for `time` seconds, oscillating in `[0, 1]`.
pub fn pulse(time: f32) -> Vec4 {
    Vec4::new(0.0, time.sin() / 2.0 + 0.5, 0.0, 1.0)
}

pub struct PulsingColor<G: GlApi> {
    program: ShaderProgram<G>,
    mesh: Mesh<G>,
}

impl<G: GlApi> PulsingColor<G> {
    pub fn new(gl: &Rc<G>, settings: &SceneSettings) -> Result<Self, SceneError> {
        let source = ShaderSource::new(POSITION_VERTEX, UNIFORM_COLOR_FRAGMENT);
        let program = ShaderProgram::build(gl, &source, settings.policy)?;

        // same triangle as the vertex color exercise, positions only
        let positions: Vec<f32> = COLORED_VERTICES
            .chunks_exact(6)
            .flat_map(|vertex| vertex[..3].iter().copied())
            .collect();
        let mesh = Mesh::new(gl, &positions, &VertexLayout::position())?;
        Ok(Self { program, mesh })
    }
}

impl<G: GlApi> Scene for PulsingColor<G> {
    fn exercise(&self) -> Exercise {
        Exercise::PulsingColor
    }

    fn draw(&mut self, time: f32) -> Result<(), ShaderError> {
        self.program.activate();
        self.program.set_vec4(COLOR_UNIFORM, pulse(time))?;
        self.mesh.draw();
        Ok(())
    }
}
