// scenes - one self-contained setup and draw per exercise

pub mod indexed_quad;
pub mod pulsing_color;
pub mod split_triangles;
pub mod two_programs;
pub mod vertex_colors;

use crate::render::gl::GlApi;
use crate::render::mesh::MeshError;
use crate::render::shaders::{FailurePolicy, ShaderError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;
use std::str::FromStr;
use thiserror::Error;

pub use indexed_quad::IndexedQuad;
pub use pulsing_color::PulsingColor;
pub use split_triangles::SplitTriangles;
pub use two_programs::TwoPrograms;
pub use vertex_colors::VertexColors;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error(transparent)]
    Shader(#[from] ShaderError),
    #[error(transparent)]
    Mesh(#[from] MeshError),
}

#[derive(Debug, Error)]
#[error("Unknown exercise '{0}', expected one of: indexed-quad, split-triangles, two-programs, vertex-colors, pulsing-color")]
pub struct UnknownExercise(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Exercise {
    /// Two blue triangles from one indexed draw.
    #[default]
    IndexedQuad,
    /// Two orange triangles from separate vertex arrays.
    SplitTriangles,
    /// The same two triangles, orange and yellow, one program each.
    TwoPrograms,
    /// Per-vertex colors interpolated across one triangle, shaders read from disk.
    VertexColors,
    /// One triangle whose green channel follows `sin(time)` through a uniform.
    PulsingColor,
}

impl Exercise {
    pub const ALL: [Exercise; 5] = [
        Exercise::IndexedQuad,
        Exercise::SplitTriangles,
        Exercise::TwoPrograms,
        Exercise::VertexColors,
        Exercise::PulsingColor,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::IndexedQuad => "indexed-quad",
            Self::SplitTriangles => "split-triangles",
            Self::TwoPrograms => "two-programs",
            Self::VertexColors => "vertex-colors",
            Self::PulsingColor => "pulsing-color",
        }
    }

    pub fn window_title(&self) -> &'static str {
        match self {
            Self::IndexedQuad => "Double Triangles, Charlie!",
            Self::SplitTriangles => "Split Triangles",
            Self::TwoPrograms => "Orange and Yellow",
            Self::VertexColors => "Vertex Colors",
            Self::PulsingColor => "Pulsing Color",
        }
    }
}

impl fmt::Display for Exercise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Exercise {
    type Err = UnknownExercise;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|exercise| exercise.name() == s)
            .ok_or_else(|| UnknownExercise(s.to_string()))
    }
}

/// Inputs every scene is built from.
#[derive(Debug, Clone)]
pub struct SceneSettings {
    pub policy: FailurePolicy,
    pub shader_dir: PathBuf,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            policy: FailurePolicy::default(),
            shader_dir: PathBuf::from("data/shaders"),
        }
    }
}

pub trait Scene {
    fn exercise(&self) -> Exercise;

    /// Issues this frame's draw calls. `time` is seconds since the scene started.
    fn draw(&mut self, time: f32) -> Result<(), ShaderError>;
}

pub fn load_scene<G: GlApi + 'static>(
    gl: &Rc<G>,
    exercise: Exercise,
    settings: &SceneSettings,
) -> Result<Box<dyn Scene>, SceneError> {
    log::info!("Loading exercise {}", exercise);
    let scene: Box<dyn Scene> = match exercise {
        Exercise::IndexedQuad => Box::new(IndexedQuad::new(gl, settings)?),
        Exercise::SplitTriangles => Box::new(SplitTriangles::new(gl, settings)?),
        Exercise::TwoPrograms => Box::new(TwoPrograms::new(gl, settings)?),
        Exercise::VertexColors => Box::new(VertexColors::new(gl, settings)?),
        Exercise::PulsingColor => Box::new(PulsingColor::new(gl, settings)?),
    };
    Ok(scene)
}
