// shaders.rs - Shader program compilation, linking and uniforms

use crate::assets::shaders::{ShaderSource, FALLBACK_FRAGMENT, FALLBACK_VERTEX};
use crate::render::gl::GlApi;
use crate::render::uniform::UniformValue;
use glam::{Mat4, Vec4};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;
use thiserror::Error;

const EMPTY_LOG: &str = "no diagnostic provided by driver";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex => f.write_str("vertex"),
            Self::Fragment => f.write_str("fragment"),
        }
    }
}

/// Diagnostic for one stage that failed to compile.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{stage} shader compilation failed: {message}")]
pub struct CompileError {
    pub stage: ShaderStage,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("{}", describe_compile_errors(.0))]
    Compile(Vec<CompileError>),
    #[error("Program linking failed: {0}")]
    Linking(String),
    #[error("Uniform not found: {0}")]
    UniformNotFound(String),
    #[error("Shader program has been released")]
    Released,
    #[error("Failed to create {object}: {message}")]
    Create {
        object: &'static str,
        message: String,
    },
    #[error("Failed to read shader source {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ShaderError {
    /// Stages whose compilation failed, in the order they were compiled.
    pub fn failed_stages(&self) -> Vec<ShaderStage> {
        match self {
            Self::Compile(errors) => errors.iter().map(|e| e.stage).collect(),
            _ => Vec::new(),
        }
    }
}

fn describe_compile_errors(errors: &[CompileError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn non_empty_log(log: String) -> String {
    let trimmed = log.trim_end_matches(|c: char| c == '\0' || c.is_whitespace());
    if trimmed.is_empty() {
        EMPTY_LOG.to_string()
    } else {
        trimmed.to_string()
    }
}

/// What to do when a program fails to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Hand the error back to the caller.
    #[default]
    Abort,
    /// Log the error and build the solid magenta fallback program instead.
    Fallback,
}

/// A compiled stage object, deleted when the guard goes out of scope.
struct CompiledStage<'a, G: GlApi> {
    gl: &'a G,
    shader: G::Shader,
}

impl<G: GlApi> Drop for CompiledStage<'_, G> {
    fn drop(&mut self) {
        self.gl.delete_shader(self.shader);
    }
}

fn compile_stage<'a, G: GlApi>(
    gl: &'a G,
    stage: ShaderStage,
    source: &str,
) -> Result<CompiledStage<'a, G>, ShaderError> {
    let shader = gl.create_shader(stage).map_err(|message| ShaderError::Create {
        object: "shader",
        message,
    })?;
    let compiled = CompiledStage { gl, shader };

    gl.shader_source(shader, source);
    gl.compile_shader(shader);

    if !gl.shader_compile_status(shader) {
        let message = non_empty_log(gl.shader_info_log(shader));
        warn!("{} shader failed to compile: {}", stage, message);
        return Err(ShaderError::Compile(vec![CompileError { stage, message }]));
    }

    debug!("Compiled {} shader {:?}", stage, shader);
    Ok(compiled)
}

/// Folds per-stage failures into one error.
///
/// Compile diagnostics from every stage are kept. Any other failure is only
/// returned when no stage produced a diagnostic.
fn merge_failures(failures: impl IntoIterator<Item = ShaderError>) -> ShaderError {
    let mut errors = Vec::new();
    let mut other_failure = None;
    for failure in failures {
        match failure {
            ShaderError::Compile(stage_errors) => errors.extend(stage_errors),
            other => {
                warn!("{}", other);
                other_failure.get_or_insert(other);
            }
        }
    }
    match other_failure {
        Some(failure) if errors.is_empty() => failure,
        _ => ShaderError::Compile(errors),
    }
}

/// Linked vertex + fragment program.
///
/// The program handle is owned exclusively and deleted exactly once, either by
/// [`ShaderProgram::release`] or on drop.
pub struct ShaderProgram<G: GlApi = glow::Context> {
    gl: Rc<G>,
    id: Option<G::Program>,
    uniforms: HashMap<String, Option<G::UniformLocation>>,
}

impl<G: GlApi> ShaderProgram<G> {
    /// Compiles both stages and links them.
    ///
    /// Both stages are always compiled so that every stage diagnostic is
    /// reported. Linking is only attempted when both compiled. The per-stage
    /// objects never outlive this call.
    pub fn new(gl: &Rc<G>, vertex_source: &str, fragment_source: &str) -> Result<Self, ShaderError> {
        let vertex = compile_stage(gl.as_ref(), ShaderStage::Vertex, vertex_source);
        let fragment = compile_stage(gl.as_ref(), ShaderStage::Fragment, fragment_source);

        let (vertex, fragment) = match (vertex, fragment) {
            (Ok(vertex), Ok(fragment)) => (vertex, fragment),
            (vertex, fragment) => {
                return Err(merge_failures(
                    [vertex.err(), fragment.err()].into_iter().flatten(),
                ))
            }
        };

        let program = gl.create_program().map_err(|message| ShaderError::Create {
            object: "program",
            message,
        })?;

        gl.attach_shader(program, vertex.shader);
        gl.attach_shader(program, fragment.shader);
        gl.link_program(program);
        let linked = gl.program_link_status(program);
        gl.detach_shader(program, vertex.shader);
        gl.detach_shader(program, fragment.shader);
        drop(vertex);
        drop(fragment);

        if !linked {
            let message = non_empty_log(gl.program_info_log(program));
            gl.delete_program(program);
            warn!("Shader program failed to link: {}", message);
            return Err(ShaderError::Linking(message));
        }

        info!("Linked shader program {:?}", program);
        Ok(Self {
            gl: Rc::clone(gl),
            id: Some(program),
            uniforms: HashMap::new(),
        })
    }

    pub fn from_source(gl: &Rc<G>, source: &ShaderSource) -> Result<Self, ShaderError> {
        Self::new(gl, &source.vertex, &source.fragment)
    }

    /// Builds `source`, applying `policy` if that fails.
    ///
    /// Under [`FailurePolicy::Fallback`] the exercise's own vertex stage is kept
    /// when only the fragment stage was at fault.
    pub fn build(gl: &Rc<G>, source: &ShaderSource, policy: FailurePolicy) -> Result<Self, ShaderError> {
        let err = match Self::from_source(gl, source) {
            Ok(program) => return Ok(program),
            Err(err) => err,
        };
        if policy == FailurePolicy::Abort {
            return Err(err);
        }

        warn!("Using fallback shader program: {}", err);
        let vertex = match &err {
            ShaderError::Compile(errors) if errors.iter().all(|e| e.stage == ShaderStage::Fragment) => {
                source.vertex.as_str()
            }
            _ => FALLBACK_VERTEX,
        };
        Self::new(gl, vertex, FALLBACK_FRAGMENT)
    }

    /// Program handle, `None` once released.
    pub fn handle(&self) -> Option<G::Program> {
        self.id
    }

    pub fn is_valid(&self) -> bool {
        self.id.is_some()
    }

    /// Makes this the current program for subsequent draw calls.
    pub fn activate(&self) {
        match self.id {
            Some(id) => self.gl.use_program(Some(id)),
            None => warn!("Ignoring activation of a released shader program"),
        }
    }

    fn uniform_location(&mut self, id: G::Program, name: &str) -> Option<G::UniformLocation> {
        if let Some(location) = self.uniforms.get(name) {
            return location.clone();
        }

        let location = self.gl.uniform_location(id, name);
        if location.is_none() {
            warn!("Uniform '{}' not found in shader program {:?}", name, id);
        }
        self.uniforms.insert(name.to_string(), location.clone());
        location
    }

    /// Writes `value` into the uniform `name` of the currently active program.
    ///
    /// The program must have been activated first. A name the program does not
    /// expose is an error and nothing is written.
    pub fn set_uniform(&mut self, name: &str, value: impl Into<UniformValue>) -> Result<(), ShaderError> {
        let id = self.id.ok_or(ShaderError::Released)?;
        let location = self
            .uniform_location(id, name)
            .ok_or_else(|| ShaderError::UniformNotFound(name.to_string()))?;

        let value = value.into();
        debug!("Setting {} uniform '{}'", value.glsl_type(), name);
        self.gl.set_uniform(&location, &value);
        Ok(())
    }

    pub fn set_int(&mut self, name: &str, value: i32) -> Result<(), ShaderError> {
        self.set_uniform(name, value)
    }

    pub fn set_float(&mut self, name: &str, value: f32) -> Result<(), ShaderError> {
        self.set_uniform(name, value)
    }

    pub fn set_vec4(&mut self, name: &str, value: Vec4) -> Result<(), ShaderError> {
        self.set_uniform(name, value)
    }

    pub fn set_mat4(&mut self, name: &str, value: &Mat4) -> Result<(), ShaderError> {
        self.set_uniform(name, *value)
    }

    /// Deletes the program. Later calls, and the eventual drop, do nothing.
    pub fn release(&mut self) {
        if let Some(id) = self.id.take() {
            self.gl.delete_program(id);
            self.uniforms.clear();
            debug!("Released shader program {:?}", id);
        }
    }
}

impl<G: GlApi> Drop for ShaderProgram<G> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<G: GlApi> fmt::Debug for ShaderProgram<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderProgram")
            .field("id", &self.id)
            .field("cached_uniforms", &self.uniforms.len())
            .finish()
    }
}
