// mock.rs - recording GlApi implementation for tests

use super::{BufferTarget, GlApi};
use crate::render::shaders::ShaderStage;
use crate::render::uniform::UniformValue;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MockUniformLocation {
    pub program: u32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttribPointer {
    pub location: u32,
    pub components: i32,
    pub stride: i32,
    pub offset: i32,
    pub buffer: Option<u32>,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    UseProgram(Option<u32>),
    Uniform {
        program: Option<u32>,
        location: MockUniformLocation,
        value: UniformValue,
    },
    BufferData {
        target: BufferTarget,
        buffer: Option<u32>,
        len: usize,
    },
    DrawArrays {
        program: Option<u32>,
        vertex_array: Option<u32>,
        first: i32,
        count: i32,
    },
    DrawElements {
        program: Option<u32>,
        vertex_array: Option<u32>,
        indices: Vec<u32>,
    },
    ClearColor([f32; 4]),
    Clear,
    Viewport(i32, i32),
}

struct MockShader {
    stage: ShaderStage,
    source: String,
    compiled: bool,
    log: String,
}

#[derive(Default)]
struct MockProgram {
    attached: Vec<u32>,
    linked: bool,
    log: String,
    uniforms: Vec<String>,
    sources: Option<(String, String)>,
}

#[derive(Default)]
struct MockState {
    next_id: u32,
    fail_creation: bool,
    creations: usize,
    fail_creation_at: Option<usize>,
    silent_logs: bool,
    shaders: HashMap<u32, MockShader>,
    programs: HashMap<u32, MockProgram>,
    vertex_arrays: HashMap<u32, Vec<AttribPointer>>,
    element_bindings: HashMap<u32, u32>,
    buffers: HashMap<u32, Vec<u8>>,
    deleted: HashSet<u32>,
    double_deletes: usize,
    bound_vertex_array: Option<u32>,
    bound_array_buffer: Option<u32>,
    bound_element_buffer: Option<u32>,
    current_program: Option<u32>,
    calls: Vec<Call>,
}

impl MockState {
    fn next_id(&mut self) -> Result<u32, String> {
        self.creations += 1;
        if self.fail_creation || self.fail_creation_at == Some(self.creations) {
            return Err("out of memory".to_string());
        }
        self.next_id += 1;
        Ok(self.next_id)
    }

    fn mark_deleted(&mut self, id: u32) {
        if !self.deleted.insert(id) {
            self.double_deletes += 1;
        }
    }
}

/// Software stand-in for a GL 3.3 context.
///
/// Compilation is a coarse syntax check, linking matches fragment inputs
/// against vertex outputs, and every object is tracked so tests can look for
/// leaks and double deletes.
#[derive(Default)]
pub struct MockGl {
    state: RefCell<MockState>,
}

impl MockGl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_creation(&self, fail: bool) {
        self.state.borrow_mut().fail_creation = fail;
    }

    /// Fails only the `n`th object creation (1-based), counted from now.
    pub fn fail_nth_creation(&self, n: usize) {
        let mut state = self.state.borrow_mut();
        state.creations = 0;
        state.fail_creation_at = Some(n);
    }

    /// Failed compiles and links report an empty, NUL-padded info log.
    pub fn set_silent_logs(&self, silent: bool) {
        self.state.borrow_mut().silent_logs = silent;
    }

    /// `(vertex, fragment)` sources the program was last linked from.
    pub fn linked_sources(&self, program: u32) -> Option<(String, String)> {
        self.state
            .borrow()
            .programs
            .get(&program)
            .and_then(|p| p.sources.clone())
    }

    pub fn live_shaders(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    pub fn live_programs(&self) -> usize {
        self.state.borrow().programs.len()
    }

    pub fn live_buffers(&self) -> usize {
        self.state.borrow().buffers.len()
    }

    pub fn live_vertex_arrays(&self) -> usize {
        self.state.borrow().vertex_arrays.len()
    }

    pub fn double_deletes(&self) -> usize {
        self.state.borrow().double_deletes
    }

    pub fn current_program(&self) -> Option<u32> {
        self.state.borrow().current_program
    }

    pub fn attributes(&self, vertex_array: u32) -> Vec<AttribPointer> {
        self.state
            .borrow()
            .vertex_arrays
            .get(&vertex_array)
            .cloned()
            .unwrap_or_default()
    }

    pub fn buffer_contents(&self, buffer: u32) -> Option<Vec<u8>> {
        self.state.borrow().buffers.get(&buffer).cloned()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    pub fn uniform_writes(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, Call::Uniform { .. }))
            .collect()
    }

    pub fn draws(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, Call::DrawArrays { .. } | Call::DrawElements { .. }))
            .collect()
    }

    fn push(&self, call: Call) {
        self.state.borrow_mut().calls.push(call);
    }
}

/// `(qualifier, type, name)` for every top-level `in`/`out`/`uniform`
/// declaration in `source`.
fn declarations(source: &str) -> Vec<(String, String, String)> {
    source
        .split(|c: char| c == ';' || c == '{' || c == '}')
        .filter_map(|statement| {
            let tokens: Vec<&str> = statement.split_whitespace().collect();
            match tokens.as_slice() {
                [.., qualifier, ty, name]
                    if matches!(*qualifier, "in" | "out" | "uniform") =>
                {
                    Some((qualifier.to_string(), ty.to_string(), name.to_string()))
                }
                _ => None,
            }
        })
        .collect()
}

fn check_syntax(source: &str) -> Result<(), String> {
    if source.trim().is_empty() {
        return Err("0:1(1): error: empty shader source".to_string());
    }
    if let Some(line) = source.lines().position(|l| l.trim_start().starts_with("#error")) {
        return Err(format!("0:{}(1): error: #error directive", line + 1));
    }

    let mut braces = 0i32;
    let mut parens = 0i32;
    for (line_no, line) in source.lines().enumerate() {
        for c in line.chars() {
            match c {
                '{' => braces += 1,
                '}' => braces -= 1,
                '(' => parens += 1,
                ')' => parens -= 1,
                _ => {}
            }
            if braces < 0 || parens < 0 {
                return Err(format!("0:{}(1): error: syntax error, unexpected '{}'", line_no + 1, c));
            }
        }
    }
    if braces != 0 || parens != 0 {
        return Err("0:1(1): error: syntax error, unexpected end of file".to_string());
    }
    Ok(())
}

impl GlApi for MockGl {
    type Shader = u32;
    type Program = u32;
    type UniformLocation = MockUniformLocation;
    type Buffer = u32;
    type VertexArray = u32;

    fn create_shader(&self, stage: ShaderStage) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        let id = state.next_id()?;
        state.shaders.insert(
            id,
            MockShader {
                stage,
                source: String::new(),
                compiled: false,
                log: String::new(),
            },
        );
        Ok(id)
    }

    fn shader_source(&self, shader: u32, source: &str) {
        if let Some(s) = self.state.borrow_mut().shaders.get_mut(&shader) {
            s.source = source.to_string();
        }
    }

    fn compile_shader(&self, shader: u32) {
        let mut state = self.state.borrow_mut();
        let silent = state.silent_logs;
        if let Some(s) = state.shaders.get_mut(&shader) {
            match check_syntax(&s.source) {
                Ok(()) => {
                    s.compiled = true;
                    s.log.clear();
                }
                Err(_) if silent => {
                    s.compiled = false;
                    s.log.clear();
                }
                Err(log) => {
                    s.compiled = false;
                    s.log = log;
                }
            }
        }
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .map_or(false, |s| s.compiled)
    }

    fn shader_info_log(&self, shader: u32) -> String {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .map(|s| s.log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: u32) {
        let mut state = self.state.borrow_mut();
        state.shaders.remove(&shader);
        state.mark_deleted(shader);
    }

    fn create_program(&self) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        let id = state.next_id()?;
        state.programs.insert(id, MockProgram::default());
        Ok(id)
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        if let Some(p) = self.state.borrow_mut().programs.get_mut(&program) {
            p.attached.push(shader);
        }
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        if let Some(p) = self.state.borrow_mut().programs.get_mut(&program) {
            p.attached.retain(|&s| s != shader);
        }
    }

    fn link_program(&self, program: u32) {
        let mut state = self.state.borrow_mut();
        let MockState {
            shaders,
            programs,
            silent_logs,
            ..
        } = &mut *state;
        let Some(p) = programs.get_mut(&program) else {
            return;
        };

        let stage_source = |stage: ShaderStage| {
            p.attached
                .iter()
                .filter_map(|id| shaders.get(id))
                .find(|s| s.stage == stage && s.compiled)
                .map(|s| s.source.clone())
        };
        let sources = stage_source(ShaderStage::Vertex).zip(stage_source(ShaderStage::Fragment));
        let result = match &sources {
            Some((vertex, fragment)) => link_sources(vertex, fragment),
            None => Err("error: both stages must be compiled and attached".to_string()),
        };
        p.sources = sources;

        match result {
            Ok(uniforms) => {
                p.linked = true;
                p.log.clear();
                p.uniforms = uniforms;
            }
            Err(_) if *silent_logs => {
                p.linked = false;
                p.log = "\0\0\0\0".to_string();
                p.uniforms.clear();
            }
            Err(log) => {
                p.linked = false;
                p.log = log;
                p.uniforms.clear();
            }
        }
    }

    fn program_link_status(&self, program: u32) -> bool {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map_or(false, |p| p.linked)
    }

    fn program_info_log(&self, program: u32) -> String {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|p| p.log.clone())
            .unwrap_or_default()
    }

    fn use_program(&self, program: Option<u32>) {
        self.state.borrow_mut().current_program = program;
        self.push(Call::UseProgram(program));
    }

    fn delete_program(&self, program: u32) {
        let mut state = self.state.borrow_mut();
        state.programs.remove(&program);
        if state.current_program == Some(program) {
            state.current_program = None;
        }
        state.mark_deleted(program);
    }

    fn uniform_location(&self, program: u32, name: &str) -> Option<MockUniformLocation> {
        let state = self.state.borrow();
        let p = state.programs.get(&program)?;
        p.uniforms.iter().any(|u| u == name).then(|| MockUniformLocation {
            program,
            name: name.to_string(),
        })
    }

    fn set_uniform(&self, location: &MockUniformLocation, value: &UniformValue) {
        let program = self.state.borrow().current_program;
        self.push(Call::Uniform {
            program,
            location: location.clone(),
            value: *value,
        });
    }

    fn create_vertex_array(&self) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        let id = state.next_id()?;
        state.vertex_arrays.insert(id, Vec::new());
        Ok(id)
    }

    fn bind_vertex_array(&self, vertex_array: Option<u32>) {
        let mut state = self.state.borrow_mut();
        let element_buffer = vertex_array.and_then(|vao| state.element_bindings.get(&vao).copied());
        state.bound_vertex_array = vertex_array;
        state.bound_element_buffer = element_buffer;
    }

    fn delete_vertex_array(&self, vertex_array: u32) {
        let mut state = self.state.borrow_mut();
        state.vertex_arrays.remove(&vertex_array);
        state.element_bindings.remove(&vertex_array);
        if state.bound_vertex_array == Some(vertex_array) {
            state.bound_vertex_array = None;
        }
        state.mark_deleted(vertex_array);
    }

    fn create_buffer(&self) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        let id = state.next_id()?;
        state.buffers.insert(id, Vec::new());
        Ok(id)
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<u32>) {
        let mut state = self.state.borrow_mut();
        match target {
            BufferTarget::Array => state.bound_array_buffer = buffer,
            BufferTarget::ElementArray => {
                state.bound_element_buffer = buffer;
                if let (Some(vao), Some(buffer)) = (state.bound_vertex_array, buffer) {
                    state.element_bindings.insert(vao, buffer);
                }
            }
        }
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8]) {
        let buffer = {
            let mut state = self.state.borrow_mut();
            let buffer = match target {
                BufferTarget::Array => state.bound_array_buffer,
                BufferTarget::ElementArray => state.bound_element_buffer,
            };
            if let Some(contents) = buffer.and_then(|b| state.buffers.get_mut(&b)) {
                *contents = data.to_vec();
            }
            buffer
        };
        self.push(Call::BufferData {
            target,
            buffer,
            len: data.len(),
        });
    }

    fn delete_buffer(&self, buffer: u32) {
        let mut state = self.state.borrow_mut();
        state.buffers.remove(&buffer);
        state.mark_deleted(buffer);
    }

    fn vertex_attrib_pointer_f32(&self, location: u32, components: i32, stride: i32, offset: i32) {
        let mut state = self.state.borrow_mut();
        let buffer = state.bound_array_buffer;
        if let Some(vao) = state.bound_vertex_array {
            if let Some(attribs) = state.vertex_arrays.get_mut(&vao) {
                attribs.retain(|a| a.location != location);
                attribs.push(AttribPointer {
                    location,
                    components,
                    stride,
                    offset,
                    buffer,
                    enabled: false,
                });
            }
        }
    }

    fn enable_vertex_attrib_array(&self, location: u32) {
        let mut state = self.state.borrow_mut();
        if let Some(vao) = state.bound_vertex_array {
            if let Some(attribs) = state.vertex_arrays.get_mut(&vao) {
                for attrib in attribs.iter_mut().filter(|a| a.location == location) {
                    attrib.enabled = true;
                }
            }
        }
    }

    fn draw_arrays(&self, first: i32, count: i32) {
        let (program, vertex_array) = {
            let state = self.state.borrow();
            (state.current_program, state.bound_vertex_array)
        };
        self.push(Call::DrawArrays {
            program,
            vertex_array,
            first,
            count,
        });
    }

    fn draw_elements(&self, count: i32, offset: i32) {
        let (program, vertex_array, indices) = {
            let state = self.state.borrow();
            let bytes = state
                .bound_element_buffer
                .and_then(|b| state.buffers.get(&b))
                .cloned()
                .unwrap_or_default();
            let indices: Vec<u32> = bytes
                .chunks_exact(4)
                .map(|chunk| u32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
                .skip(offset.max(0) as usize / 4)
                .take(count.max(0) as usize)
                .collect();
            (state.current_program, state.bound_vertex_array, indices)
        };
        self.push(Call::DrawElements {
            program,
            vertex_array,
            indices,
        });
    }

    fn clear_color(&self, color: [f32; 4]) {
        self.push(Call::ClearColor(color));
    }

    fn clear(&self) {
        self.push(Call::Clear);
    }

    fn viewport(&self, width: i32, height: i32) {
        self.push(Call::Viewport(width, height));
    }
}

/// Links a compiled vertex/fragment pair, returning the active uniform names.
fn link_sources(vertex: &str, fragment: &str) -> Result<Vec<String>, String> {
    if !vertex.contains("void main") {
        return Err("error: vertex shader lacks `main'".to_string());
    }
    if !fragment.contains("void main") {
        return Err("error: fragment shader lacks `main'".to_string());
    }

    let vertex_decls = declarations(vertex);
    let fragment_decls = declarations(fragment);

    for (_, ty, name) in fragment_decls.iter().filter(|(q, _, _)| q == "in") {
        let matched = vertex_decls
            .iter()
            .any(|(q, t, n)| q == "out" && t == ty && n == name);
        if !matched {
            return Err(format!(
                "error: fragment shader input `{}' has no matching output in the previous stage",
                name
            ));
        }
    }

    let mut uniforms = Vec::new();
    for (_, _, name) in vertex_decls
        .iter()
        .chain(fragment_decls.iter())
        .filter(|(q, _, _)| q == "uniform")
    {
        if !uniforms.contains(name) {
            uniforms.push(name.clone());
        }
    }
    Ok(uniforms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declarations_skip_layout_qualifiers() {
        let decls = declarations("#version 330 core\nlayout (location = 0) in vec3 aPos;\nuniform vec4 ourColor;\nvoid main() { gl_Position = vec4(aPos, 1.0); }");
        assert_eq!(
            decls,
            vec![
                ("in".to_string(), "vec3".to_string(), "aPos".to_string()),
                ("uniform".to_string(), "vec4".to_string(), "ourColor".to_string()),
            ]
        );
    }

    #[test]
    fn test_unbalanced_source_fails() {
        assert!(check_syntax("void main() {").is_err());
        assert!(check_syntax("void main() { }").is_ok());
    }
}
