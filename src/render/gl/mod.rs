// gl - the slice of OpenGL the shader program and scenes call through

use crate::render::shaders::ShaderStage;
use crate::render::uniform::UniformValue;
use glow::HasContext;
use std::fmt::Debug;

#[cfg(test)]
pub mod mock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferTarget {
    Array,
    ElementArray,
}

impl BufferTarget {
    fn to_gl(self) -> u32 {
        match self {
            Self::Array => glow::ARRAY_BUFFER,
            Self::ElementArray => glow::ELEMENT_ARRAY_BUFFER,
        }
    }
}

/// Graphics API surface used by this crate.
///
/// Every call requires the owning context to be current on the calling thread.
/// Handles returned by one implementation are only meaningful to that same
/// context.
pub trait GlApi {
    type Shader: Copy + Debug;
    type Program: Copy + Debug + PartialEq;
    type UniformLocation: Clone + Debug;
    type Buffer: Copy + Debug;
    type VertexArray: Copy + Debug;

    // Shader stages
    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String>;
    fn shader_source(&self, shader: Self::Shader, source: &str);
    fn compile_shader(&self, shader: Self::Shader);
    fn shader_compile_status(&self, shader: Self::Shader) -> bool;
    /// Driver log, sized from the driver-reported length.
    fn shader_info_log(&self, shader: Self::Shader) -> String;
    fn delete_shader(&self, shader: Self::Shader);

    // Programs
    fn create_program(&self) -> Result<Self::Program, String>;
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn detach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn link_program(&self, program: Self::Program);
    fn program_link_status(&self, program: Self::Program) -> bool;
    fn program_info_log(&self, program: Self::Program) -> String;
    fn use_program(&self, program: Option<Self::Program>);
    fn delete_program(&self, program: Self::Program);

    // Uniforms
    fn uniform_location(&self, program: Self::Program, name: &str) -> Option<Self::UniformLocation>;
    fn set_uniform(&self, location: &Self::UniformLocation, value: &UniformValue);

    // Buffers and vertex arrays
    fn create_vertex_array(&self) -> Result<Self::VertexArray, String>;
    fn bind_vertex_array(&self, vertex_array: Option<Self::VertexArray>);
    fn delete_vertex_array(&self, vertex_array: Self::VertexArray);
    fn create_buffer(&self) -> Result<Self::Buffer, String>;
    fn bind_buffer(&self, target: BufferTarget, buffer: Option<Self::Buffer>);
    fn buffer_data(&self, target: BufferTarget, data: &[u8]);
    fn delete_buffer(&self, buffer: Self::Buffer);
    fn vertex_attrib_pointer_f32(&self, location: u32, components: i32, stride: i32, offset: i32);
    fn enable_vertex_attrib_array(&self, location: u32);

    // Drawing
    fn draw_arrays(&self, first: i32, count: i32);
    fn draw_elements(&self, count: i32, offset: i32);
    fn clear_color(&self, color: [f32; 4]);
    fn clear(&self);
    fn viewport(&self, width: i32, height: i32);
}

impl GlApi for glow::Context {
    type Shader = <glow::Context as HasContext>::Shader;
    type Program = <glow::Context as HasContext>::Program;
    type UniformLocation = <glow::Context as HasContext>::UniformLocation;
    type Buffer = <glow::Context as HasContext>::Buffer;
    type VertexArray = <glow::Context as HasContext>::VertexArray;

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String> {
        let shader_type = match stage {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        };
        unsafe { HasContext::create_shader(self, shader_type) }
    }

    fn shader_source(&self, shader: Self::Shader, source: &str) {
        unsafe { HasContext::shader_source(self, shader, source) }
    }

    fn compile_shader(&self, shader: Self::Shader) {
        unsafe { HasContext::compile_shader(self, shader) }
    }

    fn shader_compile_status(&self, shader: Self::Shader) -> bool {
        unsafe { self.get_shader_compile_status(shader) }
    }

    fn shader_info_log(&self, shader: Self::Shader) -> String {
        // glow queries INFO_LOG_LENGTH and allocates exactly that much
        unsafe { self.get_shader_info_log(shader) }
    }

    fn delete_shader(&self, shader: Self::Shader) {
        unsafe { HasContext::delete_shader(self, shader) }
    }

    fn create_program(&self) -> Result<Self::Program, String> {
        unsafe { HasContext::create_program(self) }
    }

    fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { HasContext::attach_shader(self, program, shader) }
    }

    fn detach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { HasContext::detach_shader(self, program, shader) }
    }

    fn link_program(&self, program: Self::Program) {
        unsafe { HasContext::link_program(self, program) }
    }

    fn program_link_status(&self, program: Self::Program) -> bool {
        unsafe { self.get_program_link_status(program) }
    }

    fn program_info_log(&self, program: Self::Program) -> String {
        unsafe { self.get_program_info_log(program) }
    }

    fn use_program(&self, program: Option<Self::Program>) {
        unsafe { HasContext::use_program(self, program) }
    }

    fn delete_program(&self, program: Self::Program) {
        unsafe { HasContext::delete_program(self, program) }
    }

    fn uniform_location(&self, program: Self::Program, name: &str) -> Option<Self::UniformLocation> {
        unsafe { self.get_uniform_location(program, name) }
    }

    fn set_uniform(&self, location: &Self::UniformLocation, value: &UniformValue) {
        let location = Some(location);
        unsafe {
            match *value {
                UniformValue::Int(v) => self.uniform_1_i32(location, v),
                UniformValue::Float(v) => self.uniform_1_f32(location, v),
                UniformValue::Vec2(v) => self.uniform_2_f32(location, v.x, v.y),
                UniformValue::Vec3(v) => self.uniform_3_f32(location, v.x, v.y, v.z),
                UniformValue::Vec4(v) => self.uniform_4_f32(location, v.x, v.y, v.z, v.w),
                UniformValue::Mat4(m) => {
                    self.uniform_matrix_4_f32_slice(location, false, &m.to_cols_array())
                }
            }
        }
    }

    fn create_vertex_array(&self) -> Result<Self::VertexArray, String> {
        unsafe { HasContext::create_vertex_array(self) }
    }

    fn bind_vertex_array(&self, vertex_array: Option<Self::VertexArray>) {
        unsafe { HasContext::bind_vertex_array(self, vertex_array) }
    }

    fn delete_vertex_array(&self, vertex_array: Self::VertexArray) {
        unsafe { HasContext::delete_vertex_array(self, vertex_array) }
    }

    fn create_buffer(&self) -> Result<Self::Buffer, String> {
        unsafe { HasContext::create_buffer(self) }
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<Self::Buffer>) {
        unsafe { HasContext::bind_buffer(self, target.to_gl(), buffer) }
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8]) {
        unsafe { self.buffer_data_u8_slice(target.to_gl(), data, glow::STATIC_DRAW) }
    }

    fn delete_buffer(&self, buffer: Self::Buffer) {
        unsafe { HasContext::delete_buffer(self, buffer) }
    }

    fn vertex_attrib_pointer_f32(&self, location: u32, components: i32, stride: i32, offset: i32) {
        unsafe {
            HasContext::vertex_attrib_pointer_f32(
                self,
                location,
                components,
                glow::FLOAT,
                false,
                stride,
                offset,
            )
        }
    }

    fn enable_vertex_attrib_array(&self, location: u32) {
        unsafe { HasContext::enable_vertex_attrib_array(self, location) }
    }

    fn draw_arrays(&self, first: i32, count: i32) {
        unsafe { HasContext::draw_arrays(self, glow::TRIANGLES, first, count) }
    }

    fn draw_elements(&self, count: i32, offset: i32) {
        unsafe { HasContext::draw_elements(self, glow::TRIANGLES, count, glow::UNSIGNED_INT, offset) }
    }

    fn clear_color(&self, color: [f32; 4]) {
        let [r, g, b, a] = color;
        unsafe { HasContext::clear_color(self, r, g, b, a) }
    }

    fn clear(&self) {
        unsafe { HasContext::clear(self, glow::COLOR_BUFFER_BIT) }
    }

    fn viewport(&self, width: i32, height: i32) {
        unsafe { HasContext::viewport(self, 0, 0, width, height) }
    }
}
