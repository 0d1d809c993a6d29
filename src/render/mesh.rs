use crate::render::gl::{BufferTarget, GlApi};
use log::debug;
use std::mem::size_of;
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MeshError {
    #[error("Vertex layout has no attributes")]
    EmptyLayout,
    #[error("{len} floats of vertex data do not divide into {stride}-float vertices")]
    MisalignedVertices { len: usize, stride: usize },
    #[error("Index {index} is out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },
    #[error("Failed to create {object}: {message}")]
    Create {
        object: &'static str,
        message: String,
    },
}

/// Owned vertex array object, deleted on drop.
pub struct VertexArray<G: GlApi> {
    gl: Rc<G>,
    id: G::VertexArray,
}

impl<G: GlApi> VertexArray<G> {
    pub fn new(gl: &Rc<G>) -> Result<Self, MeshError> {
        let id = gl.create_vertex_array().map_err(|message| MeshError::Create {
            object: "vertex array",
            message,
        })?;
        Ok(Self {
            gl: Rc::clone(gl),
            id,
        })
    }

    pub fn id(&self) -> G::VertexArray {
        self.id
    }

    pub fn bind(&self) {
        self.gl.bind_vertex_array(Some(self.id));
    }
}

impl<G: GlApi> Drop for VertexArray<G> {
    fn drop(&mut self) {
        self.gl.delete_vertex_array(self.id);
    }
}

/// Owned buffer object bound to one target, deleted on drop.
pub struct Buffer<G: GlApi> {
    gl: Rc<G>,
    id: G::Buffer,
    target: BufferTarget,
}

impl<G: GlApi> Buffer<G> {
    pub fn new(gl: &Rc<G>, target: BufferTarget) -> Result<Self, MeshError> {
        let id = gl.create_buffer().map_err(|message| MeshError::Create {
            object: "buffer",
            message,
        })?;
        Ok(Self {
            gl: Rc::clone(gl),
            id,
            target,
        })
    }

    pub fn id(&self) -> G::Buffer {
        self.id
    }

    /// Binds the buffer and replaces its contents.
    pub fn upload(&self, data: &[u8]) {
        self.gl.bind_buffer(self.target, Some(self.id));
        self.gl.buffer_data(self.target, data);
    }
}

impl<G: GlApi> Drop for Buffer<G> {
    fn drop(&mut self) {
        self.gl.delete_buffer(self.id);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    pub location: u32,
    pub components: usize,
}

/// Tightly packed float attributes, in buffer order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexLayout {
    attributes: Vec<VertexAttribute>,
}

impl VertexLayout {
    pub fn new(attributes: Vec<VertexAttribute>) -> Self {
        Self { attributes }
    }

    /// `vec3` position at location 0.
    pub fn position() -> Self {
        Self::new(vec![VertexAttribute {
            location: 0,
            components: 3,
        }])
    }

    /// `vec3` position at location 0 followed by `vec3` color at location 1.
    pub fn position_color() -> Self {
        Self::new(vec![
            VertexAttribute {
                location: 0,
                components: 3,
            },
            VertexAttribute {
                location: 1,
                components: 3,
            },
        ])
    }

    /// Floats per vertex.
    pub fn stride(&self) -> usize {
        self.attributes.iter().map(|a| a.components).sum()
    }

    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DrawCall {
    Arrays { count: i32 },
    Elements { count: i32 },
}

/// Vertex array + vertex buffer + optional index buffer, drawn as triangles.
pub struct Mesh<G: GlApi> {
    gl: Rc<G>,
    vertex_array: VertexArray<G>,
    vertex_buffer: Buffer<G>,
    index_buffer: Option<Buffer<G>>,
    vertex_count: usize,
    draw: DrawCall,
}

impl<G: GlApi> Mesh<G> {
    /// Mesh drawn with `draw_arrays` over every vertex.
    pub fn new(gl: &Rc<G>, vertices: &[f32], layout: &VertexLayout) -> Result<Self, MeshError> {
        Self::upload(gl, vertices, None, layout)
    }

    /// Mesh drawn with `draw_elements` over `indices`.
    pub fn indexed(
        gl: &Rc<G>,
        vertices: &[f32],
        indices: &[u32],
        layout: &VertexLayout,
    ) -> Result<Self, MeshError> {
        Self::upload(gl, vertices, Some(indices), layout)
    }

    fn upload(
        gl: &Rc<G>,
        vertices: &[f32],
        indices: Option<&[u32]>,
        layout: &VertexLayout,
    ) -> Result<Self, MeshError> {
        let stride = layout.stride();
        if stride == 0 {
            return Err(MeshError::EmptyLayout);
        }
        if vertices.len() % stride != 0 {
            return Err(MeshError::MisalignedVertices {
                len: vertices.len(),
                stride,
            });
        }
        let vertex_count = vertices.len() / stride;
        if let Some(&index) = indices.and_then(|i| i.iter().find(|&&i| i as usize >= vertex_count)) {
            return Err(MeshError::IndexOutOfRange {
                index,
                vertex_count,
            });
        }

        let vertex_array = VertexArray::new(gl)?;
        vertex_array.bind();

        let vertex_buffer = Buffer::new(gl, BufferTarget::Array)?;
        vertex_buffer.upload(bytemuck::cast_slice(vertices));

        let index_buffer = match indices {
            Some(indices) => {
                let buffer = Buffer::new(gl, BufferTarget::ElementArray)?;
                buffer.upload(bytemuck::cast_slice(indices));
                Some(buffer)
            }
            None => None,
        };

        let stride_bytes = (stride * size_of::<f32>()) as i32;
        let mut offset = 0;
        for attribute in layout.attributes() {
            gl.vertex_attrib_pointer_f32(
                attribute.location,
                attribute.components as i32,
                stride_bytes,
                (offset * size_of::<f32>()) as i32,
            );
            gl.enable_vertex_attrib_array(attribute.location);
            offset += attribute.components;
        }

        // the element binding is vertex array state, so only the array buffer is unbound
        gl.bind_buffer(BufferTarget::Array, None);
        gl.bind_vertex_array(None);

        let draw = match indices {
            Some(indices) => DrawCall::Elements {
                count: indices.len() as i32,
            },
            None => DrawCall::Arrays {
                count: vertex_count as i32,
            },
        };
        debug!("Uploaded mesh: {} vertices, {:?}", vertex_count, draw);

        Ok(Self {
            gl: Rc::clone(gl),
            vertex_array,
            vertex_buffer,
            index_buffer,
            vertex_count,
            draw,
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn is_indexed(&self) -> bool {
        self.index_buffer.is_some()
    }

    pub fn vertex_array(&self) -> &VertexArray<G> {
        &self.vertex_array
    }

    pub fn vertex_buffer(&self) -> &Buffer<G> {
        &self.vertex_buffer
    }

    /// Binds the vertex array and issues the draw call. The caller activates
    /// the program first.
    pub fn draw(&self) {
        self.vertex_array.bind();
        match self.draw {
            DrawCall::Arrays { count } => self.gl.draw_arrays(0, count),
            DrawCall::Elements { count } => self.gl.draw_elements(count, 0),
        }
    }
}
