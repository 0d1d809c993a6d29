use crate::render::shaders::ShaderError;
use std::fs;
use std::path::Path;

/// Vertex + fragment source text for one program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    pub vertex: String,
    pub fragment: String,
}

impl ShaderSource {
    pub fn new(vertex: &str, fragment: &str) -> Self {
        Self {
            vertex: vertex.to_string(),
            fragment: fragment.to_string(),
        }
    }

    /// Reads both stages from disk.
    pub fn from_files<P: AsRef<Path>, Q: AsRef<Path>>(
        vertex_path: P,
        fragment_path: Q,
    ) -> Result<Self, ShaderError> {
        Ok(Self {
            vertex: read_stage(vertex_path.as_ref())?,
            fragment: read_stage(fragment_path.as_ref())?,
        })
    }
}

fn read_stage(path: &Path) -> Result<String, ShaderError> {
    log::debug!("Loading shader source {:?}", path);
    fs::read_to_string(path).map_err(|source| ShaderError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub const BLUE: [f32; 4] = [0.45, 0.64, 0.98, 1.0];
pub const ORANGE: [f32; 4] = [1.0, 0.5, 0.2, 1.0];
pub const YELLOW: [f32; 4] = [1.0, 1.0, 0.0, 1.0];

/// Passes `aPos` (location 0) straight through.
pub const POSITION_VERTEX: &str = "#version 330 core
layout (location = 0) in vec3 aPos;
void main()
{
   gl_Position = vec4(aPos.x, aPos.y, aPos.z, 1.0);
}
";

pub const BLUE_FRAGMENT: &str = "#version 330 core
out vec4 FragColor;
void main()
{
   FragColor = vec4(0.45f, 0.64f, 0.98f, 1.0f);
}
";

pub const ORANGE_FRAGMENT: &str = "#version 330 core
out vec4 FragColor;
void main()
{
   FragColor = vec4(1.0f, 0.5f, 0.2f, 1.0f);
}
";

pub const YELLOW_FRAGMENT: &str = "#version 330 core
out vec4 FragColor;
void main()
{
   FragColor = vec4(1.0f, 1.0f, 0.0f, 1.0f);
}
";

/// Position at location 0, color at location 1, color forwarded as `vertexColor`.
pub const COLOR_VERTEX: &str = "#version 330 core
layout (location = 0) in vec3 aPos;
layout (location = 1) in vec3 aColor;
out vec3 vertexColor;
void main()
{
   gl_Position = vec4(aPos, 1.0);
   vertexColor = aColor;
}
";

pub const COLOR_FRAGMENT: &str = "#version 330 core
out vec4 FragColor;
in vec3 vertexColor;
void main()
{
   FragColor = vec4(vertexColor, 1.0);
}
";

pub const UNIFORM_COLOR_FRAGMENT: &str = "#version 330 core
out vec4 FragColor;
uniform vec4 ourColor;
void main()
{
   FragColor = ourColor;
}
";

pub const FALLBACK_VERTEX: &str = POSITION_VERTEX;

pub const FALLBACK_FRAGMENT: &str = "#version 330 core
out vec4 FragColor;
void main()
{
   FragColor = vec4(1.0, 0.0, 1.0, 1.0);
}
";

pub const VERTEX_COLORS_VS: &str = "vertex_colors.vs";
pub const VERTEX_COLORS_FS: &str = "vertex_colors.fs";
