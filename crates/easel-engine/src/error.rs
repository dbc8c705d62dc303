//! Engine error types.

use thiserror::Error;

use crate::program::ShaderStage;

pub type EngineResult<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{program}: {stage} shader failed to compile:\n{message}")]
    ShaderCompile {
        program: String,
        stage: ShaderStage,
        message: String,
    },

    #[error("{program}: link failed: {message}")]
    ProgramLink { program: String, message: String },

    #[error("{program}: no vertex attribute named `{name}`")]
    UnknownAttribute { program: String, name: String },

    #[error("{program}: no uniform named `{name}`")]
    UnknownUniform { program: String, name: String },

    #[error("{program}: no texture named `{name}`")]
    UnknownTexture { program: String, name: String },

    #[error("uniform `{name}` holds {capacity} bytes, got {got}")]
    UniformSize {
        name: String,
        capacity: usize,
        got: usize,
    },

    #[error("attribute `{name}`: {len} floats is not a multiple of {components} components")]
    AttributeArity {
        name: String,
        len: usize,
        components: u32,
    },

    #[error("invalid kernel weight {0}: must be finite and non-zero")]
    InvalidKernelWeight(f32),

    #[error("failed to load {what}: {reason}")]
    ResourceLoad { what: String, reason: String },

    #[error("texture data is {got} bytes, expected {expected}")]
    TextureSize { expected: usize, got: usize },

    #[error("texture is {width}x{height}, device allows at most {max} per side")]
    TextureLimit { width: u32, height: u32, max: u32 },

    #[error("not ready: {0}")]
    NotReady(String),
}
