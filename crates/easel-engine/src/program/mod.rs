//! Shader programs: per-stage compilation, linking, and name-keyed lookup.
//!
//! WGSL is parsed and validated with `naga` before anything reaches the
//! device, so a broken shader is reported through the log and yields an
//! unlinked [`ShaderProgram`] instead of a device error.

mod builder;
mod reflect;
mod shader;
mod uniforms;

use std::fmt;

pub use builder::ProgramBuilder;
pub use reflect::{AttributeSlot, ProgramInterface, ResourceSlot, TextureSlot};
pub use shader::ShaderProgram;
pub use uniforms::{UniformBlock, UniformBuffer, UniformField, UniformLayout};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    fn to_naga(self) -> naga::ShaderStage {
        match self {
            ShaderStage::Vertex => naga::ShaderStage::Vertex,
            ShaderStage::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        })
    }
}
