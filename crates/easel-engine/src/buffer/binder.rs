use crate::error::{EngineError, EngineResult};
use crate::program::ShaderProgram;

use super::store::{BufferKind, GpuBuffer};

/// Binds vertex buffers to program attributes by name.
pub struct AttributeBinder;

impl AttributeBinder {
    /// Binds `buffer` to the vertex slot of attribute `name`.
    ///
    /// Returns the number of vertices the buffer holds for that attribute.
    /// An empty buffer binds nothing and yields zero.
    pub fn bind(
        pass: &mut wgpu::RenderPass<'_>,
        program: &ShaderProgram,
        name: &str,
        buffer: &GpuBuffer,
    ) -> EngineResult<u32> {
        let attr = program.attribute(name)?;
        let count = vertex_count(name, buffer.kind(), buffer.len(), attr.components)?;
        if count > 0 {
            pass.set_vertex_buffer(attr.slot, buffer.raw().slice(..));
        }
        Ok(count)
    }
}

fn vertex_count(name: &str, kind: BufferKind, len: usize, components: u32) -> EngineResult<u32> {
    if kind != BufferKind::Vertex || components == 0 || len % components as usize != 0 {
        return Err(EngineError::AttributeArity {
            name: name.to_string(),
            len,
            components,
        });
    }
    Ok((len / components as usize) as u32)
}
