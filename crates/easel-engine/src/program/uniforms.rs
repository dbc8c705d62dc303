use crate::error::{EngineError, EngineResult};

/// One member of a uniform struct, located by byte offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformField {
    pub name: String,
    pub offset: u32,
    pub size: u32,
}

impl UniformField {
    pub fn new(name: impl Into<String>, offset: u32, size: u32) -> Self {
        Self {
            name: name.into(),
            offset,
            size,
        }
    }
}

/// Reflected layout of a program's uniform block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformLayout {
    /// Name of the WGSL global.
    pub name: String,
    pub group: u32,
    pub binding: u32,
    /// Total byte size of the block.
    pub size: u32,
    pub fields: Vec<UniformField>,
}

impl UniformLayout {
    pub fn field(&self, name: &str) -> Option<&UniformField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// CPU-side staging for a uniform block.
///
/// Writes are addressed by member name and must match the member size exactly.
/// The block tracks whether it changed since the last upload.
#[derive(Debug, Clone)]
pub struct UniformBlock {
    program: String,
    layout: UniformLayout,
    bytes: Vec<u8>,
    dirty: bool,
}

impl UniformBlock {
    pub fn new(program: impl Into<String>, layout: &UniformLayout) -> Self {
        Self {
            program: program.into(),
            layout: layout.clone(),
            bytes: vec![0; layout.size as usize],
            dirty: true,
        }
    }

    #[inline]
    pub fn layout(&self) -> &UniformLayout {
        &self.layout
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns the dirty flag and clears it.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    pub fn set_bytes(&mut self, name: &str, data: &[u8]) -> EngineResult<()> {
        let field = self
            .layout
            .field(name)
            .ok_or_else(|| EngineError::UnknownUniform {
                program: self.program.clone(),
                name: name.to_string(),
            })?;

        if data.len() != field.size as usize {
            return Err(EngineError::UniformSize {
                name: name.to_string(),
                capacity: field.size as usize,
                got: data.len(),
            });
        }

        let start = field.offset as usize;
        let dst = &mut self.bytes[start..start + data.len()];
        if dst != data {
            dst.copy_from_slice(data);
            self.dirty = true;
        }
        Ok(())
    }

    pub fn set_f32(&mut self, name: &str, value: f32) -> EngineResult<()> {
        self.set_bytes(name, bytemuck::bytes_of(&value))
    }

    pub fn set_u32(&mut self, name: &str, value: u32) -> EngineResult<()> {
        self.set_bytes(name, bytemuck::bytes_of(&value))
    }

    pub fn set_f32s(&mut self, name: &str, values: &[f32]) -> EngineResult<()> {
        self.set_bytes(name, bytemuck::cast_slice(values))
    }
}

/// A [`UniformBlock`] paired with the GPU buffer it uploads into.
pub struct UniformBuffer {
    block: UniformBlock,
    raw: wgpu::Buffer,
}

impl UniformBuffer {
    pub fn new(device: &wgpu::Device, block: UniformBlock) -> Self {
        let raw = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("easel uniform buffer"),
            size: u64::from(block.layout().size.max(16)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self { block, raw }
    }

    #[inline]
    pub fn block(&self) -> &UniformBlock {
        &self.block
    }

    #[inline]
    pub fn block_mut(&mut self) -> &mut UniformBlock {
        &mut self.block
    }

    #[inline]
    pub fn raw(&self) -> &wgpu::Buffer {
        &self.raw
    }

    /// Uploads staged bytes if anything changed since the last flush.
    pub fn flush(&mut self, queue: &wgpu::Queue) {
        if self.block.take_dirty() {
            queue.write_buffer(&self.raw, 0, self.block.bytes());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn color_layout() -> UniformLayout {
        UniformLayout {
            name: "style".into(),
            group: 0,
            binding: 0,
            size: 32,
            fields: vec![
                UniformField::new("color", 0, 16),
                UniformField::new("scale", 16, 4),
                UniformField::new("index", 20, 4),
            ],
        }
    }

    #[test]
    fn new_block_is_zeroed_and_dirty() {
        let block = UniformBlock::new("p", &color_layout());
        assert_eq!(block.bytes(), &[0u8; 32][..]);
        assert!(block.is_dirty());
    }

    #[test]
    fn writes_land_at_member_offset() {
        let mut block = UniformBlock::new("p", &color_layout());
        block.set_f32s("color", &[1.0, 0.5, 0.25, 1.0]).unwrap();
        block.set_f32("scale", 3.0).unwrap();
        block.set_u32("index", 7).unwrap();

        let word = |o: usize| -> [u8; 4] { block.bytes()[o..o + 4].try_into().unwrap() };
        let floats: Vec<f32> = (0..5).map(|i| f32::from_ne_bytes(word(i * 4))).collect();
        assert_eq!(floats, [1.0, 0.5, 0.25, 1.0, 3.0]);
        assert_eq!(u32::from_ne_bytes(word(20)), 7);
    }

    #[test]
    fn unknown_member_is_an_error() {
        let mut block = UniformBlock::new("p", &color_layout());
        match block.set_f32("missing", 1.0) {
            Err(EngineError::UnknownUniform { program, name }) => {
                assert_eq!(program, "p");
                assert_eq!(name, "missing");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn size_mismatch_is_an_error() {
        let mut block = UniformBlock::new("p", &color_layout());
        let err = block.set_f32s("color", &[1.0, 0.0, 0.0]).unwrap_err();
        assert!(matches!(
            err,
            EngineError::UniformSize { capacity: 16, got: 12, .. }
        ));
    }

    #[test]
    fn identical_write_does_not_mark_dirty() {
        let mut block = UniformBlock::new("p", &color_layout());
        block.set_f32("scale", 2.0).unwrap();
        assert!(block.take_dirty());
        assert!(!block.is_dirty());

        block.set_f32("scale", 2.0).unwrap();
        assert!(!block.is_dirty());

        block.set_f32("scale", 2.5).unwrap();
        assert!(block.is_dirty());
    }
}
