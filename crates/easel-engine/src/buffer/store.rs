use wgpu::util::DeviceExt;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct BufferId(u64);

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BufferKind {
    Vertex,
    Uniform,
}

/// How often the contents are expected to change.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum UsageHint {
    /// Written once; any change replaces the buffer.
    Static,
    /// May be rewritten in place when the length is unchanged.
    Dynamic,
}

/// An uploaded sequence of `f32`s.
#[derive(Debug)]
pub struct GpuBuffer {
    id: BufferId,
    raw: wgpu::Buffer,
    len: usize,
    kind: BufferKind,
    usage: UsageHint,
}

impl GpuBuffer {
    #[inline]
    pub fn id(&self) -> BufferId {
        self.id
    }

    #[inline]
    pub fn raw(&self) -> &wgpu::Buffer {
        &self.raw
    }

    /// Number of floats.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn kind(&self) -> BufferKind {
        self.kind
    }

    #[inline]
    pub fn usage(&self) -> UsageHint {
        self.usage
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum UploadPath {
    InPlace,
    Replace,
}

fn upload_path(usage: UsageHint, current_len: usize, new_len: usize) -> UploadPath {
    if usage == UsageHint::Dynamic && current_len == new_len && new_len > 0 {
        UploadPath::InPlace
    } else {
        UploadPath::Replace
    }
}

fn usages(kind: BufferKind, usage: UsageHint) -> wgpu::BufferUsages {
    let base = match kind {
        BufferKind::Vertex => wgpu::BufferUsages::VERTEX,
        BufferKind::Uniform => wgpu::BufferUsages::UNIFORM,
    };
    match usage {
        UsageHint::Static => base,
        UsageHint::Dynamic => base | wgpu::BufferUsages::COPY_DST,
    }
}

/// Creates, replaces and disposes [`GpuBuffer`]s.
///
/// The store keeps no handles: ownership of every created buffer passes to
/// the caller. It only counts live buffers so leaks show up in the log.
#[derive(Debug, Default)]
pub struct BufferStore {
    next_id: u64,
    live: usize,
}

impl BufferStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of buffers created and not yet disposed.
    #[inline]
    pub fn live_count(&self) -> usize {
        self.live
    }

    /// Allocates a buffer holding `data`.
    pub fn create(
        &mut self,
        device: &wgpu::Device,
        kind: BufferKind,
        usage: UsageHint,
        data: &[f32],
    ) -> GpuBuffer {
        let id = BufferId(self.next_id);
        self.next_id += 1;
        self.live += 1;

        let raw = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("easel buffer #{}", id.0)),
            contents: bytemuck::cast_slice(data),
            usage: usages(kind, usage),
        });

        log::trace!("buffer #{} created: {kind:?}/{usage:?}, {} floats", id.0, data.len());

        GpuBuffer {
            id,
            raw,
            len: data.len(),
            kind,
            usage,
        }
    }

    /// Replaces `slot` with a new buffer holding `data` and disposes the old one.
    pub fn replace(&mut self, device: &wgpu::Device, slot: &mut GpuBuffer, data: &[f32]) {
        let fresh = self.create(device, slot.kind, slot.usage, data);
        let old = std::mem::replace(slot, fresh);
        log::debug!("buffer #{} superseded by #{}", old.id.0, slot.id.0);
        self.dispose(old);
    }

    /// Writes `data` into `slot`.
    ///
    /// Dynamic buffers of unchanged length are rewritten in place; anything
    /// else falls back to [`replace`](Self::replace).
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        slot: &mut GpuBuffer,
        data: &[f32],
    ) {
        match upload_path(slot.usage, slot.len, data.len()) {
            UploadPath::InPlace => queue.write_buffer(&slot.raw, 0, bytemuck::cast_slice(data)),
            UploadPath::Replace => self.replace(device, slot, data),
        }
    }

    /// Destroys `buffer`'s GPU memory.
    pub fn dispose(&mut self, buffer: GpuBuffer) {
        buffer.raw.destroy();
        self.live = self.live.saturating_sub(1);
        log::trace!("buffer #{} disposed ({} live)", buffer.id.0, self.live);
    }
}
