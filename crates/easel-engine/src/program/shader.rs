use std::num::NonZeroU64;
use std::ops::Range;

use crate::error::{EngineError, EngineResult};
use crate::texture::Texture;

use super::reflect::{AttributeSlot, ProgramInterface, TextureSlot};
use super::uniforms::{UniformBlock, UniformBuffer, UniformField};

/// A compiled and linked program, or the husk of one that failed.
///
/// Pipelines are created lazily per primitive topology by
/// [`prepare`](Self::prepare) and rebuilt when the surface format changes.
pub struct ShaderProgram {
    label: String,
    linked: Option<LinkedProgram>,
}

struct LinkedProgram {
    interface: ProgramInterface,

    vertex: wgpu::ShaderModule,
    vertex_entry: String,
    fragment: wgpu::ShaderModule,
    fragment_entry: String,

    bind_group_layouts: Vec<wgpu::BindGroupLayout>,
    pipeline_layout: wgpu::PipelineLayout,

    pipeline_format: Option<wgpu::TextureFormat>,
    pipelines: Vec<(wgpu::PrimitiveTopology, wgpu::RenderPipeline)>,
}

impl ShaderProgram {
    pub(super) fn unlinked(label: String) -> Self {
        Self {
            label,
            linked: None,
        }
    }

    pub(super) fn linked(
        device: &wgpu::Device,
        label: String,
        interface: ProgramInterface,
        vertex: (wgpu::ShaderModule, String),
        fragment: (wgpu::ShaderModule, String),
    ) -> Self {
        let bind_group_layouts: Vec<wgpu::BindGroupLayout> = (0..interface.group_count())
            .map(|group| {
                device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some(&format!("{label} bgl {group}")),
                    entries: &layout_entries(&interface, group),
                })
            })
            .collect();

        let layout_refs: Vec<&wgpu::BindGroupLayout> = bind_group_layouts.iter().collect();
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{label} pipeline layout")),
            bind_group_layouts: &layout_refs,
            immediate_size: 0,
        });

        Self {
            label,
            linked: Some(LinkedProgram {
                interface,
                vertex: vertex.0,
                vertex_entry: vertex.1,
                fragment: fragment.0,
                fragment_entry: fragment.1,
                bind_group_layouts,
                pipeline_layout,
                pipeline_format: None,
                pipelines: Vec::new(),
            }),
        }
    }

    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[inline]
    pub fn is_linked(&self) -> bool {
        self.linked.is_some()
    }

    pub fn interface(&self) -> EngineResult<&ProgramInterface> {
        self.linked
            .as_ref()
            .map(|l| &l.interface)
            .ok_or_else(|| EngineError::NotReady(format!("program `{}` is not linked", self.label)))
    }

    /// Looks up a vertex attribute by name.
    pub fn attribute(&self, name: &str) -> EngineResult<&AttributeSlot> {
        self.interface()?
            .attribute(name)
            .ok_or_else(|| EngineError::UnknownAttribute {
                program: self.label.clone(),
                name: name.to_string(),
            })
    }

    /// Looks up a member of the uniform block by name.
    pub fn uniform(&self, name: &str) -> EngineResult<&UniformField> {
        self.interface()?
            .uniforms
            .as_ref()
            .and_then(|u| u.field(name))
            .ok_or_else(|| EngineError::UnknownUniform {
                program: self.label.clone(),
                name: name.to_string(),
            })
    }

    pub fn texture(&self, name: &str) -> EngineResult<&TextureSlot> {
        self.interface()?
            .texture(name)
            .ok_or_else(|| EngineError::UnknownTexture {
                program: self.label.clone(),
                name: name.to_string(),
            })
    }

    /// Fresh staging for this program's uniform block, if it has one.
    pub fn uniform_block(&self) -> Option<UniformBlock> {
        let layout = self.linked.as_ref()?.interface.uniforms.as_ref()?;
        Some(UniformBlock::new(self.label.clone(), layout))
    }

    pub fn create_uniform_buffer(&self, device: &wgpu::Device) -> Option<UniformBuffer> {
        self.uniform_block().map(|block| UniformBuffer::new(device, block))
    }

    /// Builds one bind group per layout group.
    ///
    /// Every texture the program declares must be present in `textures`.
    pub fn create_bind_groups(
        &self,
        device: &wgpu::Device,
        uniforms: Option<&UniformBuffer>,
        textures: &[(&str, &Texture)],
    ) -> EngineResult<Vec<wgpu::BindGroup>> {
        let linked = self
            .linked
            .as_ref()
            .ok_or_else(|| EngineError::NotReady(format!("program `{}` is not linked", self.label)))?;
        let iface = &linked.interface;

        if iface.uniforms.is_some() && uniforms.is_none() {
            return Err(EngineError::NotReady(format!(
                "program `{}` needs a uniform buffer",
                self.label
            )));
        }

        let mut bound: Vec<(&TextureSlot, &Texture)> = Vec::with_capacity(iface.textures.len());
        for slot in &iface.textures {
            let tex = textures
                .iter()
                .find(|(name, _)| *name == slot.name)
                .map(|(_, t)| *t)
                .ok_or_else(|| {
                    EngineError::NotReady(format!("texture `{}` is not attached", slot.name))
                })?;
            bound.push((slot, tex));
        }

        let groups = linked
            .bind_group_layouts
            .iter()
            .enumerate()
            .map(|(group, layout)| {
                let group = group as u32;
                let mut entries = Vec::new();

                if let (Some(u), Some(buf)) = (iface.uniforms.as_ref(), uniforms) {
                    if u.group == group {
                        entries.push(wgpu::BindGroupEntry {
                            binding: u.binding,
                            resource: buf.raw().as_entire_binding(),
                        });
                    }
                }
                for (slot, tex) in &bound {
                    if slot.texture.group == group {
                        entries.push(wgpu::BindGroupEntry {
                            binding: slot.texture.binding,
                            resource: wgpu::BindingResource::TextureView(tex.view()),
                        });
                    }
                    if slot.sampler.group == group {
                        entries.push(wgpu::BindGroupEntry {
                            binding: slot.sampler.binding,
                            resource: wgpu::BindingResource::Sampler(tex.sampler()),
                        });
                    }
                }

                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(&format!("{} bind group {group}", self.label)),
                    layout,
                    entries: &entries,
                })
            })
            .collect();

        Ok(groups)
    }

    /// Ensures a pipeline exists for every topology in `topologies`.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        topologies: &[wgpu::PrimitiveTopology],
    ) {
        let Some(linked) = self.linked.as_mut() else { return };

        if linked.pipeline_format != Some(format) {
            linked.pipelines.clear();
            linked.pipeline_format = Some(format);
        }

        for &topology in topologies {
            if linked.pipelines.iter().any(|(t, _)| *t == topology) {
                continue;
            }
            let pipeline = create_pipeline(device, &self.label, linked, format, topology);
            log::debug!("program `{}`: created {topology:?} pipeline", self.label);
            linked.pipelines.push((topology, pipeline));
        }
    }

    /// Records a non-indexed draw of `vertices`.
    ///
    /// Attributes must already be bound (see [`crate::buffer::AttributeBinder`]).
    pub fn draw(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        topology: wgpu::PrimitiveTopology,
        bind_groups: &[wgpu::BindGroup],
        vertices: Range<u32>,
    ) -> EngineResult<()> {
        let linked = self
            .linked
            .as_ref()
            .ok_or_else(|| EngineError::NotReady(format!("program `{}` is not linked", self.label)))?;

        let (_, pipeline) = linked
            .pipelines
            .iter()
            .find(|(t, _)| *t == topology)
            .ok_or_else(|| {
                EngineError::NotReady(format!(
                    "program `{}` has no {topology:?} pipeline; call prepare first",
                    self.label
                ))
            })?;

        pass.set_pipeline(pipeline);
        for (i, group) in bind_groups.iter().enumerate() {
            pass.set_bind_group(i as u32, group, &[]);
        }
        pass.draw(vertices, 0..1);
        Ok(())
    }
}

fn layout_entries(iface: &ProgramInterface, group: u32) -> Vec<wgpu::BindGroupLayoutEntry> {
    let mut entries = Vec::new();

    if let Some(u) = iface.uniforms.as_ref().filter(|u| u.group == group) {
        entries.push(wgpu::BindGroupLayoutEntry {
            binding: u.binding,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: NonZeroU64::new(u64::from(u.size)),
            },
            count: None,
        });
    }

    for t in &iface.textures {
        if t.texture.group == group {
            entries.push(wgpu::BindGroupLayoutEntry {
                binding: t.texture.binding,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            });
        }
        if t.sampler.group == group {
            entries.push(wgpu::BindGroupLayoutEntry {
                binding: t.sampler.binding,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            });
        }
    }

    entries
}

fn create_pipeline(
    device: &wgpu::Device,
    label: &str,
    linked: &LinkedProgram,
    format: wgpu::TextureFormat,
    topology: wgpu::PrimitiveTopology,
) -> wgpu::RenderPipeline {
    // One tightly packed buffer per attribute, as with separate GL array buffers.
    let attributes: Vec<[wgpu::VertexAttribute; 1]> = linked
        .interface
        .attributes
        .iter()
        .map(|a| {
            [wgpu::VertexAttribute {
                format: a.format(),
                offset: 0,
                shader_location: a.location,
            }]
        })
        .collect();

    let buffers: Vec<wgpu::VertexBufferLayout<'_>> = linked
        .interface
        .attributes
        .iter()
        .zip(&attributes)
        .map(|(a, attr)| wgpu::VertexBufferLayout {
            array_stride: a.stride(),
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: attr,
        })
        .collect();

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(&format!("{label} {topology:?} pipeline")),
        layout: Some(&linked.pipeline_layout),

        vertex: wgpu::VertexState {
            module: &linked.vertex,
            entry_point: Some(&linked.vertex_entry),
            compilation_options: Default::default(),
            buffers: &buffers,
        },

        fragment: Some(wgpu::FragmentState {
            module: &linked.fragment,
            entry_point: Some(&linked.fragment_entry),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),

        primitive: wgpu::PrimitiveState {
            topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },

        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}
