//! Name-keyed interface reflection over parsed WGSL.

use naga::{AddressSpace, Binding, Handle, Module, ScalarKind, Type, TypeInner};

use crate::error::{EngineError, EngineResult};

use super::ShaderStage;
use super::uniforms::{UniformField, UniformLayout};

/// A `@location` value crossing a stage boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Varying {
    pub name: String,
    pub location: u32,
    /// `(kind, byte width, component count)`, `None` for non-vector types.
    pub shape: Option<(ScalarKind, u8, u32)>,
}

/// `@group/@binding` pair of a resource global.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ResourceSlot {
    pub group: u32,
    pub binding: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedResource {
    pub name: String,
    pub slot: ResourceSlot,
}

/// Everything one entry point exposes.
#[derive(Debug, Clone, Default)]
pub struct StageInterface {
    pub inputs: Vec<Varying>,
    pub outputs: Vec<Varying>,
    pub uniforms: Vec<UniformLayout>,
    pub textures: Vec<NamedResource>,
    pub samplers: Vec<NamedResource>,
}

/// Vertex attribute resolved to a vertex-buffer slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSlot {
    pub name: String,
    pub location: u32,
    pub components: u32,
    /// Index passed to `set_vertex_buffer`.
    pub slot: u32,
}

impl AttributeSlot {
    pub fn format(&self) -> wgpu::VertexFormat {
        match self.components {
            1 => wgpu::VertexFormat::Float32,
            2 => wgpu::VertexFormat::Float32x2,
            3 => wgpu::VertexFormat::Float32x3,
            _ => wgpu::VertexFormat::Float32x4,
        }
    }

    /// Bytes per vertex in a tightly packed buffer.
    pub fn stride(&self) -> u64 {
        u64::from(self.components) * 4
    }
}

/// A sampled texture and the sampler paired with it by name (`<name>_sampler`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureSlot {
    pub name: String,
    pub texture: ResourceSlot,
    pub sampler: ResourceSlot,
}

/// Linked interface of a vertex + fragment pair.
#[derive(Debug, Clone, Default)]
pub struct ProgramInterface {
    pub attributes: Vec<AttributeSlot>,
    pub uniforms: Option<UniformLayout>,
    pub textures: Vec<TextureSlot>,
}

impl ProgramInterface {
    pub fn attribute(&self, name: &str) -> Option<&AttributeSlot> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn texture(&self, name: &str) -> Option<&TextureSlot> {
        self.textures.iter().find(|t| t.name == name)
    }

    /// Highest bind group index in use, plus one.
    pub fn group_count(&self) -> u32 {
        let uniform = self.uniforms.iter().map(|u| u.group);
        let textures = self
            .textures
            .iter()
            .flat_map(|t| [t.texture.group, t.sampler.group]);
        uniform.chain(textures).map(|g| g + 1).max().unwrap_or(0)
    }
}

/// Parses and validates one stage.
pub fn parse_stage(program: &str, stage: ShaderStage, source: &str) -> EngineResult<Module> {
    let compile_error = |message: String| EngineError::ShaderCompile {
        program: program.to_string(),
        stage,
        message,
    };

    let module =
        naga::front::wgsl::parse_str(source).map_err(|e| compile_error(e.emit_to_string(source)))?;

    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    )
    .validate(&module)
    .map_err(|e| compile_error(e.emit_to_string(source)))?;

    Ok(module)
}

/// Collects the interface of entry point `entry`, which must be a `stage` entry point.
pub fn reflect_stage(
    program: &str,
    module: &Module,
    stage: ShaderStage,
    entry: &str,
) -> EngineResult<StageInterface> {
    let ep = module
        .entry_points
        .iter()
        .find(|ep| ep.name == entry)
        .ok_or_else(|| link_error(program, format!("no entry point `{entry}` in {stage} shader")))?;

    if ep.stage != stage.to_naga() {
        return Err(link_error(
            program,
            format!("entry point `{entry}` is not a {stage} entry point"),
        ));
    }

    let mut iface = StageInterface::default();

    for arg in &ep.function.arguments {
        collect_varyings(module, arg.name.as_deref(), arg.ty, arg.binding.as_ref(), &mut iface.inputs);
    }
    if let Some(result) = &ep.function.result {
        collect_varyings(module, None, result.ty, result.binding.as_ref(), &mut iface.outputs);
    }

    for (_, var) in module.global_variables.iter() {
        let Some(rb) = var.binding.as_ref() else { continue };
        let name = var.name.clone().unwrap_or_default();
        let slot = ResourceSlot {
            group: rb.group,
            binding: rb.binding,
        };

        match var.space {
            AddressSpace::Uniform => iface.uniforms.push(uniform_layout(module, name, slot, var.ty)),
            AddressSpace::Handle => match module.types[var.ty].inner {
                TypeInner::Image { .. } => iface.textures.push(NamedResource { name, slot }),
                TypeInner::Sampler { .. } => iface.samplers.push(NamedResource { name, slot }),
                _ => {}
            },
            _ => {}
        }
    }

    Ok(iface)
}

/// Checks that `vertex` and `fragment` fit together and resolves vertex slots.
pub fn link(
    program: &str,
    vertex: &StageInterface,
    fragment: &StageInterface,
) -> EngineResult<ProgramInterface> {
    // Vertex attributes: f32 scalars/vectors only, slot order follows location order.
    let mut inputs = vertex.inputs.clone();
    inputs.sort_by_key(|v| v.location);

    let mut attributes = Vec::with_capacity(inputs.len());
    for (slot, input) in inputs.into_iter().enumerate() {
        let components = match input.shape {
            Some((ScalarKind::Float, 4, n)) => n,
            _ => {
                return Err(link_error(
                    program,
                    format!("attribute `{}` must be an f32 scalar or vector", input.name),
                ));
            }
        };
        attributes.push(AttributeSlot {
            name: input.name,
            location: input.location,
            components,
            slot: slot as u32,
        });
    }

    if !fragment.outputs.iter().any(|o| o.location == 0) {
        return Err(link_error(program, "fragment stage writes no @location(0) colour"));
    }

    for input in &fragment.inputs {
        let written = vertex.outputs.iter().find(|o| o.location == input.location);
        match written {
            None => {
                return Err(link_error(
                    program,
                    format!(
                        "fragment input `{}` (location {}) is not written by the vertex stage",
                        input.name, input.location
                    ),
                ));
            }
            Some(out) if out.shape != input.shape => {
                return Err(link_error(
                    program,
                    format!("varying at location {} changes type between stages", input.location),
                ));
            }
            Some(_) => {}
        }
    }

    let uniforms = merge_uniforms(program, &vertex.uniforms, &fragment.uniforms)?;
    let textures = merge_named(&vertex.textures, &fragment.textures);
    let samplers = merge_named(&vertex.samplers, &fragment.samplers);

    let mut paired = Vec::with_capacity(textures.len());
    for tex in &textures {
        let sampler_name = format!("{}_sampler", tex.name);
        let sampler = samplers
            .iter()
            .find(|s| s.name == sampler_name)
            .ok_or_else(|| link_error(program, format!("texture `{}` has no `{sampler_name}`", tex.name)))?;
        paired.push(TextureSlot {
            name: tex.name.clone(),
            texture: tex.slot,
            sampler: sampler.slot,
        });
    }
    if let Some(orphan) = samplers
        .iter()
        .find(|s| !paired.iter().any(|t| t.sampler == s.slot))
    {
        return Err(link_error(program, format!("sampler `{}` has no matching texture", orphan.name)));
    }

    let mut slots: Vec<ResourceSlot> = uniforms.iter().map(|u| ResourceSlot {
        group: u.group,
        binding: u.binding,
    }).collect();
    slots.extend(paired.iter().flat_map(|t| [t.texture, t.sampler]));
    for (i, a) in slots.iter().enumerate() {
        if slots[i + 1..].contains(a) {
            return Err(link_error(
                program,
                format!("two resources share @group({}) @binding({})", a.group, a.binding),
            ));
        }
    }

    Ok(ProgramInterface {
        attributes,
        uniforms,
        textures: paired,
    })
}

fn link_error(program: &str, message: impl Into<String>) -> EngineError {
    EngineError::ProgramLink {
        program: program.to_string(),
        message: message.into(),
    }
}

fn collect_varyings(
    module: &Module,
    name: Option<&str>,
    ty: Handle<Type>,
    binding: Option<&Binding>,
    out: &mut Vec<Varying>,
) {
    match binding {
        Some(Binding::Location { location, .. }) => out.push(Varying {
            name: name.unwrap_or_default().to_string(),
            location: *location,
            shape: vector_shape(&module.types[ty].inner),
        }),
        Some(Binding::BuiltIn(_)) => {}
        None => {
            if let TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for m in members {
                    collect_varyings(module, m.name.as_deref(), m.ty, m.binding.as_ref(), out);
                }
            }
        }
    }
}

fn vector_shape(inner: &TypeInner) -> Option<(ScalarKind, u8, u32)> {
    match *inner {
        TypeInner::Scalar(s) => Some((s.kind, s.width, 1)),
        TypeInner::Vector { size, scalar } => Some((scalar.kind, scalar.width, size as u32)),
        _ => None,
    }
}

fn uniform_layout(module: &Module, name: String, slot: ResourceSlot, ty: Handle<Type>) -> UniformLayout {
    let inner = &module.types[ty].inner;
    let size = inner.size(module.to_ctx());

    // A bare `var<uniform> x: vec4<f32>` is a block with a single member `x`.
    let fields = match inner {
        TypeInner::Struct { members, .. } => members
            .iter()
            .map(|m| {
                UniformField::new(
                    m.name.clone().unwrap_or_default(),
                    m.offset,
                    module.types[m.ty].inner.size(module.to_ctx()),
                )
            })
            .collect(),
        _ => vec![UniformField::new(name.clone(), 0, size)],
    };

    UniformLayout {
        name,
        group: slot.group,
        binding: slot.binding,
        size,
        fields,
    }
}

fn merge_uniforms(
    program: &str,
    vertex: &[UniformLayout],
    fragment: &[UniformLayout],
) -> EngineResult<Option<UniformLayout>> {
    let mut merged: Vec<UniformLayout> = Vec::new();
    for u in vertex.iter().chain(fragment) {
        match merged.iter().find(|m| m.group == u.group && m.binding == u.binding) {
            Some(m) if m == u => {}
            Some(_) => {
                return Err(link_error(
                    program,
                    format!("uniform `{}` is declared differently in each stage", u.name),
                ));
            }
            None => merged.push(u.clone()),
        }
    }

    if merged.len() > 1 {
        return Err(link_error(program, "at most one uniform block per program is supported"));
    }
    Ok(merged.pop())
}

fn merge_named(vertex: &[NamedResource], fragment: &[NamedResource]) -> Vec<NamedResource> {
    let mut merged: Vec<NamedResource> = Vec::new();
    for r in vertex.iter().chain(fragment) {
        if !merged.contains(r) {
            merged.push(r.clone());
        }
    }
    merged
}
