use crate::error::{EngineError, EngineResult};

use super::reflect::{self, ProgramInterface};
use super::{ShaderProgram, ShaderStage};

/// Compiles and links a vertex + fragment WGSL pair.
///
/// [`build`](Self::build) is best-effort: every stage is compiled even if the
/// other one failed, each failure is logged, and the result is an unlinked
/// program whose draws are no-ops. [`try_build`](Self::try_build) returns the
/// first failure instead.
#[derive(Debug, Clone)]
pub struct ProgramBuilder<'s> {
    label: String,
    vertex_source: &'s str,
    vertex_entry: String,
    fragment_source: &'s str,
    fragment_entry: String,
}

impl<'s> ProgramBuilder<'s> {
    pub fn new(label: impl Into<String>, vertex_source: &'s str, fragment_source: &'s str) -> Self {
        Self {
            label: label.into(),
            vertex_source,
            vertex_entry: "vs_main".to_string(),
            fragment_source,
            fragment_entry: "fs_main".to_string(),
        }
    }

    pub fn vertex_entry(mut self, entry: impl Into<String>) -> Self {
        self.vertex_entry = entry.into();
        self
    }

    pub fn fragment_entry(mut self, entry: impl Into<String>) -> Self {
        self.fragment_entry = entry.into();
        self
    }

    /// Compiles both stages and links them without touching a device.
    pub fn link(&self) -> EngineResult<ProgramInterface> {
        self.check().map_err(|mut errors| errors.remove(0))
    }

    pub fn try_build(&self, device: &wgpu::Device) -> EngineResult<ShaderProgram> {
        let interface = self.link()?;
        Ok(self.instantiate(device, interface))
    }

    pub fn build(&self, device: &wgpu::Device) -> ShaderProgram {
        match self.check() {
            Ok(interface) => {
                log::debug!(
                    "program `{}` linked: {} attribute(s), {} texture(s), uniforms: {}",
                    self.label,
                    interface.attributes.len(),
                    interface.textures.len(),
                    interface.uniforms.as_ref().map_or("none", |u| u.name.as_str()),
                );
                self.instantiate(device, interface)
            }
            Err(errors) => {
                for err in &errors {
                    match err {
                        EngineError::ShaderCompile { .. } => log::error!("ShaderCompileError: {err}"),
                        _ => log::error!("ProgramLinkError: {err}"),
                    }
                }
                ShaderProgram::unlinked(self.label.clone())
            }
        }
    }

    /// Returns every diagnostic: compile errors for each failed stage, then
    /// the link error.
    fn check(&self) -> Result<ProgramInterface, Vec<EngineError>> {
        let vertex = self.compile_stage(ShaderStage::Vertex, self.vertex_source, &self.vertex_entry);
        let fragment =
            self.compile_stage(ShaderStage::Fragment, self.fragment_source, &self.fragment_entry);

        match (vertex, fragment) {
            (Ok(v), Ok(f)) => reflect::link(&self.label, &v, &f).map_err(|e| vec![e]),
            (v, f) => {
                let mut errors: Vec<EngineError> =
                    [v.err(), f.err()].into_iter().flatten().collect();
                errors.push(EngineError::ProgramLink {
                    program: self.label.clone(),
                    message: "not every stage compiled".to_string(),
                });
                Err(errors)
            }
        }
    }

    fn compile_stage(
        &self,
        stage: ShaderStage,
        source: &str,
        entry: &str,
    ) -> EngineResult<reflect::StageInterface> {
        let module = reflect::parse_stage(&self.label, stage, source)?;
        reflect::reflect_stage(&self.label, &module, stage, entry)
    }

    fn instantiate(&self, device: &wgpu::Device, interface: ProgramInterface) -> ShaderProgram {
        let vertex = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{} vertex", self.label)),
            source: wgpu::ShaderSource::Wgsl(self.vertex_source.into()),
        });
        let fragment = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{} fragment", self.label)),
            source: wgpu::ShaderSource::Wgsl(self.fragment_source.into()),
        });

        ShaderProgram::linked(
            device,
            self.label.clone(),
            interface,
            (vertex, self.vertex_entry.clone()),
            (fragment, self.fragment_entry.clone()),
        )
    }
}
