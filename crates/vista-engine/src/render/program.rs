use std::collections::HashMap;

use crate::device::GpuCaps;

use super::common::{build_pipeline, validated, PipelineKey, PipelineSpec};

/// Compile state of a [`ShaderProgram`].
#[derive(Debug)]
pub enum ProgramState {
    NotCompiled,
    Ready(wgpu::ShaderModule),
    /// Compilation failed; the program stays dead and enabling it is a no-op.
    Dead,
}

/// Wrapper around one WGSL program.
///
/// The module is compiled on first [`enable`](ShaderProgram::enable). A
/// failure is logged once with the validation message and marks the program
/// dead; callers then fall back (plain image program) or skip the draw.
#[derive(Debug)]
pub struct ShaderProgram {
    label: &'static str,
    source: &'static str,
    state: ProgramState,
}

impl ShaderProgram {
    /// Id reported by a dead program.
    pub const DEAD: i32 = -1;

    pub const fn new(label: &'static str, source: &'static str) -> Self {
        Self { label, source, state: ProgramState::NotCompiled }
    }

    /// Programmable shading is available on this device.
    pub fn is_usable(caps: &GpuCaps) -> bool {
        caps.shaders
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn state(&self) -> &ProgramState {
        &self.state
    }

    /// `0` before compilation, `1` when ready, [`Self::DEAD`] after a failure.
    pub fn id(&self) -> i32 {
        match self.state {
            ProgramState::NotCompiled => 0,
            ProgramState::Ready(_) => 1,
            ProgramState::Dead => Self::DEAD,
        }
    }

    pub fn is_dead(&self) -> bool {
        matches!(self.state, ProgramState::Dead)
    }

    /// Compiles on first use and returns the module, or `None` when dead.
    pub fn enable(&mut self, device: &wgpu::Device) -> Option<&wgpu::ShaderModule> {
        if let ProgramState::NotCompiled = self.state {
            self.state = self.compile(device);
        }
        match &self.state {
            ProgramState::Ready(module) => Some(module),
            _ => None,
        }
    }

    /// Marks the program dead after a dependent object (pipeline) failed.
    pub fn kill(&mut self, reason: &str) {
        if !self.is_dead() {
            log::error!("shader program '{}' disabled: {reason}", self.label);
        }
        self.state = ProgramState::Dead;
    }

    fn compile(&self, device: &wgpu::Device) -> ProgramState {
        let result = validated(device, || {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(self.label),
                source: wgpu::ShaderSource::Wgsl(self.source.into()),
            })
        });
        match result {
            Ok(module) => {
                log::debug!("compiled shader program '{}'", self.label);
                ProgramState::Ready(module)
            }
            Err(msg) => {
                log::error!("shader program '{}' failed to compile:\n{msg}", self.label);
                ProgramState::Dead
            }
        }
    }
}

/// A program plus its bind group layouts and one pipeline per fixed-function
/// variant.
///
/// A pipeline that fails validation kills the program, so later draws with
/// the same program are skipped without further errors.
pub(crate) struct ProgramPipelines {
    pub program: ShaderProgram,
    groups: Vec<wgpu::BindGroupLayout>,
    layout: Option<wgpu::PipelineLayout>,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
}

impl ProgramPipelines {
    pub fn new(label: &'static str, source: &'static str) -> Self {
        Self {
            program: ShaderProgram::new(label, source),
            groups: Vec::new(),
            layout: None,
            pipelines: HashMap::new(),
        }
    }

    /// Bind group layouts, created from `entries` on first use.
    pub fn groups(
        &mut self,
        device: &wgpu::Device,
        entries: &[&[wgpu::BindGroupLayoutEntry]],
    ) -> &[wgpu::BindGroupLayout] {
        if self.groups.is_empty() {
            let label = self.program.label();
            self.groups = entries
                .iter()
                .map(|e| {
                    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                        label: Some(label),
                        entries: e,
                    })
                })
                .collect();
        }
        &self.groups
    }

    /// Pipeline for `key`, built on first use. `None` when the program is dead.
    pub fn pipeline(
        &mut self,
        device: &wgpu::Device,
        key: PipelineKey,
        entries: &[&[wgpu::BindGroupLayoutEntry]],
        buffers: &[wgpu::VertexBufferLayout<'_>],
        topology: wgpu::PrimitiveTopology,
    ) -> Option<wgpu::RenderPipeline> {
        if let Some(p) = self.pipelines.get(&key) {
            return Some(p.clone());
        }
        self.groups(device, entries);
        let label = self.program.label();

        if self.layout.is_none() {
            let refs: Vec<&wgpu::BindGroupLayout> = self.groups.iter().collect();
            self.layout = Some(device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(label),
                bind_group_layouts: &refs,
                immediate_size: 0,
            }));
        }

        let module = self.program.enable(device)?.clone();
        let layout = self.layout.as_ref()?;
        let spec = PipelineSpec { label, module: &module, layout, buffers, topology };

        match validated(device, || build_pipeline(device, &spec, key)) {
            Ok(p) => {
                self.pipelines.insert(key, p.clone());
                Some(p)
            }
            Err(msg) => {
                self.program.kill(&msg);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_not_compiled() {
        let p = ShaderProgram::new("t", "");
        assert_eq!(p.id(), 0);
        assert!(!p.is_dead());
    }

    #[test]
    fn kill_is_sticky() {
        let mut p = ShaderProgram::new("t", "");
        p.kill("test");
        p.kill("again");
        assert_eq!(p.id(), ShaderProgram::DEAD);
    }

    #[test]
    fn pipelines_start_empty_and_uncompiled() {
        let p = ProgramPipelines::new("t", "");
        assert_eq!(p.program.id(), 0);
        assert_eq!(p.program.label(), "t");
        assert!(p.groups.is_empty() && p.layout.is_none() && p.pipelines.is_empty());
    }

    #[test]
    fn usable_follows_caps() {
        let caps = GpuCaps { shaders: false, ..GpuCaps::desktop() };
        assert!(!ShaderProgram::is_usable(&caps));
        assert!(ShaderProgram::is_usable(&GpuCaps::desktop()));
    }
}
