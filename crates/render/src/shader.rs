//! Shader program abstraction: a vertex+fragment stage pair carried
//! through compile and link, plus the typed uniform contract.
//!
//! Stage sources are opaque WGSL strings supplied by the application.
//! `compile` runs them through naga (parse + validation) so a broken
//! stage surfaces as a [`RenderError::Compile`] with the stage kind
//! and the compiler diagnostic, before any GPU object exists. `link`
//! then builds the pipelines; a program that fails either step is
//! simply never constructed, other programs are unaffected.
//!
//! Uniforms are typed slots resolved at link time rather than
//! stringly-typed name lookups. Writing a slot the program did not
//! declare logs a warning once and is otherwise a no-op, so a
//! mismatch between application code and shader source never kills a
//! frame.

use std::fmt;

use tracing::warn;
use wgpu::util::DeviceExt;

use crate::error::RenderError;
use crate::gpu_types::SceneUniforms;
use crate::texture::Texture;

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StageKind {
    Vertex,
    Fragment,
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageKind::Vertex => f.write_str("vertex"),
            StageKind::Fragment => f.write_str("fragment"),
        }
    }
}

/// One shader stage: kind plus opaque WGSL source.
#[derive(Clone, Debug)]
pub struct ShaderStage {
    pub kind: StageKind,
    pub source: String,
}

impl ShaderStage {
    pub fn vertex(source: impl Into<String>) -> Self {
        Self {
            kind: StageKind::Vertex,
            source: source.into(),
        }
    }

    pub fn fragment(source: impl Into<String>) -> Self {
        Self {
            kind: StageKind::Fragment,
            source: source.into(),
        }
    }
}

/// Uniform slots a program may declare. Matrices are not slots; the
/// renderer writes them unconditionally for every program.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UniformSlot {
    Time,
    Resolution,
    Frequency,
    Intensity,
    GeoColor,
}

const SLOT_COUNT: usize = 5;

impl UniformSlot {
    fn index(self) -> usize {
        match self {
            UniformSlot::Time => 0,
            UniformSlot::Resolution => 1,
            UniformSlot::Frequency => 2,
            UniformSlot::Intensity => 3,
            UniformSlot::GeoColor => 4,
        }
    }

    fn name(self) -> &'static str {
        match self {
            UniformSlot::Time => "time",
            UniformSlot::Resolution => "resolution",
            UniformSlot::Frequency => "frequency",
            UniformSlot::Intensity => "intensity",
            UniformSlot::GeoColor => "geo_color",
        }
    }
}

/// CPU-side staging for the uniform block of one program.
///
/// Pure data, no GPU handles, so the persistence and missing-slot
/// rules are unit-testable. Values stick until overwritten.
#[derive(Clone, Debug)]
pub struct UniformStage {
    label: String,
    values: SceneUniforms,
    declared: [bool; SLOT_COUNT],
    warned: [bool; SLOT_COUNT],
}

impl UniformStage {
    pub fn new(label: &str, slots: &[UniformSlot]) -> Self {
        let mut declared = [false; SLOT_COUNT];
        for slot in slots {
            declared[slot.index()] = true;
        }
        Self {
            label: label.to_owned(),
            values: SceneUniforms::default(),
            declared,
            warned: [false; SLOT_COUNT],
        }
    }

    pub fn declares(&self, slot: UniformSlot) -> bool {
        self.declared[slot.index()]
    }

    /// True when the slot is declared; otherwise warns once per slot
    /// and reports the write should be dropped.
    fn writable(&mut self, slot: UniformSlot) -> bool {
        if self.declared[slot.index()] {
            return true;
        }
        if !self.warned[slot.index()] {
            self.warned[slot.index()] = true;
            warn!(
                program = %self.label,
                slot = slot.name(),
                "uniform slot not declared by program, write ignored"
            );
        }
        false
    }

    pub fn set_time(&mut self, time: f32) {
        if self.writable(UniformSlot::Time) {
            self.values.time = time;
        }
    }

    pub fn set_resolution(&mut self, width: f32, height: f32) {
        if self.writable(UniformSlot::Resolution) {
            self.values.resolution = [width, height];
        }
    }

    pub fn set_frequency(&mut self, frequency: f32) {
        if self.writable(UniformSlot::Frequency) {
            self.values.frequency = frequency;
        }
    }

    pub fn set_intensity(&mut self, intensity: f32) {
        if self.writable(UniformSlot::Intensity) {
            self.values.intensity = intensity;
        }
    }

    pub fn set_geo_color(&mut self, rgba: [f32; 4]) {
        if self.writable(UniformSlot::GeoColor) {
            self.values.geo_color = rgba;
        }
    }

    pub(crate) fn set_matrices(&mut self, model: glam::Mat4, view: glam::Mat4, proj: glam::Mat4) {
        self.values.model = model.to_cols_array_2d();
        self.values.view = view.to_cols_array_2d();
        self.values.proj = proj.to_cols_array_2d();
    }

    pub fn values(&self) -> &SceneUniforms {
        &self.values
    }
}

/// Link-time configuration of a program.
#[derive(Clone, Debug)]
pub struct ProgramDesc {
    pub label: String,
    /// Uniform slots the shader pair actually reads.
    pub slots: Vec<UniformSlot>,
    /// Whether the fragment stage samples the surface texture
    /// (adds the texture+sampler bind group).
    pub samples_texture: bool,
    /// Background-style programs keep depth testing but skip depth
    /// writes so they never occlude scene geometry drawn earlier.
    pub depth_write: bool,
}

/// A validated stage pair, ready to link against a surface format.
pub struct CompiledProgram {
    desc: ProgramDesc,
    vertex_source: String,
    fragment_source: String,
}

impl CompiledProgram {
    /// Validate a stage pair. Per-stage naga parse/validation failures
    /// become [`RenderError::Compile`]; a malformed pair (missing or
    /// duplicate stage kinds, missing entry points) becomes
    /// [`RenderError::Link`].
    pub fn compile(desc: ProgramDesc, stages: &[ShaderStage]) -> Result<Self, RenderError> {
        let mut vertex_source = None;
        let mut fragment_source = None;

        for stage in stages {
            let module = validate_wgsl(stage)?;
            let (entry, wanted, slot) = match stage.kind {
                StageKind::Vertex => (VERTEX_ENTRY, naga::ShaderStage::Vertex, &mut vertex_source),
                StageKind::Fragment => (
                    FRAGMENT_ENTRY,
                    naga::ShaderStage::Fragment,
                    &mut fragment_source,
                ),
            };
            if !module
                .entry_points
                .iter()
                .any(|ep| ep.stage == wanted && ep.name == entry)
            {
                return Err(RenderError::Link {
                    diagnostic: format!(
                        "{} stage of `{}` has no `{}` entry point",
                        stage.kind, desc.label, entry
                    ),
                });
            }
            if slot.replace(stage.source.clone()).is_some() {
                return Err(RenderError::Link {
                    diagnostic: format!("duplicate {} stage in `{}`", stage.kind, desc.label),
                });
            }
        }

        let vertex_source = vertex_source.ok_or_else(|| RenderError::Link {
            diagnostic: format!("`{}` is missing a vertex stage", desc.label),
        })?;
        let fragment_source = fragment_source.ok_or_else(|| RenderError::Link {
            diagnostic: format!("`{}` is missing a fragment stage", desc.label),
        })?;

        Ok(Self {
            desc,
            vertex_source,
            fragment_source,
        })
    }

    pub fn label(&self) -> &str {
        &self.desc.label
    }

    /// Build the GPU objects: shader modules, bind group layouts, the
    /// uniform buffer and one pipeline per draw mode.
    pub fn link(
        self,
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
    ) -> Result<LinkedProgram, RenderError> {
        let vertex_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{} vertex", self.desc.label)),
            source: wgpu::ShaderSource::Wgsl(self.vertex_source.as_str().into()),
        });
        let fragment_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{} fragment", self.desc.label)),
            source: wgpu::ShaderSource::Wgsl(self.fragment_source.as_str().into()),
        });

        let uniforms = UniformStage::new(&self.desc.label, &self.desc.slots);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} uniforms", self.desc.label)),
            contents: bytemuck::bytes_of(uniforms.values()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(&format!("{} uniform layout", self.desc.label)),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{} uniform bind group", self.desc.label)),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let texture_layout = self.desc.samples_texture.then(|| {
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(&format!("{} texture layout", self.desc.label)),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            })
        });

        let mut group_layouts = vec![&uniform_layout];
        if let Some(layout) = &texture_layout {
            group_layouts.push(layout);
        }
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{} pipeline layout", self.desc.label)),
            bind_group_layouts: &group_layouts,
            push_constant_ranges: &[],
        });

        let make_pipeline = |topology: wgpu::PrimitiveTopology, suffix: &str| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(&format!("{} {suffix} pipeline", self.desc.label)),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &vertex_module,
                    entry_point: VERTEX_ENTRY,
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<geometry::Vertex>()
                            as wgpu::BufferAddress,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![
                            0 => Float32x3,
                            1 => Float32x3,
                            2 => Float32x2,
                        ],
                    }],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &fragment_module,
                    entry_point: FRAGMENT_ENTRY,
                    targets: &[Some(wgpu::ColorTargetState {
                        format: surface_format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: crate::renderer::DEPTH_FORMAT,
                    depth_write_enabled: self.desc.depth_write,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
            })
        };

        let triangle_pipeline = make_pipeline(wgpu::PrimitiveTopology::TriangleList, "triangle");
        let line_pipeline = make_pipeline(wgpu::PrimitiveTopology::LineList, "line");

        Ok(LinkedProgram {
            label: self.desc.label,
            uniforms,
            uniform_buffer,
            uniform_bind_group,
            texture_layout,
            texture_bind_group: None,
            missing_texture_warned: false,
            triangle_pipeline,
            line_pipeline,
        })
    }
}

fn validate_wgsl(stage: &ShaderStage) -> Result<naga::Module, RenderError> {
    let module = naga::front::wgsl::parse_str(&stage.source).map_err(|e| RenderError::Compile {
        stage: stage.kind,
        diagnostic: e.emit_to_string(&stage.source),
    })?;
    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    validator
        .validate(&module)
        .map_err(|e| RenderError::Compile {
            stage: stage.kind,
            diagnostic: format!("{e:?}"),
        })?;
    Ok(module)
}

/// A ready-to-draw program. Only linked programs can be bound.
pub struct LinkedProgram {
    label: String,
    uniforms: UniformStage,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    texture_layout: Option<wgpu::BindGroupLayout>,
    texture_bind_group: Option<wgpu::BindGroup>,
    missing_texture_warned: bool,
    triangle_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
}

impl LinkedProgram {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_time(&mut self, time: f32) {
        self.uniforms.set_time(time);
    }

    pub fn set_resolution(&mut self, width: f32, height: f32) {
        self.uniforms.set_resolution(width, height);
    }

    pub fn set_frequency(&mut self, frequency: f32) {
        self.uniforms.set_frequency(frequency);
    }

    pub fn set_intensity(&mut self, intensity: f32) {
        self.uniforms.set_intensity(intensity);
    }

    pub fn set_geo_color(&mut self, rgba: [f32; 4]) {
        self.uniforms.set_geo_color(rgba);
    }

    pub fn declares(&self, slot: UniformSlot) -> bool {
        self.uniforms.declares(slot)
    }

    /// Associate the sampled texture. Must be called before any draw
    /// that samples; drawables are skipped (with a warning) until
    /// then. Call again after the texture's pixels were swapped to a
    /// new extent, the old bind group keeps the old storage alive.
    pub fn bind_texture(&mut self, device: &wgpu::Device, texture: &Texture) {
        match &self.texture_layout {
            Some(layout) => {
                self.texture_bind_group = Some(texture.bind_group(device, layout, &self.label));
            }
            None => warn!(
                program = %self.label,
                "bind_texture on a program that does not sample a texture"
            ),
        }
    }

    pub(crate) fn flush_uniforms(
        &mut self,
        queue: &wgpu::Queue,
        view: glam::Mat4,
        proj: glam::Mat4,
    ) {
        self.uniforms.set_matrices(glam::Mat4::IDENTITY, view, proj);
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(self.uniforms.values()));
    }

    pub(crate) fn pipeline(&self, mode: geometry::DrawMode) -> &wgpu::RenderPipeline {
        match mode {
            geometry::DrawMode::Triangles => &self.triangle_pipeline,
            geometry::DrawMode::Lines => &self.line_pipeline,
        }
    }

    pub(crate) fn uniform_bind_group(&self) -> &wgpu::BindGroup {
        &self.uniform_bind_group
    }

    /// Whether the program can draw right now. False only when the
    /// program samples a texture and none was bound yet; warns once.
    pub(crate) fn texture_ready(&mut self) -> bool {
        if self.texture_layout.is_none() || self.texture_bind_group.is_some() {
            return true;
        }
        if !self.missing_texture_warned {
            self.missing_texture_warned = true;
            warn!(
                program = %self.label,
                "draw skipped: program samples a texture but none is bound"
            );
        }
        false
    }

    pub(crate) fn texture_bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.texture_bind_group.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD_VERT: &str = r#"
        @vertex
        fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
            return vec4<f32>(position, 1.0);
        }
    "#;

    const GOOD_FRAG: &str = r#"
        @fragment
        fn fs_main() -> @location(0) vec4<f32> {
            return vec4<f32>(1.0, 0.0, 0.0, 1.0);
        }
    "#;

    fn desc() -> ProgramDesc {
        ProgramDesc {
            label: "test".into(),
            slots: vec![UniformSlot::Time],
            samples_texture: false,
            depth_write: true,
        }
    }

    #[test]
    fn compile_accepts_a_valid_pair() {
        let stages = [
            ShaderStage::vertex(GOOD_VERT),
            ShaderStage::fragment(GOOD_FRAG),
        ];
        assert!(CompiledProgram::compile(desc(), &stages).is_ok());
    }

    #[test]
    fn compile_reports_stage_and_diagnostic() {
        let stages = [
            ShaderStage::vertex("fn this is not wgsl {"),
            ShaderStage::fragment(GOOD_FRAG),
        ];
        match CompiledProgram::compile(desc(), &stages) {
            Err(RenderError::Compile { stage, diagnostic }) => {
                assert_eq!(stage, StageKind::Vertex);
                assert!(!diagnostic.is_empty());
            }
            other => panic!("expected compile error, got {:?}", other.err()),
        }
    }

    #[test]
    fn missing_entry_point_fails_to_link() {
        let vert = r#"
            @vertex
            fn not_the_entry(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
                return vec4<f32>(position, 1.0);
            }
        "#;
        let stages = [ShaderStage::vertex(vert), ShaderStage::fragment(GOOD_FRAG)];
        assert!(matches!(
            CompiledProgram::compile(desc(), &stages),
            Err(RenderError::Link { .. })
        ));
    }

    #[test]
    fn missing_fragment_stage_fails_to_link() {
        let stages = [ShaderStage::vertex(GOOD_VERT)];
        assert!(matches!(
            CompiledProgram::compile(desc(), &stages),
            Err(RenderError::Link { .. })
        ));
    }

    #[test]
    fn uniform_values_persist_independently() {
        let mut stage = UniformStage::new(
            "test",
            &[UniformSlot::Time, UniformSlot::Frequency],
        );
        stage.set_time(5.0);
        stage.set_frequency(3.0);
        assert_eq!(stage.values().time, 5.0);
        assert_eq!(stage.values().frequency, 3.0);
    }

    #[test]
    fn undeclared_slot_write_is_dropped() {
        let mut stage = UniformStage::new("test", &[UniformSlot::Time]);
        let before = stage.values().geo_color;
        stage.set_geo_color([0.0, 0.0, 0.0, 1.0]);
        assert_eq!(stage.values().geo_color, before);
    }
}
