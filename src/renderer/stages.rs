//! Filter Stage Compiler
//!
//! Compiles the four fixed filter stages (pass-through, bright-pass,
//! separable blur, combine) exactly once at startup. Every stage shares one
//! fullscreen-triangle vertex stage; each fragment stage is concatenated
//! with it and compiled into its own pipeline.
//!
//! Compilation runs under a wgpu validation error scope: any compile or
//! link failure is fatal ([`PhosphorError::ShaderCompile`]) — there is no
//! fallback rendering path and no hot reload.

use rustc_hash::FxHashMap;
use xxhash_rust::xxh3::xxh3_128;

use crate::errors::{PhosphorError, Result};
use crate::renderer::target_pool::TARGET_FORMAT;

const FULLSCREEN_VS: &str = include_str!("shaders/fullscreen_vs.wgsl");
const PASSTHROUGH_FS: &str = include_str!("shaders/passthrough.wgsl");
const BRIGHT_PASS_FS: &str = include_str!("shaders/bright_pass.wgsl");
const BLUR_FS: &str = include_str!("shaders/blur.wgsl");
const COMBINE_FS: &str = include_str!("shaders/combine.wgsl");

/// One compiled filter stage: the linked program plus the bind group layout
/// that resolves its parameter bindings.
pub struct FilterStage {
    pub name: &'static str,
    pub pipeline: wgpu::RenderPipeline,
    pub layout: wgpu::BindGroupLayout,
}

/// The full fixed stage set, compiled once per process lifetime.
pub struct FilterStages {
    pub passthrough: FilterStage,
    pub bright_pass: FilterStage,
    pub blur: FilterStage,
    pub combine: FilterStage,
    /// Shared clamp-to-edge linear sampler. Edge clamping keeps the blur
    /// from darkening at borders.
    pub sampler: wgpu::Sampler,
}

impl FilterStages {
    /// Compiles all four stages. `surface_format` is the combine stage's
    /// color target; the other stages render into [`TARGET_FORMAT`] pool
    /// targets.
    pub fn compile(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Result<Self> {
        let mut compiler = StageCompiler::default();

        let passthrough = compiler.compile(
            device,
            "passthrough",
            PASSTHROUGH_FS,
            &sampled_stage_entries(false),
            TARGET_FORMAT,
        )?;
        let bright_pass = compiler.compile(
            device,
            "bright_pass",
            BRIGHT_PASS_FS,
            &sampled_stage_entries(true),
            TARGET_FORMAT,
        )?;
        let blur = compiler.compile(
            device,
            "blur",
            BLUR_FS,
            &sampled_stage_entries(true),
            TARGET_FORMAT,
        )?;
        let combine = compiler.compile(
            device,
            "combine",
            COMBINE_FS,
            &combine_stage_entries(),
            surface_format,
        )?;

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Filter Stage Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        log::info!(
            "Filter stages compiled ({} shader modules)",
            compiler.module_count(),
        );

        Ok(Self {
            passthrough,
            bright_pass,
            blur,
            combine,
            sampler,
        })
    }
}

/// Shader module cache keyed by an xxh3-128 hash of the final WGSL source.
///
/// The shared vertex stage is concatenated into every program, so the hash
/// covers the complete translation unit.
#[derive(Default)]
struct StageCompiler {
    module_cache: FxHashMap<u128, wgpu::ShaderModule>,
}

impl StageCompiler {
    fn compile(
        &mut self,
        device: &wgpu::Device,
        name: &'static str,
        fragment_source: &str,
        layout_entries: &[wgpu::BindGroupLayoutEntry],
        target_format: wgpu::TextureFormat,
    ) -> Result<FilterStage> {
        let source = format!("{FULLSCREEN_VS}\n{fragment_source}");
        let hash = xxh3_128(source.as_bytes());

        let error_scope = device.push_error_scope(wgpu::ErrorFilter::Validation);

        let module = self
            .module_cache
            .entry(hash)
            .or_insert_with(|| {
                device.create_shader_module(wgpu::ShaderModuleDescriptor {
                    label: Some(name),
                    source: wgpu::ShaderSource::Wgsl(source.into()),
                })
            })
            .clone();

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(name),
            entries: layout_entries,
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(name),
            bind_group_layouts: &[&layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(name),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: target_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        if let Some(e) = pollster::block_on(error_scope.pop()) {
            return Err(PhosphorError::ShaderCompile {
                stage: name,
                message: e.to_string(),
            });
        }

        Ok(FilterStage {
            name,
            pipeline,
            layout,
        })
    }

    fn module_count(&self) -> usize {
        self.module_cache.len()
    }
}

// ─── Bind Group Layout Tables ─────────────────────────────────────────────────

fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

/// Layout for the single-input stages: texture + sampler (+ uniforms).
fn sampled_stage_entries(with_uniforms: bool) -> Vec<wgpu::BindGroupLayoutEntry> {
    let mut entries = vec![texture_entry(0), sampler_entry(1)];
    if with_uniforms {
        entries.push(uniform_entry(2));
    }
    entries
}

/// Layout for the combine stage: original + three blur layers + sampler +
/// uniforms.
fn combine_stage_entries() -> Vec<wgpu::BindGroupLayoutEntry> {
    vec![
        texture_entry(0),
        texture_entry(1),
        texture_entry(2),
        texture_entry(3),
        sampler_entry(4),
        uniform_entry(5),
    ]
}
