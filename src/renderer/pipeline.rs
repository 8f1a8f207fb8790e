//! Effect Pipeline
//!
//! Schedules and records the per-frame pass sequence: source upload,
//! bright-pass, the multi-scale separable blur cascade, and the final
//! combine onto the display surface.
//!
//! The schedule itself is a pure data structure ([`build_frame_plan`]) so
//! the pass wiring can be checked without a GPU adapter; [`EffectPipeline`]
//! executes a plan against the target pool and the compiled filter stages.

use glam::Vec2;
use smallvec::SmallVec;

use crate::effects::EffectParameters;
use crate::renderer::kernel;
use crate::renderer::stages::FilterStages;
use crate::renderer::target_pool::{RenderTargetPool, TargetRole, TARGET_FORMAT};
use crate::source::SourceImage;

/// Combine stage input slots. Fewer configured blur stages fall back to the
/// bright-pass target for the unused slots.
pub const MAX_BLOOM_LAYERS: usize = 3;

/// A frame's pass schedule. Inline-allocated up to a four-scale cascade.
pub type FramePlan = SmallVec<[PassDesc; 9]>;

/// One scheduled GPU pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PassDesc {
    /// Pass-through draw of the uploaded source frame into the original
    /// target.
    Upload,
    BrightPass {
        src: TargetRole,
        dst: TargetRole,
    },
    Blur {
        src: TargetRole,
        dst: TargetRole,
        horizontal: bool,
        /// Working resolution scale of this cascade stage, used to derive
        /// the sample spacing.
        scale: f32,
    },
    Combine {
        original: TargetRole,
        layers: [TargetRole; MAX_BLOOM_LAYERS],
    },
}

/// Builds the deterministic pass schedule for one frame.
///
/// Cascade stage `i` reads the previous stage's result (the bright-pass
/// target for `i == 0`), never the original; each stage runs horizontal
/// into its scratch target, then vertical into its result target.
#[must_use]
pub fn build_frame_plan(scales: &[f32]) -> FramePlan {
    let stage_count = scales.len().saturating_sub(1);
    let mut plan = FramePlan::new();

    plan.push(PassDesc::Upload);
    plan.push(PassDesc::BrightPass {
        src: TargetRole::Original,
        dst: TargetRole::Bright,
    });

    for i in 0..stage_count {
        let src = if i == 0 {
            TargetRole::Bright
        } else {
            TargetRole::Result(i - 1)
        };
        let scale = scales[i + 1];
        plan.push(PassDesc::Blur {
            src,
            dst: TargetRole::Scratch(i),
            horizontal: true,
            scale,
        });
        plan.push(PassDesc::Blur {
            src: TargetRole::Scratch(i),
            dst: TargetRole::Result(i),
            horizontal: false,
            scale,
        });
    }

    let mut layers = [TargetRole::Bright; MAX_BLOOM_LAYERS];
    for (slot, i) in layers.iter_mut().zip(0..stage_count) {
        *slot = TargetRole::Result(i);
    }
    plan.push(PassDesc::Combine {
        original: TargetRole::Original,
        layers,
    });

    plan
}

/// Truncates a scale list to the cascade stages a pool of `target_count`
/// targets can serve.
///
/// The pool is keyed on resolution only, so a scale appended between frames
/// must not schedule passes against targets that were never allocated; the
/// extra entries take effect after the next pool rebuild.
#[must_use]
pub fn usable_scales(scales: &[f32], target_count: usize) -> &[f32] {
    let pool_stages = target_count.saturating_sub(2) / 2;
    &scales[..scales.len().min(pool_stages + 1)]
}

// ─── Uniform Blocks ───────────────────────────────────────────────────────────
//
// Byte-for-byte mirrors of the WGSL parameter structs.

#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct BrightUniforms {
    threshold: f32,
    _pad: [f32; 3],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct BlurUniforms {
    sample_step: [f32; 2],
    _pad: [f32; 2],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct CombineUniforms {
    tint: [f32; 3],
    intensity: f32,
    resolution: [f32; 2],
    time: f32,
    noise_intensity: f32,
    scanline: [f32; 4],
    curvature: f32,
    vignette_strength: f32,
    vignette_size: f32,
    screen_scale: f32,
    line_height: f32,
    noise_block_px: f32,
    _pad: [f32; 2],
}

// ─── Pipeline ─────────────────────────────────────────────────────────────────

struct UploadTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    width: u32,
    height: u32,
}

struct FrameBindGroups {
    upload: wgpu::BindGroup,
    bright: wgpu::BindGroup,
    /// One per blur pass, in plan order.
    blur: Vec<wgpu::BindGroup>,
    combine: wgpu::BindGroup,
}

/// Executes the frame plan. Owns the upload texture, the per-pass uniform
/// buffers and the cached bind groups; everything else (targets, programs)
/// is borrowed per frame.
pub struct EffectPipeline {
    upload: Option<UploadTexture>,
    bright_uniforms: wgpu::Buffer,
    /// One buffer per blur pass so every pass in a submission keeps its own
    /// sample step.
    blur_uniforms: Vec<wgpu::Buffer>,
    combine_uniforms: wgpu::Buffer,
    bind_groups: Option<FrameBindGroups>,
    bound_generation: u64,
}

impl EffectPipeline {
    pub fn new(device: &wgpu::Device) -> Self {
        Self {
            upload: None,
            bright_uniforms: create_uniform_buffer(
                device,
                "Bright Uniforms",
                std::mem::size_of::<BrightUniforms>(),
            ),
            blur_uniforms: Vec::new(),
            combine_uniforms: create_uniform_buffer(
                device,
                "Combine Uniforms",
                std::mem::size_of::<CombineUniforms>(),
            ),
            bind_groups: None,
            bound_generation: 0,
        }
    }

    /// Records and submits one full frame: upload, bright-pass, blur
    /// cascade, combine into `surface_view`.
    #[allow(clippy::too_many_arguments)]
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        stages: &FilterStages,
        pool: &RenderTargetPool,
        surface_view: &wgpu::TextureView,
        source: &SourceImage<'_>,
        params: &EffectParameters,
        time: f32,
    ) {
        let plan = build_frame_plan(usable_scales(&params.scales, pool.target_count()));
        let blur_passes = plan
            .iter()
            .filter(|p| matches!(p, PassDesc::Blur { .. }))
            .count();

        let uploaded_fresh = self.ensure_upload_texture(device, source.width, source.height);
        self.ensure_blur_buffers(device, blur_passes);
        self.write_source(queue, source);
        self.write_uniforms(queue, pool, &plan, params, time);

        // A changed scale count rewires pass sources without a pool rebuild.
        let pass_count_changed = self
            .bind_groups
            .as_ref()
            .is_none_or(|g| g.blur.len() != blur_passes);

        if uploaded_fresh || pass_count_changed || self.bound_generation != pool.generation() {
            self.bind_groups = Some(self.create_bind_groups(device, stages, pool, &plan));
            self.bound_generation = pool.generation();
        }
        let groups = self
            .bind_groups
            .as_ref()
            .unwrap_or_else(|| unreachable!("bind groups built above"));

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Effect Pipeline Encoder"),
        });

        let mut blur_index = 0;
        for pass in &plan {
            match *pass {
                PassDesc::Upload => {
                    let target = pool.target(TargetRole::Original);
                    run_fullscreen_pass(
                        &mut encoder,
                        "upload",
                        &target.view,
                        &stages.passthrough.pipeline,
                        &groups.upload,
                    );
                }
                PassDesc::BrightPass { src: _, dst } => {
                    let target = pool.target(dst);
                    run_fullscreen_pass(
                        &mut encoder,
                        "bright_pass",
                        &target.view,
                        &stages.bright_pass.pipeline,
                        &groups.bright,
                    );
                }
                PassDesc::Blur { dst, .. } => {
                    let target = pool.target(dst);
                    run_fullscreen_pass(
                        &mut encoder,
                        "blur",
                        &target.view,
                        &stages.blur.pipeline,
                        &groups.blur[blur_index],
                    );
                    blur_index += 1;
                }
                PassDesc::Combine { .. } => {
                    run_fullscreen_pass(
                        &mut encoder,
                        "combine",
                        surface_view,
                        &stages.combine.pipeline,
                        &groups.combine,
                    );
                }
            }
        }

        queue.submit(Some(encoder.finish()));
    }

    /// Recreates the upload texture when the source resolution changes.
    /// Returns true when a fresh texture was allocated.
    fn ensure_upload_texture(&mut self, device: &wgpu::Device, width: u32, height: u32) -> bool {
        if let Some(upload) = &self.upload {
            if upload.width == width && upload.height == height {
                return false;
            }
            upload.texture.destroy();
        }

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Source Upload"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.upload = Some(UploadTexture {
            texture,
            view,
            width,
            height,
        });
        true
    }

    fn ensure_blur_buffers(&mut self, device: &wgpu::Device, count: usize) {
        while self.blur_uniforms.len() < count {
            self.blur_uniforms.push(create_uniform_buffer(
                device,
                "Blur Uniforms",
                std::mem::size_of::<BlurUniforms>(),
            ));
        }
    }

    fn write_source(&self, queue: &wgpu::Queue, source: &SourceImage<'_>) {
        let Some(upload) = &self.upload else { return };
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &upload.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            source.pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(source.bytes_per_row()),
                rows_per_image: Some(source.height),
            },
            wgpu::Extent3d {
                width: source.width,
                height: source.height,
                depth_or_array_layers: 1,
            },
        );
    }

    fn write_uniforms(
        &self,
        queue: &wgpu::Queue,
        pool: &RenderTargetPool,
        plan: &[PassDesc],
        params: &EffectParameters,
        time: f32,
    ) {
        queue.write_buffer(
            &self.bright_uniforms,
            0,
            bytemuck::bytes_of(&BrightUniforms {
                threshold: params.threshold,
                _pad: [0.0; 3],
            }),
        );

        let mut blur_index = 0;
        for pass in plan {
            if let PassDesc::Blur {
                src,
                horizontal,
                scale,
                ..
            } = *pass
            {
                let src_target = pool.target(src);
                let step_px = kernel::blur_step(params.radius, scale);
                let direction = if horizontal { Vec2::X } else { Vec2::Y };
                let step_uv = direction * step_px
                    / Vec2::new(src_target.width as f32, src_target.height as f32);
                queue.write_buffer(
                    &self.blur_uniforms[blur_index],
                    0,
                    bytemuck::bytes_of(&BlurUniforms {
                        sample_step: step_uv.into(),
                        _pad: [0.0; 2],
                    }),
                );
                blur_index += 1;
            }
        }

        let (width, height) = pool
            .key()
            .map_or((1, 1), |k| (k.width, k.height));
        queue.write_buffer(
            &self.combine_uniforms,
            0,
            bytemuck::bytes_of(&CombineUniforms {
                tint: params.theme_tint(),
                intensity: params.intensity,
                resolution: [width as f32, height as f32],
                time,
                noise_intensity: params.noise_intensity,
                scanline: [
                    params.scanline.intensity,
                    params.scanline.frequency,
                    params.scanline.speed,
                    params.scanline.offset,
                ],
                curvature: params.curvature.curvature,
                vignette_strength: params.curvature.vignette_strength,
                vignette_size: params.curvature.vignette_size,
                screen_scale: params.curvature.screen_scale,
                line_height: params.line_height,
                noise_block_px: kernel::noise_block_px(params.line_height),
                _pad: [0.0; 2],
            }),
        );
    }

    fn create_bind_groups(
        &self,
        device: &wgpu::Device,
        stages: &FilterStages,
        pool: &RenderTargetPool,
        plan: &[PassDesc],
    ) -> FrameBindGroups {
        let upload_view = &self
            .upload
            .as_ref()
            .unwrap_or_else(|| unreachable!("upload texture allocated before binding"))
            .view;

        let upload = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("upload"),
            layout: &stages.passthrough.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(upload_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&stages.sampler),
                },
            ],
        });

        let bright = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("bright_pass"),
            layout: &stages.bright_pass.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(
                        &pool.target(TargetRole::Original).view,
                    ),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&stages.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: self.bright_uniforms.as_entire_binding(),
                },
            ],
        });

        let mut blur = Vec::new();
        let mut combine = None;
        for pass in plan {
            match *pass {
                PassDesc::Blur { src, .. } => {
                    let group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                        label: Some("blur"),
                        layout: &stages.blur.layout,
                        entries: &[
                            wgpu::BindGroupEntry {
                                binding: 0,
                                resource: wgpu::BindingResource::TextureView(
                                    &pool.target(src).view,
                                ),
                            },
                            wgpu::BindGroupEntry {
                                binding: 1,
                                resource: wgpu::BindingResource::Sampler(&stages.sampler),
                            },
                            wgpu::BindGroupEntry {
                                binding: 2,
                                resource: self.blur_uniforms[blur.len()].as_entire_binding(),
                            },
                        ],
                    });
                    blur.push(group);
                }
                PassDesc::Combine { original, layers } => {
                    combine = Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
                        label: Some("combine"),
                        layout: &stages.combine.layout,
                        entries: &[
                            wgpu::BindGroupEntry {
                                binding: 0,
                                resource: wgpu::BindingResource::TextureView(
                                    &pool.target(original).view,
                                ),
                            },
                            wgpu::BindGroupEntry {
                                binding: 1,
                                resource: wgpu::BindingResource::TextureView(
                                    &pool.target(layers[0]).view,
                                ),
                            },
                            wgpu::BindGroupEntry {
                                binding: 2,
                                resource: wgpu::BindingResource::TextureView(
                                    &pool.target(layers[1]).view,
                                ),
                            },
                            wgpu::BindGroupEntry {
                                binding: 3,
                                resource: wgpu::BindingResource::TextureView(
                                    &pool.target(layers[2]).view,
                                ),
                            },
                            wgpu::BindGroupEntry {
                                binding: 4,
                                resource: wgpu::BindingResource::Sampler(&stages.sampler),
                            },
                            wgpu::BindGroupEntry {
                                binding: 5,
                                resource: self.combine_uniforms.as_entire_binding(),
                            },
                        ],
                    }));
                }
                _ => {}
            }
        }

        FrameBindGroups {
            upload,
            bright,
            blur,
            combine: combine
                .unwrap_or_else(|| unreachable!("every frame plan ends with a combine pass")),
        }
    }
}

fn create_uniform_buffer(device: &wgpu::Device, label: &str, size: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: size as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn run_fullscreen_pass(
    encoder: &mut wgpu::CommandEncoder,
    label: &str,
    view: &wgpu::TextureView,
    pipeline: &wgpu::RenderPipeline,
    bind_group: &wgpu::BindGroup,
) {
    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        ..Default::default()
    });
    pass.set_pipeline(pipeline);
    pass.set_bind_group(0, bind_group, &[]);
    pass.draw(0..3, 0..1);
}
