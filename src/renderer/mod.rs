//! CRT post-processing renderer.
//!
//! [`Renderer`] is the frame driver: it owns the GPU context, the compiled
//! filter stages, the render target pool and the effect pipeline, and turns
//! one rasterized source frame into one presented surface frame.

pub mod context;
pub mod kernel;
pub mod pipeline;
pub mod settings;
pub mod stages;
pub mod target_pool;

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

pub use context::WgpuContext;
pub use pipeline::{
    build_frame_plan, usable_scales, EffectPipeline, FramePlan, PassDesc, MAX_BLOOM_LAYERS,
};
pub use settings::RenderSettings;
pub use stages::{FilterStage, FilterStages};
pub use target_pool::{PoolLedger, RenderTargetPool, TargetRole, TARGET_FORMAT};

use crate::effects::EffectParameters;
use crate::errors::{PhosphorError, Result};
use crate::source::SourceImage;
use crate::utils::FpsCounter;

pub struct Renderer {
    ctx: WgpuContext,
    stages: FilterStages,
    pool: RenderTargetPool,
    pipeline: EffectPipeline,
    /// Live-tunable effect parameters, read once per frame.
    pub params: EffectParameters,
    fps: FpsCounter,
}

impl Renderer {
    /// Initializes the GPU context and compiles every filter stage.
    /// Compile failures are fatal; there is no fallback path.
    pub async fn new<W>(
        window: W,
        settings: &RenderSettings,
        width: u32,
        height: u32,
    ) -> Result<Self>
    where
        W: HasWindowHandle + HasDisplayHandle + Send + Sync + 'static,
    {
        let ctx = WgpuContext::new(window, settings, width, height).await?;
        let stages = FilterStages::compile(&ctx.device, ctx.color_format())?;
        let pipeline = EffectPipeline::new(&ctx.device);

        Ok(Self {
            ctx,
            stages,
            pool: RenderTargetPool::new(),
            pipeline,
            params: EffectParameters::default(),
            fps: FpsCounter::new(),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.ctx.resize(width, height);
    }

    /// Current surface size in device pixels. The per-frame source image
    /// must be rasterized at exactly this resolution.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        self.ctx.size()
    }

    /// Renders one frame: reacquires the target pool if the resolution
    /// changed, runs the full pass schedule and presents.
    ///
    /// A lost or outdated surface reconfigures and skips the frame; running
    /// out of device memory is fatal.
    pub fn render(&mut self, source: &SourceImage<'_>, time: f32) -> Result<()> {
        let (width, height) = self.ctx.size();
        self.pool
            .acquire(&self.ctx.device, width, height, &self.params.scales)?;

        let frame = match self.ctx.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.ctx.surface.configure(&self.ctx.device, &self.ctx.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Surface frame timed out, skipping");
                return Ok(());
            }
            Err(e) => return Err(PhosphorError::SurfaceError(e)),
        };
        let surface_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.pipeline.render(
            &self.ctx.device,
            &self.ctx.queue,
            &self.stages,
            &self.pool,
            &surface_view,
            source,
            &self.params,
            time,
        );
        frame.present();

        if let Some(fps) = self.fps.update() {
            log::debug!("FPS: {fps:.1}");
        }
        Ok(())
    }
}
