//! Render Target Pool
//!
//! Owns every intermediate texture the effect pipeline draws into. The pool
//! contents are fully determined by a pure [`TargetPlan`] computed from
//! `(width, height, scales)`:
//!
//! - one full-resolution `Original` target (the uploaded source image),
//! - one full-resolution `Bright` target (bright-pass output),
//! - for each blur scale after the first, a floor-rounded scratch/result
//!   pair at that fraction of the output resolution.
//!
//! The pool is a cache keyed by `(width, height)`: [`acquire`] returns the
//! existing targets untouched while the key matches, and otherwise destroys
//! every old texture synchronously and allocates the new plan. Reuse across
//! frames — not per-frame allocation — is the point; GPU textures are scarce
//! and leak-prone when left to late destruction.
//!
//! [`acquire`]: RenderTargetPool::acquire

use crate::errors::{PhosphorError, Result};

/// Texel format of every intermediate target. Linear, so the blur and
/// combine arithmetic happens in linear space like the bright pass expects.
pub const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

// ─── Pure Planning ────────────────────────────────────────────────────────────

/// Cache key for the allocated target set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolKey {
    pub width: u32,
    pub height: u32,
}

/// Identity of one target within the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetRole {
    /// Full-resolution copy of the frame's source image.
    Original,
    /// Full-resolution bright-pass output.
    Bright,
    /// Horizontal-pass scratch target for blur iteration `i`.
    Scratch(usize),
    /// Vertical-pass result target for blur iteration `i`.
    Result(usize),
}

/// One planned allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSpec {
    pub role: TargetRole,
    pub width: u32,
    pub height: u32,
}

/// Floor-rounded scaled dimension, clamped to 1 to avoid degenerate
/// zero-sized allocations.
#[must_use]
pub fn scaled_dim(full: u32, scale: f32) -> u32 {
    ((full as f32 * scale).floor() as u32).max(1)
}

/// Computes the full target set for one output resolution and scale list:
/// `2 + 2 * (scales.len() - 1)` entries, in pool index order.
///
/// Blur iteration `i` corresponds to `scales[i + 1]` — the first scale
/// entry is the full-resolution convention and allocates nothing extra.
#[must_use]
pub fn plan_targets(width: u32, height: u32, scales: &[f32]) -> Vec<TargetSpec> {
    let blur_stages = scales.len().saturating_sub(1);
    let mut specs = Vec::with_capacity(2 + 2 * blur_stages);

    specs.push(TargetSpec {
        role: TargetRole::Original,
        width,
        height,
    });
    specs.push(TargetSpec {
        role: TargetRole::Bright,
        width,
        height,
    });

    for (i, &scale) in scales.iter().skip(1).enumerate() {
        let w = scaled_dim(width, scale);
        let h = scaled_dim(height, scale);
        specs.push(TargetSpec {
            role: TargetRole::Scratch(i),
            width: w,
            height: h,
        });
        specs.push(TargetSpec {
            role: TargetRole::Result(i),
            width: w,
            height: h,
        });
    }

    specs
}

/// Pool index of a role, matching [`plan_targets`] order.
#[inline]
#[must_use]
pub fn target_index(role: TargetRole) -> usize {
    match role {
        TargetRole::Original => 0,
        TargetRole::Bright => 1,
        TargetRole::Scratch(i) => 2 + 2 * i,
        TargetRole::Result(i) => 3 + 2 * i,
    }
}

// ─── GPU-Owning Pool ──────────────────────────────────────────────────────────

/// An owned texture + render-attachable view pair at a fixed size.
pub struct RenderTarget {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

impl RenderTarget {
    fn new(device: &wgpu::Device, spec: &TargetSpec) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Effect Target"),
            size: wgpu::Extent3d {
                width: spec.width,
                height: spec.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            width: spec.width,
            height: spec.height,
        }
    }
}

/// Resolution-keyed cache bookkeeping for the pool.
///
/// Separated from the device-owning allocation path so the reuse/rebuild
/// decision and the no-leak-across-resizes property can be exercised
/// without a GPU adapter. [`RenderTargetPool::acquire`] drives exactly this
/// state machine: `needs_rebuild` then, on a rebuild, `note_release`
/// followed by `note_rebuild`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PoolLedger {
    key: Option<PoolKey>,
    generation: u64,
    target_count: usize,
}

impl PoolLedger {
    /// True when no target set for this resolution is held yet.
    #[must_use]
    pub fn needs_rebuild(&self, width: u32, height: u32) -> bool {
        self.key != Some(PoolKey { width, height })
    }

    /// Records that every held target was released.
    pub fn note_release(&mut self) {
        self.key = None;
        self.target_count = 0;
    }

    /// Records a completed reallocation.
    pub fn note_rebuild(&mut self, width: u32, height: u32, target_count: usize) {
        self.key = Some(PoolKey { width, height });
        self.target_count = target_count;
        self.generation += 1;
    }

    #[must_use]
    pub fn key(&self) -> Option<PoolKey> {
        self.key
    }

    /// Monotonic rebuild counter.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn target_count(&self) -> usize {
        self.target_count
    }
}

/// The set of render targets for one output resolution.
///
/// Starts empty; the first [`acquire`](Self::acquire) populates it. Each
/// rebuild bumps [`generation`](Self::generation) so dependents (bind
/// groups referencing the old views) know to refresh.
pub struct RenderTargetPool {
    ledger: PoolLedger,
    targets: Vec<RenderTarget>,
}

impl Default for RenderTargetPool {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderTargetPool {
    #[must_use]
    pub fn new() -> Self {
        Self {
            ledger: PoolLedger::default(),
            targets: Vec::new(),
        }
    }

    /// True when the pool already holds targets for this resolution.
    #[must_use]
    pub fn matches(&self, width: u32, height: u32) -> bool {
        !self.ledger.needs_rebuild(width, height)
    }

    /// Ensures the pool holds targets for `(width, height, scales)`.
    ///
    /// No-op when the resolution key matches (the scale list is assumed
    /// stable after initialization). Otherwise every previous target is
    /// destroyed synchronously and the new plan is allocated under a
    /// validation error scope: any backend rejection is fatal, since it
    /// indicates a resource-limit violation rather than a transient state.
    pub fn acquire(
        &mut self,
        device: &wgpu::Device,
        width: u32,
        height: u32,
        scales: &[f32],
    ) -> Result<()> {
        if self.matches(width, height) {
            return Ok(());
        }

        self.release();

        let error_scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
        self.targets = plan_targets(width, height, scales)
            .iter()
            .map(|spec| RenderTarget::new(device, spec))
            .collect();
        if let Some(e) = pollster::block_on(error_scope.pop()) {
            self.release();
            return Err(PhosphorError::TargetAllocation {
                width,
                height,
                message: e.to_string(),
            });
        }

        self.ledger.note_rebuild(width, height, self.targets.len());

        log::debug!(
            "Render target pool rebuilt: {}x{}, {} targets, generation {}",
            width,
            height,
            self.targets.len(),
            self.ledger.generation(),
        );
        Ok(())
    }

    /// Destroys every target immediately and clears the cache key.
    pub fn release(&mut self) {
        for target in self.targets.drain(..) {
            target.texture.destroy();
        }
        self.ledger.note_release();
    }

    /// Looks up a target by role.
    ///
    /// # Panics
    ///
    /// Panics if the role's blur iteration was never allocated; callers
    /// derive roles from the same scale list the pool was acquired with.
    #[inline]
    #[must_use]
    pub fn target(&self, role: TargetRole) -> &RenderTarget {
        &self.targets[target_index(role)]
    }

    /// Number of allocated targets.
    #[must_use]
    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    /// Monotonic rebuild counter. Bumped once per reallocation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.ledger.generation()
    }

    /// The current cache key, if populated.
    #[must_use]
    pub fn key(&self) -> Option<PoolKey> {
        self.ledger.key()
    }
}

impl Drop for RenderTargetPool {
    fn drop(&mut self) {
        self.release();
    }
}
