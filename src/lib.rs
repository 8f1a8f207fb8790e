#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod app;
pub mod effects;
pub mod errors;
pub mod renderer;
pub mod source;
pub mod utils;

pub use app::{App, AppHandler, Chime};
pub use effects::{CurvatureParams, EffectParameters, ScanlineParams, THEME_PALETTE};
pub use errors::{PhosphorError, Result};
pub use renderer::{RenderSettings, Renderer, WgpuContext};
pub use source::{FrameSource, SourceImage};
pub use utils::{FpsCounter, FrameState, Timer};
