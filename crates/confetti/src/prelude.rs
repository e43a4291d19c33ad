pub use crate::particle::{ConfettiShape, Particle};
pub use crate::plugin::{ConfettiPlugin, ConfettiRuntime, TriggerConfetti};
#[cfg(feature = "raster")]
pub use crate::raster::{RasterSurface, RasterSurfaceProvider};
pub use crate::render::{Renderer, Surface};
pub use crate::runtime::{AnimationLoop, LoopState, StopReason, TICK_DURATION};
pub use crate::session::{
    Anchor, ConfettiEffects, CursorLocator, EffectSession, NoCursor, SurfaceProvider,
};
pub use crate::settings::{ConfettiPosition, RonSettingsStore, Settings, SettingsStore};
