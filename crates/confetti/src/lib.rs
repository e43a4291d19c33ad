#![deny(missing_docs)]
//! **Confetti** is a celebratory particle burst: a few hundred rectangles,
//! circles, triangles, stars and hearts thrown from an anchor point, pulled
//! down by gravity and faded out over a few seconds.
//!
//! The engine is host agnostic. A host supplies a [`SurfaceProvider`] to draw
//! on and a [`CursorLocator`], then calls [`ConfettiEffects::run_effect`] when
//! something worth celebrating happens and [`ConfettiEffects::tick`] at the
//! [`TICK_DURATION`] cadence from the thread that owns its surfaces.
//!
//! # Getting started
//!
//! ## Standalone
//!
//! ```
//! use confetti::prelude::*;
//!
//! let provider = RasterSurfaceProvider::new(800, 600);
//! let mut effects = ConfettiEffects::with_seed(provider, NoCursor, 42);
//!
//! effects.run_effect(&Settings::default(), ConfettiPosition::Center);
//! effects.run_until_idle(|_tick| {});
//! assert!(effects.is_idle());
//! ```
//!
//! ## Inside a Bevy app
//!
//! Add [`ConfettiPlugin`] and write a [`TriggerConfetti`] message:
//!
//! ```no_run
//! use bevy::prelude::*;
//! use confetti::prelude::*;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins((DefaultPlugins, ConfettiPlugin::default()))
//!         .add_systems(Startup, |mut commands: Commands| {
//!             commands.spawn(Camera2d);
//!         })
//!         .add_systems(Update, celebrate)
//!         .run();
//! }
//!
//! fn celebrate(keys: Res<ButtonInput<KeyCode>>, mut triggers: MessageWriter<TriggerConfetti>) {
//!     if keys.just_pressed(KeyCode::Space) {
//!         triggers.write(TriggerConfetti::new(Settings::default()));
//!     }
//! }
//! ```
//!
//! # Table of contents
//!
//! - [Settings] and their [persistence](SettingsStore)
//! - [Particles](Particle) and their [shapes](ConfettiShape)
//! - [Spawning](spawn_population) a population
//! - The [animation loop](AnimationLoop) and its [clock](SimulationClock)
//! - [Rendering](Renderer) onto a [`Surface`]
//! - [Sessions](EffectSession) and the [front door](ConfettiEffects)
//!
//! # Feature flags
//!
//! - `raster` - software [`RasterSurface`] backed by the `image` crate
//!   (enabled by default)

/// Shape outlines.
pub mod mesh;
/// Built-in color palettes.
pub mod palette;
/// Per-particle state and physics.
pub mod particle;
/// Bevy integration.
pub mod plugin;
/// Convenience re-exports.
pub mod prelude;
/// Software rendering backend.
#[cfg(feature = "raster")]
pub mod raster;
/// Drawing surfaces and the frame renderer.
pub mod render;
/// Simulation clock and animation loop.
pub mod runtime;
/// Effect sessions and host capabilities.
pub mod session;
/// Effect configuration and persistence.
pub mod settings;
/// Population spawning.
pub mod spawning;

pub use particle::{ConfettiShape, Particle, ParticleRange};
pub use plugin::{
    CanvasSurface, CanvasSurfaceProvider, ConfettiPlugin, ConfettiRuntime, TriggerConfetti,
};
#[cfg(feature = "raster")]
pub use raster::{RasterSurface, RasterSurfaceProvider};
pub use render::{Renderer, Surface};
pub use runtime::{
    AnimationLoop, LoopState, SimulationClock, StopReason, TICK_DURATION, TickOutcome,
};
pub use session::{
    Anchor, ConfettiEffects, CursorLocator, EffectSession, NoCursor, SurfaceError,
    SurfaceProvider, SurfaceRequest,
};
pub use settings::{
    ConfettiPosition, MemorySettingsStore, RonSettingsStore, Settings, SettingsStore,
    SettingsStoreError,
};
pub use spawning::spawn_population;
