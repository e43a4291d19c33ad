use std::path::{Path, PathBuf};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::particle::ConfettiShape;

/// Where the burst is anchored on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ConfettiPosition {
    /// Middle of the screen.
    #[default]
    Center,
    /// Horizontally centered, a quarter of the way down.
    Top,
    /// Horizontally centered, three quarters of the way down.
    Bottom,
    /// At the host's cursor or caret, if one can be resolved.
    Cursor,
}

impl ConfettiPosition {
    /// Every position, in declaration order.
    pub const ALL: [ConfettiPosition; 4] = [Self::Center, Self::Top, Self::Bottom, Self::Cursor];

    /// Human readable label, suitable for a settings form.
    pub fn label(self) -> &'static str {
        match self {
            Self::Center => "Screen center",
            Self::Top => "Screen top",
            Self::Bottom => "Screen bottom",
            Self::Cursor => "Cursor position",
        }
    }
}

/// An inclusive numeric bound with a form step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound<T> {
    /// Smallest accepted value.
    pub min: T,
    /// Largest accepted value.
    pub max: T,
    /// Increment used by spinners in a settings form.
    pub step: T,
}

/// Valid ranges for every numeric [`Settings`] field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettingsLimits {
    /// Session length in milliseconds.
    pub duration_ms: Bound<u32>,
    /// Number of particles per burst.
    pub count: Bound<u32>,
    /// Initial speed multiplier.
    pub speed: Bound<f32>,
    /// Per-tick downward acceleration.
    pub gravity: Bound<f32>,
    /// Particle size multiplier.
    pub size: Bound<f32>,
}

impl SettingsLimits {
    /// The hard bounds enforced by [`Settings::sanitized`].
    pub const ENGINE: SettingsLimits = SettingsLimits {
        duration_ms: Bound { min: 1, max: 60_000, step: 1 },
        count: Bound { min: 1, max: 5_000, step: 1 },
        speed: Bound { min: 0.05, max: 10.0, step: 0.05 },
        gravity: Bound { min: -5.0, max: 5.0, step: 0.05 },
        size: Bound { min: 0.05, max: 10.0, step: 0.05 },
    };

    /// The narrower ranges offered by a host settings form.
    ///
    /// Not enforced by the engine; a host UI can use these to build its spinners.
    pub const FORM: SettingsLimits = SettingsLimits {
        duration_ms: Bound { min: 1_000, max: 10_000, step: 500 },
        count: Bound { min: 50, max: 500, step: 10 },
        speed: Bound { min: 0.5, max: 3.0, step: 0.1 },
        gravity: Bound { min: 0.1, max: 1.0, step: 0.1 },
        size: Bound { min: 0.5, max: 2.0, step: 0.1 },
    };
}

/// Configuration snapshot for one confetti burst.
///
/// Hosts own persistence; the engine only ever reads a value of this type.
/// Missing fields in a serialized file fall back to the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// If `false`, triggering the effect does nothing. Defaults to `true`.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Upper bound on the session lifetime, in milliseconds. Defaults to `3000`.
    #[serde(default = "default_duration_ms")]
    pub duration_ms: u32,
    /// Number of particles spawned. Defaults to `150`.
    #[serde(default = "default_count")]
    pub count: u32,
    /// Multiplier applied to the initial speed of every particle. Defaults to `1.0`.
    #[serde(default = "default_one")]
    pub speed: f32,
    /// Added to each particle's vertical velocity every tick. Defaults to `0.2`.
    #[serde(default = "default_gravity")]
    pub gravity: f32,
    /// Multiplier applied to particle width and height. Defaults to `1.0`.
    #[serde(default = "default_one")]
    pub size: f32,
    /// Where the burst is anchored. Defaults to [`ConfettiPosition::Center`].
    #[serde(default)]
    pub position: ConfettiPosition,
    /// Shapes the population is spread across, in distribution order.
    ///
    /// Defaults to every [`ConfettiShape`].
    #[serde(default = "default_shapes")]
    pub shapes: Vec<ConfettiShape>,
}

fn default_enabled() -> bool {
    true
}

fn default_duration_ms() -> u32 {
    3000
}

fn default_count() -> u32 {
    150
}

fn default_one() -> f32 {
    1.0
}

fn default_gravity() -> f32 {
    0.2
}

fn default_shapes() -> Vec<ConfettiShape> {
    ConfettiShape::ALL.to_vec()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            duration_ms: default_duration_ms(),
            count: default_count(),
            speed: default_one(),
            gravity: default_gravity(),
            size: default_one(),
            position: ConfettiPosition::default(),
            shapes: default_shapes(),
        }
    }
}

impl Settings {
    /// Returns the session timeout as a [`Duration`](std::time::Duration).
    pub fn duration(&self) -> std::time::Duration {
        std::time::Duration::from_millis(u64::from(self.duration_ms))
    }

    /// Returns a copy with every field clamped into [`SettingsLimits::ENGINE`].
    ///
    /// Out of range values are never an error: they are pulled to the nearest
    /// bound, non-finite floats are replaced by the field default, and an empty
    /// shape list is replaced by every shape.
    pub fn sanitized(&self) -> Settings {
        let limits = SettingsLimits::ENGINE;
        let mut out = self.clone();

        out.duration_ms = clamp_u32("duration_ms", self.duration_ms, limits.duration_ms);
        out.count = clamp_u32("count", self.count, limits.count);
        out.speed = clamp_f32("speed", self.speed, default_one(), limits.speed);
        out.gravity = clamp_f32("gravity", self.gravity, default_gravity(), limits.gravity);
        out.size = clamp_f32("size", self.size, default_one(), limits.size);

        let mut shapes = Vec::with_capacity(self.shapes.len());
        for shape in &self.shapes {
            if !shapes.contains(shape) {
                shapes.push(*shape);
            }
        }
        if shapes.is_empty() {
            warn!("settings: empty shape list, using every shape");
            shapes = default_shapes();
        } else if shapes.len() != self.shapes.len() {
            warn!("settings: dropped duplicate shapes from {:?}", self.shapes);
        }
        out.shapes = shapes;

        out
    }
}

fn clamp_u32(field: &str, value: u32, bound: Bound<u32>) -> u32 {
    let clamped = value.clamp(bound.min, bound.max);
    if clamped != value {
        warn!("settings: {field} {value} out of range, clamped to {clamped}");
    }
    clamped
}

fn clamp_f32(field: &str, value: f32, fallback: f32, bound: Bound<f32>) -> f32 {
    if !value.is_finite() {
        warn!("settings: {field} is not finite, using {fallback}");
        return fallback;
    }
    let clamped = value.clamp(bound.min, bound.max);
    if clamped != value {
        warn!("settings: {field} {value} out of range, clamped to {clamped}");
    }
    clamped
}

/// Errors that can occur while loading or saving [`Settings`].
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SettingsStoreError {
    /// An I/O error occurred while reading or writing the settings file.
    #[error("Could not access settings: {0}")]
    Io(#[from] std::io::Error),
    /// The settings file contained invalid RON syntax.
    #[error("Could not parse RON: {0}")]
    Ron(#[from] ron::error::SpannedError),
    /// The settings could not be serialized.
    #[error("Could not serialize settings: {0}")]
    Serialize(#[from] ron::Error),
}

/// Persistent source of [`Settings`] snapshots.
pub trait SettingsStore {
    /// Reads the current settings.
    fn load(&self) -> Result<Settings, SettingsStoreError>;

    /// Replaces the stored settings.
    fn save(&mut self, settings: &Settings) -> Result<(), SettingsStoreError>;

    /// Reads the current settings, falling back to defaults on any error.
    fn load_or_default(&self) -> Settings {
        match self.load() {
            Ok(settings) => settings,
            Err(err) => {
                warn!("settings: {err}, using defaults");
                Settings::default()
            }
        }
    }
}

/// Stores [`Settings`] as a pretty-printed RON file.
///
/// A missing file reads as [`Settings::default`].
#[derive(Debug, Clone)]
pub struct RonSettingsStore {
    path: PathBuf,
}

impl RonSettingsStore {
    /// Creates a store backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for RonSettingsStore {
    fn load(&self) -> Result<Settings, SettingsStoreError> {
        if !self.path.exists() {
            return Ok(Settings::default());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        Ok(ron::from_str(&contents)?)
    }

    fn save(&mut self, settings: &Settings) -> Result<(), SettingsStoreError> {
        let contents = ron::ser::to_string_pretty(settings, ron::ser::PrettyConfig::default())?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, contents)?;
        Ok(())
    }
}

/// In-memory [`SettingsStore`], mostly useful for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemorySettingsStore {
    settings: Settings,
}

impl MemorySettingsStore {
    /// Creates a store holding `settings`.
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Result<Settings, SettingsStoreError> {
        Ok(self.settings.clone())
    }

    fn save(&mut self, settings: &Settings) -> Result<(), SettingsStoreError> {
        self.settings = settings.clone();
        Ok(())
    }
}
