use std::time::Duration;

use bevy::prelude::*;
use rand::{Rng, SeedableRng, rngs::StdRng};
use thiserror::Error;

use crate::render::{Renderer, Surface};
use crate::runtime::{AnimationLoop, LoopState, StopReason, TICK_DURATION, TickOutcome};
use crate::settings::{ConfettiPosition, Settings, SettingsStore};
use crate::spawning::spawn_population;

/// Default cap on simultaneously running sessions.
pub const DEFAULT_MAX_CONCURRENT: usize = 4;

/// Errors a [`SurfaceProvider`] can report.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// The host could not create a drawing surface.
    #[error("Drawing surface unavailable: {0}")]
    Unavailable(String),
    /// The requested surface would have no pixels.
    #[error("Drawing surface has no area ({width}x{height})")]
    Empty {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },
}

/// Placement of a surface requested from a [`SurfaceProvider`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceRequest {
    /// Top-left corner in screen pixels.
    pub position: Vec2,
    /// Size in pixels.
    pub size: Vec2,
}

/// Host capability that creates transparent, borderless drawing surfaces.
pub trait SurfaceProvider {
    /// The surface type handed out. Dropping it releases it.
    type Surface: Surface;

    /// Size of the visible screen area, in pixels.
    fn screen_size(&self) -> Vec2;

    /// Creates a surface covering `request`.
    fn acquire(&mut self, request: &SurfaceRequest) -> Result<Self::Surface, SurfaceError>;
}

/// Host capability that reports the cursor or caret location.
pub trait CursorLocator {
    /// Cursor position in screen pixels, if known.
    fn cursor_position(&self) -> Option<Vec2>;
}

/// A [`CursorLocator`] that never knows where the cursor is.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCursor;

impl CursorLocator for NoCursor {
    fn cursor_position(&self) -> Option<Vec2> {
        None
    }
}

impl CursorLocator for Option<Vec2> {
    fn cursor_position(&self) -> Option<Vec2> {
        *self
    }
}

/// Where a burst should start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Anchor {
    /// Resolve from a screen-relative position.
    Position(ConfettiPosition),
    /// An explicit point in screen pixels.
    Point(Vec2),
}

impl From<ConfettiPosition> for Anchor {
    fn from(position: ConfettiPosition) -> Self {
        Self::Position(position)
    }
}

impl From<Vec2> for Anchor {
    fn from(point: Vec2) -> Self {
        Self::Point(point)
    }
}

/// Resolves `position` to a point on a `screen`-sized area.
///
/// [`ConfettiPosition::Cursor`] uses `cursor` and falls back to the screen
/// center when the cursor is unknown. Cursor points are clamped to the screen.
pub fn resolve_anchor<C: CursorLocator + ?Sized>(
    position: ConfettiPosition,
    screen: Vec2,
    cursor: &C,
) -> Vec2 {
    match position {
        ConfettiPosition::Center => screen * 0.5,
        ConfettiPosition::Top => Vec2::new(screen.x * 0.5, screen.y * 0.25),
        ConfettiPosition::Bottom => Vec2::new(screen.x * 0.5, screen.y * 0.75),
        ConfettiPosition::Cursor => match cursor.cursor_position() {
            Some(point) => point.clamp(Vec2::ZERO, screen.max(Vec2::ZERO)),
            None => {
                debug!("confetti: cursor unavailable, anchoring at screen center");
                screen * 0.5
            }
        },
    }
}

/// One confetti burst: a surface, its population and the loop driving it.
///
/// The surface is released when the session is dropped, whichever way it
/// ended.
pub struct EffectSession<S: Surface> {
    id: u64,
    anchor: Vec2,
    surface: S,
    animation: AnimationLoop,
    renderer: Renderer,
}

impl<S: Surface> EffectSession<S> {
    /// Acquires a full-screen surface, spawns the population around `anchor`
    /// and draws the first frame.
    ///
    /// `settings` should already be sanitized.
    pub fn start<P, R>(
        id: u64,
        settings: &Settings,
        anchor: Vec2,
        provider: &mut P,
        rng: &mut R,
    ) -> Result<Self, SurfaceError>
    where
        P: SurfaceProvider<Surface = S> + ?Sized,
        R: Rng + ?Sized,
    {
        let request = SurfaceRequest {
            position: Vec2::ZERO,
            size: provider.screen_size(),
        };
        let surface = provider.acquire(&request)?;

        let particles = spawn_population(anchor, settings, rng);
        let mut animation = AnimationLoop::new(
            particles,
            surface.size(),
            TICK_DURATION,
            settings.duration(),
            rng.random(),
        );
        animation.start();

        let mut session = Self {
            id,
            anchor,
            surface,
            animation,
            renderer: Renderer::new(),
        };
        session.draw();
        Ok(session)
    }

    /// Session identifier, unique per [`ConfettiEffects`].
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Resolved spawn point.
    pub fn anchor(&self) -> Vec2 {
        self.anchor
    }

    /// The drawing surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// The animation loop.
    pub fn animation(&self) -> &AnimationLoop {
        &self.animation
    }

    /// Loop state.
    pub fn state(&self) -> LoopState {
        self.animation.state()
    }

    /// Returns `true` once the loop has stopped.
    pub fn is_finished(&self) -> bool {
        self.animation.state().is_stopped()
    }

    /// Frames drawn so far.
    pub fn frames(&self) -> u64 {
        self.renderer.frames()
    }

    /// Simulates one tick and repaints if the session is still running.
    pub fn step(&mut self) -> TickOutcome {
        let outcome = self.animation.tick();
        match outcome {
            TickOutcome::Advanced => self.draw(),
            TickOutcome::Finished(reason) => {
                self.surface.clear();
                self.surface.present();
                info!(
                    "confetti session {} finished after {} ticks: {reason:?}",
                    self.id,
                    self.animation.ticks()
                );
            }
            TickOutcome::Skipped => {}
        }
        outcome
    }

    /// Stops the session before its next tick.
    pub fn cancel(&mut self) {
        if !self.is_finished() {
            debug!("confetti session {} cancelled", self.id);
        }
        self.animation.cancel();
    }

    /// Steps until the session stops, calling `wait` between ticks, then
    /// releases the surface.
    pub fn run(mut self, mut wait: impl FnMut(Duration)) -> StopReason {
        loop {
            if let LoopState::Stopped(reason) = self.state() {
                return reason;
            }
            if let TickOutcome::Advanced = self.step() {
                wait(self.animation.tick_duration());
            }
        }
    }

    fn draw(&mut self) {
        if self.animation.state() != LoopState::Running {
            return;
        }
        let time_ms = self.animation.elapsed().as_secs_f64() * 1000.0;
        self.renderer
            .draw_frame(&mut self.surface, self.animation.particles(), time_ms);
    }
}

impl<S: Surface> Drop for EffectSession<S> {
    fn drop(&mut self) {
        debug!(
            "confetti session {} released its surface ({:?})",
            self.id,
            self.animation.state()
        );
    }
}

/// Entry point for triggering confetti.
///
/// Holds the host capabilities and every running [`EffectSession`]. The host
/// calls [`tick`](Self::tick) once per tick from the thread that owns its
/// surfaces.
pub struct ConfettiEffects<P: SurfaceProvider, C: CursorLocator> {
    provider: P,
    cursor: C,
    rng: StdRng,
    sessions: Vec<EffectSession<P::Surface>>,
    max_concurrent: usize,
    next_id: u64,
}

impl<P: SurfaceProvider, C: CursorLocator> ConfettiEffects<P, C> {
    /// Creates an idle effect runner seeded from the operating system.
    pub fn new(provider: P, cursor: C) -> Self {
        Self::from_rng(provider, cursor, StdRng::from_os_rng())
    }

    /// Creates an idle effect runner with a fixed seed, for reproducible bursts.
    pub fn with_seed(provider: P, cursor: C, seed: u64) -> Self {
        Self::from_rng(provider, cursor, StdRng::seed_from_u64(seed))
    }

    fn from_rng(provider: P, cursor: C, rng: StdRng) -> Self {
        Self {
            provider,
            cursor,
            rng,
            sessions: Vec::new(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            next_id: 0,
        }
    }

    /// Sets how many sessions may run at once. Values below one are raised to one.
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    /// Cap on simultaneously running sessions.
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// The surface provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// The surface provider, mutably.
    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    /// The cursor locator.
    pub fn cursor(&self) -> &C {
        &self.cursor
    }

    /// The cursor locator, mutably.
    pub fn cursor_mut(&mut self) -> &mut C {
        &mut self.cursor
    }

    /// Running sessions, oldest first.
    pub fn sessions(&self) -> &[EffectSession<P::Surface>] {
        &self.sessions
    }

    /// Number of running sessions.
    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` when no session is running.
    pub fn is_idle(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Starts a burst.
    ///
    /// Does nothing when `settings.enabled` is `false`. Settings are clamped
    /// into range first. When [`max_concurrent`](Self::max_concurrent) sessions
    /// are already running, the oldest is cancelled once the new session has
    /// its surface. Failures are logged, never returned, and leave running
    /// sessions untouched.
    pub fn run_effect(&mut self, settings: &Settings, anchor: impl Into<Anchor>) {
        if !settings.enabled {
            debug!("confetti: effect disabled, ignoring trigger");
            return;
        }
        let settings = settings.sanitized();
        let screen = self.provider.screen_size();
        let anchor = match anchor.into() {
            Anchor::Position(position) => resolve_anchor(position, screen, &self.cursor),
            Anchor::Point(point) => point,
        };

        let id = self.next_id;
        self.next_id += 1;
        let session =
            match EffectSession::start(id, &settings, anchor, &mut self.provider, &mut self.rng) {
                Ok(session) => session,
                Err(err) => {
                    error!("confetti: could not start session {id}: {err}");
                    return;
                }
            };
        info!(
            "confetti session {id} started: {} particles at ({:.0}, {:.0})",
            session.animation().particles().len(),
            anchor.x,
            anchor.y
        );
        if session.is_finished() {
            return;
        }

        while self.sessions.len() >= self.max_concurrent {
            let mut oldest = self.sessions.remove(0);
            info!("confetti: evicting session {} to make room for {id}", oldest.id());
            oldest.cancel();
        }
        self.sessions.push(session);
    }

    /// Starts a burst anchored at the configured position.
    pub fn trigger(&mut self, settings: &Settings) {
        self.run_effect(settings, settings.position);
    }

    /// Loads settings from `store` and starts a burst at the configured position.
    ///
    /// Unreadable settings fall back to defaults.
    pub fn run_from_store<St: SettingsStore + ?Sized>(&mut self, store: &St) {
        let settings = store.load_or_default();
        self.trigger(&settings);
    }

    /// Advances every session by one tick and drops the ones that stopped.
    pub fn tick(&mut self) {
        for session in &mut self.sessions {
            session.step();
        }
        self.sessions.retain(|session| !session.is_finished());
    }

    /// Ticks until every session has stopped, calling `wait` between ticks.
    pub fn run_until_idle(&mut self, mut wait: impl FnMut(Duration)) {
        while !self.sessions.is_empty() {
            self.tick();
            if !self.sessions.is_empty() {
                wait(TICK_DURATION);
            }
        }
    }

    /// Cancels and releases every running session.
    pub fn cancel_all(&mut self) {
        for session in &mut self.sessions {
            session.cancel();
        }
        self.sessions.clear();
    }
}
