use std::time::Duration;

use bevy::prelude::*;
use rand::{SeedableRng, rngs::StdRng};

use crate::particle::Particle;

/// Length of one simulation tick (~60Hz).
pub const TICK_DURATION: Duration = Duration::from_millis(16);

/// Most ticks [`SimulationClock::consume`] will hand out for a single frame.
pub const MAX_STEPS_PER_FRAME: u32 = 8;

const MIN_TICK: Duration = Duration::from_millis(1);

/// Turns variable host frame deltas into whole fixed-length ticks.
#[derive(Debug, Clone, Copy)]
pub struct SimulationClock {
    tick: Duration,
    accumulated: Duration,
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new(TICK_DURATION)
    }
}

impl SimulationClock {
    /// Creates a clock producing ticks of length `tick`.
    pub fn new(tick: Duration) -> Self {
        Self {
            tick: sanitize_tick(tick),
            accumulated: Duration::ZERO,
        }
    }

    /// Length of one tick.
    pub fn tick(&self) -> Duration {
        self.tick
    }

    /// Time carried over to the next frame.
    pub fn accumulated(&self) -> Duration {
        self.accumulated
    }

    /// Adds `frame_delta` and returns how many ticks are now due.
    ///
    /// When more than [`MAX_STEPS_PER_FRAME`] ticks are due, the backlog is
    /// dropped instead of being replayed.
    pub fn consume(&mut self, frame_delta: Duration) -> u32 {
        self.accumulated += frame_delta;
        let mut steps = 0;
        while self.accumulated >= self.tick {
            self.accumulated -= self.tick;
            steps += 1;
            if steps >= MAX_STEPS_PER_FRAME {
                self.accumulated = Duration::ZERO;
                break;
            }
        }
        steps
    }

    /// Forgets any carried-over time.
    pub fn reset(&mut self) {
        self.accumulated = Duration::ZERO;
    }
}

fn sanitize_tick(tick: Duration) -> Duration {
    debug_assert!(!tick.is_zero(), "tick duration must be positive");
    tick.max(MIN_TICK)
}

/// Why an [`AnimationLoop`] stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopReason {
    /// Every particle expired or left the screen.
    Extinct,
    /// The configured duration elapsed.
    TimedOut,
    /// [`AnimationLoop::cancel`] was called.
    Cancelled,
}

/// Lifecycle of an [`AnimationLoop`].
///
/// `Idle -> Running -> Stopped(reason)`; there is no way back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoopState {
    /// Created, not yet started.
    #[default]
    Idle,
    /// Ticking.
    Running,
    /// Finished; further ticks are ignored.
    Stopped(StopReason),
}

impl LoopState {
    /// Returns `true` once the loop has stopped for any reason.
    pub fn is_stopped(self) -> bool {
        matches!(self, Self::Stopped(_))
    }
}

/// Result of one call to [`AnimationLoop::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The loop was not running; nothing happened.
    Skipped,
    /// A tick was simulated and the loop keeps running.
    Advanced,
    /// A tick was simulated and the loop stopped as a result.
    Finished(StopReason),
}

/// Fixed-step driver for one particle population.
///
/// Owns the population, the simulation time and the randomness used for
/// per-tick jitter. A tick advances every particle, prunes the dead ones and
/// then checks extinction before the timeout.
#[derive(Debug)]
pub struct AnimationLoop {
    particles: Vec<Particle>,
    bounds: Vec2,
    tick: Duration,
    timeout: Duration,
    elapsed: Duration,
    ticks: u64,
    state: LoopState,
    rng: StdRng,
}

impl AnimationLoop {
    /// Creates an idle loop over `particles`, culling against a `bounds`-sized screen.
    pub fn new(
        particles: Vec<Particle>,
        bounds: Vec2,
        tick: Duration,
        timeout: Duration,
        seed: u64,
    ) -> Self {
        Self {
            particles,
            bounds,
            tick: sanitize_tick(tick),
            timeout,
            elapsed: Duration::ZERO,
            ticks: 0,
            state: LoopState::Idle,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Current state.
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Live particles.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Simulated time since start.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Simulated time since start, in seconds.
    pub fn time_seconds(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    /// Number of ticks simulated so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Length of one tick.
    pub fn tick_duration(&self) -> Duration {
        self.tick
    }

    /// Upper bound on simulated time.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Screen size used for culling.
    pub fn bounds(&self) -> Vec2 {
        self.bounds
    }

    /// Moves an idle loop to [`LoopState::Running`].
    ///
    /// An empty population stops immediately as [`StopReason::Extinct`].
    pub fn start(&mut self) {
        if self.state != LoopState::Idle {
            return;
        }
        self.state = if self.particles.is_empty() {
            LoopState::Stopped(StopReason::Extinct)
        } else {
            LoopState::Running
        };
    }

    /// Stops a loop that has not already finished.
    pub fn cancel(&mut self) {
        if !self.state.is_stopped() {
            self.state = LoopState::Stopped(StopReason::Cancelled);
        }
    }

    /// Simulates one tick.
    pub fn tick(&mut self) -> TickOutcome {
        if self.state != LoopState::Running {
            return TickOutcome::Skipped;
        }

        self.elapsed += self.tick;
        self.ticks += 1;
        let time = self.elapsed.as_secs_f32();
        let tick_seconds = self.tick.as_secs_f32();

        for particle in &mut self.particles {
            particle.update(time, tick_seconds, &mut self.rng);
        }
        let bounds = self.bounds;
        self.particles.retain(|particle| !particle.should_remove(bounds));

        let stop = if self.particles.is_empty() {
            Some(StopReason::Extinct)
        } else if self.elapsed + self.tick > self.timeout {
            Some(StopReason::TimedOut)
        } else {
            None
        };

        match stop {
            Some(reason) => {
                self.state = LoopState::Stopped(reason);
                TickOutcome::Finished(reason)
            }
            None => TickOutcome::Advanced,
        }
    }

    /// Ticks until the loop stops, returning why.
    ///
    /// Starts an idle loop first. Always terminates: the timeout bounds the
    /// number of ticks.
    pub fn run_to_end(&mut self) -> StopReason {
        self.start();
        loop {
            if let LoopState::Stopped(reason) = self.state {
                return reason;
            }
            self.tick();
        }
    }
}
