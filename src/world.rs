use crate::ant::{Ant, AntId, Channel};
use crate::board::Board;
use crate::cleaner::{CleanerState, ScreenCleaner};
use crate::config::{Coloring, Config, Overrides, Placement};
use crate::surface::Surface;
use rand::Rng;
use rand::rngs::StdRng;
use std::time::Duration;

/// How often the frame clock may advance the simulation.
const UPDATE_INTERVAL: Duration = Duration::from_millis(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Paused,
    Running,
    /// A transition animation is playing; the next reset follows it.
    Resetting,
}

/// Owns one run's rules, board, and inhabitants, plus the run/pause/reset
/// state machine that strings epochs together.
pub struct World {
    rng: StdRng,
    overrides: Overrides,
    viewport: (u32, u32),
    config: Config,
    board: Board,
    ants: Vec<Ant>,
    cleaner: ScreenCleaner,
    state: RunState,
    last_render: Duration,
    time_active: Duration,
    reset_after: Duration,
}

impl World {
    pub fn new(
        mut rng: StdRng,
        overrides: Overrides,
        viewport: (u32, u32),
        reset_after: Duration,
    ) -> Self {
        let config = Config::sample(&mut rng, &overrides);
        let board = Board::initialize(&config, viewport, &mut rng);
        let mut world = Self {
            rng,
            overrides,
            viewport,
            config,
            board,
            ants: Vec::new(),
            cleaner: ScreenCleaner::new(),
            state: RunState::Paused,
            last_render: Duration::ZERO,
            time_active: Duration::ZERO,
            reset_after,
        };
        world.spawn_ants();
        world.resume();
        world
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Steps taken by all ants this epoch, for the debug overlay.
    pub fn total_steps(&self) -> u64 {
        self.ants.iter().map(Ant::steps).sum()
    }

    #[cfg(test)]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[cfg(test)]
    pub fn ants(&self) -> &[Ant] {
        &self.ants
    }

    pub fn pause(&mut self) {
        self.state = RunState::Paused;
    }

    pub fn resume(&mut self) {
        self.state = RunState::Running;
    }

    pub fn toggle_pause(&mut self) {
        match self.state {
            RunState::Running => self.pause(),
            RunState::Paused => self.resume(),
            RunState::Resetting => {}
        }
    }

    /// Kicks off the transition animation; the reset itself happens when
    /// the animation completes.
    pub fn begin_transition(&mut self) {
        if self.state != RunState::Resetting {
            self.state = RunState::Resetting;
            self.cleaner.start(&mut self.rng, self.viewport);
        }
    }

    /// Samples a fresh epoch: new Config, new Board, new ants. The old
    /// grid and agents are dropped wholesale.
    pub fn reset(&mut self) {
        self.pause();
        self.config = Config::sample(&mut self.rng, &self.overrides);
        self.board = Board::initialize(&self.config, self.viewport, &mut self.rng);
        self.time_active = Duration::ZERO;
        self.spawn_ants();
        self.resume();
    }

    /// A viewport change invalidates the board geometry; start over.
    pub fn resize(&mut self, viewport: (u32, u32)) {
        self.viewport = viewport;
        self.reset();
    }

    /// Creates this epoch's ants. Hue identities spread the color cycle
    /// evenly from a random starting offset; under `rgb_blend` the three
    /// ants take the r/g/b channels instead.
    fn spawn_ants(&mut self) {
        self.ants.clear();
        let (size_x, size_y) = self.board.size();
        let count = self.config.ant_count;
        let hue_offset = self.rng.random_range(0..360u32);
        for i in 0..count {
            let id = if self.config.coloring == Coloring::RgbBlend {
                AntId::Channel([Channel::R, Channel::G, Channel::B][(i % 3) as usize])
            } else {
                let hue = (hue_offset + self.config.color_cycle as u32 * i / count) % 360;
                AntId::Hue(hue as u16)
            };
            let x = self.place(self.config.placement_x, size_x, i, count);
            let y = self.place(self.config.placement_y, size_y, i, count);
            let direction = self.rng.random_range(0..self.config.direction_count);
            let instructions = self.config.generate_instructions(&mut self.rng);
            self.ants.push(Ant::new(id, (x, y), direction, instructions));
        }
    }

    fn place(&mut self, placement: Placement, span: i32, index: u32, count: u32) -> i32 {
        match placement {
            Placement::Random => self.rng.random_range(0..span),
            Placement::Static => span / 2,
            Placement::Spaced => (span as i64 * (index as i64 + 1) / (count as i64 + 1)) as i32,
        }
    }

    /// One simulation step for every ant, strictly in spawn order. Later
    /// ants observe cell mutations made by earlier ants in the same tick.
    pub fn update(&mut self) {
        for ant in &mut self.ants {
            ant.process(&self.board, &self.config);
            self.board.update_cell_state(ant.position(), ant.id());
        }
    }

    /// A fixed batch of updates followed by exactly one draw.
    pub fn iterate(&mut self, surface: &mut dyn Surface) {
        for _ in 0..self.config.steps_per_draw {
            self.update();
        }
        self.board.draw(surface);
    }

    fn update_reset(&mut self, surface: &mut dyn Surface) {
        self.cleaner.update();
        self.cleaner.draw(surface);
        if self.cleaner.state() == CleanerState::Done {
            self.cleaner.done();
            self.reset();
        }
    }

    /// Frame-clock entry point. `timestamp` is time since host start; the
    /// world only advances once `UPDATE_INTERVAL` has elapsed since the
    /// last advance, so calling this at any cadence is safe. Returns true
    /// when a new frame was produced.
    pub fn tick(&mut self, timestamp: Duration, surface: &mut dyn Surface) -> bool {
        let progress = timestamp.saturating_sub(self.last_render);
        if progress < UPDATE_INTERVAL {
            return false;
        }
        self.last_render = timestamp;
        match self.state {
            RunState::Running => {
                self.iterate(surface);
                self.time_active += progress;
                if self.time_active >= self.reset_after {
                    self.begin_transition();
                }
                true
            }
            RunState::Resetting => {
                self.update_reset(surface);
                true
            }
            RunState::Paused => false,
        }
    }
}
