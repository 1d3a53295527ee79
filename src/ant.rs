use crate::board::Board;
use crate::config::{Config, Topology};

/// One of the three blend counters an ant can drive under `rgb_blend`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    R,
    G,
    B,
}

/// Ant identity. A hue for the HSL-family coloring models, a color channel
/// under `rgb_blend`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AntId {
    Hue(u16),
    Channel(Channel),
}

/// A movement symbol. Programs are ordered sequences of these, indexed by
/// the visited cell's state counter.
///
/// Square boards number directions 0..4 clockwise from north; hex boards
/// number 0..6 clockwise from northeast. Absolute symbols always set the
/// same raw direction value regardless of topology, so a few of them alias
/// on hex boards. That aliasing is part of the emergent behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Left,
    Right,
    /// Double left turn (hex alphabet only).
    Left2,
    /// Double right turn (hex alphabet only).
    Right2,
    North,
    East,
    South,
    West,
    Northeast,
    Northwest,
    Southeast,
    Southwest,
    Forward,
    Reverse,
}

impl Instruction {
    /// Turn symbols, the ones boosted by `direction_priority` weighting.
    pub fn is_turn(self) -> bool {
        matches!(
            self,
            Instruction::Left | Instruction::Right | Instruction::Left2 | Instruction::Right2
        )
    }

    /// Compass symbols boosted by `cardinal_priority` weighting.
    pub fn is_cardinal(self) -> bool {
        matches!(
            self,
            Instruction::North | Instruction::South | Instruction::East | Instruction::West
        )
    }

    /// Applies this symbol to a direction. The result may leave the valid
    /// range; the next `step()` normalizes it.
    fn apply(self, direction: i32, direction_count: i32) -> i32 {
        match self {
            Instruction::Left => direction - 1,
            Instruction::Right => direction + 1,
            Instruction::Left2 => direction - 2,
            Instruction::Right2 => direction + 2,
            Instruction::North | Instruction::Northeast => 0,
            Instruction::East => 1,
            Instruction::South => 2,
            Instruction::West | Instruction::Southeast => 3,
            Instruction::Southwest => 4,
            Instruction::Northwest => 5,
            Instruction::Forward => direction,
            Instruction::Reverse => direction + direction_count / 2,
        }
    }
}

/// One mobile agent. Created at reset, dropped at the next reset.
#[derive(Debug, Clone)]
pub struct Ant {
    id: AntId,
    x: i32,
    y: i32,
    direction: i32,
    steps: u64,
    instructions: Vec<Instruction>,
}

impl Ant {
    pub fn new(id: AntId, position: (i32, i32), direction: i32, instructions: Vec<Instruction>) -> Self {
        Self {
            id,
            x: position.0,
            y: position.1,
            direction,
            steps: 0,
            instructions,
        }
    }

    pub fn id(&self) -> AntId {
        self.id
    }

    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    #[cfg(test)]
    pub fn set_direction(&mut self, direction: i32) {
        self.direction = direction;
    }

    /// Advances one cell. Normalizes the direction into range, applies the
    /// topology movement rule, and wraps toroidally on both axes.
    ///
    /// Hex boards use offset addressing: odd rows sit half a tile east, so
    /// east-leaning diagonals shift x only on odd rows and west-leaning
    /// diagonals only on even rows.
    pub fn step(&mut self, config: &Config, size: (i32, i32)) {
        self.steps += 1;
        self.direction = self.direction.rem_euclid(config.direction_count);
        match config.topology {
            Topology::Hex => match self.direction {
                0 => {
                    // Northeast
                    if self.y.rem_euclid(2) == 1 {
                        self.x += 1;
                    }
                    self.y -= 1;
                }
                1 => self.x += 1, // East
                2 => {
                    // Southeast
                    if self.y.rem_euclid(2) == 1 {
                        self.x += 1;
                    }
                    self.y += 1;
                }
                3 => {
                    // Southwest
                    if self.y.rem_euclid(2) == 0 {
                        self.x -= 1;
                    }
                    self.y += 1;
                }
                4 => self.x -= 1, // West
                5 => {
                    // Northwest
                    if self.y.rem_euclid(2) == 0 {
                        self.x -= 1;
                    }
                    self.y -= 1;
                }
                _ => {}
            },
            Topology::Square => match self.direction {
                0 => self.y -= 1, // North
                1 => self.x += 1, // East
                2 => self.y += 1, // South
                3 => self.x -= 1, // West
                _ => {}
            },
        }
        self.x = self.x.rem_euclid(size.0);
        self.y = self.y.rem_euclid(size.1);
    }

    /// One full tick: move, read the cell under the new position, apply the
    /// program symbol indexed by that cell's state. A state beyond the
    /// program length is a no-op, never a fault.
    pub fn process(&mut self, board: &Board, config: &Config) {
        self.step(config, board.size());
        let state = board.state_at((self.x, self.y), self.id);
        if let Some(&symbol) = self.instructions.get(state as usize) {
            self.direction = symbol.apply(self.direction, config.direction_count);
        }
    }
}
