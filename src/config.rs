use crate::ant::Instruction;
use crate::rng::weighted_choice;
use rand::Rng;
use serde::Deserialize;
use std::io;
use std::{fs, path::Path};

/// Grid topology. Determines the movement rule, the direction count, and
/// which instruction alphabet is in play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topology {
    Square,
    Hex,
}

/// Instruction alphabet tier. `Basic` is turns only; `Extended` adds
/// absolute headings, forward, and reverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlphabetTier {
    Basic,
    Extended,
}

/// How symbol weights are built when generating an instruction program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightStrategy {
    /// Every symbol weight 1.
    Constant,
    /// Every symbol gets an independent uniform weight, drawn once per
    /// generation call.
    Random,
    /// Like `Random`, but turn symbols get a second uniform weight added.
    DirectionPriority,
    /// Like `Random`, but north/south/east/west get the bonus instead.
    CardinalPriority,
}

/// Per-axis starting placement for ants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    /// Evenly distributed along the axis.
    Spaced,
    /// Middle of the axis.
    Static,
    /// Anywhere in bounds.
    Random,
}

/// The five mutually exclusive coloring models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Coloring {
    /// Precomputed palette indexed by cell state.
    Random,
    /// Three ants drive independent r/g/b counters per cell.
    RgbBlend,
    /// Hue from the last visiting ant, lightness from cell state.
    Hsl,
    /// Hue from last ant plus cell state, fixed lightness.
    HslGrade,
    /// `Hsl` until the first state wrap, then hue-cycling.
    HslShift,
}

/// Tile geometry used by the draw pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawStyle {
    Square,
    HexFlat,
    /// Hexagon shaded as if it were a 3-D cube. A rendering quirk kept for
    /// its looks, not a correctness requirement.
    HexDepth,
}

/// Partial configuration supplied by the user. Any present field replaces
/// the sampled value verbatim, before coloring-model-implied overrides.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Overrides {
    pub ant_count: Option<u32>,
    pub instruction_count: Option<u32>,
    pub topology: Option<Topology>,
    pub tile_size: Option<u32>,
    pub draw_style: Option<DrawStyle>,
    pub offset: Option<bool>,
    pub alphabet: Option<AlphabetTier>,
    pub weighting: Option<WeightStrategy>,
    pub placement_x: Option<Placement>,
    pub placement_y: Option<Placement>,
    pub coloring: Option<Coloring>,
    pub color_cycle: Option<u16>,
}

impl Overrides {
    /// Reads a partial configuration from a JSON file.
    pub fn load(path: &Path) -> io::Result<Self> {
        let json = fs::read_to_string(path)?;
        let overrides = serde_json::from_str(&json)?;
        Ok(overrides)
    }
}

/// One run's full parameter set. Sampled once per reset and immutable for
/// the lifetime of that run.
#[derive(Debug, Clone)]
pub struct Config {
    pub topology: Topology,
    pub tile_size: u32,
    pub draw_style: DrawStyle,
    /// Odd rows shifted half a tile. Always on for hex packing, rarely on
    /// for square boards.
    pub offset: bool,
    pub steps_per_draw: u32,
    pub direction_count: i32,
    pub instruction_count: u32,
    pub alphabet: AlphabetTier,
    pub weighting: WeightStrategy,
    pub ant_count: u32,
    pub placement_x: Placement,
    pub placement_y: Placement,
    pub coloring: Coloring,
    /// Hue range that ant identities are distributed across.
    pub color_cycle: u16,
    /// Random-palette lightness floor, in percent.
    pub palette_lightness_min: f32,
    /// Random-palette lightness range above the floor.
    pub palette_lightness_range: f32,
    /// Random-palette saturation, in percent.
    pub palette_saturation: f32,
}

impl Config {
    /// Samples a fresh configuration, then layers user overrides and
    /// coloring-model-implied overrides on top, in that order.
    pub fn sample(rng: &mut impl Rng, overrides: &Overrides) -> Self {
        let mut config = Self::sample_raw(rng);
        config.apply_overrides(overrides);
        config.apply_implied(rng);
        config
    }

    fn sample_raw(rng: &mut impl Rng) -> Self {
        let ant_count = *weighted_choice(
            rng,
            &[(1, 15.0), (2, 20.0), (3, 58.0), (4, 5.0), (5, 2.0)],
        );
        let magnitude = *weighted_choice(
            rng,
            &[
                (1u32, 1.0),
                (5, 1.0),
                (10, 2.0),
                (100, 1.0),
                (500, 0.5),
                (1000, 0.1),
            ],
        );
        let instruction_count = magnitude * rng.random_range(1..=10);

        let topology = *weighted_choice(rng, &[(Topology::Square, 3.0), (Topology::Hex, 1.0)]);
        let (tile_size, draw_style) = match topology {
            Topology::Square => {
                let tile = *weighted_choice(rng, &[(1u32, 90.0), (2, 10.0)]);
                (tile, DrawStyle::Square)
            }
            Topology::Hex => {
                let tile = *weighted_choice(
                    rng,
                    &[
                        (2u32, 40.0),
                        (4, 30.0),
                        (5, 10.0),
                        (6, 10.0),
                        (7, 5.0),
                        (8, 5.0),
                    ],
                );
                // Tiny hexagons degrade to squares; the hex outlines only
                // read at 3 px and up.
                let style = *weighted_choice(
                    rng,
                    &[
                        (DrawStyle::Square, if tile > 2 { 25.0 } else { 100.0 }),
                        (DrawStyle::HexFlat, if tile > 2 { 75.0 } else { 0.0 }),
                        (DrawStyle::HexDepth, if tile > 2 { 25.0 } else { 0.0 }),
                    ],
                );
                (tile, style)
            }
        };
        let offset =
            tile_size > 1 && (topology == Topology::Hex || rng.random::<f64>() > 0.95);

        let alphabet = *weighted_choice(
            rng,
            &[(AlphabetTier::Basic, 30.0), (AlphabetTier::Extended, 70.0)],
        );
        let weighting = *weighted_choice(
            rng,
            &[
                (WeightStrategy::Constant, 1.0),
                (WeightStrategy::Random, 1.0),
                (WeightStrategy::DirectionPriority, 0.5),
                (WeightStrategy::CardinalPriority, 0.3),
            ],
        );

        let placement_x = *weighted_choice(
            rng,
            &[
                (Placement::Spaced, 70.0),
                (Placement::Static, 10.0),
                (Placement::Random, 20.0),
            ],
        );
        // Both axes static centers every ant on one cell; keep it rare.
        let static_y_weight = if placement_x == Placement::Static {
            0.1
        } else {
            10.0
        };
        let placement_y = *weighted_choice(
            rng,
            &[
                (Placement::Spaced, 70.0),
                (Placement::Static, static_y_weight),
                (Placement::Random, 20.0),
            ],
        );

        let coloring = *weighted_choice(
            rng,
            &[
                (Coloring::Random, 15.0),
                (
                    Coloring::RgbBlend,
                    if instruction_count > 500 { 1.0 } else { 10.0 },
                ),
                (
                    Coloring::Hsl,
                    if instruction_count > 300 { 5.0 } else { 25.0 },
                ),
                (Coloring::HslGrade, 25.0),
                (Coloring::HslShift, 25.0),
            ],
        );

        let mut config = Config {
            topology,
            tile_size,
            draw_style,
            offset,
            steps_per_draw: 0,
            direction_count: 0,
            instruction_count,
            alphabet,
            weighting,
            ant_count,
            placement_x,
            placement_y,
            coloring,
            color_cycle: 360,
            palette_lightness_min: 20.0,
            palette_lightness_range: 50.0,
            palette_saturation: 100.0,
        };
        config.derive();
        config
    }

    fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(value) = overrides.ant_count {
            self.ant_count = value;
        }
        if let Some(value) = overrides.instruction_count {
            self.instruction_count = value.max(1);
        }
        if let Some(value) = overrides.topology {
            self.topology = value;
        }
        if let Some(value) = overrides.tile_size {
            self.tile_size = value.max(1);
        }
        if let Some(value) = overrides.draw_style {
            self.draw_style = value;
        }
        if let Some(value) = overrides.offset {
            self.offset = value;
        }
        if let Some(value) = overrides.alphabet {
            self.alphabet = value;
        }
        if let Some(value) = overrides.weighting {
            self.weighting = value;
        }
        if let Some(value) = overrides.placement_x {
            self.placement_x = value;
        }
        if let Some(value) = overrides.placement_y {
            self.placement_y = value;
        }
        if let Some(value) = overrides.coloring {
            self.coloring = value;
        }
        if let Some(value) = overrides.color_cycle {
            self.color_cycle = value;
        }
        // Overrides may have changed the inputs these derive from.
        self.derive();
    }

    /// Overrides implied by the coloring model. Run last: they win over
    /// both the random draw and the user's values.
    fn apply_implied(&mut self, rng: &mut impl Rng) {
        match self.coloring {
            Coloring::RgbBlend => {
                // One ant per channel, exactly.
                self.ant_count = 3;
            }
            Coloring::Hsl | Coloring::HslGrade | Coloring::HslShift => {
                self.color_cycle = *weighted_choice(
                    rng,
                    &[
                        (360u16, 45.0),
                        (300, 10.0),
                        (240, 25.0),
                        (180, 5.0),
                        (120, 10.0),
                        (60, 5.0),
                    ],
                );
            }
            Coloring::Random => {}
        }
    }

    fn derive(&mut self) {
        self.steps_per_draw = 1000u32.div_ceil(self.tile_size * self.tile_size);
        self.direction_count = match self.topology {
            Topology::Square => 4,
            Topology::Hex => 6,
        };
        // Hex packing only works with offset rows; 1 px tiles can't shift.
        if self.topology == Topology::Hex {
            self.offset = true;
        }
        if self.tile_size <= 1 {
            self.offset = false;
        }
    }

    /// The symbol pool for this run's `(topology, alphabet)` pair.
    pub fn instruction_pool(&self) -> &'static [Instruction] {
        use Instruction::*;
        match (self.topology, self.alphabet) {
            (Topology::Square, AlphabetTier::Basic) => &[Left, Right],
            (Topology::Square, AlphabetTier::Extended) => {
                &[Left, Right, North, South, East, West, Forward, Reverse]
            }
            (Topology::Hex, AlphabetTier::Basic) => &[Left, Right, Left2, Right2],
            (Topology::Hex, AlphabetTier::Extended) => &[
                Left, Right, Left2, Right2, Forward, Reverse, Northeast, East, Southeast,
                Southwest, West, Northwest,
            ],
        }
    }

    /// Generates one instruction program of `instruction_count` symbols,
    /// drawn independently (with replacement) from the pool under this
    /// run's weighting strategy.
    pub fn generate_instructions(&self, rng: &mut impl Rng) -> Vec<Instruction> {
        let weights: Vec<(Instruction, f64)> = self
            .instruction_pool()
            .iter()
            .map(|&symbol| {
                let weight = match self.weighting {
                    WeightStrategy::Constant => 1.0,
                    WeightStrategy::Random => rng.random::<f64>(),
                    WeightStrategy::DirectionPriority => {
                        let mut weight = rng.random::<f64>();
                        if symbol.is_turn() {
                            weight += rng.random::<f64>();
                        }
                        weight
                    }
                    WeightStrategy::CardinalPriority => {
                        let mut weight = rng.random::<f64>();
                        if symbol.is_cardinal() {
                            weight += rng.random::<f64>();
                        }
                        weight
                    }
                };
                (symbol, weight)
            })
            .collect();

        let mut instructions: Vec<Instruction> = (0..self.instruction_count)
            .map(|_| *weighted_choice(rng, &weights))
            .collect();

        // A 2-symbol program of identical symbols is a dead oscillator that
        // never explores; redraw the second symbol without the first.
        if instructions.len() == 2 && instructions[0] == instructions[1] {
            let remaining: Vec<(Instruction, f64)> = weights
                .into_iter()
                .filter(|(symbol, _)| *symbol != instructions[0])
                .collect();
            if !remaining.is_empty() {
                instructions[1] = *weighted_choice(rng, &remaining);
            }
        }
        instructions
    }

    /// Short human-readable summary for the debug panel.
    pub fn summary(&self) -> Vec<String> {
        vec![
            format!("ants: {}", self.ant_count),
            format!("topology: {:?}", self.topology),
            format!("alphabet: {:?}", self.alphabet),
            format!("weighting: {:?}", self.weighting),
            format!("coloring: {:?}", self.coloring),
            format!("draw: {:?}", self.draw_style),
            format!("instructions: {}", self.instruction_count),
            format!("tile: {}px", self.tile_size),
        ]
    }
}
