use crate::ant::{AntId, Channel};
use crate::config::{Coloring, Config, DrawStyle};
use crate::surface::{Shade, Surface};
use rand::Rng;
use std::f32::consts::TAU;

/// One grid cell. Fixed shape: every coloring model's fields are present,
/// only the active model's fields get used.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    /// Shared visit counter, always `< instruction_count`.
    pub state: u32,
    /// How many times `state` has wrapped.
    pub shift: u32,
    pub dirty: bool,
    /// Hue of the most recent visitor, if any.
    pub last_ant: Option<u16>,
    pub r: u32,
    pub g: u32,
    pub b: u32,
}

/// The toroidal grid plus this run's coloring model and draw geometry.
/// Cells materialize on first visit; the whole grid is dropped on reset.
pub struct Board {
    size_x: i32,
    size_y: i32,
    tile: f32,
    offset: bool,
    draw_style: DrawStyle,
    coloring: Coloring,
    instruction_count: u32,
    grid: Vec<Option<Cell>>,
    palette: Vec<Shade>,
}

impl Board {
    /// Computes grid dimensions from the viewport, allocates the lazy grid,
    /// and precomputes the palette when the coloring model needs one.
    ///
    /// Offset packing loses half a tile on alternating rows, so one column
    /// is dropped to avoid a visual overhang at the right edge.
    pub fn initialize(config: &Config, viewport: (u32, u32), rng: &mut impl Rng) -> Self {
        let mut size_x = (viewport.0 / config.tile_size) as i32;
        let size_y = ((viewport.1 / config.tile_size) as i32).max(1);
        if config.offset {
            size_x -= 1;
        }
        let size_x = size_x.max(1);

        let palette = match config.coloring {
            Coloring::Random => generate_palette(config, rng),
            _ => Vec::new(),
        };

        Self {
            size_x,
            size_y,
            tile: config.tile_size as f32,
            offset: config.offset,
            draw_style: config.draw_style,
            coloring: config.coloring,
            instruction_count: config.instruction_count.max(1),
            grid: vec![None; (size_x * size_y) as usize],
            palette,
        }
    }

    pub fn size(&self) -> (i32, i32) {
        (self.size_x, self.size_y)
    }

    fn index(&self, position: (i32, i32)) -> usize {
        (position.1 * self.size_x + position.0) as usize
    }

    #[cfg(test)]
    pub fn cell(&self, position: (i32, i32)) -> Option<&Cell> {
        self.grid[self.index(position)].as_ref()
    }

    /// The state an ant at `position` observes. Unvisited cells read as 0
    /// without being allocated. Under `rgb_blend` each ant sees only its
    /// own channel's counter.
    pub fn state_at(&self, position: (i32, i32), id: AntId) -> u32 {
        let Some(cell) = &self.grid[self.index(position)] else {
            return 0;
        };
        if self.coloring == Coloring::RgbBlend {
            if let AntId::Channel(channel) = id {
                return match channel {
                    Channel::R => cell.r,
                    Channel::G => cell.g,
                    Channel::B => cell.b,
                };
            }
        }
        cell.state
    }

    /// Registers a visit: allocates the cell if needed, marks it dirty, and
    /// advances the counter the coloring model cares about.
    ///
    /// Blend channels wrap modulo `instruction_count` independently and do
    /// not track `shift`; the shared counter does.
    pub fn update_cell_state(&mut self, position: (i32, i32), id: AntId) {
        let index = self.index(position);
        let count = self.instruction_count;
        let coloring = self.coloring;
        let cell = self.grid[index].get_or_insert_with(Cell::default);
        cell.dirty = true;

        if coloring == Coloring::RgbBlend {
            if let AntId::Channel(channel) = id {
                let counter = match channel {
                    Channel::R => &mut cell.r,
                    Channel::G => &mut cell.g,
                    Channel::B => &mut cell.b,
                };
                *counter = (*counter + 1) % count;
            }
            return;
        }

        cell.state += 1;
        if let AntId::Hue(hue) = id {
            cell.last_ant = Some(hue);
        }
        if cell.state >= count {
            cell.state %= count;
            cell.shift += 1;
        }
    }

    /// Hue advance for `hsl_shift` once a cell has wrapped at least once.
    fn shift_hue(&self, cell: &Cell) -> f32 {
        let base = cell.last_ant.unwrap_or(0) as f32;
        base + ((cell.shift - 1) * self.instruction_count + cell.state) as f32
    }

    /// Resolves a cell's color under the active model. Pure: repeated calls
    /// on an unmutated cell return the same shade.
    pub fn color_of(&self, cell: &Cell) -> Shade {
        match self.coloring {
            Coloring::Random => self
                .palette
                .get(cell.state as usize)
                .copied()
                .unwrap_or(Shade::BLACK),
            Coloring::RgbBlend => Shade::rgb(
                (255 * cell.r / self.instruction_count) as u8,
                (255 * cell.g / self.instruction_count) as u8,
                (255 * cell.b / self.instruction_count) as u8,
            ),
            Coloring::Hsl => match cell.last_ant {
                Some(hue) => Shade::hsl(hue as f32, 100.0, cell.state as f32),
                None => Shade::BLACK,
            },
            Coloring::HslGrade => match cell.last_ant {
                Some(hue) => Shade::hsl((hue as u32 + cell.state) as f32, 100.0, 50.0),
                None => Shade::BLACK,
            },
            Coloring::HslShift => match cell.last_ant {
                Some(hue) => {
                    if cell.shift > 0 {
                        Shade::hsl(self.shift_hue(cell), 100.0, 50.0)
                    } else {
                        Shade::hsl(hue as f32, 100.0, cell.state as f32)
                    }
                }
                None => Shade::BLACK,
            },
        }
    }

    /// Paints every dirty cell and clears its flag. Never-visited cells are
    /// skipped entirely.
    pub fn draw(&mut self, surface: &mut dyn Surface) {
        for index in 0..self.grid.len() {
            let Some(cell) = &self.grid[index] else {
                continue;
            };
            if !cell.dirty {
                continue;
            }
            let shade = self.color_of(cell);
            let col = index as i32 % self.size_x;
            let row = index as i32 / self.size_x;
            match self.draw_style {
                DrawStyle::Square => self.draw_square(surface, col, row, shade),
                DrawStyle::HexFlat => self.draw_hex_flat(surface, col, row, shade),
                DrawStyle::HexDepth => self.draw_hex_depth(surface, col, row, shade),
            }
            if let Some(cell) = &mut self.grid[index] {
                cell.dirty = false;
            }
        }
    }

    fn row_offset(&self, row: i32) -> f32 {
        if self.offset && row % 2 == 1 {
            self.tile / 2.0
        } else {
            0.0
        }
    }

    fn draw_square(&self, surface: &mut dyn Surface, col: i32, row: i32, shade: Shade) {
        let offset = self.row_offset(row);
        surface.fill_rect(
            col as f32 * self.tile + offset,
            row as f32 * self.tile,
            self.tile,
            self.tile,
            shade,
        );
    }

    fn draw_hex_flat(&self, surface: &mut dyn Surface, col: i32, row: i32, shade: Shade) {
        let radius = self.tile / 2.0;
        let center_x = col as f32 * self.tile + if row % 2 == 1 { self.tile } else { radius };
        let center_y = row as f32 * self.tile + radius;
        let points: Vec<(f32, f32)> = (1..=6)
            .map(|i| {
                let angle = i as f32 * TAU / 6.0;
                (
                    center_x + radius * angle.sin(),
                    center_y + radius * angle.cos(),
                )
            })
            .collect();
        surface.fill_polygon(&points, shade);
    }

    /// Shades the hex as if it were a 3-D cube. Kept from an early drawing
    /// mistake that looked better than the fix.
    fn draw_hex_depth(&self, surface: &mut dyn Surface, col: i32, row: i32, shade: Shade) {
        let tile = self.tile;
        let half = tile / 2.0;
        let offset = if row % 2 == 1 { half } else { 0.0 };
        let left = col as f32 * tile + offset;
        let top = row as f32 * tile;
        let points = [
            (left, top + 2.0),
            (left + half, top - 2.0),
            (left + tile, top + 2.0),
            (
                left + tile - if offset > 0.0 { 0.0 } else { half },
                top + tile - 2.0,
            ),
            (left + half, top + tile + 2.0),
            (left, top + tile - 2.0),
        ];
        surface.fill_polygon(&points, shade);
    }
}

fn generate_palette(config: &Config, rng: &mut impl Rng) -> Vec<Shade> {
    let mut palette = vec![Shade::BLACK];
    for _ in 1..config.instruction_count {
        let lightness =
            config.palette_lightness_min + rng.random::<f32>() * config.palette_lightness_range;
        let hue = rng.random::<f32>() * 360.0;
        palette.push(Shade::hsl(hue, config.palette_saturation, lightness));
    }
    palette
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Overrides, Topology};
    use rand::{SeedableRng, rngs::StdRng};

    fn board_with(coloring: Coloring, instruction_count: u32) -> Board {
        let mut rng = StdRng::seed_from_u64(2);
        let overrides = Overrides {
            topology: Some(Topology::Square),
            tile_size: Some(1),
            offset: Some(false),
            coloring: Some(coloring),
            instruction_count: Some(instruction_count),
            ..Overrides::default()
        };
        let config = Config::sample(&mut rng, &overrides);
        Board::initialize(&config, (10, 10), &mut rng)
    }

    #[test]
    fn unvisited_cells_read_zero_without_allocating() {
        let board = board_with(Coloring::Hsl, 4);
        assert_eq!(board.state_at((3, 3), AntId::Hue(10)), 0);
        assert!(board.cell((3, 3)).is_none());
    }

    #[test]
    fn state_wraps_after_instruction_count_visits() {
        let mut board = board_with(Coloring::Hsl, 5);
        for _ in 0..5 {
            board.update_cell_state((2, 2), AntId::Hue(90));
        }
        let cell = board.cell((2, 2)).unwrap();
        assert_eq!(cell.state, 0);
        assert_eq!(cell.shift, 1);
        assert_eq!(cell.last_ant, Some(90));
        assert!(cell.dirty);
    }

    #[test]
    fn rgb_blend_touches_only_the_named_channel() {
        let mut board = board_with(Coloring::RgbBlend, 4);
        board.update_cell_state((1, 1), AntId::Channel(Channel::G));
        board.update_cell_state((1, 1), AntId::Channel(Channel::G));
        let cell = board.cell((1, 1)).unwrap();
        assert_eq!((cell.r, cell.g, cell.b), (0, 2, 0));
        assert_eq!(cell.state, 0);
        assert_eq!(cell.shift, 0);
        assert_eq!(board.state_at((1, 1), AntId::Channel(Channel::G)), 2);
        assert_eq!(board.state_at((1, 1), AntId::Channel(Channel::R)), 0);
    }

    #[test]
    fn rgb_blend_channels_wrap_without_shift() {
        let mut board = board_with(Coloring::RgbBlend, 3);
        for _ in 0..3 {
            board.update_cell_state((0, 0), AntId::Channel(Channel::B));
        }
        let cell = board.cell((0, 0)).unwrap();
        assert_eq!(cell.b, 0);
        assert_eq!(cell.shift, 0);
    }

    #[test]
    fn color_resolution_is_idempotent() {
        let mut board = board_with(Coloring::HslGrade, 8);
        board.update_cell_state((4, 4), AntId::Hue(200));
        let cell = board.cell((4, 4)).unwrap().clone();
        assert_eq!(board.color_of(&cell), board.color_of(&cell));
    }

    #[test]
    fn hsl_shift_second_wrap_advances_hue_strictly() {
        let board = board_with(Coloring::HslShift, 7);
        let first_wrap = Cell {
            state: 2,
            shift: 1,
            last_ant: Some(40),
            ..Cell::default()
        };
        let second_wrap = Cell {
            shift: 2,
            ..first_wrap.clone()
        };
        assert!(board.shift_hue(&second_wrap) > board.shift_hue(&first_wrap));
    }

    #[test]
    fn hsl_models_paint_unvisited_history_black() {
        let board = board_with(Coloring::Hsl, 4);
        let cell = Cell::default();
        assert_eq!(board.color_of(&cell), Shade::BLACK);
    }

    #[test]
    fn random_palette_has_black_floor_and_full_length() {
        let board = board_with(Coloring::Random, 16);
        assert_eq!(board.palette.len(), 16);
        assert_eq!(board.palette[0], Shade::BLACK);
        let cell = Cell::default();
        assert_eq!(board.color_of(&cell), Shade::BLACK);
    }

    #[test]
    fn rgb_blend_color_scales_channels_linearly() {
        let board = board_with(Coloring::RgbBlend, 10);
        let cell = Cell {
            r: 5,
            g: 0,
            b: 10,
            ..Cell::default()
        };
        let shade = board.color_of(&cell);
        assert_eq!((shade.r, shade.g, shade.b), (127, 0, 255));
    }

    #[test]
    fn offset_board_drops_one_column() {
        let mut rng = StdRng::seed_from_u64(9);
        let overrides = Overrides {
            topology: Some(Topology::Hex),
            tile_size: Some(2),
            coloring: Some(Coloring::Hsl),
            ..Overrides::default()
        };
        let config = Config::sample(&mut rng, &overrides);
        assert!(config.offset);
        let board = Board::initialize(&config, (20, 20), &mut rng);
        assert_eq!(board.size(), (9, 10));
    }

    #[test]
    fn draw_clears_dirty_and_skips_clean_cells() {
        use crate::surface::PixelSurface;
        let mut board = board_with(Coloring::HslGrade, 4);
        board.update_cell_state((2, 3), AntId::Hue(120));
        let mut surface = PixelSurface::new(10, 10);
        board.draw(&mut surface);
        assert_eq!(surface.pixel(2, 3), {
            let shade = Shade::hsl(121.0, 100.0, 50.0);
            (shade.r, shade.g, shade.b)
        });
        assert!(!board.cell((2, 3)).unwrap().dirty);
        // Untouched cells stay unallocated and unpainted.
        assert_eq!(surface.pixel(5, 5), (0, 0, 0));
    }
}
