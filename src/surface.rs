use ratatui::{
    style::{Color, Style},
    text::{Line, Span},
};

/// An RGBA color descriptor. Alpha below 255 blends over whatever the
/// surface already holds; the fade transition relies on that.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shade {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Shade {
    pub const BLACK: Shade = Shade::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Builds a shade from hue (degrees, any value), saturation and
    /// lightness (percent). Hue wraps; saturation and lightness clamp, so
    /// an over-100 lightness saturates to white rather than misrendering.
    pub fn hsl(hue: f32, saturation: f32, lightness: f32) -> Self {
        let h = hue.rem_euclid(360.0);
        let s = (saturation / 100.0).clamp(0.0, 1.0);
        let l = (lightness / 100.0).clamp(0.0, 1.0);

        let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let sector = h / 60.0;
        let x = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
        let (r1, g1, b1) = match sector as u32 {
            0 => (chroma, x, 0.0),
            1 => (x, chroma, 0.0),
            2 => (0.0, chroma, x),
            3 => (0.0, x, chroma),
            4 => (x, 0.0, chroma),
            _ => (chroma, 0.0, x),
        };
        let m = l - chroma / 2.0;
        let channel = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        Self::rgb(channel(r1), channel(g1), channel(b1))
    }
}

/// What the simulation core draws onto. Implementations own the pixels;
/// the core never reads them back.
pub trait Surface {
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, shade: Shade);
    fn fill_polygon(&mut self, points: &[(f32, f32)], shade: Shade);
}

/// A persistent software raster. The board only repaints dirty cells, so
/// pixels must survive between frames; resets repaint everything through
/// the transition animation instead of clearing.
pub struct PixelSurface {
    width: usize,
    height: usize,
    pixels: Vec<(u8, u8, u8)>,
}

impl PixelSurface {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![(0, 0, 0); width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[cfg(test)]
    pub fn pixel(&self, x: usize, y: usize) -> (u8, u8, u8) {
        self.pixels[y * self.width + x]
    }

    fn plot(&mut self, x: usize, y: usize, shade: Shade) {
        let index = y * self.width + x;
        if shade.a == 255 {
            self.pixels[index] = (shade.r, shade.g, shade.b);
        } else {
            let (r, g, b) = self.pixels[index];
            let blend = |src: u8, dst: u8| {
                ((src as u16 * shade.a as u16 + dst as u16 * (255 - shade.a) as u16) / 255) as u8
            };
            self.pixels[index] = (blend(shade.r, r), blend(shade.g, g), blend(shade.b, b));
        }
    }

    /// Folds the raster into terminal lines, two pixel rows per text row,
    /// using upper-half blocks with the lower pixel as background. Runs of
    /// identical color pairs collapse into one span.
    pub fn render_lines(&self) -> Vec<Line<'static>> {
        let mut lines = Vec::with_capacity(self.height.div_ceil(2));
        for pair in 0..self.height.div_ceil(2) {
            let top_row = pair * 2;
            let bottom_row = top_row + 1;
            let mut spans = Vec::new();
            let mut run: Option<((u8, u8, u8), (u8, u8, u8), usize)> = None;
            for x in 0..self.width {
                let top = self.pixels[top_row * self.width + x];
                let bottom = if bottom_row < self.height {
                    self.pixels[bottom_row * self.width + x]
                } else {
                    (0, 0, 0)
                };
                match &mut run {
                    Some((t, b, len)) if *t == top && *b == bottom => *len += 1,
                    _ => {
                        if let Some((t, b, len)) = run.take() {
                            spans.push(half_block_span(t, b, len));
                        }
                        run = Some((top, bottom, 1));
                    }
                }
            }
            if let Some((t, b, len)) = run {
                spans.push(half_block_span(t, b, len));
            }
            lines.push(Line::from(spans));
        }
        lines
    }
}

fn half_block_span(top: (u8, u8, u8), bottom: (u8, u8, u8), len: usize) -> Span<'static> {
    Span::styled(
        "▀".repeat(len),
        Style::default()
            .fg(Color::Rgb(top.0, top.1, top.2))
            .bg(Color::Rgb(bottom.0, bottom.1, bottom.2)),
    )
}

impl Surface for PixelSurface {
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, shade: Shade) {
        let x0 = x.floor().max(0.0) as usize;
        let y0 = y.floor().max(0.0) as usize;
        let x1 = ((x + width).ceil().max(0.0) as usize).min(self.width);
        let y1 = ((y + height).ceil().max(0.0) as usize).min(self.height);
        for row in y0..y1 {
            for col in x0..x1 {
                self.plot(col, row, shade);
            }
        }
    }

    fn fill_polygon(&mut self, points: &[(f32, f32)], shade: Shade) {
        if points.len() < 3 {
            return;
        }
        let min_y = points.iter().map(|p| p.1).fold(f32::MAX, f32::min);
        let max_y = points.iter().map(|p| p.1).fold(f32::MIN, f32::max);
        let y0 = min_y.floor().max(0.0) as usize;
        let y1 = (max_y.ceil().max(0.0) as usize).min(self.height);

        // Even-odd scanline fill against each row's center line.
        for row in y0..y1 {
            let scan = row as f32 + 0.5;
            let mut crossings: Vec<f32> = Vec::new();
            for i in 0..points.len() {
                let (x_a, y_a) = points[i];
                let (x_b, y_b) = points[(i + 1) % points.len()];
                if (y_a <= scan && y_b > scan) || (y_b <= scan && y_a > scan) {
                    crossings.push(x_a + (scan - y_a) / (y_b - y_a) * (x_b - x_a));
                }
            }
            crossings.sort_by(|a, b| a.total_cmp(b));
            for pair in crossings.chunks_exact(2) {
                let start = pair[0].round().max(0.0) as usize;
                let end = (pair[1].round().max(0.0) as usize).min(self.width);
                for col in start..end {
                    self.plot(col, row, shade);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hsl_primaries_convert_exactly() {
        assert_eq!(Shade::hsl(0.0, 100.0, 50.0), Shade::rgb(255, 0, 0));
        assert_eq!(Shade::hsl(120.0, 100.0, 50.0), Shade::rgb(0, 255, 0));
        assert_eq!(Shade::hsl(240.0, 100.0, 50.0), Shade::rgb(0, 0, 255));
        assert_eq!(Shade::hsl(0.0, 100.0, 0.0), Shade::rgb(0, 0, 0));
        assert_eq!(Shade::hsl(0.0, 100.0, 100.0), Shade::rgb(255, 255, 255));
    }

    #[test]
    fn hsl_hue_wraps_and_lightness_clamps() {
        assert_eq!(Shade::hsl(360.0, 100.0, 50.0), Shade::hsl(0.0, 100.0, 50.0));
        assert_eq!(Shade::hsl(480.0, 100.0, 50.0), Shade::hsl(120.0, 100.0, 50.0));
        assert_eq!(Shade::hsl(17.0, 100.0, 250.0), Shade::rgb(255, 255, 255));
    }

    #[test]
    fn fill_rect_clips_to_bounds() {
        let mut surface = PixelSurface::new(4, 4);
        surface.fill_rect(-2.0, -2.0, 100.0, 100.0, Shade::rgb(10, 20, 30));
        assert_eq!(surface.pixel(0, 0), (10, 20, 30));
        assert_eq!(surface.pixel(3, 3), (10, 20, 30));
    }

    #[test]
    fn alpha_fill_blends_toward_the_overlay() {
        let mut surface = PixelSurface::new(1, 1);
        surface.fill_rect(0.0, 0.0, 1.0, 1.0, Shade::rgb(200, 200, 200));
        surface.fill_rect(0.0, 0.0, 1.0, 1.0, Shade::rgba(0, 0, 0, 128));
        let (r, _, _) = surface.pixel(0, 0);
        assert!(r < 120 && r > 80, "blend landed at {r}");
    }

    #[test]
    fn polygon_fill_covers_interior_not_exterior() {
        let mut surface = PixelSurface::new(8, 8);
        let square = [(1.0, 1.0), (7.0, 1.0), (7.0, 7.0), (1.0, 7.0)];
        surface.fill_polygon(&square, Shade::rgb(255, 255, 255));
        assert_eq!(surface.pixel(4, 4), (255, 255, 255));
        assert_eq!(surface.pixel(0, 0), (0, 0, 0));
    }

    #[test]
    fn render_lines_merges_equal_runs() {
        let surface = PixelSurface::new(6, 2);
        let lines = surface.render_lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].spans.len(), 1);
        assert_eq!(lines[0].spans[0].content.chars().count(), 6);
    }
}
