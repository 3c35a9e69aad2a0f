/// ASCII rasterizer for terminal rendering
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::Point2;
use spinny_core::{Colour, Frame, Polygon, Segment};
use std::io::Write;

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &['.', ':', '-', '=', '+', '*', '#', '%', '@'];

const OUTLINE: char = 'o';

#[derive(Debug, Clone, Copy, PartialEq)]
struct Cell {
    glyph: char,
    colour: Colour,
}

const BLANK: Cell = Cell {
    glyph: ' ',
    colour: Colour::BLACK,
};

/// Paints a frame's polygons into a grid of coloured characters.
///
/// Polygons arrive farthest first, so each one simply overwrites what is
/// already there and no depth buffer is needed.
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![BLANK; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.cells = vec![BLANK; width * height];
    }

    pub fn clear(&mut self) {
        self.cells.fill(BLANK);
    }

    pub fn glyph_at(&self, x: usize, y: usize) -> Option<char> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.cells[y * self.width + x].glyph)
    }

    pub fn render_frame(&mut self, frame: &Frame) {
        for polygon in &frame.polygons {
            self.rasterize_polygon(polygon);
        }
        for segment in &frame.wireframe {
            self.rasterize_segment(segment);
        }
    }

    fn rasterize_polygon(&mut self, polygon: &Polygon) {
        let brightness = polygon.colour.luminance();
        let char_index = (brightness * (LUMINOSITY_RAMP.len() - 1) as f64).round() as usize;
        let glyph = LUMINOSITY_RAMP[char_index.min(LUMINOSITY_RAMP.len() - 1)];
        let cell = Cell {
            glyph,
            colour: polygon.colour,
        };

        let [v0, v1, v2] = polygon.points;

        // Bounding box, clipped to the screen
        let min_x = (v0.x.min(v1.x).min(v2.x).floor() as i64).max(0);
        let max_x = (v0.x.max(v1.x).max(v2.x).ceil() as i64).min(self.width as i64 - 1);
        let min_y = (v0.y.min(v1.y).min(v2.y).floor() as i64).max(0);
        let max_y = (v0.y.max(v1.y).max(v2.y).ceil() as i64).min(self.height as i64 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = Point2::new(x as f64 + 0.5, y as f64 + 0.5);

                // Either winding counts as inside
                if let Some((w0, w1, w2)) = barycentric(v0, v1, v2, p) {
                    let inside = (w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0)
                        || (w0 <= 0.0 && w1 <= 0.0 && w2 <= 0.0);
                    if inside {
                        self.cells[y as usize * self.width + x as usize] = cell;
                    }
                }
            }
        }
    }

    fn rasterize_segment(&mut self, segment: &Segment) {
        let (from, to) = (segment.from, segment.to);
        let steps = (to.x - from.x).abs().max((to.y - from.y).abs()).ceil().max(1.0);
        if !steps.is_finite() {
            return;
        }
        let cell = Cell {
            glyph: OUTLINE,
            colour: Colour::WHITE,
        };
        for i in 0..=steps as usize {
            let t = i as f64 / steps;
            let x = (from.x + t * (to.x - from.x)).floor();
            let y = (from.y + t * (to.y - from.y)).floor();
            if x >= 0.0 && y >= 0.0 && (x as usize) < self.width && (y as usize) < self.height {
                self.cells[y as usize * self.width + x as usize] = cell;
            }
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            for x in 0..self.width {
                let cell = self.cells[y * self.width + x];
                let (r, g, b) = cell.colour.rgb();
                writer.queue(SetForegroundColor(Color::Rgb { r, g, b }))?;
                writer.queue(Print(cell.glyph))?;
            }
            if y + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: Point2<f64>,
    v1: Point2<f64>,
    v2: Point2<f64>,
    p: Point2<f64>,
) -> Option<(f64, f64, f64)> {
    let denom = (v1.y - v2.y) * (v0.x - v2.x) + (v2.x - v1.x) * (v0.y - v2.y);

    if denom.abs() < 1e-9 {
        return None;
    }

    let w0 = ((v1.y - v2.y) * (p.x - v2.x) + (v2.x - v1.x) * (p.y - v2.y)) / denom;
    let w1 = ((v2.y - v0.y) * (p.x - v2.x) + (v0.x - v2.x) * (p.y - v2.y)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}
