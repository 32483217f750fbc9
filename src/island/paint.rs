//! Drawing primitives for the island surface.
//!
//! Layers record [`DrawCmd`]s into a [`Graphics`] display list. The surface
//! composites the layers, bottom to top, into a [`Raster`]: a small RGB grid
//! in surface coordinates (y grows downward). The viewport widget samples the
//! raster onto the terminal grid.

use super::assets::{BackdropArt, SpriteArt};

// ── Colour helpers ─────────────────────────────────────────────

pub fn hex_to_rgb(h: u32) -> (u8, u8, u8) {
    (((h >> 16) & 0xff) as u8, ((h >> 8) & 0xff) as u8, (h & 0xff) as u8)
}

pub fn rgb_to_hex(r: f64, g: f64, b: f64) -> u32 {
    let c = |v: f64| v.round().clamp(0.0, 255.0) as u32;
    (c(r) << 16) | (c(g) << 8) | c(b)
}

/// Linear blend from `a` to `b` by `t` in [0, 1].
pub fn lerp_color(a: u32, b: u32, t: f64) -> u32 {
    let (ar, ag, ab) = hex_to_rgb(a);
    let (br, bg, bb) = hex_to_rgb(b);
    let t = t.clamp(0.0, 1.0);
    let mix = |x: u8, y: u8| x as f64 + (y as f64 - x as f64) * t;
    rgb_to_hex(mix(ar, br), mix(ag, bg), mix(ab, bb))
}

/// Multiply a colour by a tint, channel by channel (0xffffff leaves it alone).
pub fn multiply(color: u32, tint: u32) -> u32 {
    let (r, g, b) = hex_to_rgb(color);
    let (tr, tg, tb) = hex_to_rgb(tint);
    let m = |x: u8, y: u8| x as f64 * y as f64 / 255.0;
    rgb_to_hex(m(r, tr), m(g, tg), m(b, tb))
}

/// Perceived brightness in [0, 255].
#[cfg(test)]
pub fn luma(color: u32) -> f64 {
    let (r, g, b) = hex_to_rgb(color);
    0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64
}

// ── Display lists ──────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Primitive {
    Rect { x: f64, y: f64, w: f64, h: f64 },
    /// Filled ellipse; `w`/`h` are full diameters.
    Ellipse { cx: f64, cy: f64, w: f64, h: f64 },
    Circle { cx: f64, cy: f64, r: f64 },
    Line { x1: f64, y1: f64, x2: f64, y2: f64 },
    /// Stroked arc swept clockwise (on screen) from `start` to `end`, radians.
    Arc { cx: f64, cy: f64, r: f64, start: f64, end: f64 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawCmd {
    pub prim: Primitive,
    pub color: u32,
    pub alpha: f32,
}

/// A retained display list with its own layer opacity.
#[derive(Clone, Debug)]
pub struct Graphics {
    cmds: Vec<DrawCmd>,
    pub alpha: f32,
}

impl Default for Graphics {
    fn default() -> Self {
        Self {
            cmds: Vec::new(),
            alpha: 1.0,
        }
    }
}

impl Graphics {
    pub fn clear(&mut self) {
        self.cmds.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    pub fn commands(&self) -> &[DrawCmd] {
        &self.cmds
    }

    fn push(&mut self, prim: Primitive, color: u32, alpha: f32) {
        self.cmds.push(DrawCmd { prim, color, alpha });
    }

    pub fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: u32, alpha: f32) {
        self.push(Primitive::Rect { x, y, w, h }, color, alpha);
    }

    pub fn fill_ellipse(&mut self, cx: f64, cy: f64, w: f64, h: f64, color: u32, alpha: f32) {
        self.push(Primitive::Ellipse { cx, cy, w, h }, color, alpha);
    }

    pub fn fill_circle(&mut self, cx: f64, cy: f64, r: f64, color: u32, alpha: f32) {
        self.push(Primitive::Circle { cx, cy, r }, color, alpha);
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, color: u32, alpha: f32) {
        self.push(Primitive::Line { x1, y1, x2, y2 }, color, alpha);
    }

    pub fn arc(&mut self, cx: f64, cy: f64, r: f64, start: f64, end: f64, color: u32, alpha: f32) {
        self.push(Primitive::Arc { cx, cy, r, start, end }, color, alpha);
    }
}

// ── Raster ─────────────────────────────────────────────────────

/// Composited frame. One raster pixel covers `scale`×`scale` surface units.
#[derive(Clone, Debug)]
pub struct Raster {
    width: usize,
    height: usize,
    scale: f64,
    pixels: Vec<u32>,
}

impl Raster {
    pub fn new(surface_width: f64, surface_height: f64, scale: f64) -> Self {
        let scale = scale.max(1.0);
        let width = (surface_width / scale).ceil().max(1.0) as usize;
        let height = (surface_height / scale).ceil().max(1.0) as usize;
        Self {
            width,
            height,
            scale,
            pixels: vec![0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel(&self, px: usize, py: usize) -> u32 {
        self.pixels[py * self.width + px]
    }

    pub fn fill(&mut self, color: u32) {
        self.pixels.iter_mut().for_each(|p| *p = color);
    }

    /// Mean brightness of the whole frame.
    #[cfg(test)]
    pub fn mean_luma(&self) -> f64 {
        let sum: f64 = self.pixels.iter().map(|&p| luma(p)).sum();
        sum / self.pixels.len() as f64
    }

    fn center(&self, p: usize) -> f64 {
        (p as f64 + 0.5) * self.scale
    }

    fn to_pixel(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        if x < 0.0 || y < 0.0 {
            return None;
        }
        let px = (x / self.scale) as usize;
        let py = (y / self.scale) as usize;
        (px < self.width && py < self.height).then_some((px, py))
    }

    fn blend(&mut self, px: usize, py: usize, color: u32, alpha: f64) {
        let i = py * self.width + px;
        self.pixels[i] = lerp_color(self.pixels[i], color, alpha);
    }

    /// Pixel range whose centres may fall inside `[lo, hi]` along one axis.
    fn span(&self, lo: f64, hi: f64, len: usize) -> std::ops::Range<usize> {
        let a = ((lo / self.scale) - 0.5).floor().max(0.0) as usize;
        let b = (((hi / self.scale) + 0.5).ceil().max(0.0) as usize).min(len);
        a.min(b)..b
    }

    fn fill_where(
        &mut self,
        (x0, y0, x1, y1): (f64, f64, f64, f64),
        color: u32,
        alpha: f64,
        inside: impl Fn(f64, f64) -> bool,
    ) {
        for py in self.span(y0, y1, self.height) {
            let cy = self.center(py);
            for px in self.span(x0, x1, self.width) {
                if inside(self.center(px), cy) {
                    self.blend(px, py, color, alpha);
                }
            }
        }
    }

    /// Plot a polyline sampled at half-pixel steps, touching each pixel once.
    fn stroke_points(&mut self, points: impl Iterator<Item = (f64, f64)>, color: u32, alpha: f64) {
        let mut last = None;
        for (x, y) in points {
            if let Some(p) = self.to_pixel(x, y) {
                if last != Some(p) {
                    self.blend(p.0, p.1, color, alpha);
                    last = Some(p);
                }
            }
        }
    }

    pub fn draw(&mut self, cmd: &DrawCmd, layer_alpha: f32) {
        let alpha = (cmd.alpha * layer_alpha).clamp(0.0, 1.0) as f64;
        if alpha <= 0.0 {
            return;
        }
        let step = self.scale / 2.0;
        match cmd.prim {
            Primitive::Rect { x, y, w, h } => {
                self.fill_where((x, y, x + w, y + h), cmd.color, alpha, |cx, cy| {
                    cx >= x && cx < x + w && cy >= y && cy < y + h
                });
            }
            Primitive::Ellipse { cx, cy, w, h } => {
                let (rx, ry) = (w / 2.0, h / 2.0);
                if rx <= 0.0 || ry <= 0.0 {
                    return;
                }
                self.fill_where((cx - rx, cy - ry, cx + rx, cy + ry), cmd.color, alpha, |x, y| {
                    let dx = (x - cx) / rx;
                    let dy = (y - cy) / ry;
                    dx * dx + dy * dy <= 1.0
                });
            }
            Primitive::Circle { cx, cy, r } => {
                self.fill_where((cx - r, cy - r, cx + r, cy + r), cmd.color, alpha, |x, y| {
                    (x - cx).powi(2) + (y - cy).powi(2) <= r * r
                });
            }
            Primitive::Line { x1, y1, x2, y2 } => {
                let len = ((x2 - x1).powi(2) + (y2 - y1).powi(2)).sqrt();
                let n = (len / step).ceil().max(1.0) as usize;
                let pts = (0..=n).map(|i| {
                    let t = i as f64 / n as f64;
                    (x1 + (x2 - x1) * t, y1 + (y2 - y1) * t)
                });
                self.stroke_points(pts, cmd.color, alpha);
            }
            Primitive::Arc { cx, cy, r, start, end } => {
                let mut sweep = end - start;
                if sweep <= 0.0 {
                    sweep += std::f64::consts::TAU;
                }
                let n = ((sweep * r) / step).ceil().max(1.0) as usize;
                let pts = (0..=n).map(|i| {
                    let a = start + sweep * i as f64 / n as f64;
                    (cx + r * a.cos(), cy + r * a.sin())
                });
                self.stroke_points(pts, cmd.color, alpha);
            }
        }
    }

    pub fn draw_graphics(&mut self, g: &Graphics) {
        if g.is_empty() || g.alpha <= 0.0 {
            return;
        }
        for cmd in g.commands() {
            self.draw(cmd, g.alpha);
        }
    }

    /// Paint a sector backdrop across the whole frame, multiplied by `tint`.
    pub fn paint_backdrop(&mut self, art: &BackdropArt, surface_w: f64, surface_h: f64, tint: u32) {
        let horizon = surface_h * 0.55;
        let haze = lerp_color(art.sky, 0xffffff, 0.35);
        for py in 0..self.height {
            let y = self.center(py);
            let row = if y < horizon {
                lerp_color(art.sky, haze, y / horizon)
            } else {
                lerp_color(SEA, SEA_DEEP, (y - horizon) / (surface_h - horizon))
            };
            let row = multiply(row, tint);
            for px in 0..self.width {
                self.pixels[py * self.width + px] = row;
            }
        }

        let mut g = Graphics::default();
        let (ix, iy) = (surface_w * 0.5, surface_h * 0.72);
        g.fill_ellipse(ix, iy + 6.0, surface_w * 0.84, surface_h * 0.38, SAND, 1.0);
        g.fill_ellipse(ix, iy, surface_w * 0.78, surface_h * 0.32, art.ground, 1.0);

        let base = iy - surface_h * 0.06;
        for (i, &height) in art.skyline.iter().enumerate() {
            let x = surface_w * 0.2 + i as f64 * surface_w * 0.12;
            if art.trees {
                g.fill_rect(x + 8.0, base - height * 0.4, 6.0, height * 0.4, TRUNK, 1.0);
                g.fill_circle(x + 11.0, base - height * 0.45, height * 0.3, art.building, 1.0);
            } else {
                g.fill_rect(x, base - height, 34.0, height, art.building, 1.0);
                let window = lerp_color(art.building, 0xffffff, 0.45);
                let mut wy = base - height + 8.0;
                while wy < base - 10.0 {
                    g.fill_rect(x + 6.0, wy, 6.0, 5.0, window, 0.9);
                    g.fill_rect(x + 20.0, wy, 6.0, 5.0, window, 0.9);
                    wy += 14.0;
                }
            }
        }

        for cmd in g.commands() {
            let tinted = DrawCmd {
                color: multiply(cmd.color, tint),
                ..*cmd
            };
            self.draw(&tinted, 1.0);
        }
    }

    /// Blit pixel art centred on `(cx, cy)`; one art cell per raster pixel.
    pub fn blit_sprite(&mut self, art: &SpriteArt, cx: f64, cy: f64) {
        let rows = art.rows.len();
        let cols = art.rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let Some((ox, oy)) = self.to_pixel(cx, cy) else {
            return;
        };
        let left = ox as isize - cols as isize / 2;
        let top = oy as isize - rows as isize / 2;
        for (r, row) in art.rows.iter().enumerate() {
            for (c, ch) in row.chars().enumerate() {
                let Some(color) = art.color_of(ch) else {
                    continue;
                };
                let (px, py) = (left + c as isize, top + r as isize);
                if px >= 0 && py >= 0 && (px as usize) < self.width && (py as usize) < self.height {
                    self.blend(px as usize, py as usize, color, 1.0);
                }
            }
        }
    }
}

const SEA: u32 = 0x4fc3f7;
const SEA_DEEP: u32 = 0x0277bd;
const SAND: u32 = 0xffe082;
const TRUNK: u32 = 0x6d4c41;
