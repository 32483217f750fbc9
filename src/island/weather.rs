/// Weather layer redraws: rain, sunshine, rainbow.
///
/// Positions are in surface units on a `w`×`h` surface, y downward.

use std::f64::consts::{PI, TAU};

use rand::{Rng, RngCore};

use super::paint::Graphics;

/// Rainbow hues, outermost first.
pub const RAINBOW: [u32; 6] = [0xff0000, 0xff7700, 0xffff00, 0x00ff00, 0x0000ff, 0x8b00ff];

/// Opacity the rainbow fades in to.
pub const RAINBOW_ALPHA: f32 = 0.7;

/// Rainbow fade-in duration.
pub const RAINBOW_FADE_MS: f64 = 1500.0;

const SUN_RAYS: usize = 12;

/// Dark wash on `overlay`, clouds and `drops` random raindrops on `fx`.
pub fn draw_rain(
    overlay: &mut Graphics,
    fx: &mut Graphics,
    w: f64,
    h: f64,
    drops: usize,
    rng: &mut dyn RngCore,
) {
    overlay.fill_rect(0.0, 0.0, w, h, 0x263238, 0.2);

    fx.fill_ellipse(w * 0.2, 35.0, 140.0, 45.0, 0x546e7a, 0.6);
    fx.fill_ellipse(w * 0.5, 28.0, 160.0, 50.0, 0x546e7a, 0.6);
    fx.fill_ellipse(w * 0.8, 40.0, 130.0, 42.0, 0x546e7a, 0.6);
    fx.fill_ellipse(w * 0.35, 32.0, 120.0, 38.0, 0x455a64, 0.5);
    fx.fill_ellipse(w * 0.65, 38.0, 110.0, 35.0, 0x455a64, 0.5);

    for _ in 0..drops {
        let x = rng.gen_range(0.0..w);
        let y = rng.gen_range(0.0..h);
        fx.line(x, y, x - 1.5, y + 12.0, 0x90caf9, 0.5);
    }
}

/// Sun in the top-right corner: rays behind, glow circles on top.
pub fn draw_sunshine(fx: &mut Graphics, w: f64, h: f64) {
    let (sx, sy) = (w * 0.88, h * 0.08);
    for i in 0..SUN_RAYS {
        let a = i as f64 / SUN_RAYS as f64 * TAU;
        fx.line(
            sx + a.cos() * 20.0,
            sy + a.sin() * 20.0,
            sx + a.cos() * 50.0,
            sy + a.sin() * 50.0,
            0xfff9c4,
            0.2,
        );
    }
    fx.fill_circle(sx, sy, 35.0, 0xfff9c4, 0.25);
    fx.fill_circle(sx, sy, 18.0, 0xffeb3b, 0.5);
    fx.fill_circle(sx, sy, 10.0, 0xffffff, 0.6);
}

/// Six stroked upper semicircles. The caller owns the layer's fade.
pub fn draw_rainbow(g: &mut Graphics, w: f64, h: f64) {
    let (cx, cy) = (w * 0.72, h * 0.28);
    for (i, &hue) in RAINBOW.iter().enumerate() {
        g.arc(cx, cy, 70.0 + i as f64 * 5.0, PI, 0.0, hue, 0.3);
    }
}
