//! Semantic action IDs for Grow Island click targets.
//!
//! Registered during render and dispatched via `InputEvent::Click` or
//! `InputEvent::Slide`.

// ── Profit stepping ─────────────────────────────────────────────
pub const PROFIT_DOWN: u16 = 0;
pub const PROFIT_UP: u16 = 1;
pub const PROFIT_DOWN_BIG: u16 = 2;
pub const PROFIT_UP_BIG: u16 = 3;

// ── Experience stepping ─────────────────────────────────────────
pub const EXP_DOWN: u16 = 10;
pub const EXP_UP: u16 = 11;
pub const EXP_DOWN_BIG: u16 = 12;
pub const EXP_UP_BIG: u16 = 13;

// ── Slider tracks (dispatched as Slide with a fraction) ─────────
pub const PROFIT_SLIDER: u16 = 20;
pub const EXP_SLIDER: u16 = 21;

// ── Sector tabs (base + index into Sector::all()) ───────────────
pub const SECTOR_BASE: u16 = 100;

// ── Character roster (base + roster index) ──────────────────────
pub const CHARACTER_BASE: u16 = 200;

// ── Misc ────────────────────────────────────────────────────────
pub const TOGGLE_SPECIAL: u16 = 300;
pub const RELOAD_SCENE: u16 = 310;
