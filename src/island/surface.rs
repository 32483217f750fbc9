//! The island render surface.
//!
//! An imperative host that owns the drawing surface, separate from the UI's
//! own redraw cadence. Lifecycle:
//!
//! ```text
//! Uninitialized ──initialize──▶ Loading ──all assets / deadline──▶ Ready ──teardown──▶ TornDown
//!                                  ▲                                                     │
//!                                  └───────────────────── initialize ────────────────────┘
//! ```
//!
//! Updates that arrive before `Ready` are dropped; the first update after
//! readiness carries the full state, so nothing needs to be queued.

use std::collections::{HashMap, HashSet};
use std::sync::mpsc::{self, Receiver};

use rand::RngCore;
use tachyonfx::Interpolation;

use crate::log;
use crate::time::{Deadline, Tween};

use super::assets::{manifest, Asset, AssetLoader, LoadEvent};
use super::logic::{character_key, derive};
use super::paint::{multiply, Graphics, Raster};
use super::state::{Sector, SimulationInputs, ToneOverlay};
use super::weather::{self, RAINBOW_ALPHA, RAINBOW_FADE_MS};

/// Where the surface is mounted: the logical size of its drawing area.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HostElement {
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Debug)]
pub struct SurfaceConfig {
    /// Surface units per raster pixel.
    pub pixel_scale: f64,
    /// How long to wait for assets before going ready anyway.
    pub ready_timeout_ms: f64,
    /// Raindrops per rain redraw.
    pub raindrops: usize,
    /// Assets the built-in loader resolves per frame.
    pub loads_per_frame: usize,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            pixel_scale: 5.0,
            ready_timeout_ms: 10_000.0,
            raindrops: 100,
            loads_per_frame: 4,
        }
    }
}

/// How the surface became ready.
#[derive(Clone, Debug, PartialEq)]
pub enum Readiness {
    Complete,
    /// Some assets failed or never arrived before the deadline.
    Degraded { missing: Vec<&'static str> },
}

#[derive(Clone, Debug, PartialEq)]
pub enum Phase {
    Uninitialized,
    Loading { deadline: Deadline },
    Ready(Readiness),
    TornDown,
}

/// The last state the surface applied.
#[derive(Clone, Debug, PartialEq)]
pub struct Applied {
    pub sector: Sector,
    pub character_key: &'static str,
    pub profit: Option<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LoadProgress {
    pub loaded: usize,
    pub total: usize,
    /// Time left before the surface gives up and goes ready degraded.
    pub remaining_ms: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SurfaceStats {
    pub background_swaps: u32,
    pub character_swaps: u32,
    pub updates_applied: u32,
    pub updates_dropped: u32,
}

type ReadyCallback = Box<dyn FnOnce(&Readiness)>;

/// Drawing layers, bottom to top, plus the composited frame.
struct Layers {
    background: &'static str,
    background_tint: u32,
    weather_overlay: Graphics,
    character: &'static str,
    weather: Graphics,
    rainbow: Graphics,
    tone: Graphics,
    frame: Raster,
    dirty: bool,
}

pub struct RenderSurface {
    config: SurfaceConfig,
    loader: Box<dyn AssetLoader>,
    rng: Box<dyn RngCore>,
    phase: Phase,
    host: Option<HostElement>,
    load_rx: Option<Receiver<LoadEvent>>,
    pending: HashSet<&'static str>,
    assets: HashMap<&'static str, Asset>,
    missing: Vec<&'static str>,
    layers: Option<Layers>,
    applied: Option<Applied>,
    character: Option<u8>,
    special: bool,
    listeners: Vec<ReadyCallback>,
    now_ms: f64,
    rainbow_fade: Option<Tween>,
    stats: SurfaceStats,
}

impl RenderSurface {
    pub fn new(config: SurfaceConfig, loader: Box<dyn AssetLoader>, rng: Box<dyn RngCore>) -> Self {
        Self {
            config,
            loader,
            rng,
            phase: Phase::Uninitialized,
            host: None,
            load_rx: None,
            pending: HashSet::new(),
            assets: HashMap::new(),
            missing: Vec::new(),
            layers: None,
            applied: None,
            character: None,
            special: false,
            listeners: Vec::new(),
            now_ms: 0.0,
            rainbow_fade: None,
            stats: SurfaceStats::default(),
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.phase, Phase::Ready(_))
    }

    pub fn readiness(&self) -> Option<&Readiness> {
        match &self.phase {
            Phase::Ready(r) => Some(r),
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn applied(&self) -> Option<&Applied> {
        self.applied.as_ref()
    }

    #[cfg(test)]
    pub fn stats(&self) -> &SurfaceStats {
        &self.stats
    }

    #[cfg(test)]
    pub fn host(&self) -> Option<HostElement> {
        self.host
    }

    /// Loading progress while in `Loading`.
    pub fn load_progress(&self) -> Option<LoadProgress> {
        let Phase::Loading { deadline } = &self.phase else {
            return None;
        };
        Some(LoadProgress {
            loaded: self.assets.len(),
            total: self.assets.len() + self.pending.len() + self.missing.len(),
            remaining_ms: deadline.remaining_ms(self.now_ms),
        })
    }

    /// The last composited frame, once ready.
    pub fn frame(&self) -> Option<&Raster> {
        self.layers.as_ref().map(|l| &l.frame)
    }

    #[cfg(test)]
    /// Texture and sprite keys currently on screen.
    pub fn visible_keys(&self) -> Option<(&'static str, &'static str)> {
        self.layers.as_ref().map(|l| (l.background, l.character))
    }

    #[cfg(test)]
    /// Current opacity of the rainbow layer.
    pub fn rainbow_alpha(&self) -> Option<f32> {
        self.layers.as_ref().map(|l| l.rainbow.alpha)
    }

    /// Build the surface on `host` and start loading assets.
    /// No-op while already loading or ready.
    pub fn initialize(&mut self, host: HostElement) {
        if matches!(self.phase, Phase::Loading { .. } | Phase::Ready(_)) {
            log::info("surface already initialized; ignoring");
            return;
        }

        let keys = manifest();
        let (tx, rx) = mpsc::channel();
        self.pending = keys.iter().copied().collect();
        self.load_rx = Some(rx);
        self.host = Some(HostElement {
            width: host.width.max(1.0),
            height: host.height.max(1.0),
        });
        self.phase = Phase::Loading {
            deadline: Deadline::after(self.now_ms, self.config.ready_timeout_ms),
        };
        log::info(&format!("loading {} assets", keys.len()));
        self.loader.begin(keys, tx);
    }

    /// Subscribe to readiness. Runs right away if the surface is already ready.
    pub fn on_ready(&mut self, callback: impl FnOnce(&Readiness) + 'static) {
        match &self.phase {
            Phase::Ready(r) => callback(r),
            _ => self.listeners.push(Box::new(callback)),
        }
    }

    /// Character selection supplied by the host; applied on the next update.
    pub fn select_character(&mut self, character: Option<u8>, special: bool) {
        self.character = character;
        self.special = special;
    }

    /// Advance the surface clock: pump loads, enforce the deadline, run fades.
    pub fn tick(&mut self, now_ms: f64) {
        self.now_ms = self.now_ms.max(now_ms);

        if let Phase::Loading { deadline } = self.phase {
            self.loader.pump();
            self.drain_loads();
            if self.pending.is_empty() {
                self.become_ready();
            } else if deadline.has_passed(self.now_ms) {
                log::warn(&format!(
                    "asset deadline passed with {} pending",
                    self.pending.len()
                ));
                let mut late: Vec<&'static str> = self.pending.drain().collect();
                self.missing.append(&mut late);
                self.loader.cancel();
                self.become_ready();
            }
        }

        let Some(layers) = self.layers.as_mut() else {
            return;
        };
        if let Some(fade) = self.rainbow_fade {
            layers.rainbow.alpha = fade.value(self.now_ms);
            layers.dirty = true;
            if fade.is_finished(self.now_ms) {
                self.rainbow_fade = None;
            }
        }
        if layers.dirty {
            if let Some(host) = self.host {
                compose(layers, &self.assets, host);
            }
        }
    }

    /// Push new simulation state. Dropped unless the surface is ready.
    pub fn update(&mut self, profit: f64, sector: &str, experience: i32) {
        let inputs = SimulationInputs {
            profit_percent: profit,
            sector: Sector::from_key(sector),
            experience,
            character: self.character,
            special: self.special,
        };
        self.apply(&inputs);
    }

    /// Same as [`update`](Self::update), taking the host's inputs directly.
    pub fn apply(&mut self, inputs: &SimulationInputs) {
        let (Some(layers), Some(applied), Some(host)) =
            (self.layers.as_mut(), self.applied.as_mut(), self.host)
        else {
            self.stats.updates_dropped += 1;
            return;
        };
        self.character = inputs.character;
        self.special = inputs.special;

        let derived = derive(inputs);
        let (w, h) = (host.width, host.height);

        layers.background_tint = derived.background_tint;
        layers.tone.clear();
        match derived.tone {
            ToneOverlay::Darken { intensity } => {
                layers
                    .tone
                    .fill_rect(0.0, 0.0, w, h, 0x37474f, (0.15 + intensity * 0.2) as f32);
            }
            ToneOverlay::Warm => layers.tone.fill_rect(0.0, 0.0, w, h, 0xfff9c4, 0.08),
            ToneOverlay::Neutral => {}
        }

        if inputs.sector != applied.sector {
            layers.background = derived.background_key;
            applied.sector = inputs.sector;
            self.stats.background_swaps += 1;
        }

        if derived.character_key != applied.character_key {
            layers.character = derived.character_key;
            applied.character_key = derived.character_key;
            self.stats.character_swaps += 1;
        }

        layers.weather_overlay.clear();
        layers.weather.clear();
        layers.rainbow.clear();
        layers.rainbow.alpha = 0.0;
        self.rainbow_fade = None;
        if derived.weather.rain {
            weather::draw_rain(
                &mut layers.weather_overlay,
                &mut layers.weather,
                w,
                h,
                self.config.raindrops,
                &mut *self.rng,
            );
        }
        if derived.weather.sunshine {
            weather::draw_sunshine(&mut layers.weather, w, h);
        }
        if derived.weather.rainbow {
            weather::draw_rainbow(&mut layers.rainbow, w, h);
            self.rainbow_fade = Some(Tween::new(
                self.now_ms,
                RAINBOW_FADE_MS,
                0.0,
                RAINBOW_ALPHA,
                Interpolation::SineInOut,
            ));
        }

        applied.profit = Some(inputs.profit_percent);
        layers.dirty = true;
        self.stats.updates_applied += 1;
    }

    /// Cancel loads, release the drawing surface, and forget all applied state.
    pub fn teardown(&mut self) {
        if self.phase == Phase::TornDown {
            return;
        }
        self.loader.cancel();
        self.load_rx = None;
        self.pending.clear();
        self.assets.clear();
        self.missing.clear();
        self.layers = None;
        self.applied = None;
        self.character = None;
        self.special = false;
        let stats = std::mem::take(&mut self.stats);
        self.listeners.clear();
        self.rainbow_fade = None;
        self.host = None;
        self.phase = Phase::TornDown;
        log::info(&format!(
            "surface torn down after {} updates ({} dropped, {} background swaps, {} character swaps)",
            stats.updates_applied, stats.updates_dropped, stats.background_swaps, stats.character_swaps
        ));
    }

    fn drain_loads(&mut self) {
        let Some(rx) = &self.load_rx else {
            return;
        };
        let events: Vec<LoadEvent> = rx.try_iter().collect();
        for event in events {
            match event {
                LoadEvent::Loaded(key, asset) => {
                    self.pending.remove(key);
                    self.assets.insert(key, asset);
                }
                LoadEvent::Failed(key, err) => {
                    log::warn(&err.to_string());
                    if self.pending.remove(key) {
                        self.missing.push(key);
                    }
                }
            }
        }
    }

    fn become_ready(&mut self) {
        self.load_rx = None;
        let Some(host) = self.host else {
            return;
        };

        let initial_character = character_key(None, 0, false);
        let mut layers = Layers {
            background: Sector::Default.background_key(),
            background_tint: 0xffffff,
            weather_overlay: Graphics::default(),
            character: initial_character,
            weather: Graphics::default(),
            rainbow: Graphics::default(),
            tone: Graphics::default(),
            frame: Raster::new(host.width, host.height, self.config.pixel_scale),
            dirty: false,
        };
        layers.rainbow.alpha = 0.0;
        compose(&mut layers, &self.assets, host);
        self.layers = Some(layers);
        self.applied = Some(Applied {
            sector: Sector::Default,
            character_key: initial_character,
            profit: None,
        });

        self.missing.sort_unstable();
        let readiness = if self.missing.is_empty() {
            log::info("surface ready");
            Readiness::Complete
        } else {
            log::warn(&format!("surface ready without: {}", self.missing.join(", ")));
            Readiness::Degraded {
                missing: self.missing.clone(),
            }
        };
        self.phase = Phase::Ready(readiness.clone());
        for callback in std::mem::take(&mut self.listeners) {
            callback(&readiness);
        }
    }
}

/// Redraw the frame from the layers, bottom to top.
fn compose(layers: &mut Layers, assets: &HashMap<&'static str, Asset>, host: HostElement) {
    let frame = &mut layers.frame;
    match assets.get(layers.background) {
        Some(Asset::Backdrop(art)) => {
            frame.paint_backdrop(art, host.width, host.height, layers.background_tint)
        }
        _ => frame.fill(multiply(Sector::Default.config().sky, layers.background_tint)),
    }
    frame.draw_graphics(&layers.weather_overlay);
    if let Some(Asset::Sprite(art)) = assets.get(layers.character) {
        frame.blit_sprite(art, host.width / 2.0, host.height / 2.0);
    }
    frame.draw_graphics(&layers.weather);
    frame.draw_graphics(&layers.rainbow);
    frame.draw_graphics(&layers.tone);
    layers.dirty = false;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::island::assets::{AssetError, BuiltinLoader};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use std::sync::mpsc::Sender;

    const HOST: HostElement = HostElement {
        width: 600.0,
        height: 420.0,
    };

    fn surface_with(loader: Box<dyn AssetLoader>) -> RenderSurface {
        RenderSurface::new(
            SurfaceConfig::default(),
            loader,
            Box::new(ChaCha8Rng::seed_from_u64(42)),
        )
    }

    fn ready_surface() -> RenderSurface {
        let mut s = surface_with(Box::new(BuiltinLoader::new(4)));
        s.initialize(HOST);
        let mut t = 0.0;
        while !s.is_ready() {
            t += 16.0;
            s.tick(t);
            assert!(t < 1_000.0, "surface never became ready");
        }
        s
    }

    /// Counts calls and never completes anything.
    struct StalledLoader {
        begins: Rc<Cell<u32>>,
        pumps: Rc<Cell<u32>>,
        sender: Rc<RefCell<Option<Sender<LoadEvent>>>>,
    }

    impl AssetLoader for StalledLoader {
        fn begin(&mut self, _keys: Vec<&'static str>, done: Sender<LoadEvent>) {
            self.begins.set(self.begins.get() + 1);
            *self.sender.borrow_mut() = Some(done);
        }
        fn pump(&mut self) {
            self.pumps.set(self.pumps.get() + 1);
        }
        fn cancel(&mut self) {}
    }

    fn stalled() -> (StalledLoader, Rc<Cell<u32>>, Rc<Cell<u32>>, Rc<RefCell<Option<Sender<LoadEvent>>>>) {
        let begins = Rc::new(Cell::new(0));
        let pumps = Rc::new(Cell::new(0));
        let sender = Rc::new(RefCell::new(None));
        let loader = StalledLoader {
            begins: begins.clone(),
            pumps: pumps.clone(),
            sender: sender.clone(),
        };
        (loader, begins, pumps, sender)
    }

    /// Resolves everything immediately except the listed keys, which fail.
    struct FailingLoader(Vec<&'static str>);

    impl AssetLoader for FailingLoader {
        fn begin(&mut self, keys: Vec<&'static str>, done: Sender<LoadEvent>) {
            for key in keys {
                let event = if self.0.contains(&key) {
                    LoadEvent::Failed(key, AssetError::Missing(key))
                } else {
                    match crate::island::assets::lookup(key) {
                        Some(asset) => LoadEvent::Loaded(key, asset),
                        None => LoadEvent::Failed(key, AssetError::Missing(key)),
                    }
                };
                let _ = done.send(event);
            }
        }
        fn pump(&mut self) {}
        fn cancel(&mut self) {}
    }

    // ── Lifecycle ──────────────────────────────────────────────

    #[test]
    fn starts_uninitialized() {
        let s = surface_with(Box::new(BuiltinLoader::new(4)));
        assert_eq!(*s.phase(), Phase::Uninitialized);
        assert!(s.frame().is_none());
    }

    #[test]
    fn becomes_ready_once_all_assets_load() {
        let mut s = surface_with(Box::new(BuiltinLoader::new(4)));
        s.initialize(HOST);
        assert!(matches!(s.phase(), Phase::Loading { .. }));
        s.tick(16.0);
        assert!(!s.is_ready());
        let progress = s.load_progress().expect("loading");
        assert_eq!((progress.loaded, progress.total), (4, manifest().len()));
        assert_eq!(progress.remaining_ms, 10_000.0 - 16.0);

        let s = ready_surface();
        assert!(s.load_progress().is_none());
        assert_eq!(s.readiness(), Some(&Readiness::Complete));
        assert!(s.frame().is_some());
        assert_eq!(
            s.applied(),
            Some(&Applied {
                sector: Sector::Default,
                character_key: "char-a",
                profit: None,
            })
        );
    }

    #[test]
    fn repeated_initialize_is_a_no_op() {
        let (loader, begins, _, _) = stalled();
        let mut s = surface_with(Box::new(loader));
        s.initialize(HOST);
        let phase = s.phase().clone();
        s.tick(500.0);
        s.initialize(HostElement {
            width: 10.0,
            height: 10.0,
        });
        assert_eq!(begins.get(), 1);
        assert_eq!(*s.phase(), phase);
        assert_eq!(s.host(), Some(HOST));
    }

    #[test]
    fn initialize_while_ready_keeps_state() {
        let mut s = ready_surface();
        s.update(10.0, "bio", 50);
        s.initialize(HOST);
        assert!(s.is_ready());
        assert_eq!(s.applied().map(|a| a.sector), Some(Sector::Bio));
    }

    #[test]
    fn on_ready_fires_once_on_transition() {
        let fired = Rc::new(Cell::new(0));
        let mut s = surface_with(Box::new(BuiltinLoader::new(100)));
        let f = fired.clone();
        s.on_ready(move |r| {
            assert_eq!(*r, Readiness::Complete);
            f.set(f.get() + 1);
        });
        s.initialize(HOST);
        assert_eq!(fired.get(), 0);
        s.tick(16.0);
        assert!(s.is_ready());
        assert_eq!(fired.get(), 1);
        s.tick(32.0);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn on_ready_after_ready_runs_immediately() {
        let mut s = ready_surface();
        let fired = Rc::new(Cell::new(false));
        let f = fired.clone();
        s.on_ready(move |_| f.set(true));
        assert!(fired.get());
    }

    #[test]
    fn deadline_gives_degraded_ready_and_stops_polling() {
        let (loader, _, pumps, _) = stalled();
        let mut s = surface_with(Box::new(loader));
        s.initialize(HOST);

        s.tick(5_000.0);
        assert!(!s.is_ready());
        s.tick(10_000.0);
        match s.readiness() {
            Some(Readiness::Degraded { missing }) => assert_eq!(missing.len(), manifest().len()),
            other => panic!("expected degraded, got {:?}", other),
        }

        let polled = pumps.get();
        for i in 0..10 {
            s.tick(10_000.0 + i as f64 * 100.0);
        }
        assert_eq!(pumps.get(), polled);
    }

    #[test]
    fn degraded_surface_still_accepts_updates() {
        let (loader, _, _, _) = stalled();
        let mut s = surface_with(Box::new(loader));
        s.initialize(HOST);
        s.tick(20_000.0);
        s.update(-10.0, "it", 30);
        assert_eq!(s.stats().updates_applied, 1);
        assert_eq!(s.visible_keys(), Some(("bg-2", "char-b")));
        assert!(s.frame().is_some());
    }

    #[test]
    fn failed_asset_is_reported_missing() {
        let mut s = surface_with(Box::new(FailingLoader(vec!["bg-4", "mint-c"])));
        s.initialize(HOST);
        s.tick(16.0);
        assert_eq!(
            s.readiness(),
            Some(&Readiness::Degraded {
                missing: vec!["bg-4", "mint-c"]
            })
        );
    }

    // ── Update gating and diffing ──────────────────────────────

    #[test]
    fn update_before_ready_is_dropped() {
        let (loader, _, _, _) = stalled();
        let mut s = surface_with(Box::new(loader));
        s.update(20.0, "it", 50);
        s.initialize(HOST);
        s.update(20.0, "it", 50);
        assert_eq!(s.applied(), None);
        assert_eq!(s.stats().updates_dropped, 2);
        assert_eq!(s.stats().updates_applied, 0);
    }

    #[test]
    fn first_update_after_ready_applies_fully() {
        let mut s = ready_surface();
        s.update(-30.0, "finance", 65);
        assert_eq!(
            s.applied(),
            Some(&Applied {
                sector: Sector::Finance,
                character_key: "char-d",
                profit: Some(-30.0),
            })
        );
        assert_eq!(s.visible_keys(), Some(("bg-6", "char-d")));
    }

    #[test]
    fn repeated_update_is_idempotent() {
        let mut s = ready_surface();
        s.update(12.0, "energy", 45);
        let once = (s.applied().cloned(), s.visible_keys());
        s.update(12.0, "energy", 45);
        assert_eq!((s.applied().cloned(), s.visible_keys()), once);
        assert_eq!(s.stats().background_swaps, 1);
        assert_eq!(s.stats().character_swaps, 1);
    }

    #[test]
    fn background_swaps_once_per_distinct_sector() {
        let mut s = ready_surface();
        for sector in ["it", "it", "it", "bio", "bio", "it"] {
            s.update(0.0, sector, 0);
        }
        assert_eq!(s.stats().background_swaps, 3);
    }

    #[test]
    fn unknown_sector_matches_default_without_swap() {
        let mut s = ready_surface();
        s.update(0.0, "metaverse", 0);
        assert_eq!(s.stats().background_swaps, 0);
        assert_eq!(s.visible_keys().map(|k| k.0), Some("bg-1"));

        s.update(0.0, "airport", 0);
        s.update(0.0, "metaverse", 0);
        assert_eq!(s.visible_keys().map(|k| k.0), Some("bg-1"));
        assert_eq!(s.stats().background_swaps, 2);
    }

    #[test]
    fn character_follows_experience_and_selection() {
        let mut s = ready_surface();
        s.update(0.0, "default", 85);
        assert_eq!(s.visible_keys().map(|k| k.1), Some("char-e"));

        s.select_character(Some(2), false);
        s.update(0.0, "default", 85);
        assert_eq!(s.visible_keys().map(|k| k.1), Some("coral-e"));

        s.select_character(Some(2), true);
        for exp in [0, 45, 100] {
            s.update(0.0, "default", exp);
            assert_eq!(s.visible_keys().map(|k| k.1), Some("coral-special"));
        }
        assert_eq!(s.stats().character_swaps, 3);
    }

    #[test]
    fn unknown_character_falls_back_to_first() {
        let mut s = ready_surface();
        s.select_character(Some(200), false);
        s.update(0.0, "default", 25);
        assert_eq!(s.visible_keys().map(|k| k.1), Some("char-b"));
    }

    // ── Layers ─────────────────────────────────────────────────

    #[test]
    fn loss_darkens_frame() {
        let mut bright = ready_surface();
        bright.update(5.0, "it", 15);
        bright.tick(10_000.0);
        let mut dark = ready_surface();
        dark.update(-30.0, "it", 15);
        dark.tick(10_000.0);

        let b = bright.frame().map(|f| f.mean_luma()).unwrap_or_default();
        let d = dark.frame().map(|f| f.mean_luma()).unwrap_or_default();
        assert!(d < b, "dark {} should be below bright {}", d, b);
    }

    #[test]
    fn weather_layers_follow_profit() {
        let mut s = ready_surface();
        s.update(-30.0, "it", 15);
        let layers = s.layers.as_ref().map(|l| {
            (
                l.weather_overlay.commands().len(),
                l.weather.commands().len(),
                l.rainbow.is_empty(),
                l.tone.commands()[0].alpha,
            )
        });
        // wash; 5 clouds + 100 drops; no rainbow; tone 0.15 + 0.6 * 0.2
        let (overlay, fx, no_rainbow, tone) = layers.unwrap_or_default();
        assert_eq!(overlay, 1);
        assert_eq!(fx, 105);
        assert!(no_rainbow);
        assert!((tone - 0.27).abs() < 1e-6);

        s.update(25.0, "default", 85);
        let layers = s.layers.as_ref().map(|l| {
            (
                l.weather_overlay.is_empty(),
                l.weather.commands().len(),
                l.rainbow.commands().len(),
                l.tone.commands()[0].color,
            )
        });
        // sunshine: 12 rays + 3 glows; rainbow: 6 arcs; warm tone
        assert_eq!(layers, Some((true, 15, 6, 0xfff9c4)));
    }

    #[test]
    fn rainbow_fades_in_without_blocking_updates() {
        let mut s = ready_surface();
        s.tick(1_000.0);
        s.update(10.0, "default", 0);
        assert_eq!(s.rainbow_alpha(), Some(0.0));
        assert_eq!(s.stats().updates_applied, 1);

        s.tick(1_750.0);
        let mid = s.rainbow_alpha().unwrap_or_default();
        assert!(mid > 0.0 && mid < RAINBOW_ALPHA);

        // A new update mid-fade applies at once and restarts the fade.
        s.update(10.0, "bio", 0);
        assert_eq!(s.stats().updates_applied, 2);
        assert_eq!(s.rainbow_alpha(), Some(0.0));

        s.tick(3_250.0);
        let end = s.rainbow_alpha().unwrap_or_default();
        assert!((end - RAINBOW_ALPHA).abs() < 1e-4);
        assert!(s.rainbow_fade.is_none());
    }

    #[test]
    fn negative_profit_clears_rainbow() {
        let mut s = ready_surface();
        s.update(10.0, "default", 0);
        s.update(-1.0, "default", 0);
        assert!(s.rainbow_fade.is_none());
        assert_eq!(s.rainbow_alpha(), Some(0.0));
    }

    // ── Teardown ───────────────────────────────────────────────

    #[test]
    fn teardown_is_idempotent_and_releases_surface() {
        let mut s = ready_surface();
        s.update(10.0, "it", 50);
        s.teardown();
        s.teardown();
        assert_eq!(*s.phase(), Phase::TornDown);
        assert!(s.frame().is_none());
        assert!(s.applied().is_none());

        s.update(10.0, "bio", 50);
        assert!(s.applied().is_none());
    }

    #[test]
    fn teardown_while_loading_drops_late_results_and_callbacks() {
        let (loader, _, _, sender) = stalled();
        let mut s = surface_with(Box::new(loader));
        let fired = Rc::new(Cell::new(false));
        let f = fired.clone();
        s.on_ready(move |_| f.set(true));
        s.initialize(HOST);
        s.teardown();

        let late = sender
            .borrow()
            .as_ref()
            .map(|tx| tx.send(LoadEvent::Failed("bg-1", AssetError::Missing("bg-1"))));
        assert!(matches!(late, Some(Err(_))));

        s.tick(60_000.0);
        assert_eq!(*s.phase(), Phase::TornDown);
        assert!(!fired.get());
    }

    #[test]
    fn reinitialize_after_teardown_starts_clean() {
        let mut s = ready_surface();
        s.select_character(Some(2), true);
        s.update(-20.0, "finance", 90);
        assert_eq!(s.visible_keys().map(|k| k.1), Some("coral-special"));
        s.teardown();
        assert_eq!(*s.stats(), SurfaceStats::default());

        s.initialize(HostElement {
            width: 300.0,
            height: 210.0,
        });
        assert!(!s.is_ready());
        let mut t = 100.0;
        while !s.is_ready() {
            t += 16.0;
            s.tick(t);
        }
        assert_eq!(s.readiness(), Some(&Readiness::Complete));
        assert_eq!(
            s.applied(),
            Some(&Applied {
                sector: Sector::Default,
                character_key: "char-a",
                profit: None,
            })
        );
        assert_eq!(s.frame().map(|f| f.width()), Some(60));

        // The old selection is gone until the host pushes it again.
        s.update(0.0, "default", 0);
        assert_eq!(s.visible_keys(), Some(("bg-1", "char-a")));
        assert_eq!(s.stats().character_swaps, 0);
        assert_eq!(s.stats().updates_applied, 1);
    }

    #[test]
    fn teardown_mid_fade_stops_the_fade() {
        let mut s = ready_surface();
        s.tick(1_000.0);
        s.update(10.0, "default", 0);
        s.tick(1_500.0);
        assert!(s.rainbow_fade.is_some());

        s.teardown();
        assert!(s.rainbow_fade.is_none());
        s.tick(2_000.0);
        s.tick(5_000.0);
        assert!(s.rainbow_fade.is_none());
        assert!(s.frame().is_none());
        assert_eq!(s.rainbow_alpha(), None);
        assert_eq!(*s.phase(), Phase::TornDown);
    }
}
