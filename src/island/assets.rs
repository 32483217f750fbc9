//! Island asset catalog and loading.
//!
//! Assets are addressed by string key: `bg-1`..`bg-6` for sector backdrops,
//! five growth stages plus one special variant per roster character. The
//! [`AssetLoader`] trait is the seam between the surface and whatever
//! produces the assets; completions come back over an mpsc channel so the
//! surface can drop the receiver on teardown and never see late results.

use std::collections::VecDeque;
use std::sync::mpsc::Sender;

use thiserror::Error;

use super::state::{Sector, ROSTER, STAGE_COUNT};

/// Procedural backdrop: palette plus skyline heights.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackdropArt {
    pub sky: u32,
    pub ground: u32,
    pub building: u32,
    /// Building (or tree) heights in surface units, left to right.
    pub skyline: &'static [f64],
    /// Draw trees instead of towers.
    pub trees: bool,
}

/// Pixel-art sprite. Each char is one pixel; `.` is transparent.
///
/// `B` body, `A` accent, `K` outline, `E` eye, `P` cheek, `W` white, `G` gold.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpriteArt {
    pub rows: &'static [&'static str],
    pub body: u32,
    pub accent: u32,
}

impl SpriteArt {
    pub fn color_of(&self, ch: char) -> Option<u32> {
        match ch {
            'B' => Some(self.body),
            'A' => Some(self.accent),
            'K' => Some(0x3e2723),
            'E' => Some(0x212121),
            'P' => Some(0xf48fb1),
            'W' => Some(0xfafafa),
            'G' => Some(0xffd54f),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Asset {
    Backdrop(BackdropArt),
    Sprite(SpriteArt),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetError {
    #[error("asset `{0}` is not in the catalog")]
    Missing(&'static str),
}

/// A single load completion.
#[derive(Debug)]
pub enum LoadEvent {
    Loaded(&'static str, Asset),
    Failed(&'static str, AssetError),
}

pub trait AssetLoader {
    /// Queue `keys` for loading. Results are sent on `done` as they resolve.
    fn begin(&mut self, keys: Vec<&'static str>, done: Sender<LoadEvent>);

    /// Advance in-flight work. Called once per frame.
    fn pump(&mut self);

    /// Abandon in-flight work. Nothing is sent afterwards.
    fn cancel(&mut self);
}

/// Resolves keys from the built-in catalog, a few per frame.
pub struct BuiltinLoader {
    queue: VecDeque<&'static str>,
    done: Option<Sender<LoadEvent>>,
    per_pump: usize,
}

impl BuiltinLoader {
    pub fn new(per_pump: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            done: None,
            per_pump: per_pump.max(1),
        }
    }
}

impl AssetLoader for BuiltinLoader {
    fn begin(&mut self, keys: Vec<&'static str>, done: Sender<LoadEvent>) {
        self.queue = keys.into();
        self.done = Some(done);
    }

    fn pump(&mut self) {
        let Some(done) = &self.done else {
            return;
        };
        for _ in 0..self.per_pump {
            let Some(key) = self.queue.pop_front() else {
                break;
            };
            let event = match lookup(key) {
                Some(asset) => LoadEvent::Loaded(key, asset),
                None => LoadEvent::Failed(key, AssetError::Missing(key)),
            };
            // Receiver gone means the surface was torn down.
            if done.send(event).is_err() {
                self.cancel();
                return;
            }
        }
        if self.queue.is_empty() {
            self.done = None;
        }
    }

    fn cancel(&mut self) {
        self.queue.clear();
        self.done = None;
    }
}

/// Every key the island declares, backdrops first.
pub fn manifest() -> Vec<&'static str> {
    let mut keys: Vec<&'static str> = Sector::all().iter().map(|s| s.background_key()).collect();
    for profile in ROSTER.iter() {
        keys.extend(profile.stages.iter().copied());
        keys.push(profile.special);
    }
    keys
}

/// Resolve a key against the built-in catalog.
pub fn lookup(key: &str) -> Option<Asset> {
    if let Some(sector) = Sector::all().iter().find(|s| s.background_key() == key) {
        return Some(Asset::Backdrop(backdrop_for(*sector)));
    }
    for profile in ROSTER.iter() {
        if let Some(stage) = profile.stages.iter().position(|k| *k == key) {
            return Some(Asset::Sprite(SpriteArt {
                rows: STAGE_ART[stage],
                body: profile.body,
                accent: profile.accent,
            }));
        }
        if profile.special == key {
            return Some(Asset::Sprite(SpriteArt {
                rows: SPECIAL_ART,
                body: profile.body,
                accent: profile.accent,
            }));
        }
    }
    None
}

fn backdrop_for(sector: Sector) -> BackdropArt {
    let cfg = sector.config();
    let skyline: &'static [f64] = match sector {
        Sector::Default => &[40.0, 55.0, 35.0, 60.0, 45.0],
        Sector::It => &[110.0, 150.0, 90.0, 170.0, 120.0],
        Sector::Bio => &[60.0, 80.0, 70.0, 90.0, 60.0],
        Sector::Energy => &[90.0, 50.0, 120.0, 60.0, 80.0],
        Sector::Airport => &[40.0, 60.0, 30.0, 90.0, 40.0],
        Sector::Finance => &[140.0, 120.0, 170.0, 130.0, 100.0],
    };
    BackdropArt {
        sky: cfg.sky,
        ground: cfg.ground,
        building: cfg.building,
        skyline,
        trees: sector == Sector::Default,
    }
}

const STAGE_ART: [&[&str]; STAGE_COUNT] = [
    &[
        "..AAA..",
        ".KBBBK.",
        ".BEBEB.",
        ".PBBBP.",
        "..KBK..",
        ".AAAAA.",
        "..B.B..",
    ],
    &[
        "..AAAAA..",
        ".AABBBAA.",
        ".KBBBBBK.",
        ".BBEBEBB.",
        ".PBBBBBP.",
        "..KBBBK..",
        "..AAAAA..",
        ".BAAAAAB.",
        "..AA.AA..",
        "..BB.BB..",
    ],
    &[
        "...AAAAA...",
        "..AABBBAA..",
        "..KBBBBBK..",
        "..BBEBEBB..",
        "..PBBBBBP..",
        "...KBBBK...",
        "..AAAAAAA..",
        ".BAAAAAAAB.",
        ".B.AAAAA.B.",
        "...AAAAA...",
        "...AA.AA...",
        "...AA.AA...",
        "...BB.BB...",
    ],
    &[
        "...AAAAA...",
        "..AABBBAA..",
        "..KBBBBBK..",
        "..BBEBEBB..",
        "..BBBBBBB..",
        "...KBBBK...",
        "....BBB....",
        "..AAAAAAA..",
        ".BAAAAAAAB.",
        ".BAAAAAAAB.",
        ".B.AAAAA.B.",
        "...AAAAA...",
        "...AA.AA...",
        "...AA.AA...",
        "..KKK.KKK..",
    ],
    &[
        "...WWWWW...",
        "..WWBBBWW..",
        "..KBBBBBK..",
        "..BKEBEKB..",
        "..BBBBBBB..",
        "...KBBBK...",
        "....BBB....",
        "..AAAAAAA.K",
        ".BAAAAAAABK",
        ".BAAAAAAA.K",
        "...AAAAA..K",
        "...AAAAA..K",
        "...AA.AA..K",
        "...AA.AA..K",
        "..KKK.KKK.K",
    ],
];

const SPECIAL_ART: &[&str] = &[
    "..G.G.G..",
    "..GGGGG..",
    "..AAAAA..",
    ".KBBBBBK.",
    ".BBEBEBB.",
    ".PBBBBBP.",
    "..KBBBK..",
    ".GAAAAAG.",
    "BAAAGAAAB",
    "..AAGAA..",
    "..AA.AA..",
    "..BB.BB..",
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn manifest_covers_backdrops_and_roster() {
        let keys = manifest();
        assert_eq!(keys.len(), Sector::all().len() + ROSTER.len() * (STAGE_COUNT + 1));
        assert!(keys.contains(&"bg-6"));
        assert!(keys.contains(&"char-a"));
        assert!(keys.contains(&"coral-special"));
    }

    #[test]
    fn every_manifest_key_resolves() {
        for key in manifest() {
            assert!(lookup(key).is_some(), "missing {}", key);
        }
    }

    #[test]
    fn unknown_key_does_not_resolve() {
        assert_eq!(lookup("bg-7"), None);
        assert_eq!(lookup(""), None);
    }

    #[test]
    fn backdrop_uses_sector_palette() {
        match lookup("bg-2") {
            Some(Asset::Backdrop(art)) => {
                assert_eq!(art.sky, Sector::It.config().sky);
                assert!(!art.trees);
            }
            other => panic!("expected backdrop, got {:?}", other),
        }
    }

    #[test]
    fn stages_grow_taller() {
        let heights: Vec<usize> = STAGE_ART.iter().map(|a| a.len()).collect();
        assert!(heights.windows(2).all(|w| w[0] <= w[1]), "{:?}", heights);
    }

    #[test]
    fn sprite_palette_uses_profile_colors() {
        match lookup("mint-c") {
            Some(Asset::Sprite(art)) => {
                assert_eq!(art.color_of('B'), Some(ROSTER[1].body));
                assert_eq!(art.color_of('A'), Some(ROSTER[1].accent));
                assert_eq!(art.color_of('.'), None);
            }
            other => panic!("expected sprite, got {:?}", other),
        }
    }

    #[test]
    fn builtin_loader_resolves_in_batches() {
        let (tx, rx) = mpsc::channel();
        let mut loader = BuiltinLoader::new(2);
        loader.begin(vec!["bg-1", "bg-2", "nope"], tx);

        loader.pump();
        assert_eq!(rx.try_iter().count(), 2);

        loader.pump();
        let rest: Vec<LoadEvent> = rx.try_iter().collect();
        assert_eq!(rest.len(), 1);
        assert!(matches!(
            rest[0],
            LoadEvent::Failed("nope", AssetError::Missing("nope"))
        ));

        loader.pump();
        assert_eq!(rx.try_iter().count(), 0);
    }

    #[test]
    fn cancelled_loader_sends_nothing() {
        let (tx, rx) = mpsc::channel();
        let mut loader = BuiltinLoader::new(10);
        loader.begin(manifest(), tx);
        loader.cancel();
        loader.pump();
        assert_eq!(rx.try_iter().count(), 0);
    }

    #[test]
    fn dropped_receiver_stops_loader() {
        let (tx, rx) = mpsc::channel();
        let mut loader = BuiltinLoader::new(1);
        loader.begin(manifest(), tx);
        drop(rx);
        loader.pump();
        assert!(loader.queue.is_empty());
        assert!(loader.done.is_none());
    }
}
