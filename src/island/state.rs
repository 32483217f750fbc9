/// Grow Island state definitions: inputs, fixed tables, and derived view values.

/// Profit slider range and step.
pub const PROFIT_MIN: f64 = -50.0;
pub const PROFIT_MAX: f64 = 50.0;
pub const PROFIT_STEP: f64 = 0.5;

/// Experience slider range.
pub const EXPERIENCE_MIN: i32 = 0;
pub const EXPERIENCE_MAX: i32 = 100;

/// Minimum experience for each growth tier, lowest first.
pub const GROWTH_THRESHOLDS: [i32; 5] = [0, 20, 40, 60, 80];

/// Number of growth stages per character.
pub const STAGE_COUNT: usize = GROWTH_THRESHOLDS.len();

/// Investment sector. Drives the island backdrop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Sector {
    #[default]
    Default,
    It,
    Bio,
    Energy,
    Airport,
    Finance,
}

impl Sector {
    /// All sectors in display order.
    pub fn all() -> &'static [Sector] {
        &[
            Sector::Default,
            Sector::It,
            Sector::Bio,
            Sector::Energy,
            Sector::Airport,
            Sector::Finance,
        ]
    }

    /// Parse a sector key. Unknown keys fall back to `Default`.
    pub fn from_key(key: &str) -> Sector {
        match key {
            "it" => Sector::It,
            "bio" => Sector::Bio,
            "energy" => Sector::Energy,
            "airport" => Sector::Airport,
            "finance" => Sector::Finance,
            _ => Sector::Default,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Sector::Default => "default",
            Sector::It => "it",
            Sector::Bio => "bio",
            Sector::Energy => "energy",
            Sector::Airport => "airport",
            Sector::Finance => "finance",
        }
    }

    /// Backdrop asset key.
    pub fn background_key(&self) -> &'static str {
        match self {
            Sector::Default => "bg-1",
            Sector::It => "bg-2",
            Sector::Bio => "bg-3",
            Sector::Energy => "bg-4",
            Sector::Airport => "bg-5",
            Sector::Finance => "bg-6",
        }
    }

    pub fn config(&self) -> &'static SectorConfig {
        match self {
            Sector::Default => &SECTOR_DEFAULT,
            Sector::It => &SECTOR_IT,
            Sector::Bio => &SECTOR_BIO,
            Sector::Energy => &SECTOR_ENERGY,
            Sector::Airport => &SECTOR_AIRPORT,
            Sector::Finance => &SECTOR_FINANCE,
        }
    }
}

/// Display name and palette of a sector.
#[derive(Debug)]
pub struct SectorConfig {
    pub name: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    /// UI accent colour.
    pub accent: u32,
    pub ground: u32,
    pub building: u32,
    pub sky: u32,
}

static SECTOR_DEFAULT: SectorConfig = SectorConfig {
    name: "Default",
    icon: "🌿",
    description: "Green meadow island",
    accent: 0x4caf50,
    ground: 0x4caf50,
    building: 0x8bc34a,
    sky: 0x87ceeb,
};

static SECTOR_IT: SectorConfig = SectorConfig {
    name: "IT",
    icon: "💻",
    description: "High-tech city",
    accent: 0x2196f3,
    ground: 0x37474f,
    building: 0x00bcd4,
    sky: 0x1a237e,
};

static SECTOR_BIO: SectorConfig = SectorConfig {
    name: "Bio",
    icon: "🧬",
    description: "Biotech research park",
    accent: 0x4caf50,
    ground: 0x2e7d32,
    building: 0x66bb6a,
    sky: 0xc8e6c9,
};

static SECTOR_ENERGY: SectorConfig = SectorConfig {
    name: "Energy",
    icon: "⚡",
    description: "Power plant island",
    accent: 0xff9800,
    ground: 0xbf360c,
    building: 0xff6f00,
    sky: 0xfff3e0,
};

static SECTOR_AIRPORT: SectorConfig = SectorConfig {
    name: "Airport",
    icon: "✈️",
    description: "International airport hub",
    accent: 0x607d8b,
    ground: 0x546e7a,
    building: 0x90a4ae,
    sky: 0xb0bec5,
};

static SECTOR_FINANCE: SectorConfig = SectorConfig {
    name: "Finance",
    icon: "🏦",
    description: "Financial district",
    accent: 0xffc107,
    ground: 0x4e342e,
    building: 0xffd54f,
    sky: 0x263238,
};

/// One entry of the character roster.
#[derive(Debug)]
pub struct CharacterProfile {
    pub name: &'static str,
    /// Sprite keys for growth stages 0..=4, youngest first.
    pub stages: [&'static str; STAGE_COUNT],
    /// Sprite key for the special variant.
    pub special: &'static str,
    /// Main body colour of the sprite.
    pub body: u32,
    /// Accent colour (hair, hat).
    pub accent: u32,
}

/// Fixed character roster. Index 0 is the fallback.
pub static ROSTER: [CharacterProfile; 3] = [
    CharacterProfile {
        name: "Sol",
        stages: ["char-a", "char-b", "char-c", "char-d", "char-e"],
        special: "char-special",
        body: 0xffcc80,
        accent: 0x1565c0,
    },
    CharacterProfile {
        name: "Mint",
        stages: ["mint-a", "mint-b", "mint-c", "mint-d", "mint-e"],
        special: "mint-special",
        body: 0xffe0b2,
        accent: 0x26a69a,
    },
    CharacterProfile {
        name: "Coral",
        stages: ["coral-a", "coral-b", "coral-c", "coral-d", "coral-e"],
        special: "coral-special",
        body: 0xd7ccc8,
        accent: 0xef5350,
    },
];

/// Look up a roster entry. Unknown or unset ids resolve to index 0.
pub fn character_profile(id: Option<u8>) -> &'static CharacterProfile {
    id.and_then(|i| ROSTER.get(i as usize)).unwrap_or(&ROSTER[0])
}

/// Short label for a growth stage.
pub fn stage_label(tier: u8) -> &'static str {
    match tier {
        0 => "a (child)",
        1 => "b",
        2 => "c",
        3 => "d",
        _ => "e (elder)",
    }
}

/// Simulation inputs owned by the host UI.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationInputs {
    pub profit_percent: f64,
    pub sector: Sector,
    pub experience: i32,
    /// None until the player picks a character for the first time.
    pub character: Option<u8>,
    pub special: bool,
}

impl SimulationInputs {
    pub fn new() -> Self {
        Self {
            profit_percent: 5.0,
            sector: Sector::Default,
            experience: 0,
            character: None,
            special: false,
        }
    }

    /// Set profit, clamped to the slider range and snapped to its step.
    pub fn set_profit(&mut self, profit: f64) {
        let snapped = (profit / PROFIT_STEP).round() * PROFIT_STEP;
        self.profit_percent = snapped.clamp(PROFIT_MIN, PROFIT_MAX);
    }

    pub fn set_experience(&mut self, experience: i32) {
        self.experience = experience.clamp(EXPERIENCE_MIN, EXPERIENCE_MAX);
    }
}

/// Visual weather bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WeatherMode {
    None,
    Rain,
    Sunny,
}

/// Weather layers to draw. Several may apply at once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct WeatherEffects {
    pub rain: bool,
    pub sunshine: bool,
    pub rainbow: bool,
}

/// Full-surface colour wash.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ToneOverlay {
    Neutral,
    /// Darkening in [0, 1], scaled by how far profit is below zero.
    Darken { intensity: f64 },
    Warm,
}

/// Everything the view needs, derived from `SimulationInputs`.
#[derive(Clone, Debug, PartialEq)]
pub struct DerivedPresentation {
    pub growth_tier: u8,
    pub background_key: &'static str,
    pub character_key: &'static str,
    pub weather_mode: WeatherMode,
    pub weather: WeatherEffects,
    pub tone: ToneOverlay,
    /// Grey multiplied into the background texture (0xffffff = untouched).
    pub background_tint: u32,
}
