/// Grow Island: an investment dashboard whose island scene reacts to profit,
/// sector, and experience.

pub mod actions;
pub mod assets;
pub mod logic;
pub mod paint;
pub mod render;
#[cfg(any(target_arch = "wasm32", test))]
pub mod save;
pub mod state;
pub mod surface;
pub mod weather;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::Frame;

use crate::input::{ClickState, InputEvent};
use crate::log;

use actions::*;
use state::{
    Sector, SimulationInputs, EXPERIENCE_MAX, EXPERIENCE_MIN, PROFIT_MAX, PROFIT_MIN, ROSTER,
};
use surface::{HostElement, Readiness, RenderSurface};

/// Logical size of the island drawing area.
pub const SCENE_HOST: HostElement = HostElement {
    width: 600.0,
    height: 420.0,
};

pub struct IslandApp {
    pub inputs: SimulationInputs,
    pub surface: RenderSurface,
    /// Set by the readiness callback; forces a full push on the next tick.
    needs_sync: Rc<Cell<bool>>,
    /// Inputs most recently pushed to the surface.
    pushed: Option<SimulationInputs>,
}

impl IslandApp {
    pub fn new(surface: RenderSurface) -> Self {
        let inputs = SimulationInputs::new();

        #[cfg(target_arch = "wasm32")]
        let inputs = {
            let mut i = inputs;
            match save::load(&mut i) {
                Ok(true) => log::info("restored saved island"),
                Ok(false) => {}
                Err(e) => log::warn(&format!("ignoring save: {}", e)),
            }
            i
        };

        Self {
            inputs,
            surface,
            needs_sync: Rc::new(Cell::new(false)),
            pushed: None,
        }
    }

    /// Build the surface and schedule a full push once it is ready.
    pub fn mount(&mut self) {
        self.surface.initialize(SCENE_HOST);
        let needs_sync = self.needs_sync.clone();
        self.surface.on_ready(move |readiness| {
            if let Readiness::Degraded { missing } = readiness {
                log::warn(&format!("island running without {} assets", missing.len()));
            }
            needs_sync.set(true);
        });
    }

    /// Tear the surface down and build it again from scratch.
    pub fn remount(&mut self) {
        self.surface.teardown();
        self.pushed = None;
        self.needs_sync.set(false);
        self.mount();
    }

    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        let consumed = match event {
            InputEvent::Key(c) => match key_action(*c) {
                Some(id) => self.handle_click(id),
                None => false,
            },
            InputEvent::Click(id) => self.handle_click(*id),
            InputEvent::Slide { action_id, fraction } => self.handle_slide(*action_id, *fraction),
        };
        if consumed {
            self.persist();
        }
        consumed
    }

    fn handle_click(&mut self, action_id: u16) -> bool {
        if action_id == RELOAD_SCENE {
            self.remount();
            return true;
        }
        let inputs = &mut self.inputs;
        match action_id {
            PROFIT_DOWN => inputs.set_profit(inputs.profit_percent - 0.5),
            PROFIT_UP => inputs.set_profit(inputs.profit_percent + 0.5),
            PROFIT_DOWN_BIG => inputs.set_profit(inputs.profit_percent - 5.0),
            PROFIT_UP_BIG => inputs.set_profit(inputs.profit_percent + 5.0),
            EXP_DOWN => inputs.set_experience(inputs.experience - 1),
            EXP_UP => inputs.set_experience(inputs.experience + 1),
            EXP_DOWN_BIG => inputs.set_experience(inputs.experience - 10),
            EXP_UP_BIG => inputs.set_experience(inputs.experience + 10),
            TOGGLE_SPECIAL => inputs.special = !inputs.special,
            id if (SECTOR_BASE..SECTOR_BASE + Sector::all().len() as u16).contains(&id) => {
                inputs.sector = Sector::all()[(id - SECTOR_BASE) as usize];
            }
            id if (CHARACTER_BASE..CHARACTER_BASE + ROSTER.len() as u16).contains(&id) => {
                inputs.character = Some((id - CHARACTER_BASE) as u8);
            }
            _ => return false,
        }
        true
    }

    fn handle_slide(&mut self, action_id: u16, fraction: f64) -> bool {
        let fraction = fraction.clamp(0.0, 1.0);
        match action_id {
            PROFIT_SLIDER => self
                .inputs
                .set_profit(PROFIT_MIN + fraction * (PROFIT_MAX - PROFIT_MIN)),
            EXP_SLIDER => {
                let span = (EXPERIENCE_MAX - EXPERIENCE_MIN) as f64;
                self.inputs
                    .set_experience(EXPERIENCE_MIN + (fraction * span).round() as i32);
            }
            _ => return false,
        }
        true
    }

    /// Advance the surface and push any input change it has not seen yet.
    pub fn tick(&mut self, now_ms: f64) {
        self.surface.tick(now_ms);
        if self.sync() {
            // Composite the pushed state in this same frame.
            self.surface.tick(now_ms);
        }
    }

    /// Push the inputs when the surface just became ready or they changed.
    fn sync(&mut self) -> bool {
        if !self.surface.is_ready() {
            return false;
        }
        let changed = self.pushed.as_ref() != Some(&self.inputs);
        if !self.needs_sync.replace(false) && !changed {
            return false;
        }
        self.surface
            .select_character(self.inputs.character, self.inputs.special);
        self.surface.update(
            self.inputs.profit_percent,
            self.inputs.sector.key(),
            self.inputs.experience,
        );
        self.pushed = Some(self.inputs.clone());
        true
    }

    fn persist(&self) {
        #[cfg(target_arch = "wasm32")]
        if let Err(e) = save::save(&self.inputs) {
            log::warn(&format!("save failed: {}", e));
        }
    }

    pub fn render(&self, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
        render::render(&self.inputs, &self.surface, f, area, click_state);
    }
}

/// Keyboard shortcuts, expressed as the click they stand for.
fn key_action(key: char) -> Option<u16> {
    Some(match key {
        'a' => PROFIT_DOWN,
        'd' => PROFIT_UP,
        'A' => PROFIT_DOWN_BIG,
        'D' => PROFIT_UP_BIG,
        's' => EXP_DOWN,
        'w' => EXP_UP,
        'S' => EXP_DOWN_BIG,
        'W' => EXP_UP_BIG,
        '1'..='6' => SECTOR_BASE + (key as u8 - b'1') as u16,
        'z' => CHARACTER_BASE,
        'x' => CHARACTER_BASE + 1,
        'c' => CHARACTER_BASE + 2,
        'v' => TOGGLE_SPECIAL,
        'r' => RELOAD_SCENE,
        _ => return None,
    })
}
