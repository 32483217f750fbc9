mod input;
mod island;
mod log;
mod time;
mod widgets;

use std::{cell::RefCell, io, rc::Rc};

use input::{pixel_to_cell, ClickState, InputEvent};
use island::assets::BuiltinLoader;
use island::surface::{RenderSurface, SurfaceConfig};
use island::IslandApp;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use ratzilla::event::{KeyCode, MouseButton, MouseEventKind};
use ratzilla::ratatui::Terminal;
use ratzilla::{DomBackend, WebRenderer};
use time::{performance_now, FrameClock};

/// Largest scene-time step per frame; a backgrounded tab resumes gently.
const MAX_FRAME_STEP_MS: f64 = 500.0;

/// Query the grid container's bounding rect and convert a pointer position to a cell.
fn dom_pixel_to_cell(mouse_x: u32, mouse_y: u32, cs: &ClickState) -> Option<(u16, u16)> {
    let window = web_sys::window()?;
    let document = window.document()?;

    // DomBackend creates a <div> as the grid container inside <body>.
    let grid = document.query_selector("body > div").ok()??;
    let rect = grid.get_bounding_client_rect();

    let col = pixel_to_cell(mouse_x as f64 - rect.left(), rect.width(), cs.terminal_cols)?;
    let row = pixel_to_cell(mouse_y as f64 - rect.top(), rect.height(), cs.terminal_rows)?;
    Some((col, row))
}

fn main() -> io::Result<()> {
    console_error_panic_hook::set_once();

    let config = SurfaceConfig::default();
    let seed = (js_sys::Math::random() * u64::MAX as f64) as u64;
    let surface = RenderSurface::new(
        config.clone(),
        Box::new(BuiltinLoader::new(config.loads_per_frame)),
        Box::new(ChaCha8Rng::seed_from_u64(seed)),
    );

    let app = Rc::new(RefCell::new(IslandApp::new(surface)));
    app.borrow_mut().mount();

    let click_state = Rc::new(RefCell::new(ClickState::new()));
    let backend = DomBackend::new()?;
    let terminal = Terminal::new(backend)?;

    // Mouse/touch handler
    terminal.on_mouse_event({
        let app = app.clone();
        let click_state = click_state.clone();
        move |mouse_event| {
            if mouse_event.event != MouseEventKind::Pressed
                || mouse_event.button != MouseButton::Left
            {
                return;
            }

            let event = {
                let cs = click_state.borrow();
                if cs.terminal_rows == 0 || cs.terminal_cols == 0 {
                    return;
                }
                dom_pixel_to_cell(mouse_event.x, mouse_event.y, &cs)
                    .and_then(|(col, row)| cs.event_at(col, row))
            };

            if let Some(event) = event {
                app.borrow_mut().handle_input(&event);
            }
        }
    });

    // Keyboard handler
    terminal.on_key_event({
        let app = app.clone();
        move |key_event| {
            let c = match key_event.code {
                KeyCode::Char(c) => c,
                KeyCode::Left => 'a',
                KeyCode::Right => 'd',
                KeyCode::Down => 's',
                KeyCode::Up => 'w',
                _ => return,
            };
            app.borrow_mut().handle_input(&InputEvent::Key(c));
        }
    });

    let mut clock = FrameClock::new(MAX_FRAME_STEP_MS);
    terminal.draw_web(move |f| {
        let now = clock.update(performance_now());
        let mut app = app.borrow_mut();
        app.tick(now);

        let size = f.area();
        click_state.borrow_mut().reset(size.width, size.height);
        app.render(f, size, &click_state);
    });

    Ok(())
}
