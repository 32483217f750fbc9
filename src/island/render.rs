//! Grow Island rendering: dashboard header, sector tabs, input sliders,
//! roster list, and the island viewport.

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::buffer::Buffer;
use ratzilla::ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Borders, Paragraph, Widget, Wrap};
use ratzilla::ratatui::Frame;

use crate::input::{is_narrow_layout, ClickState};
use crate::widgets::{ClickableList, Slider, TabBar};

use super::actions::*;
use super::logic::{derive, growth_tier};
use super::paint::{hex_to_rgb, Raster};
use super::state::{
    stage_label, Sector, SimulationInputs, ToneOverlay, WeatherMode, EXPERIENCE_MAX,
    EXPERIENCE_MIN, PROFIT_MAX, PROFIT_MIN, ROSTER,
};
use super::surface::{Readiness, RenderSurface};

const ROSTER_KEYS: [char; 3] = ['Z', 'X', 'C'];

fn rgb(hex: u32) -> Color {
    let (r, g, b) = hex_to_rgb(hex);
    Color::Rgb(r, g, b)
}

pub fn render(
    inputs: &SimulationInputs,
    surface: &RenderSurface,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let is_narrow = is_narrow_layout(area.width);
    let borders = if is_narrow {
        Borders::TOP | Borders::BOTTOM
    } else {
        Borders::ALL
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Sector tabs
            Constraint::Length(4), // Sliders
            Constraint::Min(6),    // Viewport + controls
        ])
        .split(area);

    render_header(inputs, f, chunks[0], borders);
    render_sector_tabs(inputs, f, chunks[1], borders, is_narrow, click_state);
    render_sliders(inputs, f, chunks[2], borders, click_state);

    let controls = controls_list(inputs);
    if is_narrow {
        // Controls get exactly the rows they wrap to; the island takes the rest.
        let inner_width = chunks[3].width;
        let wanted = Paragraph::new(controls.lines().to_vec())
            .wrap(Wrap { trim: false })
            .line_count(inner_width) as u16
            + 2;
        let body = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(6), Constraint::Length(wanted)])
            .split(chunks[3]);
        render_viewport(surface, f, body[0], borders);
        render_controls(controls, f, body[1], borders, click_state);
    } else {
        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
            .split(chunks[3]);
        render_viewport(surface, f, body[0], borders);
        render_controls(controls, f, body[1], borders, click_state);
    }
}

fn render_header(inputs: &SimulationInputs, f: &mut Frame, area: Rect, borders: Borders) {
    let derived = derive(inputs);
    let sector = inputs.sector.config();
    let profit_color = if inputs.profit_percent < 0.0 {
        Color::Red
    } else {
        Color::Green
    };

    let line = Line::from(vec![
        Span::styled(
            format!("{} {} ", sector.icon, sector.name),
            Style::default()
                .fg(rgb(sector.accent))
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("{:+.1}% ", inputs.profit_percent),
            Style::default().fg(profit_color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(
                "· stage {} · {}",
                stage_label(derived.growth_tier),
                weather_text(&derived.weather_mode)
            ),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let widget = Paragraph::new(line).alignment(Alignment::Center).block(
        Block::default()
            .borders(borders)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(format!(" Grow Island · {} ", sector.description)),
    );
    f.render_widget(widget, area);
}

fn weather_text(mode: &WeatherMode) -> &'static str {
    match mode {
        WeatherMode::Rain => "🌧 rain",
        WeatherMode::Sunny => "☀ sunny",
        WeatherMode::None => "⛅ calm",
    }
}

fn render_sector_tabs(
    inputs: &SimulationInputs,
    f: &mut Frame,
    area: Rect,
    borders: Borders,
    is_narrow: bool,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let mut bar = TabBar::new(if is_narrow { "│" } else { " │ " });
    for (i, sector) in Sector::all().iter().enumerate() {
        let cfg = sector.config();
        let style = if *sector == inputs.sector {
            Style::default()
                .fg(Color::Black)
                .bg(rgb(cfg.accent))
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(rgb(cfg.accent))
        };
        let label = if is_narrow {
            cfg.icon.to_string()
        } else {
            format!("{} {}", i + 1, cfg.name)
        };
        bar = bar.tab(label, style, SECTOR_BASE + i as u16);
    }

    let mut cs = click_state.borrow_mut();
    bar.block(
        Block::default()
            .borders(borders)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Sector "),
    )
    .render(f, area, &mut cs);
}

fn render_sliders(
    inputs: &SimulationInputs,
    f: &mut Frame,
    area: Rect,
    borders: Borders,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let block = Block::default()
        .borders(borders)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Inputs  a/d profit  s/w experience ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(inner);

    let profit_color = if inputs.profit_percent < 0.0 {
        Color::Red
    } else {
        Color::Green
    };
    let mut cs = click_state.borrow_mut();
    Slider::new("Profit    ", inputs.profit_percent, PROFIT_MIN, PROFIT_MAX, PROFIT_SLIDER)
        .value_text(format!("{:+6.1}%", inputs.profit_percent))
        .color(profit_color)
        .steps(PROFIT_DOWN, PROFIT_UP)
        .render(f, rows[0], &mut cs);
    Slider::new(
        "Experience",
        inputs.experience as f64,
        EXPERIENCE_MIN as f64,
        EXPERIENCE_MAX as f64,
        EXP_SLIDER,
    )
    .value_text(experience_text(inputs.experience))
    .color(Color::Cyan)
    .steps(EXP_DOWN, EXP_UP)
    .render(f, rows[1], &mut cs);
}

fn controls_list(inputs: &SimulationInputs) -> ClickableList<'static> {
    let derived = derive(inputs);
    let mut cl = ClickableList::new();

    let mood = match derived.tone {
        ToneOverlay::Darken { intensity } => format!("gloomy ({:.0}%)", intensity * 100.0),
        ToneOverlay::Warm => "warm".to_string(),
        ToneOverlay::Neutral => "neutral".to_string(),
    };
    let mut sky = vec![Span::styled(
        format!(" Mood: {}", mood),
        Style::default().fg(Color::Gray),
    )];
    if derived.weather.rainbow {
        sky.push(Span::styled("  🌈", Style::default()));
    }
    cl.push(Line::from(sky));
    cl.push(Line::from(Span::styled(
        format!(" Sprite: {}", derived.character_key),
        Style::default().fg(Color::DarkGray),
    )));
    cl.push(Line::from(""));
    cl.push(Line::from(Span::styled(
        " Character",
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
    )));

    let selected = inputs.character.unwrap_or(0) as usize;
    for (i, profile) in ROSTER.iter().enumerate() {
        let marker = if i == selected { "▸" } else { " " };
        let style = if i == selected {
            Style::default().fg(rgb(profile.accent)).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        cl.push_clickable(
            Line::from(vec![
                Span::styled(format!(" [{}] ", ROSTER_KEYS[i]), Style::default().fg(Color::Yellow)),
                Span::styled(format!("{}{}", marker, profile.name), style),
            ]),
            CHARACTER_BASE + i as u16,
        );
    }

    let special = if inputs.special { "on" } else { "off" };
    cl.push_clickable(Line::from(format!(" [V] Special look: {}", special)), TOGGLE_SPECIAL);
    cl.push_clickable(
        Line::from(Span::styled(" [R] Reload scene", Style::default().fg(Color::DarkGray))),
        RELOAD_SCENE,
    );
    cl
}

fn render_controls(
    cl: ClickableList<'static>,
    f: &mut Frame,
    area: Rect,
    borders: Borders,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let block = Block::default()
        .borders(borders)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Island ");
    let inner = block.inner(area);
    let top = inner.y - area.y;
    let bottom = (area.y + area.height) - (inner.y + inner.height);
    {
        let mut cs = click_state.borrow_mut();
        cl.register_targets(area, &mut cs, top, bottom, 0, inner.width);
    }
    let widget = Paragraph::new(cl.into_lines())
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);
}

/// Experience as a percentage plus the growth stage it reaches.
fn experience_text(experience: i32) -> String {
    format!("{:>3}% · {}", experience, stage_label(growth_tier(experience)))
}

fn viewport_title(surface: &RenderSurface) -> (String, Color) {
    match surface.readiness() {
        Some(Readiness::Complete) => (" Scene ".to_string(), Color::Green),
        Some(Readiness::Degraded { missing }) => {
            (format!(" Scene ({} assets missing) ", missing.len()), Color::Yellow)
        }
        None if surface.load_progress().is_some() => {
            (" Scene (loading) ".to_string(), Color::DarkGray)
        }
        None => (" Scene ".to_string(), Color::DarkGray),
    }
}

fn render_viewport(surface: &RenderSurface, f: &mut Frame, area: Rect, borders: Borders) {
    let (title, title_color) = viewport_title(surface);
    let block = Block::default()
        .borders(borders)
        .border_style(Style::default().fg(title_color))
        .title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    if let Some(frame) = surface.frame() {
        f.render_widget(IslandView { frame }, inner);
        return;
    }

    let status = match surface.load_progress() {
        Some(p) => format!(
            "Loading assets {}/{}\n(giving up in {:.0}s)",
            p.loaded,
            p.total,
            (p.remaining_ms / 1000.0).ceil()
        ),
        None => "Scene offline. Press R to reload.".to_string(),
    };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Fill(1), Constraint::Length(2), Constraint::Fill(1)])
        .split(inner);
    f.render_widget(
        Paragraph::new(status)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray)),
        rows[1],
    );
}

/// Samples the composited raster onto the cell grid with upper half blocks:
/// each cell shows two vertically stacked pixels.
struct IslandView<'a> {
    frame: &'a Raster,
}

/// Largest rect inside `area` that keeps the raster's aspect ratio, centred.
/// Cells are two pixels tall.
fn fit(raster_w: usize, raster_h: usize, area: Rect) -> Rect {
    if raster_w == 0 || raster_h == 0 || area.width == 0 || area.height == 0 {
        return Rect::new(area.x, area.y, 0, 0);
    }
    let scale = (area.width as f64 / raster_w as f64).min(area.height as f64 * 2.0 / raster_h as f64);
    let w = ((raster_w as f64 * scale).round() as u16).clamp(1, area.width);
    let h = ((raster_h as f64 * scale / 2.0).round() as u16).clamp(1, area.height);
    Rect::new(
        area.x + (area.width - w) / 2,
        area.y + (area.height - h) / 2,
        w,
        h,
    )
}

impl Widget for IslandView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (rw, rh) = (self.frame.width(), self.frame.height());
        let view = fit(rw, rh, area);
        let sub_rows = view.height as usize * 2;
        for cy in 0..view.height {
            let top = (cy as usize * 2) * rh / sub_rows;
            let bottom = (cy as usize * 2 + 1) * rh / sub_rows;
            for cx in 0..view.width {
                let px = cx as usize * rw / view.width as usize;
                if let Some(cell) = buf.cell_mut((view.x + cx, view.y + cy)) {
                    cell.set_char('▀')
                        .set_fg(rgb(self.frame.pixel(px, top)))
                        .set_bg(rgb(self.frame.pixel(px, bottom)));
                }
            }
        }
    }
}
