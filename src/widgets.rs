//! Clickable UI components.
//!
//! Each component renders itself and registers its own click targets, so
//! visual output and hit regions cannot drift apart.
//!
//! # Components
//!
//! - [`TabBar`]: Horizontal tab row (sector picker).
//! - [`ClickableList`]: Vertical list with per-row click targets.
//! - [`Slider`]: Labelled value track with step buttons.

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Paragraph};
use ratzilla::ratatui::Frame;

use crate::input::ClickState;

// ── TabBar ─────────────────────────────────────────────────────

/// A horizontal tab bar.
///
/// Labels are measured with `Line::width`, so emoji icons and wide glyphs get
/// targets that match where they actually land.
///
/// # Example
/// ```ignore
/// TabBar::new(" │ ")
///     .tab("🌿 Default", style(0), SECTOR_BASE)
///     .tab("💻 IT", style(1), SECTOR_BASE + 1)
///     .render(f, area, &mut cs);
/// ```
pub struct TabBar<'a> {
    tabs: Vec<(String, Style, u16)>,
    separator: &'a str,
    block: Block<'a>,
}

impl<'a> TabBar<'a> {
    pub fn new(separator: &'a str) -> Self {
        Self {
            tabs: Vec::new(),
            separator,
            block: Block::default(),
        }
    }

    pub fn tab(mut self, label: impl Into<String>, style: Style, action_id: u16) -> Self {
        self.tabs.push((label.into(), style, action_id));
        self
    }

    /// Surround the bar with `block`; targets shift to the block's inner area.
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = block;
        self
    }

    pub fn render(self, f: &mut Frame, area: Rect, cs: &mut ClickState) {
        let separator = Span::styled(self.separator, Style::default().fg(Color::DarkGray));
        let mut spans: Vec<Span> = Vec::with_capacity(self.tabs.len() * 2);
        let mut widths: Vec<(u16, u16)> = Vec::with_capacity(self.tabs.len());
        for (label, style, action_id) in self.tabs {
            if !spans.is_empty() {
                spans.push(separator.clone());
            }
            let tab = Span::styled(format!(" {} ", label), style);
            widths.push((tab.width() as u16, action_id));
            spans.push(tab);
        }

        let inner = self.block.inner(area);
        f.render_widget(Paragraph::new(Line::from(spans)).block(self.block), area);

        // Columns from the inner area; rows from the outer one so the whole
        // bordered bar is tappable.
        cs.register_tab_targets(
            &widths,
            separator.width() as u16,
            inner.x,
            area.y,
            inner.width,
            area.height.max(1),
        );
    }
}

// ── ClickableList ──────────────────────────────────────────────

/// Lines for a `Paragraph`, some of them bound to action IDs.
///
/// Targets follow their line: inserting a status line above the roster moves
/// the roster's hit rows with it.
///
/// # Example
/// ```ignore
/// let mut cl = ClickableList::new();
/// cl.push(Line::from("Roster"));
/// cl.push_clickable(Line::from(" [Z] Sol"), CHARACTER_BASE);
/// cl.register_targets(area, &mut cs, 1, 1, 0, inner.width);
/// f.render_widget(Paragraph::new(cl.into_lines()).block(block), area);
/// ```
pub struct ClickableList<'a> {
    lines: Vec<Line<'a>>,
    /// `(line_index, action_id)` pairs.
    actions: Vec<(usize, u16)>,
}

impl<'a> ClickableList<'a> {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            actions: Vec::new(),
        }
    }

    pub fn push(&mut self, line: Line<'a>) {
        self.lines.push(line);
    }

    pub fn push_clickable(&mut self, line: Line<'a>, action_id: u16) {
        self.actions.push((self.lines.len(), action_id));
        self.lines.push(line);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn lines(&self) -> &[Line<'a>] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<Line<'a>> {
        self.lines
    }

    /// Visual rows each line occupies at `inner_width` (0 = no wrapping).
    fn row_heights(&self, inner_width: u16) -> Vec<u16> {
        self.lines
            .iter()
            .map(|line| match inner_width {
                0 => 1,
                w => line.width().max(1).div_ceil(w as usize) as u16,
            })
            .collect()
    }

    /// Register a row target for every visible row of every clickable line.
    ///
    /// * `top_offset` / `bottom_offset`: rows taken by borders or padding.
    /// * `scroll`: vertical scroll in visual rows.
    /// * `inner_width`: wrap width of the paragraph, or `0` when it does not wrap.
    pub fn register_targets(
        &self,
        area: Rect,
        cs: &mut ClickState,
        top_offset: u16,
        bottom_offset: u16,
        scroll: u16,
        inner_width: u16,
    ) {
        let content_y = area.y + top_offset;
        let content_end = area.y + area.height.saturating_sub(bottom_offset);

        let heights = self.row_heights(inner_width);
        let mut starts = Vec::with_capacity(heights.len());
        let mut cursor: u16 = 0;
        for h in &heights {
            starts.push(cursor);
            cursor = cursor.saturating_add(*h);
        }

        for &(idx, action_id) in &self.actions {
            let (Some(&start), Some(&height)) = (starts.get(idx), heights.get(idx)) else {
                continue;
            };
            for visual in (start..start + height).filter(|v| *v >= scroll) {
                let row = content_y + (visual - scroll);
                if row >= content_end {
                    break;
                }
                cs.add_row_target(area, row, action_id);
            }
        }
    }
}

// ── Slider ─────────────────────────────────────────────────────

/// Column spans of a rendered slider row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliderLayout {
    pub down: Rect,
    pub track: Rect,
    pub up: Rect,
}

/// A one-row value slider: `label ◀ ━━━━●──── ▶ value`.
///
/// Tapping the track jumps to the tapped position (dispatched as
/// `InputEvent::Slide`); the arrows step by whatever the owner decides for
/// their action IDs.
pub struct Slider<'a> {
    label: &'a str,
    value_text: String,
    ratio: f64,
    color: Color,
    track_id: u16,
    step_ids: Option<(u16, u16)>,
}

const ARROW_WIDTH: u16 = 3;

impl<'a> Slider<'a> {
    /// `value` is placed on the track relative to `min..=max`.
    pub fn new(label: &'a str, value: f64, min: f64, max: f64, track_id: u16) -> Self {
        let ratio = if max > min {
            ((value - min) / (max - min)).clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            label,
            value_text: format!("{}", value),
            ratio,
            color: Color::White,
            track_id,
            step_ids: None,
        }
    }

    pub fn value_text(mut self, text: impl Into<String>) -> Self {
        self.value_text = text.into();
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Show `◀`/`▶` buttons bound to these action IDs.
    pub fn steps(mut self, down_id: u16, up_id: u16) -> Self {
        self.step_ids = Some((down_id, up_id));
        self
    }

    /// Where the arrows and track fall inside `area` (first row only).
    pub fn layout(&self, area: Rect) -> SliderLayout {
        let label_w = Line::from(self.label).width() as u16 + 1;
        let value_w = Line::from(self.value_text.as_str()).width() as u16 + 1;
        let x0 = area.x + label_w.min(area.width);
        let track_w = area
            .width
            .saturating_sub(label_w + value_w + ARROW_WIDTH * 2);
        let row = |x: u16, w: u16| Rect::new(x, area.y, w, area.height.min(1));
        SliderLayout {
            down: row(x0, ARROW_WIDTH.min(area.width.saturating_sub(label_w))),
            track: row(x0 + ARROW_WIDTH, track_w),
            up: row(x0 + ARROW_WIDTH + track_w, if track_w > 0 { ARROW_WIDTH } else { 0 }),
        }
    }

    /// Knob column within a track of `width` cells.
    pub fn knob_offset(&self, width: u16) -> u16 {
        (self.ratio * width.saturating_sub(1) as f64).round() as u16
    }

    /// Render the row and register the track and arrow targets.
    pub fn render(self, f: &mut Frame, area: Rect, cs: &mut ClickState) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let layout = self.layout(area);
        let knob = self.knob_offset(layout.track.width);
        let track: String = (0..layout.track.width)
            .map(|i| match i.cmp(&knob) {
                std::cmp::Ordering::Less => '━',
                std::cmp::Ordering::Equal => '●',
                std::cmp::Ordering::Greater => '─',
            })
            .collect();
        let arrow = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);

        let mut spans = vec![Span::styled(
            format!("{} ", self.label),
            Style::default().fg(Color::Gray),
        )];
        if layout.track.width > 0 {
            spans.push(Span::styled(" ◀ ", arrow));
            spans.push(Span::styled(track, Style::default().fg(self.color)));
            spans.push(Span::styled(" ▶ ", arrow));
        }
        spans.push(Span::styled(
            format!(" {}", self.value_text),
            Style::default().fg(self.color).add_modifier(Modifier::BOLD),
        ));
        f.render_widget(Paragraph::new(Line::from(spans)), area);

        if layout.track.width == 0 {
            return;
        }
        cs.add_slider_target(layout.track, self.track_id);
        if let Some((down_id, up_id)) = self.step_ids {
            cs.add_click_target(layout.down, down_id);
            cs.add_click_target(layout.up, up_id);
        }
    }
}
