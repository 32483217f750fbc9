//! Input handling: pixel-to-cell conversion, click targets, and event types.
//!
//! Rendering registers targets each frame; the DOM mouse handler converts a
//! press to a terminal cell and asks [`ClickState::event_at`] what it means.

use ratzilla::ratatui::layout::Rect;

/// Input events, normalized from keyboard, mouse, and touch sources.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// A key press from keyboard.
    Key(char),
    /// A tap on a button target, identified by a semantic action ID.
    Click(u16),
    /// A tap on a slider track. `fraction` is 0.0 at the left end, 1.0 at the right.
    Slide { action_id: u16, fraction: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Button,
    /// The column inside the rect selects a value.
    Slider,
}

/// A region on screen that reacts to a tap.
#[derive(Debug, Clone)]
pub struct ClickTarget {
    /// Hit region in terminal cell coordinates.
    pub rect: Rect,
    pub action_id: u16,
    pub kind: TargetKind,
}

impl ClickTarget {
    fn contains(&self, col: u16, row: u16) -> bool {
        let r = &self.rect;
        col >= r.x && col < r.x + r.width && row >= r.y && row < r.y + r.height
    }
}

/// Shared between the render loop and the mouse handler.
pub struct ClickState {
    pub targets: Vec<ClickTarget>,
    pub terminal_cols: u16,
    pub terminal_rows: u16,
}

impl ClickState {
    pub fn new() -> Self {
        Self {
            targets: Vec::new(),
            terminal_cols: 0,
            terminal_rows: 0,
        }
    }

    /// Forget last frame's targets and record the new terminal size.
    pub fn reset(&mut self, cols: u16, rows: u16) {
        self.targets.clear();
        self.terminal_cols = cols;
        self.terminal_rows = rows;
    }

    pub fn add_click_target(&mut self, rect: Rect, action_id: u16) {
        self.targets.push(ClickTarget {
            rect,
            action_id,
            kind: TargetKind::Button,
        });
    }

    pub fn add_slider_target(&mut self, rect: Rect, action_id: u16) {
        if rect.width == 0 || rect.height == 0 {
            return;
        }
        self.targets.push(ClickTarget {
            rect,
            action_id,
            kind: TargetKind::Slider,
        });
    }

    /// Register a full-row button at `row`, if the row lies inside `area`.
    pub fn add_row_target(&mut self, area: Rect, row: u16, action_id: u16) {
        if row >= area.y && row < area.y + area.height {
            self.add_click_target(Rect::new(area.x, row, area.width, 1), action_id);
        }
    }

    /// Register targets for a horizontal tab bar from the rendered label widths.
    ///
    /// `tab_widths` holds `(display_width, action_id)` per padded label. Each
    /// target covers its label plus half of the neighbouring separators; the
    /// first and last tabs stretch to the area edges so there are no gaps.
    pub fn register_tab_targets(
        &mut self,
        tab_widths: &[(u16, u16)],
        separator_width: u16,
        x: u16,
        y: u16,
        total_width: u16,
        height: u16,
    ) {
        let n = tab_widths.len();
        if n == 0 || total_width == 0 {
            return;
        }

        let mut spans: Vec<(u16, u16)> = Vec::with_capacity(n);
        let mut cursor: u16 = 0;
        for (i, &(w, _)) in tab_widths.iter().enumerate() {
            if i > 0 {
                cursor += separator_width;
            }
            spans.push((cursor, cursor + w));
            cursor += w;
        }

        for (i, &(_, action_id)) in tab_widths.iter().enumerate() {
            let left = match i {
                0 => 0,
                _ => spans[i - 1].1 + (spans[i].0 - spans[i - 1].1) / 2,
            };
            let right = if i == n - 1 {
                total_width
            } else {
                spans[i].1 + (spans[i + 1].0 - spans[i].1) / 2
            };
            let w = right.min(total_width).saturating_sub(left);
            if w > 0 {
                self.add_click_target(Rect::new(x + left, y, w, height), action_id);
            }
        }
    }

    /// Topmost target under a cell. Later registrations sit on top.
    fn target_at(&self, col: u16, row: u16) -> Option<&ClickTarget> {
        self.targets.iter().rev().find(|t| t.contains(col, row))
    }

    /// Action ID under a cell, whatever the target kind.
    #[cfg(test)]
    pub fn hit_test(&self, col: u16, row: u16) -> Option<u16> {
        self.target_at(col, row).map(|t| t.action_id)
    }

    /// The input event a tap on `(col, row)` produces.
    pub fn event_at(&self, col: u16, row: u16) -> Option<InputEvent> {
        let target = self.target_at(col, row)?;
        Some(match target.kind {
            TargetKind::Button => InputEvent::Click(target.action_id),
            TargetKind::Slider => {
                let span = target.rect.width.saturating_sub(1).max(1) as f64;
                let offset = (col - target.rect.x) as f64;
                InputEvent::Slide {
                    action_id: target.action_id,
                    fraction: (offset / span).clamp(0.0, 1.0),
                }
            }
        })
    }
}

/// Whether a screen width (in columns) should use the stacked layout.
pub fn is_narrow_layout(width: u16) -> bool {
    width < 60
}

/// Convert a pixel offset along one axis to a cell index.
///
/// `offset` is relative to the grid container's edge, `extent` is the
/// container's size in pixels along that axis, `cells` the cell count.
/// Returns `None` outside the grid or for degenerate inputs.
pub fn pixel_to_cell(offset: f64, extent: f64, cells: u16) -> Option<u16> {
    if extent <= 0.0 || cells == 0 || offset < 0.0 {
        return None;
    }
    let cell = (offset / (extent / cells as f64)) as u16;
    if cell >= cells {
        None
    } else {
        Some(cell)
    }
}
