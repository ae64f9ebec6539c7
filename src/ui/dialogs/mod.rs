mod authorization;
mod confirm_price;

pub use authorization::{AuthorizationDialog, AuthorizationResult, AuthorizationSelection};
pub use confirm_price::{ConfirmPriceDialog, ConfirmPriceFocus, ConfirmPriceResult};

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    prelude::*,
};

/// Helper to create a centered rect
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// A `[ Label ]` button. Disabled buttons are dimmed whether selected or not.
pub(crate) fn button_span(label: &str, selected: bool, enabled: bool) -> Span<'static> {
    let style = match (enabled, selected) {
        (false, true) => Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::REVERSED),
        (false, false) => Style::default().fg(Color::DarkGray),
        (true, true) => Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::REVERSED | Modifier::BOLD),
        (true, false) => Style::default().fg(Color::White),
    };
    Span::styled(format!("[ {label} ]"), style)
}
