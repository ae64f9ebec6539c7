use crossterm::event::KeyCode;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use serde_json::json;

use super::{button_span, centered_rect};
use crate::i18n::Translator;
use crate::mana::{from_mana, to_mana, MANA_SYMBOL};
use crate::ui::form_field::FormField;

/// Which control of the confirm dialog has focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmPriceFocus {
    Field,
    Cancel,
    Proceed,
}

impl ConfirmPriceFocus {
    fn next(self) -> Self {
        match self {
            Self::Field => Self::Cancel,
            Self::Cancel => Self::Proceed,
            Self::Proceed => Self::Field,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::Field => Self::Proceed,
            Self::Cancel => Self::Field,
            Self::Proceed => Self::Cancel,
        }
    }
}

/// Outcome of a key press in the confirm dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmPriceResult {
    Cancelled,
    Proceed,
}

/// Asks the seller to type the price a second time before listing
pub struct ConfirmPriceDialog {
    pub visible: bool,
    pub confirm_price: FormField,
    pub focus: ConfirmPriceFocus,
}

impl Default for ConfirmPriceDialog {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfirmPriceDialog {
    pub fn new() -> Self {
        Self {
            visible: false,
            confirm_price: FormField::price("", ""),
            focus: ConfirmPriceFocus::Field,
        }
    }

    /// Open the dialog; the original price becomes the field placeholder
    pub fn show(&mut self, price: &str) {
        self.confirm_price = FormField::price("", price);
        self.focus = ConfirmPriceFocus::Field;
        self.visible = true;
    }

    /// Close the dialog. The re-entered price never outlives it.
    pub fn hide(&mut self) {
        self.visible = false;
        self.confirm_price.clear();
        self.focus = ConfirmPriceFocus::Field;
    }

    /// Proceed is allowed only when both amounts are equal
    pub fn can_proceed(&self, price: &str) -> bool {
        from_mana(price) == from_mana(self.confirm_price.value())
    }

    pub fn handle_key(&mut self, key: KeyCode, price: &str) -> Option<ConfirmPriceResult> {
        match key {
            KeyCode::Esc => Some(ConfirmPriceResult::Cancelled),
            KeyCode::Tab | KeyCode::Down => {
                self.focus = self.focus.next();
                None
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = self.focus.prev();
                None
            }
            KeyCode::Enter => match self.focus {
                ConfirmPriceFocus::Field => {
                    self.focus = ConfirmPriceFocus::Proceed;
                    None
                }
                ConfirmPriceFocus::Cancel => Some(ConfirmPriceResult::Cancelled),
                ConfirmPriceFocus::Proceed => self
                    .can_proceed(price)
                    .then_some(ConfirmPriceResult::Proceed),
            },
            KeyCode::Left | KeyCode::Right if self.focus != ConfirmPriceFocus::Field => {
                self.focus = if self.focus == ConfirmPriceFocus::Cancel {
                    ConfirmPriceFocus::Proceed
                } else {
                    ConfirmPriceFocus::Cancel
                };
                None
            }
            _ => {
                if self.focus == ConfirmPriceFocus::Field {
                    self.confirm_price.handle_key(key);
                }
                None
            }
        }
    }

    pub fn render(&self, frame: &mut Frame, tr: &Translator, nft_name: &str, price: &str) {
        if !self.visible {
            return;
        }

        let area = centered_rect(50, 50, frame.area());
        frame.render_widget(Clear, area);

        let block = Block::default()
            .title(format!(" {} ", tr.t("sell_page.confirm.title")))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow));

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),    // Explanation
                Constraint::Length(4), // Price field
                Constraint::Length(1), // Buttons
            ])
            .margin(1)
            .split(inner);

        let amount = format!("{MANA_SYMBOL} {}", to_mana(from_mana(price)));
        let text = vec![
            Line::from(Span::styled(
                tr.t_with(
                    "sell_page.confirm.line_one",
                    &json!({ "name": nft_name, "amount": amount }),
                ),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(tr.t("sell_page.confirm.line_two")),
        ];
        frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }), chunks[0]);

        self.confirm_price.render(
            frame,
            chunks[1],
            &tr.t("sell_page.price"),
            self.focus == ConfirmPriceFocus::Field,
            None,
        );

        let buttons = Line::from(vec![
            button_span(
                &tr.t("global.cancel"),
                self.focus == ConfirmPriceFocus::Cancel,
                true,
            ),
            Span::raw("   "),
            button_span(
                &tr.t("global.proceed"),
                self.focus == ConfirmPriceFocus::Proceed,
                self.can_proceed(price),
            ),
        ]);
        frame.render_widget(
            Paragraph::new(buttons).alignment(Alignment::Center),
            chunks[2],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_str(dialog: &mut ConfirmPriceDialog, s: &str, price: &str) {
        for c in s.chars() {
            dialog.handle_key(KeyCode::Char(c), price);
        }
    }

    #[test]
    fn test_show_uses_price_as_placeholder() {
        let mut dialog = ConfirmPriceDialog::new();
        dialog.show("1,000");
        assert!(dialog.visible);
        assert_eq!(dialog.confirm_price, FormField::price("", "1,000"));
    }

    #[test]
    fn test_proceed_requires_matching_price() {
        let mut dialog = ConfirmPriceDialog::new();
        dialog.show("1,000");
        assert!(!dialog.can_proceed("1,000"));

        type_str(&mut dialog, "100", "1,000");
        assert!(!dialog.can_proceed("1,000"));

        type_str(&mut dialog, "0", "1,000");
        assert_eq!(dialog.confirm_price.value(), "1,000");
        assert!(dialog.can_proceed("1,000"));
    }

    #[test]
    fn test_enter_on_disabled_proceed_is_noop() {
        let mut dialog = ConfirmPriceDialog::new();
        dialog.show("5");
        type_str(&mut dialog, "4", "5");
        dialog.focus = ConfirmPriceFocus::Proceed;
        assert_eq!(dialog.handle_key(KeyCode::Enter, "5"), None);
    }

    #[test]
    fn test_enter_on_enabled_proceed() {
        let mut dialog = ConfirmPriceDialog::new();
        dialog.show("5");
        type_str(&mut dialog, "5", "5");
        // Enter from the field moves to Proceed, second Enter confirms
        assert_eq!(dialog.handle_key(KeyCode::Enter, "5"), None);
        assert_eq!(
            dialog.handle_key(KeyCode::Enter, "5"),
            Some(ConfirmPriceResult::Proceed)
        );
    }

    #[test]
    fn test_escape_and_cancel_button() {
        let mut dialog = ConfirmPriceDialog::new();
        dialog.show("5");
        assert_eq!(
            dialog.handle_key(KeyCode::Esc, "5"),
            Some(ConfirmPriceResult::Cancelled)
        );
        dialog.focus = ConfirmPriceFocus::Cancel;
        assert_eq!(
            dialog.handle_key(KeyCode::Enter, "5"),
            Some(ConfirmPriceResult::Cancelled)
        );
    }

    #[test]
    fn test_hide_clears_confirm_price() {
        let mut dialog = ConfirmPriceDialog::new();
        dialog.show("5");
        type_str(&mut dialog, "5", "5");
        dialog.hide();
        assert!(!dialog.visible);
        assert_eq!(dialog.confirm_price.value(), "");
    }

    #[test]
    fn test_focus_cycles() {
        assert_eq!(ConfirmPriceFocus::Field.next(), ConfirmPriceFocus::Cancel);
        assert_eq!(ConfirmPriceFocus::Proceed.next(), ConfirmPriceFocus::Field);
        assert_eq!(ConfirmPriceFocus::Field.prev(), ConfirmPriceFocus::Proceed);
    }
}
