//! Input fields for the sell form

use crossterm::event::KeyCode;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::mana::{is_amount, normalize_input};

/// Maximum length of a `YYYY-MM-DD` value
const DATE_LEN: usize = 10;

/// A single-line input used by the sell dialogs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormField {
    /// MANA amount, re-normalised after every edit
    Price { value: String, placeholder: String },
    /// Date input (YYYY-MM-DD format)
    DateInput { value: String, cursor_pos: usize },
}

impl FormField {
    pub fn price(value: impl Into<String>, placeholder: impl Into<String>) -> Self {
        FormField::Price {
            value: value.into(),
            placeholder: placeholder.into(),
        }
    }

    pub fn date(value: impl Into<String>) -> Self {
        let value = value.into();
        FormField::DateInput {
            cursor_pos: value.len(),
            value,
        }
    }

    /// Get the current value as a string
    pub fn value(&self) -> &str {
        match self {
            FormField::Price { value, .. } | FormField::DateInput { value, .. } => value,
        }
    }

    /// Set the value from a string
    pub fn set_value(&mut self, new_value: &str) {
        match self {
            FormField::Price { value, .. } => {
                *value = normalize_input(new_value);
            }
            FormField::DateInput { value, cursor_pos } => {
                *value = new_value.to_string();
                *cursor_pos = value.len();
            }
        }
    }

    pub fn clear(&mut self) {
        match self {
            FormField::Price { value, .. } => value.clear(),
            FormField::DateInput { value, cursor_pos } => {
                value.clear();
                *cursor_pos = 0;
            }
        }
    }

    /// Handle a key event, returns true if the key was consumed
    pub fn handle_key(&mut self, key: KeyCode) -> bool {
        match self {
            FormField::Price { value, .. } => match key {
                KeyCode::Char(c) if c.is_ascii_digit() || c == ',' => {
                    let candidate = format!("{value}{c}");
                    // Keep the current amount when the digit would overflow
                    if is_amount(&candidate) {
                        *value = normalize_input(&candidate);
                    }
                    true
                }
                KeyCode::Char('.') => {
                    if !value.contains('.') {
                        value.push('.');
                        *value = normalize_input(value);
                    }
                    true
                }
                KeyCode::Backspace => {
                    value.pop();
                    *value = normalize_input(value);
                    true
                }
                _ => false,
            },
            FormField::DateInput { value, cursor_pos } => match key {
                KeyCode::Char(c) if c.is_ascii_digit() || c == '-' => {
                    if value.len() < DATE_LEN {
                        value.insert(*cursor_pos, c);
                        *cursor_pos += 1;
                    }
                    true
                }
                KeyCode::Backspace => {
                    if *cursor_pos > 0 {
                        *cursor_pos -= 1;
                        value.remove(*cursor_pos);
                    }
                    true
                }
                KeyCode::Delete => {
                    if *cursor_pos < value.len() {
                        value.remove(*cursor_pos);
                    }
                    true
                }
                KeyCode::Left => {
                    if *cursor_pos > 0 {
                        *cursor_pos -= 1;
                    }
                    true
                }
                KeyCode::Right => {
                    if *cursor_pos < value.len() {
                        *cursor_pos += 1;
                    }
                    true
                }
                KeyCode::Home => {
                    *cursor_pos = 0;
                    true
                }
                KeyCode::End => {
                    *cursor_pos = value.len();
                    true
                }
                _ => false,
            },
        }
    }

    /// Rows needed by [`FormField::render`], including the message line
    pub fn render_height(&self) -> u16 {
        4
    }

    /// Render the field in a labelled box with an optional error line below
    pub fn render(
        &self,
        frame: &mut Frame,
        area: Rect,
        label: &str,
        focused: bool,
        error: Option<&str>,
    ) {
        let border_color = if error.is_some() {
            Color::Red
        } else if focused {
            Color::Cyan
        } else {
            Color::Gray
        };

        let box_area = Rect {
            height: area.height.min(3),
            ..area
        };
        let block = Block::default()
            .title(format!(" {label} "))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color));

        let (text, cursor_pos, placeholder) = match self {
            FormField::Price { value, placeholder } => (value.clone(), value.len(), placeholder.as_str()),
            FormField::DateInput { value, cursor_pos } => (value.clone(), *cursor_pos, "YYYY-MM-DD"),
        };

        let content = if text.is_empty() && !focused {
            Line::from(Span::styled(placeholder, Style::default().fg(Color::DarkGray)))
        } else {
            let mut shown = text;
            if focused {
                if cursor_pos < shown.len() {
                    shown.insert(cursor_pos, '|');
                } else {
                    shown.push('|');
                }
            }
            Line::from(shown)
        };

        let para = Paragraph::new(content)
            .block(block)
            .style(Style::default().fg(if focused { Color::White } else { Color::Gray }));
        frame.render_widget(para, box_area);

        if let Some(message) = error {
            if area.height > 3 {
                let message_area = Rect {
                    y: area.y + 3,
                    height: 1,
                    ..area
                };
                frame.render_widget(
                    Paragraph::new(Span::styled(message, Style::default().fg(Color::Red))),
                    message_area,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_str(field: &mut FormField, s: &str) {
        for c in s.chars() {
            field.handle_key(KeyCode::Char(c));
        }
    }

    #[test]
    fn test_price_formats_while_typing() {
        let mut field = FormField::price("", "⏣ 1,000");
        type_str(&mut field, "12345");
        assert_eq!(field.value(), "12,345");
        type_str(&mut field, ".5");
        assert_eq!(field.value(), "12,345.5");
    }

    #[test]
    fn test_price_keeps_value_when_digit_would_overflow() {
        let mut field = FormField::price("", "");
        type_str(&mut field, &"9".repeat(20));
        let largest = "99,999,999,999,999,999,999";
        assert_eq!(field.value(), largest);

        type_str(&mut field, "99");
        assert_eq!(field.value(), largest);
        assert!(!crate::mana::from_mana(field.value()).is_zero());

        field.handle_key(KeyCode::Backspace);
        assert_eq!(field.value(), "9,999,999,999,999,999,999");
    }

    #[test]
    fn test_price_ignores_letters_and_second_dot() {
        let mut field = FormField::price("", "");
        assert!(!field.handle_key(KeyCode::Char('a')));
        type_str(&mut field, "1.2.3");
        assert_eq!(field.value(), "1.23");
    }

    #[test]
    fn test_price_zero_clears() {
        let mut field = FormField::price("", "");
        type_str(&mut field, "0");
        assert_eq!(field.value(), "");
    }

    #[test]
    fn test_price_backspace_renormalises() {
        let mut field = FormField::price("1,000", "");
        field.handle_key(KeyCode::Backspace);
        assert_eq!(field.value(), "100");
        field.handle_key(KeyCode::Backspace);
        field.handle_key(KeyCode::Backspace);
        field.handle_key(KeyCode::Backspace);
        assert_eq!(field.value(), "");
    }

    #[test]
    fn test_date_input_editing() {
        let mut field = FormField::date("2030-01-01");
        field.handle_key(KeyCode::Backspace);
        field.handle_key(KeyCode::Char('9'));
        assert_eq!(field.value(), "2030-01-09");
        // Full length reached
        field.handle_key(KeyCode::Char('1'));
        assert_eq!(field.value(), "2030-01-09");
        assert!(!field.handle_key(KeyCode::Char('x')));
    }

    #[test]
    fn test_date_input_cursor_movement() {
        let mut field = FormField::date("2030-01-01");
        field.handle_key(KeyCode::Home);
        field.handle_key(KeyCode::Delete);
        field.handle_key(KeyCode::Char('3'));
        assert_eq!(field.value(), "3030-01-01");
    }

    #[test]
    fn test_clear_and_set_value() {
        let mut field = FormField::price("5", "");
        field.set_value("2500");
        assert_eq!(field.value(), "2,500");
        field.clear();
        assert_eq!(field.value(), "");
    }
}
