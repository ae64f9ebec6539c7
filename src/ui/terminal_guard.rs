//! Terminal session that restores the screen on drop.

use anyhow::Result;
use crossterm::{
    cursor::Show,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout, Write};

pub type TuiTerminal = Terminal<CrosstermBackend<Stdout>>;

/// Owns the ratatui terminal while the dialog is on screen.
///
/// Raw mode and the alternate screen are undone on every exit path: `?`
/// returns, normal scope exit, and panics (through [`install_panic_hook`]).
pub struct TerminalGuard {
    terminal: Option<TuiTerminal>,
}

impl TerminalGuard {
    /// Enter raw mode and the alternate screen
    pub fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self {
            terminal: Some(terminal),
        })
    }

    pub fn terminal(&mut self) -> Option<&mut TuiTerminal> {
        self.terminal.as_mut()
    }

    pub fn is_active(&self) -> bool {
        self.terminal.is_some()
    }

    /// Leave the alternate screen now instead of on drop
    pub fn restore(&mut self) {
        if self.terminal.take().is_some() {
            Self::cleanup();
        }
    }

    /// Best-effort terminal reset, safe to call more than once
    pub fn cleanup() {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
        let _ = io::stdout().flush();
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        self.restore();
    }
}

/// Install panic hook that restores terminal before printing panic.
pub fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        TerminalGuard::cleanup();
        original_hook(panic_info);
    }));
}
