// ── Theme container ──

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeEvent {
    Toggle,
    Set { dark: bool },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThemeState {
    pub dark_mode: bool,
}

/// Colours for one theme mode, as CSS hex strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub primary: &'static str,
    pub secondary: &'static str,
    pub background: &'static str,
    pub paper: &'static str,
}

const LIGHT: Palette = Palette {
    primary: "#1976d2",
    secondary: "#dc004e",
    background: "#f5f5f5",
    paper: "#ffffff",
};

const DARK: Palette = Palette {
    primary: "#90caf9",
    secondary: "#f48fb1",
    background: "#121212",
    paper: "#1e1e1e",
};

impl ThemeState {
    pub fn reduce(&mut self, event: ThemeEvent) {
        match event {
            ThemeEvent::Toggle => self.dark_mode = !self.dark_mode,
            ThemeEvent::Set { dark } => self.dark_mode = dark,
        }
    }

    pub fn palette(self) -> Palette {
        if self.dark_mode { DARK } else { LIGHT }
    }
}
