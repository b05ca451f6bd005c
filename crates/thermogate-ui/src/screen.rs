//! Screen contents and effects produced by the menu state machine.

use serde::{Deserialize, Serialize};
use thermogate_core::constants::LCD_ROWS;

/// Four rows of text for the 20x4 display.
///
/// Rows are stored as given; the display truncates and pads them when
/// drawing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screen {
    rows: [String; LCD_ROWS],
}

impl Screen {
    pub fn new(
        row0: impl Into<String>,
        row1: impl Into<String>,
        row2: impl Into<String>,
        row3: impl Into<String>,
    ) -> Self {
        Self {
            rows: [row0.into(), row1.into(), row2.into(), row3.into()],
        }
    }

    pub fn rows(&self) -> &[String; LCD_ROWS] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&str> {
        self.rows.get(index).map(String::as_str)
    }

    /// Whether any row contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.rows.iter().any(|row| row.contains(needle))
    }
}

/// Side effect requested by a UI transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEffect {
    /// Draw this screen.
    Render(Screen),

    /// Hand the display back to the telemetry screen.
    ShowMonitoring,

    /// The door was unlocked. The request has already been raised on the
    /// access controller; this is reported for observers.
    Unlock,
}

impl UiEffect {
    pub fn screen(&self) -> Option<&Screen> {
        match self {
            Self::Render(screen) => Some(screen),
            Self::ShowMonitoring | Self::Unlock => None,
        }
    }
}

/// Mask typed digits for display, one `*` per digit.
pub(crate) fn masked(buffer: &str) -> String {
    "*".repeat(buffer.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_rows() {
        let screen = Screen::new("ADMIN MENU", "1:UNLOCK", "", "*:EXIT");
        assert_eq!(screen.row(0), Some("ADMIN MENU"));
        assert_eq!(screen.row(4), None);
        assert!(screen.contains("UNLOCK"));
        assert!(!screen.contains("DELETE"));
    }

    #[test]
    fn test_masked() {
        assert_eq!(masked("1234"), "****");
        assert_eq!(masked(""), "");
    }
}
