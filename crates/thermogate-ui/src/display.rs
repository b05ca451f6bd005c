//! Virtual character LCD.
//!
//! Mirrors the 20-column, 4-row I2C character display on the appliance. The
//! display holds a fixed-size text buffer; every row is exactly `columns`
//! characters wide, padded with spaces. Only printable ASCII reaches the
//! buffer: control characters are dropped and anything else is replaced by
//! `?`, since the panel's character ROM has nothing else.
//!
//! # Examples
//!
//! ```
//! use thermogate_ui::{Alignment, VirtualDisplay};
//!
//! let mut display = VirtualDisplay::default();
//! display.set_line_aligned(0, "THERMOGATE", Alignment::Center).unwrap();
//! display.set_line(3, "D:LOCKED READY").unwrap();
//!
//! assert_eq!(display.line(0).unwrap(), "     THERMOGATE     ");
//! assert_eq!(display.line(3).unwrap().trim_end(), "D:LOCKED READY");
//! ```

use thermogate_core::constants::{LCD_COLS, LCD_ROWS};

use crate::error::{Result, UiError};
use crate::screen::Screen;

/// Text alignment within a display row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    /// Extra space goes on the right when the padding is odd.
    Center,
    Right,
}

/// Virtual character display.
#[derive(Debug, Clone)]
pub struct VirtualDisplay {
    lines: usize,
    columns: usize,
    buffer: Vec<String>,
}

impl VirtualDisplay {
    /// Create a blank display. Zero dimensions are raised to one.
    pub fn new(lines: usize, columns: usize) -> Self {
        let lines = lines.max(1);
        let columns = columns.max(1);
        Self {
            lines,
            columns,
            buffer: vec![" ".repeat(columns); lines],
        }
    }

    pub fn lines(&self) -> usize {
        self.lines
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Write left-aligned text to a row.
    ///
    /// # Errors
    /// Returns `UiError::InvalidLine` if `line` is out of range.
    pub fn set_line(&mut self, line: usize, text: &str) -> Result<()> {
        self.set_line_aligned(line, text, Alignment::Left)
    }

    /// Write text to a row with the given alignment.
    ///
    /// # Errors
    /// Returns `UiError::InvalidLine` if `line` is out of range.
    pub fn set_line_aligned(&mut self, line: usize, text: &str, align: Alignment) -> Result<()> {
        let columns = self.columns;
        let slot = self.buffer.get_mut(line).ok_or(UiError::InvalidLine {
            line,
            max: self.lines - 1,
        })?;
        *slot = align_text(&sanitize_text(text), columns, align);
        Ok(())
    }

    /// Draw a whole screen, left-aligned. Rows beyond the display height
    /// are dropped; missing rows are blanked.
    pub fn show(&mut self, screen: &Screen) {
        let columns = self.columns;
        for (index, slot) in self.buffer.iter_mut().enumerate() {
            let text = screen.row(index).unwrap_or("");
            *slot = align_text(&sanitize_text(text), columns, Alignment::Left);
        }
    }

    pub fn clear(&mut self) {
        let blank = " ".repeat(self.columns);
        self.buffer.iter_mut().for_each(|row| row.clone_from(&blank));
    }

    /// Row contents, always exactly `columns` characters.
    ///
    /// # Errors
    /// Returns `UiError::InvalidLine` if `line` is out of range.
    pub fn line(&self, line: usize) -> Result<&str> {
        self.buffer
            .get(line)
            .map(String::as_str)
            .ok_or(UiError::InvalidLine {
                line,
                max: self.lines - 1,
            })
    }

    pub fn all_lines(&self) -> Vec<&str> {
        self.buffer.iter().map(String::as_str).collect()
    }

    /// The display framed with a border, for terminal output.
    pub fn render_frame(&self) -> String {
        let border = format!("+{}+", "-".repeat(self.columns));
        let mut out = String::with_capacity((self.columns + 3) * (self.lines + 2));
        out.push_str(&border);
        out.push('\n');
        for row in &self.buffer {
            out.push('|');
            out.push_str(row);
            out.push_str("|\n");
        }
        out.push_str(&border);
        out
    }
}

impl Default for VirtualDisplay {
    /// The appliance's 20x4 panel.
    fn default() -> Self {
        Self::new(LCD_ROWS, LCD_COLS)
    }
}

/// Truncate text to at most `max_chars` characters.
///
/// ```
/// use thermogate_ui::truncate_text;
///
/// assert_eq!(truncate_text("ACCESS GRANTED", 6), "ACCESS");
/// assert_eq!(truncate_text("OK", 6), "OK");
/// ```
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Align text within a fixed width, padding with spaces. Longer text is
/// truncated.
///
/// ```
/// use thermogate_ui::{align_text, Alignment};
///
/// assert_eq!(align_text("PIN", 7, Alignment::Left), "PIN    ");
/// assert_eq!(align_text("PIN", 7, Alignment::Center), "  PIN  ");
/// assert_eq!(align_text("PIN", 7, Alignment::Right), "    PIN");
/// ```
pub fn align_text(text: &str, width: usize, alignment: Alignment) -> String {
    let char_count = text.chars().count();
    if char_count >= width {
        return truncate_text(text, width);
    }

    let padding = width - char_count;
    match alignment {
        Alignment::Left => format!("{text}{}", " ".repeat(padding)),
        Alignment::Right => format!("{}{text}", " ".repeat(padding)),
        Alignment::Center => {
            let left_pad = padding / 2;
            let right_pad = padding - left_pad;
            format!("{}{text}{}", " ".repeat(left_pad), " ".repeat(right_pad))
        }
    }
}

fn sanitize_text(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control())
        .map(|c| if c.is_ascii() { c } else { '?' })
        .collect()
}
