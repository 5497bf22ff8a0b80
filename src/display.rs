//! Status display.
//!
//! The demo reports progress on a small RGB-backlit character display.
//! [`LcdBuffer`] models what such a panel shows (rows × columns, a
//! horizontal shift, a backlight colour); [`TerminalDisplay`] and
//! [`LogDisplay`] render that model. Talking to real display hardware is
//! left to other [`StatusDisplay`] implementations.

mod headless;
mod terminal;

pub use headless::LogDisplay;
pub use terminal::TerminalDisplay;

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Result;

/// Backlight colour, serialised as `[r, g, b]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn is_off(&self) -> bool {
        self.r == 0 && self.g == 0 && self.b == 0
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

impl From<Rgb> for [u8; 3] {
    fn from(c: Rgb) -> Self {
        [c.r, c.g, c.b]
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// A character display that shows short progress messages.
///
/// A `'\n'` in a message starts the next row.
pub trait StatusDisplay {
    fn clear(&mut self) -> Result<()>;
    fn set_message(&mut self, message: &str) -> Result<()>;
    fn set_color(&mut self, color: Rgb) -> Result<()>;
    /// Shift the visible window one column to the left.
    fn scroll_left(&mut self) -> Result<()>;
}

/// Contents of a character panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LcdBuffer {
    columns: usize,
    rows: usize,
    lines: Vec<String>,
    shift: usize,
    color: Rgb,
}

impl LcdBuffer {
    pub fn new(columns: usize, rows: usize) -> Self {
        Self {
            columns,
            rows,
            lines: vec![String::new(); rows],
            shift: 0,
            color: Rgb::new(0, 0, 0),
        }
    }

    /// Blank every row and reset the shift.
    pub fn clear(&mut self) {
        self.lines.iter_mut().for_each(String::clear);
        self.shift = 0;
    }

    /// Write a message from the top-left corner. Rows beyond the panel are dropped.
    pub fn set_message(&mut self, message: &str) {
        let mut rows = message.split('\n');
        for line in self.lines.iter_mut() {
            *line = rows.next().unwrap_or_default().to_string();
        }
    }

    pub fn set_color(&mut self, color: Rgb) {
        self.color = color;
    }

    pub fn scroll_left(&mut self) {
        self.shift += 1;
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// The characters currently visible, one string per row, each exactly
    /// `columns` wide.
    pub fn visible_rows(&self) -> Vec<String> {
        self.lines
            .iter()
            .map(|line| {
                let mut row: String = line.chars().skip(self.shift).take(self.columns).collect();
                let width = row.chars().count();
                row.extend(std::iter::repeat_n(' ', self.columns - width));
                row
            })
            .collect()
    }
}

/// Show `message`, scroll it left one column per character with `step`
/// between shifts, then show it again statically.
pub fn show_scrolling(
    display: &mut dyn StatusDisplay,
    message: &str,
    step: Duration,
) -> Result<()> {
    display.clear()?;
    display.set_message(message)?;
    for _ in message.chars() {
        pause(step);
        display.scroll_left()?;
    }
    display.clear()?;
    display.set_message(message)
}

/// Sleep unless `duration` is zero.
pub(crate) fn pause(duration: Duration) {
    if !duration.is_zero() {
        std::thread::sleep(duration);
    }
}
