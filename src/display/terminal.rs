//! Character panel drawn in the terminal with crossterm.
//!
//! Each update prints one line: the visible rows side by side on the
//! backlight colour. Scrolling redraws the previous line in place.

use std::io::{self, Stdout, Write};

use crossterm::{
    cursor, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};

use super::{LcdBuffer, Rgb, StatusDisplay};
use crate::{Error, Result};

pub struct TerminalDisplay<W: Write = Stdout> {
    lcd: LcdBuffer,
    out: W,
    /// The last thing written was our own line, so it can be redrawn.
    drawn: bool,
}

impl TerminalDisplay<Stdout> {
    pub fn stdout(columns: usize, rows: usize) -> Self {
        Self::new(io::stdout(), columns, rows)
    }
}

impl<W: Write> TerminalDisplay<W> {
    pub fn new(out: W, columns: usize, rows: usize) -> Self {
        Self {
            lcd: LcdBuffer::new(columns, rows),
            out,
            drawn: false,
        }
    }

    pub fn buffer(&self) -> &LcdBuffer {
        &self.lcd
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn render(&mut self, in_place: bool) -> Result<()> {
        self.draw(in_place)
            .map_err(|e| Error::Display(format!("terminal write failed: {e}")))
    }

    fn draw(&mut self, in_place: bool) -> io::Result<()> {
        if in_place && self.drawn {
            queue!(
                self.out,
                cursor::MoveToPreviousLine(1),
                Clear(ClearType::CurrentLine)
            )?;
        }
        let background = self.lcd.color();
        let body = self.lcd.visible_rows().join(" | ");
        queue!(
            self.out,
            SetBackgroundColor(to_color(background)),
            SetForegroundColor(text_color(background)),
            Print(format!(" {body} ")),
            ResetColor,
            Print("\n"),
        )?;
        self.out.flush()?;
        self.drawn = true;
        Ok(())
    }
}

fn to_color(c: Rgb) -> Color {
    Color::Rgb {
        r: c.r,
        g: c.g,
        b: c.b,
    }
}

/// Dark text on bright backlights, light text otherwise.
fn text_color(background: Rgb) -> Color {
    let luma =
        0.299 * background.r as f32 + 0.587 * background.g as f32 + 0.114 * background.b as f32;
    if luma > 140.0 {
        Color::Black
    } else {
        Color::White
    }
}

impl<W: Write> StatusDisplay for TerminalDisplay<W> {
    fn clear(&mut self) -> Result<()> {
        self.lcd.clear();
        Ok(())
    }

    fn set_message(&mut self, message: &str) -> Result<()> {
        self.lcd.set_message(message);
        self.render(false)
    }

    fn set_color(&mut self, color: Rgb) -> Result<()> {
        self.lcd.set_color(color);
        Ok(())
    }

    fn scroll_left(&mut self) -> Result<()> {
        self.lcd.scroll_left();
        self.render(true)
    }
}
