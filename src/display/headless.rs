//! Headless status display that reports panel contents as tracing events.

use super::{LcdBuffer, Rgb, StatusDisplay};
use crate::Result;

pub struct LogDisplay {
    lcd: LcdBuffer,
}

impl LogDisplay {
    pub fn new(columns: usize, rows: usize) -> Self {
        Self {
            lcd: LcdBuffer::new(columns, rows),
        }
    }

    pub fn buffer(&self) -> &LcdBuffer {
        &self.lcd
    }
}

impl StatusDisplay for LogDisplay {
    fn clear(&mut self) -> Result<()> {
        self.lcd.clear();
        Ok(())
    }

    fn set_message(&mut self, message: &str) -> Result<()> {
        self.lcd.set_message(message);
        let rows = self.lcd.visible_rows();
        tracing::info!(target: "display", color = %self.lcd.color(), "[{}]", rows.join("|"));
        Ok(())
    }

    fn set_color(&mut self, color: Rgb) -> Result<()> {
        self.lcd.set_color(color);
        tracing::debug!(target: "display", %color, "backlight");
        Ok(())
    }

    fn scroll_left(&mut self) -> Result<()> {
        self.lcd.scroll_left();
        let rows = self.lcd.visible_rows();
        tracing::trace!(target: "display", "[{}]", rows.join("|"));
        Ok(())
    }
}
