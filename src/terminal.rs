//! Presents pixel buffers in a terminal using upper-half block cells.
//!
//! Every character cell shows two vertically stacked pixels: the glyph
//! foreground paints the top pixel, the cell background the bottom one.

use std::io::{self, Stdout, Write};

use crossterm::style::{self, Print, SetBackgroundColor, SetForegroundColor};
use crossterm::{cursor, event, execute, queue, terminal};
use log::info;

use crate::graphics::{Color, PixelBuffer};

const UPPER_HALF_BLOCK: char = '\u{2580}';

/// Pixel surface size for a terminal of `cols` x `rows` cells
pub fn pixel_size(cols: u16, rows: u16) -> (u32, u32) {
    (cols as u32, rows as u32 * 2)
}

/// Colors of the cell at `(col, row)`: top pixel, bottom pixel
pub fn cell_colors(frame: &PixelBuffer, col: usize, row: usize) -> (Color, Color) {
    let top = frame.pixel(col, row * 2).unwrap_or(Color::BLACK);
    let bottom = frame.pixel(col, row * 2 + 1).unwrap_or(Color::BLACK);
    (top, bottom)
}

fn to_terminal(color: Color) -> style::Color {
    style::Color::Rgb {
        r: color.r,
        g: color.g,
        b: color.b,
    }
}

/// Raw-mode alternate screen, restored on drop
pub struct TerminalSession {
    stdout: Stdout,
}

impl TerminalSession {
    pub fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(
            stdout,
            terminal::EnterAlternateScreen,
            event::EnableMouseCapture,
            event::EnableFocusChange,
            cursor::Hide
        )?;
        info!("terminal session started");
        Ok(TerminalSession { stdout })
    }

    /// Draws the whole frame, two pixel rows per terminal row
    pub fn present(&mut self, frame: &PixelBuffer) -> io::Result<()> {
        let rows = frame.height() / 2;
        let mut current: Option<(Color, Color)> = None;

        for row in 0..rows {
            queue!(self.stdout, cursor::MoveTo(0, row as u16))?;
            for col in 0..frame.width() {
                let colors = cell_colors(frame, col, row);
                if current != Some(colors) {
                    queue!(
                        self.stdout,
                        SetForegroundColor(to_terminal(colors.0)),
                        SetBackgroundColor(to_terminal(colors.1))
                    )?;
                    current = Some(colors);
                }
                queue!(self.stdout, Print(UPPER_HALF_BLOCK))?;
            }
        }
        queue!(self.stdout, style::ResetColor)?;
        self.stdout.flush()
    }

    /// Audible stand-in for a haptic pulse
    pub fn bell(&mut self) -> io::Result<()> {
        self.stdout.write_all(b"\x07")?;
        self.stdout.flush()
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = execute!(
            self.stdout,
            style::ResetColor,
            cursor::Show,
            event::DisableFocusChange,
            event::DisableMouseCapture,
            terminal::LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
        info!("terminal session restored");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_cover_two_pixel_rows() {
        assert_eq!(pixel_size(80, 24), (80, 48));
    }

    #[test]
    fn cell_takes_top_and_bottom_pixels() {
        let mut frame = PixelBuffer::new(2, 4);
        frame.fill(Color::WHITE);
        let mut path = crate::path::Path::new();
        path.add_rect(crate::path::Rect::new(0.0, 2.0, 1.0, 3.0));
        frame.fill_path(&path, 0.0, 0.0, Color::BLACK);

        assert_eq!(cell_colors(&frame, 0, 1), (Color::BLACK, Color::WHITE));
        assert_eq!(cell_colors(&frame, 1, 1), (Color::WHITE, Color::WHITE));
        assert_eq!(cell_colors(&frame, 0, 5), (Color::BLACK, Color::BLACK));
    }
}
