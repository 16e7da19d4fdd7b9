//! The prompt row plus the output viewport, drawn through one writer.

use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};

use crate::printer::{fit_tail_to_width, Printer};

/// Text shown in front of the input
pub const PROMPT: &str = "> ";

pub struct Screen<W: Write> {
    out: W,
    cols: u16,
    printer: Printer,
    prompt_end: u16,
}

impl<W: Write> Screen<W> {
    /// Creates a screen for a terminal of `cols` by `rows`, writing to `out`.
    pub fn new(out: W, cols: u16, rows: u16) -> Self {
        Self {
            out,
            cols,
            printer: Printer::new(cols, rows),
            prompt_end: 0,
        }
    }

    /// Redraws the prompt row with `input`.
    ///
    /// Input wider than the terminal is shown by its end, where the typing
    /// happens.
    pub fn draw_prompt(&mut self, input: &[u8]) -> io::Result<()> {
        let prompt_width = u16::try_from(PROMPT.len()).unwrap_or(u16::MAX);
        let available = self.cols.saturating_sub(prompt_width).saturating_sub(1);
        let text = String::from_utf8_lossy(input);
        let (visible, visible_width) = fit_tail_to_width(&text, available);

        self.prompt_end = prompt_width.saturating_add(visible_width);
        queue!(
            self.out,
            MoveTo(0, 0),
            Clear(ClearType::CurrentLine),
            Print(PROMPT),
            Print(visible)
        )
    }

    pub fn print_line(&mut self, line: &str) -> io::Result<()> {
        self.printer.print(&mut self.out, line)
    }

    pub fn reset_output(&mut self) -> io::Result<()> {
        self.printer.reset(&mut self.out)
    }

    /// Puts the cursor right behind the input.
    pub fn cursor_after_prompt(&mut self) -> io::Result<()> {
        queue!(self.out, MoveTo(self.prompt_end, 0))
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn printer(&self) -> &Printer {
        &self.printer
    }

    pub fn writer(&self) -> &W {
        &self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn written(screen: &Screen<Vec<u8>>) -> String {
        String::from_utf8_lossy(screen.writer()).into_owned()
    }

    #[test]
    fn test_draw_prompt() {
        let mut screen = Screen::new(Vec::new(), 80, 24);
        screen.draw_prompt(b"needle").unwrap();

        assert!(written(&screen).contains("> needle"));
        assert_eq!(screen.prompt_end, 8);
    }

    #[test]
    fn test_long_input_shows_its_end() {
        let mut screen = Screen::new(Vec::new(), 10, 24);
        screen.draw_prompt(b"0123456789abcdef").unwrap();

        // two columns of prompt, one left free for the cursor
        assert!(written(&screen).ends_with("> 9abcdef"));
        assert_eq!(screen.prompt_end, 9);
    }

    #[test]
    fn test_cursor_after_prompt_counts_columns() {
        let mut screen = Screen::new(Vec::new(), 80, 24);
        screen.draw_prompt("日本".as_bytes()).unwrap();
        assert_eq!(screen.prompt_end, 6);

        screen.cursor_after_prompt().unwrap();
        // crossterm positions are one-based on the wire
        assert!(written(&screen).ends_with("\x1b[1;7H"));
    }

    #[test]
    fn test_output_goes_below_prompt() {
        let mut screen = Screen::new(Vec::new(), 80, 3);
        screen.print_line("first").unwrap();
        screen.print_line("second").unwrap();
        screen.print_line("third").unwrap();

        assert_eq!(screen.printer().printed(), 2);
        let written = written(&screen);
        assert!(written.contains("\x1b[2;1H"));
        assert!(written.contains("second"));
        assert!(!written.contains("third"));
    }
}
