//! Bounded output viewport.
//!
//! The [`Printer`] writes command output into the rows below the prompt. It
//! never scrolls: once the viewport is full, further lines are dropped until
//! the next reset.

use std::io::{self, Write};
use std::iter;

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};
use unicode_width::UnicodeWidthChar;

/// Columns between tab stops when expanding tabs
const TAB_WIDTH: usize = 8;

/// Line counter for the output region of a fixed size terminal.
#[derive(Clone, Debug, PartialEq)]
pub struct Printer {
    cols: u16,
    rows: u16,
    printed: u16,
}

impl Printer {
    /// Creates a printer for a terminal of `cols` by `rows`.
    ///
    /// The first row belongs to the prompt, so `rows - 1` lines fit.
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols,
            rows: rows.saturating_sub(1),
            printed: 0,
        }
    }

    /// Number of lines that fit below the prompt
    pub fn capacity(&self) -> u16 {
        self.rows
    }

    /// Number of lines printed since the last reset
    pub fn printed(&self) -> u16 {
        self.printed
    }

    pub fn is_full(&self) -> bool {
        self.printed >= self.rows
    }

    /// Writes `line` into the next free row, cut to the terminal width.
    ///
    /// Does nothing once the viewport is full.
    pub fn print<W: Write>(&mut self, out: &mut W, line: &str) -> io::Result<()> {
        if self.is_full() {
            return Ok(());
        }

        self.printed += 1;
        queue!(
            out,
            MoveTo(0, self.printed),
            Clear(ClearType::CurrentLine),
            Print(fit_to_width(line, self.cols))
        )
    }

    /// Clears everything below the prompt and starts over at the first row.
    pub fn reset<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        self.printed = 0;
        queue!(out, MoveTo(0, 1), Clear(ClearType::FromCursorDown))
    }
}

/// Cuts `line` to at most `cols` display columns.
///
/// Tabs are expanded to the next tab stop and other control characters are
/// removed, since either would move the cursor on their own.
pub fn fit_to_width(line: &str, cols: u16) -> String {
    let max_width = usize::from(cols);
    let mut fitted = String::with_capacity(line.len().min(max_width));
    let mut width = 0;

    for c in line.chars() {
        if c == '\t' {
            if width >= max_width {
                break;
            }
            let spaces = (TAB_WIDTH - width % TAB_WIDTH).min(max_width - width);
            fitted.extend(iter::repeat(' ').take(spaces));
            width += spaces;
            continue;
        }

        if c.is_control() {
            continue;
        }

        let char_width = c.width().unwrap_or(0);
        if width + char_width > max_width {
            break;
        }
        fitted.push(c);
        width += char_width;
    }

    fitted
}

/// Keeps the end of `text` that fits in `cols` display columns.
///
/// Returns the kept text and its width. Control characters are removed.
pub fn fit_tail_to_width(text: &str, cols: u16) -> (String, u16) {
    let max_width = usize::from(cols);
    let mut kept = Vec::new();
    let mut width = 0;

    for c in text.chars().rev() {
        if c.is_control() {
            continue;
        }
        let char_width = c.width().unwrap_or(0);
        if width + char_width > max_width {
            break;
        }
        kept.push(c);
        width += char_width;
    }

    let fitted: String = kept.into_iter().rev().collect();
    (fitted, u16::try_from(width).unwrap_or(cols))
}
