/// Single-line progress bar drawn in place on a terminal
use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
    QueueableCommand,
};
use std::io::Write;

const FILLED: char = '#';
const EMPTY: char = '.';

/// Redraws `label [####....]  42%` over the current line
pub struct ProgressLine {
    width: usize,
    last: Option<u8>,
}

impl ProgressLine {
    /// `width` is the number of cells inside the brackets
    pub fn new(width: usize) -> Self {
        Self { width, last: None }
    }

    /// Size the bar to a terminal `columns` wide, leaving room for the label
    pub fn for_columns(columns: u16, label_len: usize) -> Self {
        let reserved = label_len + 8;
        let width = (columns as usize).saturating_sub(reserved).clamp(10, 60);
        Self::new(width)
    }

    pub fn filled_cells(&self, percent: u8) -> usize {
        self.width * percent.min(100) as usize / 100
    }

    pub fn bar(&self, percent: u8) -> String {
        let filled = self.filled_cells(percent);
        let mut bar = String::with_capacity(self.width);
        bar.extend(std::iter::repeat(FILLED).take(filled));
        bar.extend(std::iter::repeat(EMPTY).take(self.width - filled));
        bar
    }

    /// Repaint the line; repeated percentages are skipped.
    pub fn draw<W: Write>(&mut self, writer: &mut W, label: &str, percent: u8) -> std::io::Result<()> {
        if self.last == Some(percent) {
            return Ok(());
        }
        self.last = Some(percent);

        let color = if percent >= 100 { Color::Green } else { Color::Cyan };
        writer.queue(cursor::MoveToColumn(0))?;
        writer.queue(Clear(ClearType::CurrentLine))?;
        writer.queue(Print(format!("{} [", label)))?;
        writer.queue(SetForegroundColor(color))?;
        writer.queue(Print(self.bar(percent)))?;
        writer.queue(ResetColor)?;
        writer.queue(Print(format!("] {:>3}%", percent.min(100))))?;
        writer.flush()
    }

    /// Erase the line if anything was drawn.
    pub fn finish<W: Write>(&mut self, writer: &mut W) -> std::io::Result<()> {
        if self.last.take().is_some() {
            writer.queue(cursor::MoveToColumn(0))?;
            writer.queue(Clear(ClearType::CurrentLine))?;
            writer.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filled_cells() {
        let line = ProgressLine::new(20);
        assert_eq!(line.filled_cells(0), 0);
        assert_eq!(line.filled_cells(42), 8);
        assert_eq!(line.filled_cells(100), 20);
        assert_eq!(line.filled_cells(250), 20);
    }

    #[test]
    fn test_bar() {
        let line = ProgressLine::new(10);
        assert_eq!(line.bar(0), "..........");
        assert_eq!(line.bar(50), "#####.....");
        assert_eq!(line.bar(100), "##########");
    }

    #[test]
    fn test_for_columns() {
        assert_eq!(ProgressLine::for_columns(80, 20).width, 52);
        assert_eq!(ProgressLine::for_columns(20, 20).width, 10);
        assert_eq!(ProgressLine::for_columns(400, 0).width, 60);
    }

    #[test]
    fn test_draw_skips_repeats() {
        let mut line = ProgressLine::new(10);
        let mut out = Vec::new();

        line.draw(&mut out, "decoding", 30).unwrap();
        let first = String::from_utf8(out.clone()).unwrap();
        assert!(first.contains("decoding ["));
        assert!(first.contains("###......."));
        assert!(first.ends_with("]  30%"));

        line.draw(&mut out, "decoding", 30).unwrap();
        assert_eq!(out.len(), first.len());

        line.finish(&mut out).unwrap();
        assert!(out.len() > first.len());
        let len = out.len();
        line.finish(&mut out).unwrap();
        assert_eq!(out.len(), len);
    }
}
