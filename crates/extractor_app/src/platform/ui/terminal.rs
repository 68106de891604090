use std::io::{self, Stdout, Write};

use crossterm::cursor::MoveTo;
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use crossterm::{execute, queue};

use super::constants::{MAX_CELL_WIDTH, PROGRESS_BAR_WIDTH};
use super::render::{Tone, UiCommand};

/// Draws render output on stdout. Line-oriented: the prompt stays usable for
/// pasted paths and ordinary terminal editing.
pub struct Terminal {
    out: Stdout,
}

impl Terminal {
    pub fn new() -> Self {
        Self { out: io::stdout() }
    }

    pub fn draw(&mut self, cmds: &[UiCommand]) -> io::Result<()> {
        for cmd in cmds {
            match cmd {
                UiCommand::ClearScreen => {
                    queue!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;
                }
                UiCommand::Heading(text) => {
                    queue!(
                        self.out,
                        SetAttribute(Attribute::Bold),
                        Print(text),
                        SetAttribute(Attribute::Reset),
                        Print("\r\n")
                    )?;
                }
                UiCommand::Line { text, tone } => self.print_line(text, *tone)?,
                UiCommand::Checkbox {
                    index,
                    label,
                    checked,
                } => {
                    let mark = if *checked { "[x]" } else { "[ ]" };
                    self.print_line(&format!("{index:>3}. {mark} {label}"), Tone::Plain)?;
                }
                UiCommand::Table { headers, rows } => {
                    for text in format_table(headers, rows) {
                        self.print_line(&text, Tone::Plain)?;
                    }
                }
                UiCommand::ProgressBar { percent, label } => {
                    let bar = progress_bar(*percent, PROGRESS_BAR_WIDTH);
                    self.print_line(&format!("{bar} {percent}%  {label}"), Tone::Plain)?;
                }
                UiCommand::Blank => queue!(self.out, Print("\r\n"))?,
            }
        }
        queue!(self.out, Print("> "))?;
        self.out.flush()
    }

    /// Drops scrollback so a fresh wizard starts at the top.
    pub fn scroll_to_top(&mut self) -> io::Result<()> {
        execute!(self.out, Clear(ClearType::Purge), MoveTo(0, 0))
    }

    fn print_line(&mut self, text: &str, tone: Tone) -> io::Result<()> {
        let color = match tone {
            Tone::Plain => None,
            Tone::Muted => Some(Color::DarkGrey),
            Tone::Success => Some(Color::Green),
            Tone::Error => Some(Color::Red),
        };
        match color {
            Some(color) => queue!(
                self.out,
                SetForegroundColor(color),
                Print(text),
                ResetColor,
                Print("\r\n")
            ),
            None => queue!(self.out, Print(text), Print("\r\n")),
        }
    }
}

/// Lays out a text table with `|` separators; long cells end in `…`.
pub fn format_table(headers: &[String], rows: &[Vec<String>]) -> Vec<String> {
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(col, header)| {
            rows.iter()
                .filter_map(|row| row.get(col))
                .chain(std::iter::once(header))
                .map(|cell| cell_width(cell))
                .max()
                .unwrap_or(0)
                .min(MAX_CELL_WIDTH)
        })
        .collect();

    let format_row = |cells: &[String]| -> String {
        let padded: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(col, width)| {
                let cell = cells.get(col).map(String::as_str).unwrap_or("");
                pad(&truncate(cell, *width), *width)
            })
            .collect();
        format!("| {} |", padded.join(" | "))
    };

    let separator: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    let mut lines = vec![
        format_row(headers),
        format!("|-{}-|", separator.join("-|-")),
    ];
    lines.extend(rows.iter().map(|row| format_row(row.as_slice())));
    lines
}

pub fn progress_bar(percent: u8, width: usize) -> String {
    let filled = width * usize::from(percent.min(100)) / 100;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

/// Multi-line cells show their first line plus the `…` marker.
fn cell_width(cell: &str) -> usize {
    let first_line = cell.lines().next().unwrap_or("");
    first_line.chars().count() + usize::from(cell.contains('\n'))
}

fn truncate(cell: &str, width: usize) -> String {
    let first_line = cell.lines().next().unwrap_or("");
    if first_line.chars().count() <= width && !cell.contains('\n') {
        return first_line.to_string();
    }
    let kept: String = first_line.chars().take(width.saturating_sub(1)).collect();
    format!("{kept}…")
}

fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    format!("{text}{}", " ".repeat(width.saturating_sub(len)))
}
