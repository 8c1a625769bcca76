//! Console rendering of the tray title and the break window.
//!
//! The terminal the timer runs in doubles as its break screen and as a
//! fallback menu. Typed commands (`enable`, `disable`, `settings`, `quit`)
//! act like menu clicks, `set work=<m> break=<m> focus=<s>` submits new
//! settings, and an empty line steps away from the break screen, which
//! counts as the window losing focus.

use std::io::{self, BufRead, Write};
use std::thread;

use crossbeam_channel::Sender;

use super::event::{UiCommand, UiEvent, WindowRegion};

/// ANSI sequence returning to column 0 and clearing the line.
const CLEAR_LINE: &str = "\r\x1b[2K";

/// Terminal bell, used to ask for attention.
const BELL: &str = "\x07";

// ============================================================================
// ConsoleScreen
// ============================================================================

/// Renders [`UiCommand`]s as a single status line on a terminal.
#[derive(Debug)]
pub struct ConsoleScreen<W: Write> {
    out: W,
    title: String,
    reminder: String,
    timer: String,
    visible: bool,
}

impl<W: Write> ConsoleScreen<W> {
    /// Creates a screen writing to `out`.
    pub fn new(out: W) -> Self {
        Self {
            out,
            title: String::new(),
            reminder: String::new(),
            timer: String::new(),
            visible: false,
        }
    }

    /// Returns true while the break window is shown.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Consumes the screen, returning the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Applies one command and redraws.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the terminal fails.
    pub fn apply(&mut self, command: &UiCommand) -> io::Result<()> {
        match command {
            UiCommand::SetTitle(title) => {
                self.title.clone_from(title);
                if !self.visible {
                    self.draw_title()?;
                }
            }
            UiCommand::SetTooltip(_) => return Ok(()),
            UiCommand::ShowWindow => {
                if !self.visible {
                    self.visible = true;
                    write!(self.out, "{CLEAR_LINE}")?;
                    self.draw_window()?;
                }
            }
            UiCommand::HideWindow => {
                if self.visible {
                    self.visible = false;
                    writeln!(self.out)?;
                    self.draw_title()?;
                }
            }
            UiCommand::SetWindowText { region, text } => {
                match region {
                    WindowRegion::Reminder => self.reminder.clone_from(text),
                    WindowRegion::Timer => self.timer.clone_from(text),
                }
                if self.visible {
                    self.draw_window()?;
                }
            }
            UiCommand::RequestFocus => {
                if self.visible {
                    write!(self.out, "{BELL}")?;
                    self.draw_window()?;
                }
            }
            UiCommand::Shutdown => {
                writeln!(self.out)?;
            }
        }
        self.out.flush()
    }

    /// Prints a message on its own line, then redraws the status line.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the terminal fails.
    pub fn show_message(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "{CLEAR_LINE}{message}")?;
        if self.visible {
            self.draw_window()?;
        } else {
            self.draw_title()?;
        }
        self.out.flush()
    }

    fn draw_title(&mut self) -> io::Result<()> {
        if self.title.is_empty() {
            write!(self.out, "{CLEAR_LINE}")
        } else {
            write!(self.out, "{CLEAR_LINE}Work {}", self.title)
        }
    }

    fn draw_window(&mut self) -> io::Result<()> {
        write!(
            self.out,
            "{CLEAR_LINE}{} {}  [Enter: step away]",
            self.reminder, self.timer
        )
    }
}

// ============================================================================
// Console input
// ============================================================================

/// Spawns a thread turning lines from `input` into [`UiEvent`]s.
///
/// The thread ends at end of input or when the receiver is dropped.
///
/// # Errors
///
/// Returns an error if the thread cannot be spawned.
pub fn spawn_console_input<R>(input: R, tx: Sender<UiEvent>) -> io::Result<thread::JoinHandle<()>>
where
    R: BufRead + Send + 'static,
{
    thread::Builder::new()
        .name("console-input".to_string())
        .spawn(move || {
            for line in input.lines() {
                let Ok(line) = line else {
                    tracing::debug!("Console input closed with an error");
                    break;
                };
                if tx.send(UiEvent::from_console_line(&line)).is_err() {
                    break;
                }
            }
            tracing::debug!("Console input finished");
        })
}

// ============================================================================
// Tests
// ============================================================================
