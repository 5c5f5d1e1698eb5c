// Terminal capabilities used by the prompts. Prompts only talk to the
// `Terminal` trait, so the interactive crossterm back-end can be swapped
// for a scripted one when there is no real terminal.

use crossterm::cursor::{MoveLeft, MoveTo, MoveToPreviousLine};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::{execute, queue};
use std::cell::Cell;
use std::collections::VecDeque;
use std::io::{self, IsTerminal, Stdout, Write};
use std::rc::Rc;

/// A single key press as the masked prompt sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Backspace,
    Enter,
    /// Arrows, function keys and anything else without a character.
    Other,
}

pub trait Terminal {
    /// Read one line of input without its line terminator.
    fn read_line(&mut self) -> io::Result<String>;
    /// Stop the terminal echoing input until the returned guard drops.
    /// Hold it across every `read_key` of one masked read.
    fn raw_mode(&mut self) -> io::Result<RawMode>;
    /// Read one key press.
    fn read_key(&mut self) -> io::Result<Key>;
    fn write_raw(&mut self, text: &str) -> io::Result<()>;
    fn move_cursor_left(&mut self, columns: u16) -> io::Result<()>;
    /// Erase the last `lines` printed lines and leave the cursor at the
    /// start of the first erased one.
    fn clear_last_lines(&mut self, lines: u16) -> io::Result<()>;
    fn clear_screen(&mut self) -> io::Result<()>;
}

fn strip_line_ending(mut line: String) -> String {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    line
}

fn input_closed() -> io::Error {
    io::Error::new(io::ErrorKind::UnexpectedEof, "input closed")
}

/// Leaves raw mode when dropped, on every exit path.
pub struct RawMode {
    restore: Option<Box<dyn FnOnce()>>,
}

impl RawMode {
    pub fn new(restore: impl FnOnce() + 'static) -> Self {
        RawMode {
            restore: Some(Box::new(restore)),
        }
    }

    /// Nothing to restore.
    pub fn inactive() -> Self {
        RawMode { restore: None }
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Some(restore) = self.restore.take() {
            restore();
        }
    }
}

/// Stdin/stdout back-end. Cursor and clearing commands are skipped when
/// stdout is not a terminal, and key reads fall back to plain stdin
/// characters when stdin is not one.
pub struct CrosstermTerminal {
    out: Stdout,
    interactive_out: bool,
    interactive_in: bool,
    pending: VecDeque<char>,
}

impl CrosstermTerminal {
    pub fn new() -> Self {
        let out = io::stdout();
        CrosstermTerminal {
            interactive_out: out.is_terminal(),
            interactive_in: io::stdin().is_terminal(),
            out,
            pending: VecDeque::new(),
        }
    }

    /// Only erase what the terminal actually echoed.
    fn can_redraw(&self) -> bool {
        self.interactive_in && self.interactive_out
    }

    fn read_raw_key(&mut self) -> io::Result<Key> {
        loop {
            let Event::Key(KeyEvent {
                code,
                modifiers,
                kind,
                ..
            }) = event::read()?
            else {
                continue;
            };
            if kind != KeyEventKind::Press {
                continue;
            }
            return Ok(match code {
                KeyCode::Enter => Key::Enter,
                KeyCode::Backspace => Key::Backspace,
                // raw mode swallows SIGINT
                KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                    return Err(io::Error::new(io::ErrorKind::Interrupted, "interrupted"));
                }
                KeyCode::Char(c) => Key::Char(c),
                _ => Key::Other,
            });
        }
    }

    fn read_piped_key(&mut self) -> io::Result<Key> {
        loop {
            if self.pending.is_empty() {
                let mut buf = String::new();
                if io::stdin().read_line(&mut buf)? == 0 {
                    return Err(input_closed());
                }
                self.pending.extend(buf.chars());
            }
            match self.pending.pop_front() {
                Some('\n') => return Ok(Key::Enter),
                Some('\r') | None => continue,
                Some('\u{7f}') | Some('\u{8}') => return Ok(Key::Backspace),
                Some(c) => return Ok(Key::Char(c)),
            }
        }
    }
}

impl Default for CrosstermTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Terminal for CrosstermTerminal {
    fn read_line(&mut self) -> io::Result<String> {
        self.out.flush()?;
        let mut buf = String::new();
        if io::stdin().read_line(&mut buf)? == 0 {
            return Err(input_closed());
        }
        Ok(strip_line_ending(buf))
    }

    fn raw_mode(&mut self) -> io::Result<RawMode> {
        self.out.flush()?;
        if !self.interactive_in {
            return Ok(RawMode::inactive());
        }
        terminal::enable_raw_mode()?;
        Ok(RawMode::new(|| {
            let _ = terminal::disable_raw_mode();
        }))
    }

    fn read_key(&mut self) -> io::Result<Key> {
        self.out.flush()?;
        if self.interactive_in {
            self.read_raw_key()
        } else {
            self.read_piped_key()
        }
    }

    fn write_raw(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(text.as_bytes())?;
        self.out.flush()
    }

    fn move_cursor_left(&mut self, columns: u16) -> io::Result<()> {
        // a zero-column move is still a one-column move in ANSI
        if !self.interactive_out || columns == 0 {
            return Ok(());
        }
        execute!(self.out, MoveLeft(columns))
    }

    fn clear_last_lines(&mut self, lines: u16) -> io::Result<()> {
        if !self.can_redraw() || lines == 0 {
            return Ok(());
        }
        queue!(
            self.out,
            MoveToPreviousLine(lines),
            Clear(ClearType::FromCursorDown)
        )?;
        self.out.flush()
    }

    fn clear_screen(&mut self) -> io::Result<()> {
        if !self.interactive_out {
            return Ok(());
        }
        execute!(self.out, Clear(ClearType::All), MoveTo(0, 0))
    }
}

/// Headless back-end that replays queued input and records what was
/// written. Cursor-left moves are recorded in the output as `\u{8}`.
#[derive(Debug, Default)]
pub struct ScriptedTerminal {
    lines: VecDeque<String>,
    keys: VecDeque<Key>,
    output: String,
    cleared: Vec<u16>,
    screen_clears: usize,
    raw: Rc<Cell<bool>>,
    keys_without_raw: usize,
}

impl ScriptedTerminal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines.extend(lines.into_iter().map(Into::into));
        self
    }

    pub fn with_keys<I: IntoIterator<Item = Key>>(mut self, keys: I) -> Self {
        self.keys.extend(keys);
        self
    }

    /// Queue the keys for typing `text` followed by Enter.
    pub fn with_typed(self, text: &str) -> Self {
        let keys: Vec<Key> = text.chars().map(Key::Char).chain([Key::Enter]).collect();
        self.with_keys(keys)
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    /// Line counts passed to each `clear_last_lines` call, in order.
    pub fn cleared_lines(&self) -> &[u16] {
        &self.cleared
    }

    pub fn screen_clears(&self) -> usize {
        self.screen_clears
    }

    pub fn in_raw_mode(&self) -> bool {
        self.raw.get()
    }

    /// Keys consumed while no `RawMode` guard was alive.
    pub fn keys_read_outside_raw_mode(&self) -> usize {
        self.keys_without_raw
    }

    pub fn remaining_lines(&self) -> usize {
        self.lines.len()
    }
}

impl Terminal for ScriptedTerminal {
    fn read_line(&mut self) -> io::Result<String> {
        self.lines.pop_front().ok_or_else(input_closed)
    }

    fn raw_mode(&mut self) -> io::Result<RawMode> {
        self.raw.set(true);
        let raw = Rc::clone(&self.raw);
        Ok(RawMode::new(move || raw.set(false)))
    }

    fn read_key(&mut self) -> io::Result<Key> {
        let key = self.keys.pop_front().ok_or_else(input_closed)?;
        if !self.raw.get() {
            self.keys_without_raw += 1;
        }
        Ok(key)
    }

    fn write_raw(&mut self, text: &str) -> io::Result<()> {
        self.output.push_str(text);
        Ok(())
    }

    fn move_cursor_left(&mut self, columns: u16) -> io::Result<()> {
        for _ in 0..columns {
            self.output.push('\u{8}');
        }
        Ok(())
    }

    fn clear_last_lines(&mut self, lines: u16) -> io::Result<()> {
        self.cleared.push(lines);
        Ok(())
    }

    fn clear_screen(&mut self) -> io::Result<()> {
        self.screen_clears += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_only_the_line_terminator() {
        assert_eq!(strip_line_ending("abc\n".into()), "abc");
        assert_eq!(strip_line_ending("abc\r\n".into()), "abc");
        assert_eq!(strip_line_ending("  abc  \n".into()), "  abc  ");
        assert_eq!(strip_line_ending("abc".into()), "abc");
    }

    #[test]
    fn scripted_terminal_replays_then_reports_eof() {
        let mut term = ScriptedTerminal::new()
            .with_lines(["first"])
            .with_typed("ab");

        assert_eq!(term.read_line().unwrap(), "first");
        assert_eq!(term.read_line().unwrap_err().kind(), io::ErrorKind::UnexpectedEof);

        assert_eq!(term.read_key().unwrap(), Key::Char('a'));
        assert_eq!(term.read_key().unwrap(), Key::Char('b'));
        assert_eq!(term.read_key().unwrap(), Key::Enter);
        assert_eq!(term.read_key().unwrap_err().kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn scripted_raw_mode_ends_when_guard_drops() {
        let mut term = ScriptedTerminal::new().with_keys([Key::Char('a'), Key::Enter]);

        {
            let _raw = term.raw_mode().unwrap();
            assert!(term.in_raw_mode());
            term.read_key().unwrap();
        }
        assert!(!term.in_raw_mode());

        term.read_key().unwrap();
        assert_eq!(term.keys_read_outside_raw_mode(), 1);
    }

    #[test]
    fn piped_stdin_with_tty_stdout_does_not_redraw() {
        let piped = CrosstermTerminal {
            out: io::stdout(),
            interactive_out: true,
            interactive_in: false,
            pending: VecDeque::new(),
        };
        assert!(!piped.can_redraw());

        let interactive = CrosstermTerminal {
            interactive_in: true,
            ..piped
        };
        assert!(interactive.can_redraw());
    }

    #[test]
    fn scripted_terminal_records_output() {
        let mut term = ScriptedTerminal::new();
        term.write_raw("**").unwrap();
        term.move_cursor_left(1).unwrap();
        term.clear_last_lines(2).unwrap();
        term.clear_screen().unwrap();

        assert_eq!(term.output(), "**\u{8}");
        assert_eq!(term.cleared_lines(), &[2]);
        assert_eq!(term.screen_clears(), 1);
    }
}
