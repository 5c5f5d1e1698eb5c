// Validated line input and masked password input on top of a `Terminal`.

use crate::terminal::{Key, Terminal};
use std::io;

const MASK: &str = "*";

pub struct Prompt<T: Terminal> {
    term: T,
}

impl<T: Terminal> Prompt<T> {
    pub fn new(term: T) -> Self {
        Prompt { term }
    }

    pub fn terminal(&self) -> &T {
        &self.term
    }

    pub fn terminal_mut(&mut self) -> &mut T {
        &mut self.term
    }

    /// Print `prompt` and read a line, asking again while the answer is
    /// empty or, when `allowed` is given, not one of `allowed` ignoring
    /// case. The raw answer is returned; callers lowercase it themselves.
    ///
    /// The prompt and answer are wiped from the screen after every attempt.
    pub fn ask_line(&mut self, prompt: &str, allowed: Option<&[&str]>) -> io::Result<String> {
        loop {
            self.term.write_raw(&format!("{prompt}\n"))?;
            let input = self.term.read_line()?;
            self.term.clear_last_lines(2)?;
            if is_acceptable(&input, allowed) {
                return Ok(input);
            }
        }
    }

    /// Print `prompt` and read keys until Enter, echoing `*` for each
    /// character. An empty answer is accepted.
    ///
    /// The terminal stays in raw mode from the first key until Enter, so
    /// nothing typed is ever echoed as itself.
    pub fn ask_masked_line(&mut self, prompt: &str) -> io::Result<String> {
        self.term.write_raw(&format!("{prompt}\n"))?;
        let buffer = {
            let _raw = self.term.raw_mode()?;
            self.read_masked()?
        };
        self.term.write_raw("\n")?;
        Ok(buffer)
    }

    fn read_masked(&mut self) -> io::Result<String> {
        let mut buffer = String::new();
        loop {
            match self.term.read_key()? {
                Key::Enter => break,
                Key::Char(c) => {
                    buffer.push(c);
                    self.term.write_raw(MASK)?;
                }
                Key::Backspace => {
                    if buffer.pop().is_some() {
                        self.term.move_cursor_left(1)?;
                        self.term.write_raw(" ")?;
                        self.term.move_cursor_left(1)?;
                    }
                }
                Key::Other => {}
            }
        }
        Ok(buffer)
    }
}

fn is_acceptable(input: &str, allowed: Option<&[&str]>) -> bool {
    if input.is_empty() {
        return false;
    }
    match allowed {
        None => true,
        Some(values) => {
            let lowered = input.to_lowercase();
            values.iter().any(|v| v.to_lowercase() == lowered)
        }
    }
}
