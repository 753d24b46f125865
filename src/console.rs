use std::{
    fmt,
    io::{BufRead, Write},
};

use crate::error::SessionError;

/// Line-oriented prompt/answer I/O shared by the interactive sessions.
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn say(&mut self, line: impl fmt::Display) -> Result<(), SessionError> {
        writeln!(self.output, "{}", line)?;
        Ok(())
    }

    /// Writes `prompt` without a line break and reads one answer. Running out
    /// of input is an error since every caller still needs the answer.
    pub fn ask(&mut self, prompt: &str) -> Result<String, SessionError> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(SessionError::InputClosed);
        }
        let trimmed = line.trim_end_matches(&['\n', '\r'][..]).len();
        line.truncate(trimmed);
        Ok(line)
    }

    /// Asks again until `parse` accepts the answer; a rejection's message is
    /// printed before the next attempt.
    pub fn ask_until<T, F>(&mut self, prompt: &str, mut parse: F) -> Result<T, SessionError>
    where
        F: FnMut(&str) -> Result<T, String>,
    {
        loop {
            let answer = self.ask(prompt)?;
            match parse(answer.trim()) {
                Ok(value) => return Ok(value),
                Err(complaint) => self.say(complaint)?,
            }
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}
