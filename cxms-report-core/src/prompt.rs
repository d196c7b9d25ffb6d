//! Line-based interactive channel
//!
//! Everything the reporter shows or asks goes through a [`Prompter`]. The
//! production implementation is [`Terminal`] over stdin/stdout; tests drive
//! the same code with in-memory buffers.

use std::io::{self, BufRead, Write};

/// A sequential question/answer channel.
pub trait Prompter {
    /// Print one line of output
    fn say(&mut self, line: &str) -> io::Result<()>;

    /// Print `question` (no newline) and block for one line of input.
    ///
    /// The answer is trimmed. End of input reads as an empty answer.
    fn ask(&mut self, question: &str) -> io::Result<String>;

    /// Print a section banner
    fn section(&mut self, title: &str) -> io::Result<()> {
        let rule = "─".repeat(50);
        self.say("")?;
        self.say(&rule)?;
        self.say(&format!("  {}", title))?;
        self.say(&rule)
    }
}

/// [`Prompter`] over any buffered reader and writer.
#[derive(Debug)]
pub struct Terminal<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Terminal<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Give back the writer, e.g. to inspect captured output
    pub fn into_output(self) -> W {
        self.output
    }
}

impl Terminal<io::StdinLock<'static>, io::Stdout> {
    /// Terminal on the process's stdin and stdout
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter for Terminal<R, W> {
    fn say(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.output, "{}", line)
    }

    fn ask(&mut self, question: &str) -> io::Result<String> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;

        let mut answer = String::new();
        self.input.read_line(&mut answer)?;
        Ok(answer.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_ask_trims_answer() {
        let mut terminal = Terminal::new(Cursor::new("  web \n"), Vec::new());
        assert_eq!(terminal.ask("Type? ").unwrap(), "web");
        assert_eq!(String::from_utf8(terminal.into_output()).unwrap(), "Type? ");
    }

    #[test]
    fn test_eof_is_empty_answer() {
        let mut terminal = Terminal::new(Cursor::new(""), Vec::new());
        assert_eq!(terminal.ask("Anything? ").unwrap(), "");
        assert_eq!(terminal.ask("Still? ").unwrap(), "");
    }

    #[test]
    fn test_say_writes_lines() {
        let mut terminal = Terminal::new(Cursor::new(""), Vec::new());
        terminal.say("one").unwrap();
        terminal.say("two").unwrap();
        assert_eq!(String::from_utf8(terminal.into_output()).unwrap(), "one\ntwo\n");
    }
}
