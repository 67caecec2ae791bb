//! Console hooks.
//!
//! The evaluator never touches stdio directly; every `System.Console` call
//! goes through this trait. Hosts supply a real console or a scripted one.

use std::collections::VecDeque;
use std::io::{BufRead, Write as _};

use crate::error::{EvalResult, RuntimeError};

/// The three hooks `System.Console` needs.
pub trait Console {
    fn write(&mut self, text: &str);
    fn write_line(&mut self, text: &str);
    /// Blocking read of one integer from the program's input stream.
    fn read_int(&mut self) -> EvalResult<i32>;
}

/// Process-stdio console.
#[derive(Debug, Default)]
pub struct StdConsole;

impl Console for StdConsole {
    fn write(&mut self, text: &str) {
        let mut stdout = std::io::stdout();
        let _ = stdout.write_all(text.as_bytes());
        let _ = stdout.flush();
    }

    fn write_line(&mut self, text: &str) {
        let mut stdout = std::io::stdout();
        let _ = stdout.write_all(text.as_bytes());
        let _ = stdout.write_all(b"\n");
        let _ = stdout.flush();
    }

    fn read_int(&mut self) -> EvalResult<i32> {
        let mut line = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| RuntimeError::InputFormat(e.to_string()))?;
        parse_int(&line)
    }
}

/// Scripted console for tests: integers are served from a queue, output is
/// captured into one string.
#[derive(Debug, Default)]
pub struct BufferConsole {
    inputs: VecDeque<String>,
    output: String,
}

impl BufferConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// A console whose `ReadInt` calls will see these lines, in order.
    pub fn with_inputs<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            output: String::new(),
        }
    }

    /// Everything the program wrote, `write_line` rendered as `\n`.
    pub fn output(&self) -> &str {
        &self.output
    }
}

impl Console for BufferConsole {
    fn write(&mut self, text: &str) {
        self.output.push_str(text);
    }

    fn write_line(&mut self, text: &str) {
        self.output.push_str(text);
        self.output.push('\n');
    }

    fn read_int(&mut self) -> EvalResult<i32> {
        match self.inputs.pop_front() {
            Some(line) => parse_int(&line),
            None => Err(RuntimeError::InputFormat(
                "input stream is exhausted".to_string(),
            )),
        }
    }
}

fn parse_int(line: &str) -> EvalResult<i32> {
    let trimmed = line.trim();
    trimmed
        .parse::<i32>()
        .map_err(|_| RuntimeError::InputFormat(format!("'{trimmed}' is not an integer")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_console_captures_output() {
        let mut console = BufferConsole::new();
        console.write("Fib(n) = ");
        console.write_line("55");
        assert_eq!(console.output(), "Fib(n) = 55\n");
    }

    #[test]
    fn buffer_console_serves_inputs_in_order() {
        let mut console = BufferConsole::with_inputs(["5", " 42 "]);
        assert_eq!(console.read_int().unwrap(), 5);
        assert_eq!(console.read_int().unwrap(), 42);
        assert!(matches!(
            console.read_int(),
            Err(RuntimeError::InputFormat(_))
        ));
    }

    #[test]
    fn malformed_input_is_an_input_format_error() {
        let mut console = BufferConsole::with_inputs(["five"]);
        assert!(matches!(
            console.read_int(),
            Err(RuntimeError::InputFormat(_))
        ));
    }
}
