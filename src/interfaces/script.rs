//! Line-oriented command language for driving a session from a terminal or
//! a script file.
//!
//! ```text
//! insert            # issue and insert the configured card
//! press enter       # press the button or key with this label
//! press 1
//! click 300 140     # pointer event at screen coordinates
//! wait 2000         # let time pass, in milliseconds
//! state             # print the current state and balance
//! eject
//! quit
//! ```

use crate::application::controller::SessionController;
use crate::application::input::Point;
use crate::application::layout::BACKSPACE_LABEL;
use crate::domain::card::CardRequest;
use crate::error::{AtmError, Result};
use log::debug;
use std::io::{BufRead, Write};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Insert,
    Press(String),
    Click(Point),
    Wait(Duration),
    State,
    Eject,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Quit,
}

/// Parses one line. Blank lines and `#` comments yield `None`.
pub fn parse_command(line_no: usize, line: &str) -> Result<Option<Command>> {
    let line = line.split('#').next().unwrap_or_default().trim();
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();
    let error = |message: String| AtmError::ScriptError {
        line: line_no,
        message,
    };

    let command = match (verb.to_ascii_lowercase().as_str(), args.as_slice()) {
        ("insert", []) => Command::Insert,
        ("press", [_, ..]) => Command::Press(normalize_label(&args.join(" "))),
        ("click", [x, y]) => {
            let x = x.parse().map_err(|_| error(format!("bad x coordinate '{x}'")))?;
            let y = y.parse().map_err(|_| error(format!("bad y coordinate '{y}'")))?;
            Command::Click(Point::new(x, y))
        }
        ("wait", [ms]) => {
            let ms = ms.parse().map_err(|_| error(format!("bad duration '{ms}'")))?;
            Command::Wait(Duration::from_millis(ms))
        }
        ("state", []) => Command::State,
        ("eject", []) => Command::Eject,
        ("quit" | "exit", []) => Command::Quit,
        _ => return Err(error(format!("unknown command '{line}'"))),
    };
    Ok(Some(command))
}

fn normalize_label(label: &str) -> String {
    match label.to_ascii_lowercase().as_str() {
        "back" | "backspace" | "del" => BACKSPACE_LABEL.to_string(),
        _ => label.to_string(),
    }
}

/// Reads commands from any buffered source.
pub struct ScriptReader<R: BufRead> {
    source: R,
}

impl<R: BufRead> ScriptReader<R> {
    pub fn new(source: R) -> Self {
        Self { source }
    }

    /// Lazily parses commands, skipping blank and comment lines.
    pub fn commands(self) -> impl Iterator<Item = Result<Command>> {
        self.source
            .lines()
            .enumerate()
            .filter_map(|(index, line)| match line {
                Ok(line) => parse_command(index + 1, &line).transpose(),
                Err(e) => Some(Err(AtmError::from(e))),
            })
    }
}

/// Runs one command against the controller.
///
/// Rejected transitions are not errors here: the controller already shows
/// them as a notice. Card validation failures and unknown labels are.
pub fn execute<W: Write>(
    controller: &mut SessionController,
    card: &CardRequest,
    command: &Command,
    out: &mut W,
) -> Result<Outcome> {
    match command {
        Command::Insert => {
            let issued = controller.issue_card(card)?;
            controller.insert_card(issued)?;
        }
        Command::Press(label) => {
            let Some(region) = controller.router().find(label) else {
                writeln!(out, "No button labelled '{label}' on the {} screen", controller.state())?;
                return Ok(Outcome::Continue);
            };
            let point = region.bounds.center();
            if let Err(violation) = controller.handle_pointer(point) {
                debug!("Press '{label}' rejected: {violation}");
            }
        }
        Command::Click(point) => {
            if let Err(violation) = controller.handle_pointer(*point) {
                debug!("Click rejected: {violation}");
            }
        }
        Command::Wait(elapsed) => controller.advance(*elapsed),
        Command::State => {
            write!(out, "state: {}", controller.state())?;
            if let Some(balance) = controller.balance() {
                write!(out, ", balance: {}", controller.config().currency.format(balance.value()))?;
            }
            writeln!(out)?;
        }
        Command::Eject => controller.eject(),
        Command::Quit => return Ok(Outcome::Quit),
    }
    Ok(Outcome::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command(1, "insert").unwrap(), Some(Command::Insert));
        assert_eq!(
            parse_command(1, "press Yes, print receipt").unwrap(),
            Some(Command::Press("Yes, print receipt".to_string()))
        );
        assert_eq!(
            parse_command(1, "press back").unwrap(),
            Some(Command::Press("⌫".to_string()))
        );
        assert_eq!(
            parse_command(1, "CLICK 300 140.5").unwrap(),
            Some(Command::Click(Point::new(300.0, 140.5)))
        );
        assert_eq!(
            parse_command(1, "wait 2000 # processing").unwrap(),
            Some(Command::Wait(Duration::from_secs(2)))
        );
        assert_eq!(parse_command(1, "   ").unwrap(), None);
        assert_eq!(parse_command(1, "# comment").unwrap(), None);
    }

    #[test]
    fn test_parse_errors_carry_line() {
        assert!(matches!(
            parse_command(7, "wait soon"),
            Err(AtmError::ScriptError { line: 7, .. })
        ));
        assert!(parse_command(1, "click 1").is_err());
        assert!(parse_command(1, "press").is_err());
        assert!(parse_command(1, "dance").is_err());
    }

    #[test]
    fn test_reader_skips_blank_lines() {
        let script = "insert\n\n# pin\npress enter\nbogus\nquit\n";
        let commands: Vec<Result<Command>> = ScriptReader::new(script.as_bytes()).commands().collect();
        assert_eq!(commands.len(), 4);
        assert!(matches!(
            commands[2],
            Err(AtmError::ScriptError { line: 5, .. })
        ));
        assert_eq!(commands[3].as_ref().unwrap(), &Command::Quit);
    }
}
