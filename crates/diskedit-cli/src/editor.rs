//! The interactive editing session
//!
//! `Editor` owns the working layout, the disk backend, and the operator
//! streams, and threads an explicit [`Session`] value through dispatch
//! instead of keeping warning state in globals. Errors are reported in the
//! editor's terse `?message` style and never end the session; only `q`,
//! end of input, or an I/O failure on the streams does.

use std::io::{BufRead, Write};

use diskedit_core::{validate_name, DiskBackend, Part, SectorEvaluator};
use diskedit_ctl::{persist, preview};
use diskedit_layout::{max_end, resolve_end, resolve_start, PartitionSet};

use crate::command::Command;

const HELP_TEXT: &str = "\
. [newdot] - display or set value of dot
a name [start [end]] - add partition
d name - delete partition
h - print help message
p - print partition table
P - print commands to update the control table
w - write partition table
q - quit
";

/// Per-session dispatch state
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// True once the operator has been warned about unwritten changes
    pub warned: bool,
    /// Verb of the previous command line, whatever became of it
    pub last_verb: Option<char>,
}

/// Whether the session goes on after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// An interactive partition editing session
pub struct Editor<B, E, R, W> {
    set: PartitionSet,
    backend: B,
    evaluator: E,
    input: R,
    output: W,
    session: Session,
}

impl<B, E, R, W> Editor<B, E, R, W>
where
    B: DiskBackend,
    E: SectorEvaluator,
    R: BufRead,
    W: Write,
{
    /// Create a session over the given layout, backend, and streams
    pub fn new(set: PartitionSet, backend: B, evaluator: E, input: R, output: W) -> Self {
        Self {
            set,
            backend,
            evaluator,
            input,
            output,
            session: Session::default(),
        }
    }

    /// Give back the layout, backend, and output when the session is done
    pub fn into_parts(self) -> (PartitionSet, B, W) {
        (self.set, self.backend, self.output)
    }

    /// Read and dispatch operator commands until quit or end of input
    pub fn run(&mut self) -> std::io::Result<()> {
        loop {
            let Some(raw) = self.read_line()? else {
                if self.set.changed() {
                    writeln!(self.output, "?warning: changes not written")?;
                }
                return Ok(());
            };

            let line = raw.trim().to_string();
            if line.is_empty() {
                continue;
            }

            let flow = match Command::parse(&line) {
                Ok(command) => match self.execute(command) {
                    Ok(flow) => flow,
                    Err(message) => {
                        writeln!(self.output, "?{message}")?;
                        Flow::Continue
                    }
                },
                Err(message) => {
                    writeln!(self.output, "?{message}")?;
                    Flow::Continue
                }
            };

            self.session.last_verb = line.chars().next();
            if flow == Flow::Quit {
                return Ok(());
            }
        }
    }

    fn read_line(&mut self) -> std::io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    fn execute(&mut self, command: Command) -> Result<Flow, String> {
        match command {
            Command::Dot(None) => {
                writeln!(self.output, "\t. {}", self.set.dot()).map_err(|e| e.to_string())?;
                Ok(Flow::Continue)
            }
            Command::Dot(Some(text)) => {
                let sectors = self.backend.sector_count();
                let dot = self
                    .evaluator
                    .evaluate(&text, self.set.dot(), sectors, sectors)
                    .map_err(|e| e.to_string())?;
                self.set.set_dot(dot);
                Ok(Flow::Continue)
            }
            Command::Add { name, start, end } => self.add(name, start, end),
            Command::Delete { name } => {
                self.set.remove(&name).map_err(|e| e.to_string())?;
                Ok(Flow::Continue)
            }
            Command::Help => {
                write!(self.output, "{HELP_TEXT}").map_err(|e| e.to_string())?;
                Ok(Flow::Continue)
            }
            Command::Print => {
                self.print_table().map_err(|e| e.to_string())?;
                Ok(Flow::Continue)
            }
            Command::CtlPrint => {
                let instructions =
                    preview(&mut self.backend, &self.set).map_err(|e| e.to_string())?;
                for instruction in instructions {
                    writeln!(self.output, "{instruction}").map_err(|e| e.to_string())?;
                }
                Ok(Flow::Continue)
            }
            Command::Write => {
                persist(&mut self.backend, &mut self.set).map_err(|e| e.to_string())?;
                Ok(Flow::Continue)
            }
            Command::Quit => {
                if self.set.changed()
                    && (!self.session.warned || self.session.last_verb != Some('q'))
                {
                    self.session.warned = true;
                    return Err("changes unwritten".to_string());
                }
                Ok(Flow::Quit)
            }
        }
    }

    fn add(
        &mut self,
        name: String,
        start: Option<String>,
        end: Option<String>,
    ) -> Result<Flow, String> {
        validate_name(&name).map_err(|e| e.to_string())?;
        if self.set.find(&name).is_some() {
            return Err(format!("already have partition with name \"{name}\""));
        }

        let sectors = self.backend.sector_count();

        let start_text = match start {
            Some(text) => text,
            None => match self.prompt("start sector: ")? {
                Some(text) => text,
                None => return self.quit_at_eof(),
            },
        };
        let start = resolve_start(&self.set, &self.evaluator, &start_text, sectors)
            .map_err(|e| e.to_string())?;

        let top = max_end(&self.set, start, sectors);

        let end_text = match end {
            Some(text) => text,
            None => match self.prompt(&format!("end [{start}..{top}] "))? {
                Some(text) => text,
                None => return self.quit_at_eof(),
            },
        };
        let end = resolve_end(&self.set, &self.evaluator, &end_text, start, top, sectors)
            .map_err(|e| e.to_string())?;

        self.set
            .add(Part::new(name, start, end))
            .map_err(|e| e.to_string())?;
        self.set.set_dot(end);
        Ok(Flow::Continue)
    }

    fn prompt(&mut self, text: &str) -> Result<Option<String>, String> {
        write!(self.output, "{text}").map_err(|e| e.to_string())?;
        self.output.flush().map_err(|e| e.to_string())?;
        let line = self.read_line().map_err(|e| e.to_string())?;
        Ok(line.map(|l| l.trim().to_string()))
    }

    fn quit_at_eof(&mut self) -> Result<Flow, String> {
        if self.set.changed() {
            writeln!(self.output, "?warning: changes not written").map_err(|e| e.to_string())?;
        }
        Ok(Flow::Quit)
    }

    fn print_table(&mut self) -> std::io::Result<()> {
        for row in self.set.summary(self.backend.sector_count()) {
            let name = row.part.map_or("empty", |p| p.name.as_str());
            let mark = if row.part.is_some_and(|p| p.changed) {
                "*"
            } else {
                " "
            };
            writeln!(
                self.output,
                "{mark}{name:<12} {:>12} {:>12} ({} sectors)",
                row.start,
                row.end,
                row.end - row.start
            )?;
        }
        Ok(())
    }
}
