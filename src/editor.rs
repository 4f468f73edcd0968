// File: src/editor.rs
use crate::core::engine::RackEngine;
use crate::error::Result;
use crossterm::style::Stylize;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::error;

/// What a plain word typed at the prompt does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Add,
    Delete,
    Anagram,
}

impl Mode {
    pub fn symbol(self) -> char {
        match self {
            Mode::Add => '+',
            Mode::Delete => '-',
            Mode::Anagram => '*',
        }
    }
}

/// A `!`-prefixed editor command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SetMode(Mode),
    Threshold(usize),
    Help,
    Quit,
    Save(Option<PathBuf>),
}

const HELP: &[(&str, &str)] = &[
    ("!add", "+ Add entry"),
    ("!del", "- Remove entry"),
    ("!chk", "* Switch to anagram mode"),
    ("!threshold", "Set threshold for anagram mode"),
    ("!help", "List commands"),
    ("!quit", "Leave the editor, offering to save changes"),
    ("!save", "Save to the current file, or to the given path"),
];

impl Command {
    /// `None` when `name` is not a command, so the line goes to the current mode.
    pub fn parse(name: &str, args: &[&str]) -> Option<std::result::Result<Command, String>> {
        let no_args = |command: Command| {
            if args.is_empty() {
                Ok(command)
            } else {
                Err(format!("{} takes no arguments ({} given)", name, args.len()))
            }
        };
        let parsed = match name {
            "!add" => no_args(Command::SetMode(Mode::Add)),
            "!del" => no_args(Command::SetMode(Mode::Delete)),
            "!chk" => no_args(Command::SetMode(Mode::Anagram)),
            "!help" => no_args(Command::Help),
            "!quit" => no_args(Command::Quit),
            "!threshold" => match args {
                [value] => value
                    .parse()
                    .map(Command::Threshold)
                    .map_err(|_| format!("{} is not a valid threshold", value)),
                _ => Err(format!("!threshold takes 1 argument ({} given)", args.len())),
            },
            "!save" => match args {
                [] => Ok(Command::Save(None)),
                [path] => Ok(Command::Save(Some(PathBuf::from(*path)))),
                _ => Err(format!("!save takes at most 1 argument ({} given)", args.len())),
            },
            _ => return None,
        };
        Some(parsed)
    }
}

/// Interactive add / delete / lookup loop over one index.
pub struct Editor<R, W> {
    engine: RackEngine,
    mode: Mode,
    threshold: usize,
    running: bool,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Editor<R, W> {
    pub fn new(engine: RackEngine, threshold: usize, input: R, output: W) -> Self {
        Self {
            engine,
            mode: Mode::Add,
            threshold,
            running: false,
            input,
            output,
        }
    }

    pub fn engine(&self) -> &RackEngine {
        &self.engine
    }

    pub fn into_engine(self) -> RackEngine {
        self.engine
    }

    /// Reads lines until `!quit` or end of input.
    pub fn run(&mut self) -> Result<()> {
        self.running = true;
        while self.running {
            write!(self.output, "{} ", self.mode.symbol())?;
            self.output.flush()?;

            let Some(line) = self.read_line()? else {
                writeln!(self.output)?;
                self.close()?;
                break;
            };
            self.handle_line(&line)?;
        }
        Ok(())
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
    }

    pub fn handle_line(&mut self, line: &str) -> Result<()> {
        let mut words = line.trim_end_matches(' ').split(' ');
        let name = words.next().unwrap_or("");
        if name.is_empty() {
            return Ok(());
        }
        let args: Vec<&str> = words.collect();

        match Command::parse(name, &args) {
            Some(Ok(command)) => self.dispatch(command),
            Some(Err(message)) => {
                writeln!(self.output, "{}", message.red())?;
                Ok(())
            }
            None => self.apply_mode(name),
        }
    }

    fn dispatch(&mut self, command: Command) -> Result<()> {
        match command {
            Command::SetMode(mode) => self.mode = mode,
            Command::Threshold(threshold) => self.threshold = threshold,
            Command::Help => {
                for (name, help) in HELP {
                    writeln!(self.output, "{}: {}", name, help)?;
                }
            }
            Command::Quit => self.close()?,
            Command::Save(path) => self.save(path)?,
        }
        Ok(())
    }

    fn apply_mode(&mut self, word: &str) -> Result<()> {
        match self.mode {
            Mode::Add => {
                self.engine.add_word(word);
            }
            Mode::Delete => {
                self.engine.delete_word(word);
            }
            Mode::Anagram => {
                let matches = self.engine.anagrams(word, self.threshold);
                writeln!(self.output, "{:?}", matches)?;
            }
        }
        Ok(())
    }

    fn save(&mut self, path: Option<PathBuf>) -> Result<()> {
        let Some(target) = path.or_else(|| self.engine.counts_path().map(PathBuf::from)) else {
            writeln!(self.output, "No file to save to!")?;
            return Ok(());
        };
        writeln!(self.output, "Saving to '{}'", target.display())?;
        if let Err(e) = self.engine.save(Some(&target)) {
            error!(path = %target.display(), error = %e, "Save failed");
            writeln!(self.output, "{} {}", "[Error]".red(), e)?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.running = false;
        if !self.engine.made_changes() {
            return Ok(());
        }

        let target = self
            .engine
            .counts_path()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        writeln!(self.output, "{} Unsaved changes", "[Warning]".yellow())?;
        writeln!(
            self.output,
            "Press y to continue without saving, otherwise save to '{}'",
            target
        )?;
        self.output.flush()?;

        let response = self.read_line()?.unwrap_or_default();
        if response != "y" && response != "Y" {
            self.save(None)?;
        }
        Ok(())
    }
}
