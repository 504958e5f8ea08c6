//! Command parsing and execution.

use crate::render::{self, MemoryView, ProcessView};
use kernel_alloc::vmm::MemoryManager;
use kernel_vmem::{Access, PagingStore, ParsePolicyError, ReplacementPolicy};
use log::debug;
use std::io::{self, BufRead, Write};
use std::str::FromStr;

const PROMPT: &str = ">>> ";

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Command {
    CreateProcess { id: String, sizes: Vec<usize> },
    DestroyProcess { id: String },
    ShowMemory,
    ShowProcess { id: String },
    ShowProcesses,
    Address { id: String, segment: usize, offset: usize },
    PageReplace { id: String, segment: usize, page: usize },
    Policy(ReplacementPolicy),
    Stats,
    Help,
    Quit,
}

#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum ParseCommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command {0:?} (use 'help' for assistance)")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("{0:?} is not a non-negative integer")]
    Number(String),
    #[error(transparent)]
    Policy(#[from] ParsePolicyError),
}

fn number(word: &str) -> Result<usize, ParseCommandError> {
    word.parse()
        .map_err(|_| ParseCommandError::Number(word.into()))
}

impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use ParseCommandError::Usage;

        let words: Vec<&str> = s.split_whitespace().collect();
        let command = match words.as_slice() {
            [] => return Err(ParseCommandError::Empty),
            ["create", "process", id, sizes @ ..] if !sizes.is_empty() => Self::CreateProcess {
                id: (*id).into(),
                sizes: sizes
                    .iter()
                    .map(|w| number(w))
                    .collect::<Result<_, _>>()?,
            },
            ["create", ..] => return Err(Usage("create process <id> <size> [<size>...]")),
            ["destroy", "process", id] => Self::DestroyProcess { id: (*id).into() },
            ["destroy", ..] => return Err(Usage("destroy process <id>")),
            ["show", "memory"] => Self::ShowMemory,
            ["show", "processes"] => Self::ShowProcesses,
            ["show", "process", id] => Self::ShowProcess { id: (*id).into() },
            ["show", ..] => return Err(Usage("show memory | show process <id> | show processes")),
            ["address", id, segment, offset] => Self::Address {
                id: (*id).into(),
                segment: number(segment)?,
                offset: number(offset)?,
            },
            ["address", ..] => return Err(Usage("address <id> <segment> <offset>")),
            ["page", "replace", id, segment, page] => Self::PageReplace {
                id: (*id).into(),
                segment: number(segment)?,
                page: number(page)?,
            },
            ["page", ..] => return Err(Usage("page replace <id> <segment> <page>")),
            ["policy", policy] => Self::Policy(policy.parse()?),
            ["policy", ..] => return Err(Usage("policy fifo|lru")),
            ["stats"] => Self::Stats,
            ["help" | "h"] => Self::Help,
            ["quit" | "q"] => Self::Quit,
            [other, ..] => return Err(ParseCommandError::Unknown((*other).into())),
        };
        Ok(command)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Line-oriented front end over a [`MemoryManager`].
pub struct Shell<S: PagingStore> {
    mm: MemoryManager<S>,
}

impl<S: PagingStore> Shell<S> {
    pub const fn new(mm: MemoryManager<S>) -> Self {
        Self { mm }
    }

    pub const fn manager(&self) -> &MemoryManager<S> {
        &self.mm
    }

    /// Read commands until end of input or `quit`.
    ///
    /// With `echo` set, every command is printed after the prompt, so a
    /// replayed script reads like an interactive session.
    pub fn run(&mut self, input: impl BufRead, out: &mut impl Write, echo: bool) -> io::Result<()> {
        write!(out, "{PROMPT}")?;
        out.flush()?;
        for line in input.lines() {
            let line = line?;
            if echo {
                writeln!(out, "{line}")?;
            }
            if !line.trim().is_empty() {
                match line.parse::<Command>() {
                    Ok(command) => {
                        if self.execute(command, out)? == Flow::Quit {
                            return Ok(());
                        }
                    }
                    Err(e) => writeln!(out, "Invalid command: {e}")?,
                }
            }
            write!(out, "{PROMPT}")?;
            out.flush()?;
        }
        writeln!(out)
    }

    /// Apply one command and print its outcome. Manager errors are printed,
    /// not returned; only output failures are.
    pub fn execute(&mut self, command: Command, out: &mut impl Write) -> io::Result<Flow> {
        debug!("executing {command:?}");
        match command {
            Command::CreateProcess { id, sizes } => match self.mm.create_process(&id, &sizes) {
                Ok(()) => {
                    let frames = self.mm.frames_of(&id).unwrap_or_default().len();
                    writeln!(out, "Created process {id} with {frames} resident frames")?;
                }
                Err(e) => failed(out, &e)?,
            },
            Command::DestroyProcess { id } => match self.mm.destroy_process(&id) {
                Ok(()) => writeln!(out, "Destroyed process {id}")?,
                Err(e) => failed(out, &e)?,
            },
            Command::ShowMemory => writeln!(out, "{}", MemoryView(&self.mm.snapshot_frames()))?,
            Command::ShowProcess { id } => match self.mm.snapshot_process(&id) {
                Ok(snap) => write!(out, "{}", ProcessView(&snap))?,
                Err(e) => failed(out, &e)?,
            },
            Command::ShowProcesses => {
                if self.mm.processes().next().is_none() {
                    writeln!(out, "No processes")?;
                }
                for id in self.mm.processes() {
                    let space = self.mm.process(id.as_str());
                    let (policy, frames) = space
                        .map(|s| (s.policy(), s.resident_set_size()))
                        .unwrap_or_default();
                    writeln!(out, "{id}\t{policy}\t{frames} frames")?;
                }
            }
            Command::Address {
                id,
                segment,
                offset,
            } => match self.mm.translate_address(&id, segment, offset) {
                Ok(pa) => writeln!(out, "Physical address: {pa} ({})", pa.as_u64())?,
                Err(e) => failed(out, &e)?,
            },
            Command::PageReplace { id, segment, page } => {
                match self.mm.replace_page(&id, segment, page) {
                    Ok(Access::Hit { frame }) => writeln!(
                        out,
                        "Page ({segment}, {page}) is already loaded in frame {frame}"
                    )?,
                    Ok(Access::Fault(r)) => writeln!(
                        out,
                        "Page fault: page {} evicted, page {} loaded into frame {}",
                        r.victim, r.loaded, r.frame
                    )?,
                    Err(e) => failed(out, &e)?,
                }
            }
            Command::Policy(policy) => {
                self.mm.set_default_policy(policy);
                writeln!(out, "Set replacement policy to {policy}")?;
            }
            Command::Stats => {
                let stats = self.mm.stats();
                writeln!(out, "Total requests: {}", stats.total_requests)?;
                writeln!(out, "Page faults: {}", stats.page_faults)?;
            }
            Command::Help => writeln!(out, "{}", render::HELP)?,
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }
}

fn failed(out: &mut impl Write, error: &impl std::error::Error) -> io::Result<()> {
    debug!("operation failed: {error:?}");
    writeln!(out, "Operation failed: {error}")
}
