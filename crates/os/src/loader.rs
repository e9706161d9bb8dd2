use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;
use types::{Fault, Word};
use vm::Opcode;

/// Why a program could not be turned into words or placed in memory.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadError {
    /// `line` is 1-based; 0 when the text was translated outside a program.
    UnknownMnemonic { line: usize, mnemonic: String },
    BadArgument { line: usize, argument: String },
    /// The image has more words than the partition requested for it.
    TooLarge { words: usize, size: usize },
    /// The kernel refused the process.
    Rejected(Fault),
}

impl LoadError {
    fn at_line(self, number: usize) -> Self {
        match self {
            LoadError::UnknownMnemonic { mnemonic, .. } => LoadError::UnknownMnemonic {
                line: number,
                mnemonic,
            },
            LoadError::BadArgument { argument, .. } => LoadError::BadArgument {
                line: number,
                argument,
            },
            other => other,
        }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::UnknownMnemonic { line, mnemonic } => {
                write!(f, "line {line}: unknown instruction '{mnemonic}'")
            }
            LoadError::BadArgument { line, argument } => {
                write!(f, "line {line}: argument '{argument}' is not an integer")
            }
            LoadError::TooLarge { words, size } => {
                write!(f, "program has {words} words but its partition holds {size}")
            }
            LoadError::Rejected(fault) => write!(f, "kernel rejected process: {fault}"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Rejected(fault) => Some(fault),
            _ => None,
        }
    }
}

impl From<Fault> for LoadError {
    fn from(fault: Fault) -> Self {
        LoadError::Rejected(fault)
    }
}

/// One `<size> <path>` line of a program list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramEntry {
    /// Partition size to request, in words.
    pub size: usize,
    pub path: PathBuf,
}

/// Translate one line of program text.
///
/// Blank lines and `//` comments yield `None`. Mnemonics are matched without
/// regard to case, and only `load_const` and `ifgo` read an argument, which
/// defaults to 0 when absent. Anything after the consumed tokens is ignored.
pub fn translate(line: &str) -> Result<Option<Word>, LoadError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with("//") {
        return Ok(None);
    }

    let mut tokens = line.split_whitespace();
    let Some(name) = tokens.next() else {
        return Ok(None);
    };
    let op = Opcode::from_mnemonic(name).ok_or_else(|| LoadError::UnknownMnemonic {
        line: 0,
        mnemonic: name.to_string(),
    })?;

    let argument = match tokens.next() {
        Some(tok) if op.takes_argument() && !tok.starts_with("//") => {
            tok.parse::<i32>().map_err(|_| LoadError::BadArgument {
                line: 0,
                argument: tok.to_string(),
            })?
        }
        _ => 0,
    };
    Ok(Some(Word::new(op as i32, argument)))
}

/// Translate a whole program, one word per instruction line.
pub fn parse_program(text: &str) -> Result<Vec<Word>, LoadError> {
    let mut words = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        if let Some(word) = translate(line).map_err(|e| e.at_line(idx + 1))? {
            words.push(word);
        }
    }
    Ok(words)
}

pub fn read_program(path: &Path) -> Result<Vec<Word>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read program {}", path.display()))?;
    parse_program(&text).with_context(|| format!("in {}", path.display()))
}

/// Parse a program list. Relative paths are resolved against `dir`.
pub fn parse_program_list(text: &str, dir: &Path) -> Result<Vec<ProgramEntry>> {
    let entry_re = Regex::new(r"^(\d+)\s+(\S+)")?;

    let mut entries = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("//") {
            continue;
        }
        let Some(captures) = entry_re.captures(line) else {
            anyhow::bail!("line {}: expected '<size> <path>', got '{}'", idx + 1, line);
        };
        let size: usize = captures[1]
            .parse()
            .with_context(|| format!("line {}: size out of range", idx + 1))?;
        let path = Path::new(&captures[2]);
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            dir.join(path)
        };
        entries.push(ProgramEntry { size, path });
    }
    Ok(entries)
}

pub fn read_program_list(path: &Path) -> Result<Vec<ProgramEntry>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read program list {}", path.display()))?;
    let dir = path.parent().unwrap_or_else(|| Path::new(""));
    parse_program_list(&text, dir)
}
