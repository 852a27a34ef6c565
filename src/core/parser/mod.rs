//! Command-line parser.
//!
//! Turns a raw line into a [`ParsedCommand`]: a lower-cased command name,
//! positional arguments in order, and a flag map. Flag rules, applied left to
//! right over the tokens after the name:
//!
//! - `--name=value` is a long flag with a value
//! - `--name` takes the next token as its value unless that token starts
//!   with `-`, otherwise it is a switch
//! - `-xyz` (one dash, two or more characters, no digits) sets each of
//!   `x`, `y`, `z`
//! - `-x` and digit-containing flags such as `-n5` follow the `--name` rule
//! - `-`, `--` and everything else are positional
//!
//! `-p80` is therefore a flag named `p80`, not `p` with value `80`.

mod lexer;

pub use lexer::Lexer;

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

static COMMAND_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("^[a-z0-9-]+$").unwrap_or_else(|err| panic!("command name pattern: {err}"))
});

/// Whether `name` is an acceptable command name (`[a-z0-9-]+`).
pub fn is_valid_command(name: &str) -> bool {
    COMMAND_NAME.is_match(name)
}

// =============================================================================
// Flags
// =============================================================================

/// Value of a parsed flag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FlagValue {
    /// Present without a value.
    Enabled,
    /// Present with a value.
    Value(String),
}

impl FlagValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Enabled => None,
            Self::Value(v) => Some(v),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct FlagEntry {
    value: FlagValue,
    /// For values taken from the following token: how many positional
    /// arguments preceded it, and its token index.
    consumed_at: Option<(usize, usize)>,
}

/// Flags of a parsed command, keyed by name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Flags {
    entries: BTreeMap<String, FlagEntry>,
}

impl Flags {
    pub fn get(&self, name: &str) -> Option<&FlagValue> {
        self.entries.get(name).map(|e| &e.value)
    }

    pub fn has(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// True if any of `names` is present.
    pub fn any(&self, names: &[&str]) -> bool {
        names.iter().any(|n| self.has(n))
    }

    /// The string value of a flag, if it has one.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FlagValue::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FlagValue)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), &e.value))
    }

    /// Positional arguments with the values swallowed by boolean `switches`
    /// put back where they were typed.
    ///
    /// `ls -l /home` parses `/home` as the value of `l`; a command that
    /// treats `-l` as a plain switch calls `operands(args, &["l"])` to get
    /// `["/home"]` back.
    pub fn operands(&self, args: &[String], switches: &[&str]) -> Vec<String> {
        let mut swallowed: Vec<(usize, usize, &str)> = switches
            .iter()
            .filter_map(|name| self.entries.get(*name))
            .filter_map(|entry| match (&entry.value, entry.consumed_at) {
                (FlagValue::Value(v), Some((position, token))) => {
                    Some((position, token, v.as_str()))
                }
                _ => None,
            })
            .collect();
        swallowed.sort_unstable();
        swallowed.dedup();

        let mut operands = args.to_vec();
        for (inserted, (position, _, value)) in swallowed.into_iter().enumerate() {
            let at = (position + inserted).min(operands.len());
            operands.insert(at, value.to_string());
        }
        operands
    }

    fn set(&mut self, name: &str, value: FlagValue, consumed_at: Option<(usize, usize)>) {
        self.entries
            .insert(name.to_string(), FlagEntry { value, consumed_at });
    }
}

// =============================================================================
// Parsed Command
// =============================================================================

/// A single parsed command line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParsedCommand {
    pub name: String,
    pub args: Vec<String>,
    pub flags: Flags,
}

impl ParsedCommand {
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }
}

// =============================================================================
// Parser
// =============================================================================

/// Parse a raw input line.
pub fn parse(line: &str) -> ParsedCommand {
    let tokens = Lexer::new(line).tokenize();
    let mut tokens = tokens.into_iter().enumerate().peekable();

    let Some((_, name)) = tokens.next() else {
        return ParsedCommand::default();
    };

    let mut args = Vec::new();
    let mut flags = Flags::default();

    while let Some((_, token)) = tokens.next() {
        let long = token.strip_prefix("--").filter(|l| !l.is_empty());
        let short = token
            .strip_prefix('-')
            .filter(|s| !s.is_empty() && !s.starts_with('-'));

        let (flag, inline) = if let Some(long) = long {
            match long.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (long, None),
            }
        } else if let Some(short) = short {
            if short.chars().count() >= 2 && !short.chars().any(|c| c.is_ascii_digit()) {
                for c in short.chars() {
                    flags.set(&c.to_string(), FlagValue::Enabled, None);
                }
                continue;
            }
            (short, None)
        } else {
            args.push(token);
            continue;
        };

        if let Some(value) = inline {
            flags.set(flag, FlagValue::Value(value.to_string()), None);
            continue;
        }

        match tokens.next_if(|(_, next)| !next.starts_with('-')) {
            Some((index, value)) => {
                flags.set(flag, FlagValue::Value(value), Some((args.len(), index)));
            }
            None => flags.set(flag, FlagValue::Enabled, None),
        }
    }

    ParsedCommand {
        name: name.to_lowercase(),
        args,
        flags,
    }
}

// =============================================================================
// Tests
// =============================================================================
