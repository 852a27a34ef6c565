//! Tab completion for command names and arguments.
//!
//! - A single word completes against registered command names
//! - Further words go to the command's own completion provider, which
//!   usually completes paths via [`complete_path`]
//!
//! Results:
//! - No match: the input is left alone
//! - Single match: complete immediately
//! - Multiple matches: insert the first, then rotate through the rest on
//!   each further Tab

use crate::core::filesystem::VirtualFs;
use crate::core::registry::{CommandRegistry, CompletionContext};

// ============================================================================
// Public Types
// ============================================================================

/// Completion state between Tab presses.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CompletionState {
    #[default]
    Idle,
    /// Several candidates were found; `index` is the one currently shown.
    Cycling { matches: Vec<String>, index: usize },
}

/// Which entries [`complete_path`] offers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathFilter {
    Any,
    Directories,
}

// ============================================================================
// Handler
// ============================================================================

#[derive(Debug, Default)]
pub struct AutocompleteHandler {
    state: CompletionState,
}

impl AutocompleteHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &CompletionState {
        &self.state
    }

    /// Forget any cycle. Called on every manual keystroke.
    pub fn reset(&mut self) {
        self.state = CompletionState::Idle;
    }

    /// Handle a Tab press. Returns the new input line, or `None` to leave
    /// the input unchanged.
    pub fn complete(
        &mut self,
        input: &str,
        registry: &CommandRegistry,
        vfs: &VirtualFs,
    ) -> Option<String> {
        if let CompletionState::Cycling { matches, index } = &mut self.state
            && matches.iter().any(|m| m == input)
        {
            *index = (*index + 1) % matches.len();
            return Some(matches[*index].clone());
        }

        let mut matches = candidates(input, registry, vfs);
        match matches.len() {
            0 => {
                self.state = CompletionState::Idle;
                None
            }
            1 => {
                self.state = CompletionState::Idle;
                matches.pop()
            }
            _ => {
                let first = matches[0].clone();
                self.state = CompletionState::Cycling { matches, index: 0 };
                Some(first)
            }
        }
    }
}

// ============================================================================
// Candidate Lookup
// ============================================================================

/// Full replacement lines for `input`.
fn candidates(input: &str, registry: &CommandRegistry, vfs: &VirtualFs) -> Vec<String> {
    let words: Vec<&str> = input.split_whitespace().collect();
    let trailing_space = input.ends_with(char::is_whitespace);

    match words.as_slice() {
        [] => Vec::new(),
        [partial] if !trailing_space => match complete_command(partial, registry).as_slice() {
            [only] => vec![format!("{only} ")],
            many => many.to_vec(),
        },
        [name, rest @ ..] => {
            let (leading, args): (&[&str], Vec<String>) = if trailing_space {
                let mut args: Vec<String> = rest.iter().map(|s| s.to_string()).collect();
                args.push(String::new());
                (words.as_slice(), args)
            } else {
                (&words[..words.len() - 1], rest.iter().map(|s| s.to_string()).collect())
            };

            let ctx = CompletionContext { vfs, registry };
            let suggestions = registry
                .completions(&name.to_lowercase(), &args, &ctx)
                .unwrap_or_default();

            let prefix = leading.join(" ");
            suggestions
                .into_iter()
                .map(|s| format!("{prefix} {s}"))
                .collect()
        }
    }
}

/// Registered command names starting with `partial` (case-insensitive).
pub fn complete_command(partial: &str, registry: &CommandRegistry) -> Vec<String> {
    let partial = partial.to_lowercase();
    registry
        .list()
        .into_iter()
        .filter(|name| name.starts_with(&partial))
        .map(str::to_string)
        .collect()
}

/// Complete the entry name after the last `/` of `partial`.
///
/// Returned values keep the directory part as typed and end in `/` for
/// directories. Dot-entries are only offered once the name being completed
/// starts with `.`; unreadable directories offer nothing.
pub fn complete_path(partial: &str, vfs: &VirtualFs, filter: PathFilter) -> Vec<String> {
    let (dir_part, name_part) = match partial.rfind('/') {
        Some(idx) => (&partial[..=idx], &partial[idx + 1..]),
        None => ("", partial),
    };

    let Ok(entries) = vfs.list_directory(dir_part) else {
        return Vec::new();
    };

    let show_hidden = name_part.starts_with('.');
    entries
        .into_iter()
        .filter(|e| e.name.starts_with(name_part))
        .filter(|e| show_hidden || !e.name.starts_with('.'))
        .filter(|e| filter == PathFilter::Any || e.is_dir)
        .map(|e| {
            let suffix = if e.is_dir { "/" } else { "" };
            format!("{dir_part}{}{suffix}", e.name)
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
