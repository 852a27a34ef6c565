//! Built-in commands.
//!
//! Every command is a unit struct implementing [`CommandHandler`]:
//! - `navigation`: `cd`, `pwd`, `ls`
//! - `files`: `cat`, `mkdir`, `touch`, `rm`, `cp`, `mv`
//! - `session`: `echo`, `whoami`, `hostname`, `clear`, `help`, `man`,
//!   `history`, `reset`
//!
//! Expected failures come back as text in the usual `<command>: <problem>`
//! form; they are not errors as far as the registry is concerned.

mod files;
mod navigation;
mod session;

use crate::core::autocomplete::{PathFilter, complete_path};
use crate::core::error::VfsError;
use crate::core::parser::Flags;
use crate::core::registry::{CommandHandler, CommandRegistry, CompletionContext};

/// Register every built-in command.
pub fn register_builtins(registry: &mut CommandRegistry) {
    let handlers: Vec<Box<dyn CommandHandler>> = vec![
        Box::new(navigation::Cd),
        Box::new(navigation::Pwd),
        Box::new(navigation::Ls),
        Box::new(files::Cat),
        Box::new(files::Mkdir),
        Box::new(files::Touch),
        Box::new(files::Rm),
        Box::new(files::Cp),
        Box::new(files::Mv),
        Box::new(session::Echo),
        Box::new(session::Whoami),
        Box::new(session::Hostname),
        Box::new(session::Clear),
        Box::new(session::Help),
        Box::new(session::Man),
        Box::new(session::History),
        Box::new(session::Reset),
    ];

    for handler in handlers {
        if let Err(err) = registry.register(handler) {
            log::error!("built-in command rejected: {err}");
        }
    }
}

/// A registry holding just the built-in commands.
pub fn builtin_registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();
    register_builtins(&mut registry);
    registry
}

// =============================================================================
// Helpers
// =============================================================================

/// `"<command>: <error>"`.
fn fail(command: &str, err: VfsError) -> String {
    format!("{command}: {err}")
}

fn missing_operand(command: &str) -> String {
    format!("{command}: missing operand")
}

/// The word being completed.
fn last_word(args: &[String]) -> &str {
    args.last().map(String::as_str).unwrap_or_default()
}

fn paths(args: &[String], ctx: &CompletionContext<'_>) -> Option<Vec<String>> {
    Some(complete_path(last_word(args), ctx.vfs, PathFilter::Any))
}

fn directories(args: &[String], ctx: &CompletionContext<'_>) -> Option<Vec<String>> {
    Some(complete_path(last_word(args), ctx.vfs, PathFilter::Directories))
}

/// Names of every flag given, for commands that accept switches but
/// ignore them.
fn all_flags(flags: &Flags) -> Vec<&str> {
    flags.iter().map(|(name, _)| name).collect()
}

/// Join non-empty output pieces with newlines.
fn join_lines(lines: Vec<String>) -> String {
    lines
        .into_iter()
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

// =============================================================================
// Tests
// =============================================================================
