//! Session and shell commands.

use async_trait::async_trait;

use crate::core::autocomplete::complete_command;
use crate::core::error::HandlerError;
use crate::core::parser::Flags;
use crate::core::registry::{CommandContext, CommandHandler, CompletionContext};

use super::{all_flags, last_word};

pub struct Echo;

#[async_trait(?Send)]
impl CommandHandler for Echo {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> Option<&str> {
        Some("Print text")
    }

    fn usage(&self) -> Option<&str> {
        Some("echo [text...]")
    }

    async fn execute(
        &self,
        args: &[String],
        flags: &Flags,
        _ctx: &mut CommandContext<'_>,
    ) -> Result<String, HandlerError> {
        Ok(flags.operands(args, &all_flags(flags)).join(" "))
    }
}

pub struct Whoami;

#[async_trait(?Send)]
impl CommandHandler for Whoami {
    fn name(&self) -> &str {
        "whoami"
    }

    fn description(&self) -> Option<&str> {
        Some("Print the current user")
    }

    fn category(&self) -> Option<&str> {
        Some("system")
    }

    async fn execute(
        &self,
        _args: &[String],
        _flags: &Flags,
        ctx: &mut CommandContext<'_>,
    ) -> Result<String, HandlerError> {
        Ok(ctx.session.user.clone())
    }
}

pub struct Hostname;

#[async_trait(?Send)]
impl CommandHandler for Hostname {
    fn name(&self) -> &str {
        "hostname"
    }

    fn description(&self) -> Option<&str> {
        Some("Print the machine name")
    }

    fn category(&self) -> Option<&str> {
        Some("system")
    }

    async fn execute(
        &self,
        _args: &[String],
        _flags: &Flags,
        ctx: &mut CommandContext<'_>,
    ) -> Result<String, HandlerError> {
        Ok(ctx.session.hostname.clone())
    }
}

pub struct Clear;

#[async_trait(?Send)]
impl CommandHandler for Clear {
    fn name(&self) -> &str {
        "clear"
    }

    fn description(&self) -> Option<&str> {
        Some("Clear the screen")
    }

    fn category(&self) -> Option<&str> {
        Some("system")
    }

    async fn execute(
        &self,
        _args: &[String],
        _flags: &Flags,
        ctx: &mut CommandContext<'_>,
    ) -> Result<String, HandlerError> {
        ctx.terminal.clear();
        Ok(String::new())
    }
}

// =============================================================================
// Help
// =============================================================================

pub struct Help;

#[async_trait(?Send)]
impl CommandHandler for Help {
    fn name(&self) -> &str {
        "help"
    }

    fn description(&self) -> Option<&str> {
        Some("List available commands")
    }

    fn category(&self) -> Option<&str> {
        Some("help")
    }

    fn usage(&self) -> Option<&str> {
        Some("help [category]")
    }

    fn complete(&self, args: &[String], ctx: &CompletionContext<'_>) -> Option<Vec<String>> {
        let partial = last_word(args);
        Some(
            ctx.registry
                .get_categories()
                .into_iter()
                .filter(|c| c.starts_with(partial))
                .map(str::to_string)
                .collect(),
        )
    }

    async fn execute(
        &self,
        args: &[String],
        _flags: &Flags,
        ctx: &mut CommandContext<'_>,
    ) -> Result<String, HandlerError> {
        let registry = ctx.registry;
        let categories: Vec<&str> = match args.first() {
            Some(wanted) if registry.get_categories().contains(&wanted.as_str()) => {
                vec![wanted.as_str()]
            }
            Some(wanted) => return Ok(format!("help: no such category: {wanted}")),
            None => registry.get_categories(),
        };

        let width = registry.list().iter().map(|n| n.len()).max().unwrap_or(0);
        let mut out = vec!["Available commands:".to_string()];
        for category in categories {
            out.push(String::new());
            out.push(format!("  {category}"));
            for cmd in registry.get_by_category(category) {
                out.push(format!("    {:<width$}  {}", cmd.name(), cmd.description()));
            }
        }
        out.push(String::new());
        out.push("Type 'man <command>' for details on a command.".to_string());
        Ok(out.join("\n"))
    }
}

pub struct Man;

#[async_trait(?Send)]
impl CommandHandler for Man {
    fn name(&self) -> &str {
        "man"
    }

    fn description(&self) -> Option<&str> {
        Some("Show the manual page of a command")
    }

    fn category(&self) -> Option<&str> {
        Some("help")
    }

    fn usage(&self) -> Option<&str> {
        Some("man <command>")
    }

    fn complete(&self, args: &[String], ctx: &CompletionContext<'_>) -> Option<Vec<String>> {
        Some(complete_command(last_word(args), ctx.registry))
    }

    async fn execute(
        &self,
        args: &[String],
        _flags: &Flags,
        ctx: &mut CommandContext<'_>,
    ) -> Result<String, HandlerError> {
        let Some(topic) = args.first() else {
            return Ok("What manual page do you want?".to_string());
        };
        Ok(match ctx.registry.get(&topic.to_lowercase()) {
            Some(cmd) => cmd.man_page().to_string(),
            None => format!("No manual entry for {topic}"),
        })
    }
}

// =============================================================================
// History and Reset
// =============================================================================

pub struct History;

#[async_trait(?Send)]
impl CommandHandler for History {
    fn name(&self) -> &str {
        "history"
    }

    fn description(&self) -> Option<&str> {
        Some("Show or clear the command history")
    }

    fn category(&self) -> Option<&str> {
        Some("system")
    }

    fn usage(&self) -> Option<&str> {
        Some("history [-c]")
    }

    async fn execute(
        &self,
        _args: &[String],
        flags: &Flags,
        ctx: &mut CommandContext<'_>,
    ) -> Result<String, HandlerError> {
        if flags.has("c") {
            ctx.history.clear();
            return Ok(String::new());
        }

        let width = ctx.history.len().to_string().len();
        Ok(ctx
            .history
            .iter()
            .enumerate()
            .map(|(i, line)| format!("  {:>width$}  {line}", i + 1))
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

pub struct Reset;

#[async_trait(?Send)]
impl CommandHandler for Reset {
    fn name(&self) -> &str {
        "reset"
    }

    fn description(&self) -> Option<&str> {
        Some("Restore the filesystem to its initial state")
    }

    fn category(&self) -> Option<&str> {
        Some("system")
    }

    async fn execute(
        &self,
        _args: &[String],
        _flags: &Flags,
        ctx: &mut CommandContext<'_>,
    ) -> Result<String, HandlerError> {
        ctx.vfs.reset();
        log::info!("filesystem reset to the stock tree");
        Ok("Filesystem restored to its initial state.".to_string())
    }
}
