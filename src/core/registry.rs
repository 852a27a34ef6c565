//! Command registry and dispatch.
//!
//! Commands are trait objects registered once at startup. The registry fills
//! in help metadata a handler leaves out, and [`CommandRegistry::execute`] is
//! the single place a handler is invoked.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::core::error::{HandlerError, RegistryError};
use crate::core::filesystem::{AbsolutePath, VirtualFs};
use crate::core::history::HistoryManager;
use crate::core::parser::{Flags, is_valid_command};
use crate::core::render::Renderer;

const DEFAULT_DESCRIPTION: &str = "No description available";
const DEFAULT_CATEGORY: &str = "general";

// =============================================================================
// Contexts
// =============================================================================

/// Who is logged in where.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionContext {
    pub user: String,
    pub hostname: String,
}

/// Everything a handler may touch while it runs.
pub struct CommandContext<'a> {
    pub vfs: &'a mut VirtualFs,
    pub terminal: &'a mut dyn Renderer,
    pub session: &'a SessionContext,
    pub history: &'a mut HistoryManager,
    pub registry: &'a CommandRegistry,
}

impl CommandContext<'_> {
    pub fn cwd(&self) -> &AbsolutePath {
        self.vfs.cwd()
    }
}

/// Read-only state available to completion providers.
pub struct CompletionContext<'a> {
    pub vfs: &'a VirtualFs,
    pub registry: &'a CommandRegistry,
}

// =============================================================================
// Handler Trait
// =============================================================================

/// A single executable command.
#[async_trait(?Send)]
pub trait CommandHandler {
    /// The command name (what the user types).
    fn name(&self) -> &str;

    /// One-line description for `help`.
    fn description(&self) -> Option<&str> {
        None
    }

    /// Group shown in `help`.
    fn category(&self) -> Option<&str> {
        None
    }

    /// Usage string, e.g. `ls [-a] [-l] [path]`.
    fn usage(&self) -> Option<&str> {
        None
    }

    /// Full manual text for `man`.
    fn man_page(&self) -> Option<&str> {
        None
    }

    /// Suggestions for the last element of `args`, each a full replacement
    /// for it. `None` means the command does not complete arguments.
    fn complete(&self, _args: &[String], _ctx: &CompletionContext<'_>) -> Option<Vec<String>> {
        None
    }

    /// Run the command.
    ///
    /// Expected failures (bad arguments, missing files) belong in the
    /// returned text; `Err` is for conditions the command did not plan for.
    async fn execute(
        &self,
        args: &[String],
        flags: &Flags,
        ctx: &mut CommandContext<'_>,
    ) -> Result<String, HandlerError>;
}

// =============================================================================
// Registered Commands
// =============================================================================

/// A handler together with its resolved help metadata.
pub struct RegisteredCommand {
    handler: Box<dyn CommandHandler>,
    name: String,
    description: String,
    category: String,
    usage: String,
    man_page: String,
}

impl RegisteredCommand {
    fn new(handler: Box<dyn CommandHandler>) -> Self {
        let name = handler.name().to_string();
        let description = handler.description().unwrap_or(DEFAULT_DESCRIPTION).to_string();
        let category = handler.category().unwrap_or(DEFAULT_CATEGORY).to_string();
        let usage = handler.usage().unwrap_or(&name).to_string();
        let man_page = match handler.man_page() {
            Some(page) => page.to_string(),
            None => generated_man_page(&name, &usage, &description),
        };

        Self {
            handler,
            name,
            description,
            category,
            usage,
            man_page,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    pub fn man_page(&self) -> &str {
        &self.man_page
    }

    pub fn handler(&self) -> &dyn CommandHandler {
        self.handler.as_ref()
    }
}

fn generated_man_page(name: &str, usage: &str, description: &str) -> String {
    format!(
        "NAME\n    {name} - {description}\n\nSYNOPSIS\n    {usage}\n\nDESCRIPTION\n    {description}"
    )
}

/// Result of dispatching a command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandOutput {
    /// Text produced by the command, possibly empty.
    Text(String),
    /// The command failed unexpectedly or does not exist.
    Failure(String),
}

// =============================================================================
// Registry
// =============================================================================

/// Registry of available commands, keyed and listed by name.
#[derive(Default)]
pub struct CommandRegistry {
    commands: BTreeMap<String, RegisteredCommand>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command. Replaces any existing command with the same name.
    pub fn register(&mut self, handler: Box<dyn CommandHandler>) -> Result<(), RegistryError> {
        let name = handler.name();
        if !is_valid_command(name) {
            return Err(RegistryError::InvalidName(name.to_string()));
        }

        let entry = RegisteredCommand::new(handler);
        if self.commands.contains_key(entry.name()) {
            log::warn!("command '{}' registered twice, replacing", entry.name());
        } else {
            log::debug!("registered command '{}'", entry.name());
        }
        self.commands.insert(entry.name.clone(), entry);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&RegisteredCommand> {
        self.commands.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// All command names, sorted.
    pub fn list(&self) -> Vec<&str> {
        self.commands.keys().map(String::as_str).collect()
    }

    /// Commands in `category`, sorted by name.
    pub fn get_by_category(&self, category: &str) -> Vec<&RegisteredCommand> {
        self.commands
            .values()
            .filter(|cmd| cmd.category() == category)
            .collect()
    }

    /// Distinct categories, sorted.
    pub fn get_categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = self.commands.values().map(|c| c.category()).collect();
        categories.sort_unstable();
        categories.dedup();
        categories
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Ask `name`'s completion provider about the last of `args`.
    pub fn completions(
        &self,
        name: &str,
        args: &[String],
        ctx: &CompletionContext<'_>,
    ) -> Option<Vec<String>> {
        self.get(name)?.handler.complete(args, ctx)
    }

    /// Run `name` and fold any handler error into a printable failure.
    pub async fn execute(
        &self,
        name: &str,
        args: &[String],
        flags: &Flags,
        ctx: &mut CommandContext<'_>,
    ) -> CommandOutput {
        let Some(command) = self.get(name) else {
            return CommandOutput::Failure(format!("Error: command not found: {name}"));
        };

        match command.handler.execute(args, flags, ctx).await {
            Ok(text) => CommandOutput::Text(text),
            Err(err) => {
                log::error!("command '{name}' failed: {err}");
                CommandOutput::Failure(format!("Error: {err}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::VfsError;
    use crate::core::parser::parse;
    use crate::core::render::BufferRenderer;

    struct Echo;

    #[async_trait(?Send)]
    impl CommandHandler for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> Option<&str> {
            Some("Print arguments")
        }

        fn category(&self) -> Option<&str> {
            Some("text")
        }

        async fn execute(
            &self,
            args: &[String],
            _flags: &Flags,
            _ctx: &mut CommandContext<'_>,
        ) -> Result<String, HandlerError> {
            Ok(args.join(" "))
        }
    }

    struct Named(&'static str);

    #[async_trait(?Send)]
    impl CommandHandler for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn complete(&self, _args: &[String], _ctx: &CompletionContext<'_>) -> Option<Vec<String>> {
            Some(vec![self.0.to_string()])
        }

        async fn execute(
            &self,
            _args: &[String],
            _flags: &Flags,
            ctx: &mut CommandContext<'_>,
        ) -> Result<String, HandlerError> {
            ctx.vfs.read_file("/etc/shadow")?;
            Ok(String::new())
        }
    }

    struct Fixture {
        vfs: VirtualFs,
        terminal: BufferRenderer,
        session: SessionContext,
        history: HistoryManager,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                vfs: VirtualFs::in_memory(),
                terminal: BufferRenderer::new(),
                session: SessionContext {
                    user: "hacker".into(),
                    hostname: "hacksim".into(),
                },
                history: HistoryManager::in_memory(10),
            }
        }

        async fn run(&mut self, registry: &CommandRegistry, line: &str) -> CommandOutput {
            let cmd = parse(line);
            let mut ctx = CommandContext {
                vfs: &mut self.vfs,
                terminal: &mut self.terminal,
                session: &self.session,
                history: &mut self.history,
                registry,
            };
            registry.execute(&cmd.name, &cmd.args, &cmd.flags, &mut ctx).await
        }
    }

    #[test]
    fn test_register_fills_defaults() {
        let mut registry = CommandRegistry::new();
        registry.register(Box::new(Named("probe"))).unwrap();

        let cmd = registry.get("probe").unwrap();
        assert_eq!(cmd.description(), "No description available");
        assert_eq!(cmd.category(), "general");
        assert_eq!(cmd.usage(), "probe");
        assert!(cmd.man_page().contains("probe - No description available"));
    }

    #[test]
    fn test_register_rejects_invalid_name() {
        let mut registry = CommandRegistry::new();
        assert_eq!(
            registry.register(Box::new(Named("Bad Name"))),
            Err(RegistryError::InvalidName("Bad Name".into()))
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_replaces_duplicate() {
        let mut registry = CommandRegistry::new();
        registry.register(Box::new(Named("echo"))).unwrap();
        registry.register(Box::new(Echo)).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("echo").unwrap().category(), "text");
    }

    #[test]
    fn test_listing_and_categories() {
        let mut registry = CommandRegistry::new();
        registry.register(Box::new(Named("zap"))).unwrap();
        registry.register(Box::new(Echo)).unwrap();
        registry.register(Box::new(Named("apt"))).unwrap();

        assert_eq!(registry.list(), vec!["apt", "echo", "zap"]);
        assert_eq!(registry.get_categories(), vec!["general", "text"]);
        let general: Vec<_> = registry
            .get_by_category("general")
            .iter()
            .map(|c| c.name())
            .collect();
        assert_eq!(general, vec!["apt", "zap"]);
        assert!(registry.has("zap"));
        assert!(!registry.has("zip"));
    }

    #[test]
    fn test_completions_lookup() {
        let mut registry = CommandRegistry::new();
        registry.register(Box::new(Named("probe"))).unwrap();
        registry.register(Box::new(Echo)).unwrap();
        let vfs = VirtualFs::in_memory();
        let ctx = CompletionContext {
            vfs: &vfs,
            registry: &registry,
        };

        assert_eq!(
            registry.completions("probe", &[], &ctx),
            Some(vec!["probe".to_string()])
        );
        assert_eq!(registry.completions("echo", &[], &ctx), None);
        assert_eq!(registry.completions("missing", &[], &ctx), None);
    }

    #[tokio::test]
    async fn test_execute_returns_text() {
        let mut registry = CommandRegistry::new();
        registry.register(Box::new(Echo)).unwrap();
        let mut fixture = Fixture::new();

        assert_eq!(
            fixture.run(&registry, "echo hello world").await,
            CommandOutput::Text("hello world".into())
        );
    }

    #[tokio::test]
    async fn test_execute_converts_handler_error() {
        let mut registry = CommandRegistry::new();
        registry.register(Box::new(Named("probe"))).unwrap();
        let mut fixture = Fixture::new();

        let expected = format!("Error: {}", VfsError::PermissionDenied("/etc/shadow".into()));
        assert_eq!(
            fixture.run(&registry, "probe").await,
            CommandOutput::Failure(expected)
        );
    }

    #[tokio::test]
    async fn test_execute_unknown_command() {
        let registry = CommandRegistry::new();
        let mut fixture = Fixture::new();
        assert_eq!(
            fixture.run(&registry, "nope").await,
            CommandOutput::Failure("Error: command not found: nope".into())
        );
    }
}
