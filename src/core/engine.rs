//! The shell engine.
//!
//! Owns every piece of session state (filesystem, history, registry,
//! completion) and turns submitted lines into command invocations:
//!
//! ```text
//! line -> echo -> parse -> history -> validate name -> lookup
//!      miss: "<name>: command not found" + fuzzy suggestion
//!      hit:  disable input -> execute -> re-enable input -> render
//! ```

use std::cell::Cell;

use crate::config::{ASCII_BANNER, MISS_HINT_THRESHOLD, ShellConfig};
use crate::core::autocomplete::{AutocompleteHandler, CompletionState};
use crate::core::commands::builtin_registry;
use crate::core::filesystem::{AbsolutePath, VirtualFs};
use crate::core::fuzzy;
use crate::core::history::HistoryManager;
use crate::core::parser::{is_valid_command, parse};
use crate::core::registry::{CommandContext, CommandOutput, CommandRegistry, SessionContext};
use crate::core::render::Renderer;
use crate::core::storage::{NullStorage, Storage};

// =============================================================================
// State
// =============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EngineState {
    #[default]
    Idle,
    Executing,
}

/// What happened to a submitted line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A command was already running; the line was ignored.
    Dropped,
    /// Nothing but whitespace.
    Empty,
    /// The command name has characters outside `[a-z0-9-]`.
    InvalidName,
    /// No such command.
    NotFound { suggestion: Option<String> },
    /// The command ran (successfully or not).
    Executed,
}

/// Counts unknown commands in a row.
#[derive(Debug, Default)]
struct MissTracker {
    consecutive: usize,
}

impl MissTracker {
    /// Record a miss. Returns true when it is time to point at `help`.
    fn record_miss(&mut self) -> bool {
        self.consecutive += 1;
        if self.consecutive >= MISS_HINT_THRESHOLD {
            self.consecutive = 0;
            return true;
        }
        false
    }

    fn reset(&mut self) {
        self.consecutive = 0;
    }
}

/// Held while a command runs. Dropping it (also during unwinding) returns
/// the engine to `Idle` and re-enables input.
struct Execution<'a, R: Renderer> {
    state: &'a Cell<EngineState>,
    renderer: &'a mut R,
}

impl<'a, R: Renderer> Execution<'a, R> {
    fn begin(state: &'a Cell<EngineState>, renderer: &'a mut R) -> Self {
        state.set(EngineState::Executing);
        renderer.set_input_enabled(false);
        Self { state, renderer }
    }
}

impl<R: Renderer> Drop for Execution<'_, R> {
    fn drop(&mut self) {
        self.renderer.set_input_enabled(true);
        self.state.set(EngineState::Idle);
    }
}

// =============================================================================
// Engine
// =============================================================================

pub struct ShellEngine<R: Renderer> {
    state: Cell<EngineState>,
    session: SessionContext,
    vfs: VirtualFs,
    history: HistoryManager,
    registry: CommandRegistry,
    autocomplete: AutocompleteHandler,
    misses: MissTracker,
    renderer: R,
}

impl<R: Renderer> ShellEngine<R> {
    /// Engine with the built-in commands, restoring the filesystem and the
    /// history from their storages.
    pub fn new(
        config: ShellConfig,
        renderer: R,
        fs_storage: Box<dyn Storage>,
        history_storage: Box<dyn Storage>,
    ) -> Self {
        let session = SessionContext {
            user: config.user,
            hostname: config.hostname,
        };
        Self::with_parts(
            session,
            VirtualFs::load(fs_storage),
            HistoryManager::load(config.history_capacity, history_storage),
            builtin_registry(),
            renderer,
        )
    }

    /// Engine with default settings and no persistence.
    pub fn in_memory(renderer: R) -> Self {
        Self::new(
            ShellConfig::default(),
            renderer,
            Box::new(NullStorage),
            Box::new(NullStorage),
        )
    }

    /// Engine assembled from ready-made components.
    pub fn with_parts(
        session: SessionContext,
        vfs: VirtualFs,
        history: HistoryManager,
        registry: CommandRegistry,
        renderer: R,
    ) -> Self {
        Self {
            state: Cell::new(EngineState::Idle),
            session,
            vfs,
            history,
            registry,
            autocomplete: AutocompleteHandler::new(),
            misses: MissTracker::default(),
            renderer,
        }
    }

    // -------------------------------------------------------------------------
    // Submission
    // -------------------------------------------------------------------------

    /// Run one submitted line.
    ///
    /// Callers that share the engine behind a `RefCell` cannot reach this
    /// while a command runs; their failed borrow is what drops the input.
    /// The state check covers anything that submits through its own handle
    /// to an engine already marked [`EngineState::Executing`].
    pub async fn submit(&mut self, line: &str) -> SubmitOutcome {
        if self.state.get() == EngineState::Executing {
            log::debug!("dropping input while a command runs");
            return SubmitOutcome::Dropped;
        }

        let prompt = self.prompt();
        self.renderer.render_input(&prompt, line);
        self.autocomplete.reset();

        let cmd = parse(line);
        if cmd.is_empty() {
            return SubmitOutcome::Empty;
        }
        self.history.add(line);

        if !is_valid_command(&cmd.name) {
            self.renderer
                .render_error(&format!("hackshell: invalid command name: {}", cmd.name));
            return SubmitOutcome::InvalidName;
        }

        if !self.registry.has(&cmd.name) {
            return self.command_not_found(&cmd.name);
        }
        self.misses.reset();

        log::debug!("executing '{}'", cmd.name);
        let output = {
            let mut exec = Execution::begin(&self.state, &mut self.renderer);
            let mut ctx = CommandContext {
                vfs: &mut self.vfs,
                terminal: &mut *exec.renderer,
                session: &self.session,
                history: &mut self.history,
                registry: &self.registry,
            };
            self.registry
                .execute(&cmd.name, &cmd.args, &cmd.flags, &mut ctx)
                .await
        };

        match output {
            CommandOutput::Text(text) if text.is_empty() => {}
            CommandOutput::Text(text) => self.renderer.render_output(&text),
            CommandOutput::Failure(msg) => self.renderer.render_error(&msg),
        }
        SubmitOutcome::Executed
    }

    fn command_not_found(&mut self, name: &str) -> SubmitOutcome {
        self.renderer
            .render_error(&format!("{name}: command not found"));

        let suggestion = fuzzy::suggest(name, &self.registry.list()).map(str::to_string);
        if let Some(s) = &suggestion {
            self.renderer.render_info(&format!("Did you mean '{s}'?"));
        }
        if self.misses.record_miss() {
            self.renderer
                .render_info("Type 'help' to see the available commands.");
        }
        SubmitOutcome::NotFound { suggestion }
    }

    /// Print the banner and a pointer to `help`.
    pub fn welcome(&mut self) {
        self.renderer.render_output(ASCII_BANNER.trim_end());
        self.renderer
            .render_info(&format!("Welcome, {}. Type 'help' to get started.", self.session.user));
    }

    // -------------------------------------------------------------------------
    // Input line
    // -------------------------------------------------------------------------

    /// `user@host:path` with the home directory shown as `~`.
    pub fn prompt(&self) -> String {
        let path = self.vfs.cwd().display_from_home(&AbsolutePath::home());
        format!("{}@{}:{}", self.session.user, self.session.hostname, path)
    }

    /// Tab: the completed input line, or `None` to leave it alone.
    pub fn complete(&mut self, input: &str) -> Option<String> {
        self.autocomplete.complete(input, &self.registry, &self.vfs)
    }

    /// Arrow Up.
    pub fn history_previous(&mut self) -> Option<String> {
        self.history.previous()
    }

    /// Arrow Down.
    pub fn history_next(&mut self) -> String {
        self.history.next()
    }

    /// Any other key: stop cycling completions and browsing history.
    pub fn on_keystroke(&mut self) {
        self.autocomplete.reset();
        self.history.reset_index();
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn state(&self) -> EngineState {
        self.state.get()
    }

    pub fn completion_state(&self) -> &CompletionState {
        self.autocomplete.state()
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn vfs(&self) -> &VirtualFs {
        &self.vfs
    }

    pub fn vfs_mut(&mut self) -> &mut VirtualFs {
        &mut self.vfs
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::core::error::HandlerError;
    use crate::core::parser::Flags;
    use crate::core::registry::CommandHandler;
    use crate::core::render::{BufferRenderer, Rendered};
    use crate::core::storage::MemoryStorage;

    fn engine() -> ShellEngine<BufferRenderer> {
        ShellEngine::in_memory(BufferRenderer::new())
    }

    struct Broken;

    #[async_trait(?Send)]
    impl CommandHandler for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        async fn execute(
            &self,
            _args: &[String],
            _flags: &Flags,
            ctx: &mut CommandContext<'_>,
        ) -> Result<String, HandlerError> {
            ctx.terminal.render_info("working");
            Err(HandlerError::failed("disk on fire"))
        }
    }

    #[tokio::test]
    async fn test_executes_and_renders() {
        let mut sh = engine();
        assert_eq!(sh.submit("pwd").await, SubmitOutcome::Executed);
        assert_eq!(
            sh.renderer().lines,
            vec![
                Rendered::Input {
                    prompt: "hacker@hacksim:~".into(),
                    line: "pwd".into()
                },
                Rendered::Output("/home/hacker".into()),
            ]
        );
        assert_eq!(sh.history().entries(), vec!["pwd"]);
    }

    #[tokio::test]
    async fn test_empty_output_is_not_rendered() {
        let mut sh = engine();
        sh.submit("cd /tmp").await;
        assert_eq!(sh.renderer().lines.len(), 1);
        assert_eq!(sh.prompt(), "hacker@hacksim:/tmp");
    }

    #[tokio::test]
    async fn test_empty_line() {
        let mut sh = engine();
        assert_eq!(sh.submit("   ").await, SubmitOutcome::Empty);
        assert!(sh.history().is_empty());
        assert_eq!(sh.renderer().lines.len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_name() {
        let mut sh = engine();
        assert_eq!(sh.submit("rm! x").await, SubmitOutcome::InvalidName);
        assert_eq!(
            sh.renderer().errors(),
            vec!["hackshell: invalid command name: rm!"]
        );
        assert_eq!(sh.history().entries(), vec!["rm! x"]);
    }

    #[tokio::test]
    async fn test_command_not_found_suggests() {
        let mut sh = engine();
        assert_eq!(
            sh.submit("mkdri x").await,
            SubmitOutcome::NotFound {
                suggestion: Some("mkdir".into())
            }
        );
        assert_eq!(sh.renderer().errors(), vec!["mkdri: command not found"]);
        assert_eq!(sh.renderer().infos(), vec!["Did you mean 'mkdir'?"]);
        assert!(!sh.vfs().exists("x"));
    }

    #[tokio::test]
    async fn test_miss_hint_after_threshold() {
        let mut sh = engine();
        for _ in 0..MISS_HINT_THRESHOLD {
            sh.submit("zzzzzz").await;
        }
        assert_eq!(
            sh.renderer().infos(),
            vec!["Type 'help' to see the available commands."]
        );
    }

    #[tokio::test]
    async fn test_hit_resets_miss_count() {
        let mut sh = engine();
        sh.submit("zzzzzz").await;
        sh.submit("zzzzzz").await;
        sh.submit("pwd").await;
        sh.submit("zzzzzz").await;
        assert!(sh.renderer().infos().is_empty());
    }

    #[tokio::test]
    async fn test_input_disabled_during_execution() {
        let mut sh = engine();
        sh.submit("whoami").await;
        assert_eq!(sh.renderer().input_toggles, vec![false, true]);
        assert!(sh.renderer().input_enabled);
        assert_eq!(sh.state(), EngineState::Idle);
    }

    #[tokio::test]
    async fn test_handler_failure_is_rendered_and_input_restored() {
        let mut registry = builtin_registry();
        registry.register(Box::new(Broken)).unwrap();
        let mut sh = ShellEngine::with_parts(
            SessionContext {
                user: "neo".into(),
                hostname: "matrix".into(),
            },
            VirtualFs::in_memory(),
            HistoryManager::in_memory(5),
            registry,
            BufferRenderer::new(),
        );

        assert_eq!(sh.submit("broken").await, SubmitOutcome::Executed);
        assert_eq!(sh.renderer().infos(), vec!["working"]);
        assert_eq!(sh.renderer().errors(), vec!["Error: disk on fire"]);
        assert!(sh.renderer().input_enabled);
        assert_eq!(sh.state(), EngineState::Idle);
    }

    #[tokio::test]
    async fn test_submission_while_executing_is_dropped() {
        let mut sh = engine();
        sh.state.set(EngineState::Executing);
        assert_eq!(sh.submit("pwd").await, SubmitOutcome::Dropped);
        assert!(sh.renderer().lines.is_empty());
        assert!(sh.history().is_empty());
    }

    #[tokio::test]
    async fn test_history_navigation_and_keystroke() {
        let mut sh = engine();
        sh.submit("ls").await;
        sh.submit("pwd").await;
        assert_eq!(sh.history_previous().as_deref(), Some("pwd"));
        assert_eq!(sh.history_previous().as_deref(), Some("ls"));
        sh.on_keystroke();
        assert_eq!(sh.history_previous().as_deref(), Some("pwd"));
        assert_eq!(sh.history_next(), "");
    }

    #[tokio::test]
    async fn test_repeated_command_recalled() {
        let mut sh = engine();
        sh.submit("pwd").await;
        sh.history_previous();
        sh.submit("pwd").await;
        assert_eq!(sh.history().len(), 1);
        assert_eq!(sh.history_previous().as_deref(), Some("pwd"));
    }

    #[test]
    fn test_complete_and_keystroke_reset() {
        let mut sh = engine();
        assert_eq!(sh.complete("c").as_deref(), Some("cat"));
        assert!(matches!(sh.completion_state(), CompletionState::Cycling { .. }));
        sh.on_keystroke();
        assert_eq!(sh.completion_state(), &CompletionState::Idle);
    }

    #[tokio::test]
    async fn test_state_survives_restart() {
        let fs = MemoryStorage::new();
        let hist = MemoryStorage::new();

        let mut first = ShellEngine::new(
            ShellConfig::default(),
            BufferRenderer::new(),
            Box::new(fs.clone()),
            Box::new(hist.clone()),
        );
        first.submit("mkdir /tmp/kept").await;
        first.submit("cd /tmp/kept").await;

        let second = ShellEngine::new(
            ShellConfig::default(),
            BufferRenderer::new(),
            Box::new(fs),
            Box::new(hist),
        );
        assert!(second.vfs().is_directory("/tmp/kept"));
        assert_eq!(second.prompt(), "hacker@hacksim:/tmp/kept");
        assert_eq!(second.history().entries(), vec!["mkdir /tmp/kept", "cd /tmp/kept"]);
    }

    #[test]
    fn test_welcome() {
        let mut sh = engine();
        sh.welcome();
        assert_eq!(sh.renderer().outputs().len(), 1);
        assert!(sh.renderer().infos()[0].contains("help"));
    }
}
