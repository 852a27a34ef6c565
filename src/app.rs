//! Root application module.
//!
//! Contains the App component, the reactive [`TerminalState`] and the
//! [`TerminalRenderer`] that lets the shell engine draw into it.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;

use crate::components::terminal::Terminal;
use crate::config::{MAX_TERMINAL_HISTORY, ShellConfig, storage_keys};
use crate::core::{Renderer, ShellEngine};
use crate::models::OutputLine;
use crate::utils::{RingBuffer, dom};

// ============================================================================
// TerminalState
// ============================================================================

/// Terminal view state held in Leptos signals.
///
/// Output uses a [`RingBuffer`] so the scrollback stays bounded by
/// `MAX_TERMINAL_HISTORY` lines with O(1) pushes.
#[derive(Clone, Copy)]
pub struct TerminalState {
    pub lines: RwSignal<RingBuffer<OutputLine>>,
    /// Prompt shown in front of the input line.
    pub prompt: RwSignal<String>,
    /// False while a command runs.
    pub input_enabled: RwSignal<bool>,
}

impl TerminalState {
    pub fn new() -> Self {
        Self {
            lines: RwSignal::new(RingBuffer::new(MAX_TERMINAL_HISTORY)),
            prompt: RwSignal::new(String::new()),
            input_enabled: RwSignal::new(true),
        }
    }

    pub fn push_output(&self, line: OutputLine) {
        self.lines.update(|buf| {
            buf.push(line);
        });
    }

    /// Push one output line per line of `text`.
    fn push_text(&self, text: &str, make: fn(String) -> OutputLine) {
        self.lines.update(|buf| {
            for line in text.split('\n') {
                buf.push(make(line.to_string()));
            }
        });
    }

    pub fn clear(&self) {
        self.lines.update(|buf| buf.clear());
    }
}

impl Default for TerminalState {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TerminalRenderer
// ============================================================================

/// [`Renderer`] that appends to a [`TerminalState`].
#[derive(Clone, Copy)]
pub struct TerminalRenderer {
    state: TerminalState,
}

impl TerminalRenderer {
    pub fn new(state: TerminalState) -> Self {
        Self { state }
    }
}

impl Renderer for TerminalRenderer {
    fn render_input(&mut self, prompt: &str, line: &str) {
        self.state.push_output(OutputLine::command(prompt, line));
    }

    fn render_output(&mut self, text: &str) {
        self.state.push_text(text, OutputLine::text);
    }

    fn render_error(&mut self, text: &str) {
        self.state.push_text(text, OutputLine::error);
    }

    fn render_info(&mut self, text: &str) {
        self.state.push_text(text, OutputLine::info);
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.state.input_enabled.set(enabled);
    }

    fn clear(&mut self) {
        self.state.clear();
    }
}

// ============================================================================
// ShellContext
// ============================================================================

pub type SharedEngine = Rc<RefCell<ShellEngine<TerminalRenderer>>>;

/// Application-wide context, provided at the root of the component tree.
///
/// The engine is not `Send`, so it lives in a local [`StoredValue`]. A
/// `RefCell` borrow that fails means a command is still running.
#[derive(Clone, Copy)]
pub struct ShellContext {
    pub terminal: TerminalState,
    pub engine: StoredValue<SharedEngine, LocalStorage>,
}

impl ShellContext {
    /// Boot a shell whose filesystem and history persist in localStorage.
    pub fn new() -> Self {
        let terminal = TerminalState::new();
        let mut engine = ShellEngine::new(
            ShellConfig::default(),
            TerminalRenderer::new(terminal),
            Box::new(dom::LocalStorage::new(storage_keys::FILESYSTEM)),
            Box::new(dom::LocalStorage::new(storage_keys::HISTORY)),
        );
        engine.welcome();
        terminal.prompt.set(engine.prompt());
        log::info!("shell ready at {}", engine.vfs().cwd());

        Self {
            terminal,
            engine: StoredValue::new_local(Rc::new(RefCell::new(engine))),
        }
    }

    /// Run `f` against the engine unless a command holds it.
    pub fn with_engine<T>(
        &self,
        f: impl FnOnce(&mut ShellEngine<TerminalRenderer>) -> T,
    ) -> Option<T> {
        let engine = self.engine.get_value();
        let mut shell = engine.try_borrow_mut().ok()?;
        Some(f(&mut shell))
    }

    /// Submit a line. Input arriving while a command runs is dropped.
    pub fn submit(&self, line: String) {
        let engine = self.engine.get_value();
        let prompt = self.terminal.prompt;
        wasm_bindgen_futures::spawn_local(run_line(engine, line, prompt));
    }
}

impl Default for ShellContext {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(clippy::await_holding_refcell_ref)]
async fn run_line(engine: SharedEngine, line: String, prompt: RwSignal<String>) {
    let Ok(mut shell) = engine.try_borrow_mut() else {
        log::debug!("shell busy, dropping '{line}'");
        return;
    };
    shell.submit(&line).await;
    prompt.set(shell.prompt());
}

/// Root application component with error boundary.
#[component]
pub fn App() -> impl IntoView {
    let ctx = ShellContext::new();
    provide_context(ctx);

    view! {
        <ErrorBoundary
            fallback=|errors| view! {
                <div style="
                    display: flex;
                    flex-direction: column;
                    align-items: center;
                    justify-content: center;
                    height: 100vh;
                    background: #0a0e27;
                    color: #e0e0e0;
                    font-family: 'Courier New', monospace;
                ">
                    <h1 style="color: #ff6b6b;">"Something went wrong"</h1>
                    <ul style="color: #ff6b6b;">
                        {move || errors.get()
                            .into_iter()
                            .map(|(_, e)| view! { <li>{e.to_string()}</li> })
                            .collect::<Vec<_>>()
                        }
                    </ul>
                    <button on:click=move |_| {
                        if let Some(window) = dom::window() {
                            let _ = window.location().reload();
                        }
                    }>
                        "Reload Page"
                    </button>
                </div>
            }
        >
            <Terminal />
        </ErrorBoundary>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MemoryStorage;

    fn shared_engine(terminal: TerminalState) -> SharedEngine {
        Rc::new(RefCell::new(ShellEngine::new(
            ShellConfig::default(),
            TerminalRenderer::new(terminal),
            Box::new(MemoryStorage::new()),
            Box::new(MemoryStorage::new()),
        )))
    }

    #[tokio::test]
    async fn test_line_submitted_while_busy_is_dropped() {
        let owner = Owner::new();
        let terminal = owner.with(TerminalState::new);
        let engine = shared_engine(terminal);

        let running = engine.borrow();
        run_line(engine.clone(), "touch /tmp/x".into(), terminal.prompt).await;
        drop(running);
        assert!(!engine.borrow().vfs().exists("/tmp/x"));
        assert!(terminal.lines.with_untracked(|buf| buf.is_empty()));

        run_line(engine.clone(), "cd /tmp".into(), terminal.prompt).await;
        assert_eq!(terminal.prompt.get_untracked(), "hacker@hacksim:/tmp");
    }

    #[test]
    fn test_renderer_splits_lines_and_clears() {
        let owner = Owner::new();
        owner.with(|| {
            let state = TerminalState::new();
            let mut renderer = TerminalRenderer::new(state);
            renderer.render_output("a\nb");
            renderer.render_error("oops");
            assert_eq!(state.lines.with_untracked(|buf| buf.len()), 3);

            renderer.set_input_enabled(false);
            assert!(!state.input_enabled.get_untracked());

            renderer.clear();
            assert!(state.lines.with_untracked(|buf| buf.is_empty()));
        });
    }
}
