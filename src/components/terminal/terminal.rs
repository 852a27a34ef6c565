//! Terminal view component.
//!
//! Scrollback plus the input line, wired to the shell engine held in
//! [`ShellContext`].

use leptos::prelude::*;

use crate::app::ShellContext;
use crate::components::terminal::{Input, Output};
use crate::core::CompletionState;
use crate::utils::dom;

stylance::import_crate_style!(css, "src/components/terminal/terminal.module.css");

/// Result of a Tab press.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TabResult {
    /// New input line, if completion changed it.
    pub line: Option<String>,
    /// Candidates being cycled, with the selected index.
    pub matches: Vec<String>,
    pub index: usize,
}

// ============================================================================
// Terminal Component
// ============================================================================

#[component]
pub fn Terminal() -> impl IntoView {
    let ctx = use_context::<ShellContext>().expect("ShellContext must be provided at root");
    let output_ref = NodeRef::<leptos::html::Div>::new();

    let lines = ctx.terminal.lines;
    let prompt = Signal::derive(move || ctx.terminal.prompt.get());
    let enabled = Signal::derive(move || ctx.terminal.input_enabled.get());

    // Keep the newest output in view
    Effect::new(move || {
        lines.track();
        if let Some(el) = output_ref.get() {
            dom::scroll_to_bottom(&el);
        }
    });

    let on_submit = Callback::new(move |line: String| ctx.submit(line));
    let on_history_nav = create_history_nav_callback(ctx);
    let on_complete = create_complete_callback(ctx);
    let on_keystroke = Callback::new(move |_: ()| {
        ctx.with_engine(|shell| shell.on_keystroke());
    });

    view! {
        <div class=css::container on:click=move |_| dom::focus_terminal_input()>
            <div node_ref=output_ref class=css::output>
                <For
                    each=move || lines.with(|buf| buf.to_vec())
                    key=|line| line.id
                    children=|line| view! { <Output line=line /> }
                />
            </div>
            <div class=css::inputArea>
                <Input
                    prompt=prompt
                    enabled=enabled
                    on_submit=on_submit
                    on_history_nav=on_history_nav
                    on_complete=on_complete
                    on_keystroke=on_keystroke
                />
            </div>
        </div>
    }
}

// ============================================================================
// Callback Factories
// ============================================================================

/// Negative direction is Arrow Up (older), positive is Arrow Down.
fn create_history_nav_callback(ctx: ShellContext) -> Callback<i32, Option<String>> {
    Callback::new(move |direction: i32| {
        ctx.with_engine(|shell| {
            if direction < 0 {
                shell.history_previous()
            } else {
                Some(shell.history_next())
            }
        })
        .flatten()
    })
}

fn create_complete_callback(ctx: ShellContext) -> Callback<String, TabResult> {
    Callback::new(move |input: String| {
        ctx.with_engine(|shell| {
            let line = shell.complete(&input);
            let (matches, index) = match shell.completion_state() {
                CompletionState::Cycling { matches, index } => (matches.clone(), *index),
                CompletionState::Idle => (Vec::new(), 0),
            };
            TabResult {
                line,
                matches,
                index,
            }
        })
        .unwrap_or_default()
    })
}
