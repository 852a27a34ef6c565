//! Terminal input line with Tab completion and history navigation.

use leptos::prelude::CollectView;
use leptos::{ev, prelude::*};
use wasm_bindgen::JsCast;

use super::TabResult;

stylance::import_crate_style!(css, "src/components/terminal/input.module.css");

/// Keys that never reset completion cycling or history browsing.
const MODIFIER_KEYS: &[&str] = &["Shift", "Control", "Alt", "Meta", "CapsLock"];

#[component]
pub fn Input(
    #[prop(into)] prompt: Signal<String>,
    #[prop(into)] enabled: Signal<bool>,
    on_submit: Callback<String>,
    on_history_nav: Callback<i32, Option<String>>,
    on_complete: Callback<String, TabResult>,
    on_keystroke: Callback<()>,
) -> impl IntoView {
    let input_ref = NodeRef::<leptos::html::Input>::new();
    let (input_value, set_input_value) = signal(String::new());
    let (matches, set_matches) = signal((Vec::<String>::new(), 0usize));

    // Focus on mount and whenever input comes back after a command
    Effect::new(move || {
        if enabled.get()
            && let Some(input) = input_ref.get()
        {
            let _ = input.focus();
        }
    });

    let move_cursor_to_end = move || {
        if let Some(input) = input_ref.get() {
            let len = input.value().len() as u32;
            let _ = input.set_selection_range(len, len);
        }
    };

    let clear_matches = move || set_matches.set((Vec::new(), 0));

    let handle_keydown = move |ev: ev::KeyboardEvent| {
        let key = ev.key();
        match key.as_str() {
            "Tab" => {
                ev.prevent_default();
                let result = on_complete.run(input_value.get());
                if let Some(line) = result.line {
                    set_input_value.set(line);
                    move_cursor_to_end();
                }
                set_matches.set((result.matches, result.index));
            }
            "Enter" => {
                clear_matches();
                on_submit.run(input_value.get());
                set_input_value.set(String::new());
            }
            "ArrowUp" => {
                ev.prevent_default();
                clear_matches();
                if let Some(line) = on_history_nav.run(-1) {
                    set_input_value.set(line);
                    move_cursor_to_end();
                }
            }
            "ArrowDown" => {
                ev.prevent_default();
                clear_matches();
                let line = on_history_nav.run(1).unwrap_or_default();
                set_input_value.set(line);
                move_cursor_to_end();
            }
            "l" if ev.ctrl_key() => {
                ev.prevent_default();
                clear_matches();
                on_submit.run("clear".to_string());
            }
            "c" if ev.ctrl_key() => {
                clear_matches();
                on_keystroke.run(());
                set_input_value.set(String::new());
            }
            k if MODIFIER_KEYS.contains(&k) => {}
            _ => {
                clear_matches();
                on_keystroke.run(());
            }
        }
    };

    let handle_input = move |ev: ev::Event| {
        let Some(target) = ev.target() else { return };
        let input = target.unchecked_into::<web_sys::HtmlInputElement>();
        set_input_value.set(input.value());
    };

    let suggestions_view = move || {
        let (items, idx) = matches.get();
        if items.len() < 2 {
            return None;
        }
        Some(view! {
            <div class=css::suggestions>
                {items.into_iter().enumerate().map(|(i, s)| {
                    let class_name = if i == idx {
                        format!("{} {}", css::suggestion, css::suggestionActive)
                    } else {
                        css::suggestion.to_string()
                    };
                    view! { <span class=class_name>{s}</span> }
                }).collect_view()}
            </div>
        })
    };

    view! {
        <div class=css::inputWrapper>
            <div class=css::line>
                <span class=css::prompt>{prompt}</span>
                <span class=css::separator>"$ "</span>
                <input
                    node_ref=input_ref
                    type="text"
                    class=css::input
                    autocomplete="off"
                    spellcheck="false"
                    prop:value=input_value
                    prop:disabled=move || !enabled.get()
                    on:input=handle_input
                    on:keydown=handle_keydown
                />
            </div>
            {suggestions_view}
        </div>
    }
}
