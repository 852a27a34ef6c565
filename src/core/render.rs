//! Output side of the shell.
//!
//! The engine and the command handlers never touch the DOM; they talk to a
//! [`Renderer`]. The browser view implements it on top of Leptos signals,
//! tests use [`BufferRenderer`].

/// Sink for everything the shell shows to the user. Fire-and-forget.
pub trait Renderer {
    /// Echo of a submitted line next to the prompt it was typed at.
    fn render_input(&mut self, prompt: &str, line: &str);

    fn render_output(&mut self, text: &str);

    fn render_error(&mut self, text: &str);

    /// Hints and suggestions.
    fn render_info(&mut self, text: &str);

    /// Enable or disable the input line while a command runs.
    fn set_input_enabled(&mut self, _enabled: bool) {}

    /// Wipe the screen.
    fn clear(&mut self) {}
}

/// One line recorded by [`BufferRenderer`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rendered {
    Input { prompt: String, line: String },
    Output(String),
    Error(String),
    Info(String),
}

/// Renderer that records what it is asked to show.
#[derive(Clone, Debug, Default)]
pub struct BufferRenderer {
    pub lines: Vec<Rendered>,
    pub input_enabled: bool,
    /// Every value passed to `set_input_enabled`, in order.
    pub input_toggles: Vec<bool>,
}

impl BufferRenderer {
    pub fn new() -> Self {
        Self {
            input_enabled: true,
            ..Self::default()
        }
    }

    /// Text of all output lines.
    pub fn outputs(&self) -> Vec<&str> {
        self.lines
            .iter()
            .filter_map(|line| match line {
                Rendered::Output(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Text of all error lines.
    pub fn errors(&self) -> Vec<&str> {
        self.lines
            .iter()
            .filter_map(|line| match line {
                Rendered::Error(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Text of all info lines.
    pub fn infos(&self) -> Vec<&str> {
        self.lines
            .iter()
            .filter_map(|line| match line {
                Rendered::Info(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn last(&self) -> Option<&Rendered> {
        self.lines.last()
    }
}

impl Renderer for BufferRenderer {
    fn render_input(&mut self, prompt: &str, line: &str) {
        self.lines.push(Rendered::Input {
            prompt: prompt.to_string(),
            line: line.to_string(),
        });
    }

    fn render_output(&mut self, text: &str) {
        self.lines.push(Rendered::Output(text.to_string()));
    }

    fn render_error(&mut self, text: &str) {
        self.lines.push(Rendered::Error(text.to_string()));
    }

    fn render_info(&mut self, text: &str) {
        self.lines.push(Rendered::Info(text.to_string()));
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.input_enabled = enabled;
        self.input_toggles.push(enabled);
    }

    fn clear(&mut self) {
        self.lines.clear();
    }
}
