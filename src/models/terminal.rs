//! Lines shown in the terminal view.

use std::sync::atomic::{AtomicUsize, Ordering};

/// A single line of terminal output with a unique ID.
#[derive(Clone, Debug)]
pub struct OutputLine {
    /// Unique ID for keying in `For` loops
    pub id: usize,
    pub data: OutputLineData,
}

/// What an output line shows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutputLineData {
    /// Echo of a submitted line
    Command { prompt: String, input: String },
    /// Regular command output
    Text(String),
    /// Error message (red)
    Error(String),
    /// Hints and suggestions (yellow)
    Info(String),
}

static OUTPUT_LINE_COUNTER: AtomicUsize = AtomicUsize::new(0);

impl OutputLine {
    fn new(data: OutputLineData) -> Self {
        Self {
            id: OUTPUT_LINE_COUNTER.fetch_add(1, Ordering::Relaxed),
            data,
        }
    }

    pub fn command(prompt: impl Into<String>, input: impl Into<String>) -> Self {
        Self::new(OutputLineData::Command {
            prompt: prompt.into(),
            input: input.into(),
        })
    }

    pub fn text(s: impl Into<String>) -> Self {
        Self::new(OutputLineData::Text(s.into()))
    }

    pub fn error(s: impl Into<String>) -> Self {
        Self::new(OutputLineData::Error(s.into()))
    }

    pub fn info(s: impl Into<String>) -> Self {
        Self::new(OutputLineData::Info(s.into()))
    }
}

impl PartialEq for OutputLine {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        assert_eq!(OutputLine::text("hi").data, OutputLineData::Text("hi".into()));
        assert_eq!(OutputLine::error("no").data, OutputLineData::Error("no".into()));
        assert_eq!(OutputLine::info("psst").data, OutputLineData::Info("psst".into()));
        assert_eq!(
            OutputLine::command("hacker@hacksim:~", "ls -l").data,
            OutputLineData::Command {
                prompt: "hacker@hacksim:~".into(),
                input: "ls -l".into(),
            }
        );
    }

    #[test]
    fn test_ids_unique_equality_by_content() {
        let a = OutputLine::text("same");
        let b = OutputLine::text("same");
        assert_ne!(a.id, b.id);
        assert_eq!(a, b);
    }
}
