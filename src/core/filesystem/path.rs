//! Path resolution for the virtual filesystem.
//!
//! Every path the filesystem touches is first turned into an [`AbsolutePath`]:
//! a list of plain segments with no `.`, `..` or empty components left.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::HOME_DIR;

/// A normalized absolute path. The root has no segments.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct AbsolutePath {
    segments: Vec<String>,
}

impl AbsolutePath {
    /// The root directory `/`.
    pub fn root() -> Self {
        Self::default()
    }

    /// The fixed home directory that `~` expands to.
    pub fn home() -> Self {
        Self::parse(HOME_DIR)
    }

    /// Parse a path as if it were absolute, normalizing `.` and `..`.
    pub fn parse(path: &str) -> Self {
        Self::root().push_relative(path)
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Last segment, `None` for the root.
    pub fn file_name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Parent directory, `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Split into parent directory and final segment.
    pub fn split_last(&self) -> Option<(Self, &str)> {
        let name = self.file_name()?;
        Some((self.parent()?, name))
    }

    /// Append a single entry name.
    pub fn join(&self, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Self { segments }
    }

    /// True when `self` is `other` or lies underneath it.
    pub fn starts_with(&self, other: &Self) -> bool {
        self.segments.starts_with(&other.segments)
    }

    /// Replace the `from` prefix with `to`. Returns `None` if `from` is not a prefix.
    pub fn rebase(&self, from: &Self, to: &Self) -> Option<Self> {
        let rest = self.segments.strip_prefix(from.segments.as_slice())?;
        let mut segments = to.segments.clone();
        segments.extend(rest.iter().cloned());
        Some(Self { segments })
    }

    /// Render with the home directory abbreviated to `~`, as prompts do.
    pub fn display_from_home(&self, home: &Self) -> String {
        match self.segments.strip_prefix(home.segments.as_slice()) {
            Some([]) => "~".to_string(),
            Some(rest) if !home.is_root() => format!("~/{}", rest.join("/")),
            _ => self.to_string(),
        }
    }

    /// Walk `path` segment by segment starting from `self`.
    ///
    /// `..` pops (a no-op at the root), `.` and empty segments are skipped.
    fn push_relative(mut self, path: &str) -> Self {
        for part in path.split('/') {
            match part {
                "" | "." => {}
                ".." => {
                    self.segments.pop();
                }
                name => self.segments.push(name.to_string()),
            }
        }
        self
    }
}

impl fmt::Display for AbsolutePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return write!(f, "/");
        }
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

impl From<String> for AbsolutePath {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<AbsolutePath> for String {
    fn from(path: AbsolutePath) -> Self {
        path.to_string()
    }
}

/// Resolve a user-supplied path against the current directory.
///
/// - `""` and `"."` resolve to `cwd`
/// - `~` and `~/rest` resolve under the fixed home directory
/// - absolute paths are normalized on their own
/// - anything else is joined to `cwd` and normalized
pub fn resolve(path: &str, cwd: &AbsolutePath) -> AbsolutePath {
    match path {
        "" | "." => cwd.clone(),
        "~" => AbsolutePath::home(),
        _ => {
            if let Some(rest) = path.strip_prefix("~/") {
                AbsolutePath::home().push_relative(rest)
            } else if path.starts_with('/') {
                AbsolutePath::parse(path)
            } else {
                cwd.clone().push_relative(path)
            }
        }
    }
}
