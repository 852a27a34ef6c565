//! Application configuration.
//!
//! Centralizes all configuration constants used throughout the application.
//! Text assets are loaded at compile time using `include_str!`.

// =============================================================================
// Text Assets (loaded at compile time)
// =============================================================================

/// ASCII banner displayed when a session starts.
pub const ASCII_BANNER: &str = include_str!("../assets/text/banner.txt");

// =============================================================================
// Session Defaults
// =============================================================================

/// Login name of the simulated user.
pub const DEFAULT_USER: &str = "hacker";

/// Hostname shown in the prompt.
pub const DEFAULT_HOSTNAME: &str = "hacksim";

/// Home directory that `~` expands to.
pub const HOME_DIR: &str = "/home/hacker";

// =============================================================================
// Shell Configuration
// =============================================================================

/// Maximum number of terminal output lines to keep on screen.
pub const MAX_TERMINAL_HISTORY: usize = 1000;

/// Maximum number of command history entries to keep.
pub const MAX_COMMAND_HISTORY: usize = 100;

/// Largest edit distance still offered as a "did you mean" suggestion.
pub const FUZZY_MAX_DISTANCE: usize = 2;

/// Consecutive unknown commands before the shell points at `help`.
pub const MISS_HINT_THRESHOLD: usize = 3;

// =============================================================================
// Persistence
// =============================================================================

/// Storage keys for persisted session state.
pub mod storage_keys {
    /// localStorage key for the filesystem snapshot.
    pub const FILESYSTEM: &str = "hackshell.vfs";
    /// localStorage key for the command history log.
    pub const HISTORY: &str = "hackshell.history";
}

/// Format version written into filesystem snapshots.
pub const SNAPSHOT_VERSION: u32 = 1;

// =============================================================================
// Runtime Configuration
// =============================================================================

/// Session settings that may differ from the compiled defaults.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShellConfig {
    pub user: String,
    pub hostname: String,
    pub history_capacity: usize,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            user: DEFAULT_USER.to_string(),
            hostname: DEFAULT_HOSTNAME.to_string(),
            history_capacity: MAX_COMMAND_HISTORY,
        }
    }
}
