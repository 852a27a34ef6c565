//! Shell core: everything that runs without a browser.
//!
//! - [`filesystem`] - In-memory tree with permissions and persistence
//! - [`parser`] - Tokenizing and flag parsing of input lines
//! - [`registry`] - Command handlers and their lookup table
//! - [`commands`] - The built-in command set
//! - [`autocomplete`] - Tab completion with cycling
//! - [`history`] - Bounded, persisted command history
//! - [`fuzzy`] - "Did you mean" suggestions
//! - [`engine`] - Ties the above together behind a [`Renderer`]

pub mod autocomplete;
pub mod commands;
pub mod engine;
pub mod error;
pub mod filesystem;
pub mod fuzzy;
pub mod history;
pub mod parser;
pub mod registry;
pub mod render;
pub mod storage;

pub use autocomplete::{AutocompleteHandler, CompletionState};
pub use engine::{EngineState, ShellEngine, SubmitOutcome};
pub use error::{HandlerError, RegistryError, StorageError, VfsError};
pub use filesystem::{AbsolutePath, VirtualFs};
pub use history::HistoryManager;
pub use parser::{ParsedCommand, parse};
pub use registry::{CommandContext, CommandHandler, CommandOutput, CommandRegistry};
pub use render::{BufferRenderer, Renderer};
pub use storage::{MemoryStorage, NullStorage, Storage};
