//! Error plumbing shared by the element picker crates.
//!
//! Each crate owns its `Error` enum. Implementing [`FromMessage`] for it and
//! calling [`impl_context!`] inside its error module adds `.context()` and
//! `.with_context()` to `Result` and `Option` in that crate.

pub mod context;

pub use context::FromMessage;
