//! tish: a small interactive shell with pipelines, redirections, job
//! control and a persistent command history.
//!
//! The library half exists so integration tests can drive the parser and
//! executor directly; the binary in `main.rs` wraps it in a rustyline REPL.

pub mod builtin;
pub mod error;
pub mod execute;
pub mod history;
pub mod jobs;
pub mod parse;
pub mod prelude;
pub mod prompt;
pub mod shellenv;
pub mod signal;
pub mod utils;
pub mod validate;
