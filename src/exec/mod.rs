// src/exec/mod.rs

//! Process execution layer.
//!
//! Leaf commands never talk to `std::process` directly; they go through the
//! helpers here.
//!
//! - [`process`] spawns OS processes, either to completion with captured
//!   output, or in the background until a cancellation token fires.
//! - [`cancel`] provides the cooperative [`CancellationToken`] handed to
//!   background workers.

pub mod cancel;
pub mod process;

pub use cancel::CancellationToken;
pub use process::{ProcessOutput, run_to_completion, run_until_cancelled, shell_argv};
