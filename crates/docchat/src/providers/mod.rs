//! Inferencer abstraction and its implementations
//!
//! The server only talks to `dyn Inferencer`, so tests never need a real model
//! runner installed.

pub mod inferencer;
pub mod process;
pub mod scripted;

pub use inferencer::{InferenceError, Inferencer};
pub use process::ProcessInferencer;
pub use scripted::ScriptedInferencer;
