// src/workflow/mod.rs

//! The `Workflow<TData, Err>` type: its definition, handler registration and
//! execution.

pub mod definition;
pub mod execution;
pub mod hooks;

pub use definition::Workflow;
