//! # kyo-core
//!
//! Core types, stable ID generation, and error types for kyo.
//!
//! This crate provides the foundational types shared across all kyo crates:
//! - Entity structs for the loaded graph (project, documents, tasks)
//! - The `LoadEvent` audit record and its closed set of event types
//! - Status enums with state machine transitions
//! - The structural markdown tree produced by `kyo-parser`
//! - Deterministic ID helpers
//! - The error taxonomy surfaced in `error` events

pub mod entities;
pub mod enums;
pub mod errors;
pub mod ids;
pub mod structure;
