//! Shared type definitions for the tribe slot cooldown service.
//!
//! This crate is the single source of truth for the types used across the
//! tribeslots workspace: the tribe identifier, the cooldown timestamp
//! representation, and the decision types returned by the admission gates.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe wrapper for the externally supplied tribe identifier
//! - [`slots`] -- Cooldown timestamps, admission decisions, slot reports

pub mod ids;
pub mod slots;

// Re-export all public types at crate root for convenience.
pub use ids::TribeId;
pub use slots::{AdmissionDecision, MergeDecision, SlotReport, SlotReportEntry, SlotStamp};
