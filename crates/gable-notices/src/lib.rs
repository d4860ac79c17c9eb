//! # gable-notices
//!
//! Jurisdiction rules and the legal notice document generator.
//!
//! - [`rules`]: the static notice-period table; consulted, never inferred
//! - [`templates`]: versioned template resolution with built-in fallbacks
//! - [`render`]: placeholder substitution and durable document rendering
//! - [`artifact`]: artifact storage seam (filesystem implementation)
//! - [`generator`]: the full issue pipeline (resolve → deadline →
//!   substitute → render)
//!
//! Everything date-related here is deterministic table arithmetic. No
//! generative component ever computes a deadline.
//!
//! ## Crate Position
//!
//! Depends on: gable-core, gable-store. Depended on by: gable-tools,
//! gable-runtime.

#![deny(unsafe_code)]

pub mod artifact;
pub mod errors;
pub mod generator;
pub mod render;
pub mod rules;
pub mod templates;

pub use errors::NoticeError;
pub use generator::{IssuedNotice, NoticeGenerator, NoticeRequest};
pub use rules::notice_period_days;
pub use templates::{ResolvedTemplate, TemplateSource};
