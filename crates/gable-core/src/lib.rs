//! # gable-core
//!
//! Foundation types, errors, branded IDs, and domain records for the Gable
//! tenancy agent.
//!
//! This crate provides the shared vocabulary that all other gable crates
//! depend on:
//!
//! - **Branded IDs**: [`ids::TenantId`], [`ids::LeaseId`], etc. as newtypes
//! - **Domain records**: [`domain::Tenant`], [`domain::Lease`],
//!   [`domain::PaymentRecord`], [`domain::LegalAction`], and friends
//! - **Escalation ladder**: [`escalation::EscalationLevel`] and the typed
//!   [`escalation::OpenThreads`] record
//! - **Tool vocabulary**: [`tools::ToolCall`], [`tools::ToolResult`]
//! - **Events**: [`events::GableEvent`] for agent lifecycle broadcasting
//! - **Errors**: [`errors::CoreError`] taxonomy via `thiserror`
//!
//! ## Crate Position
//!
//! Foundation crate. Depended on by all other gable crates.

#![deny(unsafe_code)]

pub mod domain;
pub mod errors;
pub mod escalation;
pub mod events;
pub mod ids;
pub mod snapshot;
pub mod tools;
