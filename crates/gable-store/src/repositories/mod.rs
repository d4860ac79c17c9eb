//! Stateless repositories, one per collection. Every method takes a
//! `&Connection` checked out from the [`crate::Store`].

pub mod action_log;
pub mod conversation;
pub mod legal;
pub mod maintenance;
pub mod payments;
pub mod templates;
pub mod tenancy;
