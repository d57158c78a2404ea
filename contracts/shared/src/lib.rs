#![no_std]

//! Plumbing shared by the trade escrow, reputation engine, badge registry and
//! cross-chain relay contracts.
//!
//! - [`access`] keeps role membership in the calling contract's storage and
//!   checks it against per-entry-point policy tables.
//! - [`guard`] is the storage-backed non-reentrancy flag.
//! - [`interfaces`] declares the cross-contract clients used between the
//!   contracts of this workspace.
//! - [`types`] holds the values more than one contract puts on the wire.

pub mod access;
pub mod guard;
pub mod interfaces;
pub mod types;

pub use access::Role;
pub use types::{Tier, MAX_RATING, MIN_RATING};
