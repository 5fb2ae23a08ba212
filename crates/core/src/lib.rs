//! userdesk Core - Shared types library.
//!
//! This crate provides common types used across all userdesk components:
//! - `portal` - Web front end for the users API
//! - `cli` - Terminal front end for the same API
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no storage.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - User records, login credentials, and the client-held session

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
