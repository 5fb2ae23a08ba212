//! Userdesk portal library.
//!
//! Users API client, session persistence, the page controller, and the HTTP
//! application that serves the page. The `userdesk-portal` binary and the
//! `udesk` CLI are both thin shells over this crate.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod session;
pub mod state;
pub mod ui;
