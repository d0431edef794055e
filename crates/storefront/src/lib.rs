//! SinoCoffee storefront library.
//!
//! The marketing site, menu, cart and checkout, signed-in pages and the
//! admin menu editor, exposed as a library so the binary and the test
//! suites share one router.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod content;
pub mod db;
pub mod error;
pub mod filters;
pub mod marketing;
pub mod middleware;
pub mod models;
pub mod payments;
pub mod routes;
pub mod services;
pub mod state;
pub mod supabase;
