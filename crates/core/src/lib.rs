//! SinoCoffee Core - Shared types library.
//!
//! This crate provides common types used across all SinoCoffee components:
//! - `storefront` - Marketing site, storefront and menu admin panel
//! - `cli` - Command-line tools for migrations, seeding and role management
//!
//! # Architecture
//!
//! The core crate contains only types and pure state containers - no I/O, no
//! database access, no HTTP clients. This keeps it lightweight and allows it
//! to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and statuses
//! - [`cart`] - The shopping cart held in a visitor's session

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;

pub use cart::{Cart, CartLine, NewCartLine};
pub use types::*;
