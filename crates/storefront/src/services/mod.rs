//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - Sign-up, sign-in, token refresh and sign-out
//! - `catalog` - Cached menu and coffee-shop reads, menu writes, reorder matching
//! - `email` - Contact form delivery

pub mod auth;
pub mod catalog;
pub mod email;

pub use auth::{AuthError, AuthService, Registration};
pub use catalog::{Catalog, ReorderPlan, plan_reorder};
pub use email::{ContactForm, ContactMessage, EmailClient, MailerError};
