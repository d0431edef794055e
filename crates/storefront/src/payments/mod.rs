//! Hosted payment checkout.

pub mod stripe;

pub use stripe::{CheckoutRequest, CheckoutSession, StripeClient, StripeError};
