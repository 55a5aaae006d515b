//! Provider API adapters
//!
//! `auth` owns the bearer-token lifecycle, `executor` issues single
//! resilient HTTP calls, and `client` maps the core's transport port onto
//! the provider's endpoints.

pub mod auth;
pub mod client;
pub mod executor;
