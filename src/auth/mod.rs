//! Authentication and verification.
//!
//! The flow mirrors the steps a user walks through: the credential form, the
//! "enter the code we sent you" step, and the post-login redirect. Accounts
//! and sessions live in the hosted auth provider; this module holds only
//! transient flow state and the clients that talk to the provider and the
//! verification-code functions.

pub mod codes;
pub mod flow;
pub mod provider;
pub mod redirect;
pub mod session;
mod state;

pub use state::{AuthConfig, AuthState};
