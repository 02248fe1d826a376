// SPDX-License-Identifier: MIT

//! Services: OAuth exchange, identity reconciliation, sessions.

pub mod google;
pub mod identity;
pub mod session;

pub use google::{GoogleClient, GoogleProfile};
pub use identity::IdentityService;
pub use session::SessionManager;
