// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod score;
pub mod team;
pub mod user;

pub use score::Score;
pub use team::Team;
pub use user::{Session, User};
