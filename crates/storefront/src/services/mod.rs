//! External service integrations.

pub mod telegram;
