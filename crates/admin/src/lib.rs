//! La Matera Admin library.
//!
//! This crate provides the admin functionality as a library,
//! allowing it to be tested and reused (the seed CLI drives the same
//! backend seam).

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod ai;
pub mod backend;
pub mod config;
pub mod error;
pub mod images;
pub mod routes;
pub mod state;
pub mod supabase;
