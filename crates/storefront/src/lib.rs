//! La Matera Storefront library.
//!
//! This crate provides the storefront functionality as a library,
//! allowing it to be tested and reused.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod cart_session;
pub mod checkout;
pub mod config;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;
pub mod supabase;
