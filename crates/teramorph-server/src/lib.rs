//! `Teramorph` HTTP server.
//!
//! Serves the coming-soon landing page at `/` and accepts contact form
//! posts on the same path. Submissions run through
//! `teramorph_core::service::ContactService` and land in a
//! `teramorph_storage` store, by default a private CSV file.

pub mod config;
pub mod cookie;
pub mod error;
pub mod page;
pub mod reply;
pub mod routes;
pub mod state;
