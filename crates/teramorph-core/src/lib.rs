//! Core library for `Teramorph`.
//!
//! Contains the contact submission pipeline: CSRF tokens and the session
//! registry that holds them, field sanitization, email validation,
//! spreadsheet formula defusing, and [`service::ContactService`], which ties
//! them together and hands finished rows to a `teramorph-storage` store.
//! This crate knows nothing about HTTP.

pub mod clock;
pub mod csrf;
pub mod defuse;
pub mod email;
pub mod error;
pub mod sanitize;
pub mod service;
pub mod session;
pub mod submission;
