//! Maintenance tools for the municipal web application database
//!
//! Three operator-run binaries share this library:
//! - `create-ratings-table`: ensure the mayor-ratings table exists
//! - `fix-attachment-storage`: tune MySQL for large uploads and upgrade the
//!   attachment columns to LONGTEXT
//! - `verify-admin`: inspect and repair the administrator account
//!
//! Each binary opens one connection, runs its statements sequentially, and
//! exits. They are idempotent: re-running against an already-correct
//! database performs no writes.

pub mod admin;
pub mod attachments;
pub mod ratings;
