//! liftlog - a self-hostable exercise log service
//!
//! An HTTP CRUD API over a journal-backed exercise record store.

pub mod cli;
pub mod http_server;
pub mod store;
