#![forbid(unsafe_code)]

//! Neighborhood intel station daemon: polls the upstream feeds into a shared
//! snapshot, serves it over HTTP, and pushes rendered panels to the e-paper node.

pub mod config;
pub mod http;
pub mod push;
pub mod render;
pub mod scheduler;
pub mod sources;
pub mod store;
pub mod weather;
