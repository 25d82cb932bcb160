#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Shared models, error taxonomy and geodesy for the intel station daemon.

pub mod api;
pub mod error;
pub mod geo;
pub mod model;

mod util;

pub use error::{FetchError, RemoteExecError, RenderError};
pub use util::{now_secs, round_tenth};
