// Pedantic: suppress noise for internal crate code.
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]

pub mod backend;
pub mod client;
pub mod config;
pub mod detector;
pub mod host;
pub mod router;
pub mod terminal;
pub mod types;
pub mod url;
