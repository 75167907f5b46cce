mod base;
mod connection;
mod sentry;

pub use base::*;
pub use connection::*;
pub use sentry::*;
