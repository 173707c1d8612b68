// Bufferline Core - Bounded queue, payload generation, worker loops
// NO filesystem or stdin access: collaborators come in through ports

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use error::{AppError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
