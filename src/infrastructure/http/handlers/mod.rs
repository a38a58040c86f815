//! HTTP Handlers

mod ping;
mod provider;
mod synthesis;
mod voice;

pub use ping::*;
pub use provider::*;
pub use synthesis::*;
pub use voice::*;
