//! Query Handlers 实现

mod provider_handlers;
mod voice_handlers;

pub use provider_handlers::*;
pub use voice_handlers::*;
