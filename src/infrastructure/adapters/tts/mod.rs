//! TTS Adapter - 语音服务商实现

mod credentials;
mod fake_provider;
mod minimax_client;

pub use credentials::SharedCredentials;
pub use fake_provider::{fake_mp3, FakeTtsProvider};
pub use minimax_client::{MiniMaxClient, MiniMaxClientConfig};
