pub mod chat;
pub mod config;
pub mod constants;
pub mod error;
pub mod extract;
pub mod fences;
pub mod format;
pub mod mistral;
pub mod phase;
pub mod prompts;
pub mod session;
pub mod web_server;
pub mod wire;
