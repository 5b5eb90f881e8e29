//! Posts CI pipeline notifications to Slack, either through an incoming
//! webhook or the token-authenticated Web API.

pub mod config;
pub mod error;
pub mod log;
pub mod message;
pub mod notify;
pub mod slack;

pub use config::Config;
pub use error::NotifyError;
pub use notify::notify;
