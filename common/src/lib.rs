pub mod config;
pub mod errors;
pub mod util;

pub type UserId = String;
pub type ChannelId = String;
