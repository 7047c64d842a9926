pub mod channel_bookmark_entity;
pub mod mail_entity;
