pub mod anthropic;
pub mod chat;
