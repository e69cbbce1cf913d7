pub mod calendly;
pub mod chat;
pub mod relay;
pub mod status;
