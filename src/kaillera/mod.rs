pub mod body;
pub mod connect;
pub mod message_types;
pub mod protocol;
