pub mod event;
pub mod game;
pub mod server;
pub mod user;
