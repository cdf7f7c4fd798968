pub mod action_router;
pub mod client_handler;
pub mod config;
pub mod connect_controller;
pub mod error;
pub mod fields;
pub mod game_cache;
pub mod handlers;
pub mod kaillera;
pub mod logger;
pub mod model;
pub mod player_action_queue;
pub mod port_allocator;
pub mod renderers;
pub mod v086_controller;

/// Locks a std mutex, recovering the data if a previous holder panicked.
/// None of the guarded state can be left half-updated by a panic.
pub(crate) fn lock<T>(mutex: &std::sync::Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}
