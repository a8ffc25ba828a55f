pub mod handler;
pub mod inventory;
pub mod progression;
pub mod protocol;
pub mod state;

// Re-export the dispatcher so the binary only needs one import.
pub use handler::{handle, handle_line};
pub use state::AppState;
