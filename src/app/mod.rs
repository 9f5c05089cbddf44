pub mod handler;
pub mod page;
pub mod state;
pub mod workflow;

pub use handler::{cache_key, create_router};
pub use state::AppState;
