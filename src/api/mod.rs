pub mod auth;
pub mod state;

pub use crate::routes::create_router;
pub use auth::CurrentUser;
pub use state::{AppState, EngineSettings};
