//! HTTP API exposing the persistence surface to history/UI clients:
//! - POST /live/session - create a session record
//! - PUT /live/session - close a session record
//! - POST /live/message - append a finalized transcript entry
//! - GET /live/sessions/user/:user_id - session summaries for a user
//! - GET /live/sessions/:session_id - session metadata plus messages
//! - GET /health - health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
