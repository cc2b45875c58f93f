pub mod health;
pub mod invites;

pub use health::health_handler;
pub use invites::{accept_invite_handler, accept_invite_query_handler, finalize_invite_handler};
