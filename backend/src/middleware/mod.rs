pub mod auth;
pub mod client_info;

pub use auth::{auth_middleware, AuthenticatedUser};
pub use client_info::add_client_info_to_span;
