pub mod dto;
pub mod response;
mod router;
mod social;
mod tabs;
mod users;
pub mod validation;

pub use router::{AppState, create_router};
