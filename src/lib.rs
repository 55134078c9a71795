//! # Fretwork
//!
//! A guitar tablature sharing server, usable both as a standalone binary and
//! as a library.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! fretwork = { version = "0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::path::PathBuf;
//! use fretwork::server::{AppState, create_router};
//! use fretwork::store::SqliteStore;
//!
//! let store = SqliteStore::new(&PathBuf::from("./data/fretwork.db")).unwrap();
//! store.initialize().unwrap();
//!
//! let state = Arc::new(AppState::new(Arc::new(store)));
//! let router = create_router(state);
//! // Serve with axum...
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Includes the CLI entry point. Disable with `default-features = false`.

pub mod auth;
pub mod config;
pub mod error;
pub mod server;
pub mod store;
pub mod tabtext;
pub mod types;
