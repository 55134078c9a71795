mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::types::*;

/// Store defines the database interface.
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    /// Whether the schema has been created. Serving against an uninitialized
    /// database is a startup error; schema creation only happens in `initialize`.
    fn is_initialized(&self) -> Result<bool>;

    // User operations
    fn create_user(&self, user: &User) -> Result<()>;
    fn get_user(&self, id: &str) -> Result<Option<User>>;
    fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    fn find_user_by_identifier(&self, identifier: &str) -> Result<Option<User>>;
    fn update_user(&self, user: &User) -> Result<()>;
    fn delete_user(&self, id: &str) -> Result<bool>;

    // Token operations
    fn create_token(&self, token: &Token) -> Result<()>;
    fn get_token_by_lookup(&self, lookup: &str) -> Result<Option<Token>>;
    fn delete_token(&self, id: &str) -> Result<bool>;
    fn update_token_last_used(&self, id: &str) -> Result<()>;

    // Tab operations
    fn create_tab(&self, tab: &Tab) -> Result<()>;
    fn get_tab(&self, id: &str) -> Result<Option<Tab>>;
    fn list_tabs(&self) -> Result<Vec<Tab>>;
    fn search_tabs(&self, query: &str) -> Result<Vec<Tab>>;
    fn list_user_tabs(&self, user_id: &str) -> Result<Vec<Tab>>;
    fn update_tab(&self, tab: &Tab) -> Result<()>;
    fn delete_tab(&self, id: &str) -> Result<bool>;

    // Follow edges (User -> User, directed)
    fn toggle_follow(&self, follower_id: &str, followed_id: &str) -> Result<bool>;
    fn is_following(&self, follower_id: &str, followed_id: &str) -> Result<bool>;
    fn list_followers(&self, user_id: &str) -> Result<Vec<User>>;
    fn list_following(&self, user_id: &str) -> Result<Vec<User>>;
    fn count_followers(&self, user_id: &str) -> Result<i64>;
    fn count_following(&self, user_id: &str) -> Result<i64>;

    // Favorite edges (User -> Tab)
    fn toggle_favorite(&self, user_id: &str, tab_id: &str) -> Result<bool>;
    fn is_favorited(&self, user_id: &str, tab_id: &str) -> Result<bool>;
    fn list_favorites(&self, user_id: &str) -> Result<Vec<Tab>>;
    fn count_favorites(&self, user_id: &str) -> Result<i64>;

    fn close(&self) -> Result<()>;
}
