use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params};

use super::Store;
use super::schema::SCHEMA;
use crate::error::{Error, Result};
use crate::types::*;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns a guard to the underlying database connection.
    /// This allows consuming applications to execute custom SQL.
    pub fn connection(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn()
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        avatar: row.get(4)?,
        created_at: parse_datetime(&row.get::<_, String>(5)?),
    })
}

fn row_to_tab(row: &Row<'_>) -> rusqlite::Result<Tab> {
    Ok(Tab {
        id: row.get(0)?,
        title: row.get(1)?,
        artist: row.get(2)?,
        content: row.get(3)?,
        difficulty: row.get(4)?,
        tempo_bpm: row.get(5)?,
        user_id: row.get(6)?,
        created_at: parse_datetime(&row.get::<_, String>(7)?),
        updated_at: parse_datetime(&row.get::<_, String>(8)?),
    })
}

const USER_COLUMNS: &str = "id, username, email, password_hash, avatar, created_at";
const TAB_COLUMNS: &str =
    "id, title, artist, content, difficulty, tempo_bpm, user_id, created_at, updated_at";

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        let conn = self.conn();
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    fn is_initialized(&self) -> Result<bool> {
        let conn = self.conn();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'users'",
            [],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    // User operations

    fn create_user(&self, user: &User) -> Result<()> {
        let result = self.conn().execute(
            "INSERT INTO users (id, username, email, password_hash, avatar, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                user.id,
                user.username,
                user.email,
                user.password_hash,
                user.avatar,
                format_datetime(&user.created_at),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_constraint_violation(&e) => Err(Error::AlreadyExists),
            Err(e) => Err(Error::from(e)),
        }
    }

    fn get_user(&self, id: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            params![id],
            row_to_user,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
            params![username],
            row_to_user,
        )
        .optional()
        .map_err(Error::from)
    }

    fn find_user_by_identifier(&self, identifier: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1 OR email = ?1"),
            params![identifier],
            row_to_user,
        )
        .optional()
        .map_err(Error::from)
    }

    fn update_user(&self, user: &User) -> Result<()> {
        let result = self.conn().execute(
            "UPDATE users SET username = ?1, email = ?2, password_hash = ?3, avatar = ?4
             WHERE id = ?5",
            params![
                user.username,
                user.email,
                user.password_hash,
                user.avatar,
                user.id
            ],
        );

        match result {
            Ok(0) => Err(Error::NotFound),
            Ok(_) => Ok(()),
            Err(e) if is_constraint_violation(&e) => Err(Error::AlreadyExists),
            Err(e) => Err(Error::from(e)),
        }
    }

    fn delete_user(&self, id: &str) -> Result<bool> {
        // Foreign keys cascade: tabs authored by the user, follow edges in
        // either direction, favorites, and session tokens all go in the same
        // implicit transaction.
        let rows = self
            .conn()
            .execute("DELETE FROM users WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // Token operations

    fn create_token(&self, token: &Token) -> Result<()> {
        let result = self.conn().execute(
            "INSERT INTO tokens (id, token_hash, token_lookup, user_id, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                token.id,
                token.token_hash,
                token.token_lookup,
                token.user_id,
                format_datetime(&token.created_at),
                token.expires_at.as_ref().map(format_datetime),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_constraint_violation(&e) => {
                Err(Error::Conflict("token lookup collision".to_string()))
            }
            Err(e) => Err(Error::from(e)),
        }
    }

    fn get_token_by_lookup(&self, lookup: &str) -> Result<Option<Token>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, token_hash, token_lookup, user_id, created_at, expires_at, last_used_at
             FROM tokens WHERE token_lookup = ?1",
            params![lookup],
            |row| {
                Ok(Token {
                    id: row.get(0)?,
                    token_hash: row.get(1)?,
                    token_lookup: row.get(2)?,
                    user_id: row.get(3)?,
                    created_at: parse_datetime(&row.get::<_, String>(4)?),
                    expires_at: row.get::<_, Option<String>>(5)?.map(|s| parse_datetime(&s)),
                    last_used_at: row.get::<_, Option<String>>(6)?.map(|s| parse_datetime(&s)),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn delete_token(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM tokens WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn update_token_last_used(&self, id: &str) -> Result<()> {
        self.conn().execute(
            "UPDATE tokens SET last_used_at = ?1 WHERE id = ?2",
            params![format_datetime(&Utc::now()), id],
        )?;
        Ok(())
    }

    // Tab operations

    fn create_tab(&self, tab: &Tab) -> Result<()> {
        self.conn().execute(
            "INSERT INTO tabs (id, title, artist, content, difficulty, tempo_bpm, user_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                tab.id,
                tab.title,
                tab.artist,
                tab.content,
                tab.difficulty,
                tab.tempo_bpm,
                tab.user_id,
                format_datetime(&tab.created_at),
                format_datetime(&tab.updated_at),
            ],
        )?;
        Ok(())
    }

    fn get_tab(&self, id: &str) -> Result<Option<Tab>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {TAB_COLUMNS} FROM tabs WHERE id = ?1"),
            params![id],
            row_to_tab,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_tabs(&self) -> Result<Vec<Tab>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {TAB_COLUMNS} FROM tabs ORDER BY created_at DESC"
        ))?;

        let rows = stmt.query_map([], row_to_tab)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn search_tabs(&self, query: &str) -> Result<Vec<Tab>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {TAB_COLUMNS} FROM tabs
             WHERE title LIKE '%' || ?1 || '%' OR artist LIKE '%' || ?1 || '%'
             ORDER BY created_at DESC"
        ))?;

        let rows = stmt.query_map(params![query], row_to_tab)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn list_user_tabs(&self, user_id: &str) -> Result<Vec<Tab>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {TAB_COLUMNS} FROM tabs WHERE user_id = ?1 ORDER BY created_at DESC"
        ))?;

        let rows = stmt.query_map(params![user_id], row_to_tab)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_tab(&self, tab: &Tab) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE tabs SET title = ?1, artist = ?2, content = ?3, difficulty = ?4,
             tempo_bpm = ?5, updated_at = ?6 WHERE id = ?7",
            params![
                tab.title,
                tab.artist,
                tab.content,
                tab.difficulty,
                tab.tempo_bpm,
                format_datetime(&tab.updated_at),
                tab.id
            ],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn delete_tab(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM tabs WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // Follow edges

    fn toggle_follow(&self, follower_id: &str, followed_id: &str) -> Result<bool> {
        if follower_id == followed_id {
            return Err(Error::SelfFollow);
        }

        let mut conn = self.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM follow_edges WHERE follower_id = ?1 AND followed_id = ?2)",
            params![follower_id, followed_id],
            |row| row.get(0),
        )?;

        let following = if exists {
            tx.execute(
                "DELETE FROM follow_edges WHERE follower_id = ?1 AND followed_id = ?2",
                params![follower_id, followed_id],
            )?;
            false
        } else {
            let result = tx.execute(
                "INSERT INTO follow_edges (follower_id, followed_id, created_at) VALUES (?1, ?2, ?3)",
                params![follower_id, followed_id, format_datetime(&Utc::now())],
            );
            match result {
                Ok(_) => true,
                Err(e) if is_constraint_violation(&e) => {
                    // Another toggle won the race; the transaction is dropped
                    // without committing.
                    return Err(Error::Conflict("follow edge changed concurrently".to_string()));
                }
                Err(e) => return Err(Error::from(e)),
            }
        };

        tx.commit()?;
        Ok(following)
    }

    fn is_following(&self, follower_id: &str, followed_id: &str) -> Result<bool> {
        let conn = self.conn();
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM follow_edges WHERE follower_id = ?1 AND followed_id = ?2)",
            params![follower_id, followed_id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn list_followers(&self, user_id: &str) -> Result<Vec<User>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT u.id, u.username, u.email, u.password_hash, u.avatar, u.created_at
             FROM users u
             JOIN follow_edges f ON u.id = f.follower_id
             WHERE f.followed_id = ?1
             ORDER BY u.username",
        )?;

        let rows = stmt.query_map(params![user_id], row_to_user)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn list_following(&self, user_id: &str) -> Result<Vec<User>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT u.id, u.username, u.email, u.password_hash, u.avatar, u.created_at
             FROM users u
             JOIN follow_edges f ON u.id = f.followed_id
             WHERE f.follower_id = ?1
             ORDER BY u.username",
        )?;

        let rows = stmt.query_map(params![user_id], row_to_user)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn count_followers(&self, user_id: &str) -> Result<i64> {
        let conn = self.conn();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM follow_edges WHERE followed_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn count_following(&self, user_id: &str) -> Result<i64> {
        let conn = self.conn();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM follow_edges WHERE follower_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    // Favorite edges

    fn toggle_favorite(&self, user_id: &str, tab_id: &str) -> Result<bool> {
        let mut conn = self.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM favorites WHERE user_id = ?1 AND tab_id = ?2)",
            params![user_id, tab_id],
            |row| row.get(0),
        )?;

        let favorited = if exists {
            tx.execute(
                "DELETE FROM favorites WHERE user_id = ?1 AND tab_id = ?2",
                params![user_id, tab_id],
            )?;
            false
        } else {
            let result = tx.execute(
                "INSERT INTO favorites (user_id, tab_id, created_at) VALUES (?1, ?2, ?3)",
                params![user_id, tab_id, format_datetime(&Utc::now())],
            );
            match result {
                Ok(_) => true,
                Err(e) if is_constraint_violation(&e) => {
                    return Err(Error::Conflict("favorite changed concurrently".to_string()));
                }
                Err(e) => return Err(Error::from(e)),
            }
        };

        tx.commit()?;
        Ok(favorited)
    }

    fn is_favorited(&self, user_id: &str, tab_id: &str) -> Result<bool> {
        let conn = self.conn();
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM favorites WHERE user_id = ?1 AND tab_id = ?2)",
            params![user_id, tab_id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn list_favorites(&self, user_id: &str) -> Result<Vec<Tab>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT t.id, t.title, t.artist, t.content, t.difficulty, t.tempo_bpm, t.user_id, t.created_at, t.updated_at
             FROM tabs t
             JOIN favorites f ON t.id = f.tab_id
             WHERE f.user_id = ?1
             ORDER BY f.created_at DESC",
        )?;

        let rows = stmt.query_map(params![user_id], row_to_tab)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn count_favorites(&self, user_id: &str) -> Result<i64> {
        let conn = self.conn();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM favorites WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store() -> (TempDir, SqliteStore) {
        let temp = TempDir::new().unwrap();
        let store = SqliteStore::new(temp.path().join("test.db")).unwrap();
        store.initialize().unwrap();
        (temp, store)
    }

    fn make_user(id: &str, username: &str) -> User {
        User {
            id: id.to_string(),
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "hash".to_string(),
            avatar: None,
            created_at: Utc::now(),
        }
    }

    fn make_tab(id: &str, title: &str, user_id: Option<&str>) -> Tab {
        Tab {
            id: id.to_string(),
            title: title.to_string(),
            artist: "Test Artist".to_string(),
            content: "e |--0--|\nB |--1--|\nG |--0--|\nD |--2--|\nA |--3--|\nE |-----|"
                .to_string(),
            difficulty: 3,
            tempo_bpm: Some(120),
            user_id: user_id.map(String::from),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_initialize_creates_tables() {
        let (_temp, store) = test_store();

        let conn = store.conn();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();

        assert!(tables.contains(&"users".to_string()));
        assert!(tables.contains(&"tabs".to_string()));
        assert!(tables.contains(&"follow_edges".to_string()));
        assert!(tables.contains(&"favorites".to_string()));
        assert!(tables.contains(&"tokens".to_string()));
    }

    #[test]
    fn test_is_initialized() {
        let temp = TempDir::new().unwrap();
        let store = SqliteStore::new(temp.path().join("test.db")).unwrap();
        assert!(!store.is_initialized().unwrap());

        store.initialize().unwrap();
        assert!(store.is_initialized().unwrap());
    }

    #[test]
    fn test_user_crud() {
        let (_temp, store) = test_store();

        store.create_user(&make_user("u1", "alice")).unwrap();

        let fetched = store.get_user("u1").unwrap().unwrap();
        assert_eq!(fetched.username, "alice");

        let by_name = store.get_user_by_username("alice").unwrap().unwrap();
        assert_eq!(by_name.id, "u1");

        let by_email = store
            .find_user_by_identifier("alice@example.com")
            .unwrap()
            .unwrap();
        assert_eq!(by_email.id, "u1");

        let deleted = store.delete_user("u1").unwrap();
        assert!(deleted);
        assert!(store.get_user("u1").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_username_rejected() {
        let (_temp, store) = test_store();

        store.create_user(&make_user("u1", "alice")).unwrap();

        let result = store.create_user(&make_user("u2", "alice"));
        assert!(matches!(result, Err(Error::AlreadyExists)));
    }

    #[test]
    fn test_toggle_follow_flips_state() {
        let (_temp, store) = test_store();
        store.create_user(&make_user("u1", "alice")).unwrap();
        store.create_user(&make_user("u2", "bob")).unwrap();

        assert!(store.toggle_follow("u1", "u2").unwrap());
        assert!(store.is_following("u1", "u2").unwrap());
        // Directed: the reverse edge does not exist
        assert!(!store.is_following("u2", "u1").unwrap());

        assert!(!store.toggle_follow("u1", "u2").unwrap());
        assert!(!store.is_following("u1", "u2").unwrap());
    }

    #[test]
    fn test_self_follow_rejected() {
        let (_temp, store) = test_store();
        store.create_user(&make_user("u1", "alice")).unwrap();

        let result = store.toggle_follow("u1", "u1");
        assert!(matches!(result, Err(Error::SelfFollow)));
        assert_eq!(store.count_following("u1").unwrap(), 0);
    }

    #[test]
    fn test_follower_lists_sorted_by_username() {
        let (_temp, store) = test_store();
        store.create_user(&make_user("u1", "zoe")).unwrap();
        store.create_user(&make_user("u2", "mallory")).unwrap();
        store.create_user(&make_user("u3", "alice")).unwrap();
        store.create_user(&make_user("u4", "target")).unwrap();

        // Follow in an order unrelated to the expected output order.
        store.toggle_follow("u1", "u4").unwrap();
        store.toggle_follow("u3", "u4").unwrap();
        store.toggle_follow("u2", "u4").unwrap();

        let followers = store.list_followers("u4").unwrap();
        let names: Vec<&str> = followers.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["alice", "mallory", "zoe"]);

        store.toggle_follow("u4", "u1").unwrap();
        store.toggle_follow("u4", "u3").unwrap();

        let following = store.list_following("u4").unwrap();
        let names: Vec<&str> = following.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["alice", "zoe"]);
    }

    #[test]
    fn test_counts_match_list_lengths() {
        let (_temp, store) = test_store();
        store.create_user(&make_user("u1", "alice")).unwrap();
        store.create_user(&make_user("u2", "bob")).unwrap();
        store.create_user(&make_user("u3", "carol")).unwrap();
        store.create_tab(&make_tab("t1", "Song One", None)).unwrap();
        store.create_tab(&make_tab("t2", "Song Two", None)).unwrap();

        store.toggle_follow("u2", "u1").unwrap();
        store.toggle_follow("u3", "u1").unwrap();
        store.toggle_follow("u1", "u3").unwrap();
        // One flip-flop to make sure removals are reflected.
        store.toggle_follow("u3", "u1").unwrap();
        store.toggle_favorite("u1", "t1").unwrap();
        store.toggle_favorite("u1", "t2").unwrap();
        store.toggle_favorite("u1", "t2").unwrap();

        for id in ["u1", "u2", "u3"] {
            assert_eq!(
                store.count_followers(id).unwrap() as usize,
                store.list_followers(id).unwrap().len()
            );
            assert_eq!(
                store.count_following(id).unwrap() as usize,
                store.list_following(id).unwrap().len()
            );
            assert_eq!(
                store.count_favorites(id).unwrap() as usize,
                store.list_favorites(id).unwrap().len()
            );
        }

        assert_eq!(store.count_followers("u1").unwrap(), 1);
        assert_eq!(store.count_favorites("u1").unwrap(), 1);
    }

    #[test]
    fn test_list_favorites_most_recent_first() {
        let (_temp, store) = test_store();
        store.create_user(&make_user("u1", "alice")).unwrap();
        store.create_tab(&make_tab("t1", "First", None)).unwrap();
        store.create_tab(&make_tab("t2", "Second", None)).unwrap();
        store.create_tab(&make_tab("t3", "Third", None)).unwrap();

        store.toggle_favorite("u1", "t2").unwrap();
        store.toggle_favorite("u1", "t3").unwrap();
        store.toggle_favorite("u1", "t1").unwrap();

        let favorites = store.list_favorites("u1").unwrap();
        let ids: Vec<&str> = favorites.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t1", "t3", "t2"]);
    }

    #[test]
    fn test_user_delete_cascades() {
        let (_temp, store) = test_store();
        store.create_user(&make_user("u1", "alice")).unwrap();
        store.create_user(&make_user("u2", "bob")).unwrap();
        store.create_tab(&make_tab("t1", "Song One", Some("u1"))).unwrap();
        store.create_tab(&make_tab("t2", "Song Two", Some("u1"))).unwrap();

        store.toggle_follow("u2", "u1").unwrap();
        store.toggle_follow("u1", "u2").unwrap();
        store.toggle_favorite("u1", "t1").unwrap();
        store.toggle_favorite("u2", "t2").unwrap();

        assert!(store.delete_user("u1").unwrap());

        // Authored tabs are deleted, not orphaned.
        assert!(store.get_tab("t1").unwrap().is_none());
        assert!(store.get_tab("t2").unwrap().is_none());

        // Follow edges in both directions are gone.
        assert_eq!(store.count_following("u2").unwrap(), 0);
        assert!(store.list_following("u2").unwrap().is_empty());
        assert!(!store.is_following("u2", "u1").unwrap());

        // Favorites owned by the user and favorites of the deleted tabs are gone.
        assert_eq!(store.count_favorites("u2").unwrap(), 0);
    }

    #[test]
    fn test_tab_delete_cascades_favorites() {
        let (_temp, store) = test_store();
        store.create_user(&make_user("u1", "alice")).unwrap();
        store.create_user(&make_user("u2", "bob")).unwrap();
        store.create_tab(&make_tab("t1", "Song One", None)).unwrap();

        store.toggle_favorite("u1", "t1").unwrap();
        store.toggle_favorite("u2", "t1").unwrap();

        assert!(store.delete_tab("t1").unwrap());

        assert!(!store.is_favorited("u1", "t1").unwrap());
        assert!(store.list_favorites("u1").unwrap().is_empty());
        assert!(store.list_favorites("u2").unwrap().is_empty());
        assert_eq!(store.count_favorites("u2").unwrap(), 0);
    }

    #[test]
    fn test_search_tabs_matches_title_and_artist() {
        let (_temp, store) = test_store();
        let mut tab = make_tab("t1", "Stairway to Heaven", None);
        tab.artist = "Led Zeppelin".to_string();
        store.create_tab(&tab).unwrap();
        store.create_tab(&make_tab("t2", "Other Song", None)).unwrap();

        let by_title = store.search_tabs("stairway").unwrap();
        assert_eq!(by_title.len(), 1);
        assert_eq!(by_title[0].id, "t1");

        let by_artist = store.search_tabs("zeppelin").unwrap();
        assert_eq!(by_artist.len(), 1);

        let no_match = store.search_tabs("nonexistent").unwrap();
        assert!(no_match.is_empty());
    }

    #[test]
    fn test_tab_update() {
        let (_temp, store) = test_store();
        let mut tab = make_tab("t1", "Old Title", None);
        store.create_tab(&tab).unwrap();

        tab.title = "New Title".to_string();
        tab.difficulty = 5;
        store.update_tab(&tab).unwrap();

        let fetched = store.get_tab("t1").unwrap().unwrap();
        assert_eq!(fetched.title, "New Title");
        assert_eq!(fetched.difficulty, 5);

        let missing = store.update_tab(&make_tab("t9", "Ghost", None));
        assert!(matches!(missing, Err(Error::NotFound)));
    }
}
