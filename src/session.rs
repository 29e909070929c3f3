use std::env;
use std::path::PathBuf;

use anyhow::{Result, anyhow};
use rusqlite::{Connection, OptionalExtension};

use crate::models::{Session, User};

const KEY_TOKEN: &str = "token";
const KEY_USER: &str = "user";

/// Durable local key-value store for the session. Only two keys are ever
/// written: the auth token and the serialized user object.
pub struct SessionStore {
    conn: Connection,
}

impl SessionStore {
    pub fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        Ok(SessionStore { conn })
    }

    /// Opens the store at `MESSENGER_DB`, or the per-user config directory.
    pub fn open_default() -> Result<Self> {
        let path = match env::var("MESSENGER_DB") {
            Ok(path) => PathBuf::from(path),
            Err(_) => {
                let dir = dirs::config_dir()
                    .ok_or_else(|| anyhow!("could not determine config directory"))?
                    .join("messenger");
                std::fs::create_dir_all(&dir)?;
                dir.join("session.db")
            }
        };
        Self::new(&path.to_string_lossy())
    }

    /// Restores the stored session. Returns None unless both keys are present
    /// and the user object parses; a stale or partial write never errors out,
    /// it just yields the unauthenticated state.
    pub fn load(&self) -> Result<Option<Session>> {
        let token = match self.get(KEY_TOKEN)? {
            Some(token) if !token.is_empty() => token,
            _ => return Ok(None),
        };
        let user = match self.get(KEY_USER)? {
            Some(raw) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => user,
                Err(e) => {
                    log::warn!("discarding unreadable stored user: {}", e);
                    return Ok(None);
                }
            },
            None => return Ok(None),
        };
        Ok(Some(Session { token, user }))
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        self.put(KEY_TOKEN, &session.token)?;
        self.put(KEY_USER, &serde_json::to_string(&session.user)?)?;
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        self.conn.execute(
            "DELETE FROM kv WHERE key IN (?1, ?2)",
            (KEY_TOKEN, KEY_USER),
        )?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let value = stmt
            .query_row([key], |row| row.get::<_, String>(0))
            .optional()?;
        Ok(value)
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            (key, value),
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_in_memory_db() -> SessionStore {
        SessionStore::new(":memory:").unwrap()
    }

    fn sample_session() -> Session {
        Session {
            token: "tok_abc123".to_string(),
            user: User {
                id: 7,
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
                avatar_url: "https://api.dicebear.com/7.x/avataaars/svg?seed=alice".to_string(),
                status: "hello".to_string(),
            },
        }
    }

    #[test]
    fn test_save_and_load_session() {
        let store = setup_in_memory_db();
        let session = sample_session();

        store.save(&session).unwrap();
        let restored = store.load().unwrap().unwrap();
        assert_eq!(session, restored);
    }

    #[test]
    fn test_load_empty_store() {
        let store = setup_in_memory_db();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_clear_removes_both_keys() {
        let store = setup_in_memory_db();
        store.save(&sample_session()).unwrap();

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        assert!(store.get(KEY_TOKEN).unwrap().is_none());
        assert!(store.get(KEY_USER).unwrap().is_none());
    }

    #[test]
    fn test_partial_session_yields_none() {
        let store = setup_in_memory_db();
        store.put(KEY_TOKEN, "tok_only").unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_corrupt_user_yields_none() {
        let store = setup_in_memory_db();
        store.put(KEY_TOKEN, "tok_abc123").unwrap();
        store.put(KEY_USER, "{not json").unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_overwrites_previous_session() {
        let store = setup_in_memory_db();
        let mut session = sample_session();
        store.save(&session).unwrap();

        session.token = "tok_next".to_string();
        session.user.username = "bob".to_string();
        store.save(&session).unwrap();

        let restored = store.load().unwrap().unwrap();
        assert_eq!(restored.token, "tok_next");
        assert_eq!(restored.user.username, "bob");
    }

    #[test]
    fn test_on_disk_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.db");
        let session = sample_session();

        {
            let store = SessionStore::new(&path.to_string_lossy()).unwrap();
            store.save(&session).unwrap();
        }

        let store = SessionStore::new(&path.to_string_lossy()).unwrap();
        assert_eq!(store.load().unwrap().unwrap(), session);
    }
}
