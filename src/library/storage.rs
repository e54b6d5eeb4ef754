//! Voice message library storage using SQLite.
//!
//! Manages persistent storage of imported voice messages: audio file path,
//! duration, packed waveform metadata, and the listened flag used to mark
//! messages as heard.

use anyhow::Result;
use chrono::{DateTime, Local};
use rusqlite::OptionalExtension;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};

/// A single voice message in the library.
#[derive(Debug, Clone)]
pub struct VoiceMessage {
    /// Unique identifier for this message
    pub id: i64,
    /// Path to the audio file on disk
    pub path: PathBuf,
    /// Display title (sender name or filename)
    pub title: String,
    /// Duration in seconds
    pub duration_secs: f64,
    /// Packed 5-bit waveform metadata (may be empty)
    pub waveform: Vec<u8>,
    /// Whether this message has been played to completion
    pub listened: bool,
    /// When this message was imported
    pub created_at: DateTime<Local>,
}

/// Manages the voice message library database.
pub struct MessageLibrary {
    /// Path to the SQLite database file
    database_path: PathBuf,
    /// Connection to the database (lazy-loaded)
    connection: Option<Connection>,
}

impl MessageLibrary {
    /// Creates a new library manager for the given data directory.
    ///
    /// # Errors
    /// - If the data directory cannot be created
    pub fn new(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)?;
        let database_path = data_dir.join("messages.db");

        Ok(Self {
            database_path,
            connection: None,
        })
    }

    /// Initializes database connection and creates tables if necessary.
    ///
    /// # Errors
    /// - If the database file cannot be opened
    /// - If table creation fails
    fn get_connection(&mut self) -> Result<&Connection> {
        if self.connection.is_none() {
            let connection = Connection::open(&self.database_path)?;

            connection.execute("PRAGMA foreign_keys = ON", [])?;

            connection.execute(
                "CREATE TABLE IF NOT EXISTS messages (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    path TEXT NOT NULL,
                    title TEXT NOT NULL,
                    duration_secs REAL NOT NULL,
                    waveform BLOB NOT NULL,
                    listened INTEGER NOT NULL DEFAULT 0,
                    created_at TEXT NOT NULL
                )",
                [],
            )?;

            self.connection = Some(connection);
        }

        Ok(self.connection.as_ref().unwrap())
    }

    /// Adds a new voice message to the library and returns its id.
    ///
    /// # Errors
    /// - If database connection fails
    /// - If insertion fails
    pub fn add_message(
        &mut self,
        path: &Path,
        title: &str,
        duration_secs: f64,
        waveform: &[u8],
    ) -> Result<i64> {
        let connection = self.get_connection()?;
        let timestamp = Local::now().to_rfc3339();

        connection.execute(
            "INSERT INTO messages (path, title, duration_secs, waveform, listened, created_at)
             VALUES (?1, ?2, ?3, ?4, 0, ?5)",
            params![
                path.to_string_lossy(),
                title,
                duration_secs,
                waveform,
                timestamp
            ],
        )?;

        let id = connection.last_insert_rowid();
        tracing::debug!("Voice message added to library: id={}", id);
        Ok(id)
    }

    /// Retrieves all messages ordered by oldest first (chat order).
    ///
    /// # Errors
    /// - If database connection fails
    /// - If query execution fails
    /// - If timestamp parsing fails
    pub fn get_all_messages(&mut self) -> Result<Vec<VoiceMessage>> {
        let connection = self.get_connection()?;

        let mut statement = connection.prepare(
            "SELECT id, path, title, duration_secs, waveform, listened, created_at
             FROM messages ORDER BY created_at ASC",
        )?;

        let entries = statement
            .query_map([], Self::row_to_message)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    /// Retrieves a single message by ID.
    ///
    /// # Errors
    /// - If database connection fails
    /// - If query execution fails
    pub fn get_message(&mut self, id: i64) -> Result<Option<VoiceMessage>> {
        let connection = self.get_connection()?;

        let mut statement = connection.prepare(
            "SELECT id, path, title, duration_secs, waveform, listened, created_at
             FROM messages WHERE id = ?1",
        )?;

        let entry = statement
            .query_row(params![id], Self::row_to_message)
            .optional()?;

        Ok(entry)
    }

    /// Marks a message as listened.
    ///
    /// # Errors
    /// - If database connection fails
    /// - If the update fails
    pub fn mark_listened(&mut self, id: i64) -> Result<()> {
        let connection = self.get_connection()?;
        connection.execute(
            "UPDATE messages SET listened = 1 WHERE id = ?1",
            params![id],
        )?;
        tracing::debug!("Message {} marked listened", id);
        Ok(())
    }

    /// Maps a database row to a [`VoiceMessage`].
    fn row_to_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<VoiceMessage> {
        let id = row.get::<_, i64>(0)?;
        let path = row.get::<_, String>(1)?;
        let title = row.get::<_, String>(2)?;
        let duration_secs = row.get::<_, f64>(3)?;
        let waveform = row.get::<_, Vec<u8>>(4)?;
        let listened = row.get::<_, i64>(5)? != 0;
        let timestamp_str = row.get::<_, String>(6)?;

        let created_at = DateTime::parse_from_rfc3339(&timestamp_str)
            .map(|dt| dt.with_timezone(&Local))
            .map_err(|_| {
                rusqlite::Error::InvalidParameterName("Invalid timestamp format".to_string())
            })?;

        Ok(VoiceMessage {
            id,
            path: PathBuf::from(path),
            title,
            duration_secs,
            waveform,
            listened,
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_library() -> (MessageLibrary, PathBuf) {
        let dir = std::env::temp_dir().join(format!(
            "ovmp_test_{}_{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        (MessageLibrary::new(&dir).unwrap(), dir)
    }

    #[test]
    fn test_add_and_retrieve_message() {
        let (mut library, dir) = temp_library();

        let waveform = vec![0x12u8, 0x34, 0x56];
        let id = library
            .add_message(Path::new("/tmp/msg.wav"), "Alice", 12.5, &waveform)
            .unwrap();

        let message = library.get_message(id).unwrap().unwrap();
        assert_eq!(message.title, "Alice");
        assert_eq!(message.waveform, waveform);
        assert!(!message.listened);

        let all = library.get_all_messages().unwrap();
        assert_eq!(all.len(), 1);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_mark_listened() {
        let (mut library, dir) = temp_library();

        let id = library
            .add_message(Path::new("/tmp/msg.wav"), "Bob", 3.0, &[])
            .unwrap();
        library.mark_listened(id).unwrap();

        let message = library.get_message(id).unwrap().unwrap();
        assert!(message.listened);

        let _ = std::fs::remove_dir_all(dir);
    }
}
