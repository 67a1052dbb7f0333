use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, Row};
use tracing::{debug, warn};

use crate::models::Post;

pub const DEFAULT_DB_PATH: &str = "posts.db";

/// Single `posts` table keyed by post id.
///
/// Every write of a run happens inside one transaction opened with the store.
/// [`PostStore::close`] commits it; dropping the store without closing discards it.
pub struct PostStore {
    conn: Connection,
}

impl PostStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open store at {}", path.display()))?;
        debug!("Opened store at {}", path.display());
        Self::init(conn)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS posts (
                post_text       TEXT,
                price           NUMERIC,
                number_of_rooms INTEGER,
                image_url       TEXT,
                post_id         TEXT PRIMARY KEY
            );
            BEGIN;
            ",
        )
        .context("Failed to initialize posts table")?;
        Ok(Self { conn })
    }

    /// Replace the whole row for this post id
    pub fn save(&self, post: &Post) -> Result<()> {
        let mut stmt = self.conn.prepare_cached(
            "REPLACE INTO posts (post_text, price, number_of_rooms, image_url, post_id)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        stmt.execute(params![
            post.text,
            post.price,
            post.rooms,
            post.image_url,
            post.post_id,
        ])
        .with_context(|| format!("Failed to save post {}", post.post_id))?;
        Ok(())
    }

    /// Every stored post, in no particular order
    pub fn load_all(&self) -> Result<Vec<Post>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT post_text, price, number_of_rooms, image_url, post_id FROM posts",
        )?;
        let rows = stmt
            .query_map([], post_from_row)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to read posts")?;
        let total = rows.len();
        let posts: Vec<Post> = rows.into_iter().flatten().collect();
        if posts.len() < total {
            warn!("Skipped {} stored rows without a post id", total - posts.len());
        }
        debug!("Loaded {} posts from store", posts.len());
        Ok(posts)
    }

    /// Commit the run's writes and release the handle
    pub fn close(self) -> Result<()> {
        self.conn
            .execute_batch("COMMIT")
            .context("Failed to commit posts")?;
        self.conn
            .close()
            .map_err(|(_, err)| err)
            .context("Failed to close store")?;
        Ok(())
    }
}

/// `None` for rows with a NULL post id; SQLite lets a TEXT primary key be NULL
fn post_from_row(row: &Row<'_>) -> rusqlite::Result<Option<Post>> {
    let Some(post_id) = row.get::<_, Option<String>>(4)? else {
        return Ok(None);
    };
    // Older databases hold prices as REAL; integers read as f64 just as well.
    let price: Option<f64> = row.get(1)?;
    Ok(Some(Post {
        text: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
        price: price.map(|p| p as i64),
        rooms: row.get(2)?,
        image_url: row.get(3)?,
        post_id,
    }))
}
