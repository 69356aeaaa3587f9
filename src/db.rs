use anyhow::{Context, Result};
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

use crate::chunker::Chunk;

/// The slice of a chunk that goes into the search index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedChunk {
    pub chunk_id: i64,
    pub ts_start: f64,
    pub ts_end: f64,
    pub text: String,
}

impl From<&Chunk> for IndexedChunk {
    fn from(chunk: &Chunk) -> Self {
        Self {
            chunk_id: chunk.chunk_id as i64,
            ts_start: chunk.ts_start,
            ts_end: chunk.ts_end,
            text: chunk.text.clone(),
        }
    }
}

pub struct ChunkIndex {
    conn: Connection,
}

impl ChunkIndex {
    /// Create a new in-memory index
    pub fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to create in-memory database")?;
        let index = Self { conn };
        index.init_schema()?;
        Ok(index)
    }

    /// Open (or create) an index file
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;
        let index = Self { conn };
        index.init_schema()?;
        Ok(index)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn
            .execute_batch(
                r#"
            CREATE TABLE IF NOT EXISTS chunks (
                video_id TEXT NOT NULL,
                chunk_id INTEGER NOT NULL,
                ts_start REAL NOT NULL,
                ts_end REAL NOT NULL,
                text TEXT NOT NULL,
                PRIMARY KEY (video_id, chunk_id)
            );

            CREATE INDEX IF NOT EXISTS idx_chunks_time ON chunks(video_id, ts_start);
            "#,
            )
            .context("Failed to initialize database schema")?;
        Ok(())
    }

    /// Replace a video's chunks with `rows`.
    ///
    /// Rows are upserted on `(video_id, chunk_id)`; any other row the video
    /// still has from an earlier run is removed. Runs in a single transaction.
    pub fn upsert_chunks(&mut self, video_id: &str, rows: &[IndexedChunk]) -> Result<usize> {
        let tx = self
            .conn
            .transaction()
            .context("Failed to start transaction")?;

        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO chunks (video_id, chunk_id, ts_start, ts_end, text)
                     VALUES (?1, ?2, ?3, ?4, ?5)
                     ON CONFLICT (video_id, chunk_id) DO UPDATE SET
                       ts_start = excluded.ts_start,
                       ts_end   = excluded.ts_end,
                       text     = excluded.text",
                )
                .context("Failed to prepare upsert")?;

            for row in rows {
                stmt.execute(params![video_id, row.chunk_id, row.ts_start, row.ts_end, row.text])
                    .with_context(|| format!("Failed to upsert chunk {} of {}", row.chunk_id, video_id))?;
            }
        }

        let kept: BTreeSet<i64> = rows.iter().map(|row| row.chunk_id).collect();
        let existing = {
            let mut stmt = tx
                .prepare("SELECT chunk_id FROM chunks WHERE video_id = ?1")
                .context("Failed to prepare stale chunk lookup")?;
            let existing = stmt
                .query_map(params![video_id], |row| row.get::<_, i64>(0))
                .context("Failed to query existing chunks")?
                .collect::<Result<Vec<_>, _>>()
                .context("Failed to collect existing chunks")?;
            existing
        };

        let mut stale = 0;
        {
            let mut stmt = tx
                .prepare("DELETE FROM chunks WHERE video_id = ?1 AND chunk_id = ?2")
                .context("Failed to prepare stale chunk delete")?;
            for chunk_id in existing.into_iter().filter(|id| !kept.contains(id)) {
                stale += stmt
                    .execute(params![video_id, chunk_id])
                    .with_context(|| format!("Failed to remove stale chunk {} of {}", chunk_id, video_id))?;
            }
        }

        tx.commit().context("Failed to commit chunk upsert")?;

        if stale > 0 {
            tracing::debug!(video_id, stale, "removed stale chunks");
        }
        Ok(rows.len())
    }

    /// All indexed chunks of a video, by chunk id
    pub fn chunks_for_video(&self, video_id: &str) -> Result<Vec<IndexedChunk>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT chunk_id, ts_start, ts_end, text FROM chunks
                 WHERE video_id = ?1 ORDER BY chunk_id",
            )
            .context("Failed to prepare statement")?;

        let chunks = stmt
            .query_map(params![video_id], |row| {
                Ok(IndexedChunk {
                    chunk_id: row.get(0)?,
                    ts_start: row.get(1)?,
                    ts_end: row.get(2)?,
                    text: row.get(3)?,
                })
            })
            .context("Failed to query chunks")?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to collect chunks")?;

        Ok(chunks)
    }

    /// Get statistics
    pub fn get_stats(&self) -> Result<IndexStats> {
        let video_count: u32 = self
            .conn
            .query_row("SELECT COUNT(DISTINCT video_id) FROM chunks", [], |row| {
                row.get(0)
            })
            .context("Failed to count videos")?;

        let chunk_count: u32 = self
            .conn
            .query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))
            .context("Failed to count chunks")?;

        Ok(IndexStats {
            video_count,
            chunk_count,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    pub video_count: u32,
    pub chunk_count: u32,
}
