use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{ConnectOptions, Connection};
use std::collections::HashMap;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, info};

use crate::errors::StoreError;
use crate::leaderboard::LeaderboardEntry;

/// Telegram chat id of a group
pub type GroupId = i64;

const CREATE_SPOT_STATS: &str = "CREATE TABLE IF NOT EXISTS spot_stats (
    username TEXT PRIMARY KEY,
    spot_num INTEGER NOT NULL DEFAULT 0,
    caught_num INTEGER NOT NULL DEFAULT 0
)";

/// Files SQLite may leave next to a database
const SIDECAR_SUFFIXES: [&str; 3] = ["-journal", "-wal", "-shm"];

/// A member's running totals within one group
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct MemberRecord {
    pub identifier: String,
    pub spot_count: i64,
    pub caught_count: i64,
}

/// Per-group score databases living under one storage root.
///
/// Every group gets its own SQLite file, `<root>/<group-id>.db`. The file only appears once
/// the first spot is recorded, so its absence means "no data yet". Access to one group is
/// serialized through a per-group async lock held by [`GroupStore`].
pub struct ScoreStore {
    root: PathBuf,
    locks: Mutex<HashMap<GroupId, Arc<AsyncMutex<()>>>>,
}

impl ScoreStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    #[cfg(test)]
    fn lock_count(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Location of a group's database file
    pub fn store_path(&self, group: GroupId) -> PathBuf {
        self.root.join(format!("{group}.db"))
    }

    async fn lock_group(&self, group: GroupId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            // Only the registry holds an idle lock
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(group).or_default())
        };
        lock.lock_owned().await
    }

    /// Open the group's store, creating the database and its table if absent
    pub async fn ensure(&self, group: GroupId) -> Result<GroupStore, StoreError> {
        let guard = self.lock_group(group).await;

        tokio::fs::create_dir_all(&self.root).await?;
        let path = self.store_path(group);

        let mut conn = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true)
            .connect()
            .await?;
        sqlx::query(CREATE_SPOT_STATS).execute(&mut conn).await?;

        debug!(group, path = %path.display(), "Opened group score store");

        Ok(GroupStore {
            conn,
            _guard: guard,
        })
    }

    /// Open the group's store only if it has already been created
    pub async fn open_existing(&self, group: GroupId) -> Result<Option<GroupStore>, StoreError> {
        let guard = self.lock_group(group).await;

        let path = self.store_path(group);
        if !tokio::fs::try_exists(&path).await? {
            return Ok(None);
        }

        let mut conn = SqliteConnectOptions::new().filename(&path).connect().await?;
        sqlx::query(CREATE_SPOT_STATS).execute(&mut conn).await?;

        Ok(Some(GroupStore {
            conn,
            _guard: guard,
        }))
    }

    /// Whether a store has been created for the group
    pub async fn exists(&self, group: GroupId) -> Result<bool, StoreError> {
        Ok(tokio::fs::try_exists(self.store_path(group)).await?)
    }

    /// Irreversibly delete the group's store
    pub async fn destroy(&self, group: GroupId) -> Result<(), StoreError> {
        let _guard = self.lock_group(group).await;

        let path = self.store_path(group);
        if !tokio::fs::try_exists(&path).await? {
            return Err(StoreError::Missing(group));
        }

        tokio::fs::remove_file(&path).await?;
        for suffix in SIDECAR_SUFFIXES {
            match tokio::fs::remove_file(sidecar_path(&path, suffix)).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }

        info!(group, "Group score store destroyed");
        Ok(())
    }
}

fn sidecar_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// An open connection to one group's store.
///
/// Holds the group's lock until dropped or closed.
pub struct GroupStore {
    conn: SqliteConnection,
    _guard: OwnedMutexGuard<()>,
}

impl GroupStore {
    /// Credit `sender` with `mention_count` spots
    pub async fn record_spot(&mut self, sender: &str, mention_count: usize) -> Result<(), StoreError> {
        let mut tx = self.conn.begin().await?;
        add_spots(&mut *tx, sender, mention_count).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Count one catch against `target`
    pub async fn record_caught(&mut self, target: &str) -> Result<(), StoreError> {
        let mut tx = self.conn.begin().await?;
        add_catch(&mut *tx, target).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Apply a whole spot event in one transaction: the sender gains one spot per mention
    /// and every mention (duplicates included) gains one catch.
    pub async fn apply_spot(&mut self, sender: &str, mentions: &[String]) -> Result<(), StoreError> {
        let mut tx = self.conn.begin().await?;

        add_spots(&mut *tx, sender, mentions.len()).await?;
        for mention in mentions {
            add_catch(&mut *tx, mention).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Members ranked by spots made, ties by identifier
    pub async fn leaderboard_by_spot(&mut self) -> Result<Vec<LeaderboardEntry>, StoreError> {
        let entries = sqlx::query_as::<_, LeaderboardEntry>(
            "SELECT username AS identifier, spot_num AS count FROM spot_stats
             ORDER BY spot_num DESC, username ASC",
        )
        .fetch_all(&mut self.conn)
        .await?;
        Ok(entries)
    }

    /// Members ranked by times caught, ties by identifier
    pub async fn leaderboard_by_caught(&mut self) -> Result<Vec<LeaderboardEntry>, StoreError> {
        let entries = sqlx::query_as::<_, LeaderboardEntry>(
            "SELECT username AS identifier, caught_num AS count FROM spot_stats
             ORDER BY caught_num DESC, username ASC",
        )
        .fetch_all(&mut self.conn)
        .await?;
        Ok(entries)
    }

    pub async fn member(&mut self, identifier: &str) -> Result<Option<MemberRecord>, StoreError> {
        let record = sqlx::query_as::<_, MemberRecord>(
            "SELECT username AS identifier, spot_num AS spot_count, caught_num AS caught_count
             FROM spot_stats WHERE username = ?1",
        )
        .bind(identifier)
        .fetch_optional(&mut self.conn)
        .await?;
        Ok(record)
    }

    #[cfg(test)]
    pub(crate) async fn member_count(&mut self) -> Result<i64, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM spot_stats")
            .fetch_one(&mut self.conn)
            .await?;
        Ok(count)
    }

    /// Close the connection and release the group's lock
    pub async fn close(self) -> Result<(), StoreError> {
        let GroupStore { conn, _guard } = self;
        conn.close().await?;
        Ok(())
    }
}

async fn ensure_member(conn: &mut SqliteConnection, identifier: &str) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO spot_stats (username, spot_num, caught_num) VALUES (?1, 0, 0)
         ON CONFLICT(username) DO NOTHING",
    )
    .bind(identifier)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn add_spots(
    conn: &mut SqliteConnection,
    sender: &str,
    mention_count: usize,
) -> Result<(), StoreError> {
    if mention_count < 1 {
        return Err(StoreError::InvalidIncrement(mention_count));
    }
    let increment =
        i64::try_from(mention_count).map_err(|_| StoreError::InvalidIncrement(mention_count))?;

    ensure_member(conn, sender).await?;
    sqlx::query("UPDATE spot_stats SET spot_num = spot_num + ?1 WHERE username = ?2")
        .bind(increment)
        .bind(sender)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

async fn add_catch(conn: &mut SqliteConnection, target: &str) -> Result<(), StoreError> {
    ensure_member(conn, target).await?;
    sqlx::query("UPDATE spot_stats SET caught_num = caught_num + 1 WHERE username = ?1")
        .bind(target)
        .execute(&mut *conn)
        .await?;
    Ok(())
}
