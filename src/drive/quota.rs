//! Per-user storage accounting.

use tracing::debug;

use crate::db::UserRepository;
use crate::{Database, DriveError, Result};

/// Bytes used against the limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Usage {
    pub used: i64,
    pub limit: i64,
}

/// Keeps `storage_used` within `[0, storage_limit]`.
///
/// Both directions are single conditional statements, so concurrent uploads
/// cannot push a user past the limit.
pub struct QuotaAccountant<'a> {
    db: &'a Database,
}

impl<'a> QuotaAccountant<'a> {
    /// Create a new QuotaAccountant.
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Current usage of a user.
    pub async fn usage(&self, user_id: i64) -> Result<Usage> {
        let user = UserRepository::new(self.db.pool())
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| DriveError::NotFound("User not found".to_string()))?;
        Ok(Usage {
            used: user.storage_used,
            limit: user.storage_limit,
        })
    }

    /// Claim `bytes` for a user, failing with `QuotaExceeded` if it would pass the limit.
    pub async fn reserve(&self, user_id: i64, bytes: i64) -> Result<()> {
        let repo = UserRepository::new(self.db.pool());
        if repo.try_add_storage_used(user_id, bytes).await? {
            debug!(user_id, bytes, "Reserved storage");
            return Ok(());
        }

        let usage = self.usage(user_id).await?;
        Err(DriveError::QuotaExceeded {
            used: usage.used,
            requested: bytes,
            limit: usage.limit,
        })
    }

    /// Give back `bytes`, flooring the counter at zero.
    pub async fn release(&self, user_id: i64, bytes: i64) -> Result<()> {
        UserRepository::new(self.db.pool())
            .subtract_storage_used(user_id, bytes)
            .await?;
        debug!(user_id, bytes, "Released storage");
        Ok(())
    }
}
