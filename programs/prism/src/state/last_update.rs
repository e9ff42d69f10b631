use anchor_lang::prelude::*;

use crate::{math::SafeMath, STALE_AFTER_SECONDS};

#[derive(AnchorSerialize, AnchorDeserialize, InitSpace, Clone, Copy)]
pub struct LastUpdate {
    /// Unix timestamp of the last refresh.
    pub timestamp: i64,
    /// True when a mutating operation ran after the last refresh.
    pub is_stale: bool,
}

impl LastUpdate {
    pub fn new(timestamp: i64) -> Self {
        Self {
            timestamp,
            is_stale: true,
        }
    }

    pub fn seconds_elapsed(&self, timestamp: i64) -> Result<i64> {
        timestamp.safe_sub(self.timestamp)
    }

    /// Every mutating operation other than a refresh marks the entity stale,
    /// forcing the next consumer to refresh against current time and prices.
    pub fn mark_stale(&mut self) {
        self.is_stale = true;
    }

    pub fn update(&mut self, timestamp: i64) {
        self.timestamp = timestamp;
        self.is_stale = false;
    }

    pub fn is_stale(&self, timestamp: i64) -> Result<bool> {
        Ok(self.is_stale || self.seconds_elapsed(timestamp)? >= STALE_AFTER_SECONDS)
    }
}

pub fn validate_reserve_refreshed(stale: bool) -> Result<()> {
    require!(!stale, crate::error::LendingError::ReserveStale);
    Ok(())
}

pub fn validate_obligation_refreshed(stale: bool) -> Result<()> {
    require!(!stale, crate::error::LendingError::ObligationStale);
    Ok(())
}
