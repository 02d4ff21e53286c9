//! Host-facing event surface.
//!
//! The host game server intercepts tribe lifecycle events (a member leaves,
//! a player asks to join, two tribes merge, a world loads) and forwards
//! them here. This layer owns the event-level rules that are not slot
//! policy: the activation grace period after a world start, the exemption
//! for administrative departures, and the auto-wipe window for freshly
//! detected worlds. Everything else delegates to [`CooldownEngine`].
//!
//! Storage failures surface as `Err` so the host can log them; they never
//! panic and nothing is retried -- the next equivalent game event retries
//! naturally.

use tracing::{debug, info};

use tribeslots_types::{SlotReport, SlotStamp, TribeId};

use crate::engine::{CooldownEngine, EngineError};

/// A world reported within this many seconds of run-time counts as freshly
/// started for auto-wipe purposes.
const STARTUP_WINDOW_SECS: SlotStamp = 10;

/// Event handler wrapping a [`CooldownEngine`] for the host environment.
pub struct TribeEventHandler {
    engine: CooldownEngine,
}

impl TribeEventHandler {
    /// Wrap an engine.
    pub const fn new(engine: CooldownEngine) -> Self {
        Self { engine }
    }

    /// Access the wrapped engine.
    pub const fn engine(&self) -> &CooldownEngine {
        &self.engine
    }

    /// A member left the tribe: put one slot on cooldown.
    ///
    /// Declines silently (logged at debug) when the departure is exempt
    /// (e.g. a server admin leaving) or when `now` is still inside the
    /// activation grace period -- departures right after a restart are
    /// usually the restart's fault, not a real removal. Returns whether a
    /// cooldown was recorded.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Storage`] if the store fails; the cooldown is
    /// then not recorded.
    pub async fn on_member_departed(
        &self,
        tribe_id: TribeId,
        capacity: usize,
        now: SlotStamp,
        departure_is_exempt: bool,
    ) -> Result<bool, EngineError> {
        if departure_is_exempt {
            debug!(%tribe_id, "Exempt departure, no cooldown");
            return Ok(false);
        }
        if now <= self.engine.settings().activation_delay_secs {
            debug!(
                %tribe_id,
                now,
                delay = self.engine.settings().activation_delay_secs,
                "Inside activation grace period, no cooldown"
            );
            return Ok(false);
        }
        self.engine.reserve_slot(tribe_id, capacity, now).await
    }

    /// A player asked to join the tribe. True means the join may proceed.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Storage`] if the store read fails.
    pub async fn on_join_requested(
        &self,
        tribe_id: TribeId,
        members: usize,
        capacity: usize,
        now: SlotStamp,
    ) -> Result<bool, EngineError> {
        let decision = self
            .engine
            .can_admit_new_member(tribe_id, members, capacity, now)
            .await?;
        Ok(decision.is_admitted())
    }

    /// Two tribes want to merge. True means the merge may proceed; when it
    /// does, the cooldown records have already been combined.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Storage`] if a store call fails.
    pub async fn on_merge_requested(
        &self,
        new_tribe_id: TribeId,
        old_tribe_id: TribeId,
        members_new: usize,
        members_old: usize,
        capacity: usize,
        now: SlotStamp,
    ) -> Result<bool, EngineError> {
        let decision = self
            .engine
            .can_admit_merge(
                new_tribe_id,
                old_tribe_id,
                members_new,
                members_old,
                capacity,
                now,
            )
            .await?;
        Ok(decision.is_admitted())
    }

    /// The world began play. Wipes the store when auto-wipe is enabled and
    /// the run-time clock shows a freshly started world. Returns whether a
    /// wipe happened.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Storage`] if the wipe fails.
    pub async fn on_world_reset(&self, now: SlotStamp) -> Result<bool, EngineError> {
        if !self.engine.settings().auto_wipe || now >= STARTUP_WINDOW_SECS {
            return Ok(false);
        }
        self.engine.wipe().await?;
        info!(now, "Fresh world detected, wiped cooldown records");
        Ok(true)
    }

    /// Snapshot of a tribe's active cooldowns, for chat-command display.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Storage`] if the store read fails.
    pub async fn slot_report(
        &self,
        tribe_id: TribeId,
        now: SlotStamp,
    ) -> Result<SlotReport, EngineError> {
        self.engine.slot_report(tribe_id, now).await
    }
}
