//! Scenario files and their replay.
//!
//! A scenario is a [`StaticHost`] world plus a time-ordered list of host
//! callbacks. Event times are millisecond offsets from `start`. Replaying
//! feeds each callback through the admission helpers and offers the engine a
//! tick wherever the scenario asks for one; a final tick one interval after
//! the last event flushes anything still queued.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use bounty_core::admission::{self, DestroyedBlock};
use bounty_core::config::AdmissionConfig;
use bounty_core::engine::{CycleReport, Engine};
use bounty_core::memory::StaticHost;
use bounty_types::{EntityRef, IdentityId, RewardGrant, RosterEntry};

use crate::error::EngineError;

/// One host callback or scheduler tick.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScenarioEvent {
    /// A block was damaged.
    Damage {
        /// Offset from scenario start.
        at_ms: i64,
        /// The damaged block.
        block: EntityRef,
        /// Whatever dealt the damage.
        attacker: EntityRef,
        /// Damage amount.
        amount: f32,
    },
    /// A block was destroyed.
    Destroyed {
        /// Offset from scenario start.
        at_ms: i64,
        /// The callback payload.
        #[serde(flatten)]
        block: DestroyedBlock,
    },
    /// A player connected.
    Join {
        /// Offset from scenario start.
        at_ms: i64,
        /// The player.
        #[serde(flatten)]
        player: RosterEntry,
    },
    /// A player disconnected.
    Leave {
        /// Offset from scenario start.
        at_ms: i64,
        /// The player's identity.
        identity: IdentityId,
    },
    /// The host scheduler ticked.
    Tick {
        /// Offset from scenario start.
        at_ms: i64,
    },
}

impl ScenarioEvent {
    /// Offset from scenario start.
    pub const fn at_ms(&self) -> i64 {
        match self {
            Self::Damage { at_ms, .. }
            | Self::Destroyed { at_ms, .. }
            | Self::Join { at_ms, .. }
            | Self::Leave { at_ms, .. }
            | Self::Tick { at_ms } => *at_ms,
        }
    }
}

/// A world and the callbacks to replay against it.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    /// Wall time of offset zero.
    #[serde(default = "default_start")]
    pub start: DateTime<Utc>,
    /// The host world.
    #[serde(default)]
    pub world: StaticHost,
    /// Callbacks in the order they reach the host.
    #[serde(default)]
    pub events: Vec<ScenarioEvent>,
}

fn default_start() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

impl Scenario {
    /// Load a scenario from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self, EngineError> {
        let contents = std::fs::read_to_string(path).map_err(|source| EngineError::ScenarioIo {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yml::from_str(&contents).map_err(|source| EngineError::ScenarioYaml {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn time_of(start: DateTime<Utc>, offset_ms: i64) -> Result<DateTime<Utc>, EngineError> {
    TimeDelta::try_milliseconds(offset_ms)
        .and_then(|d| start.checked_add_signed(d))
        .ok_or(EngineError::EventTime { offset_ms })
}

/// Everything a replay produced.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    /// Cycles that did any work.
    pub cycles: Vec<CycleReport>,
    /// Every reward issued, in order.
    pub grants: Vec<RewardGrant>,
    /// Final balances of every credited identity.
    pub balances: BTreeMap<IdentityId, i64>,
    /// Broadcast messages, in order.
    pub notifications: Vec<String>,
}

/// Replay `scenario` through `engine`.
pub fn replay(
    scenario: Scenario,
    engine: &mut Engine,
    rules: &AdmissionConfig,
) -> Result<ReplayReport, EngineError> {
    let Scenario {
        start,
        world: mut host,
        events,
    } = scenario;
    let queues = engine.queues();
    let mut cycles = Vec::new();
    let mut last = start;

    for event in &events {
        let at = time_of(start, event.at_ms())?;
        last = last.max(at);
        match event {
            ScenarioEvent::Damage {
                block,
                attacker,
                amount,
                ..
            } => {
                if admission::on_block_damaged(&queues, &host, *block, *attacker, *amount, at)
                    .is_none()
                {
                    debug!(%block, "Damage ignored");
                }
            }
            ScenarioEvent::Destroyed { block, .. } => {
                if admission::on_block_destroyed(&queues, &host, rules, block).is_none() {
                    debug!(entity_name = %block.entity_name, "Destruction ignored");
                }
            }
            ScenarioEvent::Join { player, .. } => {
                host.roster.retain(|p| p.identity != player.identity);
                host.roster.push(player.clone());
            }
            ScenarioEvent::Leave { identity, .. } => {
                host.roster.retain(|p| p.identity != *identity);
            }
            ScenarioEvent::Tick { .. } => {
                if let Some(report) = engine.tick(at, &mut host).into_report() {
                    keep_if_busy(&mut cycles, report);
                }
            }
        }
    }

    if queues.pending_damage() > 0 || queues.pending_kills() > 0 {
        let flush_at = last
            .checked_add_signed(engine.clock().interval())
            .unwrap_or(last);
        info!(%flush_at, "Flushing queued events");
        if let Some(report) = engine.tick(flush_at, &mut host).into_report() {
            keep_if_busy(&mut cycles, report);
        }
    }

    let grants: Vec<RewardGrant> = cycles.iter().flat_map(|c| c.grants.clone()).collect();
    Ok(ReplayReport {
        cycles,
        grants,
        balances: host.balances,
        notifications: host.notifications,
    })
}

fn keep_if_busy(cycles: &mut Vec<CycleReport>, report: CycleReport) {
    if report.damage_merged > 0 || report.kills_processed > 0 || report.pruned > 0 {
        cycles.push(report);
    }
}
