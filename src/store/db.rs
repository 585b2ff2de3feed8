//! In-process relational store shared by the entity stores
//!
//! Every store method takes the full table set behind a single lock, so a
//! logical operation commits all of its writes or none of them. The lock is
//! the commit boundary; nothing here suspends while holding it.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde::Serialize;
use uuid::Uuid;

use crate::store::games::{Bludger, Game, GameIntervalLog, Snitch};
use crate::store::leagues::{League, Season};
use crate::store::players::Player;
use crate::store::teams::Team;
use crate::store::users::User;

/// The full table set. Entity stores reach rows through a [`Database`]
/// guard; foreign keys are plain ids validated at write time.
#[derive(Default)]
pub(crate) struct Tables {
    pub users: HashMap<Uuid, User>,
    pub leagues: HashMap<Uuid, League>,
    pub seasons: HashMap<Uuid, Season>,
    pub teams: HashMap<Uuid, Team>,
    pub players: HashMap<Uuid, Player>,
    pub games: HashMap<Uuid, Game>,
    pub snitches: HashMap<Uuid, Snitch>,
    pub bludgers: HashMap<Uuid, Bludger>,
    pub interval_logs: HashMap<Uuid, GameIntervalLog>,
}

impl Tables {
    /// Delete a game together with its snitch, bludgers and interval logs.
    pub fn cascade_delete_game(&mut self, game_id: Uuid) {
        self.games.remove(&game_id);
        self.snitches.retain(|_, s| s.game_id != game_id);
        self.bludgers.retain(|_, b| b.game_id != game_id);
        self.interval_logs.retain(|_, l| l.game_id != game_id);
    }

    /// Delete a team, its games (home or away), and release its players.
    pub fn cascade_delete_team(&mut self, team_id: Uuid) {
        let game_ids: Vec<Uuid> = self
            .games
            .values()
            .filter(|g| g.home_team_id == team_id || g.away_team_id == team_id)
            .map(|g| g.id)
            .collect();
        for game_id in game_ids {
            self.cascade_delete_game(game_id);
        }

        for player in self.players.values_mut() {
            if player.team_id == Some(team_id) {
                player.team_id = None;
            }
        }

        self.teams.remove(&team_id);
    }

    /// Delete a season and its games.
    pub fn cascade_delete_season(&mut self, season_id: Uuid) {
        let game_ids: Vec<Uuid> = self
            .games
            .values()
            .filter(|g| g.season_id == season_id)
            .map(|g| g.id)
            .collect();
        for game_id in game_ids {
            self.cascade_delete_game(game_id);
        }
        self.seasons.remove(&season_id);
    }
}

/// Shared handle to the table set
#[derive(Clone, Default)]
pub struct Database {
    tables: Arc<RwLock<Tables>>,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read()
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write()
    }

    /// Row counts for the health endpoint
    pub fn counts(&self) -> StoreCounts {
        let tables = self.read();
        StoreCounts {
            users: tables.users.len(),
            leagues: tables.leagues.len(),
            teams: tables.teams.len(),
            players: tables.players.len(),
            games: tables.games.len(),
        }
    }
}

/// Snapshot of table sizes
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StoreCounts {
    pub users: usize,
    pub leagues: usize,
    pub teams: usize,
    pub players: usize,
    pub games: usize,
}

/// Store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),
}
