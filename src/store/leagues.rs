//! Leagues and seasons

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::db::{Database, StoreError};

/// A league of teams
#[derive(Debug, Clone, Serialize)]
pub struct League {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A scheduling window for games within a league
#[derive(Debug, Clone, Serialize)]
pub struct Season {
    pub id: Uuid,
    pub league_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    /// Simulated minutes between interval logs
    pub game_interval: u32,
}

/// League store operations
#[derive(Clone)]
pub struct LeagueStore {
    db: Database,
}

impl LeagueStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create a league. Names are unique.
    pub fn create(&self, name: &str) -> Result<League, StoreError> {
        let mut tables = self.db.write();

        if tables.leagues.values().any(|l| l.name == name) {
            return Err(StoreError::Conflict(format!(
                "league '{}' already exists",
                name
            )));
        }

        let league = League {
            id: Uuid::new_v4(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        tables.leagues.insert(league.id, league.clone());
        Ok(league)
    }

    /// All leagues, oldest first.
    pub fn list(&self) -> Vec<League> {
        let mut leagues: Vec<League> = self.db.read().leagues.values().cloned().collect();
        leagues.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        leagues
    }

    /// Delete a league and everything under it: its seasons and their
    /// games, its teams and their games, each game's snitch, bludgers and
    /// interval logs. Rostered players are released, not deleted.
    pub fn delete(&self, league_id: Uuid) -> Result<(), StoreError> {
        let mut tables = self.db.write();

        if !tables.leagues.contains_key(&league_id) {
            return Err(StoreError::NotFound("league"));
        }

        let season_ids: Vec<Uuid> = tables
            .seasons
            .values()
            .filter(|s| s.league_id == league_id)
            .map(|s| s.id)
            .collect();
        for season_id in season_ids {
            tables.cascade_delete_season(season_id);
        }

        let team_ids: Vec<Uuid> = tables
            .teams
            .values()
            .filter(|t| t.league_id == league_id)
            .map(|t| t.id)
            .collect();
        for team_id in team_ids {
            tables.cascade_delete_team(team_id);
        }

        tables.leagues.remove(&league_id);
        Ok(())
    }

    /// Create a season under a league.
    pub fn create_season(
        &self,
        league_id: Uuid,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        game_interval: u32,
    ) -> Result<Season, StoreError> {
        let mut tables = self.db.write();

        if !tables.leagues.contains_key(&league_id) {
            return Err(StoreError::NotFound("league"));
        }

        let season = Season {
            id: Uuid::new_v4(),
            league_id,
            start_date,
            end_date,
            game_interval,
        };
        tables.seasons.insert(season.id, season.clone());
        Ok(season)
    }
}
