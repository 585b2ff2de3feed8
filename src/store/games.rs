//! Games, the snitch, bludgers, and interval logs

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::game::arena::Coord;

use super::db::{Database, StoreError};

/// Status a game is created with. The field itself is free-form.
pub const STATUS_SCHEDULED: &str = "scheduled";

/// A scheduled or running game between two teams
#[derive(Debug, Clone, Serialize)]
pub struct Game {
    pub id: Uuid,
    pub season_id: Uuid,
    pub home_team_id: Uuid,
    pub away_team_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub status: String,
}

/// The single mobile catch target of a game. Created lazily on the first
/// placement; its row id never changes afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct Snitch {
    pub id: Uuid,
    pub game_id: Uuid,
    pub position: Coord,
}

/// One of a game's two bludgers
#[derive(Debug, Clone, Serialize)]
pub struct Bludger {
    pub id: Uuid,
    pub game_id: Uuid,
    pub position: Coord,
}

/// Cumulative score record at one simulated interval
#[derive(Debug, Clone, Serialize)]
pub struct GameIntervalLog {
    pub id: Uuid,
    pub game_id: Uuid,
    /// 1-based, dense per game
    pub order: u32,
    pub home_score: i32,
    pub away_score: i32,
}

/// Game store operations
#[derive(Clone)]
pub struct GameStore {
    db: Database,
}

impl GameStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Schedule a game between two teams of a season.
    pub fn create(
        &self,
        season_id: Uuid,
        home_team_id: Uuid,
        away_team_id: Uuid,
        start_time: DateTime<Utc>,
    ) -> Result<Game, StoreError> {
        let mut tables = self.db.write();

        if !tables.seasons.contains_key(&season_id) {
            return Err(StoreError::NotFound("season"));
        }
        if !tables.teams.contains_key(&home_team_id) || !tables.teams.contains_key(&away_team_id)
        {
            return Err(StoreError::NotFound("team"));
        }

        let game = Game {
            id: Uuid::new_v4(),
            season_id,
            home_team_id,
            away_team_id,
            start_time,
            status: STATUS_SCHEDULED.to_string(),
        };
        tables.games.insert(game.id, game.clone());
        Ok(game)
    }

    pub fn get(&self, game_id: Uuid) -> Result<Game, StoreError> {
        self.db
            .read()
            .games
            .get(&game_id)
            .cloned()
            .ok_or(StoreError::NotFound("game"))
    }

    /// Write the snitch's coordinate, creating the row on first call and
    /// rewriting the same row afterwards. One commit either way.
    pub fn upsert_snitch(&self, game_id: Uuid, position: Coord) -> Result<Snitch, StoreError> {
        let mut tables = self.db.write();

        if !tables.games.contains_key(&game_id) {
            return Err(StoreError::NotFound("game"));
        }

        if let Some(snitch) = tables.snitches.values_mut().find(|s| s.game_id == game_id) {
            snitch.position = position;
            return Ok(snitch.clone());
        }

        let snitch = Snitch {
            id: Uuid::new_v4(),
            game_id,
            position,
        };
        tables.snitches.insert(snitch.id, snitch.clone());
        Ok(snitch)
    }

    pub fn snitch(&self, game_id: Uuid) -> Result<Snitch, StoreError> {
        let tables = self.db.read();

        if !tables.games.contains_key(&game_id) {
            return Err(StoreError::NotFound("game"));
        }
        tables
            .snitches
            .values()
            .find(|s| s.game_id == game_id)
            .cloned()
            .ok_or(StoreError::NotFound("snitch"))
    }

    /// Write both bludger coordinates, creating the pair on first call.
    /// Both rows land in one commit; ids are stable across calls.
    pub fn upsert_bludgers(
        &self,
        game_id: Uuid,
        positions: [Coord; 2],
    ) -> Result<Vec<Bludger>, StoreError> {
        let mut tables = self.db.write();

        if !tables.games.contains_key(&game_id) {
            return Err(StoreError::NotFound("game"));
        }

        let mut ids: Vec<Uuid> = tables
            .bludgers
            .values()
            .filter(|b| b.game_id == game_id)
            .map(|b| b.id)
            .collect();
        ids.sort();

        while ids.len() < 2 {
            let bludger = Bludger {
                id: Uuid::new_v4(),
                game_id,
                position: Coord::ORIGIN,
            };
            ids.push(bludger.id);
            tables.bludgers.insert(bludger.id, bludger);
        }

        let mut updated = Vec::with_capacity(2);
        for (id, position) in ids.iter().zip(positions) {
            let bludger = tables.bludgers.get_mut(id).expect("inserted above");
            bludger.position = position;
            updated.push(bludger.clone());
        }
        Ok(updated)
    }

    pub fn bludgers(&self, game_id: Uuid) -> Result<Vec<Bludger>, StoreError> {
        let tables = self.db.read();

        if !tables.games.contains_key(&game_id) {
            return Err(StoreError::NotFound("game"));
        }
        let mut bludgers: Vec<Bludger> = tables
            .bludgers
            .values()
            .filter(|b| b.game_id == game_id)
            .cloned()
            .collect();
        bludgers.sort_by_key(|b| b.id);
        Ok(bludgers)
    }

    /// Append the next interval log: order is last + 1 and the scores
    /// accumulate on top of the previous log.
    pub fn append_interval(
        &self,
        game_id: Uuid,
        home_points: i32,
        away_points: i32,
    ) -> Result<GameIntervalLog, StoreError> {
        let mut tables = self.db.write();

        if !tables.games.contains_key(&game_id) {
            return Err(StoreError::NotFound("game"));
        }

        let last = tables
            .interval_logs
            .values()
            .filter(|l| l.game_id == game_id)
            .max_by_key(|l| l.order)
            .cloned();

        let (order, home_base, away_base) = match last {
            Some(log) => (log.order + 1, log.home_score, log.away_score),
            None => (1, 0, 0),
        };

        let log = GameIntervalLog {
            id: Uuid::new_v4(),
            game_id,
            order,
            home_score: home_base + home_points,
            away_score: away_base + away_points,
        };
        tables.interval_logs.insert(log.id, log.clone());
        Ok(log)
    }

    /// All interval logs of a game, in order.
    pub fn intervals(&self, game_id: Uuid) -> Result<Vec<GameIntervalLog>, StoreError> {
        let tables = self.db.read();

        if !tables.games.contains_key(&game_id) {
            return Err(StoreError::NotFound("game"));
        }
        let mut logs: Vec<GameIntervalLog> = tables
            .interval_logs
            .values()
            .filter(|l| l.game_id == game_id)
            .cloned()
            .collect();
        logs.sort_by_key(|l| l.order);
        Ok(logs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::leagues::LeagueStore;
    use crate::store::teams::TeamStore;

    fn fixture() -> (GameStore, LeagueStore, Game) {
        let db = Database::new();
        let leagues = LeagueStore::new(db.clone());
        let teams = TeamStore::new(db.clone());
        let games = GameStore::new(db);

        let league = leagues.create("Cascade League").unwrap();
        let season = leagues
            .create_season(league.id, Utc::now(), Utc::now(), 30)
            .unwrap();
        let home = teams
            .create("Puddlemere United", Uuid::new_v4(), league.id)
            .unwrap();
        let away = teams
            .create("Chudley Cannons", Uuid::new_v4(), league.id)
            .unwrap();
        let game = games
            .create(season.id, home.id, away.id, Utc::now())
            .unwrap();
        (games, leagues, game)
    }

    #[test]
    fn snitch_upsert_reuses_the_row() {
        let (games, _leagues, game) = fixture();

        let first = games
            .upsert_snitch(game.id, Coord::new(1.0, 1.0, 1.0))
            .unwrap();
        let second = games
            .upsert_snitch(game.id, Coord::new(-2.0, 0.5, 3.0))
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_ne!(first.position, second.position);
    }

    #[test]
    fn bludger_pair_ids_are_stable() {
        let (games, _leagues, game) = fixture();

        let first = games
            .upsert_bludgers(game.id, [Coord::new(1.0, 0.0, 0.0), Coord::new(0.0, 1.0, 0.0)])
            .unwrap();
        let second = games
            .upsert_bludgers(game.id, [Coord::new(2.0, 0.0, 0.0), Coord::new(0.0, 2.0, 0.0)])
            .unwrap();

        let mut first_ids: Vec<Uuid> = first.iter().map(|b| b.id).collect();
        let mut second_ids: Vec<Uuid> = second.iter().map(|b| b.id).collect();
        first_ids.sort();
        second_ids.sort();
        assert_eq!(first_ids, second_ids);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn interval_logs_are_dense_and_cumulative() {
        let (games, _leagues, game) = fixture();

        games.append_interval(game.id, 10, 0).unwrap();
        games.append_interval(game.id, 0, 10).unwrap();
        let last = games.append_interval(game.id, 10, 0).unwrap();

        assert_eq!(last.order, 3);
        assert_eq!(last.home_score, 20);
        assert_eq!(last.away_score, 10);

        let orders: Vec<u32> = games
            .intervals(game.id)
            .unwrap()
            .iter()
            .map(|l| l.order)
            .collect();
        assert_eq!(orders, vec![1, 2, 3]);
    }

    #[test]
    fn league_delete_cascades_to_game_children() {
        let (games, leagues, game) = fixture();

        games
            .upsert_snitch(game.id, Coord::new(0.0, 0.0, 1.0))
            .unwrap();
        games.append_interval(game.id, 10, 0).unwrap();

        let league_id = leagues.list()[0].id;
        leagues.delete(league_id).unwrap();

        assert!(matches!(
            games.get(game.id),
            Err(StoreError::NotFound("game"))
        ));
        assert!(matches!(
            games.snitch(game.id),
            Err(StoreError::NotFound("game"))
        ));
    }
}
