//! Teams and roster membership

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::store::players::Player;

use super::db::{Database, StoreError};

/// A team owned by a user, competing in a league
#[derive(Debug, Clone, Serialize)]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    pub league_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Team store operations
#[derive(Clone)]
pub struct TeamStore {
    db: Database,
}

impl TeamStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create a team in a league. Names are unique.
    pub fn create(
        &self,
        name: &str,
        owner_id: Uuid,
        league_id: Uuid,
    ) -> Result<Team, StoreError> {
        let mut tables = self.db.write();

        if !tables.leagues.contains_key(&league_id) {
            return Err(StoreError::NotFound("league"));
        }
        if tables.teams.values().any(|t| t.name == name) {
            return Err(StoreError::Conflict(format!(
                "team '{}' already exists",
                name
            )));
        }

        let team = Team {
            id: Uuid::new_v4(),
            name: name.to_string(),
            owner_id,
            league_id,
            created_at: Utc::now(),
        };
        tables.teams.insert(team.id, team.clone());
        Ok(team)
    }

    pub fn get(&self, team_id: Uuid) -> Result<Team, StoreError> {
        self.db
            .read()
            .teams
            .get(&team_id)
            .cloned()
            .ok_or(StoreError::NotFound("team"))
    }

    /// The team's full roster, in signing order (creation time, then id).
    /// Lineup resolution relies on this order being stable.
    pub fn roster(&self, team_id: Uuid) -> Result<Vec<Player>, StoreError> {
        let tables = self.db.read();

        if !tables.teams.contains_key(&team_id) {
            return Err(StoreError::NotFound("team"));
        }

        let mut roster: Vec<Player> = tables
            .players
            .values()
            .filter(|p| p.team_id == Some(team_id))
            .cloned()
            .collect();
        roster.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        Ok(roster)
    }

    /// Sign a free agent to the roster.
    pub fn add_player(&self, team_id: Uuid, player_id: Uuid) -> Result<Player, StoreError> {
        let mut tables = self.db.write();

        if !tables.teams.contains_key(&team_id) {
            return Err(StoreError::NotFound("team"));
        }
        let player = tables
            .players
            .get_mut(&player_id)
            .ok_or(StoreError::NotFound("player"))?;

        if player.team_id.is_some() {
            return Err(StoreError::Conflict(
                "player is already rostered".to_string(),
            ));
        }

        player.team_id = Some(team_id);
        Ok(player.clone())
    }

    /// Release a player from this team's roster.
    pub fn remove_player(&self, team_id: Uuid, player_id: Uuid) -> Result<Player, StoreError> {
        let mut tables = self.db.write();

        if !tables.teams.contains_key(&team_id) {
            return Err(StoreError::NotFound("team"));
        }
        let player = tables
            .players
            .get_mut(&player_id)
            .ok_or(StoreError::NotFound("player"))?;

        if player.team_id != Some(team_id) {
            return Err(StoreError::NotFound("roster entry"));
        }

        player.team_id = None;
        Ok(player.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::generator::generate_player;
    use crate::store::leagues::LeagueStore;
    use crate::store::players::PlayerStore;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn fixture() -> (TeamStore, PlayerStore, Team) {
        let db = Database::new();
        let leagues = LeagueStore::new(db.clone());
        let teams = TeamStore::new(db.clone());
        let players = PlayerStore::new(db);

        let league = leagues.create("Test League").unwrap();
        let team = teams
            .create("Holyhead Harpies", Uuid::new_v4(), league.id)
            .unwrap();
        (teams, players, team)
    }

    #[test]
    fn double_signing_is_conflict() {
        let (teams, players, team) = fixture();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let stored = players.insert_many(vec![generate_player(&mut rng)]);

        teams.add_player(team.id, stored[0].id).unwrap();
        assert!(matches!(
            teams.add_player(team.id, stored[0].id),
            Err(StoreError::Conflict(_))
        ));
    }

    #[test]
    fn removing_an_unrostered_player_fails() {
        let (teams, players, team) = fixture();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let stored = players.insert_many(vec![generate_player(&mut rng)]);

        assert!(matches!(
            teams.remove_player(team.id, stored[0].id),
            Err(StoreError::NotFound("roster entry"))
        ));
    }

    #[test]
    fn roster_keeps_signing_order() {
        let (teams, players, team) = fixture();
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let batch: Vec<_> = (0..4).map(|_| generate_player(&mut rng)).collect();
        let stored = players.insert_many(batch);
        for player in &stored {
            teams.add_player(team.id, player.id).unwrap();
        }

        let roster = teams.roster(team.id).unwrap();
        let expected: Vec<Uuid> = {
            let mut sorted = stored.clone();
            sorted.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
            sorted.iter().map(|p| p.id).collect()
        };
        let actual: Vec<Uuid> = roster.iter().map(|p| p.id).collect();
        assert_eq!(actual, expected);
    }
}
