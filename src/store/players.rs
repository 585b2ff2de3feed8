//! Player records and roster-independent player operations

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::game::arena::Coord;
use crate::game::lineup::Position;
use crate::game::positioning::PlayerMovement;

use super::db::{Database, StoreError};

/// A player, rostered or free agent.
///
/// Attributes sit in [0, 100]. `primary_position` is fixed at creation;
/// `current_position` and `depth` change by administrative assignment.
/// Depth 1 is first-string; 0 means unranked (and counts as a starter
/// until an assignment says otherwise).
#[derive(Debug, Clone, Serialize)]
pub struct Player {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub country: String,
    pub age: u32,
    pub years_pro: u32,
    pub speed: i32,
    pub strength: i32,
    pub skill: i32,
    pub toughness: i32,
    pub awareness: i32,
    pub teamwork: i32,
    pub injury: i32,
    pub primary_position: Position,
    pub current_position: Position,
    pub depth: i32,
    pub team_id: Option<Uuid>,
    pub location: Coord,
    pub target: Coord,
    pub created_at: DateTime<Utc>,
}

/// Player store operations
#[derive(Clone)]
pub struct PlayerStore {
    db: Database,
}

impl PlayerStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert a batch of generated players in one commit.
    pub fn insert_many(&self, players: Vec<Player>) -> Vec<Player> {
        let mut tables = self.db.write();
        for player in &players {
            tables.players.insert(player.id, player.clone());
        }
        players
    }

    pub fn get(&self, player_id: Uuid) -> Result<Player, StoreError> {
        self.db
            .read()
            .players
            .get(&player_id)
            .cloned()
            .ok_or(StoreError::NotFound("player"))
    }

    /// All players, oldest first.
    pub fn list(&self) -> Vec<Player> {
        let tables = self.db.read();
        let mut players: Vec<Player> = tables.players.values().cloned().collect();
        players.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        players
    }

    /// Players whose primary position matches, oldest first.
    pub fn list_by_primary_position(&self, position: Position) -> Vec<Player> {
        let mut players: Vec<Player> = self
            .db
            .read()
            .players
            .values()
            .filter(|p| p.primary_position == position)
            .cloned()
            .collect();
        players.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        players
    }

    /// Administrative reassignment of current position and depth rank.
    pub fn assign(
        &self,
        player_id: Uuid,
        current_position: Position,
        depth: i32,
    ) -> Result<Player, StoreError> {
        let mut tables = self.db.write();
        let player = tables
            .players
            .get_mut(&player_id)
            .ok_or(StoreError::NotFound("player"))?;
        player.current_position = current_position;
        player.depth = depth;
        Ok(player.clone())
    }

    /// Apply a batch of computed movements in one commit. If any player id
    /// fails to resolve, nothing is written.
    pub fn apply_movements(&self, movements: &[PlayerMovement]) -> Result<(), StoreError> {
        let mut tables = self.db.write();

        if movements
            .iter()
            .any(|m| !tables.players.contains_key(&m.player_id))
        {
            return Err(StoreError::NotFound("player"));
        }

        for movement in movements {
            let player = tables
                .players
                .get_mut(&movement.player_id)
                .expect("checked above");
            player.location = movement.location;
            player.target = movement.target;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::generator::generate_player;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn apply_movements_is_all_or_nothing() {
        let db = Database::new();
        let players = PlayerStore::new(db);
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let stored = players.insert_many(vec![generate_player(&mut rng)]);
        let known = stored[0].id;

        let movements = vec![
            PlayerMovement {
                player_id: known,
                location: Coord::new(1.0, 2.0, 3.0),
                target: Coord::new(4.0, 5.0, 6.0),
            },
            PlayerMovement {
                player_id: Uuid::new_v4(),
                location: Coord::ORIGIN,
                target: Coord::ORIGIN,
            },
        ];

        assert!(matches!(
            players.apply_movements(&movements),
            Err(StoreError::NotFound("player"))
        ));

        // The known player must be untouched after the failed batch.
        let reloaded = players.get(known).unwrap();
        assert_eq!(reloaded.location, stored[0].location);
        assert_eq!(reloaded.target, stored[0].target);
    }

    #[test]
    fn assignment_updates_position_and_depth() {
        let db = Database::new();
        let players = PlayerStore::new(db);
        let mut rng = ChaCha8Rng::seed_from_u64(8);

        let stored = players.insert_many(vec![generate_player(&mut rng)]);
        let assigned = players
            .assign(stored[0].id, Position::Keeper, 2)
            .unwrap();

        assert_eq!(assigned.current_position, Position::Keeper);
        assert_eq!(assigned.depth, 2);
        // Primary position never moves.
        assert_eq!(assigned.primary_position, stored[0].primary_position);
    }
}
