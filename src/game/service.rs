//! Simulation orchestration over the store
//!
//! Each operation resolves its records, runs the pure core, and persists
//! the outcome. Operations touching the same game serialize through a
//! per-game lock so two simultaneous calls cannot interleave their writes;
//! operations on different games share nothing but the store itself.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::game::arena::ArenaConfig;
use crate::game::catch::{self, CatchOutcome};
use crate::game::generator::generate_player;
use crate::game::lineup::{
    all_positions_filled, missing_starters, resolve_lineup, LineupKind, LineupRules, Position,
    PositionMap,
};
use crate::game::performance::{beater_performance, team_performance};
use crate::game::positioning::{advance_player, PlayerMovement};
use crate::store::games::{Bludger, GameIntervalLog, Snitch};
use crate::store::players::Player;
use crate::store::{GameStore, PlayerStore, StoreError, TeamStore};

/// Points one goal is worth on the interval log
const POINTS_PER_GOAL: i32 = 10;

type GameLock = Arc<tokio::sync::Mutex<()>>;

/// One starter's movement, labeled with their lineup slot
#[derive(Debug, Clone, Serialize)]
pub struct TeamMovement {
    pub position: Position,
    /// 1-based rank within the position's starters
    pub slot: u32,
    #[serde(flatten)]
    pub movement: PlayerMovement,
}

/// Everything one interval advance computed
#[derive(Debug, Clone, Serialize)]
pub struct IntervalReport {
    pub log: GameIntervalLog,
    pub performance: PositionMap<i32>,
    pub home_beater_performance: f64,
    pub away_beater_performance: f64,
}

/// The simulation service owned by the application state
pub struct GameService {
    teams: TeamStore,
    players: PlayerStore,
    games: GameStore,
    arena: ArenaConfig,
    rules: LineupRules,
    rng: Mutex<ChaCha8Rng>,
    game_locks: DashMap<Uuid, GameLock>,
}

impl GameService {
    pub fn new(
        teams: TeamStore,
        players: PlayerStore,
        games: GameStore,
        arena: ArenaConfig,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        Self {
            teams,
            players,
            games,
            arena,
            rules: LineupRules::default(),
            rng: Mutex::new(rng),
            game_locks: DashMap::new(),
        }
    }

    fn lock_for(&self, game_id: Uuid) -> GameLock {
        self.game_locks
            .entry(game_id)
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    fn starters(&self, team_id: Uuid) -> Result<PositionMap<Vec<Player>>, StoreError> {
        let roster = self.teams.roster(team_id)?;
        Ok(resolve_lineup(&roster, LineupKind::Starters, &self.rules))
    }

    fn seeker_of(&self, team_id: Uuid) -> Result<Player, StoreError> {
        self.teams
            .roster(team_id)?
            .into_iter()
            .find(|p| p.current_position == Position::Seeker)
            .ok_or(StoreError::NotFound("seeker"))
    }

    // ------------------------------------------------------------------
    // Lineup queries
    // ------------------------------------------------------------------

    pub fn lineup(
        &self,
        team_id: Uuid,
        kind: LineupKind,
    ) -> Result<PositionMap<Vec<Player>>, StoreError> {
        let roster = self.teams.roster(team_id)?;
        Ok(resolve_lineup(&roster, kind, &self.rules))
    }

    pub fn missing_starters(&self, team_id: Uuid) -> Result<PositionMap<u32>, StoreError> {
        let roster = self.teams.roster(team_id)?;
        Ok(missing_starters(&roster, &self.rules))
    }

    pub fn positions_filled(&self, team_id: Uuid) -> Result<bool, StoreError> {
        let roster = self.teams.roster(team_id)?;
        Ok(all_positions_filled(&roster, &self.rules))
    }

    /// Per-position skill differential between the two starting lineups.
    /// Read-only: neither scores nor status move here.
    pub fn performance(&self, game_id: Uuid) -> Result<PositionMap<i32>, StoreError> {
        let game = self.games.get(game_id)?;
        let home = self.starters(game.home_team_id)?;
        let away = self.starters(game.away_team_id)?;
        Ok(team_performance(&home, &away))
    }

    // ------------------------------------------------------------------
    // Game-tick operations (serialized per game)
    // ------------------------------------------------------------------

    /// Advance every starter of one team by a movement step and persist
    /// the new locations and targets in one commit.
    pub async fn move_team(
        &self,
        game_id: Uuid,
        team_id: Uuid,
    ) -> Result<Vec<TeamMovement>, StoreError> {
        let lock = self.lock_for(game_id);
        let _guard = lock.lock().await;

        self.games.get(game_id)?;
        let starters = self.starters(team_id)?;

        let mut labeled = Vec::new();
        {
            let mut rng = self.rng.lock();
            for position in Position::ALL {
                for (index, player) in starters.get(position).iter().enumerate() {
                    let movement = advance_player(player, &self.arena, &mut *rng);
                    labeled.push(TeamMovement {
                        position,
                        slot: index as u32 + 1,
                        movement,
                    });
                }
            }
        }

        let movements: Vec<PlayerMovement> =
            labeled.iter().map(|m| m.movement.clone()).collect();
        self.players.apply_movements(&movements)?;

        info!(
            game_id = %game_id,
            team_id = %team_id,
            moved = labeled.len(),
            "starters advanced"
        );
        Ok(labeled)
    }

    /// Drop the snitch at a fresh random spot. The first call creates the
    /// snitch; later calls move the same snitch.
    pub async fn place_snitch(&self, game_id: Uuid) -> Result<Snitch, StoreError> {
        let lock = self.lock_for(game_id);
        let _guard = lock.lock().await;

        let position = {
            let mut rng = self.rng.lock();
            self.arena.random_coord(&mut *rng)
        };
        let snitch = self.games.upsert_snitch(game_id, position)?;

        info!(game_id = %game_id, snitch_id = %snitch.id, "snitch placed");
        Ok(snitch)
    }

    /// Drop both bludgers at fresh random spots, creating the pair on the
    /// first call.
    pub async fn place_bludgers(&self, game_id: Uuid) -> Result<Vec<Bludger>, StoreError> {
        let lock = self.lock_for(game_id);
        let _guard = lock.lock().await;

        let positions = {
            let mut rng = self.rng.lock();
            [
                self.arena.random_coord(&mut *rng),
                self.arena.random_coord(&mut *rng),
            ]
        };
        let bludgers = self.games.upsert_bludgers(game_id, positions)?;

        info!(game_id = %game_id, "bludgers placed");
        Ok(bludgers)
    }

    /// Check whether either seeker is close enough to take the snitch.
    pub async fn resolve_catch(&self, game_id: Uuid) -> Result<CatchOutcome, StoreError> {
        let lock = self.lock_for(game_id);
        let _guard = lock.lock().await;

        let game = self.games.get(game_id)?;
        let snitch = self.games.snitch(game_id)?;
        let home_seeker = self.seeker_of(game.home_team_id)?;
        let away_seeker = self.seeker_of(game.away_team_id)?;

        let outcome = catch::evaluate_catch(
            &home_seeker.location,
            &away_seeker.location,
            &snitch.position,
        );

        info!(game_id = %game_id, outcome = ?outcome, "catch evaluated");
        Ok(outcome)
    }

    /// Append the next interval log. The Chaser differential decides who
    /// scores this interval; beater aggregates ride along in the report
    /// without touching the persisted score.
    pub async fn advance_interval(&self, game_id: Uuid) -> Result<IntervalReport, StoreError> {
        let lock = self.lock_for(game_id);
        let _guard = lock.lock().await;

        let game = self.games.get(game_id)?;
        let home = self.starters(game.home_team_id)?;
        let away = self.starters(game.away_team_id)?;

        let performance = team_performance(&home, &away);
        let (home_beater_performance, away_beater_performance) = {
            let mut rng = self.rng.lock();
            beater_performance(&home.beater, &away.beater, &mut *rng)
        };

        let (home_points, away_points) = match performance.chaser {
            d if d > 0 => (POINTS_PER_GOAL, 0),
            d if d < 0 => (0, POINTS_PER_GOAL),
            _ => (0, 0),
        };

        let log = self.games.append_interval(game_id, home_points, away_points)?;

        info!(
            game_id = %game_id,
            order = log.order,
            home_score = log.home_score,
            away_score = log.away_score,
            "interval recorded"
        );

        Ok(IntervalReport {
            log,
            performance,
            home_beater_performance,
            away_beater_performance,
        })
    }

    // ------------------------------------------------------------------
    // Player generation
    // ------------------------------------------------------------------

    /// Generate `count` free agents and persist them in one commit.
    pub fn generate_players(&self, count: usize) -> Vec<Player> {
        let generated: Vec<Player> = {
            let mut rng = self.rng.lock();
            (0..count).map(|_| generate_player(&mut *rng)).collect()
        };
        let stored = self.players.insert_many(generated);

        info!(count = stored.len(), "players generated");
        stored
    }
}
