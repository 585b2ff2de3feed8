//! Application state shared across routes

use std::sync::Arc;

use crate::config::Config;
use crate::game::GameService;
use crate::store::{Database, GameStore, LeagueStore, PlayerStore, TeamStore, UserStore};
use crate::util::rate_limit::{create_limiter, Limiter, LOGIN_RATE_LIMIT};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Database,
    pub users: UserStore,
    pub leagues: LeagueStore,
    pub teams: TeamStore,
    pub players: PlayerStore,
    pub games: GameStore,
    pub sim: Arc<GameService>,
    pub login_limiter: Arc<Limiter>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);

        // One table set behind every store
        let db = Database::new();

        let users = UserStore::new(db.clone());
        let leagues = LeagueStore::new(db.clone());
        let teams = TeamStore::new(db.clone());
        let players = PlayerStore::new(db.clone());
        let games = GameStore::new(db.clone());

        // The simulation service owns the only RNG in the process
        let sim = Arc::new(GameService::new(
            teams.clone(),
            players.clone(),
            games.clone(),
            config.arena,
            config.rng_seed,
        ));

        let login_limiter = create_limiter(LOGIN_RATE_LIMIT);

        Self {
            config,
            db,
            users,
            leagues,
            teams,
            players,
            games,
            sim,
            login_limiter,
        }
    }
}
