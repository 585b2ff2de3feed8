//! HTTP route definitions

use axum::{
    extract::{Extension, Path, Query, State},
    http::{header, Method, StatusCode},
    middleware,
    response::{IntoResponse, Json},
    routing::{delete, get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use uuid::Uuid;

use crate::app::AppState;
use crate::game::catch::CatchOutcome;
use crate::game::lineup::{LineupKind, Position, PositionMap};
use crate::game::service::{IntervalReport, TeamMovement};
use crate::http::middleware::{require_admin, require_auth, sign_jwt, AuthenticatedUser};
use crate::store::db::{StoreCounts, StoreError};
use crate::store::games::{Bludger, Game, GameIntervalLog, Snitch};
use crate::store::leagues::{League, Season};
use crate::store::players::Player;
use crate::store::teams::Team;
use crate::store::users::{User, ROLE_MANAGER};
use crate::util::time::uptime_secs;

/// Upper bound for one player-generation request
const MAX_GENERATED_PLAYERS: usize = 1000;

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    // CORS configuration - support multiple origins (comma-separated in CLIENT_ORIGIN)
    let allowed_origins: Vec<header::HeaderValue> = state
        .config
        .client_origin
        .split(',')
        .filter_map(|s| s.trim().parse::<header::HeaderValue>().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health_handler))
        .route("/register", post(register_handler))
        .route("/login", post(login_handler));

    // Admin routes (auth + admin role)
    let admin_routes = Router::new()
        .route("/users/:username/toggle_admin", post(toggle_admin_handler))
        .route("/players/generate", post(generate_players_handler))
        .route("/players/:id/assignment", post(assign_player_handler))
        .route("/leagues", post(create_league_handler))
        .route("/leagues/:id", delete(delete_league_handler))
        .route("/seasons", post(create_season_handler))
        .layer(middleware::from_fn(require_admin));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/me", get(me_handler))
        .route("/players", get(list_players_handler))
        .route("/players/:id", get(get_player_handler))
        .route(
            "/players/position/:position",
            get(players_by_position_handler),
        )
        .route("/leagues", get(list_leagues_handler))
        .route("/teams", post(create_team_handler))
        .route("/teams/:id", get(get_team_handler))
        .route("/teams/:id/roster", post(roster_action_handler))
        .route("/teams/:id/lineup", get(lineup_handler))
        .route("/teams/:id/missing_starters", get(missing_starters_handler))
        .route("/teams/:id/positions_filled", get(positions_filled_handler))
        .route("/games", post(create_game_handler))
        .route("/games/:id", get(get_game_handler))
        .route("/games/:id/performance", get(performance_handler))
        .route("/games/:id/snitch", post(place_snitch_handler))
        .route("/games/:id/bludgers", post(place_bludgers_handler))
        .route("/games/:id/catch", get(catch_handler))
        .route(
            "/games/:id/teams/:team_id/movements",
            post(movements_handler),
        )
        .route(
            "/games/:id/intervals",
            post(advance_interval_handler).get(list_intervals_handler),
        );

    let authed_routes = Router::new()
        .merge(protected_routes)
        .merge(admin_routes)
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(authed_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// ============================================================================
// Health endpoint
// ============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    counts: StoreCounts,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: uptime_secs(),
        counts: state.db.counts(),
    })
}

// ============================================================================
// Auth endpoints
// ============================================================================

#[derive(Deserialize)]
struct RegisterRequest {
    username: String,
    password: String,
}

#[derive(Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Serialize)]
struct UserResponse {
    id: Uuid,
    username: String,
    role: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
        }
    }
}

#[derive(Serialize)]
struct TokenResponse {
    access_token: String,
    token_type: &'static str,
}

async fn register_handler(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let username = req.username.trim();
    if username.is_empty() || req.password.is_empty() {
        return Err(AppError::InvalidArgument(
            "username and password are required".to_string(),
        ));
    }

    let hash = bcrypt::hash(&req.password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    let user = state.users.create(username, &hash, ROLE_MANAGER)?;

    info!(username = %user.username, "user registered");
    Ok(Json(user.into()))
}

async fn login_handler(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    if state.login_limiter.check().is_err() {
        return Err(AppError::RateLimited);
    }

    // Unknown users and wrong passwords fail identically.
    let user = state
        .users
        .get_by_username(&req.username)
        .map_err(|_| AppError::Unauthorized)?;
    if !bcrypt::verify(&req.password, &user.password_hash).unwrap_or(false) {
        return Err(AppError::Unauthorized);
    }

    let access_token = sign_jwt(
        user.id,
        &user.username,
        &user.role,
        &state.config.jwt_secret,
        state.config.token_ttl_secs,
    )
    .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
    }))
}

async fn me_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state.users.get(auth.user_id)?;
    Ok(Json(user.into()))
}

async fn toggle_admin_handler(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state.users.toggle_role(&username)?;
    info!(username = %user.username, role = %user.role, "admin status toggled");
    Ok(Json(user.into()))
}

// ============================================================================
// Player endpoints
// ============================================================================

#[derive(Deserialize)]
struct GeneratePlayersRequest {
    count: usize,
}

#[derive(Serialize)]
struct PlayersResponse {
    players: Vec<Player>,
}

async fn generate_players_handler(
    State(state): State<AppState>,
    Json(req): Json<GeneratePlayersRequest>,
) -> Result<Json<PlayersResponse>, AppError> {
    if req.count == 0 || req.count > MAX_GENERATED_PLAYERS {
        return Err(AppError::InvalidArgument(format!(
            "count must be between 1 and {}",
            MAX_GENERATED_PLAYERS
        )));
    }

    let players = state.sim.generate_players(req.count);
    Ok(Json(PlayersResponse { players }))
}

async fn list_players_handler(State(state): State<AppState>) -> Json<PlayersResponse> {
    Json(PlayersResponse {
        players: state.players.list(),
    })
}

async fn get_player_handler(
    State(state): State<AppState>,
    Path(player_id): Path<Uuid>,
) -> Result<Json<Player>, AppError> {
    let player = state.players.get(player_id)?;
    Ok(Json(player))
}

async fn players_by_position_handler(
    State(state): State<AppState>,
    Path(position): Path<String>,
) -> Result<Json<PlayersResponse>, AppError> {
    let position = Position::parse(&position)
        .ok_or_else(|| AppError::InvalidArgument(format!("unknown position '{}'", position)))?;

    Ok(Json(PlayersResponse {
        players: state.players.list_by_primary_position(position),
    }))
}

#[derive(Deserialize)]
struct AssignmentRequest {
    current_position: Position,
    depth: i32,
}

async fn assign_player_handler(
    State(state): State<AppState>,
    Path(player_id): Path<Uuid>,
    Json(req): Json<AssignmentRequest>,
) -> Result<Json<Player>, AppError> {
    if req.depth < 0 {
        return Err(AppError::InvalidArgument(
            "depth must not be negative".to_string(),
        ));
    }

    let player = state
        .players
        .assign(player_id, req.current_position, req.depth)?;
    Ok(Json(player))
}

// ============================================================================
// League and season endpoints
// ============================================================================

#[derive(Deserialize)]
struct CreateLeagueRequest {
    name: String,
}

#[derive(Serialize)]
struct LeaguesResponse {
    leagues: Vec<League>,
}

async fn create_league_handler(
    State(state): State<AppState>,
    Json(req): Json<CreateLeagueRequest>,
) -> Result<Json<League>, AppError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidArgument("name is required".to_string()));
    }

    let league = state.leagues.create(name)?;
    info!(league_id = %league.id, name = %league.name, "league created");
    Ok(Json(league))
}

async fn list_leagues_handler(State(state): State<AppState>) -> Json<LeaguesResponse> {
    Json(LeaguesResponse {
        leagues: state.leagues.list(),
    })
}

async fn delete_league_handler(
    State(state): State<AppState>,
    Path(league_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.leagues.delete(league_id)?;
    info!(league_id = %league_id, "league deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
struct CreateSeasonRequest {
    league_id: Uuid,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    game_interval: u32,
}

async fn create_season_handler(
    State(state): State<AppState>,
    Json(req): Json<CreateSeasonRequest>,
) -> Result<Json<Season>, AppError> {
    let season = state.leagues.create_season(
        req.league_id,
        req.start_date,
        req.end_date,
        req.game_interval,
    )?;
    Ok(Json(season))
}

// ============================================================================
// Team and roster endpoints
// ============================================================================

#[derive(Deserialize)]
struct CreateTeamRequest {
    name: String,
    league_id: Uuid,
}

#[derive(Serialize)]
struct TeamResponse {
    team: Team,
    roster: Vec<Player>,
}

async fn create_team_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(req): Json<CreateTeamRequest>,
) -> Result<Json<Team>, AppError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidArgument("name is required".to_string()));
    }

    let team = state.teams.create(name, auth.user_id, req.league_id)?;
    info!(team_id = %team.id, name = %team.name, owner = %auth.username, "team created");
    Ok(Json(team))
}

async fn get_team_handler(
    State(state): State<AppState>,
    Path(team_id): Path<Uuid>,
) -> Result<Json<TeamResponse>, AppError> {
    let team = state.teams.get(team_id)?;
    let roster = state.teams.roster(team_id)?;
    Ok(Json(TeamResponse { team, roster }))
}

#[derive(Deserialize)]
struct RosterActionRequest {
    action: String,
    player_id: Uuid,
}

async fn roster_action_handler(
    State(state): State<AppState>,
    Path(team_id): Path<Uuid>,
    Json(req): Json<RosterActionRequest>,
) -> Result<Json<Player>, AppError> {
    let player = match req.action.as_str() {
        "add" => state.teams.add_player(team_id, req.player_id)?,
        "remove" => state.teams.remove_player(team_id, req.player_id)?,
        other => {
            return Err(AppError::InvalidArgument(format!(
                "unknown roster action '{}'",
                other
            )))
        }
    };

    info!(
        team_id = %team_id,
        player_id = %req.player_id,
        action = %req.action,
        "roster changed"
    );
    Ok(Json(player))
}

#[derive(Deserialize)]
struct LineupQuery {
    kind: Option<String>,
}

#[derive(Serialize)]
struct LineupResponse {
    kind: LineupKind,
    lineup: PositionMap<Vec<Player>>,
}

async fn lineup_handler(
    State(state): State<AppState>,
    Path(team_id): Path<Uuid>,
    Query(query): Query<LineupQuery>,
) -> Result<Json<LineupResponse>, AppError> {
    let kind = match query.kind.as_deref() {
        None => LineupKind::Starters,
        Some(raw) => LineupKind::parse(raw)
            .ok_or_else(|| AppError::InvalidArgument(format!("unknown lineup kind '{}'", raw)))?,
    };

    let lineup = state.sim.lineup(team_id, kind)?;
    Ok(Json(LineupResponse { kind, lineup }))
}

#[derive(Serialize)]
struct MissingStartersResponse {
    missing: PositionMap<u32>,
}

async fn missing_starters_handler(
    State(state): State<AppState>,
    Path(team_id): Path<Uuid>,
) -> Result<Json<MissingStartersResponse>, AppError> {
    let missing = state.sim.missing_starters(team_id)?;
    Ok(Json(MissingStartersResponse { missing }))
}

#[derive(Serialize)]
struct PositionsFilledResponse {
    filled: bool,
}

async fn positions_filled_handler(
    State(state): State<AppState>,
    Path(team_id): Path<Uuid>,
) -> Result<Json<PositionsFilledResponse>, AppError> {
    let filled = state.sim.positions_filled(team_id)?;
    Ok(Json(PositionsFilledResponse { filled }))
}

// ============================================================================
// Game endpoints
// ============================================================================

#[derive(Deserialize)]
struct CreateGameRequest {
    season_id: Uuid,
    home_team_id: Uuid,
    away_team_id: Uuid,
    start_time: DateTime<Utc>,
}

#[derive(Serialize)]
struct GameDetailResponse {
    game: Game,
    snitch: Option<Snitch>,
    bludgers: Vec<Bludger>,
}

async fn create_game_handler(
    State(state): State<AppState>,
    Json(req): Json<CreateGameRequest>,
) -> Result<Json<Game>, AppError> {
    if req.home_team_id == req.away_team_id {
        return Err(AppError::InvalidArgument(
            "a team cannot play itself".to_string(),
        ));
    }

    let game = state.games.create(
        req.season_id,
        req.home_team_id,
        req.away_team_id,
        req.start_time,
    )?;
    info!(game_id = %game.id, "game scheduled");
    Ok(Json(game))
}

async fn get_game_handler(
    State(state): State<AppState>,
    Path(game_id): Path<Uuid>,
) -> Result<Json<GameDetailResponse>, AppError> {
    let game = state.games.get(game_id)?;
    let snitch = match state.games.snitch(game_id) {
        Ok(snitch) => Some(snitch),
        Err(StoreError::NotFound("snitch")) => None,
        Err(err) => return Err(err.into()),
    };
    let bludgers = state.games.bludgers(game_id)?;

    Ok(Json(GameDetailResponse {
        game,
        snitch,
        bludgers,
    }))
}

#[derive(Serialize)]
struct PerformanceResponse {
    performance: PositionMap<i32>,
}

async fn performance_handler(
    State(state): State<AppState>,
    Path(game_id): Path<Uuid>,
) -> Result<Json<PerformanceResponse>, AppError> {
    let performance = state.sim.performance(game_id)?;
    Ok(Json(PerformanceResponse { performance }))
}

async fn place_snitch_handler(
    State(state): State<AppState>,
    Path(game_id): Path<Uuid>,
) -> Result<Json<Snitch>, AppError> {
    let snitch = state.sim.place_snitch(game_id).await?;
    Ok(Json(snitch))
}

#[derive(Serialize)]
struct BludgersResponse {
    bludgers: Vec<Bludger>,
}

async fn place_bludgers_handler(
    State(state): State<AppState>,
    Path(game_id): Path<Uuid>,
) -> Result<Json<BludgersResponse>, AppError> {
    let bludgers = state.sim.place_bludgers(game_id).await?;
    Ok(Json(BludgersResponse { bludgers }))
}

#[derive(Serialize)]
struct CatchResponse {
    outcome: CatchOutcome,
}

async fn catch_handler(
    State(state): State<AppState>,
    Path(game_id): Path<Uuid>,
) -> Result<Json<CatchResponse>, AppError> {
    let outcome = state.sim.resolve_catch(game_id).await?;
    Ok(Json(CatchResponse { outcome }))
}

#[derive(Serialize)]
struct MovementsResponse {
    movements: Vec<TeamMovement>,
}

async fn movements_handler(
    State(state): State<AppState>,
    Path((game_id, team_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<MovementsResponse>, AppError> {
    let movements = state.sim.move_team(game_id, team_id).await?;
    Ok(Json(MovementsResponse { movements }))
}

async fn advance_interval_handler(
    State(state): State<AppState>,
    Path(game_id): Path<Uuid>,
) -> Result<Json<IntervalReport>, AppError> {
    let report = state.sim.advance_interval(game_id).await?;
    Ok(Json(report))
}

#[derive(Serialize)]
struct IntervalsResponse {
    intervals: Vec<GameIntervalLog>,
}

async fn list_intervals_handler(
    State(state): State<AppState>,
    Path(game_id): Path<Uuid>,
) -> Result<Json<IntervalsResponse>, AppError> {
    let intervals = state.games.intervals(game_id)?;
    Ok(Json(IntervalsResponse { intervals }))
}

// ============================================================================
// Error handling
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Incorrect username or password")]
    Unauthorized,

    #[error("{0}")]
    Conflict(String),

    #[error("Too many requests")]
    RateLimited,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => AppError::NotFound(what.to_string()),
            StoreError::Conflict(msg) => AppError::Conflict(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = serde_json::json!({
            "error": self.to_string()
        });

        (status, Json(body)).into_response()
    }
}
