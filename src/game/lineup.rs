//! Roster partitioning into starters and bench by depth rank

use serde::{Deserialize, Serialize};

use crate::store::players::Player;

/// The four playable positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    Seeker,
    Keeper,
    Beater,
    Chaser,
}

impl Position {
    pub const ALL: [Position; 4] = [
        Position::Seeker,
        Position::Keeper,
        Position::Beater,
        Position::Chaser,
    ];

    /// Case-insensitive parse of a position name.
    pub fn parse(name: &str) -> Option<Position> {
        match name.to_ascii_lowercase().as_str() {
            "seeker" => Some(Position::Seeker),
            "keeper" => Some(Position::Keeper),
            "beater" => Some(Position::Beater),
            "chaser" => Some(Position::Chaser),
            _ => None,
        }
    }
}

/// One value per playable position
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionMap<T> {
    #[serde(rename = "Seeker")]
    pub seeker: T,
    #[serde(rename = "Keeper")]
    pub keeper: T,
    #[serde(rename = "Beater")]
    pub beater: T,
    #[serde(rename = "Chaser")]
    pub chaser: T,
}

impl<T> PositionMap<T> {
    pub fn from_fn(mut f: impl FnMut(Position) -> T) -> Self {
        Self {
            seeker: f(Position::Seeker),
            keeper: f(Position::Keeper),
            beater: f(Position::Beater),
            chaser: f(Position::Chaser),
        }
    }

    pub fn get(&self, position: Position) -> &T {
        match position {
            Position::Seeker => &self.seeker,
            Position::Keeper => &self.keeper,
            Position::Beater => &self.beater,
            Position::Chaser => &self.chaser,
        }
    }

    pub fn get_mut(&mut self, position: Position) -> &mut T {
        match position {
            Position::Seeker => &mut self.seeker,
            Position::Keeper => &mut self.keeper,
            Position::Beater => &mut self.beater,
            Position::Chaser => &mut self.chaser,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Position, &T)> + '_ {
        Position::ALL.into_iter().map(move |p| (p, self.get(p)))
    }
}

/// Which half of the starter/bench split a lineup query wants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineupKind {
    Starters,
    Bench,
}

impl LineupKind {
    pub fn parse(name: &str) -> Option<LineupKind> {
        match name {
            "starters" => Some(LineupKind::Starters),
            "bench" => Some(LineupKind::Bench),
            _ => None,
        }
    }
}

/// Starter depth thresholds per position. A player is a starter iff their
/// depth rank does not exceed the threshold at their current position.
#[derive(Debug, Clone)]
pub struct LineupRules {
    pub starter_depth: PositionMap<i32>,
}

impl Default for LineupRules {
    fn default() -> Self {
        Self {
            starter_depth: PositionMap {
                seeker: 1,
                keeper: 1,
                beater: 2,
                chaser: 3,
            },
        }
    }
}

/// Partition a roster and keep the requested half.
///
/// Output per position is ordered by ascending depth; equal depths keep
/// the roster's supplied order (stable sort).
pub fn resolve_lineup(
    roster: &[Player],
    kind: LineupKind,
    rules: &LineupRules,
) -> PositionMap<Vec<Player>> {
    let mut by_depth: Vec<&Player> = roster.iter().collect();
    by_depth.sort_by_key(|p| p.depth);

    let mut lineup: PositionMap<Vec<Player>> = PositionMap::default();
    for player in by_depth {
        let threshold = *rules.starter_depth.get(player.current_position);
        let is_starter = player.depth <= threshold;
        let wanted = match kind {
            LineupKind::Starters => is_starter,
            LineupKind::Bench => !is_starter,
        };
        if wanted {
            lineup.get_mut(player.current_position).push(player.clone());
        }
    }
    lineup
}

fn position_counts(roster: &[Player]) -> PositionMap<i32> {
    let mut counts: PositionMap<i32> = PositionMap::default();
    for player in roster {
        *counts.get_mut(player.current_position) += 1;
    }
    counts
}

/// How many starters each position is short of its threshold.
pub fn missing_starters(roster: &[Player], rules: &LineupRules) -> PositionMap<u32> {
    let filled = position_counts(roster);
    PositionMap::from_fn(|position| {
        let threshold = *rules.starter_depth.get(position);
        (threshold - filled.get(position)).max(0) as u32
    })
}

/// True iff every position has at least its threshold of players.
pub fn all_positions_filled(roster: &[Player], rules: &LineupRules) -> bool {
    position_counts(roster)
        .iter()
        .all(|(position, count)| *count >= *rules.starter_depth.get(position))
}
