//! Weighted-random performance aggregation

use rand::Rng;

use crate::store::players::Player;

use super::lineup::PositionMap;

const SKILL_WEIGHT: (f64, f64) = (0.10, 0.45);
const STRENGTH_WEIGHT: (f64, f64) = (0.30, 0.65);
const SPEED_WEIGHT: (f64, f64) = (0.10, 0.25);

fn beater_contribution(beater: &Player, rng: &mut impl Rng) -> f64 {
    let skill_mod = rng.gen_range(SKILL_WEIGHT.0..SKILL_WEIGHT.1);
    let strength_mod = rng.gen_range(STRENGTH_WEIGHT.0..STRENGTH_WEIGHT.1);
    let speed_mod = rng.gen_range(SPEED_WEIGHT.0..SPEED_WEIGHT.1);

    beater.strength as f64 * strength_mod
        + beater.skill as f64 * skill_mod
        + beater.speed as f64 * speed_mod
}

/// Aggregate weighted-random performance for both sides' beaters.
///
/// Every beater contributes an independent draw; totals are not normalized
/// by roster size, so the side fielding more beaters mechanically scores
/// higher.
pub fn beater_performance(
    ours: &[Player],
    theirs: &[Player],
    rng: &mut impl Rng,
) -> (f64, f64) {
    let our_total = ours
        .iter()
        .map(|beater| beater_contribution(beater, rng))
        .sum();
    let their_total = theirs
        .iter()
        .map(|beater| beater_contribution(beater, rng))
        .sum();
    (our_total, their_total)
}

/// Per-position skill differential between two starting lineups:
/// home starters' skill sum minus away starters' skill sum. Read-only
/// with respect to scores and game status.
pub fn team_performance(
    home: &PositionMap<Vec<Player>>,
    away: &PositionMap<Vec<Player>>,
) -> PositionMap<i32> {
    PositionMap::from_fn(|position| {
        let home_skill: i32 = home.get(position).iter().map(|p| p.skill).sum();
        let away_skill: i32 = away.get(position).iter().map(|p| p.skill).sum();
        home_skill - away_skill
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::arena::Coord;
    use crate::game::lineup::{resolve_lineup, LineupKind, LineupRules, Position};
    use chrono::Utc;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use uuid::Uuid;

    fn beater(speed: i32, strength: i32, skill: i32) -> Player {
        Player {
            id: Uuid::new_v4(),
            first_name: "Test".to_string(),
            last_name: "Beater".to_string(),
            country: "Ireland".to_string(),
            age: 24,
            years_pro: 2,
            speed,
            strength,
            skill,
            toughness: 50,
            awareness: 50,
            teamwork: 50,
            injury: 0,
            primary_position: Position::Beater,
            current_position: Position::Beater,
            depth: 1,
            team_id: None,
            location: Coord::ORIGIN,
            target: Coord::ORIGIN,
            created_at: Utc::now(),
        }
    }

    fn squad(position: Position, skills: &[i32]) -> Vec<Player> {
        skills
            .iter()
            .enumerate()
            .map(|(i, &skill)| {
                let mut p = beater(50, 50, skill);
                p.primary_position = position;
                p.current_position = position;
                p.depth = i as i32 + 1;
                p
            })
            .collect()
    }

    #[test]
    fn beater_aggregate_is_nonnegative_and_bounded() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let ours = vec![beater(80, 90, 70), beater(60, 85, 50)];
        let theirs = vec![beater(40, 55, 45)];

        let (our_total, their_total) = beater_performance(&ours, &theirs, &mut rng);

        assert!(our_total >= 0.0);
        assert!(their_total >= 0.0);
        // Per beater the weights cap at 0.65 + 0.45 + 0.25 of the three
        // attributes; with everything at 100 that bounds one draw at 135.
        assert!(our_total <= 2.0 * 135.0);
        assert!(their_total <= 135.0);
    }

    #[test]
    fn beater_aggregate_grows_with_roster_size() {
        let squad_of = |n: usize, seed: u64| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let beaters: Vec<Player> = (0..n).map(|_| beater(50, 50, 50)).collect();
            beater_performance(&beaters, &[], &mut rng).0
        };

        // With identical attributes the lower bound of a single draw
        // exceeds zero, so each extra beater strictly raises the total.
        assert!(squad_of(4, 3) > squad_of(2, 3));
        assert!(squad_of(8, 5) > squad_of(4, 5));
    }

    #[test]
    fn team_performance_is_antisymmetric() {
        let rules = LineupRules::default();
        let mut home_roster = squad(Position::Chaser, &[80, 70, 60]);
        home_roster.extend(squad(Position::Seeker, &[90]));
        let mut away_roster = squad(Position::Chaser, &[75, 65, 55]);
        away_roster.extend(squad(Position::Seeker, &[85]));

        let home = resolve_lineup(&home_roster, LineupKind::Starters, &rules);
        let away = resolve_lineup(&away_roster, LineupKind::Starters, &rules);

        let forward = team_performance(&home, &away);
        let backward = team_performance(&away, &home);

        for position in Position::ALL {
            assert_eq!(*forward.get(position), -*backward.get(position));
        }
        assert_eq!(forward.chaser, (80 + 70 + 60) - (75 + 65 + 55));
        assert_eq!(forward.seeker, 90 - 85);
        assert_eq!(forward.keeper, 0);
    }
}
