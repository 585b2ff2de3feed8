//! Player movement inside the arena

use rand::Rng;
use serde::Serialize;
use uuid::Uuid;

use crate::store::players::Player;

use super::arena::{ArenaConfig, Coord};

/// Result of advancing one player by a single movement step. The caller
/// persists it; the player record itself is untouched here.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerMovement {
    pub player_id: Uuid,
    pub location: Coord,
    pub target: Coord,
}

/// Compute a player's next location and a fresh flight target.
///
/// A player who was never handed a target (target still at the origin) is
/// dropped uniformly into the arena; anyone else arrives exactly at their
/// prior target. Either way a new random target is drawn.
pub fn advance_player(
    player: &Player,
    arena: &ArenaConfig,
    rng: &mut impl Rng,
) -> PlayerMovement {
    let location = if player.target.is_origin() {
        arena.random_coord(rng)
    } else {
        player.target
    };
    let target = arena.random_coord(rng);

    PlayerMovement {
        player_id: player.id,
        location,
        target,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::generator::generate_player;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn untargeted_player_spawns_inside_the_arena() {
        let arena = ArenaConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(21);

        for _ in 0..100 {
            let player = generate_player(&mut rng);
            assert!(player.target.is_origin());

            let movement = advance_player(&player, &arena, &mut rng);
            assert!(arena.contains(&movement.location));
            assert!(arena.contains(&movement.target));
        }
    }

    #[test]
    fn targeted_player_arrives_at_the_prior_target() {
        let arena = ArenaConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(22);

        let mut player = generate_player(&mut rng);
        player.target = Coord::new(3.5, -2.0, 1.25);

        let movement = advance_player(&player, &arena, &mut rng);
        assert_eq!(movement.location, player.target);
        assert!(arena.contains(&movement.target));
    }
}
