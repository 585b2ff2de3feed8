//! Snitch catch evaluation

use serde::Serialize;

use super::arena::Coord;

/// Distance inside which a seeker can take the snitch, in arena units
pub const CATCH_RADIUS: f64 = 5.0;

/// Outcome of a catch check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CatchOutcome {
    Home,
    Away,
    NoCatch,
}

/// Compare both seekers' distance to the snitch.
///
/// Nobody inside the catch radius means no catch. Otherwise the strictly
/// closer seeker takes it; two seekers at exactly equal distance cancel
/// out and nobody catches.
pub fn evaluate_catch(home_seeker: &Coord, away_seeker: &Coord, snitch: &Coord) -> CatchOutcome {
    let home_distance = home_seeker.distance(snitch);
    let away_distance = away_seeker.distance(snitch);

    if home_distance >= CATCH_RADIUS && away_distance >= CATCH_RADIUS {
        return CatchOutcome::NoCatch;
    }

    if home_distance < away_distance {
        CatchOutcome::Home
    } else if away_distance < home_distance {
        CatchOutcome::Away
    } else {
        CatchOutcome::NoCatch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at_distance(d: f64) -> Coord {
        Coord::new(d, 0.0, 0.0)
    }

    #[test]
    fn closer_seeker_inside_radius_wins() {
        let snitch = Coord::ORIGIN;
        assert_eq!(
            evaluate_catch(&at_distance(3.0), &at_distance(10.0), &snitch),
            CatchOutcome::Home
        );
        assert_eq!(
            evaluate_catch(&at_distance(10.0), &at_distance(3.0), &snitch),
            CatchOutcome::Away
        );
    }

    #[test]
    fn nobody_inside_radius_means_no_catch() {
        let snitch = Coord::ORIGIN;
        assert_eq!(
            evaluate_catch(&at_distance(10.0), &at_distance(10.0), &snitch),
            CatchOutcome::NoCatch
        );
        // Exactly on the radius counts as out of reach.
        assert_eq!(
            evaluate_catch(&at_distance(5.0), &at_distance(8.0), &snitch),
            CatchOutcome::NoCatch
        );
    }

    #[test]
    fn equal_distances_inside_radius_cancel_out() {
        let snitch = Coord::ORIGIN;
        assert_eq!(
            evaluate_catch(&at_distance(4.9), &at_distance(4.9), &snitch),
            CatchOutcome::NoCatch
        );
        assert_eq!(
            evaluate_catch(
                &Coord::new(0.0, 4.9, 0.0),
                &Coord::new(4.9, 0.0, 0.0),
                &snitch
            ),
            CatchOutcome::NoCatch
        );
    }
}
