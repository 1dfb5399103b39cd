//! Turn engine: player actions and passive per-turn evolution
//!
//! Both operations take their inputs by reference and return fresh values.
//! `advance_turn` runs once per half-move, whether or not a move was made;
//! calling it twice advances two turns.

use crate::board::Pos;
use crate::game::{GameState, TurnCounters, Unit};
use crate::moves::{classify, Move, MoveKind};
use crate::units::PRODUCED_KIND;

/// Resolve one player action. Counters change only where the move touches a
/// production site: a creation restarts that factory's countdown, capturing a
/// factory clears its slot.
pub fn apply_move(state: &GameState, counters: &TurnCounters, mv: Move) -> (GameState, TurnCounters) {
    let mut next_state = state.clone();
    let mut next_counters = counters.clone();

    match classify(state, &mv) {
        MoveKind::Create => {
            if let Some(factory) = state.get(mv.from) {
                next_state.set(mv.to, Some(Unit::new(factory.owner, PRODUCED_KIND)));
                next_counters.reset(mv.from);
            }
        }
        MoveKind::Capture | MoveKind::Relocate => {
            if let Some(unit) = next_state.take(mv.from) {
                let captured = next_state.take(mv.to);
                if captured.map(|u| u.is_producer()).unwrap_or(false) {
                    next_counters.set_remaining(mv.to, 0);
                }
                next_state.set(mv.to, Some(unit));
            }
        }
    }

    (next_state, next_counters)
}

/// Passive evolution: every factory (row-major) counts down; a factory at zero
/// spawns at its first empty neighbour (N, E, S, W) and restarts, or holds at
/// zero while boxed in. The turn index always moves forward by one.
pub fn advance_turn(state: &GameState, counters: &TurnCounters) -> (GameState, TurnCounters) {
    let mut next_state = state.clone();
    let mut next_counters = counters.clone();

    let factories: Vec<(Pos, Unit)> = state.units().filter(|(_, u)| u.is_producer()).collect();

    for (pos, factory) in factories {
        let remaining = counters.remaining(pos).saturating_sub(1);
        next_counters.set_remaining(pos, remaining);

        if remaining > 0 {
            continue;
        }

        // Earlier spawns this turn may already have taken a neighbour
        let spawn = (0..4)
            .filter_map(|dir| pos.offset(dir, 1, state.width(), state.height()))
            .find(|&dest| next_state.get(dest).is_none());

        if let Some(dest) = spawn {
            next_state.set(dest, Some(Unit::new(factory.owner, PRODUCED_KIND)));
            next_counters.reset(pos);
        }
    }

    next_counters.tick();
    (next_state, next_counters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{check_win, GameResult, Player};
    use crate::moves::generate_moves;
    use crate::units::UnitKind;

    fn unit(owner: Player, kind: UnitKind) -> Unit {
        Unit::new(owner, kind)
    }

    /// F . .
    /// . S r
    /// . . f
    fn base_game() -> (GameState, TurnCounters) {
        let state = GameState::from_units(
            3,
            3,
            &[
                (Pos::new(0, 0), unit(Player::Blue, UnitKind::Factory)),
                (Pos::new(1, 1), unit(Player::Blue, UnitKind::Soldier)),
                (Pos::new(1, 2), unit(Player::Red, UnitKind::Soldier)),
                (Pos::new(2, 2), unit(Player::Red, UnitKind::Factory)),
            ],
        )
        .unwrap();
        let counters = TurnCounters::new(&state, 3);
        (state, counters)
    }

    fn unit_total(state: &GameState) -> isize {
        state.units().count() as isize
    }

    /// Change in unit count `apply_move` makes for `mv` on `state`
    fn move_delta(state: &GameState, mv: &Move) -> isize {
        match classify(state, mv) {
            MoveKind::Capture => -1,
            MoveKind::Create => 1,
            MoveKind::Relocate => 0,
        }
    }

    /// Factories whose countdown restarted during one `advance_turn`
    fn spawns(state: &GameState, before: &TurnCounters, after: &TurnCounters) -> isize {
        state
            .units()
            .filter(|(pos, u)| u.is_producer() && after.remaining(*pos) > before.remaining(*pos))
            .count() as isize
    }

    #[test]
    fn test_relocate() {
        let (state, counters) = base_game();
        let (next, next_counters) = apply_move(&state, &counters, Move::new(Pos::new(1, 1), Pos::new(2, 1)));
        assert!(next.get(Pos::new(1, 1)).is_none());
        assert_eq!(next.get(Pos::new(2, 1)), Some(unit(Player::Blue, UnitKind::Soldier)));
        assert_eq!(next_counters, counters);
        // Parent untouched
        assert!(state.get(Pos::new(1, 1)).is_some());
    }

    #[test]
    fn test_capture_removes_target() {
        let (state, counters) = base_game();
        let (next, _) = apply_move(&state, &counters, Move::new(Pos::new(1, 1), Pos::new(1, 2)));
        assert_eq!(next.get(Pos::new(1, 2)), Some(unit(Player::Blue, UnitKind::Soldier)));
        assert_eq!(next.unit_count(Player::Red), 1);
    }

    #[test]
    fn test_capture_factory_clears_counter() {
        let (state, counters) = base_game();
        let (step, counters) = apply_move(&state, &counters, Move::new(Pos::new(1, 1), Pos::new(2, 1)));
        let (next, next_counters) = apply_move(&step, &counters, Move::new(Pos::new(2, 1), Pos::new(2, 2)));
        assert_eq!(next.get(Pos::new(2, 2)), Some(unit(Player::Blue, UnitKind::Soldier)));
        assert_eq!(next_counters.remaining(Pos::new(2, 2)), 0);
    }

    #[test]
    fn test_create_resets_factory() {
        let (state, counters) = base_game();
        let (ticked, ticked_counters) = advance_turn(&state, &counters);
        assert_eq!(ticked_counters.remaining(Pos::new(0, 0)), 2);

        let (next, next_counters) =
            apply_move(&ticked, &ticked_counters, Move::new(Pos::new(0, 0), Pos::new(0, 1)));
        assert_eq!(next.get(Pos::new(0, 1)), Some(unit(Player::Blue, UnitKind::Soldier)));
        assert_eq!(next_counters.remaining(Pos::new(0, 0)), 3);
    }

    #[test]
    fn test_advance_counts_down_and_produces() {
        let (state, counters) = base_game();
        let (s1, c1) = advance_turn(&state, &counters);
        let (s2, c2) = advance_turn(&s1, &c1);
        assert_eq!(c2.remaining(Pos::new(0, 0)), 1);
        assert_eq!(s2, state);

        let (s3, c3) = advance_turn(&s2, &c2);
        // Blue factory: north is off-board, east is free
        assert_eq!(s3.get(Pos::new(0, 1)), Some(unit(Player::Blue, UnitKind::Soldier)));
        // Red factory: north (1,2) occupied, east off-board, south off-board, west (2,1) free
        assert_eq!(s3.get(Pos::new(2, 1)), Some(unit(Player::Red, UnitKind::Soldier)));
        assert_eq!(c3.remaining(Pos::new(0, 0)), 3);
        assert_eq!(c3.remaining(Pos::new(2, 2)), 3);
        assert_eq!(c3.turn(), 3);
        assert_eq!(unit_total(&s3), unit_total(&s2) + 2);
    }

    #[test]
    fn test_boxed_factory_holds_at_zero() {
        let state = GameState::from_units(
            2,
            1,
            &[
                (Pos::new(0, 0), unit(Player::Blue, UnitKind::Factory)),
                (Pos::new(0, 1), unit(Player::Red, UnitKind::Soldier)),
            ],
        )
        .unwrap();
        let counters = TurnCounters::new(&state, 1);

        let (s1, c1) = advance_turn(&state, &counters);
        assert_eq!(s1, state);
        assert_eq!(c1.remaining(Pos::new(0, 0)), 0);

        let (_, c2) = advance_turn(&s1, &c1);
        assert_eq!(c2.remaining(Pos::new(0, 0)), 0);
        assert_eq!(c2.turn(), 2);
    }

    #[test]
    fn test_counters_never_increase_except_on_production() {
        let (mut state, mut counters) = base_game();
        for _ in 0..12 {
            let (next, next_counters) = advance_turn(&state, &counters);
            for (pos, _) in state.units().filter(|(_, u)| u.is_producer()) {
                let before = counters.remaining(pos);
                let after = next_counters.remaining(pos);
                if after > before {
                    assert_eq!(after, next_counters.interval());
                    assert!(next.units().count() > state.units().count());
                }
            }
            assert_eq!(next_counters.turn(), counters.turn() + 1);
            state = next;
            counters = next_counters;
        }
    }

    #[test]
    fn test_unit_count_follows_moves_and_spawns() {
        let (mut state, mut counters) = base_game();
        let mut player = Player::Blue;
        let mut spawned = 0;

        for _ in 0..12 {
            if check_win(&state) != GameResult::Ongoing {
                break;
            }

            let moves = generate_moves(&state, player);
            for mv in &moves {
                let (next, _) = apply_move(&state, &counters, *mv);
                assert_eq!(unit_total(&next), unit_total(&state) + move_delta(&state, mv), "{}", mv);
            }
            if let Some(&mv) = moves.last() {
                (state, counters) = apply_move(&state, &counters, mv);
            }

            let (next, next_counters) = advance_turn(&state, &counters);
            let produced = spawns(&state, &counters, &next_counters);
            assert_eq!(unit_total(&next), unit_total(&state) + produced);
            spawned += produced;

            (state, counters) = (next, next_counters);
            player = player.opponent();
        }

        // Blue's factory spawns on the third half-move
        assert!(spawned > 0);
    }

    #[test]
    fn test_capture_of_last_unit_wins() {
        let state = GameState::from_units(
            2,
            1,
            &[
                (Pos::new(0, 0), unit(Player::Blue, UnitKind::Soldier)),
                (Pos::new(0, 1), unit(Player::Red, UnitKind::Soldier)),
            ],
        )
        .unwrap();
        let counters = TurnCounters::new(&state, 4);
        let (next, _) = apply_move(&state, &counters, Move::new(Pos::new(0, 0), Pos::new(0, 1)));
        assert_eq!(check_win(&next), GameResult::BlueWins);
    }
}
