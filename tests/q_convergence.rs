//! Q-update convergence on a hand-built deterministic chain.
//!
//! Three lane states strung into a corridor: pushing walks toward the
//! winning end, freezing walks back. With decaying exploration the greedy
//! policy must converge to always-push, which is the known optimum.

use laneq::{Action, LaneState, QLearningAgent};

const CHOICES: [Action; 2] = [Action::Push, Action::Freeze];

fn chain_state(wave: i8) -> LaneState {
    LaneState {
        wave,
        stack_ally: 0,
        stack_enemy: 0,
        hp_ally: 2,
        hp_enemy: 2,
        gold: 0,
        plates_ally: 3,
        plates_enemy: 3,
        ward_ally: false,
        ward_enemy: false,
        turn: 0,
    }
}

/// Deterministic chain dynamics: waves -1 and 0 are interior, +1 is the
/// rewarding terminal.
fn chain_step(state: &LaneState, action: Action) -> (LaneState, f64, bool) {
    let wave = match action {
        Action::Push => state.wave + 1,
        _ => (state.wave - 1).max(-1),
    };
    let next = chain_state(wave);
    if wave >= 1 {
        (next, 1.0, true)
    } else {
        (next, 0.0, false)
    }
}

#[test]
fn greedy_policy_matches_the_known_optimum() {
    let mut agent = QLearningAgent::new(0.5, 0.9, 0.0).unwrap().with_seed(17);
    let mut epsilon = 0.3;

    for _ in 0..400 {
        agent.set_epsilon(epsilon);
        let mut state = chain_state(-1);

        for _ in 0..20 {
            let action = agent.select_action(&state, &CHOICES).unwrap();
            let (next, reward, done) = chain_step(&state, action);
            agent.update(&state, action, reward, &next, &CHOICES, done);
            state = next;
            if done {
                break;
            }
        }

        epsilon = (epsilon * 0.99_f64).max(0.01);
    }

    let table = agent.q_table();
    for wave in [-1, 0] {
        let state = chain_state(wave);
        assert_eq!(
            table.greedy_action(&state, &CHOICES),
            Some(Action::Push),
            "greedy policy at wave {wave} should push"
        );
    }

    // The learned values carry the discounted distance to the terminal.
    let q_far = table.get(&chain_state(-1), Action::Push);
    let q_near = table.get(&chain_state(0), Action::Push);
    assert!(q_near > q_far, "closer state must be worth more");
    assert!((q_near - 1.0).abs() < 0.05);
    assert!((q_far - 0.9).abs() < 0.05);
}
