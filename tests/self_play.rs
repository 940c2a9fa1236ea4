//! The full loop: train against scripted opponents with periodic self-play
//! snapshots, then evaluate the frozen policy against the whole pool.

use laneq::{
    Evaluator, LaneEnv, LaneParams, OpponentPool, PolicyExport, QLearningAgent, Trainer,
    TrainerConfig,
    opponents::{AlwaysFreeze, AlwaysPush, SafeFarmer},
    pipeline::ExplorationSchedule,
};

#[test]
fn self_play_training_then_evaluation() {
    let params = LaneParams::default();
    let mut env = LaneEnv::with_seed(params, 10).unwrap();
    let mut agent = QLearningAgent::new(0.15, 0.95, 0.0).unwrap();

    // Snapshot ring capacity 2: of the 4 snapshots pushed below, only the
    // two most recent survive; scripted entries are permanent.
    let mut pool = OpponentPool::new(2).unwrap().with_seed(10);
    pool.add("always-push", Box::new(AlwaysPush), 1.0).unwrap();
    pool.add("always-freeze", Box::new(AlwaysFreeze), 1.0)
        .unwrap();

    let config = TrainerConfig {
        episodes: 200,
        snapshot_interval: 50,
        snapshot_weight: 0.5,
        exploration: ExplorationSchedule {
            initial: 0.5,
            decay: 0.99,
            floor: 0.05,
        },
        seed: Some(10),
    };
    let result = Trainer::new(config)
        .unwrap()
        .run(&mut env, &mut agent, &mut pool)
        .unwrap();

    assert_eq!(result.episodes, 200);
    assert_eq!(result.wins + result.draws + result.losses, 200);
    assert!(!agent.q_table().is_empty());

    assert_eq!(pool.snapshot_count(), 2);
    assert_eq!(pool.len(), 4);
    let ids: Vec<&str> = pool.entries().iter().map(|e| e.id.as_str()).collect();
    assert!(ids.contains(&"snapshot-000150"));
    assert!(ids.contains(&"snapshot-000200"));
    assert!(!ids.contains(&"snapshot-000050"));

    // Evaluate the frozen table against the pool plus a held-out policy.
    let export_before = serde_json::to_string(&PolicyExport::from_q_table(agent.q_table())).unwrap();

    let evaluator = Evaluator::new(params, 30, 500)
        .unwrap()
        .with_held_out("safe-farmer", Box::new(SafeFarmer));
    let reports = evaluator.evaluate(agent.q_table(), &pool).unwrap();

    assert_eq!(reports.len(), pool.len() + 1);
    for report in &reports {
        assert_eq!(report.episodes, 30);
        assert!(report.mean_reward.is_finite());
        assert!(report.reward_variance >= 0.0);
        let total = report.outcome_rate.win + report.outcome_rate.loss + report.outcome_rate.draw;
        assert!((total - 1.0).abs() < 1e-9);
    }

    // Evaluation must not have mutated the learned table or the pool.
    let export_after = serde_json::to_string(&PolicyExport::from_q_table(agent.q_table())).unwrap();
    assert_eq!(export_before, export_after);
    assert_eq!(pool.len(), 4);
    assert_eq!(pool.snapshot_count(), 2);
}
