//! Tests that run whole episodes of the accident scenario.

use accident_sim::{
    math::Point2d, reward, AccidentEnv, Config, Error, MetaAction, Vehicle, VehicleId,
};
use assert_approx_eq::assert_approx_eq;

const SEED: u64 = 1234;

/// A lane the accident cannot reach, given the lane it is in.
fn safe_lane(crash_lane_index: usize) -> usize {
    if crash_lane_index == 1 {
        3
    } else {
        0
    }
}

/// Builds an empty-traffic episode whose ego starts well clear of the accident.
fn clear_road_env(config: Config) -> AccidentEnv {
    let mut env = AccidentEnv::with_seed(config, SEED);
    env.reset(Some(SEED)).unwrap();
    let crash_lane = env.world().unwrap().crash_lane_index;

    // The crash lane is drawn first, so the same seed gives the same accident.
    env.config_mut().initial_lane_id = Some(safe_lane(crash_lane));
    env.reset(Some(SEED)).unwrap();
    assert_eq!(env.world().unwrap().crash_lane_index, crash_lane);
    env
}

fn agent(env: &AccidentEnv) -> VehicleId {
    env.agent_vehicle().unwrap()
}

/// Test that an uneventful episode runs exactly until the time budget is spent.
#[test]
fn episode_truncates_at_duration() {
    let mut env = clear_road_env(Config {
        duration: 20.0,
        vehicles_count: 0,
        offroad_terminal: false,
        ..Default::default()
    });

    for i in 1..=20 {
        let step = env.step(MetaAction::Idle).unwrap();
        assert!(!step.terminated, "terminated at step {}", i);
        assert!(!step.info.crashed);
        assert_eq!(step.truncated, i == 20, "step {}", i);
    }
    assert_approx_eq!(env.time(), 20.0);
    assert!(matches!(env.step(MetaAction::Idle), Err(Error::EpisodeOver)));
}

/// Test that the time budget is measured in simulated seconds, not steps.
#[test]
fn truncation_follows_policy_frequency() {
    let mut env = clear_road_env(Config {
        duration: 5.0,
        vehicles_count: 0,
        policy_frequency: 2,
        ..Default::default()
    });
    let steps = std::iter::repeat_with(|| env.step(MetaAction::Idle).unwrap())
        .take_while(|step| !step.done())
        .count();
    assert_eq!(steps, 9);
}

/// Test that truncation lands on the exact step for frequencies whose period
/// is not a whole number of seconds.
#[test]
fn truncation_is_exact_at_fractional_periods() {
    for policy_frequency in [3, 5, 10] {
        let mut env = clear_road_env(Config {
            duration: 10.0,
            vehicles_count: 0,
            simulation_frequency: policy_frequency,
            policy_frequency,
            ..Default::default()
        });
        let steps = std::iter::repeat_with(|| env.step(MetaAction::Idle).unwrap())
            .take_while(|step| !step.done())
            .count();
        assert_eq!(steps + 1, 10 * policy_frequency as usize, "policy frequency {}", policy_frequency);
        assert!(env.status().truncated);
        assert!(!env.status().terminated);
        assert_eq!(env.time(), 10.0);
    }
}

#[test]
fn stepping_before_reset_fails() {
    let mut env = AccidentEnv::with_seed(Config::default(), SEED);
    assert!(matches!(env.step(MetaAction::Idle), Err(Error::NotReset)));
}

/// Test that the action interface and the stored agent refer to one vehicle.
#[test]
fn controlled_vehicle_is_the_agent_vehicle() {
    let mut env = AccidentEnv::with_seed(Config::default(), SEED);
    for seed in 0..5 {
        env.reset(Some(seed)).unwrap();
        assert_eq!(env.vehicle(), env.agent_vehicle());
        let world = env.world().unwrap();
        assert!(world.road.vehicle(agent(&env)).is_controlled());
    }
}

#[test]
fn hazards_are_placed_in_an_interior_lane() {
    let mut env = AccidentEnv::with_seed(Config::default(), SEED);
    for seed in 0..20 {
        env.reset(Some(seed)).unwrap();
        let world = env.world().unwrap();
        assert!((1..=3).contains(&world.crash_lane_index));
        let lane = world.road.network().lane_by_id(world.crash_lane_index).unwrap();
        for hazard in world.road.objects() {
            assert!(hazard.crashed());
            assert_eq!(hazard.speed(), 0.0);
            assert!(lane.on_lane(hazard.position(), 0.0));
        }
    }
}

/// Test that a fixed seed gives the same episode.
#[test]
fn seeded_episodes_are_reproducible() {
    let run = || {
        let mut env = AccidentEnv::with_seed(Config::default(), SEED);
        env.reset(None).unwrap();
        let mut rewards = vec![];
        for action in [MetaAction::Faster, MetaAction::LaneRight, MetaAction::Idle] {
            let step = env.step(action).unwrap();
            rewards.push(step.reward);
            if step.done() {
                break;
            }
        }
        rewards
    };
    assert_eq!(run(), run());
}

/// Test that the reaction penalty grows as the agent nears the accident.
#[test]
fn reaction_penalty_grows_near_the_accident() {
    let mut env = clear_road_env(Config {
        vehicles_count: 0,
        ..Default::default()
    });
    let id = agent(&env);
    let config = env.config().clone();
    let world = env.world_mut().unwrap();
    let hazard = world.road.objects()[0].position();

    world.road.move_vehicle(id, hazard);
    let at_hazard = reward::rewards(&world.road, id, id, world.crash_lane_index, &config);

    world.road.move_vehicle(id, Point2d::new(hazard.x - 100.0, hazard.y));
    let far_away = reward::rewards(&world.road, id, id, world.crash_lane_index, &config);

    assert_approx_eq!(at_hazard.reaction_reward, -0.5);
    assert_eq!(far_away.reaction_reward, 0.0);
    assert!(at_hazard.reaction_reward < far_away.reaction_reward);
}

/// Test that both the crash lane and the lane to its left are penalised,
/// and nothing to its right.
#[test]
fn reaction_penalty_covers_crash_lane_and_its_left_neighbour() {
    let mut env = clear_road_env(Config {
        vehicles_count: 0,
        ..Default::default()
    });
    let id = agent(&env);
    let config = env.config().clone();
    let world = env.world_mut().unwrap();
    let crash_lane = world.crash_lane_index;
    let network = world.road.network().clone();

    // Hazard 0 is 20 m ahead and 2 m to the side from either lane.
    let expected = ((20.0f64 * 20.0 + 2.0 * 2.0).sqrt() - 40.0) / 80.0;
    for lane_id in [crash_lane, crash_lane - 1] {
        let position = network.lane_by_id(lane_id).unwrap().position(480.0, 0.0);
        world.road.move_vehicle(id, position);
        assert_eq!(world.road.vehicle(id).lane_index().id, lane_id);
        let rewards = reward::rewards(&world.road, id, id, crash_lane, &config);
        assert_approx_eq!(rewards.reaction_reward, expected);
    }

    if crash_lane + 1 < network.lanes_count() {
        let position = network.lane_by_id(crash_lane + 1).unwrap().position(480.0, 0.0);
        world.road.move_vehicle(id, position);
        let rewards = reward::rewards(&world.road, id, id, crash_lane, &config);
        assert_eq!(rewards.reaction_reward, 0.0);
    }
}

#[test]
fn no_reaction_penalty_in_unaffected_lanes() {
    let mut env = clear_road_env(Config {
        vehicles_count: 0,
        ..Default::default()
    });
    let id = agent(&env);
    let config = env.config().clone();
    let world = env.world_mut().unwrap();
    let crash_lane = world.crash_lane_index;
    let lane = world.road.network().lane_by_id(safe_lane(crash_lane)).unwrap();
    let position = lane.position(500.0, 0.0);

    world.road.move_vehicle(id, position);
    let rewards = reward::rewards(&world.road, id, id, crash_lane, &config);
    assert_eq!(rewards.reaction_reward, 0.0);
}

#[test]
fn tailgating_penalty() {
    let mut env = clear_road_env(Config {
        vehicles_count: 0,
        ..Default::default()
    });
    let id = agent(&env);
    let config = env.config().clone();
    let world = env.world_mut().unwrap();
    let crash_lane = world.crash_lane_index;
    let lane = world.road.network().lane_by_id(0).unwrap();
    let (ego_pos, lead_pos) = (lane.position(600.0, 0.0), lane.position(605.0, 0.0));

    world.road.move_vehicle(id, ego_pos);
    let alone = reward::rewards(&world.road, id, id, crash_lane, &config);
    assert_eq!(alone.tailgating_reward, 0.0);

    let network = world.road.network().clone();
    world.road.add_vehicle(Vehicle::new(&network, lead_pos, 0.0, 25.0));
    let followed = reward::rewards(&world.road, id, id, crash_lane, &config);
    assert_approx_eq!(followed.tailgating_reward, -0.25);
}

#[test]
fn job_well_done_only_past_the_accident_on_the_right() {
    let mut env = clear_road_env(Config {
        vehicles_count: 0,
        ..Default::default()
    });
    let id = agent(&env);
    let config = env.config().clone();
    let world = env.world_mut().unwrap();
    let crash_lane = world.crash_lane_index;
    let network = world.road.network().clone();

    let cases = [(3, 520.0, 0.3), (3, 505.0, 0.0), (2, 520.0, 0.0)];
    for (lane_id, long, expected) in cases {
        let position = network.lane_by_id(lane_id).unwrap().position(long, 0.0);
        world.road.move_vehicle(id, position);
        let rewards = reward::rewards(&world.road, id, id, crash_lane, &config);
        assert_eq!(rewards.job_well_done_reward, expected, "lane {} at {}", lane_id, long);
    }
}

#[test]
fn right_lane_reward_follows_target_lane() {
    let mut env = AccidentEnv::with_seed(
        Config {
            vehicles_count: 0,
            initial_lane_id: Some(0),
            ..Default::default()
        },
        SEED,
    );
    env.reset(None).unwrap();
    let step = env.step(MetaAction::LaneRight).unwrap();
    assert_approx_eq!(step.info.rewards.right_lane_reward, 1.0 / 3.0);
}

#[test]
fn collision_terminates() {
    let mut env = clear_road_env(Config {
        vehicles_count: 0,
        ..Default::default()
    });
    let id = agent(&env);
    let world = env.world_mut().unwrap();
    let hazard = world.road.objects()[0].position();
    world.road.move_vehicle(id, hazard);

    let step = env.step(MetaAction::Idle).unwrap();
    assert!(step.info.crashed);
    assert_eq!(step.info.rewards.collision_reward, 1.0);
    assert!(step.terminated);
    assert!(!step.truncated);
}

#[test]
fn leaving_the_road_zeroes_reward() {
    for offroad_terminal in [false, true] {
        let mut env = clear_road_env(Config {
            vehicles_count: 0,
            offroad_terminal,
            ..Default::default()
        });
        let id = agent(&env);
        let world = env.world_mut().unwrap();
        let position = world.road.vehicle(id).position();
        world.road.move_vehicle(id, Point2d::new(position.x, -40.0));

        let step = env.step(MetaAction::Idle).unwrap();
        assert_eq!(step.info.rewards.on_road_reward, 0.0);
        assert_eq!(step.reward, 0.0);
        assert_eq!(step.terminated, offroad_terminal);
    }
}

/// Test that reward weights are read on every step.
#[test]
fn weight_edits_apply_to_the_next_step() {
    let mut env = clear_road_env(Config {
        vehicles_count: 0,
        ..Default::default()
    });
    env.step(MetaAction::Idle).unwrap();

    {
        let config = env.config_mut();
        config.normalize_reward = false;
        config.right_lane_reward = 0.0;
        config.high_speed_reward = 0.0;
    }
    let step = env.step(MetaAction::Idle).unwrap();
    assert_eq!(step.reward, 0.0);

    env.config_mut().high_speed_reward = 1.0;
    let step = env.step(MetaAction::Idle).unwrap();
    assert_approx_eq!(step.reward, step.info.rewards.high_speed_reward);
    assert!(step.reward > 0.0);
}

#[test]
fn step_info_serialises() {
    let mut env = clear_road_env(Config {
        vehicles_count: 0,
        ..Default::default()
    });
    let step = env.step(MetaAction::Faster).unwrap();
    let json = serde_json::to_value(&step).unwrap();
    assert_eq!(json["info"]["action"], "Faster");
    assert!(json["info"]["rewards"]["high_speed_reward"].is_number());
}
