use accident_sim::{AccidentEnv, Config, MetaAction};
use rand::Rng;

fn main() {
    let config = match std::env::args().nth(1) {
        Some(json) => Config::from_json(&json).expect("Invalid configuration"),
        None => Config::default(),
    };
    let mut env = AccidentEnv::new(config);
    env.reset(None).expect("Failed to build the scenario");

    let mut rng = rand::thread_rng();
    loop {
        let action = MetaAction::ALL[rng.gen_range(0..MetaAction::ALL.len())];
        let step = env.step(action).expect("Failed to step the scenario");

        println!(
            "\nAction: {} | Speed: {:.2} | Crashed: {}",
            step.info.action, step.info.speed, step.info.crashed
        );
        println!("Step Reward: {:.3}", step.reward);
        println!("  Reward Breakdown:");
        for (name, value) in step.info.rewards.iter() {
            let marker = if value < 0.0 { " <==" } else { "" };
            println!("    {:22}: {:>7.3}{}", name, value, marker);
        }

        if step.done() {
            break;
        }
    }
}
