//! Evaluation driver: loads an agent checkpoint, runs rollout episodes
//! and reports the per-episode and mean returns.
use anyhow::Result;
use candle_core::Device;
use clap::Parser;
use cleval_atari_env::{AtariEnv, AtariEnvConfig};
use cleval_candle_agent::{
    registry::{load_agent, AgentSpec, Algorithm},
    LoadedPolicy,
};
use cleval_core::{
    checkpoint::CheckpointName,
    record::{EpisodeCsvRecorder, EpisodeRow},
    Evaluator, FixedSeedEvaluator, Policy, SeedPolicy,
};
use std::path::PathBuf;

/// Evaluates a continual-learning agent checkpoint on its environment.
#[derive(Debug, Parser)]
#[command(version, name = "cleval")]
struct Args {
    /// Path of the checkpoint to evaluate.
    #[arg(long)]
    load: PathBuf,

    /// Seed of the evaluation run.
    #[arg(long, default_value_t = 42)]
    seed: i64,

    /// Game mode (task) to evaluate on; defaults to the checkpoint's
    /// train mode.
    #[arg(long)]
    mode: Option<i64>,

    /// Number of prior tasks, for architectures that rebuild on
    /// earlier checkpoints.
    #[arg(long = "train_mode")]
    train_mode: Option<i64>,

    /// Step cap per episode.
    #[arg(long = "max-timesteps", default_value_t = 1000)]
    max_timesteps: usize,

    /// Number of episodes to run.
    #[arg(long = "num-episodes", default_value_t = 10)]
    num_episodes: usize,

    /// Opens a window displaying the game.
    #[arg(long, default_value_t = false)]
    render: bool,

    /// Appends per-episode returns to this CSV file.
    #[arg(long)]
    csv: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let name = CheckpointName::parse(&args.load)?;
    let mode = args.mode.unwrap_or(name.train_mode);
    println!(
        "\nEnvironment: {}, train/test mode: {}/{}, algorithm: {}, seed: {}\n",
        name.env_name, name.train_mode, mode, name.algorithm, args.seed
    );

    let algorithm = match name.algorithm.parse::<Algorithm>() {
        Ok(algorithm) => algorithm,
        Err(_) => {
            println!(
                "Loading of agent type `{}` is not implemented.",
                name.algorithm
            );
            std::process::exit(1);
        }
    };

    let device = Device::cuda_if_available(0)?;

    let config = AtariEnvConfig::default()
        .name(name.env_name.clone())
        .mode(Some(mode))
        .render(args.render);
    let mut evaluator = FixedSeedEvaluator::<AtariEnv>::new(
        &config,
        args.num_episodes,
        args.max_timesteps,
        SeedPolicy::Fixed(args.seed),
    )?;

    let spec = AgentSpec {
        path: args.load.clone(),
        name: name.clone(),
        mode: args.mode,
        train_mode: args.train_mode,
        n_actions: evaluator.env().n_actions(),
        device: device.clone(),
    };
    let agent = load_agent(algorithm, &spec)?;
    let mut policy: Box<dyn Policy<AtariEnv>> = Box::new(LoadedPolicy::new(agent, device));

    let report = evaluator.evaluate(&mut policy)?;
    println!();
    println!("Avg. episodic return: {}", report.mean());

    if let Some(csv) = &args.csv {
        let mut recorder = EpisodeCsvRecorder::open(csv)?;
        for ep_ret in &report.episode_returns {
            recorder.append(&EpisodeRow {
                algorithm: name.normalized_algorithm().to_string(),
                environment: name.env_name.clone(),
                train_mode: name.train_mode,
                test_mode: mode,
                seed: args.seed,
                ep_ret: *ep_ret,
            })?;
        }
        recorder.flush()?;
    }

    Ok(())
}
