use anyhow::Result;
use cleval_atari_env::{AtariAct, AtariEnv, AtariEnvConfig};
use cleval_core::{Evaluator, FixedSeedEvaluator, Policy, SeedPolicy};

struct RandomPolicy {
    n_actions: u8,
}

impl Policy<AtariEnv> for RandomPolicy {
    fn sample(&mut self, _obs: &<AtariEnv as cleval_core::Env>::Obs) -> AtariAct {
        AtariAct::new(fastrand::u8(..self.n_actions))
    }
}

fn evaluator(n_episodes: usize, max_steps: usize) -> Result<FixedSeedEvaluator<AtariEnv>> {
    let config = AtariEnvConfig::default().name("Scripted-v0");
    FixedSeedEvaluator::new(&config, n_episodes, max_steps, SeedPolicy::Fixed(7))
}

#[test]
fn rollouts_collect_one_return_per_episode() -> Result<()> {
    let mut evaluator = evaluator(2, 100)?;
    let n_actions = evaluator.env().n_actions() as u8;
    let mut policy: Box<dyn Policy<AtariEnv>> = Box::new(RandomPolicy { n_actions });

    // The scripted game pays 1.0 per raw frame over 160 frames.
    let report = evaluator.evaluate(&mut policy)?;
    assert_eq!(report.episode_returns, vec![160.0, 160.0]);
    assert_eq!(report.mean(), 160.0);
    Ok(())
}

#[test]
fn capped_rollouts_are_dropped() -> Result<()> {
    let mut evaluator = evaluator(2, 10)?;
    let n_actions = evaluator.env().n_actions() as u8;
    let mut policy: Box<dyn Policy<AtariEnv>> = Box::new(RandomPolicy { n_actions });

    let report = evaluator.evaluate(&mut policy)?;
    assert!(report.episode_returns.is_empty());
    Ok(())
}
