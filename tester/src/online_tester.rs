use std::io;

use tokio::time;

use comms::specs::{ActionMode, Env, EvalSummary, Policy, Recorder, Summary};
use model_mgr::checkpoint;

use crate::{
    config::TesterConfig,
    error::{Result, TesterErr},
};

/// Background evaluator racing the training loop over stable storage.
///
/// Polls the checkpoint directory, evaluates the newest unseen step
/// against its own policy/environment pair, and republishes the
/// best-performing blob under the `best` key. It is the sole writer of
/// `best`, so no coordination with other roles is needed.
pub struct OnlineTester<P, E, R> {
    cfg: TesterConfig,
    policy: P,
    env: E,
    recorder: R,
    best_eval_reward: f64,
    last_seen_step: Option<u64>,
}

impl<P, E, R, S, A> OnlineTester<P, E, R>
where
    P: Policy<State = S, Action = A>,
    E: Env<State = S, Action = A>,
    R: Recorder,
{
    pub fn new(cfg: TesterConfig, policy: P, env: E, recorder: R) -> Self {
        Self {
            cfg,
            policy,
            env,
            recorder,
            best_eval_reward: f64::NEG_INFINITY,
            last_seen_step: None,
        }
    }

    /// Detached polling loop. Abandoned (aborted) at shutdown; in-flight
    /// evaluation work may be dropped without corrupting stable storage.
    pub async fn run(mut self) {
        log::info!("[OnlineTester] start online tester");
        loop {
            if let Err(err) = self.tick().await {
                log::warn!("[OnlineTester] poll tick failed: {err}");
            }
            time::sleep(self.cfg.poll_interval_eval).await;
        }
    }

    /// One discovery poll: evaluates the newest unseen checkpoint, if any.
    pub async fn tick(&mut self) -> Result<()> {
        let Some(step) = self.check_updated_model().await? else {
            return Ok(());
        };

        // Advanced before the load attempt: an evaluated (or corrupt)
        // step is never retried.
        self.last_seen_step = Some(step);

        let path = checkpoint::step_path(&self.cfg.model_dir, step);
        let blob = checkpoint::read_blob(&path)
            .await
            .map_err(|source| TesterErr::LoadCheckpoint { step, source })?;

        if let Err(err) = self.policy.install_parameters(&blob) {
            log::warn!(step = step; "[OnlineTester] skipping corrupt checkpoint: {err}");
            return Ok(());
        }

        let mean_reward = self.evaluate();
        log::info!("[OnlineTester] test_step: {step}, online_eval_reward: {mean_reward:.3}");
        self.recorder.add_summary(Summary::Eval(EvalSummary {
            step,
            mean_reward,
            episode_count: self.cfg.online_eval_episode,
        }));

        // Ties go to the newer checkpoint.
        if mean_reward >= self.best_eval_reward {
            log::info!(
                "[OnlineTester] new best online_eval_reward: {mean_reward:.3}, saving best model"
            );
            let best = checkpoint::best_path(&self.cfg.model_dir);
            checkpoint::commit_blob(&best, &blob)
                .await
                .map_err(|source| TesterErr::SaveBest { step, source })?;
            self.best_eval_reward = mean_reward;
        }

        Ok(())
    }

    /// The step evaluated by the last completed or attempted pass.
    pub fn last_seen_step(&self) -> Option<u64> {
        self.last_seen_step
    }

    /// Highest mean evaluation reward observed so far.
    pub fn best_eval_reward(&self) -> f64 {
        self.best_eval_reward
    }

    /// Returns the newest checkpoint step strictly greater than the last
    /// seen one. A listing whose maximum is at or below `last_seen_step`
    /// (stale or partial) leaves the tester waiting.
    async fn check_updated_model(&self) -> Result<Option<u64>> {
        let steps = match checkpoint::list_steps(&self.cfg.model_dir).await {
            Ok(steps) => steps,
            // The trainer may not have created the directory yet.
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(TesterErr::ListDir(e)),
        };

        let Some(max) = steps.into_iter().max() else {
            return Ok(None);
        };

        match self.last_seen_step {
            Some(seen) if max <= seen => Ok(None),
            _ => Ok(Some(max)),
        }
    }

    /// Runs the configured number of full episodes with the installed
    /// parameters and returns the mean episode reward.
    fn evaluate(&mut self) -> f64 {
        let episodes = self.cfg.online_eval_episode.max(1);
        let mut sum_eval_reward = 0.0;

        for _ in 0..episodes {
            sum_eval_reward += self.run_episode();
        }

        sum_eval_reward / f64::from(episodes)
    }

    /// One greedy episode: ends on termination, truncation or the
    /// configured step cap.
    fn run_episode(&mut self) -> f64 {
        let (mut state, _info) = self.env.reset();
        let mut ep_reward = 0.0;
        let mut ep_step: i64 = 0;

        loop {
            let action = self.policy.select_action(&state, ActionMode::Predict);
            let tr = self.env.step(&action);
            ep_reward += tr.reward;
            ep_step += 1;

            if tr.terminated || tr.truncated || (self.cfg.max_step >= 0 && ep_step >= self.cfg.max_step)
            {
                return ep_reward;
            }
            state = tr.next_state;
        }
    }
}
