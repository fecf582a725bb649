use std::time::{Duration, Instant};

use comms::{
    TrackerHandle,
    specs::{ActionMode, Collector, Env, Experience, Policy, Recorder, Summary},
};
use model_mgr::ModelMgrHandle;
use tester::OnlineTester;

use crate::{config::TrainerConfig, error::Result};

/// What a finished run reports back.
#[derive(Debug)]
pub struct TrainingStats {
    pub update_step: u64,
    pub elapsed: Duration,
}

/// Single-context orchestrator: collection, learning and evaluation all
/// advance within one task, in a collect → learn → evaluate → check
/// cycle. Used when parallel actor distribution is unavailable.
///
/// Parameters still flow through the model manager service, so the
/// persistence and evaluation paths behave exactly as they do under the
/// distributed variant.
pub struct SimpleTrainer<P, E, C, R>
where
    P: Policy,
{
    cfg: TrainerConfig,
    policy: P,
    env: E,
    collector: C,
    recorder: R,
    model_mgr: ModelMgrHandle,
    tracker: TrackerHandle,
    online_tester: Option<OnlineTester<P, E, R>>,
    update_step: u64,
}

impl<P, E, C, R, S, A, B> SimpleTrainer<P, E, C, R>
where
    P: Policy<State = S, Action = A, Batch = B>,
    E: Env<State = S, Action = A>,
    C: Collector<State = S, Action = A, Batch = B>,
    R: Recorder,
    S: Clone,
{
    pub fn new(
        cfg: TrainerConfig,
        policy: P,
        env: E,
        collector: C,
        recorder: R,
        model_mgr: ModelMgrHandle,
        tracker: TrackerHandle,
    ) -> Self {
        Self {
            cfg,
            policy,
            env,
            collector,
            recorder,
            model_mgr,
            tracker,
            online_tester: None,
            update_step: 0,
        }
    }

    /// Attaches an inline online tester, ticked after every learning
    /// cycle that produced new output.
    pub fn with_online_tester(mut self, tester: OnlineTester<P, E, R>) -> Self {
        self.online_tester = Some(tester);
        self
    }

    /// Runs the training loop until the tracker reports task end.
    pub async fn run(mut self) -> Result<TrainingStats> {
        log::info!("[SimpleTrainer] start {}ing", self.cfg.mode);
        let start = Instant::now();

        loop {
            self.collect().await?;
            let updated = self.learn().await?;

            if updated {
                if let Some(tester) = self.online_tester.as_mut() {
                    if let Err(err) = tester.tick().await {
                        log::warn!("[SimpleTrainer] online eval tick failed: {err}");
                    }
                }
            }

            if self.tracker.check_task_end().await? {
                break;
            }
        }

        let elapsed = start.elapsed();
        log::info!(
            "[SimpleTrainer] finish {}ing, time cost: {:.3} s",
            self.cfg.mode,
            elapsed.as_secs_f64()
        );
        Ok(TrainingStats {
            update_step: self.update_step,
            elapsed,
        })
    }

    /// Interacts with the environment for one cycle and feeds the
    /// collector, resetting whenever an episode ends.
    async fn collect(&mut self) -> Result<()> {
        let n = self.cfg.n_sample_steps;
        let mut exps = Vec::with_capacity(n);
        let (mut state, _info) = self.env.reset();

        for _ in 0..n {
            let action = self.policy.select_action(&state, ActionMode::Sample);
            let tr = self.env.step(&action);
            let done = tr.terminated || tr.truncated;

            exps.push(Experience {
                state,
                action,
                reward: tr.reward,
                next_state: tr.next_state.clone(),
                terminated: tr.terminated,
                truncated: tr.truncated,
            });

            state = if done { self.env.reset().0 } else { tr.next_state };
        }

        self.collector.add_exps(exps);
        self.tracker.increase_sample_count(n as u64).await?;
        Ok(())
    }

    /// Runs the learning iterations for one cycle: as many as the buffer
    /// holds when on-policy, a fixed count otherwise.
    ///
    /// # Returns
    /// Whether any update was produced this cycle.
    async fn learn(&mut self) -> Result<bool> {
        let n = if self.cfg.onpolicy_flag {
            self.collector.get_buffer_length()
        } else {
            self.cfg.n_steps_per_learn
        };

        let mut updated = false;
        for _ in 0..n {
            let Some(batch) = self.collector.get_training_data() else {
                break;
            };
            let (blob, summary) = self.policy.compute_update(batch);
            self.update_step += 1;

            self.model_mgr
                .put_model_params(self.update_step, blob)
                .await?;
            self.tracker.increase_update_step(1).await?;
            self.recorder.add_summary(Summary::Policy(summary));
            updated = true;
        }

        Ok(updated)
    }
}
