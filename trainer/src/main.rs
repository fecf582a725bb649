//! Runnable end-to-end demo: an epsilon-greedy table policy learning a
//! multi-armed bandit, with checkpoint persistence and online
//! evaluation riding along in the background.

use std::{collections::VecDeque, io, time::Duration};

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use comms::{
    ParamsBlob, Tracker, TrackerConfig,
    specs::{
        ActionMode, Collector, CorruptParams, Env, Experience, Info, Policy, PolicySummary,
        Recorder, Summary, Transition,
    },
};
use model_mgr::{ModelMgr, ModelMgrConfig, checkpoint};
use tester::{OnlineTester, TesterConfig};
use trainer::{SimpleTrainer, TrainerConfig};

const ARMS: usize = 3;

/// Stationary multi-armed bandit; every pull is its own episode.
struct BanditEnv {
    arm_means: Vec<f64>,
    rng: StdRng,
}

impl BanditEnv {
    fn new(arm_means: Vec<f64>, seed: u64) -> Self {
        Self {
            arm_means,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Env for BanditEnv {
    type State = ();
    type Action = usize;

    fn reset(&mut self) -> ((), Info) {
        ((), Info::Null)
    }

    fn step(&mut self, action: &usize) -> Transition<()> {
        let noise = self.rng.random_range(-0.05..0.05);
        Transition {
            next_state: (),
            reward: self.arm_means[*action] + noise,
            terminated: true,
            truncated: false,
            info: Info::Null,
        }
    }
}

/// The serialized form of the table policy's parameters.
#[derive(Debug, Serialize, Deserialize)]
struct TableParams {
    values: Vec<f64>,
}

/// Epsilon-greedy value table over the bandit arms.
struct TablePolicy {
    values: Vec<f64>,
    counts: Vec<u64>,
    epsilon: f64,
    update_step: u64,
    rng: StdRng,
}

impl TablePolicy {
    fn new(arms: usize, epsilon: f64, seed: u64) -> Self {
        Self {
            values: vec![0.0; arms],
            counts: vec![0; arms],
            epsilon,
            update_step: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn greedy_action(&self) -> usize {
        self.values
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(arm, _)| arm)
            .unwrap_or(0)
    }
}

impl Policy for TablePolicy {
    type State = ();
    type Action = usize;
    type Batch = Vec<Experience<(), usize>>;

    fn select_action(&mut self, _state: &(), mode: ActionMode) -> usize {
        match mode {
            ActionMode::Sample if self.rng.random::<f64>() < self.epsilon => {
                self.rng.random_range(0..self.values.len())
            }
            ActionMode::Sample | ActionMode::Predict => self.greedy_action(),
        }
    }

    fn install_parameters(&mut self, blob: &[u8]) -> Result<(), CorruptParams> {
        let params: TableParams = serde_json::from_slice(blob).map_err(|e| CorruptParams {
            reason: e.to_string(),
        })?;
        self.values = params.values;
        Ok(())
    }

    fn compute_update(&mut self, batch: Self::Batch) -> (ParamsBlob, PolicySummary) {
        let mut batch_reward = 0.0;
        let batch_len = batch.len().max(1);

        // Incremental mean estimate per arm.
        for exp in batch {
            self.counts[exp.action] += 1;
            let count = self.counts[exp.action] as f64;
            self.values[exp.action] += (exp.reward - self.values[exp.action]) / count;
            batch_reward += exp.reward;
        }

        self.update_step += 1;
        let blob = serde_json::to_vec(&TableParams {
            values: self.values.clone(),
        })
        .expect("table params always serialize");

        let summary = PolicySummary {
            update_step: self.update_step,
            scalars: vec![("batch_mean_reward".into(), batch_reward / batch_len as f64)],
        };
        (blob, summary)
    }
}

/// FIFO experience buffer handing out fixed-size batches.
struct VecCollector {
    buf: VecDeque<Experience<(), usize>>,
    batch_size: usize,
}

impl VecCollector {
    fn new(batch_size: usize) -> Self {
        Self {
            buf: VecDeque::new(),
            batch_size,
        }
    }
}

impl Collector for VecCollector {
    type State = ();
    type Action = usize;
    type Batch = Vec<Experience<(), usize>>;

    fn add_exps(&mut self, exps: Vec<Experience<(), usize>>) {
        self.buf.extend(exps);
    }

    fn get_training_data(&mut self) -> Option<Self::Batch> {
        if self.buf.is_empty() {
            return None;
        }
        let take = self.batch_size.min(self.buf.len());
        Some(self.buf.drain(..take).collect())
    }

    fn get_buffer_length(&self) -> usize {
        self.buf.len()
    }
}

/// Recorder that writes every summary as a JSON log line.
struct LogRecorder;

impl Recorder for LogRecorder {
    fn add_summary(&mut self, summary: Summary) {
        match serde_json::to_string(&summary) {
            Ok(line) => log::info!("[Recorder] {line}"),
            Err(e) => log::warn!("[Recorder] unserializable summary: {e}"),
        }
    }
}

#[tokio::main]
async fn main() -> io::Result<()> {
    env_logger::init();

    let model_dir = std::env::temp_dir().join(format!("bandit_run_{}", std::process::id()));
    let arm_means = vec![0.1, 0.5, 0.9];

    let tracker = Tracker::spawn(TrackerConfig {
        max_update_step: 200,
        max_sample_count: 0,
    })
    .map_err(io::Error::other)?;

    let (model_mgr, _failures) = ModelMgr::spawn(ModelMgrConfig {
        model_dir: model_dir.clone(),
        save_interval: 20,
        queue_capacity: 128,
        poll_interval_persist: Duration::from_millis(20),
    })
    .await?;

    // The tester gets its own greedy policy and environment instances.
    let online_tester = OnlineTester::new(
        TesterConfig {
            model_dir: model_dir.clone(),
            online_eval_episode: 20,
            max_step: -1,
            poll_interval_eval: Duration::from_millis(100),
        },
        TablePolicy::new(ARMS, 0.0, 7),
        BanditEnv::new(arm_means.clone(), 99),
        LogRecorder,
    );

    let trainer = SimpleTrainer::new(
        TrainerConfig {
            n_sample_steps: 32,
            ..Default::default()
        },
        TablePolicy::new(ARMS, 0.2, 1),
        BanditEnv::new(arm_means, 2),
        VecCollector::new(32),
        LogRecorder,
        model_mgr,
        tracker,
    )
    .with_online_tester(online_tester);

    let stats = trainer.run().await.map_err(io::Error::other)?;
    println!(
        "finished after {} updates in {:.3} s",
        stats.update_step,
        stats.elapsed.as_secs_f64()
    );

    let best = checkpoint::best_path(&model_dir);
    if tokio::fs::try_exists(&best).await? {
        let params: TableParams = serde_json::from_slice(&checkpoint::read_blob(&best).await?)
            .map_err(io::Error::other)?;
        println!("best arm estimates: {:?}", params.values);
    }

    Ok(())
}
