use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use tokio::fs;

use comms::{
    ParamsBlob,
    specs::{
        ActionMode, CorruptParams, Env, Info, Policy, PolicySummary, Recorder, Summary, Transition,
    },
};
use model_mgr::checkpoint;
use tester::{OnlineTester, TesterConfig};

/// Policy whose greedy action is the float parsed from the installed blob.
#[derive(Default)]
struct BlobValuePolicy {
    value: f64,
}

impl Policy for BlobValuePolicy {
    type State = ();
    type Action = f64;
    type Batch = ();

    fn select_action(&mut self, _state: &(), _mode: ActionMode) -> f64 {
        self.value
    }

    fn install_parameters(&mut self, blob: &[u8]) -> Result<(), CorruptParams> {
        let text = str::from_utf8(blob).map_err(|e| CorruptParams {
            reason: e.to_string(),
        })?;
        self.value = text.parse().map_err(|_| CorruptParams {
            reason: format!("not a float: {text}"),
        })?;
        Ok(())
    }

    fn compute_update(&mut self, _batch: ()) -> (ParamsBlob, PolicySummary) {
        unimplemented!("not exercised by evaluation")
    }
}

/// Single-step environment echoing the action back as the reward.
struct EchoEnv;

impl Env for EchoEnv {
    type State = ();
    type Action = f64;

    fn reset(&mut self) -> ((), Info) {
        ((), Info::Null)
    }

    fn step(&mut self, action: &f64) -> Transition<()> {
        Transition {
            next_state: (),
            reward: *action,
            terminated: true,
            truncated: false,
            info: Info::Null,
        }
    }
}

/// Environment that never terminates on its own; one reward unit per step.
struct EndlessEnv;

impl Env for EndlessEnv {
    type State = ();
    type Action = f64;

    fn reset(&mut self) -> ((), Info) {
        ((), Info::Null)
    }

    fn step(&mut self, _action: &f64) -> Transition<()> {
        Transition {
            next_state: (),
            reward: 1.0,
            terminated: false,
            truncated: false,
            info: Info::Null,
        }
    }
}

#[derive(Clone, Default)]
struct VecRecorder {
    summaries: Arc<Mutex<Vec<Summary>>>,
}

impl Recorder for VecRecorder {
    fn add_summary(&mut self, summary: Summary) {
        self.summaries.lock().unwrap().push(summary);
    }
}

impl VecRecorder {
    fn eval_steps(&self) -> Vec<u64> {
        self.summaries
            .lock()
            .unwrap()
            .iter()
            .map(|s| match s {
                Summary::Eval(e) => e.step,
                Summary::Policy(_) => panic!("unexpected policy summary"),
            })
            .collect()
    }
}

fn scratch_dir(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("tester_{name}_{}_{nanos}", std::process::id()))
}

fn cfg(model_dir: PathBuf) -> TesterConfig {
    TesterConfig {
        model_dir,
        online_eval_episode: 4,
        max_step: -1,
        poll_interval_eval: Duration::from_millis(10),
    }
}

async fn write_step(dir: &PathBuf, step: u64, blob: &[u8]) {
    checkpoint::commit_blob(&checkpoint::step_path(dir, step), blob)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_missing_or_empty_dir_remains_waiting() {
    let dir = scratch_dir("waiting");
    let recorder = VecRecorder::default();
    let mut tester = OnlineTester::new(
        cfg(dir.clone()),
        BlobValuePolicy::default(),
        EchoEnv,
        recorder.clone(),
    );

    // Directory does not exist yet.
    tester.tick().await.unwrap();
    assert_eq!(tester.last_seen_step(), None);

    // Directory exists but holds only the best key.
    fs::create_dir_all(&dir).await.unwrap();
    checkpoint::commit_blob(&checkpoint::best_path(&dir), b"1.0")
        .await
        .unwrap();
    tester.tick().await.unwrap();

    assert_eq!(tester.last_seen_step(), None);
    assert!(recorder.eval_steps().is_empty());

    fs::remove_dir_all(&dir).await.unwrap();
}

#[tokio::test]
async fn test_evaluates_only_the_newest_checkpoint() {
    let dir = scratch_dir("newest");
    fs::create_dir_all(&dir).await.unwrap();
    let recorder = VecRecorder::default();
    let mut tester = OnlineTester::new(
        cfg(dir.clone()),
        BlobValuePolicy::default(),
        EchoEnv,
        recorder.clone(),
    );

    write_step(&dir, 10, b"1.0").await;
    write_step(&dir, 20, b"2.0").await;
    tester.tick().await.unwrap();
    assert_eq!(tester.last_seen_step(), Some(20));

    write_step(&dir, 30, b"3.0").await;
    tester.tick().await.unwrap();
    assert_eq!(tester.last_seen_step(), Some(30));

    // 10 was never evaluated, and nothing was evaluated twice.
    assert_eq!(recorder.eval_steps(), vec![20, 30]);

    // A tick with nothing new does nothing.
    tester.tick().await.unwrap();
    assert_eq!(recorder.eval_steps(), vec![20, 30]);

    fs::remove_dir_all(&dir).await.unwrap();
}

#[tokio::test]
async fn test_stale_listing_never_regresses() {
    let dir = scratch_dir("stale");
    fs::create_dir_all(&dir).await.unwrap();
    let recorder = VecRecorder::default();
    let mut tester = OnlineTester::new(
        cfg(dir.clone()),
        BlobValuePolicy::default(),
        EchoEnv,
        recorder.clone(),
    );

    write_step(&dir, 10, b"1.0").await;
    write_step(&dir, 20, b"2.0").await;
    tester.tick().await.unwrap();
    assert_eq!(tester.last_seen_step(), Some(20));

    // Simulate a spurious listing whose maximum is older than what we saw.
    fs::remove_file(dir.join("20")).await.unwrap();
    tester.tick().await.unwrap();

    assert_eq!(tester.last_seen_step(), Some(20));
    assert_eq!(recorder.eval_steps(), vec![20]);

    fs::remove_dir_all(&dir).await.unwrap();
}

#[tokio::test]
async fn test_best_is_non_decreasing_and_ties_go_to_newer() {
    let dir = scratch_dir("best");
    fs::create_dir_all(&dir).await.unwrap();
    let recorder = VecRecorder::default();
    let mut tester = OnlineTester::new(
        cfg(dir.clone()),
        BlobValuePolicy::default(),
        EchoEnv,
        recorder.clone(),
    );

    // First evaluation always beats the initial -inf best.
    write_step(&dir, 20, b"5.0").await;
    tester.tick().await.unwrap();
    assert_eq!(tester.best_eval_reward(), 5.0);
    assert_eq!(fs::read(checkpoint::best_path(&dir)).await.unwrap(), b"5.0");

    // A worse checkpoint leaves best untouched.
    write_step(&dir, 30, b"4.0").await;
    tester.tick().await.unwrap();
    assert_eq!(tester.best_eval_reward(), 5.0);
    assert_eq!(fs::read(checkpoint::best_path(&dir)).await.unwrap(), b"5.0");

    // A tie republishes the newer checkpoint's blob.
    write_step(&dir, 40, b"5.000").await;
    tester.tick().await.unwrap();
    assert_eq!(tester.best_eval_reward(), 5.0);
    assert_eq!(
        fs::read(checkpoint::best_path(&dir)).await.unwrap(),
        b"5.000"
    );

    fs::remove_dir_all(&dir).await.unwrap();
}

#[tokio::test]
async fn test_corrupt_checkpoint_is_skipped_once() {
    let dir = scratch_dir("corrupt");
    fs::create_dir_all(&dir).await.unwrap();
    let recorder = VecRecorder::default();
    let mut tester = OnlineTester::new(
        cfg(dir.clone()),
        BlobValuePolicy::default(),
        EchoEnv,
        recorder.clone(),
    );

    write_step(&dir, 50, b"\xff\xfe").await;
    tester.tick().await.unwrap();

    // Skipped with no summary, but never retried.
    assert_eq!(tester.last_seen_step(), Some(50));
    assert!(recorder.eval_steps().is_empty());
    assert!(!fs::try_exists(checkpoint::best_path(&dir)).await.unwrap());

    // Evaluation continues with the next candidate.
    write_step(&dir, 60, b"1.5").await;
    tester.tick().await.unwrap();
    assert_eq!(recorder.eval_steps(), vec![60]);
    assert_eq!(tester.best_eval_reward(), 1.5);

    fs::remove_dir_all(&dir).await.unwrap();
}

#[tokio::test]
async fn test_episode_step_cap_bounds_endless_envs() {
    let dir = scratch_dir("cap");
    fs::create_dir_all(&dir).await.unwrap();
    let recorder = VecRecorder::default();
    let cfg = TesterConfig {
        model_dir: dir.clone(),
        online_eval_episode: 2,
        max_step: 3,
        poll_interval_eval: Duration::from_millis(10),
    };
    let mut tester = OnlineTester::new(cfg, BlobValuePolicy::default(), EndlessEnv, recorder.clone());

    write_step(&dir, 10, b"0.0").await;
    tester.tick().await.unwrap();

    let summaries = recorder.summaries.lock().unwrap().clone();
    let [Summary::Eval(eval)] = summaries.as_slice() else {
        panic!("expected exactly one eval summary, got {summaries:?}");
    };
    // Each episode is cut at 3 steps of reward 1.0.
    assert_eq!(eval.mean_reward, 3.0);
    assert_eq!(eval.episode_count, 2);

    fs::remove_dir_all(&dir).await.unwrap();
}
