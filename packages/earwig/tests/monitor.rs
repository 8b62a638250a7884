//! End-to-end tests for the monitor session.
//
//   cargo test -p earwig --test monitor
//
//  – The sensor is an in-memory link replaying scripted serial payloads.
//  – The classifier is a scripted `ActivationModel` returning fixed heads.
//

use std::{
    cell::RefCell,
    collections::VecDeque,
    io::{Cursor, Read, Write},
    time::Duration,
};

use anyhow::Result;
use approx::assert_abs_diff_eq;
use candle_core::{DType, Device, Tensor};
use earwig::{
    ActivationModel, ClassLabels, ConfigError, Connect, CycleOutcome, ErrorPolicy, FrameReader,
    InferenceEngine, InferenceError, MonitorError, ProtocolError, Reporter, Session,
    constants::{FRAME_LEN, MEL_BANDS},
};

/* ───────────────────────────── fake sensor ────────────────────────── */

struct Link {
    rx: Cursor<Vec<u8>>,
}

impl Read for Link {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.rx.read(buf)
    }
}

impl Write for Link {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        Ok(buf.len())
    }
    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[derive(Default)]
struct Sensor {
    payloads: VecDeque<Vec<u8>>,
    opened: usize,
}

impl Connect for Sensor {
    type Link = Link;

    fn open(&mut self) -> Result<Link, ProtocolError> {
        self.opened += 1;
        Ok(Link {
            rx: Cursor::new(self.payloads.pop_front().unwrap_or_default()),
        })
    }
}

/// A well-formed frame: one line per time step, `e` on the last one.
fn frame(seed: i32) -> Vec<u8> {
    let values: Vec<i32> = (0..FRAME_LEN as i32)
        .map(|i| (i * 31 + seed) % 257 - 128)
        .collect();
    let lines: Vec<String> = values
        .chunks(MEL_BANDS)
        .enumerate()
        .map(|(i, step)| {
            let marker = if (i + 1) * MEL_BANDS == FRAME_LEN { 'e' } else { 'c' };
            let nums: Vec<String> = step.iter().map(i32::to_string).collect();
            format!("{},{marker}\n", nums.join(","))
        })
        .collect();
    lines.concat().into_bytes()
}

fn constant_frame() -> Vec<u8> {
    let mut line = vec!["5"; FRAME_LEN].join(",");
    line.push_str(",e\n");
    line.into_bytes()
}

/* ─────────────────────────── fake classifier ──────────────────────── */

/// Replays one head per call; an all-zero batch (the startup probe) scores
/// zero for every class.
struct Scripted {
    classes: usize,
    heads: RefCell<VecDeque<Vec<f32>>>,
    fail: bool,
}

impl Scripted {
    fn new(classes: usize, heads: Vec<Vec<f32>>) -> Self {
        Self {
            classes,
            heads: RefCell::new(heads.into()),
            fail: false,
        }
    }
}

impl ActivationModel for Scripted {
    fn activations(&self, batch: &Tensor) -> Result<Vec<Tensor>, InferenceError> {
        let rows = batch.dims()[0];
        let energy = batch.abs()?.sum_all()?.to_scalar::<f32>()?;
        let head = if energy == 0.0 {
            vec![0.0; rows * self.classes]
        } else if self.fail {
            return Err(InferenceError::MissingOutput("dense_2/Softmax:0".into()));
        } else {
            self.heads
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| vec![0.0; rows * self.classes])
        };

        let hidden = Tensor::ones((rows, 16), DType::F32, &Device::Cpu)?;
        let head = Tensor::from_vec(head, (rows, self.classes), &Device::Cpu)?;
        Ok(vec![hidden, head])
    }
}

/* ───────────────────────────── helpers ────────────────────────────── */

type TestSession = Session<FrameReader<Sensor>, Vec<u8>>;

fn dog_cat() -> ClassLabels {
    ClassLabels::from_yaml("- dog\n- cat\n").unwrap()
}

fn session(payloads: Vec<Vec<u8>>, model: Scripted) -> TestSession {
    let sensor = Sensor {
        payloads: payloads.into(),
        ..Default::default()
    };
    Session::new(
        FrameReader::new(sensor),
        InferenceEngine::new(Box::new(model)),
        dog_cat(),
        Reporter::new(Vec::new()),
    )
    .unwrap()
    .with_period(Duration::ZERO)
}

fn output(s: &TestSession) -> String {
    String::from_utf8(s.reporter().get_ref().clone()).unwrap()
}

const DOG_HEAD: [f32; 6] = [0.8, 0.2, 0.7, 0.3, 0.6, 0.4];

/* ───────────────────────────── scenarios ──────────────────────────── */

#[test]
fn dog_vs_cat_first_cycle() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("class_labels.yaml");
    std::fs::write(&path, "0: dog\n1: cat\n")?;
    let labels = ClassLabels::load(&path)?;

    let mut s = Session::new(
        FrameReader::new(Sensor {
            payloads: vec![frame(0)].into(),
            ..Default::default()
        }),
        InferenceEngine::new(Box::new(Scripted::new(2, vec![DOG_HEAD.to_vec()]))),
        labels,
        Reporter::new(Vec::new()),
    )?;

    let CycleOutcome::Reported(p) = s.run_cycle()? else {
        panic!("cycle was skipped");
    };
    assert_eq!(p.winner, 0);
    assert_abs_diff_eq!(p.means[0], 210.0 / 9.0, epsilon = 1e-3);
    assert_abs_diff_eq!(p.means[1], 10.0, epsilon = 1e-3);

    assert_eq!(
        String::from_utf8(s.reporter().get_ref().clone())?,
        "\n<<< (0) this is dog (23.3%) >>>\ndog: 23.3%\ncat: 10.0%\n"
    );
    Ok(())
}

#[test]
fn malformed_line_skips_cycle_and_keeps_history() -> Result<()> {
    let mut bad = frame(1);
    bad[0] = b'x';

    let mut s = session(
        vec![frame(0), bad, frame(2)],
        Scripted::new(2, vec![DOG_HEAD.to_vec(), vec![0.1, 0.9, 0.1, 0.9, 0.1, 0.9]]),
    );

    s.run_cycle()?;
    let before = s.smoother().history().to_vec();

    let outcome = s.run_cycle()?;
    assert!(matches!(outcome, CycleOutcome::Skipped { .. }));
    assert_eq!(s.smoother().history(), &before[..]);
    assert_eq!(s.cycles_reported(), 1);

    // the next good frame continues from the preserved window
    let CycleOutcome::Reported(p) = s.run_cycle()? else {
        panic!("cycle was skipped");
    };
    assert_abs_diff_eq!(p.means[1], (90.0 + 270.0) / 9.0, epsilon = 1e-3);
    assert_eq!(p.winner, 1);
    assert!(output(&s).contains("<<< (1) this is cat (40.0%) >>>"));
    Ok(())
}

#[test]
fn fatal_policy_propagates_protocol_errors() {
    let mut s = session(vec![b"1,2,e\n".to_vec()], Scripted::new(2, vec![]))
        .with_policy(ErrorPolicy::Fatal);

    match s.run_cycle() {
        Err(MonitorError::Protocol(ProtocolError::FrameLength { expected, actual })) => {
            assert_eq!(expected, FRAME_LEN);
            assert_eq!(actual, 2);
        }
        other => panic!("expected a frame length error, got {other:?}"),
    }
    assert!(output(&s).is_empty());
}

#[test]
fn constant_frame_is_skipped_even_when_protocol_errors_are_fatal() -> Result<()> {
    let mut s = session(vec![constant_frame()], Scripted::new(2, vec![DOG_HEAD.to_vec()]))
        .with_policy(ErrorPolicy::Fatal);

    match s.run_cycle()? {
        CycleOutcome::Skipped { reason } => assert!(reason.contains("zero variance")),
        other => panic!("expected skip, got {other:?}"),
    }
    assert!(s.smoother().history().iter().flatten().all(|&v| v == 0.0));
    Ok(())
}

#[test]
fn inference_failure_is_fatal() {
    let mut model = Scripted::new(2, vec![]);
    model.fail = true;
    let mut s = session(vec![frame(0)], model);

    assert!(matches!(
        s.run_cycle(),
        Err(MonitorError::Inference(InferenceError::MissingOutput(_)))
    ));
}

#[test]
fn label_count_must_match_model_width() {
    let err = Session::new(
        FrameReader::new(Sensor::default()),
        InferenceEngine::new(Box::new(Scripted::new(3, vec![]))),
        dog_cat(),
        Reporter::new(Vec::<u8>::new()),
    )
    .err()
    .unwrap();

    assert!(matches!(
        err,
        MonitorError::Config(ConfigError::ClassCountMismatch {
            labels: 2,
            outputs: 3
        })
    ));
}

/* ───────────────────────────── run loop ───────────────────────────── */

#[test]
fn three_cycles_fill_the_window() -> Result<()> {
    let head = vec![0.5; 6];
    let mut s = session(
        vec![frame(0), frame(1), frame(2)],
        Scripted::new(2, vec![head.clone(), head.clone(), head]),
    )
    .with_max_cycles(Some(3));

    let (_tx, rx) = crossbeam_channel::bounded::<()>(1);
    assert_eq!(s.run(&rx)?, 3);

    let p = s.smoother().prediction();
    assert_abs_diff_eq!(p.means[0], 50.0, epsilon = 1e-3);
    assert_abs_diff_eq!(p.means[1], 50.0, epsilon = 1e-3);
    assert_eq!(p.winner, 0);
    assert!(output(&s).contains("<<< (2) this is dog (50.0%) >>>"));
    Ok(())
}

#[test]
fn skipped_ticks_count_toward_max_cycles() -> Result<()> {
    let mut s = session(
        vec![frame(0), b"garbage\n".to_vec(), frame(1)],
        Scripted::new(2, vec![DOG_HEAD.to_vec(), DOG_HEAD.to_vec()]),
    )
    .with_max_cycles(Some(3));

    let (_tx, rx) = crossbeam_channel::bounded::<()>(1);
    assert_eq!(s.run(&rx)?, 2);
    assert_eq!(s.source().connector().opened, 3);
    Ok(())
}

#[test]
fn cancellation_stops_before_the_next_read() -> Result<()> {
    let mut s = session(vec![frame(0)], Scripted::new(2, vec![DOG_HEAD.to_vec()]));

    let (tx, rx) = crossbeam_channel::bounded(1);
    tx.send(())?;
    assert_eq!(s.run(&rx)?, 0);
    assert_eq!(s.source().connector().opened, 0);
    Ok(())
}

#[test]
fn dropped_sender_also_stops_the_loop() -> Result<()> {
    let mut s = session(vec![frame(0)], Scripted::new(2, vec![]));

    let (tx, rx) = crossbeam_channel::bounded::<()>(1);
    drop(tx);
    assert_eq!(s.run(&rx)?, 0);
    Ok(())
}
