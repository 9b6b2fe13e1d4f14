mod common;

use dffcheck::prelude::*;
use pretty_assertions::assert_eq;

use common::{config, run_traced};

#[test]
fn correct_register_matches_every_record() {
    let d = [1, 0, 1, 1, 0];
    let (report, sink) = run_traced(&config(5), Dff, Scripted::data(&d));

    assert_eq!(report.outcome, RunOutcome::Finished);
    assert!(report.passed());
    assert_eq!(report.stats.matched, 5);
    // sample i is the register's response to record i, so q follows d with no offset
    let observed_q: Vec<u8> = sink.records(Stage::Monitor).iter().map(|r| r.q).collect();
    assert_eq!(observed_q, d.to_vec());
    assert!(sink
        .verdicts()
        .iter()
        .all(|(_, _, verdict)| *verdict == Verdict::Match));
}

#[test]
fn reset_in_the_middle_of_the_stream_clears_q() {
    let script = Scripted::new(vec![(1, 0), (1, 1), (1, 0), (0, 1)]);
    let (report, sink) = run_traced(&config(4), Dff, script);

    assert!(report.passed());
    let observed_q: Vec<u8> = sink.records(Stage::Monitor).iter().map(|r| r.q).collect();
    assert_eq!(observed_q, vec![1, 0, 1, 0]);
}

#[test]
fn zero_records_finishes_without_verdicts() {
    let (report, sink) = run_traced(&config(0), Dff, RandomStimulus::seeded(1));

    assert_eq!(report.outcome, RunOutcome::Finished);
    assert!(sink.verdicts().is_empty());
    assert!(sink.records(Stage::Generator).is_empty());
    assert_eq!(report.stats.compared(), 0);
    assert!(report.passed());
    // reset ends at 45ns, the monitor's first sample finds nobody listening at 60ns
    assert_eq!(report.sim_time, 60.0);
}

#[test]
fn stuck_output_is_reported_but_run_completes() {
    let (report, sink) = run_traced(&config(4), StuckAt(0), Scripted::data(&[1, 0, 1, 0]));

    assert_eq!(report.outcome, RunOutcome::Finished);
    assert!(!report.passed());
    assert_eq!(report.stats.compared(), 4);
    assert_eq!(report.stats.errors, 2);
    let indices: Vec<usize> = report.stats.mismatches.iter().map(|c| c.index).collect();
    assert_eq!(indices, vec![0, 2]);
    assert_eq!(sink.verdicts().len(), 4);
    assert!(report.to_string().contains("mismatch"));
}

#[test]
fn ignored_reset_is_not_caught_by_the_verdict_rule() {
    // q == d is accepted whatever reset was, so a register without reset still passes
    let script = Scripted::new(vec![(1, 1), (0, 1), (1, 0)]);
    let (report, sink) = run_traced(&config(3), IgnoresReset, script);

    let observed_q: Vec<u8> = sink.records(Stage::Monitor).iter().map(|r| r.q).collect();
    assert_eq!(observed_q, vec![1, 0, 1]);
    assert!(report.passed());
}

#[test]
fn stages_preserve_record_order() {
    let (report, sink) = run_traced(&config(30), Dff, RandomStimulus::seeded(42));
    assert!(report.passed());

    let generated = sink.records(Stage::Generator);
    let driven = sink.records(Stage::Driver);
    let sampled = sink.records(Stage::Monitor);
    let verdicts = sink.verdicts();

    assert_eq!(generated.len(), 30);
    assert_eq!(driven, generated);
    let expected: Vec<Record> = verdicts.iter().map(|(e, _, _)| *e).collect();
    let observed: Vec<Record> = verdicts.iter().map(|(_, o, _)| *o).collect();
    assert_eq!(expected, generated);
    assert_eq!(observed, sampled);
}

#[test]
fn same_seed_same_verdicts() {
    let (_, a) = run_traced(&config(25), StuckAt(1), RandomStimulus::seeded(9));
    let (_, b) = run_traced(&config(25), StuckAt(1), RandomStimulus::seeded(9));
    assert_eq!(a.verdicts(), b.verdicts());
}

#[test]
fn each_stage_traces_on_its_own_schedule() {
    let (_, sink) = run_traced(&config(3), Dff, Scripted::data(&[1, 1, 0]));
    let times_ns = |stage: Stage| -> Vec<u64> {
        sink.events()
            .iter()
            .filter(|e| e.stage == stage && matches!(e.kind, TraceKind::Record(_)))
            .map(|e| e.time / 1_000)
            .collect()
    };
    assert_eq!(times_ns(Stage::Generator), vec![45, 45, 45]);
    assert_eq!(times_ns(Stage::Driver), vec![45, 55, 65]);
    assert_eq!(times_ns(Stage::Monitor), vec![60, 70, 80]);
}
