//! End-to-end scheduling scenarios driven through the public event API.

use sched_model::core::{Job, SchedCore};
use sched_model::scheduler::{compare_pri, compare_psjf};
use sched_model::{SchedCoreEvent, Scheme};
use std::cmp::Ordering;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn fcfs_single_core_queues_later_arrivals() {
    let mut core = SchedCore::start(1, Scheme::Fcfs).unwrap();
    assert_eq!(core.job_arrived(0, 0, 5, 0).unwrap(), Some(0));
    assert_eq!(core.job_arrived(1, 1, 1, 0).unwrap(), None);
    assert_eq!(core.job_arrived(2, 2, 1, 0).unwrap(), None);

    assert_eq!(core.job_finished(0, 0, 5).unwrap(), Some(1));
    assert_eq!(core.job_finished(0, 1, 6).unwrap(), Some(2));
    assert_eq!(core.job_finished(0, 2, 7).unwrap(), None);

    // (0 + 4 + 4) / 3
    assert!(close(core.average_waiting_time().unwrap(), 8.0 / 3.0));
    // (5 + 5 + 5) / 3
    assert!(close(core.average_turnaround_time().unwrap(), 5.0));
    // (0 + 4 + 4) / 3
    assert!(close(core.average_response_time().unwrap(), 8.0 / 3.0));
}

#[test]
fn psjf_short_arrival_preempts_and_long_job_resumes() {
    let mut core = SchedCore::start(1, Scheme::Psjf).unwrap();
    assert_eq!(core.job_arrived(0, 0, 10, 0).unwrap(), Some(0));
    assert_eq!(core.job_arrived(1, 1, 2, 0).unwrap(), Some(0));

    let a = core.job(0).unwrap();
    assert_eq!(a.core_assigned, None);
    assert_eq!(a.time_run, 1);

    let events = core.drain_events();
    assert!(events.contains(&SchedCoreEvent::Preempted {
        job: 0,
        core: 0,
        by: 1
    }));

    assert_eq!(core.job_finished(0, 1, 3).unwrap(), Some(0));
    assert_eq!(core.job(0).unwrap().core_assigned, Some(0));
}

#[test]
fn sjf_does_not_preempt() {
    let mut core = SchedCore::start(1, Scheme::Sjf).unwrap();
    assert_eq!(core.job_arrived(0, 0, 10, 0).unwrap(), Some(0));
    assert_eq!(core.job_arrived(1, 1, 2, 0).unwrap(), None);
    assert_eq!(core.job_arrived(2, 2, 1, 0).unwrap(), None);
    // shortest waiting job goes next
    assert_eq!(core.job_finished(0, 0, 10).unwrap(), Some(2));
}

#[test]
fn ppri_preempts_only_strictly_lower_priority() {
    let mut core = SchedCore::start(2, Scheme::Ppri).unwrap();
    assert_eq!(core.job_arrived(0, 0, 10, 2).unwrap(), Some(0));
    assert_eq!(core.job_arrived(1, 1, 10, 4).unwrap(), Some(1));
    // equal to the best running job, better than the worst: takes core 1
    assert_eq!(core.job_arrived(2, 2, 10, 2).unwrap(), Some(1));
    // equal to everything running: waits
    assert_eq!(core.job_arrived(3, 3, 10, 2).unwrap(), None);
    assert_eq!(core.core_occupant(0), Some(0));
    assert_eq!(core.core_occupant(1), Some(2));
}

#[test]
fn pri_lower_number_runs_first_once_core_frees() {
    let mut core = SchedCore::start(1, Scheme::Pri).unwrap();
    core.job_arrived(0, 0, 3, 5).unwrap();
    core.job_arrived(1, 1, 3, 9).unwrap();
    core.job_arrived(2, 2, 3, 1).unwrap();
    assert_eq!(core.job_finished(0, 0, 3).unwrap(), Some(2));
    assert_eq!(core.job_finished(0, 2, 6).unwrap(), Some(1));
}

#[test]
fn equal_keys_break_ties_by_arrival() {
    let early = Job::new(0, 1, 5, 3);
    let late = Job::new(1, 4, 5, 3);
    assert_eq!(compare_pri(&early, &late), Ordering::Less);
    assert_eq!(compare_pri(&late, &early), Ordering::Greater);
    assert_eq!(compare_psjf(&early, &late), Ordering::Less);
    assert_eq!(compare_psjf(&late, &early), Ordering::Greater);
}

#[test]
fn single_job_run_statistics() {
    let mut core = SchedCore::start(1, Scheme::Fcfs).unwrap();
    assert_eq!(core.job_arrived(0, 0, 3, 0).unwrap(), Some(0));
    assert_eq!(core.job_finished(0, 0, 3).unwrap(), None);

    let stats = core.stats().unwrap();
    assert!(close(stats.average_waiting_time, 0.0));
    assert!(close(stats.average_turnaround_time, 3.0));
    assert!(close(stats.average_response_time, 0.0));
}

#[test]
fn idle_cores_fill_lowest_index_first() {
    let mut core = SchedCore::start(3, Scheme::Fcfs).unwrap();
    assert_eq!(core.job_arrived(0, 0, 4, 0).unwrap(), Some(0));
    assert_eq!(core.job_arrived(1, 1, 4, 0).unwrap(), Some(1));
    assert_eq!(core.job_finished(0, 0, 4).unwrap(), None);
    assert_eq!(core.job_arrived(2, 5, 4, 0).unwrap(), Some(0));
}

#[test]
fn round_robin_rotation_cycles_waiting_jobs() {
    let mut core = SchedCore::start(1, Scheme::Rr).unwrap();
    core.job_arrived(0, 0, 6, 0).unwrap();
    core.job_arrived(1, 1, 6, 0).unwrap();
    core.job_arrived(2, 2, 6, 0).unwrap();

    assert_eq!(core.quantum_expired(0, 2).unwrap(), Some(1));
    assert_eq!(core.quantum_expired(0, 4).unwrap(), Some(2));
    assert_eq!(core.quantum_expired(0, 6).unwrap(), Some(0));
    assert_eq!(core.queue_snapshot().to_string(), "0(0) 1(-1) 2(-1)");
}

#[test]
fn ppri_arrival_displaces_only_the_lowest_running_job() {
    let mut core = SchedCore::start(2, Scheme::Ppri).unwrap();
    assert_eq!(core.job_arrived(3, 0, 10, 3).unwrap(), Some(0));
    assert_eq!(core.job_arrived(5, 1, 10, 5).unwrap(), Some(1));
    core.drain_events();

    assert_eq!(core.job_arrived(1, 2, 10, 1).unwrap(), Some(1));
    assert_eq!(core.core_occupant(0), Some(3));
    assert_eq!(core.core_occupant(1), Some(1));
    assert_eq!(
        core.drain_events(),
        vec![
            SchedCoreEvent::Preempted {
                job: 5,
                core: 1,
                by: 1
            },
            SchedCoreEvent::Dispatched { job: 1, core: 1 },
        ]
    );
    assert_eq!(core.job(3).unwrap().time_run, 2);
}
