//! Job trace files.
//!
//! One job per line: `arrival duration priority`, separated by commas and/or
//! whitespace. Blank lines and `#` comments are skipped. Jobs are numbered
//! in file order starting at 0.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use rustc_hash::FxHashSet;

use super::job::JobSpec;
use crate::core::{Priority, Ticks};
use crate::error::SchedError;

pub fn load_trace(path: &Path) -> Result<Vec<JobSpec>, SchedError> {
    let file = File::open(path)?;
    parse_trace(BufReader::new(file))
}

pub fn parse_trace(reader: impl BufRead) -> Result<Vec<JobSpec>, SchedError> {
    let mut jobs = Vec::new();
    let mut arrivals = FxHashSet::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = index + 1;
        let content = line.split('#').next().unwrap_or("").trim();
        if content.is_empty() {
            continue;
        }

        let fields: Vec<&str> = content
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|f| !f.is_empty())
            .collect();
        let &[arrival, duration, priority] = fields.as_slice() else {
            return Err(SchedError::Trace {
                line: line_no,
                reason: format!("expected 3 fields, found {}", fields.len()),
            });
        };

        let parse_err = |name: &str, value: &str| SchedError::Trace {
            line: line_no,
            reason: format!("invalid {name} {value:?}"),
        };
        let arrival_time: Ticks = arrival
            .parse()
            .map_err(|_| parse_err("arrival time", arrival))?;
        let run_time: Ticks = duration
            .parse()
            .map_err(|_| parse_err("duration", duration))?;
        let priority: Priority = priority
            .parse()
            .map_err(|_| parse_err("priority", priority))?;

        if arrival_time.checked_add(run_time).is_none() {
            return Err(SchedError::Trace {
                line: line_no,
                reason: "arrival time plus duration overflows".to_string(),
            });
        }

        if !arrivals.insert(arrival_time) {
            return Err(SchedError::Trace {
                line: line_no,
                reason: format!("arrival time {arrival_time} already used"),
            });
        }

        jobs.push(JobSpec {
            id: jobs.len() as u64,
            arrival_time,
            run_time,
            priority,
        });
    }

    Ok(jobs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mixed_separators_and_comments() {
        let input = "# arrival, duration, priority\n0,8,1\n\n1 4 2  # short\n 5,\t2, 0\n";
        let jobs = parse_trace(input.as_bytes()).unwrap();
        assert_eq!(
            jobs,
            vec![
                JobSpec {
                    id: 0,
                    arrival_time: 0,
                    run_time: 8,
                    priority: 1,
                },
                JobSpec {
                    id: 1,
                    arrival_time: 1,
                    run_time: 4,
                    priority: 2,
                },
                JobSpec {
                    id: 2,
                    arrival_time: 5,
                    run_time: 2,
                    priority: 0,
                },
            ]
        );
    }

    #[test]
    fn wrong_field_count_reports_line() {
        let err = parse_trace("0,1,1\n2,3\n".as_bytes()).unwrap_err();
        assert!(matches!(err, SchedError::Trace { line: 2, .. }));
    }

    #[test]
    fn bad_number_reports_field() {
        let err = parse_trace("x,1,1\n".as_bytes()).unwrap_err();
        match err {
            SchedError::Trace { line, reason } => {
                assert_eq!(line, 1);
                assert!(reason.contains("arrival time"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn repeated_arrival_time_rejected() {
        let err = parse_trace("3,1,1\n3,2,2\n".as_bytes()).unwrap_err();
        assert!(matches!(err, SchedError::Trace { line: 2, .. }));
    }

    #[test]
    fn overflowing_completion_time_rejected() {
        let err = parse_trace("1 18446744073709551615 0\n".as_bytes()).unwrap_err();
        match err {
            SchedError::Trace { line, reason } => {
                assert_eq!(line, 1);
                assert!(reason.contains("overflows"));
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(parse_trace("0 18446744073709551615 0\n".as_bytes()).is_ok());
    }
}
