//! Report files for a finished simulation.
//!
//! Each policy run produces two files named after the policy:
//!
//! | File | Content |
//! |------|---------|
//! | `<policy>.log` | One line per task, averages, context switches |
//! | `<policy>.json` | WaveDrom document of the [`Timeline`] |

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::simulation::{SimulationReport, Timeline};

/// One WaveDrom signal row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    /// Row label.
    pub name: String,
    /// Wave string.
    pub wave: String,
}

/// WaveDrom header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Head {
    /// Label of the first tick.
    pub tick: i64,
}

/// WaveDrom timing-diagram document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveDrom {
    /// One row per task.
    pub signal: Vec<Signal>,
    /// Header.
    pub head: Head,
}

impl WaveDrom {
    /// Builds the document for `timeline`.
    pub fn from_timeline(timeline: &Timeline) -> Self {
        Self {
            signal: timeline
                .rows
                .iter()
                .map(|row| Signal {
                    name: row.name.clone(),
                    wave: row.wave(),
                })
                .collect(),
            head: Head { tick: -1 },
        }
    }
}

/// Renders the `.log` text of a report.
pub fn format_log(report: &SimulationReport) -> String {
    let mut lines: Vec<String> = report
        .tasks
        .iter()
        .map(|task| {
            let finish = task
                .finish_time
                .map_or_else(|| "-".to_string(), |f| f.to_string());
            format!(
                "Task {}: Arrived: {}, Finished: {}, Response: {}, Norm Response: {:.3}",
                task.name, task.arrive_time, finish, task.response_time, task.normalized_response
            )
        })
        .collect();
    lines.push(format!("Average Response Time: {:.3}", report.mean_response));
    lines.push(format!(
        "Average Norm Response Time: {:.3}",
        report.mean_normalized_response
    ));
    lines.push(format!("Number Context Switches: {}", report.context_switches));
    lines.push(format!("Number Idle Transitions: {}", report.idle_transitions));
    lines.push(format!("Makespan: {}", report.makespan));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Paths of the files written for one report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFiles {
    /// `<policy>.log`.
    pub log: PathBuf,
    /// `<policy>.json`.
    pub wavedrom: PathBuf,
}

/// Writes `<policy>.log` and `<policy>.json` into `dir`, creating it if
/// needed.
pub fn write_reports(report: &SimulationReport, dir: &Path) -> Result<ReportFiles> {
    fs::create_dir_all(dir)?;

    let log = dir.join(format!("{}.log", report.policy));
    fs::write(&log, format_log(report))?;

    let wavedrom = dir.join(format!("{}.json", report.policy));
    let document = WaveDrom::from_timeline(&Timeline::from_report(report));
    fs::write(&wavedrom, serde_json::to_string_pretty(&document)?)?;

    info!("Wrote {} and {}", log.display(), wavedrom.display());
    Ok(ReportFiles { log, wavedrom })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::TaskReport;

    fn sample() -> SimulationReport {
        SimulationReport {
            policy: "fcfs".to_string(),
            tasks: vec![
                TaskReport {
                    name: "00".to_string(),
                    priority: 0,
                    arrive_time: 0,
                    finish_time: Some(3),
                    run_time: 3,
                    response_time: 3,
                    normalized_response: 1.0,
                    intervals: vec![(0, 3)],
                },
                TaskReport {
                    name: "01".to_string(),
                    priority: 1,
                    arrive_time: 1,
                    finish_time: Some(5),
                    run_time: 2,
                    response_time: 4,
                    normalized_response: 2.0,
                    intervals: vec![(3, 5)],
                },
            ],
            mean_response: 3.5,
            mean_normalized_response: 1.5,
            context_switches: 1,
            idle_transitions: 2,
            makespan: 5,
        }
    }

    #[test]
    fn test_format_log() {
        let log = format_log(&sample());
        let lines: Vec<&str> = log.lines().collect();
        assert_eq!(
            lines[0],
            "Task 00: Arrived: 0, Finished: 3, Response: 3, Norm Response: 1.000"
        );
        assert_eq!(
            lines[1],
            "Task 01: Arrived: 1, Finished: 5, Response: 4, Norm Response: 2.000"
        );
        assert_eq!(lines[2], "Average Response Time: 3.500");
        assert_eq!(lines[4], "Number Context Switches: 1");
        assert_eq!(lines.last(), Some(&"Makespan: 5"));
        assert_eq!(lines.len(), 2 + 5);
        assert!(log.ends_with("Makespan: 5\n"));
    }

    #[test]
    fn test_wavedrom_document() {
        let timeline = Timeline::from_report(&sample());
        let document = WaveDrom::from_timeline(&timeline);
        let json = serde_json::to_value(&document).unwrap();
        assert_eq!(json["head"]["tick"], -1);
        assert_eq!(json["signal"][0]["name"], "00");
        assert_eq!(json["signal"][0]["wave"], "2..z..");
        assert_eq!(json["signal"][1]["wave"], "zx.2.z");
    }

    #[test]
    fn test_write_reports() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("reports");
        let files = write_reports(&sample(), &out).unwrap();

        assert_eq!(files.log, out.join("fcfs.log"));
        let log = fs::read_to_string(&files.log).unwrap();
        assert!(log.starts_with("Task 00:"));

        let json = fs::read_to_string(&files.wavedrom).unwrap();
        let document: WaveDrom = serde_json::from_str(&json).unwrap();
        assert_eq!(document.signal.len(), 2);
    }
}
