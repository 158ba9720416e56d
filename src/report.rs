use crate::disk::MountInfo;
use crate::model::{CleanupRun, ReclaimOutcome, RunMode, RunPhase};
use crossterm::style::Stylize;
use humansize::{BINARY, format_size};
use std::fmt;

pub struct ReportFormatter {
    pub color: bool,
    pub mount: Option<MountInfo>,
}

/// One rendering of a run; `Display` does the actual writing.
struct Report<'a> {
    formatter: &'a ReportFormatter,
    run: &'a CleanupRun,
}

impl ReportFormatter {
    pub fn render(&self, run: &CleanupRun) -> String {
        Report {
            formatter: self,
            run,
        }
        .to_string()
    }

    fn real_line(&self, outcome: &ReclaimOutcome) -> String {
        let approx = if outcome.approximate { "~" } else { "" };
        let size = format_size(outcome.bytes_freed, BINARY);

        match (&outcome.error, outcome.attempted) {
            (Some(err), _) => format!(
                "{}: {} (freed {approx}{size}): {err}",
                outcome.target,
                self.tag("FAILED", false)
            ),
            (None, false) => format!("{}: {}", outcome.target, self.tag("not present", true)),
            (None, true) => format!(
                "{}: {} freed {approx}{size}",
                outcome.target,
                self.tag("ok", true)
            ),
        }
    }

    fn tag(&self, text: &str, good: bool) -> String {
        if !self.color {
            return text.to_string();
        }
        if good {
            text.green().to_string()
        } else {
            text.red().bold().to_string()
        }
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let run = self.run;
        let before = &run.snapshot_before;

        if let Some(mount) = &self.formatter.mount {
            writeln!(
                f,
                "Filesystem: {} ({})",
                mount.mount_point.display(),
                mount.file_system
            )?;
        }
        writeln!(
            f,
            "Current free space: {:.2}% ({} used of {}, threshold: {}%)",
            before.free_percent,
            format_size(before.used_bytes, BINARY),
            format_size(before.total_bytes, BINARY),
            run.threshold_percent
        )?;

        match run.phase {
            RunPhase::Skipped => {
                writeln!(
                    f,
                    "Free space is above the threshold of {}%. No cleanup needed.",
                    run.threshold_percent
                )?;
                if run.is_estimate() {
                    writeln!(f, "Dry-run: no cleanup actions would be taken.")?;
                }
                Ok(())
            }
            RunPhase::Cancelled => writeln!(f, "Cleanup canceled by user."),
            RunPhase::Summarized => self.summary(f),
        }
    }
}

impl Report<'_> {
    fn summary(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let run = self.run;
        if run.forced && run.snapshot_before.free_percent >= run.threshold_percent {
            writeln!(f, "Force flag used. Running cleanup regardless of free space.")?;
        }

        for outcome in &run.outcomes {
            match run.mode {
                RunMode::Simulate => writeln!(
                    f,
                    "[dry-run] {}: would free ~{}",
                    outcome.target,
                    format_size(outcome.bytes_freed, BINARY)
                )?,
                RunMode::Real => writeln!(f, "{}", self.formatter.real_line(outcome))?,
            }
        }

        writeln!(f)?;
        match run.mode {
            RunMode::Simulate => writeln!(
                f,
                "Estimated space that would be freed: ~{}",
                format_size(run.total_bytes, BINARY)
            )?,
            RunMode::Real => {
                let approx = if run.outcomes.iter().any(|o| o.approximate) {
                    "~"
                } else {
                    ""
                };
                writeln!(
                    f,
                    "Total space freed: {approx}{}",
                    format_size(run.total_bytes, BINARY)
                )?;
                if let Some(after) = &run.snapshot_after {
                    writeln!(
                        f,
                        "Free space before: {:.2}% -> after: {:.2}%",
                        run.snapshot_before.free_percent, after.free_percent
                    )?;
                }
                if run.total_bytes == 0 {
                    writeln!(
                        f,
                        "No space was freed (the system might have already been clean)."
                    )?;
                }
            }
        }

        let failures = run.failures().count();
        if failures > 0 {
            writeln!(f, "{failures} target(s) reported errors.")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DiskUsageSnapshot, TargetKind};
    use std::path::PathBuf;

    fn outcome(target: &str, bytes: u64, attempted: bool, error: Option<&str>) -> ReclaimOutcome {
        ReclaimOutcome {
            target: target.to_string(),
            kind: TargetKind::WholeDirectory,
            attempted,
            succeeded: error.is_none(),
            bytes_freed: bytes,
            approximate: false,
            error: error.map(str::to_string),
        }
    }

    fn run(phase: RunPhase, mode: RunMode, outcomes: Vec<ReclaimOutcome>) -> CleanupRun {
        let total_bytes = outcomes.iter().map(|o| o.bytes_freed).sum();
        CleanupRun {
            phase,
            mode,
            threshold_percent: 10.0,
            forced: false,
            snapshot_before: DiskUsageSnapshot::new(1000, 80),
            snapshot_after: matches!(mode, RunMode::Real).then(|| DiskUsageSnapshot::new(1000, 200)),
            outcomes,
            total_bytes,
        }
    }

    fn plain() -> ReportFormatter {
        ReportFormatter {
            color: false,
            mount: None,
        }
    }

    #[test]
    fn simulate_report_is_labelled_estimate() {
        let text = plain().render(&run(
            RunPhase::Summarized,
            RunMode::Simulate,
            vec![outcome("Trash files", 7_340_032, false, None)],
        ));
        assert!(text.contains("[dry-run] Trash files: would free ~7 MiB"));
        assert!(text.contains("Estimated space that would be freed: ~7 MiB"));
        assert!(!text.contains("Total space freed"));
    }

    #[test]
    fn real_report_lists_failures_by_target() {
        let text = plain().render(&run(
            RunPhase::Summarized,
            RunMode::Real,
            vec![
                outcome("Trash files", 1024, true, None),
                outcome("Chromium cache", 0, false, None),
                outcome("Firefox cache", 0, true, Some("permission denied: /f")),
            ],
        ));
        assert!(text.contains("Trash files: ok freed 1 KiB"));
        assert!(text.contains("Chromium cache: not present"));
        assert!(text.contains("Firefox cache: FAILED (freed 0 B): permission denied: /f"));
        assert!(text.contains("Total space freed: 1 KiB"));
        assert!(text.contains("Free space before: 8.00% -> after: 20.00%"));
        assert!(text.contains("1 target(s) reported errors."));
    }

    #[test]
    fn skipped_and_cancelled_runs_are_one_liners() {
        let text = plain().render(&run(RunPhase::Skipped, RunMode::Real, vec![]));
        assert!(text.contains("No cleanup needed."));

        let text = plain().render(&run(RunPhase::Cancelled, RunMode::Real, vec![]));
        assert!(text.contains("Cleanup canceled by user."));
    }

    #[test]
    fn forced_simulation_writes_every_section_in_order() {
        let mut forced = run(
            RunPhase::Summarized,
            RunMode::Simulate,
            vec![
                outcome("Trash files", 2048, false, None),
                outcome("APT packages", 1024, false, None),
            ],
        );
        forced.forced = true;
        forced.snapshot_before = DiskUsageSnapshot::new(1000, 500);

        let text = plain().render(&forced);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            [
                "Current free space: 50.00% (500 B used of 1000 B, threshold: 10%)",
                "Force flag used. Running cleanup regardless of free space.",
                "[dry-run] Trash files: would free ~2 KiB",
                "[dry-run] APT packages: would free ~1 KiB",
                "",
                "Estimated space that would be freed: ~3 KiB",
            ]
        );
    }

    #[test]
    fn header_names_the_filesystem() {
        let formatter = ReportFormatter {
            color: false,
            mount: Some(MountInfo {
                mount_point: PathBuf::from("/"),
                file_system: "ext4".to_string(),
            }),
        };
        let text = formatter.render(&run(RunPhase::Skipped, RunMode::Real, vec![]));
        assert!(text.starts_with("Filesystem: / (ext4)\n"));
        assert!(text.contains("Current free space: 8.00% (920 B used of 1000 B, threshold: 10%)"));
    }
}
