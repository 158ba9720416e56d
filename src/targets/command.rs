use crate::disk::{DiskUsageMonitor, UsageSource};
use crate::error::ReclaimError;
use crate::model::{DiskUsageSnapshot, TargetKind};
use crate::targets::ReclaimTarget;
use crate::targets::utils::size_of;
use std::fmt;
use std::path::PathBuf;
use std::process::Command;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(ToString::to_string).collect(),
        }
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Space released by running external commands, e.g. package-manager cleanup.
///
/// There is no reliable way to size this up front, so `estimate` looks at a
/// known cache directory and `reclaim` measures the free-space delta of the
/// filesystem around the commands. Both figures are approximate.
pub struct ExternalCommandTarget<M: UsageSource = DiskUsageMonitor> {
    pub id: String,
    pub commands: Vec<CommandSpec>,
    pub estimate_path: Option<PathBuf>,
    pub measured_path: PathBuf,
    monitor: M,
}

impl ExternalCommandTarget {
    pub fn new(id: impl Into<String>, commands: Vec<CommandSpec>, measured_path: PathBuf) -> Self {
        Self::with_monitor(id, commands, measured_path, DiskUsageMonitor)
    }
}

impl<M: UsageSource> ExternalCommandTarget<M> {
    pub fn with_monitor(
        id: impl Into<String>,
        commands: Vec<CommandSpec>,
        measured_path: PathBuf,
        monitor: M,
    ) -> Self {
        Self {
            id: id.into(),
            commands,
            estimate_path: None,
            measured_path,
            monitor,
        }
    }

    #[must_use]
    pub fn estimated_from(mut self, path: PathBuf) -> Self {
        self.estimate_path = Some(path);
        self
    }

    fn usage(&self) -> Result<DiskUsageSnapshot, ReclaimError> {
        self.monitor
            .snapshot(&self.measured_path)
            .map_err(|e| ReclaimError::ExternalActionFailed {
                command: self.commands_label(),
                reason: e.to_string(),
                freed: 0,
            })
    }

    fn commands_label(&self) -> String {
        self.commands
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" && ")
    }
}

/// Free-space gain between two snapshots; concurrent writers can make the
/// raw delta negative, which counts as nothing freed.
pub const fn freed_between(before: &DiskUsageSnapshot, after: &DiskUsageSnapshot) -> u64 {
    after.free_bytes.saturating_sub(before.free_bytes)
}

fn run(spec: &CommandSpec) -> Result<(), String> {
    info!("running {spec}");
    match Command::new(&spec.program).args(&spec.args).status() {
        Ok(status) if status.success() => Ok(()),
        Ok(status) => Err(status.to_string()),
        Err(e) => Err(format!("could not start: {e}")),
    }
}

impl<M: UsageSource> ReclaimTarget for ExternalCommandTarget<M> {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> TargetKind {
        TargetKind::ExternalCommand
    }

    fn describe(&self) -> String {
        format!("{} (run `{}`)", self.id, self.commands_label())
    }

    fn estimate(&self) -> Result<u64, ReclaimError> {
        Ok(self.estimate_path.as_deref().map_or(0, size_of))
    }

    fn reclaim(&self) -> Result<u64, ReclaimError> {
        let before = self.usage()?;

        let mut first_failure: Option<(String, String)> = None;
        for spec in &self.commands {
            if let Err(reason) = run(spec) {
                warn!("`{spec}` failed: {reason}");
                first_failure.get_or_insert((spec.to_string(), reason));
            }
        }

        // A command failure outranks not being able to measure it.
        let after = match self.usage() {
            Ok(after) => after,
            Err(e) => {
                return Err(match first_failure {
                    Some((command, reason)) => ReclaimError::ExternalActionFailed {
                        command,
                        reason,
                        freed: 0,
                    },
                    None => e,
                });
            }
        };
        let freed = freed_between(&before, &after);
        debug!(
            "free bytes {} -> {}, crediting {freed}",
            before.free_bytes, after.free_bytes
        );

        match first_failure {
            None => Ok(freed),
            Some((command, reason)) => Err(ReclaimError::ExternalActionFailed {
                command,
                reason,
                freed,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CleanupError;
    use anyhow::Result;
    use std::cell::RefCell;
    use std::fs::File;
    use std::io::Write;
    use std::path::Path;
    use tempfile::tempdir;

    /// Hands out queued free-byte readings, one per snapshot; fails once
    /// the queue runs dry.
    struct ScriptedUsage(RefCell<Vec<u64>>);

    impl UsageSource for ScriptedUsage {
        fn snapshot(&self, path: &Path) -> Result<DiskUsageSnapshot, CleanupError> {
            let mut readings = self.0.borrow_mut();
            if readings.is_empty() {
                return Err(CleanupError::FatalConfig {
                    path: path.to_path_buf(),
                    source: std::io::Error::other("statvfs gone"),
                });
            }
            Ok(DiskUsageSnapshot::new(1_000_000, readings.remove(0)))
        }
    }

    fn scripted(commands: Vec<CommandSpec>, readings: Vec<u64>) -> ExternalCommandTarget<ScriptedUsage> {
        ExternalCommandTarget::with_monitor(
            "APT packages",
            commands,
            PathBuf::from("/"),
            ScriptedUsage(RefCell::new(readings)),
        )
    }

    #[test]
    fn freed_is_the_free_space_gain() -> Result<()> {
        let target = scripted(vec![CommandSpec::new("true", &[])], vec![1000, 4000]);
        assert_eq!(target.reclaim()?, 3000);
        Ok(())
    }

    #[test]
    fn freed_never_goes_negative() -> Result<()> {
        let target = scripted(vec![CommandSpec::new("true", &[])], vec![5000, 1000]);
        assert_eq!(target.reclaim()?, 0);

        let before = DiskUsageSnapshot::new(10_000, 900);
        let after = DiskUsageSnapshot::new(10_000, 100);
        assert_eq!(freed_between(&before, &after), 0);
        assert_eq!(freed_between(&after, &before), 800);
        Ok(())
    }

    #[test]
    fn failing_command_is_reported_but_later_commands_still_run() -> Result<()> {
        let dir = tempdir()?;
        let marker = dir.path().join("ran");
        let touch = CommandSpec {
            program: "touch".to_string(),
            args: vec![marker.display().to_string()],
        };
        let target = scripted(vec![CommandSpec::new("false", &[]), touch], vec![100, 600]);

        match target.reclaim() {
            Err(ReclaimError::ExternalActionFailed { command, freed, .. }) => {
                assert_eq!(command, "false");
                assert_eq!(freed, 500);
            }
            other => panic!("expected external failure, got {other:?}"),
        }
        assert!(marker.exists());
        Ok(())
    }

    #[test]
    fn command_failure_survives_a_failed_second_snapshot() {
        let target = scripted(vec![CommandSpec::new("false", &[])], vec![100]);

        match target.reclaim() {
            Err(ReclaimError::ExternalActionFailed {
                command, freed, ..
            }) => {
                assert_eq!(command, "false");
                assert_eq!(freed, 0);
            }
            other => panic!("expected the command failure, got {other:?}"),
        }
    }

    #[test]
    fn failed_second_snapshot_is_reported_when_commands_succeed() {
        let target = scripted(vec![CommandSpec::new("true", &[])], vec![100]);
        let err = target.reclaim().unwrap_err();
        assert!(err.to_string().contains("statvfs gone"));
    }

    #[test]
    fn missing_program_is_a_failure_not_a_panic() {
        let target = scripted(
            vec![CommandSpec::new("reclaimer-definitely-not-a-program", &[])],
            vec![100, 100],
        );
        let err = target.reclaim().unwrap_err();
        assert!(matches!(err, ReclaimError::ExternalActionFailed { .. }));
        assert!(err.to_string().contains("could not start"));
    }

    #[test]
    fn estimate_uses_cache_dir_when_known() -> Result<()> {
        let dir = tempdir()?;
        File::create(dir.path().join("pkg.deb"))?.write_all(&[0u8; 2048])?;

        let target = scripted(vec![CommandSpec::new("true", &[])], vec![]);
        assert_eq!(target.estimate()?, 0);

        let target = target.estimated_from(dir.path().to_path_buf());
        assert_eq!(target.estimate()?, 2048);
        Ok(())
    }

    #[test]
    fn real_monitor_reclaim_runs_against_tempdir() -> Result<()> {
        let dir = tempdir()?;
        let target = ExternalCommandTarget::new(
            "noop",
            vec![CommandSpec::new("true", &[])],
            dir.path().to_path_buf(),
        );
        // Concurrent activity can move the needle either way; only the sign is fixed.
        let _freed: u64 = target.reclaim()?;
        Ok(())
    }

    #[test]
    fn describe_lists_commands() {
        let target = scripted(
            vec![
                CommandSpec::new("apt-get", &["-y", "autoremove"]),
                CommandSpec::new("apt-get", &["clean"]),
            ],
            vec![],
        );
        assert_eq!(
            target.describe(),
            "APT packages (run `apt-get -y autoremove && apt-get clean`)"
        );
    }
}
