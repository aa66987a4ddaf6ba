//! Execution profile files and their freshness.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Which profile a file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileKind {
    /// Startup profile (`.startup`)
    Startup,
    /// Class usage profile (`.usg`)
    Usage,
    /// JIT/PGO profile (`.jprof`)
    Jit,
}

impl ProfileKind {
    pub fn extension(&self) -> &'static str {
        match self {
            ProfileKind::Startup => "startup",
            ProfileKind::Usage => "usg",
            ProfileKind::Jit => "jprof",
        }
    }
}

/// The three profile files of a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileArtifacts {
    pub startup: PathBuf,
    pub usage: PathBuf,
    pub jit: PathBuf,

    /// When the JIT profile was last collected by a local profiling run
    pub collected_at: Option<SystemTime>,
}

impl ProfileArtifacts {
    /// Profile paths `<dir>/<name>.startup`, `.usg` and `.jprof`.
    pub fn new(dir: &Path, name: &str) -> Self {
        let path = |kind: ProfileKind| dir.join(format!("{}.{}", name, kind.extension()));
        ProfileArtifacts {
            startup: path(ProfileKind::Startup),
            usage: path(ProfileKind::Usage),
            jit: path(ProfileKind::Jit),
            collected_at: None,
        }
    }

    /// All profiles with their kinds, in a fixed order.
    pub fn all(&self) -> [(ProfileKind, &Path); 3] {
        [
            (ProfileKind::Startup, self.startup.as_path()),
            (ProfileKind::Usage, self.usage.as_path()),
            (ProfileKind::Jit, self.jit.as_path()),
        ]
    }

    /// Path of the profile of the given kind.
    pub fn get(&self, kind: ProfileKind) -> &Path {
        match kind {
            ProfileKind::Startup => &self.startup,
            ProfileKind::Usage => &self.usage,
            ProfileKind::Jit => &self.jit,
        }
    }

    /// Record a successful local collection at `at`.
    pub fn mark_collected(&mut self, at: SystemTime) {
        self.collected_at = Some(at);
    }
}

/// Whole days from `profile` to `artifact`, truncated toward zero.
///
/// Negative when the profile is newer than the artifact.
pub fn age_in_days(profile: SystemTime, artifact: SystemTime) -> i64 {
    let seconds = match artifact.duration_since(profile) {
        Ok(d) => i64::try_from(d.as_secs()).unwrap_or(i64::MAX),
        Err(e) => -i64::try_from(e.duration().as_secs()).unwrap_or(i64::MAX),
    };
    seconds / SECONDS_PER_DAY
}

/// Whether a profile `age_days` old should be reported as outdated.
pub fn is_stale(age_days: i64, threshold_days: i64) -> bool {
    threshold_days > 0 && age_days >= threshold_days
}
