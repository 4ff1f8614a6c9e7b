use crate::error::{Error, FailureKind};
use std::{collections::BTreeMap, time::Duration};
use tracing::{info, warn};

/// What happened to one step of one chain.
#[derive(Debug)]
pub struct StepOutcome {
    pub step: String,
    /// Offset of the step start from the beginning of the run.
    pub started_at: Duration,
    pub elapsed: Duration,
    pub status_code: Option<u16>,
    pub error: Option<Error>,
}

impl StepOutcome {
    pub fn new<S: Into<String>>(step: S, started_at: Duration) -> Self {
        Self {
            step: step.into(),
            started_at,
            elapsed: Duration::default(),
            status_code: None,
            error: None,
        }
    }

    pub fn failed(mut self, error: Error) -> Self {
        self.error = Some(error);
        self
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.error.as_ref().map(Error::kind)
    }
}

/// All steps executed by one virtual user, in execution order.
#[derive(Debug)]
pub struct UserReport {
    pub user: usize,
    pub steps: Vec<StepOutcome>,
}

impl UserReport {
    pub fn is_ok(&self) -> bool {
        self.steps.iter().all(StepOutcome::is_ok)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepStats {
    pub ok: usize,
    pub ko: usize,
    pub min: Duration,
    pub max: Duration,
    pub mean: Duration,
}

#[derive(Debug, Default)]
pub struct LoadReport {
    pub users: Vec<UserReport>,
    /// Virtual users whose task panicked or was cancelled.
    pub lost_users: usize,
    pub duration: Duration,
}

impl LoadReport {
    pub fn ok_count(&self) -> usize {
        self.outcomes().filter(|outcome| outcome.is_ok()).count()
    }

    pub fn ko_count(&self) -> usize {
        self.outcomes().filter(|outcome| !outcome.is_ok()).count()
    }

    pub fn is_ok(&self) -> bool {
        self.lost_users == 0 && self.ko_count() == 0
    }

    fn outcomes(&self) -> impl Iterator<Item = &StepOutcome> {
        self.users.iter().flat_map(|user| user.steps.iter())
    }

    /// Per-step request counts and response times; only requests that got a response are timed.
    pub fn step_stats(&self) -> BTreeMap<String, StepStats> {
        let mut stats: BTreeMap<String, (StepStats, Vec<Duration>)> = BTreeMap::new();

        for outcome in self.outcomes() {
            let (entry, timings) = stats.entry(outcome.step.clone()).or_default();
            if outcome.is_ok() {
                entry.ok += 1;
            } else {
                entry.ko += 1;
            }
            if outcome.status_code.is_some() {
                timings.push(outcome.elapsed);
            }
        }

        stats
            .into_iter()
            .map(|(step, (mut entry, timings))| {
                if !timings.is_empty() {
                    entry.min = timings.iter().min().copied().unwrap_or_default();
                    entry.max = timings.iter().max().copied().unwrap_or_default();
                    entry.mean = timings.iter().sum::<Duration>() / timings.len() as u32;
                }
                (step, entry)
            })
            .collect()
    }

    pub fn log_summary(&self) {
        info!(
            "Load run finished in {:.1}s: {} users, {} OK, {} KO",
            self.duration.as_secs_f64(),
            self.users.len(),
            self.ok_count(),
            self.ko_count()
        );

        for (step, stats) in self.step_stats() {
            info!(
                "  {:<16} ok={:<4} ko={:<4} min={}ms mean={}ms max={}ms",
                step,
                stats.ok,
                stats.ko,
                stats.min.as_millis(),
                stats.mean.as_millis(),
                stats.max.as_millis()
            );
        }

        if self.lost_users > 0 {
            warn!("{} virtual users did not finish", self.lost_users);
        }
    }
}

#[derive(Debug)]
pub struct CaseReport {
    pub name: String,
    pub outcome: StepOutcome,
}

#[derive(Debug, Default)]
pub struct SuiteReport {
    pub cases: Vec<CaseReport>,
}

impl SuiteReport {
    pub fn passed(&self) -> usize {
        self.cases.iter().filter(|case| case.outcome.is_ok()).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &CaseReport> {
        self.cases.iter().filter(|case| !case.outcome.is_ok())
    }

    pub fn is_ok(&self) -> bool {
        self.failed().next().is_none()
    }

    pub fn case(&self, name: &str) -> Option<&CaseReport> {
        self.cases.iter().find(|case| case.name == name)
    }

    pub fn log_summary(&self) {
        for case in &self.cases {
            match &case.outcome.error {
                None => info!("  PASS {}", case.name),
                Some(error) => warn!("  FAIL {} ({:?}): {}", case.name, error.kind(), error),
            }
        }

        info!(
            "Suite finished: {} passed, {} failed",
            self.passed(),
            self.failed().count()
        );
    }
}
