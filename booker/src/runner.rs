use crate::{
    error::Error,
    report::{LoadReport, UserReport},
    scenario::Scenario,
    BookerConfiguration,
};
use futures::future::join_all;
use std::sync::Arc;
use tokio::{task::JoinHandle, time::Instant};
use tracing::{error, info};

/// Replays a scenario once per virtual user following the configured load profile.
#[derive(Debug)]
pub struct LoadRunner {
    configuration: BookerConfiguration,
}

impl LoadRunner {
    pub fn new(configuration: BookerConfiguration) -> Self {
        Self { configuration }
    }

    pub fn configuration(&self) -> &BookerConfiguration {
        &self.configuration
    }

    pub async fn run(&self, scenario: Scenario) -> Result<LoadReport, Error> {
        self.configuration.validate()?;

        let profile = self.configuration.load_profile();
        info!("USERS: {}", profile.users);
        info!("RAMPUP_DURATION: {}", profile.ramp_duration.as_secs());

        let client = self.configuration.http_client()?;
        let base_url: Arc<str> = Arc::from(self.configuration.base_url());
        let scenario = Arc::new(scenario);
        let origin = Instant::now();

        let start_times = profile
            .start_offsets()?
            .into_iter()
            .map(|offset| {
                origin.checked_add(offset).ok_or_else(|| {
                    Error::InvalidConfiguration(format!("start offset {:?} is out of range", offset))
                })
            })
            .collect::<Result<Vec<Instant>, Error>>()?;

        let handles: Vec<JoinHandle<UserReport>> = start_times
            .into_iter()
            .enumerate()
            .map(|(user, start)| {
                let client = client.clone();
                let base_url = base_url.clone();
                let scenario = scenario.clone();

                tokio::spawn(async move {
                    tokio::time::sleep_until(start).await;
                    info!("user {} starts {}", user, scenario.name());
                    scenario.execute(user, client.as_ref(), &base_url, origin).await
                })
            })
            .collect();

        let mut report = LoadReport::default();
        for joined in join_all(handles).await {
            match joined {
                Ok(user_report) => report.users.push(user_report),
                Err(e) => {
                    error!("virtual user task failed: {}", e);
                    report.lost_users += 1;
                }
            }
        }

        report.users.sort_by_key(|user_report| user_report.user);
        report.duration = origin.elapsed();

        Ok(report)
    }
}
