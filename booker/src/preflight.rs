use crate::{checks, error::Error, session::Session, step::Step, BookerConfiguration};
use tokio::time::Instant;
use tracing::info;

/// Checks that the API is up: restful-booker answers `GET /ping` with 201.
pub async fn ping(configuration: &BookerConfiguration) -> Result<(), Error> {
    configuration.validate()?;
    let client = configuration.http_client()?;
    let step = Step::get("Ping", "/ping").check(checks::status().is(201));

    let outcome = step
        .execute(
            client.as_ref(),
            configuration.base_url(),
            &mut Session::new(),
            Instant::now(),
        )
        .await;

    match outcome.error {
        Some(error) => Err(error),
        None => {
            info!(
                "{} is up ({}ms)",
                configuration.base_url(),
                outcome.elapsed.as_millis()
            );
            Ok(())
        }
    }
}
