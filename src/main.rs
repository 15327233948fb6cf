//! Train the demo classifier and log the run to the configured tracking server.

use tracing::info;

use lr_tracking::config::Config;
use lr_tracking::pipeline::train_and_log;
use lr_tracking::tracking::{MlflowClient, Tracker};

fn main() -> anyhow::Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();
    lr_tracking::logging::init();

    let config = Config::from_env();
    info!(?config, "configuration resolved");

    let client = MlflowClient::new(&config.tracking_uri, Some(config.credentials()))?;
    let mut tracker = Tracker::new(client);
    tracker.set_experiment(&config.experiment_name)?;

    let mut stdout = std::io::stdout().lock();
    let summary = train_and_log(&mut tracker, &config, &mut stdout)?;
    info!(run_id = summary.run_id(), score = summary.score, "done");
    Ok(())
}
