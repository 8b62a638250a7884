//! Earwig CLI Binary
//! Live acoustic event monitor over a serial mel-frame link

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use log::{error, info};

mod cli;
use cli::Cli;

use earwig::{
    ClassLabels, FrameReader, InferenceEngine, OnnxActivationModel, Reporter, SerialConnector,
    Session,
};

fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.resolve().context("Invalid configuration")?;
    info!(
        "port {} @ {} baud, model {:?}, labels {:?}, protocol errors: {}",
        config.port,
        config.baud_rate,
        config.model,
        config.labels,
        config.on_protocol_error
    );

    let labels = ClassLabels::load(&config.labels).context("Failed to load class labels")?;
    info!("{} classes: {:?}", labels.len(), labels.iter().collect::<Vec<_>>());

    let model = OnnxActivationModel::load(&config.model).context("Failed to load model")?;
    info!("model: {}", model.summary());

    let reader = FrameReader::new(SerialConnector::from_config(&config));
    let mut session = Session::new(
        reader,
        InferenceEngine::new(Box::new(model)),
        labels,
        Reporter::stdout(),
    )
    .context("Failed to start monitor")?
    .with_policy(config.on_protocol_error)
    .with_period(config.period())
    .with_max_cycles(config.max_cycles);

    // Set up shutdown signal
    let (cancel_tx, cancel_rx) = crossbeam_channel::bounded(1);
    ctrlc::set_handler(move || {
        let _ = cancel_tx.try_send(());
    })
    .context("Error setting Ctrl-C handler")?;

    info!("monitoring; press Ctrl+C to stop");
    match session.run(&cancel_rx) {
        Ok(reported) => {
            info!("stopped after {reported} reported cycles");
            Ok(())
        }
        Err(e) => {
            error!("monitor stopped: {e}");
            Err(e).context("Monitor failed")
        }
    }
}
