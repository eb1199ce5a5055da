use std::time::Duration;

use clap::Parser;
use cnc_loopback::{
    cli, codec::LinesCodec, config::Config, logging, simulator::Simulator, sink::BroadcastSink,
};
use color_eyre::Result;
use futures::{SinkExt, StreamExt};
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, error, info, warn, Level};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = cli::Cli::parse();

    if let Some(command) = cli.command {
        cli::handle_command(command)?;

        return Ok(());
    }

    let stdout_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    logging::init(stdout_level, cli.log_dir.map(|dir| (Level::DEBUG, dir))).await;

    let mut config = if let Some(config_path) = cli.config {
        debug!(?config_path, "Config from path");
        Config::new_from_path(config_path)?
    } else {
        debug!("Default config");
        Config::default()
    };

    if let Some(uri) = cli.uri {
        config.uri = uri;
    }
    if let Some(delay) = cli.delay {
        config.response_delay_ms = delay;
    }

    let sink = BroadcastSink::new(config.observer_capacity);
    let mut responses = sink.stream();
    let mut simulator = Simulator::new(config.to_settings()?, sink);

    let printer = tokio::spawn(async move {
        let mut stdout = FramedWrite::new(tokio::io::stdout(), LinesCodec::default());

        while let Some(response) = responses.next().await {
            match response {
                Ok(bytes) => {
                    if let Err(e) = stdout.send(bytes).await {
                        error!(?e, "Could not write to stdout");
                        break;
                    }
                }
                Err(e) => warn!(?e, "Fell behind, responses lost"),
            }
        }
    });

    simulator.open()?;

    let mut commands = FramedRead::new(tokio::io::stdin(), LinesCodec::default());
    let feed = async {
        while let Some(command) = commands.next().await {
            simulator.send(command?)?;
        }

        Ok::<_, color_eyre::Report>(())
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl-C, quitting")
        }
        result = feed => {
            result?;
            info!("End of input");
            tokio::time::sleep(Duration::from_millis(cli.linger)).await;
        }
    }

    simulator.close().await;

    // Dropping the simulator drops the sink, which ends the printer.
    drop(simulator);
    if tokio::time::timeout(Duration::from_secs(1), printer)
        .await
        .is_err()
    {
        warn!("Printer did not finish");
    }

    Ok(())
}
