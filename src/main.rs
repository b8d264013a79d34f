use std::env;
use std::io;

use tokio_stream::wrappers::ReceiverStream;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;
use vend_eng::Engine;
use vend_eng::csv::{OutcomeWriter, read_catalog, read_script};
use vend_eng::operator::OperatorGate;
use vend_eng::session::Session;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse().unwrap()))
        .with_writer(std::io::stderr)
        .init();

    let mut args = env::args().skip(1);
    let script = args
        .next()
        .expect("usage: vend-eng <script.csv> [catalog.csv]");
    let catalog = args.next();

    if !script.ends_with(".csv") {
        warn!(path = script, "script file seems to not be a csv file");
    }

    let mut engine = Engine::new();

    if let Some(path) = catalog {
        match read_catalog(&path) {
            Ok(rows) => {
                for result in rows {
                    match result {
                        Ok(command) => {
                            if let Err(e) = engine.apply(command) {
                                warn!("catalog: {e}");
                            }
                        }
                        Err(e) => warn!("catalog: {e}"),
                    }
                }
            }
            Err(e) => {
                error!("{e}");
                std::process::exit(1);
            }
        }
    }

    let rows = match read_script(script) {
        Ok(rows) => rows,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    let (row_sender, row_receiver) = tokio::sync::mpsc::channel(16);

    tokio::spawn(async move {
        for result in rows {
            match result {
                Ok(row) => {
                    if row_sender.send(row).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("{e}");
                }
            }
        }
    });

    let stdout = io::stdout();
    let mut session = Session::new(
        engine,
        OperatorGate::from_env(),
        OutcomeWriter::new(stdout.lock()),
    );
    session.run(ReceiverStream::new(row_receiver)).await;

    if let Err(e) = session.finish() {
        error!("failed to flush outcomes: {e}");
        std::process::exit(1);
    }
}
