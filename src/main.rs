mod artifacts;
mod batch;
mod classifier;
mod config;
mod error;
mod features;
mod records;
mod scaler;
mod web;

use std::fs::File;
use std::io::BufReader;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use env_logger::{Builder, Env};
use log::{debug, error, info, LevelFilter};

use artifacts::Predictor;
use config::{Command, HeartArgs};
use error::ArtifactError;
use records::HeartRecord;

fn init_logging(verbose: u8) {
    let log_level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let env = Env::new().filter("HEART_LOG");
    Builder::new()
        .filter(Some("heart_risk"), log_level)
        .parse_env(env)
        .init();
}

fn load_predictor(cli: &HeartArgs) -> Result<Predictor, ArtifactError> {
    let paths = cli.artifact_paths();
    let start_time = Instant::now();
    match Predictor::load(&paths, &cli.label_column, cli.neighbors) {
        Ok(predictor) => {
            debug!("artifacts loaded in {:?}", start_time.elapsed());
            Ok(predictor)
        }
        Err(e) => {
            error!("{}", e);
            if let ArtifactError::Missing { .. } = e {
                eprintln!("{}", paths.missing_message());
            }
            Err(e)
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = HeartArgs::parse();
    init_logging(cli.verbose);
    debug!("Arguments {:#?}", cli);

    // nothing is served until all three artifacts are in memory
    let predictor = load_predictor(&cli)?;

    match cli.command {
        Command::Serve { host, port } => {
            let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
            web::serve(Arc::new(predictor), addr).await?;
        }
        Command::Predict(args) => {
            let record = HeartRecord::from(args);
            match predictor.predict(&record) {
                Ok(risk) => println!("{}", risk.message()),
                Err(e) => println!("An error occurred: {}", e),
            }
        }
        Command::Batch { input } => {
            let start_time = Instant::now();
            let file = File::open(&input)?;
            let stdout = std::io::stdout();
            let failed = batch::run(&predictor, BufReader::new(file), stdout.lock())?;
            info!(
                "batch {:?} done in {:?}, {} rows failed",
                input,
                start_time.elapsed(),
                failed
            );
        }
    }

    Ok(())
}
