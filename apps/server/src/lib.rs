//! webmon process: configuration, scheduler task and the status dashboard

use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use logger::{LogOptions, init_tracing_with};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use webmon_service::{Config, HttpProber, Scheduler, SnapshotReader, SnapshotStore};

pub mod cli;
pub mod error;
pub mod render;
mod routes;

use cli::Args;
use error::AppError;

/// Register the dashboard routes and the read-only snapshot handle
pub fn configure_app(reader: SnapshotReader) -> impl Fn(&mut web::ServiceConfig) + Clone {
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(web::Data::new(reader.clone())).configure(routes::routes);
    }
}

/// Load the configuration and apply command-line overrides
pub fn load_config(args: &Args) -> Result<Config, AppError> {
    let mut config = Config::from_path(&args.config)?;

    if let Some(interval) = args.interval {
        config = config.with_interval(interval)?;
    }
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    Ok(config)
}

pub async fn run(args: Args) -> Result<(), AppError> {
    init_tracing_with(&LogOptions { log_file: args.log_file.clone(), ..LogOptions::default() })?;
    debug!(?args, "Parsed command line arguments");

    let config = load_config(&args).inspect_err(|e| error!("{e}"))?;
    debug!("{config}");

    let prober = Arc::new(HttpProber::new(config.timeout)?);
    let store = SnapshotStore::new();
    let reader = store.reader();
    let cancel = CancellationToken::new();
    let mut scheduler = Scheduler::from_config(&config, prober, store, cancel.clone());

    if args.once {
        scheduler.run_cycle().await;
        return Ok(());
    }

    let scheduler_task = tokio::spawn(scheduler.run());

    let result = run_server(config.server.socket_addr(), reader).await;

    // Server stopped (signal or bind failure): stop probing too
    cancel.cancel();
    if let Err(e) = scheduler_task.await {
        error!("Scheduler task failed: {e}");
    }

    result
}

async fn run_server(addr: SocketAddr, reader: SnapshotReader) -> Result<(), AppError> {
    let configure = configure_app(reader);

    let server = HttpServer::new(move || App::new().configure(configure.clone())).bind(addr)?;
    info!("Dashboard listening on http://{addr}");

    server.run().await?;
    Ok(())
}
