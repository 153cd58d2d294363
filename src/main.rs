//! `labwire` binary: run a responder server or send a file as an initiator.

mod cli;

use std::{error::Error, net::SocketAddr, sync::Arc, time::Duration};

use clap::Parser;
use cli::{Cli, Command, LinkArgs, ListenArgs, SendArgs};
use labwire::{
    client::LinkClient,
    config::LinkConfig,
    router::{InMemoryOrderCatalog, LogSink, MessageRouter, MessageSchema},
    server::LinkServer,
    simulation::FaultInjector,
};
use tokio::io::AsyncReadExt;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Chance that a frame is corrupted in simulation mode.
const SIMULATION_PROBABILITY: f64 = 0.5;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match Cli::parse().command {
        Command::Listen(args) => listen(args).await,
        Command::Send(args) => send(args).await,
    }
}

fn link_config(args: &LinkArgs) -> LinkConfig {
    LinkConfig::default()
        .max_chunk_size(args.max_chunk_size)
        .ack_timeout(Duration::from_secs(args.ack_timeout_secs))
}

async fn listen(args: ListenArgs) -> Result<(), Box<dyn Error>> {
    if let Some(addr) = args.metrics_addr {
        install_metrics(addr)?;
    }
    let schema = Arc::new(MessageSchema::load(&args.schema).await?);
    let catalog = match &args.catalog {
        Some(path) => InMemoryOrderCatalog::load(path).await?,
        None => {
            warn!("no order catalog given; every query gets a synthesized order");
            InMemoryOrderCatalog::new()
        }
    };
    info!(entries = catalog.len(), "order catalog loaded");

    let router = MessageRouter::new(schema, Arc::new(catalog)).with_sink(Arc::new(LogSink));
    let mut server = LinkServer::new(router).link_config(link_config(&args.link));
    if let Some(workers) = args.workers {
        server = server.workers(workers);
    }
    let server = server.bind(SocketAddr::new(args.bind, args.port))?;
    info!(addr = ?server.local_addr(), "listening");
    server.run().await?;
    info!("server stopped");
    Ok(())
}

async fn send(args: SendArgs) -> Result<(), Box<dyn Error>> {
    let text = match &args.file {
        Some(path) => tokio::fs::read_to_string(path).await?,
        None => {
            let mut buf = String::new();
            tokio::io::stdin().read_to_string(&mut buf).await?;
            buf
        }
    };

    let config = link_config(&args.link);
    let mut client = LinkClient::connect((args.host.as_str(), args.port), config).await?;
    if args.simulate {
        warn!("simulation mode: frames will be corrupted at random");
        client = client.with_fault_injection(FaultInjector::new(SIMULATION_PROBABILITY));
    }

    let report = client.send(&text).await?;
    info!(
        lines = report.lines,
        frames = report.frames_sent,
        retransmissions = report.retransmissions,
        "file sent"
    );

    if args.await_reply {
        match client
            .receive_within(Duration::from_secs(args.reply_timeout_secs))
            .await?
        {
            Some(reply) => println!("{reply}"),
            None => warn!("peer closed the connection without replying"),
        }
    }
    Ok(())
}

#[cfg(feature = "metrics")]
fn install_metrics(addr: SocketAddr) -> Result<(), Box<dyn Error>> {
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    info!(%addr, "serving metrics");
    Ok(())
}

#[cfg(not(feature = "metrics"))]
fn install_metrics(addr: SocketAddr) -> Result<(), Box<dyn Error>> {
    warn!(%addr, "built without the `metrics` feature; not serving metrics");
    Ok(())
}
