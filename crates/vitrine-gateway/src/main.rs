//! Vitrine gateway - one origin in front of the storefront and admin apps
//!
//! Every request is matched against an ordered route table. The first rule
//! whose mount claims the path wins; its optional rewrite is applied and the
//! request is forwarded to the rule's upstream with `Host` set to that
//! upstream. The table must end with a rule mounted at `/`.
//!
//! # Examples
//!
//! ```bash
//! # Built-in routes: /admin/** -> :3200 (prefix stripped), everything else -> :3000
//! vitrine-gateway
//!
//! # Custom routes and listen address
//! vitrine-gateway --config gateway.toml --listen 127.0.0.1:8080
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod proxy;

use config::GatewayConfig;
use proxy::{Gateway, Timeouts};

/// Vitrine gateway - path-based reverse proxy
#[derive(Parser, Debug)]
#[command(name = "vitrine-gateway")]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (defaults are used when it does not exist)
    #[arg(short, long, env = "VITRINE_GATEWAY_CONFIG", default_value = "gateway.toml")]
    config: String,

    /// Listen address, overriding the configuration file
    #[arg(long, env = "VITRINE_GATEWAY_LISTEN")]
    listen: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("vitrine_gateway=debug,info"))
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("vitrine_gateway=info,warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = GatewayConfig::load(&args.config)?;
    let routes = Arc::new(config.route_table()?);
    let timeouts = Timeouts {
        connect: config.timeouts.connect(),
        response: config.timeouts.response(),
    };
    let listen = args.listen.unwrap_or(config.listen);

    for rule in routes.rules() {
        info!(
            route = rule.name(),
            mount = %rule.mount(),
            rewrite = ?rule.rewrite().map(|r| format!("{} -> {}", r.from(), r.to())),
            upstream = %rule.upstream(),
            "route loaded"
        );
    }

    let gateway = Gateway::start(&listen, routes, timeouts)
        .await
        .with_context(|| format!("failed to listen on {listen}"))?;
    info!(listen_addr = %gateway.listen_addr(), "gateway listening");

    tokio::signal::ctrl_c()
        .await
        .context("failed to install Ctrl-C handler")?;
    info!("shutting down");
    gateway.shutdown().await;

    Ok(())
}
