use color_eyre::eyre::WrapErr;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

use kaillera_relay::action_router::ActionRouter;
use kaillera_relay::config::{load_config, DEFAULT_CONFIG_PATH};
use kaillera_relay::connect_controller::ConnectController;
use kaillera_relay::fields;
use kaillera_relay::logger::{init_logger, LogFormat, LogLevel};
use kaillera_relay::model::server::Server;
use kaillera_relay::port_allocator::PortAllocator;
use kaillera_relay::v086_controller::V086Controller;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = load_config(&config_path);

    let format = config.tracing.format.parse().unwrap_or_else(|e| {
        eprintln!("{}, using compact", e);
        LogFormat::Compact
    });
    let level = config.tracing.level.parse().unwrap_or_else(|e| {
        eprintln!("{}, using info", e);
        LogLevel::Info
    });
    init_logger(format, level);

    info!(
        { fields::CONFIG_SOURCE } = %config_path,
        { fields::PORT } = config.connect.port,
        server_name = %config.server.server_name,
        max_users = config.server.max_users,
        tracing_format = config.tracing.format.as_str(),
        tracing_level = config.tracing.level.as_str(),
        "Server configuration loaded"
    );

    let router = Arc::new(ActionRouter::with_defaults().wrap_err("Failed to build action router")?);
    let server = Arc::new(Server::new(&config));
    let ports = PortAllocator::new(config.v086.port_range_start, config.port_pool_size());
    let v086 = Arc::new(V086Controller::new(&config, server, router, ports));

    let connect = ConnectController::bind(&config, v086.clone())
        .await
        .wrap_err_with(|| format!("Failed to bind connect port {}", config.connect.port))?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let connect = Arc::new(connect);
    let connect_task = tokio::spawn({
        let connect = connect.clone();
        async move { connect.run(shutdown_rx).await }
    });

    info!("Server ready to accept connections");

    tokio::signal::ctrl_c()
        .await
        .wrap_err("Failed to listen for ctrl-c")?;
    info!("Shutting down");

    shutdown_tx.send_replace(true);
    v086.stop().await;
    connect_task.await.wrap_err("Connect controller task failed")?;
    Ok(())
}
