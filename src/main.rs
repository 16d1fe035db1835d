use cadence::api;
use cadence::logger::*;
use cadence::server::*;
use cadence::settings::*;
use std::fs;
use std::sync::Arc;
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logger = Logger::new_bootstrap();

    let project_settings = parse_settings(cli.settings.as_deref())?;
    info!(?project_settings);
    let logger_config = LogConfig {
        filter: project_settings.log.filter.clone(),
    };
    logger.reload_from_config(&logger_config)?;

    let address: std::net::SocketAddr = project_settings.http.address.parse()?;

    let server = Arc::new(Server::try_new(&project_settings).await?);
    let routes = api::routes(server.clone());

    let shutdown = server.shutdown_signal(async {
        if let Err(e) = signal::ctrl_c().await {
            error!("could not listen for SIGINT: {}", e);
        }
    });

    match &project_settings.http.tls {
        Some(tls) => {
            for path in [&tls.cert_path, &tls.key_path] {
                if !fs::metadata(path)?.is_file() {
                    return Err(anyhow::anyhow!("TLS file is not a regular file: {:?}", path));
                }
            }
            let (bound, serving) = warp::serve(routes)
                .tls()
                .cert_path(tls.cert_path.clone())
                .key_path(tls.key_path.clone())
                .bind_with_graceful_shutdown(address, shutdown);
            info!(%bound, "listening with TLS");
            serving.await;
        }
        None => {
            let (bound, serving) = warp::serve(routes).try_bind_with_graceful_shutdown(address, shutdown)?;
            info!(%bound, "listening");
            serving.await;
        }
    }

    let shutdown_timeout = std::time::Duration::from_secs(10);
    match tokio::time::timeout(shutdown_timeout, server.shutdown()).await {
        Ok(_) => info!("server shutdown successfully"),
        Err(_) => error!("server shutdown timed out"),
    }

    Ok(())
}
