use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::{info, Instrument};

use crate::config::Config;
use crate::http::connection::{Connection, ConnectionOptions};
use crate::resolve::Resolver;

/// Pause after a failed `accept`, e.g. while out of file descriptors.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

pub async fn run(cfg: &Config) -> anyhow::Result<()> {
    let resolver = cfg.build_resolver()?;
    let options = Arc::new(cfg.connection_options());

    let addr = cfg.listen_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);
    info!(
        "Inactive clients will be kicked after {} seconds",
        options.idle_timeout.as_secs()
    );

    serve(listener, resolver, options).await
}

/// Accepts connections forever, one task per connection.
pub async fn serve(
    listener: TcpListener,
    resolver: Arc<Resolver>,
    options: Arc<ConnectionOptions>,
) -> anyhow::Result<()> {
    loop {
        let (socket, peer) = match listener.accept().await {
            Ok(pair) => pair,
            Err(e) => {
                tracing::error!(error = %e, "failed to accept connection");
                tokio::time::sleep(ACCEPT_BACKOFF).await;
                continue;
            }
        };
        info!("Accepted connection from {}", peer);

        let resolver = Arc::clone(&resolver);
        let options = Arc::clone(&options);
        tokio::spawn(
            async move {
                let mut conn = Connection::new(socket, resolver, options);
                if let Err(e) = conn.run().await {
                    tracing::error!("Connection error from {}: {}", peer, e);
                }
                info!("Connection ended");
            }
            .instrument(tracing::info_span!("conn", %peer)),
        );
    }
}
