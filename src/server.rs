use std::net::SocketAddr;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tracing::{debug, error, field, info, instrument};

use crate::codec::Reply;
use crate::commands::executable::Executable;
use crate::commands::Command;
use crate::config::Config;
use crate::connection::Connection;
use crate::frame::Limits;
use crate::store::Store;
use crate::Error;

pub async fn run(config: Config) -> Result<(), Error> {
    let _ = tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .try_init()
        .map_err(|e| debug!("Failed to initialize global tracing: {}", e));

    let listener = TcpListener::bind((config.bind, config.port)).await?;

    serve(listener, Store::new(), config.limits()).await
}

/// Accepts connections until accepting fails, handling each one on its own task.
pub async fn serve(listener: TcpListener, store: Store, limits: Limits) -> Result<(), Error> {
    info!("RESP server listening on {}", listener.local_addr()?);

    loop {
        let (socket, client_address) = listener.accept().await?;
        let store = store.clone();
        info!("Accepted connection from {:?}", client_address);

        tokio::spawn(async move {
            if let Err(e) = handle_connection(socket, client_address, store, limits).await {
                error!(%client_address, "Connection terminated: {}", e);
            }
        });
    }
}

/// Runs the request-reply loop for one client: decode a command, execute it against the store,
/// send the reply, repeat. Returns `Ok` when the client closes the stream between requests and an
/// error when a request can't be decoded or the stream fails.
#[instrument(name = "connection", skip(stream, store, limits), fields(connection_id))]
pub async fn handle_connection<S>(
    stream: S,
    client_address: SocketAddr,
    store: Store,
    limits: Limits,
) -> Result<(), Error>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut conn = Connection::with_limits(stream, limits);

    tracing::Span::current().record("connection_id", field::display(conn.id));

    while let Some(frame) = conn.read_frame().await? {
        debug!("Received frame from client: {}", frame);

        let reply = match Command::try_from(frame) {
            Ok(cmd) => cmd.exec(&store),
            Err(e) => Reply::from(e),
        };

        debug!("Sending reply to client: {:?}", reply);
        conn.write_reply(reply).await?;
    }

    info!("Connection closed");
    Ok(())
}
