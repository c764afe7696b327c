use color_eyre::Report;
use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::TcpListener,
};
use tracing::{debug, info, info_span, trace, warn, Instrument, Level};

use super::Document;
use crate::courier::{Courier, CourierError};

pub async fn serve(host: &str, port: u16) -> Result<(), Report> {
    let listener = TcpListener::bind((host, port)).await?;
    info!(addr = %listener.local_addr()?, "listening");

    loop {
        let (stream, peer) = listener.accept().await?;
        info!(%peer, "accepted connection");

        tokio::spawn(
            async move {
                match handle_connection(stream).await {
                    Ok(()) => info!("connection closed"),
                    Err(e) => warn!(error = %e, "connection dropped"),
                }
            }
            .instrument(info_span!("connection", %peer)),
        );
    }
}

/// Serves one connection until the peer hangs up. Every connection gets its
/// own document, released when this returns.
pub async fn handle_connection<S>(stream: S) -> Result<(), CourierError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut courier = Courier::new(stream);
    let mut document = Document::new();

    while let Some(command) = courier.recv_command().await? {
        debug!(%command, "received");

        match document.apply(command) {
            Ok(Some(response)) => courier.send_response(&response).await?,
            Ok(None) => {}
            Err(e) => warn!(error = %e, "rejected command"),
        }

        // depth and leaf count walk the whole tree
        if tracing::enabled!(Level::TRACE) {
            let rope = document.rope();
            trace!(
                size = rope.len(),
                depth = rope.depth(),
                leaves = rope.leaf_count(),
                "document shape"
            );
        }
    }

    Ok(())
}
