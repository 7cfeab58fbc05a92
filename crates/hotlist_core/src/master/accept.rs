use std::{net::SocketAddr, sync::Arc};

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{Instrument, debug, error, info, instrument};

use crate::AppState;
use crate::worker::handle_request;

pub(crate) async fn bind_listener(listen_addr: &str) -> anyhow::Result<TcpListener> {
    info!(target: "hotlist::master", listen = %listen_addr, "Binding listener");

    match TcpListener::bind(listen_addr).await {
        Ok(listener) => {
            info!(target: "hotlist::master", listen = %listen_addr, "Bind() successful");
            Ok(listener)
        }
        Err(e) => {
            error!(
                target: "hotlist::master",
                listen = %listen_addr,
                error = ?e,
                "Failed to bind listener"
            );
            Err(e.into())
        }
    }
}

struct AcceptedConn {
    stream: TcpStream,
    addr: SocketAddr,
    permit: OwnedSemaphorePermit,
}

/// Waits for a permit first so a saturated server stops accepting instead of
/// piling up sockets.
async fn accept_with_permit(
    listener: &TcpListener,
    semaphore: &Arc<Semaphore>,
) -> anyhow::Result<AcceptedConn> {
    let permit = match semaphore.clone().acquire_owned().await {
        Ok(p) => p,
        Err(e) => {
            error!(target: "hotlist::master", error = ?e, "Failed to acquire connection permit");
            return Err(e.into());
        }
    };

    let (stream, addr) = match listener.accept().await {
        Ok(pair) => pair,
        Err(e) => {
            error!(target: "hotlist::master", error = ?e, "Failed to accept connection");
            return Err(e.into());
        }
    };

    debug!(
        target: "hotlist::master",
        client_addr = %addr,
        available_permits = semaphore.available_permits(),
        "Connection accepted"
    );

    Ok(AcceptedConn {
        stream,
        addr,
        permit,
    })
}

#[instrument(
    skip(listener, semaphore, state),
    fields(available_permits = semaphore.available_permits())
)]
pub(crate) async fn accept_loop(
    listener: TcpListener,
    semaphore: Arc<Semaphore>,
    state: Arc<AppState>,
) -> anyhow::Result<()> {
    info!(target: "hotlist::master", "accept_loop started for listening socket");

    loop {
        let AcceptedConn {
            stream,
            addr,
            permit,
        } = accept_with_permit(&listener, &semaphore).await?;

        let state = state.clone();
        let span = tracing::info_span!("connection", client_addr = %addr);
        tokio::spawn(
            async move {
                serve_connection(stream, addr, state).await;
                drop(permit);
                debug!(target: "hotlist::master", "Permit released after connection closed");
            }
            .instrument(span),
        );
    }
}

async fn serve_connection(stream: TcpStream, addr: SocketAddr, state: Arc<AppState>) {
    let io = TokioIo::new(stream);
    let service = service_fn(move |req| handle_request(req, addr, state.clone()));

    if let Err(e) = http1::Builder::new()
        .keep_alive(true)
        .serve_connection(io, service)
        .await
    {
        debug!(target: "hotlist::worker", client_addr = %addr, error = %e, "Connection closed with error");
    } else {
        debug!(target: "hotlist::worker", client_addr = %addr, "Connection closed");
    }
}
