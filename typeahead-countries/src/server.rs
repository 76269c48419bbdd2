use crate::service;
use hyper::Request;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::future::Future;
use tokio::net::TcpListener;

/// Default bind address when `TYPEAHEAD_ADDR` is not set.
pub const DEFAULT_ADDR: &str = "127.0.0.1:3000";

/// Accept connections until `shutdown` resolves. One task per connection.
pub async fn serve(listener: TcpListener, shutdown: impl Future<Output = ()>) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!("Country endpoint listening on http://{}{}", addr, service::COUNTRIES_PATH);

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(conn) => conn,
                    Err(e) => {
                        // Transient (e.g. too many open files); keep serving.
                        tracing::warn!("Accept failed: {}", e);
                        continue;
                    }
                };

                tokio::spawn(async move {
                    let io = TokioIo::new(stream);
                    if let Err(e) = http1::Builder::new()
                        .serve_connection(io, service_fn(|req: Request<Incoming>| service::handle(req)))
                        .await
                    {
                        tracing::debug!("Connection from {} ended: {}", peer, e);
                    }
                });
            }
            () = &mut shutdown => {
                tracing::info!("Country endpoint shutting down");
                break;
            }
        }
    }

    Ok(())
}
