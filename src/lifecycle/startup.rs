//! Startup ordering.
//!
//! # Responsibilities
//! - Signal readiness once the listener is bound and routes are registered
//! - Let background tasks (load injector) wait for that signal
//! - Derive the loopback base URL from the bound address
//!
//! # Design Decisions
//! - Readiness is an explicit `watch` channel, not a fixed sleep
//! - Dropping the signal without firing releases waiters with `None`

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use tokio::sync::watch;

/// Fired by the server once it can accept requests.
#[derive(Debug)]
pub struct ReadySignal {
    tx: watch::Sender<Option<SocketAddr>>,
}

/// Awaits the [`ReadySignal`].
#[derive(Debug, Clone)]
pub struct ReadyWaiter {
    rx: watch::Receiver<Option<SocketAddr>>,
}

/// Create a connected signal/waiter pair.
pub fn readiness() -> (ReadySignal, ReadyWaiter) {
    let (tx, rx) = watch::channel(None);
    (ReadySignal { tx }, ReadyWaiter { rx })
}

impl ReadySignal {
    /// Announce that the service serves requests on `addr`.
    pub fn mark_ready(&self, addr: SocketAddr) {
        tracing::info!(address = %addr, "Service ready");
        self.tx.send_replace(Some(addr));
    }
}

impl ReadyWaiter {
    /// Wait for readiness. `None` if the signal was dropped before firing.
    pub async fn wait(mut self) -> Option<SocketAddr> {
        let addr = match self.rx.wait_for(Option::is_some).await {
            Ok(addr) => *addr,
            Err(_) => None,
        };
        addr
    }
}

/// Base URL for calling the service on itself.
pub fn base_url_for(addr: SocketAddr) -> String {
    let ip = match addr.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
        IpAddr::V6(ip) if ip.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
        ip => ip,
    };
    format!("http://{}", SocketAddr::new(ip, addr.port()))
}
