//! Development watch server.
//!
//! Dev loop: launch the style and bundle watchers, block until both
//! artifacts exist, then serve the output directory over HTTP with
//! single-page-application fallback routing. Ctrl+C unblocks the listener;
//! the watchers are torn down with the loop.

mod lifecycle;
mod path;
mod response;
mod watchers;

pub use path::{Resolved, resolve_path, route};

use crate::{
    config::{ProjectConfig, cfg},
    log, watch,
};
use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tiny_http::{Request, Server};

/// Run the dev loop until interrupted.
pub fn serve(config: &ProjectConfig) -> Result<()> {
    watchers::ensure_tools()?;

    // Watchers first; the server binds only once every artifact exists,
    // so no request is ever served from a half-built output directory.
    let mut style_watcher = watchers::launch_style_watcher(config)?;
    let mut bundle_watcher = watchers::launch_bundle_watcher(config)?;

    let interval = Duration::from_millis(config.serve.poll_interval_ms);
    let timeout = (config.serve.wait_timeout_secs > 0)
        .then(|| Duration::from_secs(config.serve.wait_timeout_secs));

    watch::await_artifact(&config.build.styles_out, &mut style_watcher, interval, timeout)?;
    watch::await_artifact(&config.build.bundle_out, &mut bundle_watcher, interval, timeout)?;

    let bound = bind_server(config)?;
    bound.run()?;

    // Watcher handles drop here, killing the background compilers
    log!("serve"; "shut down");
    Ok(())
}

/// Bound server ready to accept requests
pub struct BoundServer {
    server: Arc<Server>,
    addr: SocketAddr,
}

/// Bind the HTTP server without starting the request loop.
pub fn bind_server(config: &ProjectConfig) -> Result<BoundServer> {
    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);

    lifecycle::register_server_for_shutdown(Arc::clone(&server));
    log!("serve"; "http://{}", addr);

    Ok(BoundServer { server, addr })
}

impl BoundServer {
    /// Get the bound address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Start the request loop (blocking until the listener is unblocked).
    pub fn run(self) -> Result<()> {
        run_request_loop(&self.server);
        Ok(())
    }
}

fn run_request_loop(server: &Server) {
    // Use thread pool to handle requests concurrently
    // This prevents one slow download from blocking other requests
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(4)
        .build()
        .expect("failed to create thread pool");

    for request in server.incoming_requests() {
        pool.spawn(move || {
            let config = cfg();
            if let Err(e) = handle_request(request, &config) {
                log!("serve"; "request error: {e}");
            }
        });
    }
}

/// Handle a single HTTP request
fn handle_request(request: Request, config: &ProjectConfig) -> Result<()> {
    // Early exit if shutdown requested
    if crate::core::is_shutdown() {
        return response::respond_unavailable(request);
    }

    match route(request.url(), &config.build.output, &config.serve.fallback) {
        Resolved::File(file) => response::respond_file(request, &file),
        Resolved::Fallback(fallback) => response::respond_file(request, &fallback),
        Resolved::NotFound => response::respond_not_found(request),
    }
}
