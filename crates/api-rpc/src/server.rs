//! JSON-RPC Server
//!
//! Implements the JSON-RPC 2.0 server over TCP on localhost.

use crate::handler::RpcHandler;
use crate::types::{
    JobIdRequest, RegistryBackfillRequest, RegistryListRequest, RegistryRecentRequest,
    RegistrySearchRequest, ResumeRequest, StartRequest,
};
use brandscout_core::port::{EmailNotifier, IdProvider, JobIndex, JobStoreOpener, TimeProvider};
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::RpcModule;
use std::sync::Arc;
use tracing::info;

const DEFAULT_RPC_HOST: &str = "127.0.0.1";
const DEFAULT_RPC_PORT: u16 = 8177;

/// RPC Server Configuration
pub struct RpcServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        let port = std::env::var("BRANDSCOUT_RPC_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_RPC_PORT);
        Self {
            host: DEFAULT_RPC_HOST.to_string(),
            port,
        }
    }
}

/// RPC Server
pub struct RpcServer {
    config: RpcServerConfig,
    handler: Arc<RpcHandler>,
}

impl RpcServer {
    pub fn new(
        config: RpcServerConfig,
        job_store_opener: Arc<dyn JobStoreOpener>,
        job_index: Arc<dyn JobIndex>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
        email: Arc<dyn EmailNotifier>,
    ) -> Self {
        Self {
            config,
            handler: Arc::new(RpcHandler::new(
                job_store_opener,
                job_index,
                id_provider,
                time_provider,
                email,
            )),
        }
    }

    /// Start the JSON-RPC server.
    ///
    /// Binds to `127.0.0.1` only; the daemon is never exposed beyond localhost.
    pub async fn start(self) -> Result<ServerHandle, String> {
        let addr = format!("{}:{}", self.config.host, self.config.port);

        info!(host = %self.config.host, port = %self.config.port, "starting JSON-RPC server");

        let server = Server::builder()
            .build(&addr)
            .await
            .map_err(|e| format!("failed to build server on {}: {}", addr, e))?;

        let mut module = RpcModule::new(());

        let handler = self.handler.clone();
        module
            .register_async_method("search.start", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: StartRequest = params.parse()?;
                    handler.start(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("search.status", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: JobIdRequest = params.parse()?;
                    handler.status(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("search.results", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: JobIdRequest = params.parse()?;
                    handler.results(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("search.followup", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: JobIdRequest = params.parse()?;
                    handler.followup(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("search.resume", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: ResumeRequest = params.parse()?;
                    handler.resume(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("search.cancel", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: JobIdRequest = params.parse()?;
                    handler.cancel(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("search.stream", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: JobIdRequest = params.parse()?;
                    handler.stream(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("registry.search", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: RegistrySearchRequest = params.parse()?;
                    handler.registry_search(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("registry.list", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: RegistryListRequest = params.parse()?;
                    handler.registry_list(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("registry.recent", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: RegistryRecentRequest = params.parse()?;
                    handler.registry_recent(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("registry.backfill", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: RegistryBackfillRequest = params.parse()?;
                    handler.registry_backfill(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        info!("JSON-RPC server started successfully");

        let handle = server.start(module);
        Ok(handle)
    }
}
