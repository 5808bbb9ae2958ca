//! JSON-RPC Server
//!
//! Serves the download API over HTTP on localhost.

use crate::handler::RpcHandler;
use crate::types::{SetOutputDirRequest, StatusRequest, SubmitRequest};
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::RpcModule;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

pub const DEFAULT_RPC_HOST: &str = "127.0.0.1";
pub const DEFAULT_RPC_PORT: u16 = 9535;

/// RPC Server Configuration
#[derive(Debug, Clone)]
pub struct RpcServerConfig {
    pub host: String,
    /// 0 picks a free port
    pub port: u16,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPC_HOST.to_string(),
            port: DEFAULT_RPC_PORT,
        }
    }
}

/// A started server and the address it actually bound
pub struct RunningServer {
    pub handle: ServerHandle,
    pub local_addr: SocketAddr,
}

/// RPC Server
pub struct RpcServer {
    config: RpcServerConfig,
    handler: Arc<RpcHandler>,
}

impl RpcServer {
    pub fn new(config: RpcServerConfig, handler: RpcHandler) -> Self {
        Self {
            config,
            handler: Arc::new(handler),
        }
    }

    /// Build the method table
    pub fn into_module(self) -> Result<RpcModule<()>, String> {
        register_methods(self.handler)
    }

    /// Start the JSON-RPC server
    ///
    /// Security: intended to bind 127.0.0.1 only (no external access)
    pub async fn start(self) -> Result<RunningServer, String> {
        let addr = format!("{}:{}", self.config.host, self.config.port);

        let server = Server::builder()
            .build(&addr)
            .await
            .map_err(|e| format!("Failed to build server on {}: {}", addr, e))?;
        let local_addr = server
            .local_addr()
            .map_err(|e| format!("Failed to read bound address: {}", e))?;

        let module = register_methods(self.handler)?;
        let handle = server.start(module);

        info!(addr = %local_addr, "JSON-RPC server started");
        Ok(RunningServer { handle, local_addr })
    }
}

fn register_methods(handler: Arc<RpcHandler>) -> Result<RpcModule<()>, String> {
    let mut module = RpcModule::new(());

    let h = handler.clone();
    module
        .register_async_method("downloads.submit.v1", move |params, _, _| {
            let handler = h.clone();
            async move {
                let req: SubmitRequest = params.parse()?;
                handler.submit(req).await
            }
        })
        .map_err(|e| e.to_string())?;

    let h = handler.clone();
    module
        .register_async_method("downloads.status.v1", move |params, _, _| {
            let handler = h.clone();
            async move {
                let req: StatusRequest = params.parse()?;
                handler.status(req).await
            }
        })
        .map_err(|e| e.to_string())?;

    let h = handler.clone();
    module
        .register_async_method("downloads.list.v1", move |_, _, _| {
            let handler = h.clone();
            async move { handler.list().await }
        })
        .map_err(|e| e.to_string())?;

    let h = handler.clone();
    module
        .register_async_method("settings.output_dir.v1", move |_, _, _| {
            let handler = h.clone();
            async move { handler.output_dir().await }
        })
        .map_err(|e| e.to_string())?;

    let h = handler;
    module
        .register_async_method("settings.set_output_dir.v1", move |params, _, _| {
            let handler = h.clone();
            async move {
                let req: SetOutputDirRequest = params.parse()?;
                handler.set_output_dir(req).await
            }
        })
        .map_err(|e| e.to_string())?;

    Ok(module)
}
