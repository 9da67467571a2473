use rmcp::transport::streamable_http_server::{
    session::local::LocalSessionManager, StreamableHttpService,
};

use super::McpServer;
use crate::actions::Actions;

/// Streamable HTTP transport for the tool server, to be mounted with
/// `Router::nest_service("/mcp", ..)`. Each session gets its own
/// [`McpServer`] sharing the same [`Actions`].
pub fn create_mcp_service(actions: Actions) -> StreamableHttpService<McpServer> {
    let service_factory =
        move || -> Result<McpServer, std::io::Error> { Ok(McpServer::new(actions.clone())) };

    StreamableHttpService::new(
        service_factory,
        LocalSessionManager::default().into(),
        Default::default(),
    )
}
