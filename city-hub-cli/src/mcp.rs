//! MCP server exposing the two city lookups as tools over stdio.

use std::{future::Future, sync::Arc};

use city_hub_core::{CityInfoService, UseCase};
use rmcp::{
    ErrorData, RoleServer,
    handler::server::ServerHandler,
    model::{
        CallToolRequestParam, CallToolResult, Content, Implementation, JsonObject,
        ListToolsResult, PaginatedRequestParam, ServerCapabilities, ServerInfo, Tool,
    },
    service::{RequestContext, serve_server},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CityArgs {
    #[schemars(description = "City name, e.g. \"New York\" or \"London\".")]
    pub city: String,
}

pub fn tool_name(use_case: UseCase) -> &'static str {
    match use_case {
        UseCase::Weather => "get_city_weather_info",
        UseCase::News => "get_city_news",
    }
}

fn tool_description(use_case: UseCase) -> &'static str {
    match use_case {
        UseCase::Weather => "Get current weather details for a city.",
        UseCase::News => "Get the latest news articles for a city.",
    }
}

#[derive(Debug, Clone)]
pub struct CityHubServer {
    service: Arc<CityInfoService>,
    input_schema: Arc<JsonObject>,
}

impl CityHubServer {
    pub fn new(service: CityInfoService) -> anyhow::Result<Self> {
        let schema = serde_json::to_value(schemars::schema_for!(CityArgs))?;
        let Value::Object(schema) = schema else {
            anyhow::bail!("tool input schema must be a JSON object");
        };

        Ok(Self { service: Arc::new(service), input_schema: Arc::new(schema) })
    }

    fn tools(&self) -> Vec<Tool> {
        UseCase::all()
            .iter()
            .map(|use_case| {
                Tool::new(tool_name(*use_case), tool_description(*use_case), self.input_schema.clone())
            })
            .collect()
    }
}

impl ServerHandler for CityHubServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "city-hub".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: Some("City Information Hub".to_string()),
                icons: None,
                website_url: None,
            },
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some("Weather and news web search results for a city.".to_string()),
            ..Default::default()
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListToolsResult, ErrorData>> + Send + '_ {
        let tools = self.tools();
        async move { Ok(ListToolsResult::with_all_items(tools)) }
    }

    fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<CallToolResult, ErrorData>> + Send + '_ {
        let service = self.service.clone();
        async move {
            let use_case = UseCase::all()
                .iter()
                .copied()
                .find(|u| request.name == tool_name(*u))
                .ok_or_else(|| {
                    ErrorData::invalid_params(format!("unknown tool '{}'", request.name), None)
                })?;

            let args: CityArgs =
                serde_json::from_value(Value::Object(request.arguments.unwrap_or_default()))
                    .map_err(|err| {
                        ErrorData::invalid_params(format!("invalid arguments: {err}"), None)
                    })?;

            tracing::info!(tool = tool_name(use_case), city = %args.city, "mcp tool call");

            // Error records are still tool output; the record carries the error.
            let record = service.lookup(use_case, &args.city).await;
            let json = serde_json::to_string_pretty(&record).map_err(|err| {
                ErrorData::internal_error(format!("failed to serialize record: {err}"), None)
            })?;

            Ok(CallToolResult::success(vec![Content::text(json)]))
        }
    }
}

/// Serve the tools on stdin/stdout until the client disconnects.
pub async fn serve_stdio(service: CityInfoService) -> anyhow::Result<()> {
    let server = CityHubServer::new(service)?;
    tracing::info!("serving MCP tools on stdio");

    let running = serve_server(server, rmcp::transport::stdio()).await?;
    running.waiting().await?;
    Ok(())
}
