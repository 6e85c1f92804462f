//! Router builder for the Bookshelf HTTP server

use axum::{
    extract::Request,
    http::{HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Extension, Router,
};
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use uuid::{Timestamp, Uuid};

use bookshelf_kernel::{ContextError, ModuleRegistry, RequestTimeout};

use crate::error::AppError;
use crate::response::ApiResponse;

/// Extra time the whole-request timeout allows past the request deadline.
pub const TIMEOUT_BACKSTOP_GRACE: Duration = Duration::from_secs(1);

/// Builder for constructing the main HTTP router
///
/// Middleware switches are recorded and applied in [`RouterBuilder::build`],
/// after every route is known, so each layer wraps all routes and the fallback.
pub struct RouterBuilder {
    router: Router,
    tracing: bool,
    cors: bool,
    request_id: bool,
    timeout: Option<Duration>,
}

impl RouterBuilder {
    /// Create a new router builder
    pub fn new() -> Self {
        Self {
            router: Router::new(),
            tracing: false,
            cors: false,
            request_id: false,
            timeout: None,
        }
    }

    /// Add a route to the router
    pub fn route(mut self, path: &str, route: axum::routing::MethodRouter) -> Self {
        self.router = self.router.route(path, route);
        self
    }

    /// Mount a module's router under `/{module_name}`
    pub fn mount_module(mut self, module_name: &str, module_router: Router) -> Self {
        let path = format!("/{}", module_name);
        self.router = self.router.nest(&path, module_router);
        self
    }

    /// Add tracing middleware
    pub fn with_tracing(mut self) -> Self {
        self.tracing = true;
        self
    }

    /// Add CORS middleware
    pub fn with_cors(mut self) -> Self {
        self.cors = true;
        self
    }

    /// Add request ID middleware (generated when absent, echoed on the response)
    pub fn with_request_id(mut self) -> Self {
        self.request_id = true;
        self
    }

    /// Give every [`bookshelf_kernel::RequestContext`] a deadline of `timeout_ms`.
    ///
    /// A whole-request timeout fires [`TIMEOUT_BACKSTOP_GRACE`] later for
    /// handlers that never consult their context; both paths answer with the
    /// `"request deadline exceeded"` envelope.
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout = Some(Duration::from_millis(timeout_ms));
        self
    }

    /// Serve an OpenAPI document merged from all module fragments
    pub fn with_openapi(mut self, registry: &ModuleRegistry) -> Self {
        let openapi_spec = merged_openapi(registry);

        // Round-trip through utoipa so malformed fragments are caught at startup.
        let document = match serde_json::from_value::<utoipa::openapi::OpenApi>(
            openapi_spec.clone(),
        ) {
            Ok(openapi) => serde_json::to_value(&openapi).unwrap_or(openapi_spec),
            Err(err) => {
                tracing::warn!(error = %err, "module OpenAPI fragments failed validation; serving raw document");
                openapi_spec
            }
        };

        self.router = self.router.route(
            "/docs/openapi.json",
            get(move || async move { axum::Json(document.clone()) }),
        );

        self
    }

    /// Build the final router
    pub fn build(self) -> Router {
        let mut router = self.router.fallback(route_not_found);

        if let Some(timeout) = self.timeout {
            #[allow(deprecated)]
            let backstop = TimeoutLayer::new(timeout + TIMEOUT_BACKSTOP_GRACE);
            router = router
                .layer(Extension(RequestTimeout(timeout)))
                .layer(backstop)
                .layer(middleware::map_response(envelope_timeout));
        }

        if self.tracing {
            router = router.layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().include_headers(true))
                    .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                    .on_response(DefaultOnResponse::new().level(tracing::Level::INFO)),
            );
        }

        if self.cors {
            router = router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            );
        }

        if self.request_id {
            // Outermost, so the id exists before the trace span is opened.
            router = router
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7));
        }

        router
    }
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn merged_openapi(registry: &ModuleRegistry) -> serde_json::Value {
    let mut openapi_spec = serde_json::json!({
        "openapi": "3.1.0",
        "info": {
            "title": "Bookshelf API",
            "version": "1.0.0",
            "description": "Create, fetch and list books"
        },
        "paths": {},
        "components": {
            "schemas": {}
        }
    });

    openapi_spec["components"]["schemas"]["ApiResponse"] = serde_json::json!({
        "type": "object",
        "properties": {
            "status": {
                "type": "string",
                "description": "HTTP status phrase"
            },
            "status_code": {
                "type": "integer",
                "format": "int32",
                "minimum": 0
            },
            "message": {
                "type": "string"
            },
            "data": {
                "description": "Payload on success, null on error"
            }
        },
        "required": ["status", "status_code", "message", "data"]
    });

    openapi_spec["paths"]["/healthz"] = serde_json::json!({
        "get": {
            "summary": "Health check",
            "responses": {
                "200": {
                    "description": "OK",
                    "content": {
                        "text/plain": {
                            "schema": {
                                "type": "string"
                            }
                        }
                    }
                }
            }
        }
    });

    for module in registry.modules() {
        let Some(module_spec) = module.openapi() else {
            continue;
        };

        if let Some(paths) = module_spec.get("paths").and_then(|p| p.as_object()) {
            for (path, path_item) in paths {
                let prefixed_path = match path.as_str() {
                    "/" => format!("/{}", module.name()),
                    other => format!("/{}{}", module.name(), other),
                };
                openapi_spec["paths"][prefixed_path] = path_item.clone();
            }
        }

        if let Some(schemas) = module_spec
            .get("components")
            .and_then(|c| c.get("schemas"))
            .and_then(|s| s.as_object())
        {
            for (schema_name, schema_def) in schemas {
                openapi_spec["components"]["schemas"][schema_name] = schema_def.clone();
            }
        }
    }

    openapi_spec
}

async fn route_not_found() -> impl IntoResponse {
    ApiResponse::error(StatusCode::NOT_FOUND, "route not found")
}

/// The timeout layer answers with a bare 408; wrap it like any other deadline miss.
async fn envelope_timeout(response: Response) -> Response {
    if response.status() != StatusCode::REQUEST_TIMEOUT {
        return response;
    }
    AppError::from(ContextError::DeadlineExceeded).into_response()
}

/// Request ID generator producing time-ordered UUIDs
#[derive(Clone, Copy)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let timestamp = Timestamp::now(uuid::NoContext);
        let request_id = Uuid::new_v7(timestamp)
            .to_string()
            .parse::<HeaderValue>()
            .ok()?;
        Some(RequestId::new(request_id))
    }
}
