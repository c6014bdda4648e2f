use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::prelude::*;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestId, RequestId};
use tracing::Span;
use uuid::Uuid;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request ID generator using UUID v7 (time-ordered)
#[derive(Clone, Copy)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::now_v7().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Request span carrying the request id, so the loader's per-record logs can
/// be tied back to the `/load` or `/api/load` call that produced them
#[derive(Clone, Debug)]
pub struct MakeSpanWithRequestId;

impl<B> tower_http::trace::MakeSpan<B> for MakeSpanWithRequestId {
    fn make_span(&mut self, request: &axum::http::Request<B>) -> Span {
        let request_id = request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");

        tracing::info_span!(
            "request",
            method = %request.method(),
            path = %request.uri().path(),
            query = request.uri().query().unwrap_or(""),
            request_id = %request_id,
        )
    }
}

pub fn cors_layer(allowed_origins: Vec<String>) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if allowed_origins.iter().any(|o| o == "*") {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(origin) => Some(origin),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", o);
                None
            }
        })
        .collect();
    cors.allow_origin(AllowOrigin::list(origins))
}

/// `user:password` pair guarding the API docs
#[derive(Debug, Clone)]
pub struct DocsCredentials(pub String);

fn basic_credentials(request: &Request) -> Option<String> {
    let value = request.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let encoded = value.strip_prefix("Basic ")?;
    let decoded = BASE64_STANDARD.decode(encoded.trim()).ok()?;
    String::from_utf8(decoded).ok()
}

/// Basic auth guard for the Swagger UI and the OpenAPI document
pub async fn docs_basic_auth(
    State(credentials): State<Arc<DocsCredentials>>,
    request: Request,
    next: Next,
) -> Response {
    if basic_credentials(&request).is_some_and(|given| given == credentials.0) {
        return next.run(request).await;
    }

    tracing::debug!("Rejected unauthenticated docs request");
    (
        StatusCode::UNAUTHORIZED,
        [(
            header::WWW_AUTHENTICATE,
            HeaderValue::from_static("Basic realm=\"ITV Directory API docs\""),
        )],
        "Unauthorized",
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{middleware::from_fn_with_state, routing::get, Router};
    use axum_test::TestServer;

    fn guarded() -> TestServer {
        let credentials = Arc::new(DocsCredentials("docs:secret".to_string()));
        let app = Router::new()
            .route("/api-docs/openapi.json", get(|| async { "{}" }))
            .layer(from_fn_with_state(credentials, docs_basic_auth));
        TestServer::new(app).unwrap()
    }

    fn basic(pair: &str) -> HeaderValue {
        HeaderValue::from_str(&format!("Basic {}", BASE64_STANDARD.encode(pair))).unwrap()
    }

    #[tokio::test]
    async fn test_docs_require_matching_credentials() {
        let server = guarded();

        let anonymous = server.get("/api-docs/openapi.json").await;
        anonymous.assert_status(StatusCode::UNAUTHORIZED);
        assert!(anonymous
            .header(header::WWW_AUTHENTICATE)
            .to_str()
            .unwrap()
            .starts_with("Basic"));

        server
            .get("/api-docs/openapi.json")
            .add_header(header::AUTHORIZATION, basic("docs:wrong"))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        server
            .get("/api-docs/openapi.json")
            .add_header(header::AUTHORIZATION, basic("docs:secret"))
            .await
            .assert_status_ok();
    }

    #[test]
    fn test_request_ids_are_uuid_v7() {
        let request = axum::http::Request::new(());
        let id = MakeRequestUuid.make_request_id(&request).unwrap();
        let parsed = Uuid::parse_str(id.header_value().to_str().unwrap()).unwrap();
        assert_eq!(parsed.get_version_num(), 7);
    }
}
