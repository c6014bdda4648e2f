use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::search::handlers;
use crate::features::search::services::AggregatorService;

/// Create routes for the aggregate search
pub fn routes(service: Arc<AggregatorService>) -> Router {
    Router::new()
        .route("/api/search", get(handlers::search_all))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_test::TestServer;
    use mockito::Matcher;
    use serde_json::{json, Value};
    use std::time::Duration;

    use crate::core::config::{AggregatorConfig, RegionEndpoint};

    #[tokio::test]
    async fn test_search_forwards_filters_to_each_region() {
        let mut cat = mockito::Server::new_async().await;
        let cat_mock = cat
            .mock("GET", "/api/search/cat")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("provincia".into(), "girona".into()),
                Matcher::UrlEncoded("tipo".into(), "fija".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "status": "success",
                    "results": [{
                        "nombre": "Estación de Figueres",
                        "tipo": "fixed",
                        "direccion": "",
                        "localidad": "Figueres",
                        "codigo_postal": "17600",
                        "provincia": "Girona",
                        "horario": "Consultar web",
                        "latitud": 42.2667,
                        "longitud": 2.9608,
                        "region": "cat"
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let service = AggregatorService::new(&AggregatorConfig {
            endpoints: vec![RegionEndpoint {
                name: "cat".to_string(),
                base_url: cat.url(),
            }],
            request_timeout: Duration::from_secs(2),
        })
        .unwrap();
        let server = TestServer::new(routes(Arc::new(service))).unwrap();

        let response = server
            .get("/api/search")
            .add_query_param("provincia", "girona")
            .add_query_param("tipo", "fija")
            .await;
        response.assert_status_ok();

        cat_mock.assert_async().await;
        let body: Value = response.json();
        assert_eq!(body["status"], "success");
        assert_eq!(body["total_results"], 1);
        assert_eq!(body["results"][0]["localidad"], "Figueres");
    }

    #[tokio::test]
    async fn test_unknown_type_is_bad_request() {
        let service = AggregatorService::new(&AggregatorConfig {
            endpoints: Vec::new(),
            request_timeout: Duration::from_secs(1),
        })
        .unwrap();
        let server = TestServer::new(routes(Arc::new(service))).unwrap();

        let response = server.get("/api/search").add_query_param("tipo", "yate").await;
        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["success"], false);
    }
}
