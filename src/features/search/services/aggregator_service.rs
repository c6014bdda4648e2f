use std::time::Duration;

use futures::stream::{self, StreamExt};

use crate::core::config::{AggregatorConfig, RegionEndpoint};
use crate::core::error::{AppError, Result};
use crate::features::regions::dtos::{RegionSearchResponse, SearchQuery, StationView};
use crate::features::search::dtos::AggregateSearchResponse;

/// Fans a search out to every region service and merges what comes back.
///
/// A service that times out, refuses the connection, answers with a non-2xx
/// status or an undecodable body contributes no results.
pub struct AggregatorService {
    client: reqwest::Client,
    endpoints: Vec<RegionEndpoint>,
    request_timeout: Duration,
}

impl AggregatorService {
    pub fn new(config: &AggregatorConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoints: config.endpoints.clone(),
            request_timeout: config.request_timeout,
        })
    }

    pub async fn search(&self, query: &SearchQuery) -> Result<AggregateSearchResponse> {
        // Reject a bad type here instead of getting an empty answer from every region
        query.station_type()?;

        if self.endpoints.is_empty() {
            return Ok(AggregateSearchResponse::success(Vec::new()));
        }

        let started = std::time::Instant::now();
        let pairs = query.to_pairs();

        let searches: Vec<_> = self
            .endpoints
            .iter()
            .map(|endpoint| {
                let pairs = &pairs;
                async move {
                    let result =
                        tokio::time::timeout(self.request_timeout, self.fetch(endpoint, pairs))
                            .await
                            .unwrap_or_else(|_| {
                                Err(format!(
                                    "timed out after {} ms",
                                    self.request_timeout.as_millis()
                                ))
                            });
                    (endpoint, result)
                }
            })
            .collect();

        let outcomes: Vec<(&RegionEndpoint, std::result::Result<Vec<StationView>, String>)> =
            stream::iter(searches)
                .buffer_unordered(self.endpoints.len())
                .collect()
                .await;

        let mut results = Vec::new();
        for (endpoint, outcome) in outcomes {
            match outcome {
                Ok(stations) => {
                    tracing::debug!("{} returned {} stations", endpoint.name, stations.len());
                    results.extend(stations);
                }
                Err(e) => {
                    tracing::warn!("Search on {} ({}) failed: {}", endpoint.name, endpoint.base_url, e);
                }
            }
        }

        tracing::info!(
            "Aggregated {} stations from {} services in {:?}",
            results.len(),
            self.endpoints.len(),
            started.elapsed()
        );

        Ok(AggregateSearchResponse::success(results))
    }

    async fn fetch(
        &self,
        endpoint: &RegionEndpoint,
        pairs: &[(&'static str, &str)],
    ) -> std::result::Result<Vec<StationView>, String> {
        let url = format!("{}/api/search/{}", endpoint.base_url, endpoint.name);

        let response = self
            .client
            .get(&url)
            .query(pairs)
            .send()
            .await
            .map_err(|e| format!("request failed: {}", e))?;

        if !response.status().is_success() {
            return Err(format!("status {}", response.status()));
        }

        response
            .json::<RegionSearchResponse>()
            .await
            .map(|body| body.results)
            .map_err(|e| format!("undecodable payload: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn station(name: &str, region: &str) -> serde_json::Value {
        json!({
            "nombre": name,
            "tipo": "fixed",
            "direccion": "",
            "localidad": "Vigo",
            "codigo_postal": "36210",
            "provincia": "Pontevedra",
            "horario": "Consultar web",
            "latitud": null,
            "longitud": null,
            "region": region
        })
    }

    fn config(endpoints: Vec<(&str, String)>) -> AggregatorConfig {
        AggregatorConfig {
            endpoints: endpoints
                .into_iter()
                .map(|(name, base_url)| RegionEndpoint {
                    name: name.to_string(),
                    base_url,
                })
                .collect(),
            request_timeout: Duration::from_secs(2),
        }
    }

    #[tokio::test]
    async fn test_merges_live_services_and_skips_failures() {
        let mut gal = mockito::Server::new_async().await;
        let gal_mock = gal
            .mock("GET", "/api/search/gal")
            .match_query(Matcher::UrlEncoded("localidad".into(), "vigo".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "status": "success",
                    "results": [station("Estación de Vigo", "gal"), station("Estación de Vigo 2", "gal")]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let mut cv = mockito::Server::new_async().await;
        let cv_mock = cv
            .mock("GET", "/api/search/cv")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let service = AggregatorService::new(&config(vec![
            ("gal", gal.url()),
            ("cv", cv.url()),
            ("cat", "http://127.0.0.1:1".to_string()),
        ]))
        .unwrap();

        let query = SearchQuery {
            localidad: Some("vigo".to_string()),
            ..Default::default()
        };
        let response = service.search(&query).await.unwrap();

        gal_mock.assert_async().await;
        cv_mock.assert_async().await;
        assert_eq!(response.status, "success");
        assert_eq!(response.total_results, 2);
        assert_eq!(response.results[1].name, "Estación de Vigo 2");
    }

    #[tokio::test]
    async fn test_undecodable_payload_contributes_nothing() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/search/cat")
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let service = AggregatorService::new(&config(vec![("cat", server.url())])).unwrap();
        let response = service.search(&SearchQuery::default()).await.unwrap();
        assert_eq!(response.total_results, 0);
        assert!(response.results.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_type_is_rejected_before_fan_out() {
        let service = AggregatorService::new(&config(vec![])).unwrap();
        let query = SearchQuery {
            tipo: Some("zeppelin".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            service.search(&query).await,
            Err(AppError::BadRequest(_))
        ));
    }

    /// Accepts connections and never answers
    async fn silent_listener() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut open = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                open.push(socket);
            }
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_timed_out_services_contribute_nothing() {
        let mut gal = mockito::Server::new_async().await;
        let _gal_mock = gal
            .mock("GET", "/api/search/gal")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"status": "success", "results": [station("ITV Lugo", "gal")]}).to_string())
            .create_async()
            .await;

        let mut config = config(vec![
            ("cat", silent_listener().await),
            ("gal", gal.url()),
            ("cv", silent_listener().await),
        ]);
        config.request_timeout = Duration::from_millis(300);
        let service = AggregatorService::new(&config).unwrap();

        let started = std::time::Instant::now();
        let response = service.search(&SearchQuery::default()).await.unwrap();
        let elapsed = started.elapsed();

        assert_eq!(response.total_results, 1);
        assert_eq!(response.results[0].name, "ITV Lugo");
        assert!(elapsed >= Duration::from_millis(300));
        // Services are queried concurrently, not one timeout after another
        assert!(elapsed < Duration::from_millis(800), "took {:?}", elapsed);
    }

    #[tokio::test]
    async fn test_single_timed_out_service_yields_empty_success() {
        let mut config = config(vec![("cat", silent_listener().await)]);
        config.request_timeout = Duration::from_millis(200);
        let service = AggregatorService::new(&config).unwrap();

        let response = service.search(&SearchQuery::default()).await.unwrap();
        assert_eq!(response.status, "success");
        assert_eq!(response.total_results, 0);
    }
}
