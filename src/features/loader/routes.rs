use std::sync::Arc;

use axum::{routing::post, Router};

use crate::features::loader::handlers;
use crate::features::loader::services::LoadJobService;

/// Create routes for load jobs and uploads
pub fn routes(service: Arc<LoadJobService>) -> Router {
    Router::new()
        .route("/load", post(handlers::run_load))
        .route("/clear", post(handlers::clear))
        .route("/api/load", post(handlers::upload))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;
    use serde_json::{json, Value};

    use crate::core::config::{LoaderConfig, SourcesConfig};
    use crate::features::loader::services::StationLoader;
    use crate::features::regions::services::SourceReader;
    use crate::shared::test_helpers::MemoryStationStore;

    const GAL_CSV: &str = "NOME DA ESTACIÓN;CONCELLO;PROVINCIA;CÓDIGO POSTAL\n\
        ITV Vigo;Vigo;Pontevedra;36210\n\
        ITV Lugo;;Lugo;27003\n";

    fn server(dir: &std::path::Path) -> TestServer {
        let reader = Arc::new(SourceReader::new(SourcesConfig {
            cat_path: dir.join("ITV-CAT.xml"),
            gal_path: dir.join("Estacions_ITV.csv"),
            cv_path: dir.join("estaciones.json"),
            csv_delimiter: b';',
        }));
        let store = Arc::new(MemoryStationStore::new());
        let loader = Arc::new(StationLoader::new(store, LoaderConfig::default(), None));
        let service = Arc::new(LoadJobService::new(reader, loader, LoaderConfig::default()));
        TestServer::new(routes(service)).unwrap()
    }

    #[tokio::test]
    async fn test_load_endpoint_reports_per_source() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Estacions_ITV.csv"), GAL_CSV).unwrap();

        let response = server(dir.path())
            .post("/load")
            .json(&json!({ "sources": ["gal", "cat"] }))
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["results"]["gal"]["ok"], true);
        assert_eq!(body["results"]["gal"]["loaded"], 1);
        assert_eq!(body["results"]["cat"]["ok"], false);
    }

    #[tokio::test]
    async fn test_load_endpoint_rejects_unknown_source() {
        let dir = tempfile::tempdir().unwrap();
        let response = server(dir.path())
            .post("/load")
            .json(&json!({ "sources": ["madrid"] }))
            .await;
        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_upload_then_clear() {
        let dir = tempfile::tempdir().unwrap();
        let server = server(dir.path());

        let form = MultipartForm::new()
            .add_text("fuente", "GAL (Galicia)")
            .add_part(
                "archivo",
                Part::bytes(GAL_CSV.as_bytes().to_vec()).file_name("Estacions_ITV.csv"),
            );
        let response = server.post("/api/load").multipart(form).await;
        response.assert_status_ok();

        let report: Value = response.json();
        assert_eq!(report["status"], "success");
        assert_eq!(report["source"], "gal");
        assert_eq!(report["records_ok"], 1);
        assert_eq!(report["records_rejected"], 1);

        let cleared: Value = server.post("/clear").await.json();
        assert_eq!(cleared["cleared"], true);
        assert_eq!(cleared["deleted_docs"]["stations"], 1);
    }

    #[tokio::test]
    async fn test_upload_without_file_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let form = MultipartForm::new().add_text("fuente", "gal");
        let response = server(dir.path()).post("/api/load").multipart(form).await;
        response.assert_status_bad_request();
    }
}
