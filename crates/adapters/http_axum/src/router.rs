//! Axum router assembly.

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Includes a [`TraceLayer`] that logs each HTTP request/response at the
/// `DEBUG` level using the `tracing` ecosystem.
pub fn build(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/refresh", get(crate::api::refresh))
        .route("/catalog", get(crate::api::catalog))
        .route("/status/{device_id}", get(crate::api::status))
        .route(
            "/control/{command_kind}/{device_id}",
            post(crate::api::control),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::net::{IpAddr, Ipv4Addr};
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use casahub_app::hub::{Hub, HubConfig};
    use casahub_app::ports::{CapabilityProvider, NativeHandle};
    use casahub_app::table::CapabilityTable;
    use casahub_domain::catalog::Description;
    use casahub_domain::command::Command;
    use casahub_domain::error::HubError;
    use casahub_domain::family::Family;

    /// One plug at a fixed address; `execute` echoes the command.
    struct StubPlugProvider;

    #[async_trait]
    impl CapabilityProvider for StubPlugProvider {
        fn family(&self) -> Family {
            Family::KasaPlug
        }

        async fn discover(
            &self,
            _broadcast: Ipv4Addr,
        ) -> Result<HashMap<IpAddr, NativeHandle>, HubError> {
            let ip = IpAddr::from([192, 0, 2, 10]);
            Ok(HashMap::from([(ip, Arc::new(ip) as NativeHandle)]))
        }

        async fn describe(&self, handle: &NativeHandle) -> Result<Description, HubError> {
            Ok(Description {
                name: Some("Stub Plug".to_string()),
                ip: *handle.downcast_ref::<IpAddr>().unwrap(),
                mac: None,
            })
        }

        async fn status(&self, _handle: &NativeHandle) -> Result<serde_json::Value, HubError> {
            Ok(serde_json::json!({"status": "OFF"}))
        }

        async fn execute(
            &self,
            _handle: &NativeHandle,
            command: &Command,
        ) -> Result<serde_json::Value, HubError> {
            Ok(serde_json::to_value(command).unwrap())
        }
    }

    fn app() -> (Router, Arc<Hub>) {
        let table = CapabilityTable::builder()
            .register(Arc::new(StubPlugProvider))
            .build(&[Family::KasaPlug])
            .unwrap();
        let hub = Arc::new(Hub::new(
            table,
            HubConfig {
                broadcast: Ipv4Addr::new(255, 255, 255, 255),
                call_timeout: Duration::from_secs(1),
            },
        ));
        (build(AppState::new(Arc::clone(&hub))), hub)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn should_return_ok_when_health_check_called() {
        let (app, _hub) = app();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn should_report_discovered_families_on_refresh() {
        let (app, _hub) = app();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/refresh")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["families"]["kasaplug"]["devices"], 1);
    }

    #[tokio::test]
    async fn should_serve_catalog_with_device_ids() {
        let (app, hub) = app();
        hub.refresh().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/catalog")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let entry = &json["kasaplug"][0];
        assert_eq!(entry["name"], "Stub Plug");
        assert_eq!(entry["id"].as_str().unwrap().len(), 14);
    }

    #[tokio::test]
    async fn should_return_reason_body_for_unknown_device_status() {
        let (app, _hub) = app();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/status/00000000000000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["reason"], "Device not found or not recognised.");
    }

    #[tokio::test]
    async fn should_treat_malformed_device_id_as_unknown() {
        let (app, _hub) = app();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/status/not-a-device-id")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn should_execute_control_command_with_valid_parameters() {
        let (app, hub) = app();
        hub.refresh().await;
        let id = hub.catalog()[&Family::KasaPlug][0].id;

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/control/switch/{id}"))
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"state": true}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["state"], true);
    }

    #[tokio::test]
    async fn should_reject_unknown_command_kind_with_bad_request() {
        let (app, hub) = app();
        hub.refresh().await;
        let id = hub.catalog()[&Family::KasaPlug][0].id;

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/control/teleport/{id}"))
                    .header("content-type", "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn should_reject_undeclared_kind_with_not_found() {
        let (app, hub) = app();
        hub.refresh().await;
        let id = hub.catalog()[&Family::KasaPlug][0].id;

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/control/colour/{id}"))
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"rgb": [1, 2, 3]}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn should_reject_missing_parameter_with_bad_request() {
        let (app, hub) = app();
        hub.refresh().await;
        let id = hub.catalog()[&Family::KasaPlug][0].id;

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/control/switch/{id}"))
                    .header("content-type", "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json["reason"].as_str().unwrap().contains("state"));
    }
}
