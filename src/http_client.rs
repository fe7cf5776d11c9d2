// Authenticated HTTP client for the café API
//
// Attaches the stored bearer token, refreshes it once per wave of 401
// responses and replays the affected requests with the new token.

use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde_json::Value;
use std::sync::Arc;

use crate::auth::{self, LoginResponse, RefreshCoordinator, Session, Ticket};
use crate::error::{ClientError, Result};
use crate::transport::{ApiRequest, ApiResponse, Transport};

/// HTTP client with bearer authentication and single-flight token refresh
pub struct CafeHttpClient {
    /// Network seam (reqwest in production, scripted in tests)
    transport: Arc<dyn Transport>,

    /// Credential storage
    session: Session,

    /// In-flight flag and queue for the current refresh wave
    refresh: RefreshCoordinator,
}

impl CafeHttpClient {
    /// Create a client; detached mode is implied by a non-persistent session
    pub fn new(transport: Arc<dyn Transport>, session: Session) -> Self {
        if !session.is_attached() {
            tracing::debug!("No persistent session store, running detached");
        }

        Self {
            transport,
            session,
            refresh: RefreshCoordinator::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Whether a token refresh is currently in flight
    pub fn is_refreshing(&self) -> bool {
        self.refresh.is_refreshing()
    }

    /// Requests parked behind the in-flight refresh
    pub fn queued_requests(&self) -> usize {
        self.refresh.queued()
    }

    /// Issue a request
    ///
    /// Non-401 responses are returned as-is whatever their status; the caller
    /// decides what an error status means.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        headers: Option<HeaderMap>,
    ) -> Result<ApiResponse> {
        let mut request = ApiRequest::new(method, path);
        request.body = body;
        if let Some(headers) = headers {
            request = request.with_headers(headers);
        }
        self.execute(request).await
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.execute(ApiRequest::get(path)).await
    }

    pub async fn post_json(&self, path: &str, body: Value) -> Result<ApiResponse> {
        self.execute(ApiRequest::post(path).json(body)).await
    }

    /// Execute a prepared request
    ///
    /// Handles:
    /// - bearer attachment from the session store
    /// - 401: one refresh per wave, then a single resend with the new token
    ///   (a 401 for a token that a finished refresh already replaced is
    ///   resent with the stored token instead)
    /// - 401 after the resend: surfaced as `Unauthorized { retryable: false }`
    pub async fn execute(&self, mut request: ApiRequest) -> Result<ApiResponse> {
        if !self.session.is_attached() {
            return self.send_detached(request).await;
        }

        if let Some(token) = self.session.access_token() {
            request.set_bearer(&token)?;
        }

        loop {
            let response = self.transport.send(request.clone()).await?;

            if response.status() != StatusCode::UNAUTHORIZED {
                return Ok(response);
            }

            if request.retried {
                tracing::warn!(
                    method = %request.method,
                    path = %request.path,
                    "Still unauthorized after token refresh"
                );
                return Err(unauthorized(&response, false));
            }

            tracing::debug!(
                method = %request.method,
                path = %request.path,
                "Received 401, refreshing token"
            );

            request.retried = true;
            let token = match self.superseding_token(&request) {
                Some(token) => token,
                None => self.fresh_access_token().await?,
            };
            request.set_bearer(&token)?;
        }
    }

    /// Token stored since the request was sent, if a refresh already
    /// replaced the one it carried
    fn superseding_token(&self, request: &ApiRequest) -> Option<String> {
        let current = self.session.access_token()?;
        if request.bearer() == Some(current.as_str()) {
            return None;
        }
        tracing::debug!(path = %request.path, "Token already refreshed, resending");
        Some(current)
    }

    /// Send without credentials or refresh handling
    async fn send_detached(&self, request: ApiRequest) -> Result<ApiResponse> {
        let response = self.transport.send(request).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(unauthorized(&response, true));
        }
        Ok(response)
    }

    /// Obtain a new access token, either by refreshing or by waiting on the
    /// refresh another request already started
    async fn fresh_access_token(&self) -> Result<String> {
        match self.refresh.join() {
            Ticket::Follower(rx) => match rx.await {
                Ok(outcome) => outcome,
                Err(_) => Err(auth::abandoned()),
            },
            Ticket::Leader(flight) => {
                let outcome = self.refresh_session().await;
                flight.settle(&outcome);
                outcome
            }
        }
    }

    /// Leader side of a refresh wave
    ///
    /// The session is updated (or cleared) before any queued request is
    /// released.
    async fn refresh_session(&self) -> Result<String> {
        let Some(refresh) = self.session.refresh_token() else {
            tracing::warn!("No refresh token stored, clearing session");
            self.session.clear();
            return Err(ClientError::SessionExpired(
                "no refresh token available".to_string(),
            ));
        };

        match auth::refresh_access_token(self.transport.as_ref(), &refresh).await {
            Ok(data) => {
                self.session
                    .set_tokens(Some(&data.access_token), data.refresh_token.as_deref());
                Ok(data.access_token)
            }
            Err(e) => {
                tracing::error!(error = %e, "Token refresh failed, clearing session");
                self.session.clear();
                Err(e)
            }
        }
    }

    /// Log in and store the issued credential pair
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse> {
        let data = auth::login(self.transport.as_ref(), username, password).await?;

        if !self.session.is_attached() {
            tracing::warn!("Session store is not persistent, tokens will not be kept");
        }
        self.session
            .set_tokens(Some(&data.tokens.access), Some(&data.tokens.refresh));

        tracing::info!(username = username, "Logged in");
        Ok(data)
    }

    /// Log out: tell the server (best effort) and clear local credentials
    ///
    /// The refresh token is read again after the call: a 401 on the logout
    /// request itself can rotate it, in which case the rotated token is
    /// revoked too. Returns whether the server acknowledged the last logout.
    pub async fn logout(&self) -> bool {
        let acknowledged = match self.session.refresh_token() {
            Some(refresh) => {
                let mut acknowledged = self.revoke(&refresh).await;
                if let Some(rotated) = self.session.refresh_token().filter(|t| *t != refresh) {
                    tracing::debug!("Refresh token rotated during logout, revoking it as well");
                    acknowledged = self.revoke(&rotated).await;
                }
                acknowledged
            }
            None => false,
        };

        self.session.clear();
        tracing::info!("Session cleared");
        acknowledged
    }

    async fn revoke(&self, refresh: &str) -> bool {
        match self.execute(auth::logout_request(refresh)).await {
            Ok(response) if response.is_success() => true,
            Ok(response) => {
                tracing::warn!(
                    status = %response.status(),
                    body = %response.error_message(),
                    "Server rejected logout"
                );
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "Logout request failed");
                false
            }
        }
    }
}

fn unauthorized(response: &ApiResponse, retryable: bool) -> ClientError {
    ClientError::Unauthorized {
        retryable,
        message: response.error_message(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::REFRESH_PATH;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    /// Scripted café API
    ///
    /// Resource paths accept only `accepted` as bearer token. The refresh
    /// endpoint issues `issued` (or rejects when `None`), optionally waiting
    /// on a gate so tests can pile up requests behind it.
    struct FakeApi {
        accepted: String,
        issued: Option<String>,
        rotated_refresh: Option<String>,
        refresh_calls: AtomicUsize,
        refresh_gate: Mutex<Option<oneshot::Receiver<()>>>,
        refresh_bodies: Mutex<Vec<Value>>,
        seen: Mutex<Vec<(String, Option<String>)>>,
        posted: Mutex<Vec<Value>>,
    }

    impl FakeApi {
        fn new(accepted: &str, issued: Option<&str>) -> Self {
            Self {
                accepted: accepted.to_string(),
                issued: issued.map(str::to_string),
                rotated_refresh: None,
                refresh_calls: AtomicUsize::new(0),
                refresh_gate: Mutex::new(None),
                refresh_bodies: Mutex::new(Vec::new()),
                seen: Mutex::new(Vec::new()),
                posted: Mutex::new(Vec::new()),
            }
        }

        fn with_gate(self, gate: oneshot::Receiver<()>) -> Self {
            *self.refresh_gate.lock().unwrap() = Some(gate);
            self
        }

        fn with_rotation(mut self, refresh: &str) -> Self {
            self.rotated_refresh = Some(refresh.to_string());
            self
        }

        fn refresh_calls(&self) -> usize {
            self.refresh_calls.load(Ordering::SeqCst)
        }

        fn seen(&self) -> Vec<(String, Option<String>)> {
            self.seen.lock().unwrap().clone()
        }

        fn replayed_with(&self, token: &str) -> Vec<String> {
            self.seen()
                .into_iter()
                .filter(|(_, bearer)| bearer.as_deref() == Some(token))
                .map(|(path, _)| path)
                .collect()
        }
    }

    #[async_trait]
    impl Transport for FakeApi {
        async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
            if request.path == REFRESH_PATH {
                self.refresh_calls.fetch_add(1, Ordering::SeqCst);
                self.refresh_bodies
                    .lock()
                    .unwrap()
                    .push(request.body.clone().unwrap_or(Value::Null));

                let gate = self.refresh_gate.lock().unwrap().take();
                if let Some(gate) = gate {
                    let _ = gate.await;
                }

                return Ok(match &self.issued {
                    Some(token) => {
                        let mut body = json!({ "access": token });
                        if let Some(ref refresh) = self.rotated_refresh {
                            body["refresh"] = json!(refresh);
                        }
                        ApiResponse::json_body(StatusCode::OK, &body)
                    }
                    None => ApiResponse::json_body(
                        StatusCode::UNAUTHORIZED,
                        &json!({"detail": "Token is invalid or expired", "code": "token_not_valid"}),
                    ),
                });
            }

            let bearer = request.bearer().map(str::to_string);
            self.seen
                .lock()
                .unwrap()
                .push((request.path.clone(), bearer.clone()));
            if let Some(ref body) = request.body {
                self.posted.lock().unwrap().push(body.clone());
            }

            if bearer.as_deref() == Some(self.accepted.as_str()) {
                Ok(ApiResponse::json_body(
                    StatusCode::OK,
                    &json!({ "path": request.path }),
                ))
            } else {
                Ok(ApiResponse::json_body(
                    StatusCode::UNAUTHORIZED,
                    &json!({"detail": "Given token not valid for any token type"}),
                ))
            }
        }
    }

    /// Always answers with the same status
    struct FixedStatus {
        status: StatusCode,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Transport for FixedStatus {
        async fn send(&self, _request: ApiRequest) -> Result<ApiResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ApiResponse::json_body(
                self.status,
                &json!({"detail": "fixed"}),
            ))
        }
    }

    /// Never reaches the server
    struct Unreachable {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Transport for Unreachable {
        async fn send(&self, _request: ApiRequest) -> Result<ApiResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(ClientError::Network(
                "connection refused (kind: connection_failed)".to_string(),
            ))
        }
    }

    fn client_with(
        transport: Arc<dyn Transport>,
        access: Option<&str>,
        refresh: Option<&str>,
    ) -> CafeHttpClient {
        let session = Session::in_memory();
        session.set_tokens(access, refresh);
        CafeHttpClient::new(transport, session)
    }

    async fn wait_for_queue(client: &CafeHttpClient, expected: usize) {
        for _ in 0..1000 {
            if client.queued_requests() >= expected {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("requests never queued behind the refresh");
    }

    #[tokio::test]
    async fn test_attaches_stored_token() {
        let api = Arc::new(FakeApi::new("A1", Some("A2")));
        let client = client_with(api.clone(), Some("A1"), Some("R1"));

        let response = client.get("/api/students/").await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            api.seen(),
            vec![("/api/students/".to_string(), Some("A1".to_string()))]
        );
        assert_eq!(api.refresh_calls(), 0);
    }

    #[tokio::test]
    async fn test_single_401_refreshes_once_and_retries() {
        let api = Arc::new(FakeApi::new("A2", Some("A2")));
        let client = client_with(api.clone(), Some("A1"), Some("R1"));

        let response = client.get("/x").await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        assert_eq!(api.refresh_calls(), 1);
        assert_eq!(
            api.refresh_bodies.lock().unwrap().clone(),
            vec![json!({"refresh": "R1"})]
        );
        assert_eq!(
            api.seen(),
            vec![
                ("/x".to_string(), Some("A1".to_string())),
                ("/x".to_string(), Some("A2".to_string())),
            ]
        );

        // Refresh token is kept when the server does not rotate it
        assert_eq!(client.session().access_token().as_deref(), Some("A2"));
        assert_eq!(client.session().refresh_token().as_deref(), Some("R1"));
        assert!(!client.is_refreshing());
    }

    #[tokio::test]
    async fn test_rotated_refresh_token_is_stored() {
        let api = Arc::new(FakeApi::new("A2", Some("A2")).with_rotation("R2"));
        let client = client_with(api.clone(), Some("A1"), Some("R1"));

        client.get("/x").await.unwrap();
        assert_eq!(client.session().refresh_token().as_deref(), Some("R2"));
    }

    #[tokio::test]
    async fn test_concurrent_401s_share_one_refresh() {
        let (release, gate) = oneshot::channel();
        let api = Arc::new(FakeApi::new("A2", Some("A2")).with_gate(gate));
        let client = Arc::new(client_with(api.clone(), Some("A1"), Some("R1")));

        let handles: Vec<_> = ["/x", "/y", "/z"]
            .into_iter()
            .map(|path| {
                let client = client.clone();
                tokio::spawn(async move { client.get(path).await })
            })
            .collect();

        wait_for_queue(&client, 2).await;
        assert!(client.is_refreshing());
        assert_eq!(api.refresh_calls(), 1);

        // Nothing is replayed while the refresh is outstanding
        assert!(api.replayed_with("A2").is_empty());

        release.send(()).unwrap();

        for handle in handles {
            let response = handle.await.unwrap().unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        assert_eq!(api.refresh_calls(), 1);
        assert_eq!(api.replayed_with("A2"), vec!["/x", "/y", "/z"]);
        assert_eq!(client.queued_requests(), 0);
        assert!(!client.is_refreshing());
    }

    #[tokio::test]
    async fn test_failed_refresh_rejects_whole_wave() {
        let (release, gate) = oneshot::channel();
        let api = Arc::new(FakeApi::new("A2", None).with_gate(gate));
        let client = Arc::new(client_with(api.clone(), Some("A1"), Some("R1")));

        let handles: Vec<_> = ["/x", "/y", "/z"]
            .into_iter()
            .map(|path| {
                let client = client.clone();
                tokio::spawn(async move { client.get(path).await })
            })
            .collect();

        wait_for_queue(&client, 2).await;
        release.send(()).unwrap();

        let mut errors = Vec::new();
        for handle in handles {
            errors.push(handle.await.unwrap().unwrap_err());
        }

        assert!(matches!(errors[0], ClientError::SessionExpired(_)));
        assert!(errors.iter().all(|e| *e == errors[0]));
        assert_eq!(api.refresh_calls(), 1);

        // Nothing was resent and the session is gone
        assert!(api.replayed_with("A2").is_empty());
        assert_eq!(client.session().access_token(), None);
        assert_eq!(client.session().refresh_token(), None);
        assert!(!client.is_refreshing());
    }

    #[tokio::test]
    async fn test_missing_refresh_token_expires_session() {
        let api = Arc::new(FakeApi::new("A2", Some("A2")));
        let client = client_with(api.clone(), Some("A1"), None);

        let err = client.get("/x").await.unwrap_err();
        assert!(matches!(err, ClientError::SessionExpired(_)));
        assert_eq!(api.refresh_calls(), 0);
        assert_eq!(client.session().access_token(), None);
        assert!(!client.is_refreshing());
    }

    #[tokio::test]
    async fn test_request_without_token_omits_header() {
        let api = Arc::new(FakeApi::new("A1", Some("A2")));
        let client = client_with(api.clone(), None, None);

        let err = client.get("/x").await.unwrap_err();
        assert!(matches!(err, ClientError::SessionExpired(_)));
        assert_eq!(api.seen(), vec![("/x".to_string(), None)]);
    }

    #[tokio::test]
    async fn test_second_401_is_surfaced_without_new_refresh() {
        // Refresh hands out A2 but the API only accepts A3
        let api = Arc::new(FakeApi::new("A3", Some("A2")));
        let client = client_with(api.clone(), Some("A1"), Some("R1"));

        let err = client.get("/x").await.unwrap_err();
        assert_eq!(
            err,
            ClientError::Unauthorized {
                retryable: false,
                message: "Given token not valid for any token type".to_string(),
            }
        );
        assert_eq!(api.refresh_calls(), 1);
        assert_eq!(api.seen().len(), 2);

        // The refreshed credentials are kept; only a failed refresh clears them
        assert_eq!(client.session().access_token().as_deref(), Some("A2"));
    }

    #[tokio::test]
    async fn test_non_401_statuses_pass_through() {
        for status in [StatusCode::BAD_REQUEST, StatusCode::FORBIDDEN, StatusCode::INTERNAL_SERVER_ERROR] {
            let transport = Arc::new(FixedStatus {
                status,
                calls: AtomicUsize::new(0),
            });
            let client = client_with(transport.clone(), Some("A1"), Some("R1"));

            let response = client
                .request(Method::POST, "/api/meals/", Some(json!({"student": 1})), None)
                .await
                .unwrap();
            assert_eq!(response.status(), status);
            assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
            assert_eq!(client.session().access_token().as_deref(), Some("A1"));
        }
    }

    #[tokio::test]
    async fn test_network_error_is_not_retried() {
        let transport = Arc::new(Unreachable {
            calls: AtomicUsize::new(0),
        });
        let client = client_with(transport.clone(), Some("A1"), Some("R1"));

        let err = client.get("/x").await.unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
        assert!(client.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_detached_mode_skips_auth_handling() {
        let api = Arc::new(FakeApi::new("A1", Some("A2")));
        let client = CafeHttpClient::new(api.clone(), Session::detached());

        let err = client.get("/x").await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Unauthorized {
                retryable: true,
                ..
            }
        ));
        assert_eq!(api.refresh_calls(), 0);
        assert_eq!(api.seen(), vec![("/x".to_string(), None)]);
    }

    #[tokio::test]
    async fn test_clients_do_not_share_refresh_state() {
        let (release, gate) = oneshot::channel();
        let gated = Arc::new(FakeApi::new("A2", Some("A2")).with_gate(gate));
        let first = Arc::new(client_with(gated.clone(), Some("A1"), Some("R1")));

        let pending = {
            let first = first.clone();
            tokio::spawn(async move { first.get("/x").await })
        };
        while !first.is_refreshing() {
            tokio::task::yield_now().await;
        }

        let open = Arc::new(FakeApi::new("B2", Some("B2")));
        let second = client_with(open.clone(), Some("B1"), Some("S1"));
        assert!(!second.is_refreshing());
        second.get("/y").await.unwrap();
        assert_eq!(open.refresh_calls(), 1);
        assert_eq!(second.queued_requests(), 0);

        release.send(()).unwrap();
        pending.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_caller_headers_are_forwarded() {
        let api = Arc::new(FakeApi::new("A1", None));
        let client = client_with(api.clone(), Some("A1"), Some("R1"));

        let mut headers = HeaderMap::new();
        headers.insert("x-station", reqwest::header::HeaderValue::from_static("desk-1"));
        let response = client
            .request(Method::GET, "/api/meals/", None, Some(headers))
            .await
            .unwrap();
        assert!(response.is_success());
    }

    /// Another wave refreshes while this request is on the wire
    struct RefreshedElsewhere {
        session: Session,
        sends: Mutex<Vec<Option<String>>>,
    }

    #[async_trait]
    impl Transport for RefreshedElsewhere {
        async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
            assert_ne!(request.path, REFRESH_PATH, "no refresh expected");
            let bearer = request.bearer().map(str::to_string);
            self.sends.lock().unwrap().push(bearer.clone());

            if bearer.as_deref() == Some("A2") {
                return Ok(ApiResponse::json_body(StatusCode::OK, &json!({})));
            }
            self.session.set_tokens(Some("A2"), Some("R1"));
            Ok(ApiResponse::json_body(
                StatusCode::UNAUTHORIZED,
                &json!({"detail": "expired"}),
            ))
        }
    }

    #[tokio::test]
    async fn test_late_401_reuses_already_refreshed_token() {
        let session = Session::in_memory();
        session.set_tokens(Some("A1"), Some("R1"));
        let api = Arc::new(RefreshedElsewhere {
            session: session.clone(),
            sends: Mutex::new(Vec::new()),
        });
        let client = CafeHttpClient::new(api.clone(), session);

        let response = client.get("/x").await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            api.sends.lock().unwrap().clone(),
            vec![Some("A1".to_string()), Some("A2".to_string())]
        );
        assert!(!client.is_refreshing());
    }

    #[tokio::test]
    async fn test_aborted_refresh_keeps_session() {
        // Gate is never released, so the refresh never answers
        let (_hold, gate) = oneshot::channel::<()>();
        let api = Arc::new(FakeApi::new("A2", Some("A2")).with_gate(gate));
        let client = Arc::new(client_with(api.clone(), Some("A1"), Some("R1")));

        let leader = {
            let client = client.clone();
            tokio::spawn(async move { client.get("/x").await })
        };
        while !client.is_refreshing() {
            tokio::task::yield_now().await;
        }

        let follower = {
            let client = client.clone();
            tokio::spawn(async move { client.get("/y").await })
        };
        wait_for_queue(&client, 1).await;

        leader.abort();
        assert!(leader.await.unwrap_err().is_cancelled());

        let err = follower.await.unwrap().unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
        assert!(!err.requires_login());

        // Session survives the cancelled refresh
        assert_eq!(client.session().access_token().as_deref(), Some("A1"));
        assert_eq!(client.session().refresh_token().as_deref(), Some("R1"));
        assert!(!client.is_refreshing());
        assert_eq!(client.queued_requests(), 0);
        assert_eq!(api.refresh_calls(), 1);
    }

    #[tokio::test]
    async fn test_logout_revokes_token_rotated_by_its_own_refresh() {
        let api = Arc::new(FakeApi::new("A2", Some("A2")).with_rotation("R2"));
        let client = client_with(api.clone(), Some("A1"), Some("R1"));

        assert!(client.logout().await);

        assert_eq!(api.refresh_calls(), 1);
        assert_eq!(
            api.posted.lock().unwrap().clone(),
            vec![
                json!({"refresh": "R1"}),
                json!({"refresh": "R1"}),
                json!({"refresh": "R2"}),
            ]
        );
        assert!(!client.session().is_authenticated());
        assert_eq!(client.session().refresh_token(), None);
    }

    #[tokio::test]
    async fn test_logout_without_rotation_sends_once() {
        let api = Arc::new(FakeApi::new("A1", None));
        let client = client_with(api.clone(), Some("A1"), Some("R1"));

        assert!(client.logout().await);
        assert_eq!(
            api.posted.lock().unwrap().clone(),
            vec![json!({"refresh": "R1"})]
        );
        assert_eq!(api.refresh_calls(), 0);
    }
}
