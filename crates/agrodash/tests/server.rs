//! Integration tests for the dashboard HTTP server.
//!
//! Each test starts a real server on a random port and talks to it with a
//! `reqwest` client that does not follow redirects. Cookie headers come
//! from a `SessionContext`, i.e. exactly what a browser holding that
//! session would send.

use std::sync::Arc;

use agrodash::prelude::*;
use agrodash_protocol::RoleLookupResponse;
use jsonwebtoken::{EncodingKey, Header, encode};
use reqwest::{StatusCode, header};
use serde_json::json;

const NOW: u64 = 1_700_000_000;

// =========================================================================
// Mock authenticator
// =========================================================================

/// Accepts `rui@agro.example` / `secret` as a storekeeper. Any email at
/// `down.example` behaves as if the service were unreachable.
struct StubAuth;

impl Authenticator for StubAuth {
    async fn authenticate(&self, credentials: &Credentials) -> Result<LoginGrant, SessionError> {
        if credentials.email.ends_with("@down.example") {
            return Err(SessionError::AuthUnavailable("connection refused".into()));
        }
        if credentials.email != "rui@agro.example" || credentials.password != "secret" {
            return Err(SessionError::AuthFailed("bad credentials".into()));
        }
        Ok(LoginGrant {
            token: mint(NOW + 3600, Role::Storekeeper),
            user_id: "u7".into(),
            name: Some("Rui".into()),
        })
    }

    async fn lookup_role(
        &self,
        _user_id: &str,
        _token: &str,
    ) -> Result<RoleLookupResponse, SessionError> {
        Ok(RoleLookupResponse {
            role: "storekeeper".into(),
            centers: None,
        })
    }
}

// =========================================================================
// Helpers
// =========================================================================

async fn spawn_server() -> String {
    let server = DashboardServer::builder()
        .bind("127.0.0.1:0")
        .clock(Arc::new(ManualClock::new(NOW)))
        .build(StubAuth)
        .await
        .expect("server should bind");
    let addr = server.local_addr().expect("should have addr");
    tokio::spawn(async move {
        server.run().await.expect("server");
    });
    format!("http://{addr}")
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("client")
}

fn mint(exp: u64, role: Role) -> String {
    encode(
        &Header::default(),
        &json!({ "sub": "u7", "role": role.as_str(), "exp": exp }),
        &EncodingKey::from_secret(b"client-never-checks"),
    )
    .expect("test token should encode")
}

/// The `Cookie` header for a stored session.
fn cookies_for(token: String, role: Role) -> String {
    let context =
        SessionContext::with_clock(StoreConfig::default(), Arc::new(ManualClock::new(NOW)));
    context
        .write(&Session {
            token,
            profile: UserProfile {
                id: "u7".into(),
                email: "rui@agro.example".into(),
                name: "Rui".into(),
                role,
                centers: None,
            },
        })
        .expect("session should store");
    context.cookie_header().expect("cookies were just written")
}

fn location(response: &reqwest::Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

fn removed_cookies(response: &reqwest::Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter(|v| v.contains("Max-Age=0"))
        .filter_map(|v| v.split('=').next().map(str::to_owned))
        .collect()
}

// =========================================================================
// Guard at the boundary
// =========================================================================

#[tokio::test]
async fn test_page_without_cookie_redirects_to_login() {
    let base = spawn_server().await;

    let response = client()
        .get(format!("{base}/dashboard/orders"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_bare_dashboard_redirects_to_landing() {
    let base = spawn_server().await;

    let response = client()
        .get(format!("{base}/dashboard"))
        .header(header::COOKIE, "token=anything")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/dashboard/orders");
}

#[tokio::test]
async fn test_login_page_is_public() {
    let base = spawn_server().await;

    let response = client().get(format!("{base}/login")).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("id=\"login\""));
}

// =========================================================================
// Mount check
// =========================================================================

#[tokio::test]
async fn test_valid_session_renders_role_menu() {
    let base = spawn_server().await;
    let cookies = cookies_for(mint(NOW + 3600, Role::Accountant), Role::Accountant);

    let response = client()
        .get(format!("{base}/dashboard/finance"))
        .header(header::COOKIE, cookies)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("href=\"/dashboard/finance\""));
    assert!(body.contains("href=\"/dashboard/loans\""));
    assert!(!body.contains("href=\"/dashboard/orders\""));
    assert!(body.contains("data-role=\"ACCOUNTANT\""));
}

#[tokio::test]
async fn test_expired_token_logs_out_at_mount() {
    let base = spawn_server().await;
    let cookies = cookies_for(mint(NOW - 1, Role::Manager), Role::Manager);

    let response = client()
        .get(format!("{base}/dashboard/orders"))
        .header(header::COOKIE, cookies)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
    assert_eq!(removed_cookies(&response), ["token", "user"]);
}

#[tokio::test]
async fn test_token_without_profile_logs_out_at_mount() {
    let base = spawn_server().await;

    let response = client()
        .get(format!("{base}/dashboard/orders"))
        .header(header::COOKIE, format!("token={}", mint(NOW + 3600, Role::Admin)))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_truncated_profile_cookie_logs_out_at_mount() {
    let base = spawn_server().await;
    let token = mint(NOW + 3600, Role::Admin);

    let response = client()
        .get(format!("{base}/dashboard/orders"))
        .header(header::COOKIE, format!("token={token}; user=%7B%22id%22%3A%22u7"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

// =========================================================================
// Login
// =========================================================================

#[tokio::test]
async fn test_login_submit_sets_cookies_that_open_the_dashboard() {
    let base = spawn_server().await;

    let login = client()
        .post(format!("{base}/login"))
        .json(&json!({ "email": "rui@agro.example", "password": "secret" }))
        .send()
        .await
        .unwrap();

    assert_eq!(login.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&login), "/dashboard/orders");

    // Send back what a browser would: the name=value part of each cookie.
    let cookies: Vec<String> = login
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next().map(str::to_owned))
        .collect();
    assert_eq!(cookies.len(), 2);

    let page = client()
        .get(format!("{base}/dashboard/inventory"))
        .header(header::COOKIE, cookies.join("; "))
        .send()
        .await
        .unwrap();

    assert_eq!(page.status(), StatusCode::OK);
    assert!(page.text().await.unwrap().contains("data-role=\"STOREKEEPER\""));
}

#[tokio::test]
async fn test_login_submit_bad_password_is_unauthorized() {
    let base = spawn_server().await;

    let response = client()
        .post(format!("{base}/login"))
        .json(&json!({ "email": "rui@agro.example", "password": "nope" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn test_login_submit_service_down_is_unavailable() {
    let base = spawn_server().await;

    let response = client()
        .post(format!("{base}/login"))
        .json(&json!({ "email": "rui@down.example", "password": "secret" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

// =========================================================================
// Logout
// =========================================================================

#[tokio::test]
async fn test_logout_get_and_post_clear_cookies() {
    let base = spawn_server().await;

    let via_get = client().get(format!("{base}/logout")).send().await.unwrap();
    let via_post = client().post(format!("{base}/logout")).send().await.unwrap();

    for response in [via_get, via_post] {
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");
        assert_eq!(removed_cookies(&response), ["token", "user"]);
    }
}

#[tokio::test]
async fn test_custom_login_path_used_by_guard_and_logout() {
    let server = DashboardServer::builder()
        .bind("127.0.0.1:0")
        .guard_config(GuardConfig {
            login_path: "/signin".into(),
            ..GuardConfig::default()
        })
        .build(StubAuth)
        .await
        .unwrap();
    let base = format!("http://{}", server.local_addr().unwrap());
    tokio::spawn(async move { server.run().await.expect("server") });

    let page = client().get(format!("{base}/dashboard/orders")).send().await.unwrap();
    let signin = client().get(format!("{base}/signin")).send().await.unwrap();

    assert_eq!(location(&page), "/signin");
    assert_eq!(signin.status(), StatusCode::OK);
}

// =========================================================================
// Custom protected prefix
// =========================================================================

async fn spawn_app_server() -> String {
    let orders = NavigationItem::new("/app/orders", "Orders", "clipboard-list", [Role::Manager])
        .expect("item has a role");
    let server = DashboardServer::builder()
        .bind("127.0.0.1:0")
        .clock(Arc::new(ManualClock::new(NOW)))
        .guard_config(GuardConfig {
            protected_prefix: "/app".into(),
            default_landing: "/app/orders".into(),
            ..GuardConfig::default()
        })
        .navigation(NavigationTable::new(vec![orders]).expect("no duplicates"))
        .build(StubAuth)
        .await
        .expect("server should bind");
    let addr = server.local_addr().expect("should have addr");
    tokio::spawn(async move {
        server.run().await.expect("server");
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn test_custom_prefix_page_renders_with_session() {
    let base = spawn_app_server().await;
    let cookies = cookies_for(mint(NOW + 3600, Role::Manager), Role::Manager);

    let response = client()
        .get(format!("{base}/app/orders"))
        .header(header::COOKIE, cookies)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("data-path=\"/app/orders\""));
    assert!(body.contains("href=\"/app/orders\""));
}

#[tokio::test]
async fn test_custom_prefix_is_guarded_without_cookie() {
    let base = spawn_app_server().await;

    let response = client().get(format!("{base}/app/orders")).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_custom_prefix_bare_path_redirects_to_landing() {
    let base = spawn_app_server().await;

    let response = client()
        .get(format!("{base}/app"))
        .header(header::COOKIE, "token=anything")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/app/orders");
}

#[tokio::test]
async fn test_custom_prefix_default_dashboard_is_not_served() {
    let base = spawn_app_server().await;

    let response = client()
        .get(format!("{base}/dashboard/orders"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_build_landing_outside_prefix_is_config_error() {
    let result = DashboardServer::builder()
        .bind("127.0.0.1:0")
        .guard_config(GuardConfig {
            protected_prefix: "/app".into(),
            ..GuardConfig::default()
        })
        .build(StubAuth)
        .await;

    assert!(matches!(result, Err(AgrodashError::Config(_))));
}
