use reqwest::{Client, Url};
use tracing::info;

use crate::api::AuthenticatedClient;
use crate::render::Renderer;

use super::{AuthError, Identity, LoginFlow, SessionCredential, SessionStore, SessionValidator};

/// Where the session in use came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOrigin {
    /// A stored session was still accepted
    Reused,
    /// A fresh login was performed and saved
    LoggedIn,
}

/// Establishes the session for a run: reuse the stored one if the site still
/// accepts it, otherwise log in once and store the result.
pub struct SessionManager {
    client: Client,
    base_url: Url,
    store: SessionStore,
}

impl SessionManager {
    pub fn new(client: Client, base_url: Url, store: SessionStore) -> Self {
        Self {
            client,
            base_url,
            store,
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Produce an `AuthenticatedClient` for this run.
    ///
    /// `renderer` is only used when a login is needed.
    pub async fn establish(
        &self,
        identity: &Identity,
        renderer: &dyn Renderer,
    ) -> Result<(AuthenticatedClient, SessionOrigin), AuthError> {
        if let Some(credential) = self.store.load() {
            let validator = SessionValidator::new(&self.client, &self.base_url);
            if validator.is_valid(&credential).await {
                info!("Reusing existing session");
                return Ok((self.authenticated(credential), SessionOrigin::Reused));
            }
            info!("Stored session is no longer valid");
        }

        info!(username = identity.username(), "Logging in");
        let credential = LoginFlow::new(&self.client, &self.base_url, renderer)
            .execute(identity, &self.store)
            .await?;
        Ok((self.authenticated(credential), SessionOrigin::LoggedIn))
    }

    fn authenticated(&self, credential: SessionCredential) -> AuthenticatedClient {
        AuthenticatedClient::new(self.client.clone(), self.base_url.clone(), credential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::build_http_client;
    use crate::render::testing::StaticRenderer;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const LOGIN_HTML: &str = r#"<form><input name="nonce" value="abc"></form>"#;

    fn manager(server: &MockServer, dir: &tempfile::TempDir) -> SessionManager {
        SessionManager::new(
            build_http_client().unwrap(),
            Url::parse(&server.uri()).unwrap(),
            SessionStore::new(dir.path().join("session.json")),
        )
    }

    async fn mount_login(server: &MockServer, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("Location", "/list")
                    .append_header("Set-Cookie", "sid=fresh; Path=/; HttpOnly"),
            )
            .expect(expected_calls)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_valid_session_skips_login() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        Mock::given(method("GET"))
            .and(path("/settings"))
            .and(header("Cookie", "sid=stored"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Logout"))
            .expect(1)
            .mount(&server)
            .await;
        mount_login(&server, 0).await;

        let manager = manager(&server, &dir);
        manager.store().save(&SessionCredential::new("sid=stored").unwrap()).unwrap();

        let renderer = StaticRenderer::new().with_page("/login", LOGIN_HTML);
        let (client, origin) = manager
            .establish(&Identity::new("demo@example.org", "test"), &renderer)
            .await
            .unwrap();

        assert_eq!(origin, SessionOrigin::Reused);
        assert_eq!(client.credential().as_str(), "sid=stored");
        assert_eq!(renderer.call_count(), 0);
    }

    #[tokio::test]
    async fn test_rejected_session_logs_in_once() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        Mock::given(method("GET"))
            .and(path("/settings"))
            .respond_with(ResponseTemplate::new(302).insert_header("Location", "/login"))
            .expect(1)
            .mount(&server)
            .await;
        mount_login(&server, 1).await;

        let manager = manager(&server, &dir);
        manager.store().save(&SessionCredential::new("sid=expired").unwrap()).unwrap();

        let renderer = StaticRenderer::new().with_page("/login", LOGIN_HTML);
        let (client, origin) = manager
            .establish(&Identity::new("demo@example.org", "test"), &renderer)
            .await
            .unwrap();

        assert_eq!(origin, SessionOrigin::LoggedIn);
        assert_eq!(client.credential().as_str(), "sid=fresh");
        assert_eq!(manager.store().load().unwrap().as_str(), "sid=fresh");
        assert_eq!(renderer.call_count(), 1);
    }

    #[tokio::test]
    async fn test_garbage_session_file_logs_in_without_validating() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        Mock::given(method("GET"))
            .and(path("/settings"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Logout"))
            .expect(0)
            .mount(&server)
            .await;
        mount_login(&server, 1).await;

        let manager = manager(&server, &dir);
        std::fs::write(manager.store().path(), "{ not json").unwrap();

        let renderer = StaticRenderer::new().with_page("/login", LOGIN_HTML);
        let (_, origin) = manager
            .establish(&Identity::new("demo@example.org", "test"), &renderer)
            .await
            .unwrap();

        assert_eq!(origin, SessionOrigin::LoggedIn);
        assert_eq!(renderer.call_count(), 1);
    }

    #[tokio::test]
    async fn test_absent_session_logs_in_once() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        mount_login(&server, 1).await;

        let manager = manager(&server, &dir);
        let renderer = StaticRenderer::new().with_page("/login", LOGIN_HTML);
        let (_, origin) = manager
            .establish(&Identity::new("demo@example.org", "test"), &renderer)
            .await
            .unwrap();

        assert_eq!(origin, SessionOrigin::LoggedIn);
        assert!(manager.store().path().exists());
    }
}
