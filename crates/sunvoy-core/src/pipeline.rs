//! One complete run: establish the session, scrape, write the report.
//!
//! Steps run strictly in order. A login failure returns before anything is
//! scraped, so no partial output is ever written.

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::info;

use crate::auth::{SessionManager, SessionStore};
use crate::config::Config;
use crate::extract::{PageExtractor, PageLayout};
use crate::output::Report;
use crate::render::Renderer;

/// Run the pipeline and return the report that was written to
/// `config.output_file`.
pub async fn run(config: &Config, client: Client, renderer: &dyn Renderer) -> Result<Report> {
    info!(renderer = renderer.name(), base_url = %config.base_url, "Starting");

    let manager = SessionManager::new(
        client,
        config.base_url.clone(),
        SessionStore::new(&config.session_file),
    );
    let (session, origin) = manager
        .establish(&config.identity, renderer)
        .await
        .context("Could not establish a session")?;
    info!(?origin, "Session ready");

    let extractor = PageExtractor::new(
        &session,
        renderer,
        &PageLayout::default(),
        config.render_timeout,
    )?;
    let users = extractor.extract_list().await;
    let current_user = extractor.extract_current_user().await;

    let report = Report::new(users, current_user);
    report.write(&config.output_file)?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::build_http_client;
    use crate::models::UserRecord;
    use crate::render::testing::StaticRenderer;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const LOGIN_HTML: &str = r#"<form><input name="nonce" value="abc"></form>"#;

    const LIST_HTML: &str = r#"
        <div class="bg-white rounded-lg shadow"><h3>Ada</h3>
          <p class="text-gray-600">ada@example.org</p>
          <p class="text-sm text-gray-500">ID: 1</p></div>"#;

    const SETTINGS_HTML: &str = r#"
        <form action="/settings"><input value="u1"><input value="Demo">
          <input value="User"><input value="demo@example.org"></form>"#;

    fn config_for(server: &MockServer, dir: &tempfile::TempDir) -> Config {
        let uri = server.uri();
        let session = dir.path().join("sessions").join("session.json");
        let output = dir.path().join("users.json");
        Config::from_lookup(move |name| match name {
            "EMAIL" => Some("demo@example.org".to_string()),
            "PASSWORD" => Some("test".to_string()),
            "SUNVOY_BASE_URL" => Some(uri.clone()),
            "SUNVOY_SESSION_FILE" => Some(session.display().to_string()),
            "SUNVOY_OUTPUT_FILE" => Some(output.display().to_string()),
            _ => None,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_rejected_login_writes_nothing() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Invalid credentials"))
            .expect(1)
            .mount(&server)
            .await;

        let config = config_for(&server, &dir);
        let renderer = StaticRenderer::new()
            .with_page("/login", LOGIN_HTML)
            .with_page("/list", LIST_HTML)
            .with_page("/settings", SETTINGS_HTML);

        let err = run(&config, build_http_client().unwrap(), &renderer)
            .await
            .unwrap_err();

        assert!(format!("{err:#}").contains("Invalid credentials"));
        assert!(!config.output_file.exists());
        assert!(!config.session_file.exists());
        // Only the login page was rendered; nothing was scraped
        assert_eq!(renderer.call_count(), 1);
    }

    #[tokio::test]
    async fn test_fresh_login_writes_report_and_session() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("Location", "/list")
                    .append_header("Set-Cookie", "sid=fresh; Path=/; HttpOnly"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let config = config_for(&server, &dir);
        let renderer = StaticRenderer::new()
            .with_page("/login", LOGIN_HTML)
            .with_page("/list", LIST_HTML)
            .with_page("/settings", SETTINGS_HTML);

        let report = run(&config, build_http_client().unwrap(), &renderer)
            .await
            .unwrap();

        assert_eq!(report.users, vec![UserRecord::new("1", "Ada", "ada@example.org")]);
        assert_eq!(
            report.current_user,
            Some(UserRecord::new("u1", "Demo User", "demo@example.org"))
        );
        assert!(config.output_file.exists());
        assert_eq!(
            SessionStore::new(&config.session_file).load().unwrap().as_str(),
            "sid=fresh"
        );
    }
}
