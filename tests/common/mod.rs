#![allow(dead_code)]

pub mod stub;

use anyhow::{Context, Result};
use serde_json::{json, Value};
use url::Url;

use instalar_api::provider::ProviderConfig;
use instalar_api::routes;
use instalar_api::state::AppState;

use stub::StubProvider;

/// One app instance wired to its own stub provider, on free ports. Each
/// test gets a fresh world.
pub struct TestApp {
    pub base_url: String,
    pub client: reqwest::Client,
    pub stub: StubProvider,
}

pub async fn spawn_app() -> Result<TestApp> {
    // Stub provider first
    let stub = StubProvider::new();
    let provider_listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .context("bind stub provider")?;
    let provider_addr = provider_listener.local_addr()?;
    tokio::spawn({
        let router = stub.router();
        async move {
            let _ = axum::serve(provider_listener, router).await;
        }
    });

    // Then the app under test, pointed at the stub
    let provider_config = ProviderConfig {
        url: Url::parse(&format!("http://{}/", provider_addr))?,
        service_key: stub::SERVICE_KEY.to_string(),
        timeout_secs: 5,
    };
    let state = AppState::from_provider(&provider_config).context("provider clients")?;

    let api_port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let api_listener = tokio::net::TcpListener::bind(("127.0.0.1", api_port))
        .await
        .context("bind app under test")?;
    tokio::spawn({
        let app = routes::app(state);
        async move {
            let _ = axum::serve(api_listener, app).await;
        }
    });

    Ok(TestApp {
        base_url: format!("http://127.0.0.1:{}", api_port),
        client: reqwest::Client::new(),
        stub,
    })
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Result<reqwest::Response> {
        let mut req = self.client.get(self.url(path));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        Ok(req.send().await?)
    }

    pub async fn post(
        &self,
        path: &str,
        token: Option<&str>,
        body: &Value,
    ) -> Result<reqwest::Response> {
        let mut req = self.client.post(self.url(path)).json(body);
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        Ok(req.send().await?)
    }

    pub async fn put(
        &self,
        path: &str,
        token: Option<&str>,
        body: &Value,
    ) -> Result<reqwest::Response> {
        let mut req = self.client.put(self.url(path)).json(body);
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        Ok(req.send().await?)
    }

    pub async fn patch(
        &self,
        path: &str,
        token: Option<&str>,
        body: &Value,
    ) -> Result<reqwest::Response> {
        let mut req = self.client.patch(self.url(path)).json(body);
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        Ok(req.send().await?)
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> Result<reqwest::Response> {
        let mut req = self.client.delete(self.url(path));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        Ok(req.send().await?)
    }

    /// Register an identity through the public endpoint; returns the
    /// bearer token and the `data` payload.
    pub async fn register(&self, email: &str, nombre: &str, rol: &str) -> Result<(String, Value)> {
        let response = self
            .post(
                "/api/auth/register",
                None,
                &json!({
                    "email": email,
                    "password": "secreto123",
                    "nombre": nombre,
                    "rol": rol,
                }),
            )
            .await?;
        anyhow::ensure!(
            response.status() == reqwest::StatusCode::CREATED,
            "registration of {} failed: {}",
            email,
            response.text().await?
        );

        let body: Value = response.json().await?;
        let token = body["data"]["token"]
            .as_str()
            .context("token missing from registration response")?
            .to_string();
        Ok((token, body["data"].clone()))
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let response = self
            .post(
                "/api/auth/login",
                None,
                &json!({ "email": email, "password": password }),
            )
            .await?;
        anyhow::ensure!(
            response.status() == reqwest::StatusCode::OK,
            "login of {} failed: {}",
            email,
            response.text().await?
        );

        let body: Value = response.json().await?;
        Ok(body["data"]["token"]
            .as_str()
            .context("token missing from login response")?
            .to_string())
    }

    /// Admin accounts are provisioned at the provider, not through the
    /// API; seed one and log in normally.
    pub async fn seed_admin(&self) -> Result<String> {
        self.stub
            .seed_user("admin@instalar.com", "admin123", "Administrador", "admin");
        self.login("admin@instalar.com", "admin123").await
    }

    /// Find a client profile id by email, as the admin sees it.
    pub async fn client_id_by_email(&self, admin_token: &str, email: &str) -> Result<i64> {
        let body: Value = self
            .get("/api/clientes", Some(admin_token))
            .await?
            .json()
            .await?;
        body["data"]
            .as_array()
            .context("client list is not an array")?
            .iter()
            .find(|c| c["email"] == email)
            .and_then(|c| c["id"].as_i64())
            .with_context(|| format!("no client profile for {}", email))
    }

    /// Find a technician profile id by email, as the admin sees it.
    pub async fn technician_id_by_email(&self, admin_token: &str, email: &str) -> Result<i64> {
        let body: Value = self
            .get("/api/tecnicos", Some(admin_token))
            .await?
            .json()
            .await?;
        body["data"]
            .as_array()
            .context("technician list is not an array")?
            .iter()
            .find(|t| t["email"] == email)
            .and_then(|t| t["id"].as_i64())
            .with_context(|| format!("no technician profile for {}", email))
    }
}
