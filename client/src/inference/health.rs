use std::time::Duration;

use reqwest::blocking::Client as HttpClient;
use shared::ServerStatus;
use url::Url;

use crate::config::Config;

/// Informational only: a probe failure never blocks an analysis.
#[derive(Clone)]
pub struct HealthService {
    http: HttpClient,
    url: Url,
    timeout: Duration,
}

impl HealthService {
    pub fn new(config: &Config) -> Self {
        Self {
            http: HttpClient::new(),
            url: config.ping_url(),
            timeout: config.health_timeout,
        }
    }

    pub fn check(&self) -> ServerStatus {
        match self
            .http
            .get(self.url.clone())
            .timeout(self.timeout)
            .send()
        {
            Ok(response) if response.status().is_success() => ServerStatus::Online,
            Ok(response) => {
                log::warn!("Health probe returned status {}", response.status());
                ServerStatus::Degraded
            }
            Err(e) => {
                log::warn!("Health probe failed: {}", e);
                ServerStatus::Offline
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    fn health_for(base: &str) -> HealthService {
        let config = Config {
            endpoint_base: Url::parse(base).unwrap(),
            health_timeout: Duration::from_secs(1),
            ..Config::default()
        };
        HealthService::new(&config)
    }

    #[test]
    fn responding_server_is_online() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/ping")
            .with_status(200)
            .with_body(r#"{"status": "Healthy"}"#)
            .create();
        assert_eq!(health_for(&server.url()).check(), ServerStatus::Online);
    }

    #[test]
    fn non_success_status_is_degraded() {
        let mut server = mockito::Server::new();
        let _mock = server.mock("GET", "/ping").with_status(503).create();
        assert_eq!(health_for(&server.url()).check(), ServerStatus::Degraded);
    }

    #[test]
    fn unreachable_server_is_offline() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let base = format!("http://127.0.0.1:{}", port);
        assert_eq!(health_for(&base).check(), ServerStatus::Offline);
    }
}
