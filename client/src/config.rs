use std::env;
use std::time::Duration;

use url::Url;

const DEFAULT_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_MODEL_NAME: &str = "resnet";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_HEALTH_TIMEOUT_SECS: u64 = 2;
const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;
const DEFAULT_JPEG_QUALITY: u8 = 95;
const DEFAULT_ALLOWED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

/// Built once and passed into each component, so tests can substitute
/// mock endpoints and short timeouts.
#[derive(Debug, Clone)]
pub struct Config {
    pub endpoint_base: Url,
    pub model_name: String,
    pub request_timeout: Duration,
    pub health_timeout: Duration,
    pub max_upload_bytes: u64,
    pub allowed_extensions: Vec<String>,
    pub jpeg_quality: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint_base: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            model_name: DEFAULT_MODEL_NAME.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            health_timeout: Duration::from_secs(DEFAULT_HEALTH_TIMEOUT_SECS),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Config::default();

        let endpoint_base = match env::var("INFERENCE_BASE_URL") {
            Ok(raw) => match Url::parse(&raw) {
                Ok(url) => url,
                Err(e) => {
                    log::warn!("Ignoring invalid INFERENCE_BASE_URL {:?}: {}", raw, e);
                    defaults.endpoint_base.clone()
                }
            },
            Err(_) => defaults.endpoint_base.clone(),
        };

        Self {
            endpoint_base,
            model_name: env::var("INFERENCE_MODEL").unwrap_or(defaults.model_name),
            request_timeout: env_secs("REQUEST_TIMEOUT_SECS", defaults.request_timeout),
            health_timeout: env_secs("HEALTH_TIMEOUT_SECS", defaults.health_timeout),
            max_upload_bytes: env_u64("MAX_UPLOAD_BYTES", defaults.max_upload_bytes),
            allowed_extensions: defaults.allowed_extensions,
            jpeg_quality: env_jpeg_quality(defaults.jpeg_quality),
        }
    }

    pub fn predictions_url(&self) -> Url {
        let mut url = self.endpoint_base.clone();
        url.set_path(&format!("predictions/{}", self.model_name));
        url
    }

    pub fn ping_url(&self) -> Url {
        let mut url = self.endpoint_base.clone();
        url.set_path("ping");
        url
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    match env::var(name) {
        Ok(raw) => match raw.parse::<u64>() {
            Ok(value) => value,
            Err(_) => {
                log::warn!("Ignoring non-numeric {} {:?}", name, raw);
                default
            }
        },
        Err(_) => default,
    }
}

fn env_secs(name: &str, default: Duration) -> Duration {
    Duration::from_secs(env_u64(name, default.as_secs()))
}

fn env_jpeg_quality(default: u8) -> u8 {
    let value = env_u64("JPEG_QUALITY", u64::from(default));
    if (1..=100).contains(&value) {
        value as u8
    } else {
        log::warn!("Ignoring out-of-range JPEG_QUALITY {}", value);
        default
    }
}
