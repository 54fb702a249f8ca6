//! Configuration module
//!
//! Configuration is read from the environment (optionally seeded from a `.env` file) once at
//! startup. Transcription settings are fixed per deployment.

use std::env;
use std::time::Duration;

use crate::storage_types::StorageBackend;

// Common constants
const SERVER_PORT: u16 = 4000;
const TRANSCRIBE_LANGUAGE_CODE: &str = "he-IL";
const TRANSCRIBE_MAX_SPEAKER_LABELS: u32 = 2;
const TRANSCRIBE_POLL_INTERVAL_SECS: u64 = 10;
const TRANSCRIBE_TIMEOUT_SECS: u64 = 840;
const PRESIGNED_URL_TTL_SECS: u64 = 900;
const UPLOAD_UTC_OFFSET_HOURS: i32 = 2;
const MAX_UPLOAD_SIZE_MB: usize = 500;

/// Server-level settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub log_format: String,
}

/// Transcription job settings passed to the job service
#[derive(Clone, Debug)]
pub struct TranscribeSettings {
    pub language_code: String,
    pub max_speaker_labels: u32,
    pub poll_interval: Duration,
    pub timeout: Duration,
}

#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub base: BaseConfig,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, LocalStack)
    pub aws_region: Option<String>,
    pub transcribe: TranscribeSettings,
    pub presigned_url_ttl: Duration,
    pub upload_utc_offset_hours: i32,
    pub max_upload_size_bytes: usize,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<ServiceConfig>);

impl Config {
    fn inner(&self) -> &ServiceConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.inner().base.environment.to_lowercase();
        environment == "production" || environment == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = ServiceConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.inner().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.inner().base.environment
    }

    pub fn log_format(&self) -> &str {
        &self.inner().base.log_format
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.inner().storage_backend
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.inner().s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.inner().s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.inner().s3_endpoint.as_deref()
    }

    pub fn aws_region(&self) -> Option<&str> {
        self.inner().aws_region.as_deref()
    }

    /// Region for S3 calls, falling back to the general AWS region.
    pub fn storage_region(&self) -> Option<&str> {
        self.s3_region().or_else(|| self.aws_region())
    }

    pub fn transcribe(&self) -> &TranscribeSettings {
        &self.inner().transcribe
    }

    pub fn presigned_url_ttl(&self) -> Duration {
        self.inner().presigned_url_ttl
    }

    pub fn upload_utc_offset_hours(&self) -> i32 {
        self.inner().upload_utc_offset_hours
    }

    pub fn max_upload_size_bytes(&self) -> usize {
        self.inner().max_upload_size_bytes
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins: Vec<String> = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            environment,
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "compact".to_string())
                .to_lowercase(),
        };

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(raw) => raw.parse()?,
            Err(_) => StorageBackend::S3,
        };

        let transcribe = TranscribeSettings {
            language_code: env::var("TRANSCRIBE_LANGUAGE_CODE")
                .unwrap_or_else(|_| TRANSCRIBE_LANGUAGE_CODE.to_string()),
            max_speaker_labels: env_or(
                "TRANSCRIBE_MAX_SPEAKER_LABELS",
                TRANSCRIBE_MAX_SPEAKER_LABELS,
            ),
            poll_interval: Duration::from_secs(env_or(
                "TRANSCRIBE_POLL_INTERVAL_SECS",
                TRANSCRIBE_POLL_INTERVAL_SECS,
            )),
            timeout: Duration::from_secs(env_or(
                "TRANSCRIBE_TIMEOUT_SECS",
                TRANSCRIBE_TIMEOUT_SECS,
            )),
        };

        let config = ServiceConfig {
            base,
            storage_backend,
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION").ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            aws_region: env::var("AWS_REGION").ok(),
            transcribe,
            presigned_url_ttl: Duration::from_secs(env_or(
                "PRESIGNED_URL_TTL_SECS",
                PRESIGNED_URL_TTL_SECS,
            )),
            upload_utc_offset_hours: env_or("UPLOAD_UTC_OFFSET_HOURS", UPLOAD_UTC_OFFSET_HOURS),
            max_upload_size_bytes: env_or("MAX_UPLOAD_SIZE_MB", MAX_UPLOAD_SIZE_MB) * 1024 * 1024,
        };

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        let transcribe = &self.transcribe;
        if transcribe.poll_interval.is_zero() {
            return Err(anyhow::anyhow!(
                "TRANSCRIBE_POLL_INTERVAL_SECS must be greater than zero"
            ));
        }
        if transcribe.timeout < transcribe.poll_interval {
            return Err(anyhow::anyhow!(
                "TRANSCRIBE_TIMEOUT_SECS must be at least TRANSCRIBE_POLL_INTERVAL_SECS"
            ));
        }
        // AWS Transcribe accepts between 2 and 10 speaker labels
        if !(2..=10).contains(&transcribe.max_speaker_labels) {
            return Err(anyhow::anyhow!(
                "TRANSCRIBE_MAX_SPEAKER_LABELS must be between 2 and 10"
            ));
        }
        if transcribe.language_code.trim().is_empty() {
            return Err(anyhow::anyhow!("TRANSCRIBE_LANGUAGE_CODE must not be empty"));
        }
        if !(-12..=14).contains(&self.upload_utc_offset_hours) {
            return Err(anyhow::anyhow!(
                "UPLOAD_UTC_OFFSET_HOURS must be between -12 and 14"
            ));
        }
        if self.presigned_url_ttl.is_zero() {
            return Err(anyhow::anyhow!(
                "PRESIGNED_URL_TTL_SECS must be greater than zero"
            ));
        }
        if self.storage_backend == StorageBackend::S3 {
            if self.s3_bucket.as_deref().map_or(true, str::is_empty) {
                return Err(anyhow::anyhow!(
                    "S3_BUCKET must be set when using S3 storage backend"
                ));
            }
            if self.s3_region.is_none() && self.aws_region.is_none() {
                return Err(anyhow::anyhow!(
                    "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> ServiceConfig {
        ServiceConfig {
            base: BaseConfig {
                server_port: 4000,
                cors_origins: vec!["*".to_string()],
                environment: "test".to_string(),
                log_format: "compact".to_string(),
            },
            storage_backend: StorageBackend::S3,
            s3_bucket: Some("medibox-test".to_string()),
            s3_region: None,
            s3_endpoint: None,
            aws_region: Some("eu-west-1".to_string()),
            transcribe: TranscribeSettings {
                language_code: "he-IL".to_string(),
                max_speaker_labels: 2,
                poll_interval: Duration::from_secs(10),
                timeout: Duration::from_secs(840),
            },
            presigned_url_ttl: Duration::from_secs(900),
            upload_utc_offset_hours: 2,
            max_upload_size_bytes: 500 * 1024 * 1024,
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn test_timeout_shorter_than_interval_rejected() {
        let mut config = test_config();
        config.transcribe.timeout = Duration::from_secs(5);
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("TRANSCRIBE_TIMEOUT_SECS"), "got: {}", err);
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let mut config = test_config();
        config.transcribe.poll_interval = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_s3_requires_bucket() {
        let mut config = test_config();
        config.s3_bucket = None;
        assert!(config.validate().is_err());

        config.storage_backend = StorageBackend::Memory;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_storage_region_falls_back_to_aws_region() {
        let config = Config(Box::new(test_config()));
        assert_eq!(config.storage_region(), Some("eu-west-1"));
        assert!(!config.is_production());
    }
}
