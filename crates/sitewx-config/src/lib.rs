use serde::{Deserialize, Serialize};
use sitewx_core::WeekStart;
use sitewx_ingest::Encoding;
use std::fs;
use std::path::Path;

/// Environment variable naming the TOML config file
pub const CONFIG_ENV: &str = "SITEWX_CONFIG";

pub const DEFAULT_BIND: &str = "0.0.0.0:8080";
pub const DEFAULT_STATION_NAME: &str = "station";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StationConfig {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestConfig {
    pub encoding: Option<Encoding>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalendarConfig {
    pub week_start: Option<WeekStart>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HttpConfig {
    pub bind: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub station: Option<StationConfig>,
    pub ingest: Option<IngestConfig>,
    pub calendar: Option<CalendarConfig>,
    pub http: Option<HttpConfig>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppConfig {
    /// Load configuration from the `SITEWX_CONFIG` path (TOML) if present,
    /// with defaults for everything missing
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| "config.toml".to_string());
        Self::load_from(path)
    }

    /// A missing file is not an error and yields the defaults
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(AppConfig::default());
        }
        let s = fs::read_to_string(path)?;
        Ok(toml::from_str::<AppConfig>(&s)?)
    }

    /// HTTP bind address (default 0.0.0.0:8080)
    pub fn http_bind(&self) -> String {
        self.http
            .as_ref()
            .and_then(|h| h.bind.clone())
            .unwrap_or_else(|| DEFAULT_BIND.to_string())
    }

    /// Encoding of uploaded exports (default UTF-16LE)
    pub fn encoding(&self) -> Encoding {
        self.ingest
            .as_ref()
            .and_then(|i| i.encoding)
            .unwrap_or_default()
    }

    pub fn week_start(&self) -> WeekStart {
        self.calendar
            .as_ref()
            .and_then(|c| c.week_start)
            .unwrap_or_default()
    }

    pub fn station_name(&self) -> &str {
        self.station
            .as_ref()
            .and_then(|s| s.name.as_deref())
            .unwrap_or(DEFAULT_STATION_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.http_bind(), "0.0.0.0:8080");
        assert_eq!(cfg.encoding(), Encoding::Utf16Le);
        assert_eq!(cfg.week_start(), WeekStart::Sunday);
        assert_eq!(cfg.station_name(), "station");
    }

    #[test]
    fn parses_all_sections() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [station]
            name = "greenhouse"

            [ingest]
            encoding = "utf-8"

            [calendar]
            week_start = "monday"

            [http]
            bind = "127.0.0.1:9000"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.station_name(), "greenhouse");
        assert_eq!(cfg.encoding(), Encoding::Utf8);
        assert_eq!(cfg.week_start(), WeekStart::Monday);
        assert_eq!(cfg.http_bind(), "127.0.0.1:9000");
    }

    #[test]
    fn partial_sections_fall_back() {
        let cfg: AppConfig = toml::from_str("[calendar]\n").unwrap();
        assert_eq!(cfg.week_start(), WeekStart::Sunday);
        assert_eq!(cfg.http_bind(), DEFAULT_BIND);
    }

    #[test]
    fn rejects_unknown_encoding() {
        let err = toml::from_str::<AppConfig>("[ingest]\nencoding = \"latin-1\"\n").unwrap_err();
        assert!(err.to_string().contains("latin-1"));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[ingest]\nencoding = \"auto\"").unwrap();

        let cfg = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(cfg.encoding(), Encoding::Auto);
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = AppConfig::load_from(dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.http_bind(), DEFAULT_BIND);
    }

    #[test]
    fn invalid_toml_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[http\nbind = ").unwrap();
        assert!(matches!(
            AppConfig::load_from(file.path()),
            Err(ConfigError::Toml(_))
        ));
    }
}
