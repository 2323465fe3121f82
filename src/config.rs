use std::{
    env,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::{Context, Result};
use config::{Config as config_config, File as config_file};
use serde::{Deserialize, Serialize};

const CONFIG_PATH: &str = "app.json";

const DEFAULT_POSTGRESQL_PORT: i32 = 5432;
const DEFAULT_HTTP_PORT: u16 = 8080;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct App {
    #[serde(default)]
    pub postgresql: PostgreSQL,
    #[serde(default)]
    pub system: System,
}

const POSTGRES_URL: &str = "POSTGRES_URL";
const POSTGRESQL_HOST: &str = "POSTGRESQL_HOST";
const POSTGRESQL_PORT: &str = "POSTGRESQL_PORT";
const POSTGRESQL_USER: &str = "POSTGRESQL_USER";
const POSTGRESQL_PASSWORD: &str = "POSTGRESQL_PASSWORD";
const POSTGRESQL_DB: &str = "POSTGRESQL_DB";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PostgreSQL {
    /// 完整的連線字串，有值時優先於下列個別欄位
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub host: String,
    #[serde(default = "default_postgresql_port")]
    pub port: i32,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub db: String,
}

impl Default for PostgreSQL {
    fn default() -> Self {
        PostgreSQL {
            url: String::new(),
            host: "localhost".to_string(),
            port: DEFAULT_POSTGRESQL_PORT,
            user: String::new(),
            password: String::new(),
            db: String::new(),
        }
    }
}

impl PostgreSQL {
    /// 回傳連線字串
    pub fn connection_url(&self) -> String {
        if !self.url.is_empty() {
            return self.url.clone();
        }

        format!(
            "postgres://{}:{}@{}:{}/{}?application_name=stock_api",
            self.user, self.password, self.host, self.port, self.db
        )
    }
}

const SYSTEM_HTTP_PORT: &str = "SYSTEM_HTTP_PORT";
const SYSTEM_REQUEST_TIMEOUT_SECS: &str = "SYSTEM_REQUEST_TIMEOUT_SECS";
const SYSTEM_CORS_ORIGINS: &str = "SYSTEM_CORS_ORIGINS";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct System {
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// 每個 request 的處理時間上限（秒）
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// 允許的跨域來源，空的代表不限制
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for System {
    fn default() -> Self {
        System {
            http_port: DEFAULT_HTTP_PORT,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            cors_origins: Vec::new(),
        }
    }
}

fn default_postgresql_port() -> i32 {
    DEFAULT_POSTGRESQL_PORT
}

fn default_http_port() -> u16 {
    DEFAULT_HTTP_PORT
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl App {
    /// 讀取 `app.json`（不存在時使用預設值）並套用 env 的設定值
    ///
    /// # Errors
    /// 當設定檔格式錯誤時回傳錯誤。
    pub fn load() -> Result<Self> {
        let config_path = config_path();
        if config_path.exists() {
            return Ok(Self::from_path(&config_path)?.override_with_env());
        }

        Ok(App::default().override_with_env())
    }

    fn from_path(path: &Path) -> Result<Self> {
        let config: App = config_config::builder()
            .add_source(config_file::from(path))
            .build()
            .with_context(|| format!("Failed to read config file {}", path.display()))?
            .try_deserialize()
            .with_context(|| format!("Failed to deserialize config file {}", path.display()))?;

        Ok(config)
    }

    /// 將來至於 env 的設定值覆蓋掉 json 上的設定值
    fn override_with_env(self) -> Self {
        self.override_with(|key| env::var(key).ok())
    }

    fn override_with<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(POSTGRES_URL) {
            self.postgresql.url = url;
        }

        if let Some(host) = lookup(POSTGRESQL_HOST) {
            self.postgresql.host = host;
        }

        if let Some(port) = lookup(POSTGRESQL_PORT) {
            self.postgresql.port = i32::from_str(&port).unwrap_or(DEFAULT_POSTGRESQL_PORT);
        }

        if let Some(user) = lookup(POSTGRESQL_USER) {
            self.postgresql.user = user;
        }

        if let Some(password) = lookup(POSTGRESQL_PASSWORD) {
            self.postgresql.password = password;
        }

        if let Some(db) = lookup(POSTGRESQL_DB) {
            self.postgresql.db = db;
        }

        if let Some(port) = lookup(SYSTEM_HTTP_PORT) {
            self.system.http_port = port.parse::<u16>().unwrap_or(DEFAULT_HTTP_PORT);
        }

        if let Some(secs) = lookup(SYSTEM_REQUEST_TIMEOUT_SECS) {
            self.system.request_timeout_secs = secs
                .parse::<u64>()
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        }

        // 0 秒會讓每個 request 立即逾時
        if self.system.request_timeout_secs == 0 {
            self.system.request_timeout_secs = DEFAULT_REQUEST_TIMEOUT_SECS;
        }

        if let Some(origins) = lookup(SYSTEM_CORS_ORIGINS) {
            self.system.cors_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect();
        }

        self
    }
}

/// 回傳設定檔的路徑
fn config_path() -> PathBuf {
    PathBuf::from(CONFIG_PATH)
}
