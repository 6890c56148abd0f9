use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default file name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "jsonver.yml";

pub const SAMPLE_CONFIG: &str = r#"hostname: "0.0.0.0"
port: 8080
apiVersion: "v1"
jsonDatabaseName: "database.json"
publicFolderName: "public"
uploadsFolderName: "uploads"
requiresAuthorization: true
jwtSecret: "MY_JWT_SECRET"
jwtExpirationTime: 300 # 5 minutes
adminUsername: "admin"
adminPassword: "password"
resources:
  - name: "posts"
  - name: "comments"
"#;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// On-disk YAML shape
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFile {
    #[serde(default = "default_hostname")]
    pub hostname: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub api_version: Option<String>,
    pub json_database_name: String,
    #[serde(default)]
    pub public_folder_name: Option<String>,
    #[serde(default)]
    pub uploads_folder_name: Option<String>,
    #[serde(default)]
    pub requires_authorization: bool,
    #[serde(default)]
    pub jwt_secret: Option<String>,
    #[serde(default)]
    pub jwt_expiration_time: Option<u64>,
    #[serde(default)]
    pub admin_username: Option<String>,
    #[serde(default)]
    pub admin_password: Option<String>,
    #[serde(default)]
    pub conventional_status_codes: bool,
    pub resources: Vec<ResourceDecl>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDecl {
    pub name: String,
}

fn default_hostname() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

const DEFAULT_JWT_EXPIRATION_SECS: u64 = 300;

/// Immutable runtime configuration, built once before the server starts
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    /// Present only when authorization is required
    pub auth: Option<AuthConfig>,
    pub api_version: Option<String>,
    /// Report not-found as 404 on every path instead of the legacy 200/500 split
    pub conventional_status_codes: bool,
    /// Declared resource names, in declaration order
    pub resources: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub hostname: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub database_path: PathBuf,
    pub public_dir: Option<PathBuf>,
    pub uploads_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_secs: u64,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
}

impl AppConfig {
    /// Read and validate the YAML file at `path`, then apply environment overrides.
    /// Relative folder and database names resolve against the file's directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        Self::from_yaml(&text, base_dir)?.with_env_overrides()
    }

    pub fn from_yaml(text: &str, base_dir: &Path) -> Result<Self, ConfigError> {
        let file: ConfigFile = serde_yaml::from_str(text)?;
        Self::from_file(file, base_dir)
    }

    pub fn from_file(file: ConfigFile, base_dir: &Path) -> Result<Self, ConfigError> {
        let resources: Vec<String> = file.resources.into_iter().map(|r| r.name).collect();
        validate_resources(&resources)?;

        let api_version = file.api_version.filter(|v| !v.trim().is_empty());
        if let Some(v) = &api_version {
            if v.contains('/') {
                return Err(ConfigError::Invalid(format!(
                    "apiVersion '{}' must be a single path segment",
                    v
                )));
            }
        }

        if file.json_database_name.trim().is_empty() {
            return Err(ConfigError::Invalid("jsonDatabaseName must not be empty".into()));
        }

        let auth = if file.requires_authorization {
            let jwt_secret = file.jwt_secret.unwrap_or_default();
            if jwt_secret.is_empty() {
                return Err(ConfigError::Invalid(
                    "jwtSecret is required when requiresAuthorization is true".into(),
                ));
            }
            Some(AuthConfig {
                jwt_secret,
                jwt_expiration_secs: file
                    .jwt_expiration_time
                    .unwrap_or(DEFAULT_JWT_EXPIRATION_SECS),
                admin_username: file.admin_username,
                admin_password: file.admin_password,
            })
        } else {
            None
        };

        Ok(Self {
            server: ServerConfig {
                hostname: file.hostname,
                port: file.port,
            },
            storage: StorageConfig {
                database_path: base_dir.join(&file.json_database_name),
                public_dir: file.public_folder_name.map(|n| base_dir.join(n)),
                uploads_dir: file.uploads_folder_name.map(|n| base_dir.join(n)),
            },
            auth,
            api_version,
            conventional_status_codes: file.conventional_status_codes,
            resources,
        })
    }

    fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        if let Some(v) = lookup("JSONVER_HOSTNAME") {
            self.server.hostname = v;
        }
        if let Some(v) = lookup("JSONVER_PORT") {
            self.server.port = v
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("JSONVER_PORT '{}' is not a valid port", v)))?;
        }
        if let (Some(v), Some(auth)) = (lookup("JSONVER_JWT_SECRET"), self.auth.as_mut()) {
            if !v.is_empty() {
                auth.jwt_secret = v;
            }
        }
        Ok(self)
    }

    pub fn requires_authorization(&self) -> bool {
        self.auth.is_some()
    }

    /// Path prefix the resource routes are mounted under
    pub fn api_prefix(&self) -> String {
        match &self.api_version {
            Some(v) => format!("/api/{}", v),
            None => "/api".to_string(),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.hostname, self.server.port)
    }

    /// Admin identity to seed into a fresh document, when fully configured
    pub fn admin_credentials(&self) -> Option<(&str, &str)> {
        let auth = self.auth.as_ref()?;
        match (&auth.admin_username, &auth.admin_password) {
            (Some(user), Some(pass)) if !user.is_empty() => Some((user.as_str(), pass.as_str())),
            _ => None,
        }
    }
}

fn validate_resources(names: &[String]) -> Result<(), ConfigError> {
    if names.is_empty() {
        return Err(ConfigError::Invalid("at least one resource must be declared".into()));
    }

    let mut seen = HashSet::new();
    for name in names {
        // Names become literal path segments; route syntax like `:` or `*` must not leak in
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '~' | '-'));
        if !valid {
            return Err(ConfigError::Invalid(format!("invalid resource name '{}'", name)));
        }
        if !seen.insert(name.as_str()) {
            return Err(ConfigError::Invalid(format!("duplicate resource name '{}'", name)));
        }
    }
    Ok(())
}
