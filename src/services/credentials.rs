//! 登录凭据校验
//!
//! 凭据文件为 TOML：
//!
//! ```toml
//! [passwords]
//! analyst = "secret"
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::error::{AppError, AppResult};

#[derive(Debug, Default, Deserialize)]
struct CredentialsFile {
    #[serde(default)]
    passwords: HashMap<String, String>,
}

/// 凭据表
#[derive(Debug, Default)]
pub struct CredentialStore {
    passwords: HashMap<String, String>,
}

impl CredentialStore {
    /// 从 TOML 文件加载
    pub async fn load(path: &Path) -> AppResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
        Self::from_toml(&content)
            .map_err(|e| AppError::toml_parse_failed(path.display().to_string(), e))
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        let file: CredentialsFile = toml::from_str(content)?;
        Ok(Self {
            passwords: file.passwords,
        })
    }

    /// 校验用户名和密码
    pub fn check(&self, username: &str, password: &str) -> bool {
        match self.passwords.get(username) {
            Some(expected) => expected == password,
            None => {
                warn!("❌ 用户名不存在: {}", username);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRETS: &str = r#"
[passwords]
analyst = "hunter2"
"#;

    #[test]
    fn test_check() {
        let store = CredentialStore::from_toml(SECRETS).unwrap();
        assert!(store.check("analyst", "hunter2"));
        assert!(!store.check("analyst", "wrong"));
        assert!(!store.check("stranger", "hunter2"));
    }

    #[test]
    fn test_missing_table_rejects_everyone() {
        let store = CredentialStore::from_toml("").unwrap();
        assert!(!store.check("analyst", ""));
    }

    #[tokio::test]
    async fn test_load_reports_bad_toml() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("secrets.toml");
        std::fs::write(&path, "[passwords\n").unwrap();

        let err = CredentialStore::load(&path).await.unwrap_err();
        assert!(matches!(err, AppError::File(_)));
    }
}
