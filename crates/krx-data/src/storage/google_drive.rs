//! Google Drive 저장소.
//!
//! Drive v3 REST API를 사용합니다. 인증은 외부에서 발급한 OAuth 액세스 토큰을
//! 그대로 사용하며, 토큰 갱신은 하지 않습니다.
//!
//! 키 `a/b/c.json`은 루트 폴더 아래 `a` → `b` 폴더의 `c.json` 파일에 대응합니다.
//! 쓰기 시 없는 폴더는 생성하고, 이미 있는 파일은 내용만 교체합니다.
//! 새로 만든 파일의 업로드가 실패하면 그 파일을 삭제합니다.

use async_trait::async_trait;
use krx_core::{DriveConfig, PersistenceError, StoragePort};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{persistence_error, status_error, DataError, Result};

const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
}

/// Google Drive 저장소 어댑터.
pub struct GoogleDriveAdapter {
    client: reqwest::Client,
    token: SecretString,
    root_folder_id: String,
    api_base_url: String,
    upload_base_url: String,
    /// 폴더 경로 → 폴더 ID
    folder_cache: Mutex<HashMap<String, String>>,
}

impl GoogleDriveAdapter {
    /// 설정으로 새 어댑터를 생성합니다.
    ///
    /// 액세스 토큰이 없으면 `DataError::ConfigError`.
    pub fn new(config: &DriveConfig) -> Result<Self> {
        let token = config.token().ok_or_else(|| {
            DataError::ConfigError("Google Drive 액세스 토큰이 설정되지 않았습니다".to_string())
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            token,
            root_folder_id: config.root_folder_id.clone(),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            upload_base_url: config.upload_base_url.trim_end_matches('/').to_string(),
            folder_cache: Mutex::new(HashMap::new()),
        })
    }

    /// 부모 폴더 아래에서 이름으로 항목을 찾습니다.
    async fn find_child(
        &self,
        parent_id: &str,
        name: &str,
        folder_only: bool,
    ) -> std::result::Result<Option<String>, PersistenceError> {
        let mut query = format!(
            "name = '{}' and '{}' in parents and trashed = false",
            escape_query(name),
            escape_query(parent_id)
        );
        if folder_only {
            query.push_str(&format!(" and mimeType = '{}'", FOLDER_MIME_TYPE));
        }

        let response = self
            .client
            .get(format!("{}/files", self.api_base_url))
            .bearer_auth(self.token.expose_secret())
            .query(&[("q", query.as_str()), ("fields", "files(id)")])
            .send()
            .await
            .map_err(|e| persistence_error("Drive 파일 검색 실패", e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| persistence_error("Drive 응답 읽기 실패", e))?;
        if !status.is_success() {
            return Err(status_error("Drive 파일 검색", status, &body));
        }

        let list: FileList = serde_json::from_str(&body)
            .map_err(|e| PersistenceError::Api(format!("Drive 응답 파싱 실패: {}", e)))?;

        Ok(list.files.into_iter().next().map(|f| f.id))
    }

    /// 메타데이터만으로 파일/폴더를 생성하고 ID를 반환합니다.
    async fn create_entry(
        &self,
        parent_id: &str,
        name: &str,
        mime_type: Option<&str>,
    ) -> std::result::Result<String, PersistenceError> {
        let mut metadata = json!({
            "name": name,
            "parents": [parent_id],
        });
        if let Some(mime_type) = mime_type {
            metadata["mimeType"] = json!(mime_type);
        }

        let response = self
            .client
            .post(format!("{}/files", self.api_base_url))
            .bearer_auth(self.token.expose_secret())
            .query(&[("fields", "id")])
            .json(&metadata)
            .send()
            .await
            .map_err(|e| persistence_error("Drive 생성 요청 실패", e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| persistence_error("Drive 응답 읽기 실패", e))?;
        if !status.is_success() {
            return Err(status_error("Drive 생성", status, &body));
        }

        let file: DriveFile = serde_json::from_str(&body)
            .map_err(|e| PersistenceError::Api(format!("Drive 응답 파싱 실패: {}", e)))?;
        Ok(file.id)
    }

    /// 폴더 경로를 ID로 변환합니다. `create`이면 없는 폴더를 만듭니다.
    async fn resolve_folder(
        &self,
        folders: &[&str],
        create: bool,
    ) -> std::result::Result<Option<String>, PersistenceError> {
        let mut parent_id = self.root_folder_id.clone();
        let mut path = String::new();

        for folder in folders {
            if !path.is_empty() {
                path.push('/');
            }
            path.push_str(folder);

            let cached = self.cached_folder(&path);
            let folder_id = match cached {
                Some(id) => id,
                None => match self.find_child(&parent_id, folder, true).await? {
                    Some(id) => id,
                    None if create => {
                        let id = self
                            .create_entry(&parent_id, folder, Some(FOLDER_MIME_TYPE))
                            .await?;
                        info!(folder = %path, "Drive 폴더 생성");
                        id
                    }
                    None => return Ok(None),
                },
            };

            self.cache_folder(&path, &folder_id);
            parent_id = folder_id;
        }

        Ok(Some(parent_id))
    }

    fn cached_folder(&self, path: &str) -> Option<String> {
        self.folder_cache
            .lock()
            .ok()
            .and_then(|cache| cache.get(path).cloned())
    }

    fn cache_folder(&self, path: &str, id: &str) {
        if let Ok(mut cache) = self.folder_cache.lock() {
            cache.insert(path.to_string(), id.to_string());
        }
    }

    /// 파일 내용을 교체합니다.
    async fn upload_media(
        &self,
        file_id: &str,
        content: &[u8],
    ) -> std::result::Result<(), PersistenceError> {
        let response = self
            .client
            .patch(format!("{}/files/{}", self.upload_base_url, file_id))
            .bearer_auth(self.token.expose_secret())
            .query(&[("uploadType", "media")])
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(content.to_vec())
            .send()
            .await
            .map_err(|e| persistence_error("Drive 업로드 실패", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error("Drive 업로드", status, &body));
        }
        Ok(())
    }

    async fn delete_entry(&self, file_id: &str) -> std::result::Result<(), PersistenceError> {
        let response = self
            .client
            .delete(format!("{}/files/{}", self.api_base_url, file_id))
            .bearer_auth(self.token.expose_secret())
            .send()
            .await
            .map_err(|e| persistence_error("Drive 삭제 요청 실패", e))?;

        let status = response.status();
        if !status.is_success() && status != reqwest::StatusCode::NOT_FOUND {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error("Drive 삭제", status, &body));
        }
        Ok(())
    }
}

/// 키를 (폴더 목록, 파일명)으로 나눕니다.
fn split_key(key: &str) -> std::result::Result<(Vec<&str>, &str), PersistenceError> {
    let segments: Vec<&str> = key.trim_matches('/').split('/').collect();
    if segments
        .iter()
        .any(|s| s.is_empty() || *s == "." || *s == "..")
    {
        return Err(PersistenceError::InvalidKey(key.to_string()));
    }

    match segments.split_last() {
        Some((file_name, folders)) => Ok((folders.to_vec(), *file_name)),
        None => Err(PersistenceError::InvalidKey(key.to_string())),
    }
}

/// Drive 검색 쿼리 문자열 이스케이프.
fn escape_query(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[async_trait]
impl StoragePort for GoogleDriveAdapter {
    fn name(&self) -> &str {
        "drive"
    }

    async fn write(&self, key: &str, content: &[u8]) -> std::result::Result<(), PersistenceError> {
        let (folders, file_name) = split_key(key)?;

        let parent_id = self
            .resolve_folder(&folders, true)
            .await?
            .ok_or_else(|| PersistenceError::Api(format!("폴더를 만들 수 없습니다: {}", key)))?;

        let (file_id, created) = match self.find_child(&parent_id, file_name, false).await? {
            Some(id) => (id, false),
            None => (self.create_entry(&parent_id, file_name, None).await?, true),
        };

        if let Err(e) = self.upload_media(&file_id, content).await {
            // 이번 쓰기에서 만든 파일은 빈 채로 남기지 않음
            if created {
                if let Err(cleanup) = self.delete_entry(&file_id).await {
                    warn!(key, error = %cleanup, "빈 Drive 파일 삭제 실패");
                }
            }
            return Err(e);
        }

        debug!(key, bytes = content.len(), "Drive 저장 완료");
        Ok(())
    }

    async fn read(&self, key: &str) -> std::result::Result<Option<Vec<u8>>, PersistenceError> {
        let (folders, file_name) = split_key(key)?;

        let Some(parent_id) = self.resolve_folder(&folders, false).await? else {
            return Ok(None);
        };
        let Some(file_id) = self.find_child(&parent_id, file_name, false).await? else {
            return Ok(None);
        };

        let response = self
            .client
            .get(format!("{}/files/{}", self.api_base_url, file_id))
            .bearer_auth(self.token.expose_secret())
            .query(&[("alt", "media")])
            .send()
            .await
            .map_err(|e| persistence_error("Drive 다운로드 실패", e))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error("Drive 다운로드", status, &body));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| persistence_error("Drive 다운로드 읽기 실패", e))?;

        debug!(key, bytes = bytes.len(), "Drive 읽기 완료");
        Ok(Some(bytes.to_vec()))
    }
}
