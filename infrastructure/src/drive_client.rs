use crate::config::Config;
use crate::oauth::AccessToken;
use domain::errors::RagError;
use domain::models::{DownloadedContent, RemoteFile};
use domain::ports::StorageProvider;
use domain::session::AccountInfo;
use reqwest::{Client, Response};
use serde::Deserialize;
use shared::utils::{is_google_native, CSV, GOOGLE_SPREADSHEET, PLAIN_TEXT};
use std::sync::Arc;

#[derive(Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<RemoteFile>,
}

#[derive(Deserialize)]
struct About {
    user: Option<DriveUser>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveUser {
    display_name: Option<String>,
    email_address: Option<String>,
}

pub fn export_mime_type(mime_type: &str) -> &'static str {
    match mime_type {
        // Sheets have no plain-text export.
        GOOGLE_SPREADSHEET => CSV,
        _ => PLAIN_TEXT,
    }
}

#[derive(Clone)]
pub struct DriveClient {
    client: Arc<Client>,
    base_url: String,
    token: AccessToken,
    page_size: u32,
}

impl DriveClient {
    pub fn new(config: &Config, token: AccessToken) -> Self {
        Self {
            client: Arc::new(Client::new()),
            base_url: config.drive_base_url.trim_end_matches('/').to_string(),
            token,
            page_size: config.drive_page_size,
        }
    }

    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<Response, RagError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(self.token.secret())
            .query(query)
            .send()
            .await
            .map_err(|e| RagError::Storage(e.to_string()))?;
        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(RagError::Authentication(
                "Drive rejected the access token".to_string(),
            ));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RagError::Storage(format!("Drive API error {status}: {body}")));
        }
        Ok(response)
    }

    pub async fn list_files(&self) -> Result<Vec<RemoteFile>, RagError> {
        let url = format!("{}/files", self.base_url);
        let page_size = self.page_size.to_string();
        let response = self
            .get(
                &url,
                &[
                    ("pageSize", page_size.as_str()),
                    ("fields", "files(id, name, mimeType)"),
                    ("q", "trashed=false"),
                ],
            )
            .await?;
        let list: FileList = response
            .json()
            .await
            .map_err(|e| RagError::Storage(e.to_string()))?;
        Ok(list.files)
    }

    pub async fn download(&self, file: &RemoteFile) -> Result<DownloadedContent, RagError> {
        let (response, mime_type) = if is_google_native(&file.mime_type) {
            let export_as = export_mime_type(&file.mime_type);
            let url = format!("{}/files/{}/export", self.base_url, file.id);
            (self.get(&url, &[("mimeType", export_as)]).await?, export_as.to_string())
        } else {
            let url = format!("{}/files/{}", self.base_url, file.id);
            (self.get(&url, &[("alt", "media")]).await?, file.mime_type.clone())
        };
        let bytes = response
            .bytes()
            .await
            .map_err(|e| RagError::Storage(e.to_string()))?;
        Ok(DownloadedContent {
            mime_type,
            bytes: bytes.to_vec(),
        })
    }

    pub async fn account_info(&self) -> Result<AccountInfo, RagError> {
        let url = format!("{}/about", self.base_url);
        let about: About = self
            .get(&url, &[("fields", "user")])
            .await?
            .json()
            .await
            .map_err(|e| RagError::Storage(e.to_string()))?;
        let unknown = AccountInfo::unknown();
        let user = about.user;
        Ok(AccountInfo {
            name: user
                .as_ref()
                .and_then(|u| u.display_name.clone())
                .unwrap_or(unknown.name),
            email: user
                .and_then(|u| u.email_address)
                .unwrap_or(unknown.email),
        })
    }
}

impl StorageProvider for DriveClient {
    async fn list_files(&self) -> Result<Vec<RemoteFile>, RagError> {
        DriveClient::list_files(self).await
    }

    async fn download(&self, file: &RemoteFile) -> Result<DownloadedContent, RagError> {
        DriveClient::download(self, file).await
    }

    async fn account_info(&self) -> Result<AccountInfo, RagError> {
        DriveClient::account_info(self).await
    }
}
