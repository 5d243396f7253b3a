use std::path::{Path, PathBuf};

use common::FileRecord;
use futures::StreamExt;
use reqwest::Url;
use reqwest::multipart::{Form, Part};
use tokio::io::AsyncWriteExt;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("invalid server url: {0}")]
    InvalidUrl(String),
}

/// The server's answer to an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReply {
    pub status: u16,
    pub message: String,
}

/// HTTP client for the file server endpoints.
#[derive(Debug, Clone)]
pub struct FileClient {
    http: reqwest::Client,
    base: Url,
}

impl FileClient {
    pub fn new(server: &str) -> Result<Self, ClientError> {
        let mut base =
            Url::parse(server).map_err(|e| ClientError::InvalidUrl(format!("{server}: {e}")))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl(format!(
                "{server}: expected an http or https url"
            )));
        }
        // Relative joins below replace the last segment unless it ends in '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self {
            http: reqwest::Client::new(),
            base,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base
            .join(path)
            .map_err(|e| ClientError::InvalidUrl(format!("{path}: {e}")))
    }

    /// Query `/fileSearch`.
    ///
    /// The body is decoded whatever the status; the server answers every
    /// failure with an empty list.
    pub async fn search(&self, query: &str) -> Result<Vec<FileRecord>, ClientError> {
        let res = self
            .http
            .get(self.endpoint("fileSearch")?)
            .query(&[("q", query)])
            .send()
            .await?;

        if !res.status().is_success() {
            tracing::debug!(status = %res.status(), query, "Search returned an error status");
        }

        Ok(res.json().await?)
    }

    /// Download a record into `dir`, named after the last component of its
    /// original filename. Returns the written path.
    pub async fn download(&self, record: &FileRecord, dir: &Path) -> Result<PathBuf, ClientError> {
        let name = Path::new(&record.filename).file_name().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("'{}' has no file name", record.filename),
            )
        })?;
        let target = dir.join(name);

        let mut url = self.endpoint("download/")?;
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(record.path.split('/'));

        let res = self.http.get(url).send().await?.error_for_status()?;

        tokio::fs::create_dir_all(dir).await?;
        let mut file = tokio::fs::File::create(&target).await?;
        let mut body = res.bytes_stream();
        while let Some(chunk) = body.next().await {
            file.write_all(&chunk?).await?;
        }
        file.flush().await?;

        tracing::debug!(path = %target.display(), "Saved download");
        Ok(target)
    }

    /// Upload a local file as the `file` field of a multipart form.
    pub async fn upload(&self, path: &Path) -> Result<UploadReply, ClientError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("'{}' is not a file path", path.display()),
                )
            })?;
        let data = tokio::fs::read(path).await?;

        // The server stores the filename as sent, so it goes out unencoded.
        let form = Form::new()
            .percent_encode_noop()
            .part("file", Part::bytes(data).file_name(name));
        let res = self
            .http
            .post(self.endpoint("upload")?)
            .multipart(form)
            .send()
            .await?;

        Ok(UploadReply {
            status: res.status().as_u16(),
            message: res.text().await?,
        })
    }
}
