use std::error::Error as _;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use futures_util::StreamExt;
use log::{debug, info, warn};
use reqwest::Client;
use reqwest::header::CONTENT_LENGTH;
use reqwest::multipart::{Form, Part};
use thiserror::Error;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::util::format_speed;

#[cfg(test)]
pub(crate) mod test_server;

const USER_AGENT: &str = concat!("stlauncher/", env!("CARGO_PKG_VERSION"));
const PROGRESS_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{0}")]
    Transport(String),
    #[error("unable to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Could not open log file {}: {source}", path.display())]
    ReadLog {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("download incomplete: received {downloaded} of {total} bytes")]
    Incomplete { downloaded: u64, total: u64 },
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        // reqwest keeps the interesting part (DNS, TLS, refused...) in the source chain.
        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            let text = cause.to_string();
            if !message.contains(&text) {
                message.push_str(": ");
                message.push_str(&text);
            }
            source = cause.source();
        }
        FetchError::Transport(message)
    }
}

/// Outcome of a finished transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransferSummary {
    pub downloaded: u64,
    /// Total size as announced by the server, when it told us.
    pub total: Option<u64>,
}

#[derive(Clone)]
pub struct NetworkClient {
    client: Client,
}

impl NetworkClient {
    pub fn new(insecure_tls: bool) -> Self {
        let mut builder = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(15))
            .read_timeout(Duration::from_secs(60));
        if insecure_tls {
            warn!("network client: TLS certificate validation is DISABLED");
            builder = builder.danger_accept_invalid_certs(true);
        }
        let client = builder.build().unwrap_or_else(|err| {
            warn!("network client: falling back to default HTTP client configuration ({err})");
            Client::new()
        });
        Self { client }
    }

    /// Fetch the remote version list into `dest`, replacing any previous copy.
    pub async fn fetch_catalog<F>(
        &self,
        url: &str,
        dest: &Path,
        progress: F,
    ) -> Result<TransferSummary, FetchError>
    where
        F: FnMut(u64, Option<u64>, &str),
    {
        info!("fetch_catalog: {url} -> {}", dest.display());
        let summary = self.download_to_path(url, dest, progress).await?;
        debug!("fetch_catalog: received {} bytes", summary.downloaded);
        Ok(summary)
    }

    /// Download a file to `dest`, calling `progress` with (downloaded, total, speed_text).
    ///
    /// The total comes from a HEAD probe first; if the probe fails the transfer still
    /// runs with an unknown total. A partially written file is left behind on error.
    pub async fn download_to_path<F>(
        &self,
        url: &str,
        dest: &Path,
        mut progress: F,
    ) -> Result<TransferSummary, FetchError>
    where
        F: FnMut(u64, Option<u64>, &str),
    {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| FetchError::Write {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let probed = self.head_content_length(url).await;
        let response = self.client.get(url).send().await?.error_for_status()?;
        let total = probed.or_else(|| response.content_length());
        debug!("download: {url} total={total:?}");

        let mut file = File::create(dest)
            .await
            .map_err(|source| FetchError::Write {
                path: dest.to_path_buf(),
                source,
            })?;

        let mut stream = response.bytes_stream();
        let mut downloaded: u64 = 0;
        let mut last_tick = Instant::now();
        let mut last_bytes = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk)
                .await
                .map_err(|source| FetchError::Write {
                    path: dest.to_path_buf(),
                    source,
                })?;
            downloaded += chunk.len() as u64;

            let since = last_tick.elapsed();
            if since >= PROGRESS_INTERVAL {
                let speed = (downloaded - last_bytes) as f32 / since.as_secs_f32();
                progress(downloaded, total, &format_speed(speed));
                last_tick = Instant::now();
                last_bytes = downloaded;
            }
        }

        file.flush().await.map_err(|source| FetchError::Write {
            path: dest.to_path_buf(),
            source,
        })?;
        drop(file);

        // Final callback.
        progress(downloaded, total, "0 B/s");

        if let Some(total) = total
            && downloaded < total
        {
            return Err(FetchError::Incomplete { downloaded, total });
        }

        info!("download: wrote {downloaded} bytes to {}", dest.display());
        Ok(TransferSummary { downloaded, total })
    }

    /// Upload the console log as the `logs` field of a multipart form.
    pub async fn upload_crash(&self, url: &str, log: &Path) -> Result<(), FetchError> {
        let contents = tokio::fs::read(log)
            .await
            .map_err(|source| FetchError::ReadLog {
                path: log.to_path_buf(),
                source,
            })?;
        info!("upload_crash: sending {} bytes to {url}", contents.len());

        let form = Form::new().part("logs", Part::bytes(contents).file_name("data"));
        self.client
            .post(url)
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .multipart(form)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn head_content_length(&self, url: &str) -> Option<u64> {
        let resp = match self.client.head(url).send().await {
            Ok(resp) => resp,
            Err(err) => {
                debug!("HEAD {url} failed: {err}");
                return None;
            }
        };
        if !resp.status().is_success() {
            debug!("HEAD {url} returned {}", resp.status());
            return None;
        }
        // `Response::content_length` reports the (empty) HEAD body, so read the header.
        resp.headers()
            .get(CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::test_server::{HeadReply, StubServer};
    use super::*;

    #[tokio::test]
    async fn downloads_with_probed_total() {
        let body = vec![7u8; 4096];
        let server = StubServer::start(body.clone(), HeadReply::Length).await;
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("a").join("b").join("supertux.AppImage");
        let mut reports = Vec::new();

        let summary = NetworkClient::new(false)
            .download_to_path(&server.url("/supertux.AppImage"), &dest, |done, total, _| {
                reports.push((done, total))
            })
            .await
            .unwrap();

        assert_eq!(
            summary,
            TransferSummary {
                downloaded: 4096,
                total: Some(4096)
            }
        );
        assert_eq!(reports.last(), Some(&(4096, Some(4096))));
        assert_eq!(std::fs::read(&dest).unwrap(), body);
    }

    #[tokio::test]
    async fn failed_probe_still_completes_with_unknown_total() {
        let body = b"# Stable\nv1: https://example.org/v1\n".to_vec();
        let server = StubServer::start(body.clone(), HeadReply::Reject).await;
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("versions.txt");

        let summary = NetworkClient::new(false)
            .fetch_catalog(&server.url("/versions/x64-linux"), &dest, |_, _, _| {})
            .await
            .unwrap();

        assert_eq!(summary.downloaded, body.len() as u64);
        assert_eq!(summary.total, None);
        assert_eq!(std::fs::read(&dest).unwrap(), body);
    }

    #[tokio::test]
    async fn overwrites_existing_destination() {
        let server = StubServer::start(b"new".to_vec(), HeadReply::Length).await;
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("versions.txt");
        std::fs::write(&dest, b"old contents that are longer").unwrap();

        NetworkClient::new(false)
            .fetch_catalog(&server.url("/v"), &dest, |_, _, _| {})
            .await
            .unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"new");
    }

    #[tokio::test]
    async fn http_error_status_is_reported() {
        let server = StubServer::start(Vec::new(), HeadReply::Length).await;
        let dir = tempfile::tempdir().unwrap();

        let err = NetworkClient::new(false)
            .download_to_path(&server.url("/missing"), &dir.path().join("x"), |_, _, _| {})
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Transport(_)));
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn connection_failure_is_a_transport_error() {
        let url = test_server::unreachable_url().await;
        let dir = tempfile::tempdir().unwrap();

        let err = NetworkClient::new(false)
            .download_to_path(&url, &dir.path().join("x"), |_, _, _| {})
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Transport(_)));
        assert!(!err.to_string().is_empty());
    }

    #[tokio::test]
    async fn uploads_log_as_logs_field() {
        let server = StubServer::start(Vec::new(), HeadReply::Length).await;
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("console.log");
        std::fs::write(&log, b"segfault in sector 7").unwrap();

        NetworkClient::new(false)
            .upload_crash(&server.url("/upload_crash"), &log)
            .await
            .unwrap();

        let posted = String::from_utf8_lossy(&server.last_post().await).into_owned();
        assert!(posted.contains("name=\"logs\""));
        assert!(posted.contains("filename=\"data\""));
        assert!(posted.contains("segfault in sector 7"));
    }

    #[tokio::test]
    async fn missing_log_is_reported_before_any_request() {
        let dir = tempfile::tempdir().unwrap();
        let err = NetworkClient::new(false)
            .upload_crash("http://127.0.0.1:1/upload", &dir.path().join("none.log"))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::ReadLog { .. }));
    }
}
