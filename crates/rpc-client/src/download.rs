//! Saving exported artifacts to disk.
//!
//! The body is written into a temporary file next to the destination and
//! only renamed into place once complete, so a failed download never leaves
//! a truncated file behind.  The temporary file is removed on every path.

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tm_domain::error::{Error, Result};
use tm_domain::trace::TraceEvent;

use crate::client::{from_reqwest, RpcClient};

const FALLBACK_NAME: &str = "download.bin";

/// Something that can save a remote file locally.
#[async_trait]
pub trait Downloader: Send + Sync {
    async fn download(
        &self,
        url: &str,
        dest_dir: &Path,
        filename: Option<&str>,
    ) -> Result<PathBuf>;
}

#[async_trait]
impl Downloader for RpcClient {
    async fn download(
        &self,
        url: &str,
        dest_dir: &Path,
        filename: Option<&str>,
    ) -> Result<PathBuf> {
        self.download_file(url, dest_dir, filename).await
    }
}

impl RpcClient {
    /// Fetch `url` and save it as `dest_dir/filename`.
    ///
    /// `filename` is reduced to its final path component; when omitted it is
    /// taken from the URL.  The transfer, body included, is bounded by the
    /// call timeout.  Returns the path written.
    pub async fn download_file(
        &self,
        url: &str,
        dest_dir: &Path,
        filename: Option<&str>,
    ) -> Result<PathBuf> {
        let name = match filename {
            Some(name) => sanitize_filename(name)?,
            None => filename_from_url(url),
        };

        let resp = self
            .decorate(self.http().get(url))
            .timeout(self.call_timeout())
            .send()
            .await
            .map_err(from_reqwest)?;
        if !resp.status().is_success() {
            return Err(Error::Status {
                endpoint: format!("GET {url}"),
                status: resp.status().as_u16(),
            });
        }
        let bytes = resp.bytes().await.map_err(from_reqwest)?;
        let size = bytes.len() as u64;

        let dir = dest_dir.to_path_buf();
        let target = tokio::task::spawn_blocking(move || -> Result<PathBuf> {
            std::fs::create_dir_all(&dir)?;
            let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
            tmp.write_all(&bytes)?;
            tmp.flush()?;
            let target = dir.join(&name);
            tmp.persist(&target).map_err(|e| Error::Io(e.error))?;
            Ok(target)
        })
        .await
        .map_err(|e| Error::Other(format!("download task failed: {e}")))??;

        TraceEvent::FileDownloaded {
            url: url.to_owned(),
            path: target.display().to_string(),
            bytes: size,
        }
        .emit();

        Ok(target)
    }
}

/// Keep only the final component of a caller-supplied name.
fn sanitize_filename(name: &str) -> Result<String> {
    Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| Error::Other(format!("invalid download filename: {name:?}")))
}

/// Last non-empty path segment of `url`, ignoring query and fragment.
pub fn filename_from_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let path = path.split_once("://").map(|(_, rest)| rest).unwrap_or(path);
    // Drop the authority so a bare host never becomes the filename.
    let path = path.split_once('/').map(|(_, rest)| rest).unwrap_or("");
    path.rsplit('/')
        .find(|seg| !seg.is_empty())
        .and_then(|seg| sanitize_filename(seg).ok())
        .unwrap_or_else(|| FALLBACK_NAME.to_owned())
}
