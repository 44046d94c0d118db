use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use texfetch_core::{sniff, FetchedKind};
use texfetch_logging::{tf_debug, tf_info, tf_warn};
use url::Url;

use crate::formats::{choose_format, parse_format_links};
use crate::persist::{read_header, AtomicFileWriter};
use crate::{FailureKind, FetchError};

pub const DEFAULT_BASE_URL: &str = "https://arxiv.org";

#[derive(Debug, Clone)]
pub struct FetchSettings {
    /// Repository root; both the e-print and the format endpoints live under it.
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_bytes: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(10),
            redirect_limit: 5,
            max_bytes: 256 * 1024 * 1024,
        }
    }
}

impl FetchSettings {
    pub fn eprint_url(&self, tag: &str) -> String {
        format!("{}/e-print/{tag}", self.base_url.trim_end_matches('/'))
    }

    pub fn format_url(&self, tag: &str) -> String {
        format!("{}/format/{tag}", self.base_url.trim_end_matches('/'))
    }

    /// Resolve a download path taken from the format listing page.
    pub fn download_url(&self, path: &str) -> Result<String, FetchError> {
        let base = Url::parse(&self.base_url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        base.join(path)
            .map(String::from)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))
    }
}

/// Obtains the source bundle for an identifier and writes it to `archive`.
///
/// Never fails: the returned kind says what was actually obtained, with
/// [`FetchedKind::Error`] when nothing usable could be downloaded.
#[async_trait::async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch_source(&self, tag: &str, archive: &Path) -> FetchedKind;
}

#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    settings: FetchSettings,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &FetchSettings {
        &self.settings
    }

    fn build_client(&self) -> Result<reqwest::Client, FetchError> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(self.settings.redirect_limit))
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))
    }

    /// GET `url` and return the whole body, bounded by `max_bytes`.
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let parsed = Url::parse(url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let response = self
            .build_client()?
            .get(parsed)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }
        let limit = self.settings.max_bytes;
        if let Some(declared) = response.content_length().filter(|len| *len > limit) {
            return Err(too_large(limit, declared));
        }

        let mut body = Vec::new();
        let mut chunks = response.bytes_stream();
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let received = (body.len() + chunk.len()) as u64;
            if received > limit {
                return Err(too_large(limit, received));
            }
            body.extend_from_slice(&chunk);
        }
        tf_debug!("downloaded {} bytes from {url}", body.len());
        Ok(body)
    }

    async fn download_to(&self, url: &str, archive: &Path) -> Result<(), FetchError> {
        let bytes = self.get_bytes(url).await?;
        store(archive, &bytes)
    }

    /// Pick the best format offered on the listing page: DVI, then PS, then PDF.
    async fn fetch_alternative(&self, tag: &str, archive: &Path) -> FetchedKind {
        let listing_url = self.settings.format_url(tag);
        let html = match self.get_bytes(&listing_url).await {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(err) => {
                tf_warn!("{err} {listing_url}");
                return FetchedKind::Error;
            }
        };

        let links = parse_format_links(&html);
        tf_debug!("formats offered: {:?}", links.keys().collect::<Vec<_>>());
        let Some((format, path)) = choose_format(&links) else {
            tf_warn!("no DVI, PostScript or PDF offered at {listing_url}");
            return FetchedKind::Error;
        };

        let result = match self.settings.download_url(path) {
            Ok(url) => {
                tf_info!("downloading {} from {url}", format.name());
                self.download_to(&url, archive).await
            }
            Err(err) => Err(err),
        };
        match result {
            Ok(()) => FetchedKind::from(format),
            Err(err) => {
                tf_warn!("{err} {path}");
                FetchedKind::Error
            }
        }
    }
}

#[async_trait::async_trait]
impl SourceFetcher for ReqwestFetcher {
    async fn fetch_source(&self, tag: &str, archive: &Path) -> FetchedKind {
        let url = self.settings.eprint_url(tag);
        tf_info!("downloading {url}");
        if let Err(err) = self.download_to(&url, archive).await {
            tf_warn!("{err} {url}");
            return self.fetch_alternative(tag, archive).await;
        }

        match read_header(archive) {
            Ok(header) => match sniff(&header) {
                Ok(kind) => FetchedKind::from(kind),
                Err(err) => {
                    tf_warn!("{err} {url}");
                    self.fetch_alternative(tag, archive).await
                }
            },
            Err(err) => {
                tf_warn!("{err} {url}");
                self.fetch_alternative(tag, archive).await
            }
        }
    }
}

fn store(archive: &Path, bytes: &[u8]) -> Result<(), FetchError> {
    let (Some(dir), Some(name)) = (archive.parent(), archive.file_name()) else {
        return Err(FetchError::new(
            FailureKind::Write,
            format!("{} is not a file path", archive.display()),
        ));
    };
    AtomicFileWriter::new(dir.to_path_buf())
        .write(&name.to_string_lossy(), bytes)
        .map(|_| ())
        .map_err(|err| FetchError::new(FailureKind::Write, err.to_string()))
}

fn too_large(max_bytes: u64, actual: u64) -> FetchError {
    FetchError::new(
        FailureKind::TooLarge {
            max_bytes,
            actual: Some(actual),
        },
        "response too large",
    )
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_redirect() {
        return FetchError::new(FailureKind::RedirectLimitExceeded, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}
