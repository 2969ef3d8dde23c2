//! 图片下载
//!
//! `ImageFetcher` 是核心循环之外的协作者边界: 负责字节传输、
//! 覆盖写入目标路径、写入 EXIF 元数据。

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use crate::models::{CaptureDate, FetchError, GpsCoordinates};
use crate::utils::exif::{self, ExifMetadata};
use crate::utils::time_utils;

/// 一次下载请求
#[derive(Debug, Clone)]
pub struct FetchRequest<'a> {
    pub url: &'a str,
    pub destination: &'a Path,
    pub capture_date: &'a CaptureDate,
    pub caption: Option<&'a str>,
    pub gps: Option<GpsCoordinates>,
}

/// 元数据写入结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataOutcome {
    /// 已写入 EXIF
    Embedded,
    /// 不是可写入 EXIF 的格式,文件原样保留
    Unsupported,
}

/// 图片下载器
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// 下载到 `destination` 并写入元数据
    ///
    /// 同一目标路径重复下载是幂等的 (覆盖写入)
    async fn fetch(&self, request: &FetchRequest<'_>) -> Result<MetadataOutcome, FetchError>;
}

/// 基于 reqwest 的下载器
///
/// 先写入 `<目标>.part` 再 rename,中断时不会留下半截图片。
#[derive(Debug, Clone)]
pub struct HttpImageFetcher {
    http: reqwest::Client,
    retries: u32,
}

impl HttpImageFetcher {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http, retries: 0 }
    }

    /// 设置失败重试次数 (构建器模式)
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// 下载字节,按配置重试网络错误和非2xx响应
    async fn download(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let mut attempt = 0;
        loop {
            match self.download_once(url).await {
                Ok(bytes) => return Ok(bytes),
                Err(e) if attempt < self.retries => {
                    let delay = retry_delay(attempt);
                    tracing::warn!(
                        url = %url,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "图片下载失败,准备重试"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn download_once(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let network_error = |e: reqwest::Error| FetchError::Network {
            url: url.to_string(),
            reason: e.to_string(),
        };

        let response = self.http.get(url).send().await.map_err(network_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(network_error)?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, request: &FetchRequest<'_>) -> Result<MetadataOutcome, FetchError> {
        let bytes = self.download(request.url).await?;

        let (content, outcome) = embed_metadata(bytes, request);
        write_atomically(request.destination, &content).await?;

        tracing::debug!(
            path = %request.destination.display(),
            size = content.len(),
            metadata = ?outcome,
            "图片已保存"
        );
        Ok(outcome)
    }
}

/// 第 n 次重试前的等待: 1s, 2s, 4s ... 外加 0-500ms 随机抖动
pub fn retry_delay(attempt: u32) -> Duration {
    let base_ms = 1000u64.saturating_mul(1u64 << attempt.min(6));
    let jitter_ms = rand::thread_rng().gen_range(0..=500);
    Duration::from_millis(base_ms + jitter_ms)
}

/// 为 JPEG 写入 EXIF,其它格式原样返回
pub fn embed_metadata(bytes: Vec<u8>, request: &FetchRequest<'_>) -> (Vec<u8>, MetadataOutcome) {
    if !matches!(image::guess_format(&bytes), Ok(image::ImageFormat::Jpeg)) {
        tracing::warn!(
            path = %request.destination.display(),
            "不是JPEG或图片已损坏,跳过EXIF写入"
        );
        return (bytes, MetadataOutcome::Unsupported);
    }

    let metadata = ExifMetadata {
        date_time_original: time_utils::format_exif_datetime(request.capture_date),
        offset_time_original: request
            .capture_date
            .offset()
            .map(time_utils::format_exif_offset),
        user_comment: request.caption.map(str::to_string),
        gps: request.gps,
    };

    match exif::write_jpeg_metadata(&bytes, &metadata) {
        Ok(content) => (content, MetadataOutcome::Embedded),
        Err(e) => {
            tracing::warn!(
                path = %request.destination.display(),
                error = %e,
                "EXIF写入失败,保留原始图片"
            );
            (bytes, MetadataOutcome::Unsupported)
        }
    }
}

/// 写入 `<path>.part` 再 rename 到 `path`
pub async fn write_atomically(path: &Path, content: &[u8]) -> Result<(), FetchError> {
    let io_error = |e: std::io::Error| FetchError::Io {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
    }

    let part = part_path(path);
    tokio::fs::write(&part, content).await.map_err(io_error)?;
    tokio::fs::rename(&part, path).await.map_err(io_error)?;
    Ok(())
}

fn part_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}
