//! 服务层模块
//!
//! 包含所有业务逻辑服务:
//! - `famly_api`: Famly API 客户端与显式的登录会话
//! - `listing_source`: 各来源的分页列表适配器
//! - `download_state`: 已下载图片的持久化记录
//! - `image_fetcher`: 图片下载与 EXIF 写入
//! - `fetch_loop`: 游标分页下载循环
//! - `downloader`: 按孩子和来源编排一次完整运行
//! - `scheduler`: 每日定时运行
//! - `config_service`: .env 加载与登录凭证解析
//!
//! # 服务架构
//!
//! ```text
//! ┌─────────────────┐
//! │   CLI (main)    │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌──────────────────────────────────────┐
//! │            Downloader                │
//! │  ┌──────────────────────────────┐    │
//! │  │     PaginatedFetchLoop       │    │
//! │  └──┬────────────┬──────────┬───┘    │
//! │     │            │          │        │
//! │  ListingSource  DownloadState  ImageFetcher
//! └─────┼──────────────────────────┼─────┘
//!       ▼                          ▼
//!   Famly API                  图片 CDN
//! ```

pub mod config_service;
pub mod download_state;
pub mod downloader;
pub mod famly_api;
pub mod fetch_loop;
pub mod image_fetcher;
pub mod listing_source;
pub mod scheduler;

// 重导出常用类型,简化外部引用
pub use config_service::ConfigService;
pub use download_state::DownloadState;
pub use downloader::Downloader;
pub use famly_api::{FamlyApiClient, Session, DEFAULT_API_BASE};
pub use fetch_loop::PaginatedFetchLoop;
pub use image_fetcher::{FetchRequest, HttpImageFetcher, ImageFetcher, MetadataOutcome};
pub use listing_source::{JourneySource, ListingSource, MessagesSource, NotesSource, TaggedSource};
pub use scheduler::Scheduler;
