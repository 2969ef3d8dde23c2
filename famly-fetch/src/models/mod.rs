//! 数据模型模块
//!
//! 包含所有核心数据结构:
//! - errors: 错误类型定义 (API、状态文件、记录、下载、配置、应用级错误)
//! - capture_date: 拍摄时间 (带/不带时区偏移)
//! - famly_records: Famly API 原始记录
//! - image_descriptor: 图片描述 (Direct / Signed 两种URL变体)
//! - fetch_batch: 分页单元 (记录 + 游标)
//! - fetch_decision: 下载决策 (Fetch / Skip / Stop)
//! - fetch_outcome: 循环终态与统计
//! - source_kind: 图片来源类型
//! - child: 孩子
//! - app_config: 下载配置

pub mod app_config;
pub mod capture_date;
pub mod child;
pub mod errors;
pub mod famly_records;
pub mod fetch_batch;
pub mod fetch_decision;
pub mod fetch_outcome;
pub mod image_descriptor;
pub mod source_kind;

// 重导出常用类型,简化外部引用
pub use app_config::{Credentials, FetchConfig, GpsCoordinates, SourceSelection};
pub use capture_date::CaptureDate;
pub use child::{Child, MeResponse};
pub use errors::{
    ApiError, AppError, ConfigError, FetchError, FetchLoopError, FilenameError, RecordError,
    StateError,
};
pub use famly_records::{ImageRecord, RawImage};
pub use fetch_batch::FetchBatch;
pub use fetch_decision::FetchDecision;
pub use fetch_outcome::{LoopOutcome, LoopTerminal, RunSummary};
pub use image_descriptor::{ImageDescriptor, ImageVariant};
pub use source_kind::SourceKind;
