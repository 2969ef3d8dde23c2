//! 下载配置
//!
//! 核心下载流程消费的全部外部参数。由命令行/环境变量/.env 组装,
//! 在任何网络请求之前完成校验。

use std::fmt;
use std::path::{Path, PathBuf};

use crate::models::ConfigError;
use crate::utils::filename::validate_pattern;

/// 默认文件名模板
pub const DEFAULT_FILENAME_PATTERN: &str = "%FP-%Y-%m-%d_%H-%M-%S-%ID";

/// 游标分页来源每页条数
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// 默认状态文件名 (位于图片目录下)
pub const DEFAULT_STATE_FILE_NAME: &str = ".famly-fetch-state.json";

/// EXIF GPS坐标
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsCoordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsCoordinates {
    /// 从可选的经纬度组装
    ///
    /// 两者都缺失时返回 None;只提供一个或超出范围时报错
    pub fn from_parts(
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Result<Option<Self>, ConfigError> {
        match (latitude, longitude) {
            (None, None) => Ok(None),
            (Some(latitude), Some(longitude)) => {
                if !(-90.0..=90.0).contains(&latitude) {
                    return Err(ConfigError::InvalidGps(format!(
                        "纬度超出范围: {} (有效范围: -90..90)",
                        latitude
                    )));
                }
                if !(-180.0..=180.0).contains(&longitude) {
                    return Err(ConfigError::InvalidGps(format!(
                        "经度超出范围: {} (有效范围: -180..180)",
                        longitude
                    )));
                }
                Ok(Some(Self {
                    latitude,
                    longitude,
                }))
            }
            _ => Err(ConfigError::InvalidGps(
                "纬度和经度必须同时提供".to_string(),
            )),
        }
    }
}

/// 需要下载的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceSelection {
    pub tagged: bool,
    pub journey: bool,
    pub notes: bool,
    pub messages: bool,
}

impl Default for SourceSelection {
    /// 默认只下载标记图片
    fn default() -> Self {
        Self {
            tagged: true,
            journey: false,
            notes: false,
            messages: false,
        }
    }
}

/// 登录凭证
#[derive(Clone)]
pub enum Credentials {
    /// 已有的 access token,跳过登录
    AccessToken(String),
    /// 邮箱 + 密码
    Password { email: String, password: String },
}

impl fmt::Debug for Credentials {
    /// 不输出敏感数据
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AccessToken(_) => f.write_str("Credentials::AccessToken(***)"),
            Self::Password { email, .. } => {
                write!(f, "Credentials::Password {{ email: {:?}, password: *** }}", email)
            }
        }
    }
}

/// 下载配置
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// 图片保存目录
    pub pictures_folder: PathBuf,
    /// 下载状态文件
    pub state_file: PathBuf,
    /// 文件名模板 (`%FP`, `%ID` + strftime占位符)
    pub filename_pattern: String,
    /// 遇到已下载图片时停止当前来源
    pub stop_on_existing: bool,
    /// 将 "正文 - 作者" 写入 EXIF UserComment
    pub include_captions: bool,
    /// 写入 EXIF 的GPS坐标
    pub gps: Option<GpsCoordinates>,
    /// 需要下载的来源
    pub sources: SourceSelection,
    /// 游标分页每页条数
    pub page_size: u32,
    /// 单张图片下载失败后的重试次数 (0 表示不重试)
    pub fetch_retries: u32,
}

impl FetchConfig {
    /// 创建默认配置,状态文件位于图片目录下
    pub fn new(pictures_folder: impl Into<PathBuf>) -> Self {
        let pictures_folder = pictures_folder.into();
        let state_file = default_state_file(&pictures_folder);

        Self {
            pictures_folder,
            state_file,
            filename_pattern: DEFAULT_FILENAME_PATTERN.to_string(),
            stop_on_existing: false,
            include_captions: false,
            gps: None,
            sources: SourceSelection::default(),
            page_size: DEFAULT_PAGE_SIZE,
            fetch_retries: 0,
        }
    }

    /// 设置状态文件 (构建器模式)
    pub fn with_state_file(mut self, state_file: impl Into<PathBuf>) -> Self {
        self.state_file = state_file.into();
        self
    }

    /// 设置文件名模板 (构建器模式)
    pub fn with_filename_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.filename_pattern = pattern.into();
        self
    }

    /// 设置停止策略 (构建器模式)
    pub fn with_stop_on_existing(mut self, stop_on_existing: bool) -> Self {
        self.stop_on_existing = stop_on_existing;
        self
    }

    /// 设置说明写入 (构建器模式)
    pub fn with_captions(mut self, include_captions: bool) -> Self {
        self.include_captions = include_captions;
        self
    }

    /// 设置GPS坐标 (构建器模式)
    pub fn with_gps(mut self, gps: Option<GpsCoordinates>) -> Self {
        self.gps = gps;
        self
    }

    /// 设置来源 (构建器模式)
    pub fn with_sources(mut self, sources: SourceSelection) -> Self {
        self.sources = sources;
        self
    }

    /// 设置重试次数 (构建器模式)
    pub fn with_fetch_retries(mut self, retries: u32) -> Self {
        self.fetch_retries = retries;
        self
    }

    /// 校验配置
    ///
    /// # 错误
    /// - `ConfigError::InvalidPattern`: 模板为空或包含无法识别的占位符
    /// - `ConfigError::InvalidGps`: 坐标超出范围
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_pattern(&self.filename_pattern)?;
        if let Some(gps) = self.gps {
            GpsCoordinates::from_parts(Some(gps.latitude), Some(gps.longitude))?;
        }
        Ok(())
    }

    /// 获取配置摘要 (用于日志)
    pub fn summary_for_logging(&self) -> String {
        format!(
            "pictures={} state={} pattern={} stop_on_existing={} captions={} gps={}",
            self.pictures_folder.display(),
            self.state_file.display(),
            self.filename_pattern,
            self.stop_on_existing,
            self.include_captions,
            self.gps.is_some()
        )
    }
}

/// 默认状态文件路径
pub fn default_state_file(pictures_folder: &Path) -> PathBuf {
    pictures_folder.join(DEFAULT_STATE_FILE_NAME)
}
