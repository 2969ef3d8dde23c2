use std::path::PathBuf;

use thiserror::Error;

/// API调用相关错误
///
/// 处理与 Famly API 交互时的各种失败场景。
/// 每个错误都包含足够的上下文信息,帮助调试和恢复。
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败
    ///
    /// 可能原因:
    /// - 网络连接中断
    /// - Famly 服务器不可达
    /// - DNS解析失败
    #[error("网络请求失败: {0}")]
    NetworkFailed(String),

    /// 登录失败
    ///
    /// 邮箱/密码错误,或响应中缺少 accessToken。整个运行在处理任何孩子之前中止。
    #[error("登录失败: {0}")]
    AuthenticationFailed(String),

    /// HTTP状态码错误
    ///
    /// Famly API 返回了非2xx状态码
    #[error("HTTP错误 {status}: {message}")]
    HttpStatusError { status: u16, message: String },

    /// JSON解析失败
    ///
    /// Famly API 返回的数据格式不符合预期
    #[error("响应数据解析失败: {0}")]
    JsonParseFailed(String),

    /// 响应格式无效
    ///
    /// JSON合法,但缺少预期的字段 (如 GraphQL 的 data 节点)
    #[error("响应格式无效: {0}")]
    InvalidResponse(String),
}

/// 实现从reqwest::Error到ApiError的转换
impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::NetworkFailed("请求超时".to_string())
        } else if err.is_connect() {
            ApiError::NetworkFailed("无法连接到服务器".to_string())
        } else if err.is_decode() {
            ApiError::JsonParseFailed(err.to_string())
        } else {
            ApiError::NetworkFailed(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::JsonParseFailed(err.to_string())
    }
}

/// 下载状态文件错误
///
/// 状态文件损坏不会被自动修复: 静默重置会导致全部重新下载或丢失去重历史。
#[derive(Debug, Error)]
pub enum StateError {
    /// 状态文件存在但不是合法的 `{图片ID: 时间戳}` JSON 对象
    #[error("状态文件已损坏 {}: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },

    /// 读写/重命名状态文件失败
    #[error("状态文件读写失败 {}: {reason}", path.display())]
    Io { path: PathBuf, reason: String },
}

/// 原始记录无法构造为图片描述
///
/// 单条记录级别的错误: 记录日志后跳过该记录,同一批次继续处理。
#[derive(Debug, Error, PartialEq)]
pub enum RecordError {
    /// 缺少必需字段
    #[error("缺少必需字段: {0}")]
    MissingField(&'static str),

    /// 拍摄时间无法解析
    #[error("拍摄时间无法解析: {0}")]
    InvalidDate(String),

    /// 字段值不合法
    #[error("字段 {field} 的值不合法: {value}")]
    InvalidValue { field: &'static str, value: String },
}

/// 图片下载错误
///
/// 单张图片级别: 向上传播并中止当前 (孩子, 来源) 的下载循环。
#[derive(Debug, Error)]
pub enum FetchError {
    /// 网络请求失败
    #[error("图片下载失败 {url}: {reason}")]
    Network { url: String, reason: String },

    /// 服务器返回了非2xx状态码
    #[error("图片下载失败 {url}: HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    /// 写入本地文件失败
    #[error("图片写入失败 {}: {reason}", path.display())]
    Io { path: PathBuf, reason: String },
}

/// 文件名模板错误
#[derive(Debug, Error, PartialEq)]
pub enum FilenameError {
    /// 模板为空
    #[error("文件名模板不能为空")]
    EmptyPattern,

    /// 模板包含无法识别的日期占位符
    #[error("文件名模板无效: {0}")]
    InvalidPattern(String),
}

/// 配置错误
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// GPS坐标只提供了一半,或超出合法范围
    #[error("GPS坐标无效: {0}")]
    InvalidGps(String),

    /// 文件名模板无效
    #[error(transparent)]
    InvalidPattern(#[from] FilenameError),

    /// 定时计划格式无效 (期望 HH:MM)
    #[error("定时计划格式无效: {0} (期望 HH:MM)")]
    InvalidSchedule(String),

    /// 既没有 access token 也没有完整的邮箱/密码
    #[error("缺少登录凭证: {0}")]
    MissingCredentials(String),

    /// .env 文件无法解析
    #[error(".env 文件无效: {0}")]
    InvalidEnvFile(String),
}

/// 分页下载循环错误
///
/// 任一变体都会终止当前 (孩子, 来源) 的循环。重新运行即可恢复。
#[derive(Debug, Error)]
pub enum FetchLoopError {
    /// 请求列表页失败
    #[error("获取列表页失败: {0}")]
    Listing(#[from] ApiError),

    /// 图片下载失败
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// 状态持久化失败
    #[error(transparent)]
    State(#[from] StateError),

    /// 文件名推导失败
    #[error(transparent)]
    Filename(#[from] FilenameError),
}

/// 应用级错误
///
/// 顶层运行包裹所有孩子的处理,任何错误都打印消息并以非零状态退出。
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{source_name} 下载中止: {error}")]
    FetchLoop {
        source_name: String,
        error: FetchLoopError,
    },

    #[error("I/O错误: {0}")]
    Io(String),
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}
