//! 工具模块
//!
//! - `logger`: 日志初始化
//! - `time_utils`: 拍摄时间解析、EXIF 时间格式、每日调度时间计算
//! - `filename`: 由文件名模板生成下载路径
//! - `exif`: JPEG EXIF 写入
//! - `device_id`: 登录用的设备ID

pub mod device_id;
pub mod exif;
pub mod filename;
pub mod logger;
pub mod time_utils;
