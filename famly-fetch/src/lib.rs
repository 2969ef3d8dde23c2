//! famly-fetch: 从 famly.co 增量下载孩子的照片
//!
//! 模块划分:
//! - `models`: 数据模型 (图片描述、原始记录、下载决策、配置、错误)
//! - `services`: 业务服务 (API客户端、列表源、下载状态、分页下载循环、调度)
//! - `utils`: 工具函数 (日志、时间解析、文件名推导、EXIF写入)

pub mod models;
pub mod services;
pub mod utils;
