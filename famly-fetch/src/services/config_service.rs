use std::env;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use crate::models::{ConfigError, Credentials};

/// 配置服务
///
/// 职责单一:
/// - 从 .env 文件加载环境变量 (不覆盖已存在的变量)
/// - 解析登录凭证,缺失时交互式询问
pub struct ConfigService;

impl ConfigService {
    /// 查找 .env 文件
    ///
    /// 查找顺序:
    /// 1. 当前工作目录的 .env
    /// 2. 上层目录的 .env
    pub fn env_file_path(cwd: &Path) -> Option<PathBuf> {
        let env_path = cwd.join(".env");
        if env_path.exists() {
            return Some(env_path);
        }

        cwd.parent()
            .map(|parent| parent.join(".env"))
            .filter(|parent_env| parent_env.exists())
    }

    /// 加载 .env 到进程环境变量,返回加载的文件
    ///
    /// 文件不存在时不报错。必须在日志初始化之前调用,因此只返回结果,不写日志。
    pub fn load_env() -> Result<Option<PathBuf>, ConfigError> {
        let Ok(cwd) = env::current_dir() else {
            return Ok(None);
        };

        match Self::env_file_path(&cwd) {
            Some(path) => {
                dotenvy::from_path(&path).map_err(|e| {
                    ConfigError::InvalidEnvFile(format!("{}: {}", path.display(), e))
                })?;
                Ok(Some(path))
            }
            None => Ok(None),
        }
    }

    /// 解析登录凭证
    ///
    /// - 有 access token: 直接使用;同时提供了邮箱/密码时给出警告
    /// - 否则: 缺失的邮箱/密码从 `input` 读取,提示写入 `output`
    ///
    /// # 错误
    /// - `ConfigError::MissingCredentials`: 询问后仍为空
    pub fn resolve_credentials<R: BufRead, W: Write>(
        access_token: Option<String>,
        email: Option<String>,
        password: Option<String>,
        input: &mut R,
        output: &mut W,
    ) -> Result<Credentials, ConfigError> {
        let access_token = non_empty(access_token);
        let email = non_empty(email);
        let password = non_empty(password);

        if let Some(token) = access_token {
            if email.is_some() || password.is_some() {
                tracing::warn!(
                    "同时提供了访问令牌和邮箱/密码,使用访问令牌"
                );
            }
            return Ok(Credentials::AccessToken(token));
        }

        let email = match email {
            Some(email) => email,
            None => prompt(input, output, "Enter your famly.co email address: ", "email")?,
        };
        let password = match password {
            Some(password) => password,
            None => prompt(input, output, "Enter your famly.co password: ", "password")?,
        };

        Ok(Credentials::Password { email, password })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    message: &str,
    field: &str,
) -> Result<String, ConfigError> {
    let missing = || ConfigError::MissingCredentials(field.to_string());

    write!(output, "{}", message).map_err(|_| missing())?;
    output.flush().map_err(|_| missing())?;

    let mut line = String::new();
    input.read_line(&mut line).map_err(|_| missing())?;

    let value = line.trim().to_string();
    if value.is_empty() {
        return Err(missing());
    }
    Ok(value)
}
