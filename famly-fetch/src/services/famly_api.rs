use std::fmt;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::models::famly_records::{
    ConversationRaw, ConversationRefRaw, DirectImageRaw, NotesPageRaw, ObservationsPageRaw,
};
use crate::models::{ApiError, Child, Credentials, MeResponse};

/// Famly 默认地址
pub const DEFAULT_API_BASE: &str = "https://app.famly.co";

/// 登录后所有请求携带的认证头
const ACCESS_TOKEN_HEADER: &str = "x-famly-accesstoken";

const AUTHENTICATE_QUERY: &str = include_str!("../graphql/Authenticate.graphql");
const CHILD_NOTES_QUERY: &str = include_str!("../graphql/GetChildNotes.graphql");
const LEARNING_JOURNEY_QUERY: &str = include_str!("../graphql/LearningJourneyQuery.graphql");

/// 错误响应体在日志和错误信息中保留的最大长度
const MAX_ERROR_BODY: usize = 200;

/// 登录会话
///
/// 显式传递给每个需要认证的请求,客户端本身不保存 token。
#[derive(Clone)]
pub struct Session {
    access_token: String,
}

impl Session {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Session { access_token: *** }")
    }
}

/// GraphQL 响应包装
#[derive(Debug, Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlErrorRaw>,
}

#[derive(Debug, Deserialize)]
struct GraphqlErrorRaw {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuthenticateData {
    me: AuthenticateMe,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthenticateMe {
    authenticate_with_password: Option<AuthenticateResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthenticateResult {
    access_token: Option<String>,
    error_title: Option<String>,
    error_details: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChildNotesData {
    child_notes: NotesPageRaw,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LearningJourneyData {
    child_development: ChildDevelopmentRaw,
}

#[derive(Debug, Deserialize)]
struct ChildDevelopmentRaw {
    observations: ObservationsPageRaw,
}

/// Famly API 客户端
///
/// 职责:
/// - 邮箱密码登录,生成 `Session`
/// - 获取孩子列表
/// - 各来源的列表接口 (标记图片、笔记、成长记录、消息)
#[derive(Debug, Clone)]
pub struct FamlyApiClient {
    http: reqwest::Client,
    base_url: String,
    device_id: String,
}

impl FamlyApiClient {
    /// 创建新的客户端
    ///
    /// # 参数
    /// - `base_url`: API地址,如 `https://app.famly.co`
    /// - `user_agent`: 可选的 User-Agent
    pub fn new(base_url: impl Into<String>, user_agent: Option<&str>) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(user_agent) = user_agent {
            builder = builder.user_agent(user_agent.to_string());
        }
        let http = builder
            .build()
            .map_err(|e| ApiError::NetworkFailed(format!("HTTP客户端创建失败: {}", e)))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        let device_id = crate::utils::device_id::device_id().to_string();

        tracing::info!(base_url = %base_url, "Famly API客户端初始化完成");

        Ok(Self {
            http,
            base_url,
            device_id,
        })
    }

    /// 替换设备ID (构建器模式)
    pub fn with_device_id(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = device_id.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 底层 HTTP 客户端 (共享连接池和 User-Agent,用于下载图片)
    pub fn http_client(&self) -> reqwest::Client {
        self.http.clone()
    }

    /// 按凭证建立会话
    ///
    /// 已有 access token 时直接使用,否则用邮箱密码登录。
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<Session, ApiError> {
        match credentials {
            Credentials::AccessToken(token) => {
                tracing::info!("使用提供的访问令牌");
                Ok(Session::new(token.clone()))
            }
            Credentials::Password { email, password } => self.login(email, password).await,
        }
    }

    /// 邮箱密码登录
    ///
    /// # 错误
    /// - `ApiError::AuthenticationFailed`: 非2xx响应,或响应中没有 accessToken
    /// - `ApiError::NetworkFailed`: 网络失败
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, ApiError> {
        tracing::info!(email = %email, "使用密码登录");

        let variables = json!({
            "email": email,
            "password": password,
            "deviceId": self.device_id,
            "legacy": false,
        });

        let data: AuthenticateData = self
            .graphql(None, "Authenticate", AUTHENTICATE_QUERY, variables)
            .await
            .map_err(|e| match e {
                ApiError::HttpStatusError { status, message } => {
                    ApiError::AuthenticationFailed(format!("HTTP {}: {}", status, message))
                }
                ApiError::InvalidResponse(message) => ApiError::AuthenticationFailed(message),
                other => other,
            })?;

        let result = data
            .me
            .authenticate_with_password
            .ok_or_else(|| ApiError::AuthenticationFailed("响应中没有登录结果".to_string()))?;

        match result.access_token {
            Some(token) if !token.is_empty() => {
                tracing::info!("登录成功");
                Ok(Session::new(token))
            }
            _ => {
                let reason = [result.error_title, result.error_details]
                    .into_iter()
                    .flatten()
                    .collect::<Vec<_>>()
                    .join(": ");
                let reason = if reason.is_empty() {
                    "响应中没有 accessToken".to_string()
                } else {
                    reason
                };
                tracing::error!(reason = %reason, "登录失败");
                Err(ApiError::AuthenticationFailed(reason))
            }
        }
    }

    /// 当前用户的孩子 (包括以前的孩子)
    pub async fn children(&self, session: &Session) -> Result<Vec<Child>, ApiError> {
        let me: MeResponse = self.get_json(session, "/api/me/me/me", &[]).await?;
        let children = me.children()?;

        tracing::info!(count = children.len(), "已加载孩子列表");
        Ok(children)
    }

    /// 孩子被标记的图片 (单页,无游标)
    pub async fn tagged_images(
        &self,
        session: &Session,
        child_id: &str,
    ) -> Result<Vec<DirectImageRaw>, ApiError> {
        self.get_json(session, "/api/v2/images/tagged", &[("childId", child_id)])
            .await
    }

    /// 孩子笔记的一页
    pub async fn child_notes(
        &self,
        session: &Session,
        child_id: &str,
        cursor: Option<&str>,
        limit: u32,
    ) -> Result<NotesPageRaw, ApiError> {
        let variables = json!({
            "noteTypes": ["Classic"],
            "childId": child_id,
            "parentVisible": true,
            "safeguardingConcern": false,
            "sensitive": false,
            "limit": limit,
            "cursor": cursor,
        });

        let data: ChildNotesData = self
            .graphql(Some(session), "GetChildNotes", CHILD_NOTES_QUERY, variables)
            .await?;
        Ok(data.child_notes)
    }

    /// 成长记录的一页
    pub async fn learning_journey(
        &self,
        session: &Session,
        child_id: &str,
        cursor: Option<&str>,
        first: u32,
    ) -> Result<ObservationsPageRaw, ApiError> {
        let variables = json!({
            "childId": child_id,
            "variants": ["REGULAR_OBSERVATION", "PARENT_OBSERVATION"],
            "first": first,
            "next": cursor,
        });

        let data: LearningJourneyData = self
            .graphql(
                Some(session),
                "LearningJourneyQuery",
                LEARNING_JOURNEY_QUERY,
                variables,
            )
            .await?;
        Ok(data.child_development.observations)
    }

    /// 会话列表
    pub async fn conversations(&self, session: &Session) -> Result<Vec<ConversationRefRaw>, ApiError> {
        self.get_json(session, "/api/v2/conversations", &[]).await
    }

    /// 单个会话及其消息
    pub async fn conversation(
        &self,
        session: &Session,
        conversation_id: &str,
    ) -> Result<ConversationRaw, ApiError> {
        let path = format!("/api/v2/conversations/{}", conversation_id);
        self.get_json(session, &path, &[]).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        session: &Session,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(url = %url, "GET请求");

        let mut request = self
            .http
            .get(&url)
            .header(ACCESS_TOKEN_HEADER, session.access_token());
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request.send().await?;
        Self::parse_response(&url, response).await
    }

    async fn graphql<T: DeserializeOwned>(
        &self,
        session: Option<&Session>,
        operation: &str,
        query: &str,
        variables: Value,
    ) -> Result<T, ApiError> {
        let url = format!("{}/graphql?{}", self.base_url, operation);
        tracing::debug!(operation = %operation, "GraphQL请求");

        let body = json!({
            "operationName": operation,
            "variables": variables,
            "query": query,
        });

        let mut request = self.http.post(&url).json(&body);
        if let Some(session) = session {
            request = request.header(ACCESS_TOKEN_HEADER, session.access_token());
        }

        let response = request.send().await?;
        let envelope: GraphqlResponse<T> = Self::parse_response(&url, response).await?;

        match envelope.data {
            Some(data) => Ok(data),
            None => {
                let messages = envelope
                    .errors
                    .into_iter()
                    .filter_map(|e| e.message)
                    .collect::<Vec<_>>()
                    .join("; ");
                tracing::error!(
                    operation = %operation,
                    errors = %messages,
                    "GraphQL响应没有data字段"
                );
                Err(ApiError::InvalidResponse(format!(
                    "{} 没有返回 data: {}",
                    operation, messages
                )))
            }
        }
    }

    async fn parse_response<T: DeserializeOwned>(
        url: &str,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message: String = text.chars().take(MAX_ERROR_BODY).collect();
            tracing::error!(
                url = %url,
                status = status.as_u16(),
                body = %message,
                "Famly API返回错误状态"
            );
            return Err(ApiError::HttpStatusError {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(url = %url, error = %e, "解析Famly API响应失败");
            ApiError::JsonParseFailed(e.to_string())
        })
    }
}
