use std::fmt;
use std::time::Duration;

/// 图片来源类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// 被标记的图片
    Tagged,
    /// 成长记录 (Learning Journey)
    Journey,
    /// 孩子笔记
    Notes,
    /// 消息中的图片 (按用户而非按孩子)
    Messages,
}

impl SourceKind {
    /// 文件名前缀 (`%FP`)
    ///
    /// 标记图片: `{名字}`; 成长记录: `{名字}-journey`; 笔记: `{名字}-note`; 消息: `message`
    pub fn file_prefix(&self, first_name: &str) -> String {
        match self {
            Self::Tagged => first_name.to_string(),
            Self::Journey => format!("{}-journey", first_name),
            Self::Notes => format!("{}-note", first_name),
            Self::Messages => "message".to_string(),
        }
    }

    /// 两次下载之间的固定间隔
    ///
    /// 标记图片接口有速率限制,连续请求会返回400
    pub fn pacing(&self) -> Option<Duration> {
        match self {
            Self::Tagged => Some(Duration::from_secs(1)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tagged => "tagged",
            Self::Journey => "journey",
            Self::Notes => "notes",
            Self::Messages => "messages",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
