//! 孩子模型
//!
//! 来源于 `/api/me/me/me`:
//! - 当前的孩子: `roles2[].{targetId, title}`
//! - 以前的孩子: `behaviors[id=ShowPreviousChildren].payload.children[]`

use serde::Deserialize;

/// 一个孩子
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Child {
    pub id: String,
    pub first_name: String,
}

impl Child {
    pub fn new(id: impl Into<String>, first_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            first_name: first_name.into(),
        }
    }
}

/// `/api/me/me/me` 响应 (仅包含需要的字段)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MeResponse {
    #[serde(default)]
    pub roles2: Vec<RoleRaw>,
    #[serde(default)]
    pub behaviors: Vec<BehaviorRaw>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleRaw {
    pub target_id: String,
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BehaviorRaw {
    pub id: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
struct PreviousChildrenPayload {
    #[serde(default)]
    children: Vec<PreviousChildRaw>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PreviousChildRaw {
    child_id: String,
    name: PreviousChildName,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PreviousChildName {
    first_name: String,
}

const PREVIOUS_CHILDREN_BEHAVIOR: &str = "ShowPreviousChildren";

impl MeResponse {
    /// 当前的孩子在前,以前的孩子在后
    pub fn children(&self) -> Result<Vec<Child>, serde_json::Error> {
        let mut children: Vec<Child> = self
            .roles2
            .iter()
            .map(|role| Child::new(role.target_id.clone(), role.title.clone()))
            .collect();

        // 以最后一个匹配的 behavior 为准
        let previous = self
            .behaviors
            .iter()
            .rev()
            .find(|b| b.id == PREVIOUS_CHILDREN_BEHAVIOR);

        if let Some(behavior) = previous {
            let payload: PreviousChildrenPayload =
                serde_json::from_value(behavior.payload.clone())?;
            children.extend(
                payload
                    .children
                    .into_iter()
                    .map(|c| Child::new(c.child_id, c.name.first_name)),
            );
        }

        Ok(children)
    }
}
