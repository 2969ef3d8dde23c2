use famly_fetch::models::StateError;
use famly_fetch::services::download_state::{temp_path, DownloadState};

// ============================================================================
// 持久化往返
// ============================================================================

#[test]
fn test_保存后重新加载内容一致() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");

    let mut state = DownloadState::load(&path).unwrap();
    state.mark("1");
    state.mark("abc");
    state.save().unwrap();

    let reloaded = DownloadState::load(&path).unwrap();
    assert_eq!(reloaded.entries(), state.entries());
    assert!(reloaded.contains("abc"));
}

#[test]
fn test_兼容已有状态文件格式() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(
        &path,
        r#"{"42": "2024-01-01T00:00:00+00:00", "43": "2024-01-02T00:00:00.123456+00:00"}"#,
    )
    .unwrap();

    let state = DownloadState::load(&path).unwrap();

    assert_eq!(state.len(), 2);
    assert!(state.contains("42"));
    assert!(state.contains("43"));
}

#[test]
fn test_记录的时间是iso8601() {
    let dir = tempfile::tempdir().unwrap();
    let mut state = DownloadState::load(dir.path().join("state.json")).unwrap();

    state.mark("1");

    let timestamp = &state.entries()["1"];
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
}

// ============================================================================
// 中断与损坏
// ============================================================================

#[test]
fn test_中断的保存不影响上次完整状态() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");

    let mut state = DownloadState::load(&path).unwrap();
    state.mark("1");
    state.save().unwrap();

    // 模拟写临时文件时进程被终止: 临时文件只写了一半,没有 rename
    std::fs::write(temp_path(&path), r#"{"1": "2024-01-01T00:00:00Z", "2": "#).unwrap();

    let reloaded = DownloadState::load(&path).unwrap();
    assert_eq!(reloaded.entries(), state.entries());

    // 下一次保存覆盖残留的临时文件
    let mut reloaded = reloaded;
    reloaded.mark("2");
    reloaded.save().unwrap();
    assert_eq!(DownloadState::load(&path).unwrap().len(), 2);
}

#[test]
fn test_损坏的状态文件返回错误而不是重置() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, "{not json").unwrap();

    let err = DownloadState::load(&path).unwrap_err();

    assert!(matches!(err, StateError::Corrupt { .. }));
    // 文件保持原样
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{not json");
}

#[test]
fn test_空文件视为损坏() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, "").unwrap();

    assert!(matches!(
        DownloadState::load(&path),
        Err(StateError::Corrupt { .. })
    ));
}

#[test]
fn test_状态文件不存在时为空() {
    let dir = tempfile::tempdir().unwrap();

    let state = DownloadState::load(dir.path().join("missing.json")).unwrap();

    assert!(state.is_empty());
}
