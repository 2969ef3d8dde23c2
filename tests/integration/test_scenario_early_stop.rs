//! 集成测试: 遇到已下载图片提前停止
//!
//! 验证点:
//! 1. 停止模式下遇到第一张已下载图片即结束该来源,不再请求后续页
//! 2. 停止前下载的新图片已写入状态文件
//! 3. 笔记图片的时间和说明来自所属笔记

mod support;

use famly_fetch::models::{FetchConfig, RunSummary, SourceSelection};
use famly_fetch::services::{DownloadState, Downloader, FamlyApiClient, HttpImageFetcher};
use support::{note, saved_files, test_config, FamlyMock};

fn notes_config(dir: &std::path::Path, stop_on_existing: bool) -> FetchConfig {
    test_config(dir)
        .with_sources(SourceSelection {
            tagged: false,
            journey: false,
            notes: true,
            messages: false,
        })
        .with_stop_on_existing(stop_on_existing)
        .with_captions(true)
}

async fn run(mock: &FamlyMock, config: &FetchConfig) -> RunSummary {
    let client = FamlyApiClient::new(mock.url(), None).unwrap();
    let fetcher = HttpImageFetcher::new(client.http_client());

    Downloader::new(&client, &fetcher, config)
        .without_pacing()
        .run(&mock.session())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_停止模式不请求后续页() {
    let dir = tempfile::tempdir().unwrap();

    // 第一次运行: 两页共三张图片
    let mut first = FamlyMock::start().await;
    let prefix = first.image_prefix();
    first.with_children(&[("c1", "Alice")]).await;
    first
        .with_notes_page(
            None,
            vec![note(&prefix, "Painting", "2024-03-06T14:00:00Z", &["a", "b"])],
            Some("cursor-2"),
        )
        .await;
    first
        .with_notes_page(
            Some("cursor-2"),
            vec![note(&prefix, "Garden", "2024-03-05T11:00:00Z", &["c"])],
            None,
        )
        .await;
    first.serve_all_images().await;

    let summary = run(&first, &notes_config(dir.path(), true)).await;
    assert_eq!(summary.fetched, 3);
    assert_eq!(summary.stopped_early, 0);

    // 第二次运行: 第一页最前面多了一张新图片
    let mut second = FamlyMock::start().await;
    let prefix = second.image_prefix();
    second.with_children(&[("c1", "Alice")]).await;
    second
        .with_notes_page(
            None,
            vec![
                note(&prefix, "Snack", "2024-03-07T10:30:00Z", &["d"]),
                note(&prefix, "Painting", "2024-03-06T14:00:00Z", &["a", "b"]),
            ],
            Some("cursor-2"),
        )
        .await;
    let page_two = second.forbid_notes_page("cursor-2").await;
    second.serve_all_images().await;

    let config = notes_config(dir.path(), true);
    let summary = run(&second, &config).await;

    assert_eq!(summary.fetched, 1);
    assert_eq!(summary.stopped_early, 1);
    page_two.assert_async().await;

    let state = DownloadState::load(&config.state_file).unwrap();
    assert_eq!(state.len(), 4);
    assert!(state.contains("d"));
    assert_eq!(
        saved_files(&config.pictures_folder),
        vec![
            "Alice-note-2024-03-05_11-00-00-c.jpg",
            "Alice-note-2024-03-06_14-00-00-a.jpg",
            "Alice-note-2024-03-06_14-00-00-b.jpg",
            "Alice-note-2024-03-07_10-30-00-d.jpg",
        ]
    );
}

#[tokio::test]
async fn test_说明写入exif() {
    let dir = tempfile::tempdir().unwrap();

    let mut mock = FamlyMock::start().await;
    let prefix = mock.image_prefix();
    mock.with_children(&[("c1", "Alice")]).await;
    mock.with_notes_page(
        None,
        vec![note(&prefix, "Painting", "2024-03-06T14:00:00Z", &["a"])],
        None,
    )
    .await;
    mock.serve_all_images().await;

    let config = notes_config(dir.path(), false);
    run(&mock, &config).await;

    let content = std::fs::read(
        config
            .pictures_folder
            .join("Alice-note-2024-03-06_14-00-00-a.jpg"),
    )
    .unwrap();

    // UserComment 为 UTF-16BE
    let caption: Vec<u8> = "Painting - Teacher Tina"
        .encode_utf16()
        .flat_map(|unit| unit.to_be_bytes())
        .collect();
    assert!(content.windows(8).any(|w| w == b"UNICODE\0"));
    assert!(content.windows(caption.len()).any(|w| w == caption.as_slice()));
}

#[tokio::test]
async fn test_跳过模式继续扫描全部页() {
    let dir = tempfile::tempdir().unwrap();
    let config = notes_config(dir.path(), false);

    let mut state = DownloadState::load(&config.state_file).unwrap();
    state.mark("a");
    state.save().unwrap();

    let mut mock = FamlyMock::start().await;
    let prefix = mock.image_prefix();
    mock.with_children(&[("c1", "Alice")]).await;
    mock.with_notes_page(
        None,
        vec![note(&prefix, "Painting", "2024-03-06T14:00:00Z", &["a"])],
        Some("cursor-2"),
    )
    .await;
    mock.with_notes_page(
        Some("cursor-2"),
        vec![note(&prefix, "Garden", "2024-03-05T11:00:00Z", &["c"])],
        None,
    )
    .await;
    mock.serve_all_images().await;

    let summary = run(&mock, &config).await;

    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.fetched, 1);
    assert_eq!(summary.stopped_early, 0);
    assert_eq!(
        saved_files(&config.pictures_folder),
        vec!["Alice-note-2024-03-05_11-00-00-c.jpg"]
    );
}
