//! 集成测试: 增量下载
//!
//! 验证点:
//! 1. 第一次运行下载全部标记图片并写入状态文件
//! 2. 第二次运行 (跳过模式) 只下载新图片
//! 3. 文件名按模板推导,JPEG 写入了 EXIF

mod support;

use famly_fetch::models::{FetchConfig, RunSummary};
use famly_fetch::services::{DownloadState, Downloader, FamlyApiClient, HttpImageFetcher};
use support::{saved_files, tagged_image, test_config, FamlyMock};

async fn run_tagged(mock: &FamlyMock, config: &FetchConfig) -> RunSummary {
    let client = FamlyApiClient::new(mock.url(), Some("famly-fetch/test")).unwrap();
    let fetcher = HttpImageFetcher::new(client.http_client());

    Downloader::new(&client, &fetcher, config)
        .without_pacing()
        .run(&mock.session())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_第一次运行下载全部图片() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());

    let mut mock = FamlyMock::start().await;
    let prefix = mock.image_prefix();
    mock.with_children(&[("c1", "Alice")]).await;
    mock.with_tagged(
        "c1",
        vec![
            tagged_image(&prefix, "i3", "2024-03-07T09:00:00+01:00"),
            tagged_image(&prefix, "i2", "2024-03-06T09:00:00+01:00"),
            tagged_image(&prefix, "i1", "2024-03-05T09:00:00+01:00"),
        ],
    )
    .await;
    mock.serve_all_images().await;

    let summary = run_tagged(&mock, &config).await;

    assert_eq!(summary.children, 1);
    assert_eq!(summary.loops, 1);
    assert_eq!(summary.fetched, 3);
    assert_eq!(summary.skipped, 0);
    assert_eq!(
        saved_files(&config.pictures_folder),
        vec![
            "Alice-2024-03-05_09-00-00-i1.jpg",
            "Alice-2024-03-06_09-00-00-i2.jpg",
            "Alice-2024-03-07_09-00-00-i3.jpg",
        ]
    );

    let state = DownloadState::load(&config.state_file).unwrap();
    assert_eq!(state.len(), 3);
    assert!(state.contains("i1") && state.contains("i2") && state.contains("i3"));

    let content =
        std::fs::read(config.pictures_folder.join("Alice-2024-03-07_09-00-00-i3.jpg")).unwrap();
    assert!(content.windows(19).any(|w| w == b"2024:03:07 09:00:00"));
    assert!(content.windows(6).any(|w| w == b"+01:00"));
}

#[tokio::test]
async fn test_第二次运行只下载新图片() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());

    let mut first = FamlyMock::start().await;
    let prefix = first.image_prefix();
    first.with_children(&[("c1", "Alice")]).await;
    first
        .with_tagged(
            "c1",
            vec![
                tagged_image(&prefix, "i2", "2024-03-06T09:00:00Z"),
                tagged_image(&prefix, "i1", "2024-03-05T09:00:00Z"),
            ],
        )
        .await;
    first.serve_all_images().await;
    run_tagged(&first, &config).await;

    let mut second = FamlyMock::start().await;
    let prefix = second.image_prefix();
    second.with_children(&[("c1", "Alice")]).await;
    second
        .with_tagged(
            "c1",
            vec![
                tagged_image(&prefix, "i3", "2024-03-07T09:00:00Z"),
                tagged_image(&prefix, "i2", "2024-03-06T09:00:00Z"),
                tagged_image(&prefix, "i1", "2024-03-05T09:00:00Z"),
            ],
        )
        .await;
    second.serve_all_images().await;

    let summary = run_tagged(&second, &config).await;

    assert_eq!(summary.fetched, 1);
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.stopped_early, 0);
    assert_eq!(saved_files(&config.pictures_folder).len(), 3);
    assert_eq!(DownloadState::load(&config.state_file).unwrap().len(), 3);
}

#[tokio::test]
async fn test_多个孩子共享一个状态文件() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());

    let mut mock = FamlyMock::start().await;
    let prefix = mock.image_prefix();
    mock.with_children(&[("c1", "Alice"), ("c2", "Bob")]).await;
    mock.with_tagged("c1", vec![tagged_image(&prefix, "shared", "2024-03-05T09:00:00Z")])
        .await;
    mock.with_tagged(
        "c2",
        vec![
            tagged_image(&prefix, "bob-1", "2024-03-06T09:00:00Z"),
            tagged_image(&prefix, "shared", "2024-03-05T09:00:00Z"),
        ],
    )
    .await;
    mock.serve_all_images().await;

    let summary = run_tagged(&mock, &config).await;

    // 两个孩子都被标记的图片只下载一次
    assert_eq!(summary.children, 2);
    assert_eq!(summary.fetched, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(
        saved_files(&config.pictures_folder),
        vec![
            "Alice-2024-03-05_09-00-00-shared.jpg",
            "Bob-2024-03-06_09-00-00-bob-1.jpg",
        ]
    );
}
