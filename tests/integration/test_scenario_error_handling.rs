//! 集成测试: 错误处理
//!
//! 验证点:
//! 1. 状态文件损坏时不发起任何请求
//! 2. 登录失败返回 AuthenticationFailed
//! 3. 图片下载失败中止运行,已完成的图片已写入状态文件,重跑可恢复

mod support;

use famly_fetch::models::{
    ApiError, AppError, Credentials, FetchError, FetchLoopError, StateError,
};
use famly_fetch::services::{DownloadState, Downloader, FamlyApiClient, HttpImageFetcher};
use serde_json::json;
use support::{saved_files, tagged_image, tagged_image_path, test_config, FamlyMock};

#[tokio::test]
async fn test_状态文件损坏不发起请求() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    std::fs::write(&config.state_file, "{ not json").unwrap();

    let mut mock = FamlyMock::start().await;
    let me = mock
        .server
        .mock("GET", "/api/me/me/me")
        .expect(0)
        .create_async()
        .await;

    let client = FamlyApiClient::new(mock.url(), None).unwrap();
    let fetcher = HttpImageFetcher::new(client.http_client());
    let err = Downloader::new(&client, &fetcher, &config)
        .without_pacing()
        .run(&mock.session())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::State(StateError::Corrupt { .. })));
    assert!(!config.pictures_folder.exists());
    me.assert_async().await;

    // 损坏的文件保持原样
    assert_eq!(std::fs::read_to_string(&config.state_file).unwrap(), "{ not json");
}

#[tokio::test]
async fn test_登录失败() {
    let mut mock = FamlyMock::start().await;
    let _login = mock
        .server
        .mock("POST", "/graphql?Authenticate")
        .with_status(200)
        .with_body(
            json!({"data": {"me": {"authenticateWithPassword": {
                "errorTitle": "Login failed",
                "errorDetails": "Wrong email or password"
            }}}})
            .to_string(),
        )
        .create_async()
        .await;

    let client = FamlyApiClient::new(mock.url(), None).unwrap();
    let err = client
        .authenticate(&Credentials::Password {
            email: "parent@example.com".to_string(),
            password: "wrong".to_string(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::AuthenticationFailed(_)));
}

#[tokio::test]
async fn test_下载失败中止并保存进度() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());

    let images = |prefix: &str| {
        vec![
            tagged_image(prefix, "i3", "2024-03-07T09:00:00Z"),
            tagged_image(prefix, "i2", "2024-03-06T09:00:00Z"),
            tagged_image(prefix, "i1", "2024-03-05T09:00:00Z"),
        ]
    };

    // 第一次运行: 第二张图片返回500
    let mut broken = FamlyMock::start().await;
    let prefix = broken.image_prefix();
    broken.with_children(&[("c1", "Alice")]).await;
    broken.with_tagged("c1", images(&prefix)).await;
    broken.serve_image(&tagged_image_path("i3"), 200).await;
    broken.serve_image(&tagged_image_path("i2"), 500).await;

    let client = FamlyApiClient::new(broken.url(), None).unwrap();
    let fetcher = HttpImageFetcher::new(client.http_client());
    let err = Downloader::new(&client, &fetcher, &config)
        .without_pacing()
        .run(&broken.session())
        .await
        .unwrap_err();

    match err {
        AppError::FetchLoop { source_name, error } => {
            assert_eq!(source_name, "Alice");
            assert!(matches!(
                error,
                FetchLoopError::Fetch(FetchError::HttpStatus { status: 500, .. })
            ));
        }
        other => panic!("unexpected error: {:?}", other),
    }

    let state = DownloadState::load(&config.state_file).unwrap();
    assert_eq!(state.len(), 1);
    assert!(state.contains("i3"));
    assert_eq!(
        saved_files(&config.pictures_folder),
        vec!["Alice-2024-03-07_09-00-00-i3.jpg"]
    );

    // 重跑: 服务恢复后补齐剩余图片
    let mut fixed = FamlyMock::start().await;
    let prefix = fixed.image_prefix();
    fixed.with_children(&[("c1", "Alice")]).await;
    fixed.with_tagged("c1", images(&prefix)).await;
    fixed.serve_all_images().await;

    let client = FamlyApiClient::new(fixed.url(), None).unwrap();
    let fetcher = HttpImageFetcher::new(client.http_client());
    let summary = Downloader::new(&client, &fetcher, &config)
        .without_pacing()
        .run(&fixed.session())
        .await
        .unwrap();

    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.fetched, 2);
    assert_eq!(DownloadState::load(&config.state_file).unwrap().len(), 3);
}

#[tokio::test]
async fn test_列表接口错误中止运行() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());

    let mut mock = FamlyMock::start().await;
    mock.with_children(&[("c1", "Alice")]).await;
    let _tagged = mock
        .server
        .mock("GET", "/api/v2/images/tagged")
        .match_query(mockito::Matcher::Any)
        .with_status(400)
        .with_body("rate limited")
        .create_async()
        .await;

    let client = FamlyApiClient::new(mock.url(), None).unwrap();
    let fetcher = HttpImageFetcher::new(client.http_client());
    let err = Downloader::new(&client, &fetcher, &config)
        .without_pacing()
        .run(&mock.session())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::FetchLoop {
            error: FetchLoopError::Listing(ApiError::HttpStatusError { status: 400, .. }),
            ..
        }
    ));
}
