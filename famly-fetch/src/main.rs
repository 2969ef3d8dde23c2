use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveTime;
use clap::Parser;

use famly_fetch::models::app_config::{default_state_file, DEFAULT_FILENAME_PATTERN};
use famly_fetch::models::{
    AppError, ConfigError, Credentials, FetchConfig, GpsCoordinates, RunSummary, SourceSelection,
};
use famly_fetch::services::{
    ConfigService, Downloader, FamlyApiClient, HttpImageFetcher, Scheduler, DEFAULT_API_BASE,
};
use famly_fetch::utils::{logger, time_utils};

/// Fetch kids' images from famly.co
#[derive(Debug, Parser)]
#[command(name = "famly-fetch", version, about)]
struct Cli {
    /// Your famly.co email address
    #[arg(long, env = "FAMLY_EMAIL", value_name = "EMAIL")]
    email: Option<String>,

    /// Your famly.co password
    #[arg(long, env = "FAMLY_PASSWORD", value_name = "PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Your famly.co access token (skips login)
    #[arg(long, env = "FAMLY_ACCESS_TOKEN", value_name = "TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// Don't download tagged images
    #[arg(long)]
    no_tagged: bool,

    /// Download images from child Learning Journey
    #[arg(short = 'j', long)]
    journey: bool,

    /// Download images from child notes
    #[arg(short = 'n', long)]
    notes: bool,

    /// Download images from messages
    #[arg(short = 'm', long)]
    messages: bool,

    /// Directory to save downloaded pictures
    #[arg(short = 'p', long, env = "FAMLY_PICTURES_FOLDER", default_value = "pictures")]
    pictures_folder: PathBuf,

    /// Stop downloading when an already downloaded image is encountered
    #[arg(short = 'e', long)]
    stop_on_existing: bool,

    /// Write "text - author" captions into the EXIF UserComment
    #[arg(short = 't', long)]
    text_comments: bool,

    /// Download state file [default: <pictures-folder>/.famly-fetch-state.json]
    #[arg(long, env = "FAMLY_STATE_FILE")]
    state_file: Option<PathBuf>,

    /// Filename pattern: %FP (prefix), %ID (image id) and strftime placeholders
    #[arg(long, env = "FAMLY_FILENAME_PATTERN", default_value = DEFAULT_FILENAME_PATTERN)]
    filename_pattern: String,

    /// User Agent used in Famly requests
    #[arg(
        short = 'u',
        long,
        env = "FAMLY_USER_AGENT",
        default_value = concat!("famly-fetch/", env!("CARGO_PKG_VERSION"))
    )]
    user_agent: String,

    /// Latitude for EXIF GPS data
    #[arg(long, env = "LATITUDE", value_name = "LAT", allow_negative_numbers = true)]
    latitude: Option<f64>,

    /// Longitude for EXIF GPS data
    #[arg(long, env = "LONGITUDE", value_name = "LONG", allow_negative_numbers = true)]
    longitude: Option<f64>,

    /// Run now and then every day at HH:MM (implies --stop-on-existing)
    #[arg(long, env = "FAMLY_SCHEDULE", value_name = "HH:MM")]
    schedule: Option<String>,

    /// Famly API base URL
    #[arg(long, env = "FAMLY_API_BASE", default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// Retries for a failed image download
    #[arg(long, default_value_t = 0)]
    fetch_retries: u32,

    /// Log directory
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

impl Cli {
    fn schedule_time(&self) -> Result<Option<NaiveTime>, ConfigError> {
        self.schedule
            .as_deref()
            .map(|raw| {
                time_utils::parse_schedule_time(raw)
                    .ok_or_else(|| ConfigError::InvalidSchedule(raw.to_string()))
            })
            .transpose()
    }

    /// 定时模式下强制 stop_on_existing
    fn fetch_config(&self, scheduled: bool) -> Result<FetchConfig, ConfigError> {
        let gps = GpsCoordinates::from_parts(self.latitude, self.longitude)?;
        let state_file = self
            .state_file
            .clone()
            .unwrap_or_else(|| default_state_file(&self.pictures_folder));
        let sources = SourceSelection {
            tagged: !self.no_tagged,
            journey: self.journey,
            notes: self.notes,
            messages: self.messages,
        };

        let config = FetchConfig::new(&self.pictures_folder)
            .with_state_file(state_file)
            .with_filename_pattern(self.filename_pattern.clone())
            .with_stop_on_existing(self.stop_on_existing || scheduled)
            .with_captions(self.text_comments)
            .with_gps(gps)
            .with_sources(sources)
            .with_fetch_retries(self.fetch_retries);

        config.validate()?;
        Ok(config)
    }
}

fn main() -> ExitCode {
    // .env 必须在参数解析之前加载
    let env_file = ConfigService::load_env();
    let cli = Cli::parse();

    let log_dir = cli.log_dir.clone().unwrap_or_else(logger::default_log_dir);
    let _guard = match logger::init(&log_dir) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("日志系统初始化失败: {}", e);
            None
        }
    };

    match env_file {
        Ok(Some(path)) => tracing::info!(path = %path.display(), "已加载.env文件"),
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, "加载.env文件失败"),
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("异步运行时创建失败: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "下载失败");
            eprintln!("An exception occurred: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let schedule = cli.schedule_time()?;
    let config = cli.fetch_config(schedule.is_some())?;

    let credentials = {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stdout();
        ConfigService::resolve_credentials(
            cli.access_token.clone(),
            cli.email.clone(),
            cli.password.clone(),
            &mut input,
            &mut output,
        )?
    };

    let client = FamlyApiClient::new(cli.api_base.as_str(), Some(&cli.user_agent))?;
    let fetcher = HttpImageFetcher::new(client.http_client()).with_retries(config.fetch_retries);
    let downloader = Downloader::new(&client, &fetcher, &config);

    match schedule {
        None => {
            run_once(&client, &credentials, &downloader).await?;
        }
        Some(at) => {
            let scheduler = Scheduler::new(at);
            let token = scheduler.cancellation_token();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    token.cancel();
                }
            });

            let (client, credentials, downloader) = (&client, &credentials, &downloader);
            scheduler
                .run(move || run_once(client, credentials, downloader))
                .await;
        }
    }

    Ok(())
}

/// 每次运行重新登录,定时模式下避免 token 过期
async fn run_once(
    client: &FamlyApiClient,
    credentials: &Credentials,
    downloader: &Downloader<'_>,
) -> Result<RunSummary, AppError> {
    let session = client.authenticate(credentials).await?;
    downloader.run(&session).await
}
