//! Process entrypoint (SPEC_FULL.md §10.5): parses CLI args, loads config,
//! connects the store, starts the scheduler, and waits for a shutdown signal.

use std::sync::Arc;

use clap::Parser;
use contest_predictor::config::Config;
use contest_predictor::domain::{Contest, DataRegion};
use contest_predictor::error::PipelineError;
use contest_predictor::handlers;
use contest_predictor::scheduler::{Scheduler, ScheduledJob};
use contest_predictor::store::Store;
use contest_predictor::upstream::UpstreamClient;
use contest_predictor::{logging, time_util};

#[derive(Parser, Debug)]
#[command(name = "contest_predictor", about = "Contest rating prediction pipeline")]
struct Args {
    /// Path to the TOML config file. Defaults to $CONTEST_PREDICTOR_CONFIG, else ./config.toml.
    #[arg(long)]
    config: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), PipelineError> {
    let args = Args::parse();
    let config_path = args.config.unwrap_or_else(Config::default_path);
    let config = Config::load_from_file(&config_path)?;
    let logging_cfg = config.logging.clone();
    let tick_interval = std::time::Duration::from_secs(config.scheduler.tick_interval_secs);
    config.install()?;

    let _log_guard = logging::init(&logging_cfg);
    tracing::info!(config = %config_path.display(), "starting contest_predictor");

    let store = Store::connect(Config::get()).await?;
    store.ensure_indexes().await?;
    let client = UpstreamClient::new();

    let scheduler = Arc::new(Scheduler::new(tick_interval));
    scheduler.mark_started()?;

    let store_handle = store.clone();
    let client_handle = client.clone();
    let run_handle = tokio::spawn(async move {
        scheduler
            .run(move |job| {
                let store = store_handle.clone();
                let client = client_handle.clone();
                async move { dispatch(job, &store, &client).await }
            })
            .await
    });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received shutdown signal, exiting");
        }
        res = run_handle => {
            if let Err(e) = res {
                tracing::error!(error = %e, "scheduler task panicked");
            }
        }
    }

    Ok(())
}

/// Runs a single scheduled job to completion, logging (never panicking on)
/// any error so one bad run never takes down the tick loop.
async fn dispatch(job: ScheduledJob, store: &Store, client: &UpstreamClient) {
    let result = match job {
        ScheduledJob::RefreshUpcomingContests => {
            handlers::save_recent_and_next_two_contests(store, client)
                .await
                .map(|_| ())
        }
        ScheduledJob::RefreshLastTwoContestRecords => refresh_last_two_contest_records(store, client).await,
        ScheduledJob::PreWarmPredict { contest_slug } => pre_warm_predict(store, client, &contest_slug).await,
        ScheduledJob::ComposedPredict { contest_slug } => composed_predict(store, client, &contest_slug).await,
    };
    if let Err(e) = result {
        tracing::error!(error = %e, "scheduled job failed");
    }
}

async fn load_contest(store: &Store, slug: &str) -> Result<Option<Contest>, PipelineError> {
    store.contests().find_by_slug(slug).await
}

async fn pre_warm_predict(
    store: &Store,
    client: &UpstreamClient,
    contest_slug: &str,
) -> Result<(), PipelineError> {
    if load_contest(store, contest_slug).await?.is_none() {
        tracing::warn!(contest_slug, "pre-warm skipped: contest not yet known");
        return Ok(());
    }
    let contest = handlers::refresh_contest_info(store, client, contest_slug).await?;
    for region in DataRegion::all() {
        let user_num = match region {
            DataRegion::Us => contest.us_user_num,
            DataRegion::Cn => contest.cn_user_num,
        }
        .unwrap_or(0);
        handlers::save_predict_contest_records(store, client, contest_slug, region, user_num).await?;
    }
    Ok(())
}

/// Readiness-gated finalization: wait for CN data parity, predict, then
/// refresh the archive view (SPEC_FULL.md §4.6, §4.7 "composedPredict").
async fn composed_predict(
    store: &Store,
    client: &UpstreamClient,
    contest_slug: &str,
) -> Result<(), PipelineError> {
    let Some(contest) = load_contest(store, contest_slug).await? else {
        tracing::warn!(contest_slug, "composed predict skipped: contest not yet known");
        return Ok(());
    };
    tracing::info!(
        contest_slug,
        status = contest.readiness_status(chrono::Utc::now()).as_str(),
        "starting composed predict"
    );

    handlers::wait_for_cn_data(|| async {
        match load_contest(store, contest_slug).await {
            Ok(Some(c)) => handlers::is_cn_data_ready(
                c.cn_user_num.unwrap_or(0),
                c.us_user_num.unwrap_or(0),
                false,
            ),
            _ => false,
        }
    })
    .await;

    handlers::predict_contest(store, &contest).await?;
    refresh_one_contest_records(store, client, &contest).await
}

async fn refresh_last_two_contest_records(store: &Store, client: &UpstreamClient) -> Result<(), PipelineError> {
    let now = chrono::Utc::now();
    let weekly = format!(
        "weekly-contest-{}",
        time_util::current_weekly_contest_number(now)
    );
    let biweekly = format!(
        "biweekly-contest-{}",
        time_util::current_biweekly_contest_number(now)
    );
    for slug in [weekly, biweekly] {
        if let Some(contest) = load_contest(store, &slug).await? {
            refresh_one_contest_records(store, client, &contest).await?;
        }
    }
    Ok(())
}

async fn refresh_one_contest_records(
    store: &Store,
    client: &UpstreamClient,
    contest: &Contest,
) -> Result<(), PipelineError> {
    for region in DataRegion::all() {
        let user_num = match region {
            DataRegion::Us => contest.us_user_num,
            DataRegion::Cn => contest.cn_user_num,
        }
        .unwrap_or(0);
        handlers::save_archive_contest_records(
            store,
            client,
            &contest.title_slug,
            region,
            user_num,
            contest.start_time,
        )
        .await?;
    }
    Ok(())
}
