// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 scrapeflow contributors

//! Task runner: built-in scrape and analysis tasks

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::path::PathBuf;
use std::time::Instant;

use super::{StepOutcome, StepRunner};
use crate::analysis::{
    load_handedness, load_team_splits, recommend, render_report, team_splits_from_records, Hand,
    ProjectionReport, StreamCriteria, StreamInputs, TeamSplits,
};
use crate::data::{DataStore, Record};
use crate::errors::ScrapeflowError;
use crate::sources::{
    fetch_auction, fetch_free_agents, fetch_pitcher_leaders, fetch_team_splits, fetch_week,
    AuctionSettings, EspnCredentials, HttpClient, PlayerType, Split,
};
use crate::utils::create_spinner;
use crate::workflow::{Action, ChangesTask, NativeTask, RunContext, SeasonTask, Step, StreamTask};

/// Task runner
pub struct TaskRunner;

impl TaskRunner {
    pub fn new() -> Self {
        Self
    }

    /// Run a task and return the files it wrote plus its printed output
    pub async fn run_task(
        &self,
        task: &NativeTask,
        ctx: &RunContext,
        env: &HashMap<String, String>,
    ) -> Result<(Vec<PathBuf>, String), ScrapeflowError> {
        match task {
            NativeTask::AuctionScrape(settings) => auction_scrape(settings, ctx).await,
            NativeTask::TeamSplits(season) => team_splits(season, ctx).await,
            NativeTask::PitcherLeaders(season) => pitcher_leaders(season, ctx).await,
            NativeTask::SmartStream(stream) => smart_stream(stream, ctx, env).await,
            NativeTask::ProjectionChanges(changes) => projection_changes(changes, ctx),
        }
    }
}

impl Default for TaskRunner {
    fn default() -> Self {
        Self::new()
    }
}

fn season_for(task: &SeasonTask, ctx: &RunContext) -> i32 {
    task.season
        .unwrap_or_else(|| ctx.settings.fangraphs_season(ctx.run_date()))
}

async fn auction_scrape(
    settings: &AuctionSettings,
    ctx: &RunContext,
) -> Result<(Vec<PathBuf>, String), ScrapeflowError> {
    let client = HttpClient::new(&ctx.settings.http)?;
    let dir = settings
        .output_dir
        .as_deref()
        .map(|d| ctx.resolve(d))
        .unwrap_or_else(|| ctx.paths.data_dir.clone());
    let store = DataStore::new(dir);

    let http = &client;
    let written = fetch_snapshots(
        &client,
        &store,
        ctx.run_date(),
        &[PlayerType::Batters, PlayerType::Pitchers],
        "auction values",
        PlayerType::file_base,
        move |player_type| fetch_auction(http, settings, player_type),
    )
    .await?;

    let summary = format!("Wrote {} auction snapshot(s)", written.len());
    Ok((written, summary))
}

/// Fetch every key in order, then write the responses that carried data
///
/// A failed request returns before anything is written, so a run never
/// leaves half a snapshot set for the publish step.
async fn fetch_snapshots<K, F, Fut>(
    client: &HttpClient,
    store: &DataStore,
    date: NaiveDate,
    keys: &[K],
    what: &str,
    file_base: fn(K) -> &'static str,
    fetch: F,
) -> Result<Vec<PathBuf>, ScrapeflowError>
where
    K: Copy + Display,
    F: Fn(K) -> Fut,
    Fut: Future<Output = Result<Option<Vec<Record>>, ScrapeflowError>>,
{
    let mut fetched = Vec::with_capacity(keys.len());
    for (i, key) in keys.iter().copied().enumerate() {
        if i > 0 {
            client.pause().await;
        }

        let spinner = create_spinner(&format!("Fetching {} {}...", key, what));
        let records = fetch(key).await;
        spinner.finish_and_clear();

        match records? {
            Some(records) => fetched.push((key, records)),
            None => tracing::warn!("Skipping {}: no data in response", key),
        }
    }

    fetched
        .into_iter()
        .map(|(key, records)| store.write_records(date, file_base(key), &records))
        .collect()
}

async fn team_splits(
    task: &SeasonTask,
    ctx: &RunContext,
) -> Result<(Vec<PathBuf>, String), ScrapeflowError> {
    let client = HttpClient::new(&ctx.settings.http)?;
    let season = season_for(task, ctx);
    let store = DataStore::new(ctx.paths.data_dir.clone());

    let http = &client;
    let written = fetch_snapshots(
        &client,
        &store,
        ctx.run_date(),
        &Split::ALL,
        &format!("team splits ({})", season),
        Split::file_base,
        move |split| async move { fetch_team_splits(http, season, split).await.map(Some) },
    )
    .await?;

    let summary = format!("Wrote {} team split snapshots", written.len());
    Ok((written, summary))
}

async fn pitcher_leaders(
    task: &SeasonTask,
    ctx: &RunContext,
) -> Result<(Vec<PathBuf>, String), ScrapeflowError> {
    let client = HttpClient::new(&ctx.settings.http)?;
    let season = season_for(task, ctx);
    let store = DataStore::new(ctx.paths.data_dir.clone());

    let spinner = create_spinner(&format!("Fetching {} pitcher leaders...", season));
    let records = fetch_pitcher_leaders(&client, season).await;
    spinner.finish_and_clear();

    let records = records?;
    let path = store.write_records(ctx.run_date(), "fangraphs_pitcher_leaders", &records)?;
    Ok((vec![path], format!("Wrote {} pitcher leaders", records.len())))
}

async fn split_stats(
    file: Option<&PathBuf>,
    split: Split,
    client: &HttpClient,
    ctx: &RunContext,
) -> Result<TeamSplits, ScrapeflowError> {
    match file {
        Some(path) => load_team_splits(&ctx.resolve(path)),
        None => {
            let season = ctx.settings.fangraphs_season(ctx.run_date());
            let records = fetch_team_splits(client, season, split).await?;
            Ok(team_splits_from_records(&records))
        }
    }
}

async fn smart_stream(
    task: &StreamTask,
    ctx: &RunContext,
    env: &HashMap<String, String>,
) -> Result<(Vec<PathBuf>, String), ScrapeflowError> {
    let credentials = EspnCredentials::from_env(env)?;
    let client = HttpClient::new(&ctx.settings.http)?;
    let start = ctx.run_date();

    let spinner = create_spinner("Fetching team splits...");
    let vs_lhp = split_stats(task.lhp_stats.as_ref(), Split::VsLhp, &client, ctx).await;
    let vs_rhp = split_stats(task.rhp_stats.as_ref(), Split::VsRhp, &client, ctx).await;
    spinner.finish_and_clear();
    let (vs_lhp, vs_rhp) = (vs_lhp?, vs_rhp?);

    let mut handedness = HashMap::new();
    for (file, hand) in [(&task.left_handed, Hand::Left), (&task.right_handed, Hand::Right)] {
        if let Some(path) = file {
            handedness.extend(load_handedness(&ctx.resolve(path), hand)?);
        }
    }

    let spinner = create_spinner(&format!("Fetching {} days of probable pitchers...", task.days));
    let matchups = fetch_week(&client, start, task.days).await;
    spinner.finish_and_clear();
    let matchups = matchups?;

    let spinner = create_spinner("Fetching ESPN free agents...");
    let free_agents = fetch_free_agents(&client, &ctx.settings.espn, &credentials).await;
    spinner.finish_and_clear();
    let free_agents = free_agents?;

    tracing::info!(
        "{} games, {} free agents, {} pitchers with known hand",
        matchups.len(),
        free_agents.len(),
        handedness.len()
    );

    let days = recommend(&StreamInputs {
        matchups: &matchups,
        free_agents: &free_agents,
        vs_lhp: &vs_lhp,
        vs_rhp: &vs_rhp,
        handedness: &handedness,
        criteria: StreamCriteria {
            max_wrc_plus: task.max_wrc_plus,
            min_k_percent: task.min_k_percent,
        },
    });
    let report = render_report(start, &days);

    let output = ctx.resolve(&task.output);
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&output, &report).map_err(|e| ScrapeflowError::FileWriteError {
        path: output.clone(),
        error: e.to_string(),
    })?;
    tracing::info!("Results saved to {}", output.display());

    Ok((vec![output], report))
}

fn projection_changes(
    task: &ChangesTask,
    ctx: &RunContext,
) -> Result<(Vec<PathBuf>, String), ScrapeflowError> {
    let store = DataStore::new(ctx.paths.data_dir.clone());
    let report = ProjectionReport::analyze(&store)?;

    if report.changes.is_empty() {
        tracing::warn!("No players with snapshots on two different dates in {}", store.dir().display());
    }

    let text = report.render(task.top);
    print!("{}", text);

    let written = report.write_outputs(&ctx.resolve(&task.output_dir))?;
    Ok((written, text))
}

fn invalid(step: &Step, reason: &str) -> ScrapeflowError {
    ScrapeflowError::InvalidStep {
        step: step.name.clone(),
        reason: reason.to_string(),
    }
}

#[async_trait]
impl StepRunner for TaskRunner {
    async fn execute(
        &self,
        step: &Step,
        ctx: &RunContext,
        env: &HashMap<String, String>,
    ) -> Result<StepOutcome, ScrapeflowError> {
        let Action::Task { task } = &step.action else {
            return Err(invalid(step, "Expected task action"));
        };

        let start = Instant::now();
        tracing::debug!("Running task {}", task);

        let (outputs, stdout) = self.run_task(task, ctx, env).await?;
        Ok(StepOutcome::success(stdout, start.elapsed(), outputs))
    }

    async fn check_available(&self) -> Result<bool, ScrapeflowError> {
        Ok(true)
    }

    fn validate_step(&self, step: &Step) -> Result<(), ScrapeflowError> {
        let Action::Task { task } = &step.action else {
            return Err(invalid(step, "Not a task step"));
        };

        match task {
            NativeTask::AuctionScrape(settings) => {
                if settings.teams == 0 {
                    return Err(invalid(step, "League must have at least one team"));
                }
                if settings.projection.trim().is_empty() {
                    return Err(invalid(step, "Projection system is empty"));
                }
            }
            NativeTask::SmartStream(stream) => {
                if stream.days == 0 {
                    return Err(invalid(step, "Streaming window must cover at least one day"));
                }
                if stream.output.as_os_str().is_empty() {
                    return Err(invalid(step, "Report output path is empty"));
                }
            }
            NativeTask::ProjectionChanges(changes) if changes.top == 0 => {
                return Err(invalid(step, "Report must show at least one row per anomaly type"));
            }
            NativeTask::TeamSplits(_) | NativeTask::PitcherLeaders(_) | NativeTask::ProjectionChanges(_) => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{CHANGES_FILE, SUMMARY_FILE};
    use crate::steps::test_support::{context, step};

    fn task_step(task: NativeTask) -> Step {
        step("task", Action::Task { task })
    }

    fn quiet_client() -> HttpClient {
        HttpClient::new(&crate::config::HttpConfig {
            request_delay_ms: 0,
            ..Default::default()
        })
        .unwrap()
    }

    fn records(name: &str) -> Vec<Record> {
        let mut record = Record::new();
        record.insert("PlayerName".into(), name.into());
        vec![record]
    }

    #[tokio::test]
    async fn test_failed_fetch_writes_no_snapshots() {
        let dir = tempfile::tempdir().unwrap();
        let store = DataStore::new(dir.path().join("ac_data"));
        let date = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();

        let result = fetch_snapshots(
            &quiet_client(),
            &store,
            date,
            &[PlayerType::Batters, PlayerType::Pitchers],
            "auction values",
            PlayerType::file_base,
            |player_type| async move {
                match player_type {
                    PlayerType::Batters => Ok(Some(records("Aaron Judge"))),
                    PlayerType::Pitchers => Err(ScrapeflowError::HttpStatus {
                        url: "https://www.fangraphs.com".into(),
                        status: 503,
                        body: String::new(),
                    }),
                }
            },
        )
        .await;

        assert!(matches!(result, Err(ScrapeflowError::HttpStatus { status: 503, .. })));
        assert!(store.list_snapshots().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_response_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let store = DataStore::new(dir.path().join("ac_data"));
        let date = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();

        let written = fetch_snapshots(
            &quiet_client(),
            &store,
            date,
            &[PlayerType::Batters, PlayerType::Pitchers],
            "auction values",
            PlayerType::file_base,
            |player_type| async move {
                Ok::<_, ScrapeflowError>((player_type == PlayerType::Pitchers).then(|| records("Tarik Skubal")))
            },
        )
        .await
        .unwrap();

        assert_eq!(written.len(), 1);
        assert!(written[0].ends_with("2025-05-01_fangraphs_pitchers.csv"));
    }

    #[test]
    fn test_validate_task_settings() {
        let runner = TaskRunner::new();

        assert!(runner
            .validate_step(&task_step(NativeTask::AuctionScrape(AuctionSettings::default())))
            .is_ok());

        let no_teams = AuctionSettings {
            teams: 0,
            ..AuctionSettings::default()
        };
        assert!(runner.validate_step(&task_step(NativeTask::AuctionScrape(no_teams))).is_err());

        let no_days = StreamTask {
            days: 0,
            ..StreamTask::default()
        };
        assert!(runner.validate_step(&task_step(NativeTask::SmartStream(no_days))).is_err());

        let no_rows = ChangesTask {
            top: 0,
            ..ChangesTask::default()
        };
        assert!(runner.validate_step(&task_step(NativeTask::ProjectionChanges(no_rows))).is_err());
    }

    #[tokio::test]
    async fn test_smart_stream_requires_cookies() {
        let dir = tempfile::tempdir().unwrap();
        let runner = TaskRunner::new();

        let err = runner
            .execute(
                &task_step(NativeTask::SmartStream(StreamTask::default())),
                &context(dir.path()),
                &HashMap::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeflowError::MissingCredential { .. }));
    }

    #[tokio::test]
    async fn test_projection_changes_writes_reports() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("ac_data");
        std::fs::create_dir_all(&data).unwrap();
        for (date, pa) in [("2025-04-01", 500), ("2025-04-15", 520)] {
            std::fs::write(
                data.join(format!("{}_fangraphs_pitchers.csv", date)),
                format!("date,PlayerName,Team,aPOS,PA,PTS\n{},Tarik Skubal,DET,SP,{},700\n", date, pa),
            )
            .unwrap();
        }

        let runner = TaskRunner::new();
        let task = NativeTask::ProjectionChanges(ChangesTask {
            output_dir: PathBuf::from("reports"),
            top: 5,
        });
        let outcome = runner
            .execute(&task_step(task), &context(dir.path()), &HashMap::new())
            .await
            .unwrap();

        assert!(outcome.success);
        assert!(outcome.stdout.contains("Total Players Analyzed: 1"));
        assert_eq!(outcome.outputs.len(), 2);
        assert!(dir.path().join("reports").join(CHANGES_FILE).exists());
        assert!(dir.path().join("reports").join(SUMMARY_FILE).exists());
    }
}
