// src/config.rs

use std::{env, path::PathBuf, sync::Arc};

use crate::{
    db::{RecordStore, Repository, SqliteRepository},
    services::{
        advance_service::AdvanceService,
        batch_service::{ArtifactSink, BatchService, DirectorySink},
        car_fare_service::CarFareService,
        contract_service::ContractService,
        document_service::{DocumentRenderer, PdfRenderer},
        jobs::{start_job_updater, JobsState},
        payslip_service::PayslipService,
        settings_service::SettingsService,
        work_log_service::WorkLogService,
        worker_service::WorkerService,
    },
};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub fonts_dir: PathBuf,
    pub font_family: String,
    pub output_dir: PathBuf,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

impl Config {
    /// Reads `.env` (if present) and the process environment.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            database_url: var_or("DATABASE_URL", "sqlite://payroll.db"),
            bind_addr: var_or("BIND_ADDR", "127.0.0.1:3000"),
            fonts_dir: PathBuf::from(var_or("FONTS_DIR", "./fonts")),
            font_family: var_or("FONT_FAMILY", "Roboto"),
            output_dir: PathBuf::from(var_or("OUTPUT_DIR", "./payslips")),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub worker_service: WorkerService,
    pub contract_service: ContractService,
    pub work_log_service: WorkLogService,
    pub advance_service: AdvanceService,
    pub car_fare_service: CarFareService,
    pub settings_service: SettingsService,
    pub payslip_service: PayslipService,
    pub batch_service: BatchService,
    pub jobs: JobsState,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env();

        let repo = SqliteRepository::connect(&config.database_url).await?;
        let renderer = Arc::new(PdfRenderer::new(&config.fonts_dir, &config.font_family));
        let sink = Arc::new(DirectorySink::new(&config.output_dir));

        Ok(Self::assemble(config, Arc::new(repo), renderer, sink))
    }

    /// Wires every service on top of one repository. Spawns the job updater,
    /// so it must run inside a tokio runtime.
    pub fn assemble(
        config: Config,
        repo: Arc<dyn Repository>,
        renderer: Arc<dyn DocumentRenderer>,
        sink: Arc<dyn ArtifactSink>,
    ) -> Self {
        let store = RecordStore::new(repo);

        let (jobs, rx) = JobsState::new();
        tokio::spawn(start_job_updater(jobs.clone(), rx));

        Self {
            config: Arc::new(config),
            worker_service: WorkerService::new(store.clone()),
            contract_service: ContractService::new(store.clone()),
            work_log_service: WorkLogService::new(store.clone()),
            advance_service: AdvanceService::new(store.clone()),
            car_fare_service: CarFareService::new(store.clone()),
            settings_service: SettingsService::new(store.clone()),
            payslip_service: PayslipService::new(store.clone(), renderer.clone()),
            batch_service: BatchService::new(store, renderer, sink),
            jobs,
        }
    }
}
