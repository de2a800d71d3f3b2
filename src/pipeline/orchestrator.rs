use super::context::DeploymentContext;
use super::phase_trait::DeploymentPhase;
use super::phases::{BuildPhase, DetectPhase, ReadinessPhase, SynthesizePhase, ValidatePhase};
use super::state::{DeploymentResult, DeploymentState};
use crate::config::DeployConfig;
use crate::error::DeployError;
use crate::fs::{FileSystem, RealFileSystem};
use crate::progress::{LoggingHandler, NoOpHandler, ProgressEvent, ProgressHandler};
use crate::runtime::{
    BuildRunner, DockerComposeRunner, GitCloner, HttpProbe, ReadinessProbe, RepositoryCloner,
    RepositoryReference,
};
use crate::stack::StackProfile;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Serialises Building and AwaitingReadiness across concurrent runs in this
/// process. Generated manifests publish fixed host ports.
fn deploy_lock() -> &'static tokio::sync::Mutex<()> {
    static LOCK: OnceLock<tokio::sync::Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| tokio::sync::Mutex::new(()))
}

/// Drives one repository reference from `Idle` to `Ready` or `Failed`
pub struct DeploymentOrchestrator {
    config: DeployConfig,
    fs: Arc<dyn FileSystem>,
    cloner: Arc<dyn RepositoryCloner>,
    runner: Arc<dyn BuildRunner>,
    probe: Arc<dyn ReadinessProbe>,
    progress: Arc<dyn ProgressHandler>,
    readiness_interval: Duration,
}

struct Run {
    transitions: Vec<DeploymentState>,
    workspace: Option<PathBuf>,
    rolled_back: bool,
    stack_stopped: bool,
}

impl Run {
    fn current(&self) -> DeploymentState {
        self.transitions
            .last()
            .copied()
            .unwrap_or(DeploymentState::Idle)
    }
}

impl DeploymentOrchestrator {
    pub fn new(
        config: DeployConfig,
        cloner: Arc<dyn RepositoryCloner>,
        runner: Arc<dyn BuildRunner>,
        probe: Arc<dyn ReadinessProbe>,
    ) -> Self {
        Self {
            readiness_interval: config.readiness_interval(),
            config,
            fs: Arc::new(RealFileSystem::new()),
            cloner,
            runner,
            probe,
            progress: Arc::new(NoOpHandler),
        }
    }

    /// Production wiring: git, `docker compose`, and an HTTP probe against the configured URL
    pub fn from_config(config: DeployConfig) -> anyhow::Result<Self> {
        let probe = HttpProbe::new(config.readiness_url.clone(), config.probe_timeout())?;
        let runner = DockerComposeRunner::new(config.docker_bin.clone());

        Ok(Self::new(
            config,
            Arc::new(GitCloner::default()),
            Arc::new(runner),
            Arc::new(probe),
        )
        .with_progress(Arc::new(LoggingHandler)))
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressHandler>) -> Self {
        self.progress = progress;
        self
    }

    /// Override the configured delay between readiness attempts
    pub fn with_readiness_interval(mut self, interval: Duration) -> Self {
        self.readiness_interval = interval;
        self
    }

    pub fn config(&self) -> &DeployConfig {
        &self.config
    }

    /// Clone `reference` into a fresh workspace and deploy it.
    ///
    /// Any failure before `AwaitingReadiness` deletes the workspace. A readiness
    /// timeout stops the stack and deletes the workspace only when
    /// `teardown_on_timeout` is set.
    pub async fn run(&self, reference: &str) -> DeploymentResult {
        let started_at = Utc::now();
        let timer = Instant::now();
        info!("Starting deployment for: {}", reference);
        self.progress.on_progress(&ProgressEvent::Started {
            repository: reference.to_string(),
        });

        let mut run = Run {
            transitions: vec![DeploymentState::Idle],
            workspace: None,
            rolled_back: false,
            stack_stopped: false,
        };

        let mut profile = None;
        let outcome = self.execute(reference, &mut run, &mut profile).await;

        let error = match outcome {
            Ok(()) => {
                run.transitions.push(DeploymentState::Ready);
                info!(
                    "Deployment ready in {:.1}s: {}",
                    timer.elapsed().as_secs_f64(),
                    reference
                );
                self.progress.on_progress(&ProgressEvent::Completed {
                    total_time: timer.elapsed(),
                });
                None
            }
            Err(err) => {
                let state = run.current();
                error!(state = %state, "Deployment failed: {}", err);
                self.progress.on_progress(&ProgressEvent::Failed {
                    state,
                    error: err.to_string(),
                });
                self.roll_back(state, &mut run).await;
                run.transitions.push(DeploymentState::Failed);
                Some(err)
            }
        };

        DeploymentResult {
            repository: reference.to_string(),
            state: run.current(),
            error,
            transitions: run.transitions,
            workspace: run.workspace,
            profile,
            rolled_back: run.rolled_back,
            stack_stopped: run.stack_stopped,
            started_at,
            finished_at: Utc::now(),
        }
    }

    async fn execute(
        &self,
        reference: &str,
        run: &mut Run,
        profile: &mut Option<StackProfile>,
    ) -> Result<(), DeployError> {
        let reference = RepositoryReference::parse(reference)?;

        tokio::fs::create_dir_all(&self.config.clone_dir)
            .await
            .map_err(|e| {
                DeployError::io(
                    DeploymentState::Idle,
                    format!("Failed to create {}", self.config.clone_dir.display()),
                    e,
                )
            })?;
        let workspace = self
            .config
            .clone_dir
            .join(reference.workspace_dir_name(Utc::now().timestamp_millis()));
        run.workspace = Some(workspace.clone());

        debug!(workspace = %workspace.display(), "Cloning {}", reference);
        self.cloner.clone_repository(&reference, &workspace).await?;

        let mut context = DeploymentContext::new(self.fs.as_ref(), &workspace);
        let result = self.run_to_ready(&mut context, run).await;
        *profile = context.profile.take();
        result
    }

    async fn run_to_ready(
        &self,
        context: &mut DeploymentContext,
        run: &mut Run,
    ) -> Result<(), DeployError> {
        for phase in self.prepare_phases() {
            self.run_phase(phase.as_ref(), context, &mut run.transitions)
                .await?;
        }

        let _guard = deploy_lock().lock().await;
        debug!("Acquired deployment lock");

        let phases: Vec<Box<dyn DeploymentPhase>> = vec![
            Box::new(BuildPhase::new(self.runner.clone())),
            Box::new(ReadinessPhase::new(
                self.probe.clone(),
                self.readiness_interval,
                self.config.readiness_max_attempts,
            )),
        ];
        for phase in phases {
            self.run_phase(phase.as_ref(), context, &mut run.transitions)
                .await?;
        }

        Ok(())
    }

    /// Validate, detect and synthesize an existing tree without building or rolling back
    pub async fn prepare(&self, root: &Path) -> Result<DeploymentContext, DeployError> {
        let mut context = DeploymentContext::new(self.fs.as_ref(), root);
        let mut transitions = Vec::new();
        for phase in self.prepare_phases() {
            self.run_phase(phase.as_ref(), &mut context, &mut transitions)
                .await?;
        }
        Ok(context)
    }

    fn prepare_phases(&self) -> Vec<Box<dyn DeploymentPhase>> {
        vec![
            Box::new(ValidatePhase::default()),
            Box::new(DetectPhase::new(self.fs.clone())),
            Box::new(SynthesizePhase::new(self.fs.clone())),
        ]
    }

    async fn run_phase(
        &self,
        phase: &dyn DeploymentPhase,
        context: &mut DeploymentContext,
        transitions: &mut Vec<DeploymentState>,
    ) -> Result<(), DeployError> {
        let state = phase.state();
        info!("State: {}", state);
        transitions.push(state);
        self.progress
            .on_progress(&ProgressEvent::PhaseStarted { state });

        let phase_start = Instant::now();
        phase.execute(context).await?;

        self.progress.on_progress(&ProgressEvent::PhaseComplete {
            state,
            duration: phase_start.elapsed(),
        });
        debug!("State {} complete", state);
        Ok(())
    }

    async fn roll_back(&self, state: DeploymentState, run: &mut Run) {
        let Some(workspace) = run.workspace.clone() else {
            return;
        };

        if state == DeploymentState::AwaitingReadiness {
            if !self.config.teardown_on_timeout {
                warn!(
                    workspace = %workspace.display(),
                    "Stack left running after readiness timeout"
                );
                return;
            }

            let output = self.runner.down(&workspace).await;
            if !output.success {
                warn!(
                    workspace = %workspace.display(),
                    "Failed to stop stack, keeping workspace:\n{}",
                    output.output
                );
                return;
            }
            run.stack_stopped = true;
        } else if !state.rolls_back() {
            return;
        }

        if tokio::fs::metadata(&workspace).await.is_ok() {
            if let Err(e) = tokio::fs::remove_dir_all(&workspace).await {
                warn!(workspace = %workspace.display(), error = %e, "Failed to delete workspace");
                return;
            }
        }

        info!(workspace = %workspace.display(), "Workspace deleted");
        run.rolled_back = true;
        run.workspace = None;
        self.progress.on_progress(&ProgressEvent::RolledBack {
            path: workspace.display().to_string(),
            stack_stopped: run.stack_stopped,
        });
    }
}
