//! Manifest synthesis
//!
//! `ManifestSynthesizer::synthesize` is a pure mapping from a complete
//! [`StackProfile`] plus resolved backend settings to the artifact set:
//! one Dockerfile per component, the compose manifest, the reverse-proxy
//! config, and the exclusion list. Nothing here touches the filesystem;
//! see [`writer`] for that.

pub mod compose;
pub mod dockerfile;
pub mod ignore;
pub mod proxy;
pub mod templates;
pub mod writer;

use crate::stack::{Axis, StackProfile};
use compose::{
    ComposeFile, ComposeService, DependencyCondition, DependsOn, Network, Volume, BACKEND_SERVICE,
    COMPOSE_FILE, DATABASE_SERVICE, FRONTEND_SERVICE, NETWORK_NAME, VOLUME_NAME,
};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

pub use writer::ArtifactWriter;

pub const DOCKERFILE: &str = "Dockerfile";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SynthesisError {
    #[error("{axis} technology is unknown")]
    UnknownTechnology { axis: Axis },

    #[error("no {axis} template for '{technology}'")]
    NoTemplate { axis: Axis, technology: String },

    #[error("generated {artifact} is invalid: {reason}")]
    InvalidArtifact { artifact: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    FrontendBuild,
    BackendBuild,
    DatabaseBuild,
    ComposeManifest,
    ProxyConfig,
    IgnoreList,
}

/// One generated file, addressed relative to the repository root
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub relative_path: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArtifactSet {
    artifacts: Vec<Artifact>,
}

impl ArtifactSet {
    fn push(&mut self, kind: ArtifactKind, relative_path: impl Into<String>, content: String) {
        self.artifacts.push(Artifact {
            kind,
            relative_path: relative_path.into(),
            content,
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &Artifact> {
        self.artifacts.iter()
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    pub fn get(&self, kind: ArtifactKind) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.kind == kind)
    }

    pub fn by_path(&self, relative_path: &str) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.relative_path == relative_path)
    }

    pub fn paths(&self) -> Vec<&str> {
        self.artifacts.iter().map(|a| a.relative_path.as_str()).collect()
    }
}

/// Backend values resolved from the repository before synthesis
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceSettings {
    pub backend_port: u16,
    pub backend_entry: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestSynthesizer;

impl ManifestSynthesizer {
    pub fn new() -> Self {
        Self
    }

    pub fn synthesize(
        &self,
        profile: &StackProfile,
        settings: &ServiceSettings,
    ) -> Result<ArtifactSet, SynthesisError> {
        if let Some(axis) = profile.first_unknown() {
            return Err(SynthesisError::UnknownTechnology { axis });
        }

        let frontend = profile.frontend.technology;
        let backend = profile.backend.technology;
        let database = profile.database.technology;
        let layout = &profile.layout;

        let frontend_dockerfile =
            templates::frontend_dockerfile(frontend).ok_or_else(|| SynthesisError::NoTemplate {
                axis: Axis::Frontend,
                technology: frontend.to_string(),
            })?;
        let backend_dockerfile = templates::backend_dockerfile(
            backend,
            settings.backend_port,
            &settings.backend_entry,
        )
        .ok_or_else(|| SynthesisError::NoTemplate {
            axis: Axis::Backend,
            technology: backend.to_string(),
        })?;
        let engine =
            templates::database_engine(database).ok_or_else(|| SynthesisError::NoTemplate {
                axis: Axis::Database,
                technology: database.to_string(),
            })?;
        let database_dockerfile = templates::database_dockerfile(database, &engine);

        let compose = compose_manifest(profile, settings, &engine);
        compose.validate().map_err(|e| invalid(COMPOSE_FILE, e))?;
        let compose_yaml = compose.to_yaml().map_err(|e| invalid(COMPOSE_FILE, e))?;

        let mut set = ArtifactSet::default();
        for (kind, dir, dockerfile) in [
            (ArtifactKind::FrontendBuild, &layout.frontend, frontend_dockerfile),
            (ArtifactKind::BackendBuild, &layout.backend, backend_dockerfile),
            (ArtifactKind::DatabaseBuild, &layout.database, database_dockerfile),
        ] {
            let path = format!("{}/{}", dir, DOCKERFILE);
            dockerfile.validate().map_err(|e| invalid(&path, e))?;
            set.push(kind, path, dockerfile.render());
        }
        set.push(ArtifactKind::ComposeManifest, COMPOSE_FILE, compose_yaml);
        set.push(
            ArtifactKind::ProxyConfig,
            proxy::PROXY_CONFIG_FILE,
            proxy::render(settings.backend_port),
        );
        set.push(ArtifactKind::IgnoreList, ignore::IGNORE_FILE, ignore::render());

        debug!(artifacts = set.len(), "Manifests synthesized");
        Ok(set)
    }
}

fn invalid(artifact: &str, error: anyhow::Error) -> SynthesisError {
    SynthesisError::InvalidArtifact {
        artifact: artifact.to_string(),
        reason: error.to_string(),
    }
}

fn compose_manifest(
    profile: &StackProfile,
    settings: &ServiceSettings,
    engine: &templates::DatabaseEngine,
) -> ComposeFile {
    let layout = &profile.layout;
    let networks = vec![NETWORK_NAME.to_string()];
    let port = settings.backend_port;

    let mut database = ComposeService {
        build: format!("./{}", layout.database),
        environment: engine.env.iter().cloned().collect(),
        volumes: vec![format!("{}:{}", VOLUME_NAME, engine.data_dir)],
        healthcheck: engine.healthcheck.clone(),
        networks: networks.clone(),
        ..Default::default()
    };
    let db_condition = if engine.is_seed() {
        DependencyCondition::ServiceCompletedSuccessfully
    } else {
        database.restart = Some("unless-stopped".to_string());
        DependencyCondition::ServiceHealthy
    };
    if let Some(db_port) = engine.port {
        database.ports = vec![format!("{0}:{0}", db_port)];
    }

    let mut backend_environment = BTreeMap::new();
    backend_environment.insert("PORT".to_string(), port.to_string());
    let mut backend_volumes = Vec::new();
    if engine.is_seed() {
        backend_volumes.push(format!("{}:{}", VOLUME_NAME, templates::SEED_DATA_DIR));
    } else {
        backend_environment.insert("DB_HOST".to_string(), DATABASE_SERVICE.to_string());
        if let Some(db_port) = engine.port {
            backend_environment.insert("DB_PORT".to_string(), db_port.to_string());
        }
    }
    let backend = ComposeService {
        build: format!("./{}", layout.backend),
        ports: vec![format!("{0}:{0}", port)],
        environment: backend_environment,
        depends_on: BTreeMap::from([(
            DATABASE_SERVICE.to_string(),
            DependsOn {
                condition: db_condition,
            },
        )]),
        volumes: backend_volumes,
        restart: Some("unless-stopped".to_string()),
        networks: networks.clone(),
        ..Default::default()
    };

    let frontend = ComposeService {
        build: format!("./{}", layout.frontend),
        ports: vec![format!("{0}:{0}", templates::FRONTEND_PORT)],
        depends_on: BTreeMap::from([(
            BACKEND_SERVICE.to_string(),
            DependsOn {
                condition: DependencyCondition::ServiceStarted,
            },
        )]),
        volumes: vec![format!(
            "./{}:{}:ro",
            proxy::PROXY_CONFIG_FILE,
            proxy::PROXY_CONFIG_MOUNT
        )],
        restart: Some("unless-stopped".to_string()),
        networks,
        ..Default::default()
    };

    ComposeFile {
        services: BTreeMap::from([
            (FRONTEND_SERVICE.to_string(), frontend),
            (BACKEND_SERVICE.to_string(), backend),
            (DATABASE_SERVICE.to_string(), database),
        ]),
        networks: BTreeMap::from([(
            NETWORK_NAME.to_string(),
            Network {
                driver: Some("bridge".to_string()),
            },
        )]),
        volumes: BTreeMap::from([(VOLUME_NAME.to_string(), Volume::default())]),
    }
}
