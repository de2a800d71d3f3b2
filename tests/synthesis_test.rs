//! Artifact generation for detected stacks

mod support;

use autodeploy::stack::{BackendTechnology, DatabaseTechnology, FrontendTechnology};
use autodeploy::synthesis::compose::{ComposeFile, DependencyCondition};
use autodeploy::synthesis::{ArtifactKind, ArtifactWriter};
use autodeploy::{
    DeployConfig, DeployError, DeploymentOrchestrator, ManifestSynthesizer, ServiceSettings,
    StackProfile, SynthesisError,
};
use std::sync::Arc;
use support::{CountingProbe, FixtureCloner, ScriptedRunner};
use tempfile::TempDir;

fn orchestrator() -> DeploymentOrchestrator {
    DeploymentOrchestrator::new(
        DeployConfig::default(),
        Arc::new(FixtureCloner::new(Vec::new())),
        Arc::new(ScriptedRunner::succeeding()),
        Arc::new(CountingProbe::never()),
    )
}

#[tokio::test]
async fn test_react_vite_node_postgres_end_to_end() {
    let temp = TempDir::new().unwrap();
    support::write_tree(temp.path(), &support::react_vite_node_postgres());

    let context = orchestrator().prepare(temp.path()).await.unwrap();

    let settings = context.settings.as_ref().unwrap();
    assert_eq!(settings.backend_port, 5000);
    assert_eq!(settings.backend_entry, "server.js");

    let artifacts = context.artifacts.as_ref().unwrap();
    assert_eq!(
        artifacts.paths(),
        vec![
            "frontend/Dockerfile",
            "backend/Dockerfile",
            "database/Dockerfile",
            "docker-compose.yml",
            "nginx.conf",
            ".dockerignore",
        ]
    );

    let frontend = &artifacts.get(ArtifactKind::FrontendBuild).unwrap().content;
    assert!(frontend.contains("AS build"));
    assert!(frontend.contains("npm run build"));
    assert!(frontend.contains("/app/dist"));

    let backend = &artifacts.get(ArtifactKind::BackendBuild).unwrap().content;
    assert!(backend.contains("EXPOSE 5000"));
    assert!(backend.contains(r#"CMD ["node","server.js"]"#));

    let database = &artifacts.get(ArtifactKind::DatabaseBuild).unwrap().content;
    assert!(database.contains("FROM postgres:16-alpine"));
    assert!(database.contains("EXPOSE 5432"));

    let compose =
        ComposeFile::from_yaml(&artifacts.get(ArtifactKind::ComposeManifest).unwrap().content)
            .unwrap();
    let db = compose.service("db").unwrap();
    assert!(db.healthcheck.is_some());
    assert_eq!(db.build, "./database");
    let backend_service = compose.service("backend").unwrap();
    assert_eq!(
        backend_service.depends_on("db"),
        Some(DependencyCondition::ServiceHealthy)
    );
    assert_eq!(backend_service.ports, vec!["5000:5000".to_string()]);
    assert_eq!(compose.service("frontend").unwrap().ports, vec!["80:80".to_string()]);
    assert!(compose.networks.contains_key("app-network"));

    let proxy = &artifacts.get(ArtifactKind::ProxyConfig).unwrap().content;
    assert!(proxy.contains("location /api/"));
    assert!(proxy.contains("proxy_pass http://backend:5000"));
}

#[tokio::test]
async fn test_env_port_override_flows_into_every_artifact() {
    let temp = TempDir::new().unwrap();
    support::write_tree(
        temp.path(),
        &[
            ("client/package.json", r#"{"dependencies":{"vue":"^3.3.0"}}"#),
            ("server/requirements.txt", "flask\nredis\n"),
            ("server/.env", "DB_PORT=6379\nAPI_PORT=8000\n"),
            ("server/app.py", "if __name__ == '__main__':\n    app.run(port=5001)\n"),
            ("db/.keep", ""),
        ],
    );

    let context = orchestrator().prepare(temp.path()).await.unwrap();
    let artifacts = context.artifacts.unwrap();

    assert_eq!(context.settings.unwrap().backend_port, 8000);
    assert!(artifacts.by_path("server/Dockerfile").unwrap().content.contains("EXPOSE 8000"));
    assert!(artifacts.by_path("db/Dockerfile").is_some());
    assert!(artifacts
        .by_path("nginx.conf")
        .unwrap()
        .content
        .contains("proxy_pass http://backend:8000"));
}

#[tokio::test]
async fn test_sqlite_seed_uses_completion_dependency() {
    let temp = TempDir::new().unwrap();
    support::write_tree(
        temp.path(),
        &[
            ("frontend/package.json", r#"{"dependencies":{"react":"^18.2.0"}}"#),
            ("backend/package.json", r#"{"dependencies":{"better-sqlite3":"^9.0.0"}}"#),
            ("backend/index.js", "require('http').createServer().listen(3000)\n"),
            ("database/app.sqlite", ""),
        ],
    );

    let context = orchestrator().prepare(temp.path()).await.unwrap();
    let artifacts = context.artifacts.unwrap();
    let compose =
        ComposeFile::from_yaml(&artifacts.by_path("docker-compose.yml").unwrap().content).unwrap();

    let db = compose.service("db").unwrap();
    assert!(db.healthcheck.is_none());
    assert!(db.ports.is_empty());
    assert_eq!(
        compose.service("backend").unwrap().depends_on("db"),
        Some(DependencyCondition::ServiceCompletedSuccessfully)
    );
    assert!(compose.volumes.contains_key("db-data"));
}

#[test]
fn test_unknown_axis_writes_nothing() {
    let temp = TempDir::new().unwrap();
    let profile = StackProfile::new(
        FrontendTechnology::React,
        BackendTechnology::NodeJs,
        DatabaseTechnology::Unknown,
    );
    let settings = ServiceSettings {
        backend_port: 5000,
        backend_entry: "server.js".to_string(),
    };

    let result = ManifestSynthesizer::new().synthesize(&profile, &settings);

    assert!(matches!(
        result,
        Err(SynthesisError::UnknownTechnology { .. })
    ));
    assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_prepare_reports_structure_error_without_deleting() {
    let temp = TempDir::new().unwrap();
    support::write_tree(temp.path(), &support::missing_database());

    let err = orchestrator().prepare(temp.path()).await.unwrap_err();

    assert!(matches!(err, DeployError::StructureInvalid { .. }));
    assert!(temp.path().join("client/package.json").is_file());
}

#[tokio::test]
async fn test_writer_places_artifacts_in_role_directories() {
    let temp = TempDir::new().unwrap();
    support::write_tree(temp.path(), &support::react_vite_node_postgres());
    let context = orchestrator().prepare(temp.path()).await.unwrap();

    let written = ArtifactWriter::new(temp.path())
        .write(context.artifacts.as_ref().unwrap())
        .unwrap();

    assert_eq!(written.len(), 6);
    let ignore = std::fs::read_to_string(temp.path().join(".dockerignore")).unwrap();
    assert!(ignore.contains("node_modules"));
    assert!(temp.path().join("database/Dockerfile").is_file());
}
