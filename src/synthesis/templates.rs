//! Per-technology build templates

use super::compose::Healthcheck;
use super::dockerfile::{BuildStage, CopySpec, Dockerfile, RuntimeStage};
use crate::stack::{BackendTechnology, DatabaseTechnology, FrontendTechnology};

const NODE_IMAGE: &str = "node:18-alpine";
const NGINX_IMAGE: &str = "nginx:alpine";
const PYTHON_IMAGE: &str = "python:3.11-slim";
const SEED_IMAGE: &str = "alpine:3.20";

pub const NGINX_HTML_ROOT: &str = "/usr/share/nginx/html";
pub const FRONTEND_PORT: u16 = 80;
/// Mount point of the shared database volume in seed and backend containers
pub const SEED_DATA_DIR: &str = "/data";

const DB_NAME: &str = "app";
const DB_USER: &str = "app";
const DB_PASSWORD: &str = "app";

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Static asset directory produced by `npm run build`
pub fn frontend_output_dir(technology: FrontendTechnology) -> Option<&'static str> {
    match technology {
        FrontendTechnology::React => Some("build"),
        FrontendTechnology::ReactVite | FrontendTechnology::Vue | FrontendTechnology::Angular => {
            Some("dist")
        }
        FrontendTechnology::Unknown => None,
    }
}

pub fn frontend_dockerfile(technology: FrontendTechnology) -> Option<Dockerfile> {
    let output_dir = frontend_output_dir(technology)?;

    Some(Dockerfile {
        header: format!("frontend ({})", technology),
        build: Some(BuildStage {
            base: NODE_IMAGE.to_string(),
            workdir: "/app".to_string(),
            manifests: strings(&["package*.json"]),
            install: strings(&["npm install"]),
            commands: strings(&["npm run build"]),
        }),
        runtime: RuntimeStage {
            base: NGINX_IMAGE.to_string(),
            copy: vec![CopySpec {
                from: format!("/app/{}", output_dir),
                to: NGINX_HTML_ROOT.to_string(),
                from_build: true,
            }],
            ports: vec![FRONTEND_PORT],
            command: strings(&["nginx", "-g", "daemon off;"]),
            ..Default::default()
        },
    })
}

pub fn backend_dockerfile(
    technology: BackendTechnology,
    port: u16,
    entry: &str,
) -> Option<Dockerfile> {
    let (base, manifests, install, interpreter) = match technology {
        BackendTechnology::NodeJs => (
            NODE_IMAGE,
            strings(&["package*.json"]),
            strings(&["npm install --omit=dev"]),
            "node",
        ),
        BackendTechnology::PythonFlask => (
            PYTHON_IMAGE,
            strings(&["requirements.txt"]),
            strings(&["pip install --no-cache-dir -r requirements.txt"]),
            "python",
        ),
        BackendTechnology::Unknown => return None,
    };

    Some(Dockerfile {
        header: format!("backend ({})", technology),
        build: None,
        runtime: RuntimeStage {
            base: base.to_string(),
            workdir: Some("/app".to_string()),
            manifests,
            install,
            copy: vec![CopySpec {
                from: ".".to_string(),
                to: ".".to_string(),
                from_build: false,
            }],
            env: vec![("PORT".to_string(), port.to_string())],
            ports: vec![port],
            command: vec![interpreter.to_string(), entry.to_string()],
        },
    })
}

/// Engine image, port, data directory, and readiness probe for a database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseEngine {
    pub image: &'static str,
    pub port: Option<u16>,
    pub env: Vec<(String, String)>,
    pub data_dir: &'static str,
    pub healthcheck: Option<Healthcheck>,
}

impl DatabaseEngine {
    /// Whether the service runs to completion instead of staying up
    pub fn is_seed(&self) -> bool {
        self.port.is_none()
    }
}

fn env(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn database_engine(technology: DatabaseTechnology) -> Option<DatabaseEngine> {
    let engine = match technology {
        DatabaseTechnology::MySql => DatabaseEngine {
            image: "mysql:8.0",
            port: Some(3306),
            env: env(&[
                ("MYSQL_ROOT_PASSWORD", DB_PASSWORD),
                ("MYSQL_DATABASE", DB_NAME),
                ("MYSQL_USER", DB_USER),
                ("MYSQL_PASSWORD", DB_PASSWORD),
            ]),
            data_dir: "/var/lib/mysql",
            healthcheck: Some(Healthcheck::cmd(&["mysqladmin", "ping", "-h", "localhost"])),
        },
        DatabaseTechnology::Postgres => DatabaseEngine {
            image: "postgres:16-alpine",
            port: Some(5432),
            env: env(&[
                ("POSTGRES_USER", DB_USER),
                ("POSTGRES_PASSWORD", DB_PASSWORD),
                ("POSTGRES_DB", DB_NAME),
            ]),
            data_dir: "/var/lib/postgresql/data",
            healthcheck: Some(Healthcheck::shell(&format!("pg_isready -U {}", DB_USER))),
        },
        DatabaseTechnology::MongoDb => DatabaseEngine {
            image: "mongo:7",
            port: Some(27017),
            env: env(&[("MONGO_INITDB_DATABASE", DB_NAME)]),
            data_dir: "/data/db",
            healthcheck: Some(Healthcheck::cmd(&[
                "mongosh",
                "--quiet",
                "--eval",
                "db.adminCommand('ping')",
            ])),
        },
        DatabaseTechnology::Redis => DatabaseEngine {
            image: "redis:7-alpine",
            port: Some(6379),
            env: Vec::new(),
            data_dir: "/data",
            healthcheck: Some(Healthcheck::cmd(&["redis-cli", "ping"])),
        },
        DatabaseTechnology::Sqlite => DatabaseEngine {
            image: SEED_IMAGE,
            port: None,
            env: Vec::new(),
            data_dir: SEED_DATA_DIR,
            healthcheck: None,
        },
        DatabaseTechnology::Unknown => return None,
    };
    Some(engine)
}

pub fn database_dockerfile(technology: DatabaseTechnology, engine: &DatabaseEngine) -> Dockerfile {
    let mut runtime = RuntimeStage {
        base: engine.image.to_string(),
        env: engine.env.clone(),
        ports: engine.port.into_iter().collect(),
        ..Default::default()
    };

    if engine.is_seed() {
        runtime.workdir = Some("/seed".to_string());
        runtime.copy.push(CopySpec {
            from: ".".to_string(),
            to: "/seed".to_string(),
            from_build: false,
        });
        runtime.command = strings(&[
            "sh",
            "-c",
            &format!("mkdir -p {0} && cp -rn /seed/. {0}/", engine.data_dir),
        ]);
    }

    Dockerfile {
        header: format!("database ({})", technology),
        build: None,
        runtime,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    #[parameterized(
        react = { FrontendTechnology::React, "/app/build" },
        react_vite = { FrontendTechnology::ReactVite, "/app/dist" },
        vue = { FrontendTechnology::Vue, "/app/dist" },
        angular = { FrontendTechnology::Angular, "/app/dist" },
    )]
    fn test_frontend_output_dir(technology: FrontendTechnology, expected: &str) {
        let dockerfile = frontend_dockerfile(technology).unwrap();
        assert_eq!(dockerfile.runtime.copy[0].from, expected);
        assert!(dockerfile.validate().is_ok());
    }

    #[test]
    fn test_unknown_has_no_template() {
        assert!(frontend_dockerfile(FrontendTechnology::Unknown).is_none());
        assert!(backend_dockerfile(BackendTechnology::Unknown, 5000, "server.js").is_none());
        assert!(database_engine(DatabaseTechnology::Unknown).is_none());
    }

    #[test]
    fn test_node_backend_dockerfile() {
        let text = backend_dockerfile(BackendTechnology::NodeJs, 5000, "server.js")
            .unwrap()
            .render();

        assert!(text.contains("FROM node:18-alpine\n"));
        assert!(text.contains("RUN npm install --omit=dev\n"));
        assert!(text.contains("ENV PORT=5000\nEXPOSE 5000\n"));
        assert!(text.contains("CMD [\"node\",\"server.js\"]"));
    }

    #[test]
    fn test_flask_backend_dockerfile() {
        let text = backend_dockerfile(BackendTechnology::PythonFlask, 8000, "app.py")
            .unwrap()
            .render();

        assert!(text.contains("FROM python:3.11-slim\n"));
        assert!(text.contains("COPY requirements.txt ./\n"));
        assert!(text.contains("EXPOSE 8000\n"));
        assert!(text.contains("CMD [\"python\",\"app.py\"]"));
    }

    #[parameterized(
        mysql = { DatabaseTechnology::MySql, "mysql:8.0", Some(3306) },
        postgres = { DatabaseTechnology::Postgres, "postgres:16-alpine", Some(5432) },
        mongodb = { DatabaseTechnology::MongoDb, "mongo:7", Some(27017) },
        redis = { DatabaseTechnology::Redis, "redis:7-alpine", Some(6379) },
        sqlite = { DatabaseTechnology::Sqlite, "alpine:3.20", None },
    )]
    fn test_database_engines(technology: DatabaseTechnology, image: &str, port: Option<u16>) {
        let engine = database_engine(technology).unwrap();
        assert_eq!(engine.image, image);
        assert_eq!(engine.port, port);
        assert_eq!(engine.healthcheck.is_some(), port.is_some());

        let dockerfile = database_dockerfile(technology, &engine);
        assert_eq!(dockerfile.runtime.ports, port.into_iter().collect::<Vec<_>>());
    }

    #[test]
    fn test_sqlite_seed_copies_into_volume() {
        let engine = database_engine(DatabaseTechnology::Sqlite).unwrap();
        let text = database_dockerfile(DatabaseTechnology::Sqlite, &engine).render();

        assert!(text.contains("COPY . /seed\n"));
        assert!(text.contains("cp -rn /seed/. /data/"));
        assert!(!text.contains("EXPOSE"));
    }
}
