//! Dockerfile model
//!
//! A Dockerfile is an optional build stage followed by a runtime stage.
//! Templates fill in the model; `render` turns it into text.

use anyhow::Result;
use serde::Serialize;
use std::fmt::Write;

/// Name of the build stage referenced by `COPY --from`
pub const BUILD_STAGE_NAME: &str = "build";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildStage {
    pub base: String,
    pub workdir: String,
    /// Files copied before the install step so dependency layers cache
    pub manifests: Vec<String>,
    pub install: Vec<String>,
    pub commands: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CopySpec {
    pub from: String,
    pub to: String,
    /// Copy out of the build stage rather than the build context
    pub from_build: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RuntimeStage {
    pub base: String,
    pub workdir: Option<String>,
    pub manifests: Vec<String>,
    pub install: Vec<String>,
    pub copy: Vec<CopySpec>,
    pub env: Vec<(String, String)>,
    pub ports: Vec<u16>,
    pub command: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Dockerfile {
    pub header: String,
    pub build: Option<BuildStage>,
    pub runtime: RuntimeStage,
}

impl Dockerfile {
    pub fn validate(&self) -> Result<()> {
        if let Some(build) = &self.build {
            if build.base.is_empty() {
                anyhow::bail!("Build base image cannot be empty");
            }
            if build.commands.is_empty() {
                anyhow::bail!("Build commands cannot be empty");
            }
        }

        if self.runtime.base.is_empty() {
            anyhow::bail!("Runtime base image cannot be empty");
        }
        for (i, copy) in self.runtime.copy.iter().enumerate() {
            if copy.from.is_empty() || copy.to.is_empty() {
                anyhow::bail!("Runtime copy[{}] paths cannot be empty", i);
            }
            if copy.from_build && self.build.is_none() {
                anyhow::bail!("Runtime copy[{}] references a missing build stage", i);
            }
        }

        Ok(())
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        if !self.header.is_empty() {
            let _ = writeln!(out, "# {}", self.header);
        }

        if let Some(build) = &self.build {
            let _ = writeln!(out, "FROM {} AS {}", build.base, BUILD_STAGE_NAME);
            let _ = writeln!(out, "WORKDIR {}", build.workdir);
            render_install(&mut out, &build.manifests, &build.install);
            let _ = writeln!(out, "COPY . .");
            for command in &build.commands {
                let _ = writeln!(out, "RUN {}", command);
            }
            out.push('\n');
        }

        let runtime = &self.runtime;
        let _ = writeln!(out, "FROM {}", runtime.base);
        if let Some(workdir) = &runtime.workdir {
            let _ = writeln!(out, "WORKDIR {}", workdir);
        }
        render_install(&mut out, &runtime.manifests, &runtime.install);
        for copy in &runtime.copy {
            if copy.from_build {
                let _ = writeln!(out, "COPY --from={} {} {}", BUILD_STAGE_NAME, copy.from, copy.to);
            } else {
                let _ = writeln!(out, "COPY {} {}", copy.from, copy.to);
            }
        }
        for (key, value) in &runtime.env {
            let _ = writeln!(out, "ENV {}={}", key, value);
        }
        for port in &runtime.ports {
            let _ = writeln!(out, "EXPOSE {}", port);
        }
        if !runtime.command.is_empty() {
            let _ = writeln!(out, "CMD {}", exec_form(&runtime.command));
        }

        out
    }
}

fn render_install(out: &mut String, manifests: &[String], install: &[String]) {
    if !manifests.is_empty() {
        let _ = writeln!(out, "COPY {} ./", manifests.join(" "));
    }
    for command in install {
        let _ = writeln!(out, "RUN {}", command);
    }
}

/// JSON exec form, e.g. `["node", "server.js"]`
fn exec_form(args: &[String]) -> String {
    serde_json::to_string(args).unwrap_or_else(|_| format!("{:?}", args))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_stage() -> Dockerfile {
        Dockerfile {
            header: "frontend (react-vite)".to_string(),
            build: Some(BuildStage {
                base: "node:18-alpine".to_string(),
                workdir: "/app".to_string(),
                manifests: vec!["package*.json".to_string()],
                install: vec!["npm install".to_string()],
                commands: vec!["npm run build".to_string()],
            }),
            runtime: RuntimeStage {
                base: "nginx:alpine".to_string(),
                copy: vec![CopySpec {
                    from: "/app/dist".to_string(),
                    to: "/usr/share/nginx/html".to_string(),
                    from_build: true,
                }],
                ports: vec![80],
                command: vec!["nginx".into(), "-g".into(), "daemon off;".into()],
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_render_two_stage() {
        let text = two_stage().render();

        assert!(text.starts_with("# frontend (react-vite)\nFROM node:18-alpine AS build\n"));
        assert!(
            text.contains("COPY package*.json ./\nRUN npm install\nCOPY . .\nRUN npm run build\n")
        );
        assert!(text.contains("\nFROM nginx:alpine\n"));
        assert!(text.contains("COPY --from=build /app/dist /usr/share/nginx/html\n"));
        assert!(text.contains("EXPOSE 80\n"));
        assert!(text.ends_with("CMD [\"nginx\",\"-g\",\"daemon off;\"]\n"));
    }

    #[test]
    fn test_render_env_order_is_stable() {
        let dockerfile = Dockerfile {
            runtime: RuntimeStage {
                base: "postgres:16-alpine".to_string(),
                env: vec![
                    ("POSTGRES_USER".to_string(), "app".to_string()),
                    ("POSTGRES_DB".to_string(), "app".to_string()),
                ],
                ports: vec![5432],
                ..Default::default()
            },
            ..Default::default()
        };

        let text = dockerfile.render();
        assert_eq!(
            text,
            "FROM postgres:16-alpine\nENV POSTGRES_USER=app\nENV POSTGRES_DB=app\nEXPOSE 5432\n"
        );
    }

    #[test]
    fn test_validate() {
        assert!(two_stage().validate().is_ok());

        let mut missing_stage = two_stage();
        missing_stage.build = None;
        assert!(missing_stage.validate().is_err());

        assert!(Dockerfile::default().validate().is_err());
    }
}
