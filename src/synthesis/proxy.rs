//! Reverse-proxy configuration for the frontend container

use super::compose::BACKEND_SERVICE;
use super::templates::{FRONTEND_PORT, NGINX_HTML_ROOT};

pub const PROXY_CONFIG_FILE: &str = "nginx.conf";
/// Path inside the frontend container the config is mounted at
pub const PROXY_CONFIG_MOUNT: &str = "/etc/nginx/conf.d/default.conf";
pub const API_PREFIX: &str = "/api/";

/// Render a server block serving the static build at `/` (with SPA
/// fallback) and proxying `API_PREFIX` to the backend service.
pub fn render(backend_port: u16) -> String {
    format!(
        r#"server {{
    listen {listen};
    server_name _;

    root {root};
    index index.html;

    location / {{
        try_files $uri $uri/ /index.html;
    }}

    location {prefix} {{
        proxy_pass http://{backend}:{port};
        proxy_http_version 1.1;
        proxy_set_header Host $host;
        proxy_set_header X-Real-IP $remote_addr;
        proxy_set_header X-Forwarded-For $proxy_add_x_forwarded_for;
        proxy_set_header X-Forwarded-Proto $scheme;
    }}
}}
"#,
        listen = FRONTEND_PORT,
        root = NGINX_HTML_ROOT,
        prefix = API_PREFIX,
        backend = BACKEND_SERVICE,
        port = backend_port,
    )
}
