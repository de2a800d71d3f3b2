use serde::{Deserialize, Serialize};
use std::fmt;

crate::define_technology_enum! {
    /// Frontend technology detected from the frontend directory
    FrontendTechnology {
        React => "react" : "React",
        ReactVite => "react-vite" : "React (Vite)",
        Vue => "vue" : "Vue",
        Angular => "angular" : "Angular",
    }
}

crate::define_technology_enum! {
    /// Backend technology detected from the backend directory
    BackendTechnology {
        NodeJs => "nodejs" : "Node.js",
        PythonFlask => "python-flask" : "Python (Flask)",
    }
}

crate::define_technology_enum! {
    /// Database engine the backend talks to
    DatabaseTechnology {
        MySql => "mysql" : "MySQL",
        Postgres => "postgres" : "PostgreSQL",
        MongoDb => "mongodb" : "MongoDB",
        Redis => "redis" : "Redis",
        Sqlite => "sqlite" : "SQLite",
    }
}

/// Detection axis, used to report which part of the stack could not be identified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Frontend,
    Backend,
    Database,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Frontend => f.write_str("frontend"),
            Axis::Backend => f.write_str("backend"),
            Axis::Database => f.write_str("database"),
        }
    }
}
