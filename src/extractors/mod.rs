// Code-based extraction of backend runtime settings
//
// Extractors read the backend directory to find the values the generated
// manifests need: the entry file to run and the port to publish.

pub mod entrypoint;
pub mod parsers;
pub mod port;

pub use entrypoint::EntryPointDetector;
pub use parsers::env_file::EnvFile;
pub use port::{PortResolver, PortSource, PortUnresolved, ResolvedPort};
