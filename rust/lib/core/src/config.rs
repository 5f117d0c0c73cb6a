use std::path::PathBuf;

/// Storage and listener configuration shared by the server and its modules.
///
/// The binary fills this from its config file and CLI flags, then passes
/// it to storage initialization.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Directory holding the service's on-disk state.
    pub data_dir: Option<PathBuf>,

    /// Path to the SQLite database file.
    /// Defaults to `{data_dir}/tollgate.sqlite` if not specified.
    pub sqlite_path: Option<PathBuf>,

    /// Listen address for the HTTP server.
    pub listen: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            sqlite_path: None,
            listen: "0.0.0.0:8080".to_string(),
        }
    }
}

impl ServiceConfig {
    /// Resolve the SQLite database path, falling back to `{data_dir}/tollgate.sqlite`.
    pub fn resolve_sqlite_path(&self) -> PathBuf {
        self.sqlite_path
            .clone()
            .unwrap_or_else(|| self.resolve_data_subpath("tollgate.sqlite"))
    }

    fn resolve_data_subpath(&self, name: &str) -> PathBuf {
        self.data_dir
            .as_ref()
            .map(|d| d.join(name))
            .unwrap_or_else(|| PathBuf::from(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_defaults() {
        let config = ServiceConfig {
            data_dir: Some(PathBuf::from("/data")),
            ..Default::default()
        };
        assert_eq!(
            config.resolve_sqlite_path(),
            PathBuf::from("/data/tollgate.sqlite")
        );
        assert_eq!(config.listen, "0.0.0.0:8080");
    }

    #[test]
    fn test_explicit_sqlite_path_wins() {
        let config = ServiceConfig {
            data_dir: Some(PathBuf::from("/data")),
            sqlite_path: Some(PathBuf::from("/tmp/x.sqlite")),
            ..Default::default()
        };
        assert_eq!(config.resolve_sqlite_path(), PathBuf::from("/tmp/x.sqlite"));
    }

    #[test]
    fn test_no_data_dir_uses_cwd() {
        let config = ServiceConfig::default();
        assert_eq!(config.resolve_sqlite_path(), PathBuf::from("tollgate.sqlite"));
    }
}
