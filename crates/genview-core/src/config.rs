//! Defaults and environment variables for genview tooling.
//!
//! Keeps the well-known endpoints and variable names in one place so the
//! CLI, the gene-info plugin and the presets agree on them.

/// Default endpoints.
pub mod endpoints {
    /// Static file host serving the genomic data used by the presets.
    pub const DATA_SERVER: &str = "http://localhost:8080";
    /// dictyBase GraphQL service queried by the gene-info plugin.
    pub const GENE_INFO: &str = "https://graphql.dictybase.dev/graphql";
    /// Port of the development SPARQL endpoint.
    pub const SPARQL_PORT: u16 = 8090;
    /// Path of the SPARQL endpoint on that server.
    pub const SPARQL_PATH: &str = "/sparql";
}

/// Environment variable names.
pub mod env_vars {
    pub const LOG_JSON: &str = "GENVIEW_LOG_JSON";
    pub const DATA_SERVER: &str = "GENVIEW_DATA_SERVER";
    pub const GENE_INFO_ENDPOINT: &str = "GENVIEW_GENE_INFO_ENDPOINT";
    /// Per-resource timeout used while resolving remote index files.
    pub const RESOLVE_TIMEOUT_SECS: &str = "GENVIEW_RESOLVE_TIMEOUT_SECS";
}

/// Default per-resource resolution timeout in seconds.
pub const DEFAULT_RESOLVE_TIMEOUT_SECS: u64 = 10;

/// Data server base URI from the environment, or the default.
pub fn data_server() -> String {
    std::env::var(env_vars::DATA_SERVER)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(normalize_base_uri)
        .unwrap_or_else(|| endpoints::DATA_SERVER.to_string())
}

/// Gene-info GraphQL endpoint from the environment, or the default.
pub fn gene_info_endpoint() -> String {
    std::env::var(env_vars::GENE_INFO_ENDPOINT)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| endpoints::GENE_INFO.to_string())
}

/// Resolution timeout from the environment, or the default.
pub fn resolve_timeout_secs() -> u64 {
    std::env::var(env_vars::RESOLVE_TIMEOUT_SECS)
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(DEFAULT_RESOLVE_TIMEOUT_SECS)
}

/// Whether JSON log output was requested.
pub fn log_json() -> bool {
    std::env::var(env_vars::LOG_JSON)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(false)
}

/// Strip trailing slashes so `{base}/{file}` joins cleanly.
pub fn normalize_base_uri(base: impl Into<String>) -> String {
    base.into().trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_uri() {
        assert_eq!(
            normalize_base_uri("http://localhost:8080/"),
            "http://localhost:8080"
        );
        assert_eq!(
            normalize_base_uri("http://localhost:8080///"),
            "http://localhost:8080"
        );
        assert_eq!(
            normalize_base_uri(" https://data.example.org/genomes "),
            "https://data.example.org/genomes"
        );
    }

    #[test]
    fn test_env_var_names_unique() {
        let vars = [
            env_vars::LOG_JSON,
            env_vars::DATA_SERVER,
            env_vars::GENE_INFO_ENDPOINT,
            env_vars::RESOLVE_TIMEOUT_SECS,
        ];
        let unique: std::collections::HashSet<_> = vars.iter().collect();
        assert_eq!(unique.len(), vars.len());
        for var in vars {
            assert!(var.starts_with("GENVIEW_"));
        }
    }

    #[test]
    fn test_endpoint_defaults() {
        assert!(endpoints::DATA_SERVER.starts_with("http"));
        assert!(endpoints::GENE_INFO.starts_with("https"));
        assert_eq!(endpoints::SPARQL_PORT, 8090);
    }
}
