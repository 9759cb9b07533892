//! Extracting the requested region from a SPARQL query.
//!
//! The adapter fills its query template with the region, so the values can
//! be recovered with patterns instead of a SPARQL parser.

use std::sync::OnceLock;

use regex::Regex;

pub const DEFAULT_REF_NAME: &str = "chr1";
pub const DEFAULT_START: u64 = 0;
pub const DEFAULT_END: u64 = 1_000_000;

/// Region a query asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRange {
    pub ref_name: String,
    pub start: u64,
    pub end: u64,
}

struct Patterns {
    ref_name: Regex,
    start: Regex,
    end: Regex,
}

impl Patterns {
    fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            ref_name: Regex::new(r"/([^/]+)>\s*\.?\s*(?:FILTER|BIND|$)")?,
            start: Regex::new(r"\?start\s*>=\s*(\d+)")?,
            end: Regex::new(r"\?end\s*<=\s*(\d+)")?,
        })
    }

    fn get() -> Result<&'static Patterns, String> {
        static PATTERNS: OnceLock<Result<Patterns, String>> = OnceLock::new();
        PATTERNS
            .get_or_init(|| Patterns::compile().map_err(|e| e.to_string()))
            .as_ref()
            .map_err(Clone::clone)
    }
}

fn number(re: &Regex, query: &str, name: &str, default: u64) -> Result<u64, String> {
    match re.captures(query).and_then(|c| c.get(1)) {
        Some(m) => m
            .as_str()
            .parse()
            .map_err(|e| format!("invalid {} value: {}", name, e)),
        None => Ok(default),
    }
}

/// Pull refName, start and end out of `query`, with defaults for any that
/// are absent.
pub fn parse_query(query: &str) -> Result<QueryRange, String> {
    let patterns = Patterns::get()?;
    let ref_name = patterns
        .ref_name
        .captures(query)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| DEFAULT_REF_NAME.to_string());

    Ok(QueryRange {
        ref_name,
        start: number(&patterns.start, query, "start", DEFAULT_START)?,
        end: number(&patterns.end, query, "end", DEFAULT_END)?,
    })
}
