//! `live-url`: inspect bracket-notation query strings from the command line.
//!
//! Provides the core logic used by the binary entry point:
//! - `decode '<query>'` prints the decoded tree as JSON
//! - `encode <name> [--simple]` encodes a JSON value read from stdin
//! - `extract '<mapping>' '<query>'` prints the props a mapping extracts
//! - `paths '<query>'` prints each key as a dotted path

use std::io::Read;

use live_url_query::{decode_query, encode, parse_query, to_dot_path, to_query_string, ListStyle};
use serde_json::{json, Value};
use thiserror::Error;

use crate::extract::extract_props;
use crate::mapping::{ConfigError, MappingTable};

pub const USAGE: &str = "\
usage: live-url decode '<query>'
       live-url encode <name> [--simple] < value.json
       live-url extract '<mapping-json>' '<query>'
       live-url paths '<query>'";

// ── Errors ────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Usage(String),
}

// ── Commands ──────────────────────────────────────────────────────────────

/// Decode query text into a pretty-printed JSON tree.
pub fn decode_to_json(query: &str) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(&decode_query(query))?)
}

/// Encode a JSON document under the root key `name`.
pub fn encode_from_json(name: &str, json: &str, style: ListStyle) -> Result<String, CliError> {
    let value: Value = serde_json::from_str(json)?;
    Ok(to_query_string(&encode(&value, name, style)))
}

/// Extract props for a binding configuration, as pretty-printed JSON with
/// `values` keyed by property path and `errors` as messages.
pub fn extract_to_json(mapping_json: &str, query: &str) -> Result<String, CliError> {
    let table = MappingTable::from_json(mapping_json)?;
    let extraction = extract_props(query, &table);
    let errors: Vec<String> = extraction.errors.iter().map(ToString::to_string).collect();
    let out = json!({
        "values": extraction.values,
        "errors": errors,
    });
    Ok(serde_json::to_string_pretty(&out)?)
}

/// Every well-formed key of `query` as a dotted path, in query order.
pub fn dot_paths(query: &str) -> Vec<String> {
    parse_query(query)
        .into_iter()
        .filter_map(|(key, _)| to_dot_path(&key))
        .collect()
}

/// Run one command. `args` excludes the program name.
pub fn run(args: &[String], stdin: &mut dyn Read) -> Result<String, CliError> {
    let arg = |i: usize, what: &str| {
        args.get(i)
            .map(String::as_str)
            .ok_or_else(|| CliError::Usage(format!("missing {what}")))
    };
    match arg(0, "command")? {
        "decode" => decode_to_json(arg(1, "query")?),
        "encode" => {
            let name = arg(1, "parameter name")?;
            let style = match args.get(2).map(String::as_str) {
                None => ListStyle::Indexed,
                Some("--simple") => ListStyle::Repeated,
                Some(other) => return Err(CliError::Usage(format!("unknown option {other:?}"))),
            };
            let mut buf = String::new();
            stdin.read_to_string(&mut buf)?;
            encode_from_json(name, buf.trim(), style)
        }
        "extract" => extract_to_json(arg(1, "mapping")?, arg(2, "query")?),
        "paths" => Ok(dot_paths(arg(1, "query")?).join("\n")),
        other => Err(CliError::Usage(format!("unknown command {other:?}"))),
    }
}
