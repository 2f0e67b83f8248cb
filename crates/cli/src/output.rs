use crate::error::CliError;
use engine_runtime::Phase;
use model::events::KeyNotice;
use serde::Serialize;

/// Result of resolving one offset.
#[derive(Debug, Serialize)]
pub struct ResolvedLine<'a> {
    pub offset: usize,
    pub phase: Phase,
    pub key: &'a KeyNotice,
}

/// A notice received while watching.
#[derive(Debug, Serialize)]
pub struct NoticeLine<'a> {
    pub seq: usize,
    pub key: &'a KeyNotice,
}

/// Prints `value` as a single JSON line on stdout.
pub fn print_line<T: Serialize>(value: &T) -> Result<(), CliError> {
    let line = serde_json::to_string(value).map_err(CliError::JsonSerialize)?;
    println!("{line}");
    Ok(())
}
