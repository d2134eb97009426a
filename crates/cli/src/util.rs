use std::path::PathBuf;

use crate::OutputFormat;

// For argp::FromArgs
pub fn path(value: &str) -> Result<PathBuf, String> { Ok(PathBuf::from(value)) }

pub fn output_format(value: &str) -> Result<OutputFormat, String> {
    match value {
        "actions" => Ok(OutputFormat::Actions),
        "json" => Ok(OutputFormat::Json),
        _ => Err(format!("Invalid output format '{value}', expected 'actions' or 'json'")),
    }
}
