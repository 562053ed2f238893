mod json;
mod markdown;

pub use json::JsonOutput;
pub use markdown::MarkdownOutput;

use crate::model::AnalysisResult;
use std::io::Write;

pub trait OutputFormatter {
    fn format<W: Write>(&self, result: &AnalysisResult, writer: &mut W) -> std::io::Result<()>;
}

/// Render `result` into a string with the given formatter.
pub fn render<F: OutputFormatter>(formatter: &F, result: &AnalysisResult) -> std::io::Result<String> {
    let mut buffer = Vec::new();
    formatter.format(result, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}
