use super::types::SuiteReport;
use anyhow::Result;
use std::path::Path;

/// Write the report as pretty JSON to `output`, or stdout
pub fn generate(report: &SuiteReport, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;

    if let Some(path) = output {
        std::fs::write(path, json)?;
        println!("JSON report saved to: {}", path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

pub fn load(path: &Path) -> Result<SuiteReport> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
