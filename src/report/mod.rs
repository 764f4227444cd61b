pub mod json;
pub mod junit;
pub mod types;

use anyhow::Result;
use std::path::{Path, PathBuf};

pub use types::SuiteReport;

/// Write `results.json` and `junit.xml` under `<output_dir>/<suite>/`
pub fn write_reports(report: &SuiteReport, output_dir: &Path) -> Result<PathBuf> {
    let dir = output_dir.join(&report.suite);
    std::fs::create_dir_all(&dir)?;
    json::generate(report, Some(&dir.join("results.json")))?;
    junit::write_report(report, &dir)?;
    Ok(dir)
}

/// Re-render a saved `results.json`
pub async fn generate_report(
    results_path: &Path,
    format: &str,
    output: Option<&Path>,
) -> Result<()> {
    let report = json::load(results_path)?;

    match format {
        "json" => json::generate(&report, output),
        "junit" => {
            let xml = junit::generate_junit_xml(&report)?;
            match output {
                Some(path) => {
                    std::fs::write(path, xml)?;
                    println!("JUnit report saved to: {}", path.display());
                }
                None => println!("{}", xml),
            }
            Ok(())
        }
        _ => anyhow::bail!("Unknown format: {}", format),
    }
}
