use crate::report::RunReport;
use anyhow::{Result, anyhow};
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

pub enum Writer {
    Stdout(Box<dyn Write>),
    StdoutJson(Box<dyn Write>),
    JsonFile(BufWriter<File>),
    JsonlFile(BufWriter<File>), // appends, one report per line
}

impl Writer {
    pub fn write_report(&mut self, report: &RunReport) -> Result<()> {
        match self {
            Writer::Stdout(writer) => {
                write!(writer, "{}", report.summary())?;
            }
            Writer::StdoutJson(writer) => {
                let serialized = serde_json::to_string_pretty(report)?;
                writeln!(writer, "{}", serialized)?;
            }
            Writer::JsonFile(writer) => {
                let serialized = serde_json::to_string_pretty(report)?;
                writeln!(writer, "{}", serialized)?;
            }
            Writer::JsonlFile(writer) => {
                let serialized = serde_json::to_string(report)?;
                writeln!(writer, "{}", serialized)?;
            }
        }
        Ok(())
    }

    pub fn finish(mut self) -> Result<()> {
        match self {
            Writer::JsonFile(ref mut writer) | Writer::JsonlFile(ref mut writer) => {
                writer.flush()?;
            }
            Writer::Stdout(ref mut writer) | Writer::StdoutJson(ref mut writer) => {
                writer.flush()?;
            }
        }
        Ok(())
    }
}

pub fn create_writer(output_arg: &str) -> Result<Writer> {
    match output_arg {
        "stdout" => Ok(Writer::Stdout(Box::new(io::stdout()))),
        "json" => Ok(Writer::StdoutJson(Box::new(io::stdout()))),
        path if path.ends_with(".json") => {
            create_parent_dirs(path)?;
            let file = File::create(path)?;
            Ok(Writer::JsonFile(BufWriter::new(file)))
        }
        path if path.ends_with(".jsonl") || path.ends_with(".ndjson") => {
            create_parent_dirs(path)?;
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Ok(Writer::JsonlFile(BufWriter::new(file)))
        }
        _ => Err(anyhow!(
            "Unknown output format: {}. Use 'stdout', 'json', or a .json/.jsonl path",
            output_arg
        )),
    }
}

fn create_parent_dirs(file_path: &str) -> Result<()> {
    if let Some(parent) = Path::new(file_path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{Outcome, RunKind};
    use crate::store::RecordId;

    fn write(output_arg: &str, report: &RunReport) -> Result<()> {
        let mut writer = create_writer(output_arg)?;
        writer.write_report(report)?;
        writer.finish()
    }

    fn sample() -> RunReport {
        let mut report = RunReport::new(RunKind::Emotions, false);
        report.record(
            &RecordId::Text("s2".into()),
            Outcome::Unmapped {
                label: "grumpy".into(),
            },
        );
        report.finish();
        report
    }

    #[test]
    fn rejects_unknown_format() {
        assert!(create_writer("yaml").is_err());
    }

    #[test]
    fn json_file_holds_the_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports/run.json");
        write(path.to_str().unwrap(), &sample()).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["unmapped"][0]["label"], "grumpy");
        assert_eq!(value["scanned"], 1);
    }

    #[test]
    fn jsonl_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runs.jsonl");
        let path = path.to_str().unwrap();
        write(path, &sample()).unwrap();
        write(path, &sample()).unwrap();

        let raw = std::fs::read_to_string(path).unwrap();
        assert_eq!(raw.lines().count(), 2);
    }
}
