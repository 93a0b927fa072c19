//! CSV sink for per-episode evaluation results.
use anyhow::Result;
use serde::Serialize;
use std::{fs::OpenOptions, path::Path};

/// One row of the evaluation CSV.
#[derive(Debug, Clone, Serialize)]
pub struct EpisodeRow {
    /// Normalized algorithm label.
    pub algorithm: String,

    /// Environment id.
    pub environment: String,

    /// Task index the agent was trained on.
    #[serde(rename = "train mode")]
    pub train_mode: i64,

    /// Task index the agent was evaluated on.
    #[serde(rename = "test mode")]
    pub test_mode: i64,

    /// Seed of the evaluation run.
    pub seed: i64,

    /// Episodic return.
    #[serde(rename = "ep ret")]
    pub ep_ret: f32,
}

/// Appends per-episode rows to a CSV file.
///
/// The header line is written once, when this recorder creates the
/// file; reopening an existing file appends rows only and does not
/// re-check the header.
pub struct EpisodeCsvRecorder {
    wtr: csv::Writer<std::fs::File>,
}

impl EpisodeCsvRecorder {
    /// Opens the file at `path` for appending, creating it (with the
    /// header line) if it does not exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let exists = path.as_ref().exists();
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if !exists {
            wtr.write_record(&[
                "algorithm",
                "environment",
                "train mode",
                "test mode",
                "seed",
                "ep ret",
            ])?;
        }
        Ok(Self { wtr })
    }

    /// Appends one row.
    pub fn append(&mut self, row: &EpisodeRow) -> Result<()> {
        self.wtr.serialize(row)?;
        Ok(())
    }

    /// Flushes buffered rows to the file.
    pub fn flush(&mut self) -> Result<()> {
        Ok(self.wtr.flush()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    fn row(ep_ret: f32) -> EpisodeRow {
        EpisodeRow {
            algorithm: "F1".to_string(),
            environment: "Pong".to_string(),
            train_mode: 0,
            test_mode: 0,
            seed: 42,
            ep_ret,
        }
    }

    #[test]
    fn creates_file_with_single_header() -> Result<()> {
        let dir = TempDir::new("csv_recorder")?;
        let path = dir.path().join("eval.csv");

        let mut recorder = EpisodeCsvRecorder::open(&path)?;
        for r in [1.0, 2.0, 3.0] {
            recorder.append(&row(r))?;
        }
        recorder.flush()?;
        drop(recorder);

        let contents = std::fs::read_to_string(&path)?;
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[0],
            "algorithm,environment,train mode,test mode,seed,ep ret"
        );
        assert_eq!(lines[1], "F1,Pong,0,0,42,1.0");
        Ok(())
    }

    #[test]
    fn reopening_appends_without_duplicate_header() -> Result<()> {
        let dir = TempDir::new("csv_recorder")?;
        let path = dir.path().join("eval.csv");

        for _ in 0..2 {
            let mut recorder = EpisodeCsvRecorder::open(&path)?;
            recorder.append(&row(21.0))?;
            recorder.append(&row(-3.0))?;
            recorder.flush()?;
        }

        let contents = std::fs::read_to_string(&path)?;
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines.iter().filter(|l| l.starts_with("algorithm")).count(), 1);
        Ok(())
    }
}
