// File access for datasets, solutions and reports

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::application::{dataset_to_problem, DatasetDto, DatasetError, DatasetRef};
use crate::domain::Problem;

/// Where a dataset comes from: a JSON file, or a named instance inside a
/// data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    File(PathBuf),
    Named { dir: PathBuf, instance: DatasetRef },
}

impl DatasetSource {
    /// Interprets `arg` as an instance name when it parses as one and no
    /// file of that name exists, otherwise as a path.
    pub fn resolve(arg: &str, data_dir: impl Into<PathBuf>) -> Self {
        let path = PathBuf::from(arg);
        match arg.parse::<DatasetRef>() {
            Ok(instance) if !path.exists() => DatasetSource::Named {
                dir: data_dir.into(),
                instance,
            },
            _ => DatasetSource::File(path),
        }
    }

    pub fn path(&self) -> PathBuf {
        match self {
            DatasetSource::File(path) => path.clone(),
            DatasetSource::Named { dir, instance } => dir.join(instance.file_name()),
        }
    }

    /// Reads and validates the problem; named instances also have their
    /// dimensions checked.
    pub fn load(&self, coef_override: Option<f64>) -> Result<Problem, DatasetError> {
        let path = self.path();
        debug!(path = %path.display(), "loading dataset");
        let dataset: DatasetDto = read_json(&path)?;
        let problem = dataset_to_problem(dataset, coef_override)?;
        if let DatasetSource::Named { instance, .. } = self {
            instance.check(&problem)?;
        }
        Ok(problem)
    }
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, DatasetError> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Writes pretty JSON to `path`, or to stdout when `path` is `None`.
pub fn write_json<T: Serialize>(path: Option<&Path>, value: &T) -> Result<(), DatasetError> {
    match path {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(&mut writer, value)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer_pretty(&mut writer, value)?;
            writer.write_all(b"\n")?;
        }
    }
    Ok(())
}
