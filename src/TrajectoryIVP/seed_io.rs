//! Persistence of the seed arrays.
//!
//! The seed is produced once and may be reused across relaxation runs, so the `x`, `y`, `v`
//! samples are written to a JSON file. serde_json is built with `float_roundtrip`, every
//! `f64` reads back to the same bits.

use super::seed_generator::SeedSolution;
use crate::TrajectoryBVP::trajectory_error::TrajectoryError;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedArrays {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub v: Vec<f64>,
}

impl From<&SeedSolution> for SeedArrays {
    fn from(solution: &SeedSolution) -> Self {
        Self {
            x: solution.x.clone(),
            y: solution.y.clone(),
            v: solution.v.clone(),
        }
    }
}

impl SeedArrays {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn validate(&self) -> Result<(), TrajectoryError> {
        if self.x.is_empty() {
            return Err(TrajectoryError::MissingData("seed arrays are empty".to_string()));
        }
        if self.y.len() != self.x.len() || self.v.len() != self.x.len() {
            return Err(TrajectoryError::InvalidConfiguration(format!(
                "seed arrays differ in length: x {}, y {}, v {}",
                self.x.len(),
                self.y.len(),
                self.v.len()
            )));
        }
        let mut all = self.x.iter().chain(self.y.iter()).chain(self.v.iter());
        if all.any(|value| !value.is_finite()) {
            return Err(TrajectoryError::InvalidConfiguration(
                "seed arrays contain non-finite values".to_string(),
            ));
        }
        Ok(())
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), TrajectoryError> {
        self.validate()?;
        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush()?;
        info!(
            "seed with {} samples saved to {}",
            self.len(),
            path.as_ref().display()
        );
        Ok(())
    }

    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, TrajectoryError> {
        let file = File::open(path.as_ref())?;
        let seed: SeedArrays = serde_json::from_reader(BufReader::new(file))?;
        seed.validate()?;
        info!(
            "seed with {} samples loaded from {}",
            seed.len(),
            path.as_ref().display()
        );
        Ok(seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn awkward_seed() -> SeedArrays {
        SeedArrays {
            x: vec![0.0, 0.1, 1.0 / 3.0, 230910.1, 1e-300],
            y: vec![0.0, std::f64::consts::PI, -2.5e-17, 1401.123456789012, 5e-324],
            v: vec![100.0, 99.99999999999999, 1915.0000000000002, f64::MAX, f64::MIN_POSITIVE],
        }
    }

    #[test]
    fn test_roundtrip_is_bit_exact() {
        let seed = awkward_seed();
        let file = NamedTempFile::new().unwrap();
        seed.save_json(file.path()).unwrap();
        let loaded = SeedArrays::load_json(file.path()).unwrap();
        for (a, b) in [(&seed.x, &loaded.x), (&seed.y, &loaded.y), (&seed.v, &loaded.v)] {
            assert_eq!(a.len(), b.len());
            for (p, q) in a.iter().zip(b.iter()) {
                assert_eq!(p.to_bits(), q.to_bits());
            }
        }
    }

    #[test]
    fn test_mismatched_lengths_are_rejected() {
        let mut seed = awkward_seed();
        seed.v.pop();
        let file = NamedTempFile::new().unwrap();
        assert!(matches!(
            seed.save_json(file.path()),
            Err(TrajectoryError::InvalidConfiguration(_))
        ));
        // written by hand, bypassing save_json
        std::fs::write(file.path(), r#"{"x":[0.0,1.0],"y":[0.0],"v":[1.0,2.0]}"#).unwrap();
        assert!(SeedArrays::load_json(file.path()).is_err());
    }

    #[test]
    fn test_missing_file_and_bad_json() {
        assert!(matches!(
            SeedArrays::load_json("/nonexistent/dir/seed.json"),
            Err(TrajectoryError::Io(_))
        ));
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "{not json").unwrap();
        assert!(matches!(
            SeedArrays::load_json(file.path()),
            Err(TrajectoryError::Serialization(_))
        ));
    }
}
