use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::iter::once;
use std::path::Path;

use slog_scope::warn;
use structopt::StructOpt;

use crate::coord::COORD_BITS;
use crate::BoxedResult;

/// Knobs for the coastline split phase
#[derive(Debug, Clone, StructOpt)]
#[structopt(rename_all = "kebab-case")]
pub struct CoastParams {
    /// Level the world is first tiled at
    #[structopt(long, default_value = "4")]
    pub start_level: u8,

    /// Hard cap on cell subdivision depth
    #[structopt(long, default_value = "10")]
    pub max_level: u8,

    /// Vertex budget above which a cell is split further
    #[structopt(long, default_value = "20000")]
    pub max_cell_points: usize,

    /// Worker threads, detected from the machine if not given
    #[structopt(long)]
    pub threads: Option<usize>,
}

impl CoastParams {
    pub fn load_with_args(file_path: impl AsRef<Path>) -> BoxedResult<Self> {
        Self::load(file_path.as_ref(), std::env::args())
    }

    pub fn load_with_only_file(file_path: impl AsRef<Path>) -> BoxedResult<Self> {
        let fake_args = once(env!("CARGO_PKG_NAME").to_owned());
        Self::load(file_path.as_ref(), fake_args)
    }

    /// Must be at least len 1, where first elem is binary name
    fn load(file_path: &Path, mut args: impl Iterator<Item = String>) -> BoxedResult<Self> {
        let params = {
            let binary_name = args.next().expect("no 0th arg");
            let mut config_params = vec![binary_name];

            match File::open(file_path) {
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    // no file, no problem
                    warn!("no config file, using defaults"; "path" => %file_path.display());
                }
                Err(e) => return Err(e.into()),
                Ok(file) => {
                    let lines = BufReader::new(file);
                    for line in lines.lines().filter_map(|line| line.ok()).filter(|line| {
                        let trimmed = line.trim();
                        !trimmed.is_empty() && !trimmed.starts_with('#')
                    }) {
                        config_params.extend(line.split(' ').map(str::to_owned));
                    }
                }
            };

            // binary name || args from file || args from cmdline
            Self::from_iter_safe(config_params.into_iter().chain(args))?
        };

        params.validate()?;
        Ok(params)
    }

    fn validate(&self) -> BoxedResult<()> {
        if self.start_level > self.max_level {
            return Err(format!(
                "start level {} is above the hard cap {}",
                self.start_level, self.max_level
            )
            .into());
        }

        if u32::from(self.max_level) >= COORD_BITS {
            return Err(format!(
                "hard cap {} is too deep for {} coordinate bits",
                self.max_level, COORD_BITS
            )
            .into());
        }

        Ok(())
    }

    /// Depth output cells are addressed at, one past the hard cap, so
    /// ids are comparable regardless of actual split depth
    pub fn stable_cell_depth(&self) -> u8 {
        self.max_level + 1
    }

    #[cfg(test)]
    pub fn dummy() -> Self {
        Self::from_iter_safe(once("dummy")).expect("default params")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_generator_constants() {
        let params = CoastParams::dummy();
        assert_eq!(params.start_level, 4);
        assert_eq!(params.max_level, 10);
        assert_eq!(params.max_cell_points, 20_000);
        assert_eq!(params.threads, None);
        assert_eq!(params.stable_cell_depth(), 11);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn inverted_levels_are_rejected() {
        let mut params = CoastParams::dummy();
        params.start_level = 12;
        assert!(params.validate().is_err());
    }

    #[test]
    fn cap_deeper_than_the_lattice_is_rejected() {
        let mut params = CoastParams::dummy();
        params.max_level = COORD_BITS as u8;
        assert!(params.validate().is_err());
    }
}
