pub mod batch;
pub mod run;

use std::path::Path;

use anyhow::{Result, bail};
use districter::{io, Config, UnitDataset};

use crate::cli::InputArgs;

impl InputArgs {
    /// Build the effective config: defaults, then the config file, then flags.
    pub fn config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_json_file(path)?,
            None => Config::default(),
        };

        if let Some(contiguity) = self.contiguity { config.run.contiguity = contiguity }
        if self.no_hole_filler { config.run.hole_filler = false }
        if let Some(separator) = self.separator { config.data.separator = separator }
        if let Some(field) = &self.id_field { config.data.id_field = field.clone() }
        if let Some(field) = &self.shape_id_field { config.data.shape_id_field = field.clone() }
        if let Some(field) = &self.population_field { config.data.population_field = field.clone() }
        if let Some(field) = &self.area_field { config.data.area_field = field.clone() }

        Ok(config)
    }

    /// Load the units named on the command line.
    pub fn load(&self, config: &Config) -> Result<UnitDataset> {
        io::read_units(&self.units, &config.data, self.population.as_deref())
    }
}

/// Refuse to clobber an existing file unless `--force` was given.
pub fn ensure_writable(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (pass --force to overwrite)", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use districter::Contiguity;

    use super::*;
    use crate::cli::{Cli, Commands};

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"run": {"contiguity": "queen", "num_districts": 3}, "data": {"id_field": "ID"}}"#).unwrap();

        let cli = Cli::try_parse_from([
            "districter", "run", "units.geojson",
            "--config", path.to_str().unwrap(),
            "--no-hole-filler", "--population-field", "POP",
        ]).unwrap();
        let Commands::Run(args) = &cli.command else { panic!("expected run command") };

        let config = args.input.config().unwrap();
        assert_eq!(config.run.contiguity, Contiguity::Queen);
        assert_eq!(config.run.num_districts, 3);
        assert!(!config.run.hole_filler);
        assert_eq!(config.data.id_field, "ID");
        assert_eq!(config.data.population_field, "POP");
    }

    #[test]
    fn unknown_contiguity_flag_is_rejected() {
        assert!(Cli::try_parse_from(["districter", "run", "units.geojson", "-c", "bishop"]).is_err());
    }

    #[test]
    fn batch_requires_district_counts() {
        assert!(Cli::try_parse_from(["districter", "batch", "units.geojson", "out"]).is_err());
        assert!(Cli::try_parse_from(["districter", "batch", "units.geojson", "-d", "2", "-d", "4", "out"]).is_ok());
    }

    #[test]
    fn existing_output_needs_force() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(ensure_writable(file.path(), false).is_err());
        assert!(ensure_writable(file.path(), true).is_ok());
    }
}
