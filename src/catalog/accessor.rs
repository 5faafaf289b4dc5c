//! Name-based lookups into an enriched catalog.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::archive::{self, CurationData};
use crate::spikes::SpikeTrains;

use super::{Catalog, CatalogError, CatalogRow, DEFAULT_ARCHIVE_SUFFIX};

/// Resolves experiment names to rows, archive paths and loaded spike data
#[derive(Debug, Clone)]
pub struct CatalogAccessor<'a> {
    catalog: &'a Catalog,
    basepath: PathBuf,
    suffix: String,
}

impl<'a> CatalogAccessor<'a> {
    /// Accessor using the default archive suffix
    pub fn new<P: AsRef<Path>>(catalog: &'a Catalog, basepath: P) -> Self {
        Self {
            catalog,
            basepath: basepath.as_ref().to_path_buf(),
            suffix: DEFAULT_ARCHIVE_SUFFIX.to_string(),
        }
    }

    /// Use a different archive suffix
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Row of an experiment
    pub fn row(&self, experiment_name: &str) -> Result<&'a CatalogRow, CatalogError> {
        self.catalog
            .get(experiment_name)
            .ok_or_else(|| CatalogError::ExperimentNotFound(experiment_name.to_string()))
    }

    /// Spike trains attached by the last enrichment pass
    pub fn spike_trains(&self, experiment_name: &str) -> Result<Arc<SpikeTrains>, CatalogError> {
        self.row(experiment_name)?
            .enrichment
            .spike_trains
            .clone()
            .ok_or_else(|| CatalogError::NotLoaded(experiment_name.to_string()))
    }

    /// Archive path of an experiment
    pub fn archive_path(&self, experiment_name: &str) -> Result<PathBuf, CatalogError> {
        Ok(self
            .row(experiment_name)?
            .archive_path(&self.basepath, &self.suffix))
    }

    /// Read an experiment's archive from disk, independent of any pass
    pub fn load_curation(&self, experiment_name: &str) -> Result<CurationData, CatalogError> {
        let path = self.archive_path(experiment_name)?;
        Ok(archive::load_curation(path)?)
    }
}
