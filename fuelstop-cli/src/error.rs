//! Error types emitted by the fuel stop CLI.
//!
//! Every command helper returns `Result<_, CliError>`; collaborator errors
//! are carried as sources so the binary can print the full chain.

use std::sync::Arc;

use camino::Utf8PathBuf;
use fuelstop_core::InvalidInputError;
use fuelstop_data::ProviderBuildError;
use fuelstop_data::catalog::{IngestError, SqliteCatalogError};
use fuelstop_optimizer::PlanError;
use thiserror::Error;

/// Errors emitted by the fuel stop CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// A configured value is out of range.
    #[error("invalid {field}: {source}")]
    InvalidArgument {
        field: &'static str,
        #[source]
        source: InvalidInputError,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Reading the price sheet failed.
    #[error(transparent)]
    Ingest(#[from] IngestError),
    /// Writing or reading the station database failed.
    #[error(transparent)]
    Catalog(#[from] SqliteCatalogError),
    /// Constructing an HTTP adapter failed.
    #[error("failed to build {service} client for {base_url:?}: {source}")]
    BuildProvider {
        service: &'static str,
        base_url: String,
        #[source]
        source: ProviderBuildError,
    },
    /// Planning the trip failed.
    #[error("planning failed: {0}")]
    Plan(#[source] PlanError),
    /// Serialising command output failed.
    #[error("failed to serialise output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
