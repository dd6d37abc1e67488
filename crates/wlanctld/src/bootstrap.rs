//! Service bootstrap orchestration.

use std::path::{Path, PathBuf};

use thiserror::Error;

use wlan_config::{Config, ConfigError};
use wlan_lifecycle::{Coordinator, Subsystems};

use crate::health::HealthReporter;
use crate::service::{CoordinatorService, ServiceHandle, SpawnError};
use crate::telemetry::{self, TelemetryError, TelemetryHandle};

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the service configuration.
    fn load(&self) -> Result<Config, ConfigError>;
}

/// Loader that reads a TOML file through [`Config::load`].
#[derive(Debug, Clone)]
pub struct FileConfigLoader {
    path: PathBuf,
}

impl FileConfigLoader {
    /// Builds a loader for `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path the loader reads.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigLoader for FileConfigLoader {
    fn load(&self) -> Result<Config, ConfigError> {
        Config::load(&self.path)
    }
}

/// Loader that hands back a configuration built in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps `config`.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, ConfigError> {
        self.config.validate()?;
        Ok(self.config.clone())
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Box<ConfigError>,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// A subsystem refused the coordinator's start-up registration.
    #[error("failed to initialise the lifecycle coordinator")]
    Initialisation,
    /// The dispatch thread could not be started.
    #[error("failed to start the lifecycle service: {source}")]
    Spawn {
        /// Underlying spawn error.
        #[source]
        source: SpawnError,
    },
}

/// Result of a successful bootstrap invocation.
#[derive(Debug)]
pub struct Service {
    config: Config,
    telemetry: TelemetryHandle,
    handle: ServiceHandle,
}

impl Service {
    /// Accessor for the resolved configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Accessor for the telemetry handle, primarily useful for testing.
    #[must_use]
    pub const fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    /// Handle to the running coordinator.
    #[must_use]
    pub const fn handle(&self) -> &ServiceHandle {
        &self.handle
    }

    /// Consumes the service, keeping only the coordinator handle.
    #[must_use]
    pub fn into_handle(self) -> ServiceHandle {
        self.handle
    }
}

/// Bootstraps the service using the supplied collaborators.
///
/// Loads configuration, installs telemetry, initialises a coordinator over
/// `clients` and moves it onto its dispatch thread.
///
/// # Errors
///
/// Returns the first [`BootstrapError`] encountered; `reporter` sees the
/// same error before it is returned.
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    reporter: &dyn HealthReporter,
    clients: Subsystems,
) -> Result<Service, BootstrapError> {
    reporter.bootstrap_starting();
    let fail = |error: BootstrapError| {
        reporter.bootstrap_failed(&error);
        error
    };

    let config = loader.load().map_err(|source| {
        fail(BootstrapError::Configuration {
            source: Box::new(source),
        })
    })?;

    let telemetry = telemetry::initialise(&config)
        .map_err(|source| fail(BootstrapError::Telemetry { source }))?;

    let mut coordinator = Coordinator::new(clients, &config);
    if !coordinator.initialize() {
        return Err(fail(BootstrapError::Initialisation));
    }

    let handle = CoordinatorService::spawn(coordinator)
        .map_err(|source| fail(BootstrapError::Spawn { source }))?;
    reporter.bootstrap_succeeded(&config);

    Ok(Service {
        config,
        telemetry,
        handle,
    })
}
