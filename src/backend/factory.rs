use std::sync::Arc;
use std::time::Duration;

use crate::domain::{
    mip_backend::MipBackend,
    solver_service::{Result, SolverError},
    value_objects::BackendKind,
};

#[cfg(feature = "coin_cbc")]
use super::CoinCbcBackend;
#[cfg(feature = "highs")]
use super::HighsBackend;
use super::MicrolpBackend;

/// Factory for creating backend instances based on configuration
pub struct BackendFactory;

impl BackendFactory {
    /// Create a backend of the requested kind
    pub fn create(kind: BackendKind) -> Result<Arc<dyn MipBackend>> {
        match kind {
            BackendKind::Auto => Ok(Self::default_backend()),
            BackendKind::Microlp => Ok(Arc::new(MicrolpBackend::new())),
            #[cfg(feature = "coin_cbc")]
            BackendKind::CoinCbc => Ok(Arc::new(CoinCbcBackend::new())),
            #[cfg(feature = "highs")]
            BackendKind::Highs => Ok(Arc::new(HighsBackend::new())),
            #[allow(unreachable_patterns)]
            other => Err(SolverError::BackendUnavailable(format!(
                "{} support was not compiled in (compiled backends: {})",
                other,
                Self::available_names()
            ))),
        }
    }

    /// Create a backend that can honour `time_limit`.
    ///
    /// `Auto` resolves to the preferred backend; if that one cannot stop at a
    /// time limit the request fails instead of running unbounded.
    pub fn create_for(
        kind: BackendKind,
        time_limit: Option<Duration>,
    ) -> Result<Arc<dyn MipBackend>> {
        let backend = Self::create(kind)?;
        if time_limit.is_some() && !backend.supports_time_limit() {
            return Err(SolverError::BackendUnavailable(format!(
                "{} cannot honour a time limit (compiled backends: {})",
                backend.name(),
                Self::available_names()
            )));
        }
        Ok(backend)
    }

    /// Get the preferred backend: HiGHS, then CBC, then microlp
    pub fn default_backend() -> Arc<dyn MipBackend> {
        #[cfg(feature = "highs")]
        {
            Arc::new(HighsBackend::new())
        }
        #[cfg(all(feature = "coin_cbc", not(feature = "highs")))]
        {
            Arc::new(CoinCbcBackend::new())
        }
        #[cfg(not(any(feature = "highs", feature = "coin_cbc")))]
        {
            Arc::new(MicrolpBackend::new())
        }
    }

    /// Backends compiled into this build
    pub fn available() -> Vec<BackendKind> {
        let mut kinds = vec![BackendKind::Microlp];
        if cfg!(feature = "coin_cbc") {
            kinds.push(BackendKind::CoinCbc);
        }
        if cfg!(feature = "highs") {
            kinds.push(BackendKind::Highs);
        }
        kinds
    }

    fn available_names() -> String {
        Self::available()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}
