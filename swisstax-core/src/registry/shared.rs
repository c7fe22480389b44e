use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tracing::info;

use super::{RegistryBuilder, ScheduleRegistry};
use crate::TaxError;

/// A registry that can gain new tax years while calculations run.
///
/// Readers take an `Arc` snapshot and keep using it for the whole
/// calculation. Writers are serialized; each one builds a complete new
/// registry off to the side and swaps it in only once every entry has been
/// validated, so a reader never observes a partial registration.
#[derive(Debug, Default)]
pub struct SharedRegistry {
    current: RwLock<Arc<ScheduleRegistry>>,
    writer: Mutex<()>,
}

impl SharedRegistry {
    pub fn new(registry: ScheduleRegistry) -> Self {
        Self {
            current: RwLock::new(Arc::new(registry)),
            writer: Mutex::new(()),
        }
    }

    /// The registry as of now. Later publications do not affect it.
    pub fn snapshot(&self) -> Arc<ScheduleRegistry> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the whole registry, e.g. after an administrative reload.
    pub fn publish(
        &self,
        registry: ScheduleRegistry,
    ) {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        self.swap(registry);
    }

    /// Adds entries on top of the current registry.
    ///
    /// `register` receives a builder pre-filled with the current entries.
    /// If it fails, nothing is published.
    ///
    /// # Errors
    ///
    /// Whatever `register` returns.
    pub fn extend<F>(
        &self,
        register: F,
    ) -> Result<Arc<ScheduleRegistry>, TaxError>
    where
        F: FnOnce(&mut RegistryBuilder) -> Result<(), TaxError>,
    {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        let mut builder = self.snapshot().to_builder();
        register(&mut builder)?;

        Ok(self.swap(builder.build()))
    }

    fn swap(
        &self,
        registry: ScheduleRegistry,
    ) -> Arc<ScheduleRegistry> {
        let next = Arc::new(registry);
        info!(
            schedules = next.schedule_count(),
            jurisdiction_configs = next.jurisdiction_config_count(),
            tax_years = next.tax_year_count(),
            "publishing schedule registry"
        );

        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *current = next.clone();
        next
    }
}
