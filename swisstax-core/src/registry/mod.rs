//! Registry of bracket schedules, jurisdiction configs and deduction limits.
//!
//! Typical lifetime:
//! 1. Create a [`RegistryBuilder`] and register every table once at startup.
//! 2. Call [`RegistryBuilder::build`] to freeze it into a [`ScheduleRegistry`].
//! 3. Share it by reference, or through a [`SharedRegistry`] when new tax
//!    years are added while the process runs.
//!
//! Entries are never replaced. A new tax year is a new key.

mod shared;

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use crate::{
    Bracket, BracketSchedule, Canton, FilingMode, Jurisdiction, JurisdictionConfig, ScheduleKey,
    TaxBase, TaxError, TaxYearConfig,
};

pub use shared::SharedRegistry;

/// Frozen, validated tables. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct ScheduleRegistry {
    schedules: HashMap<ScheduleKey, Arc<BracketSchedule>>,
    jurisdictions: HashMap<(Canton, i32), Arc<JurisdictionConfig>>,
    tax_years: BTreeMap<i32, Arc<TaxYearConfig>>,
}

impl ScheduleRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Starts a builder holding every entry of this registry.
    pub fn to_builder(&self) -> RegistryBuilder {
        RegistryBuilder {
            inner: self.clone(),
        }
    }

    /// Looks up a schedule by jurisdiction code (`CH` or a canton code).
    ///
    /// # Errors
    ///
    /// * [`TaxError::UnknownJurisdiction`]: the code is not recognized or
    ///   nothing is registered for it.
    /// * [`TaxError::MissingScheduleForYear`]: the jurisdiction is known
    ///   but has no table for this year, base and filing mode.
    pub fn get_schedule(
        &self,
        jurisdiction: &str,
        base: TaxBase,
        year: i32,
        filing_mode: FilingMode,
    ) -> Result<&BracketSchedule, TaxError> {
        let jurisdiction = Jurisdiction::parse(jurisdiction)
            .ok_or_else(|| TaxError::UnknownJurisdiction(jurisdiction.to_string()))?;

        self.schedule(&ScheduleKey::new(jurisdiction, base, year, filing_mode))
    }

    /// Looks up a schedule by key. Same errors as [`Self::get_schedule`].
    pub fn schedule(
        &self,
        key: &ScheduleKey,
    ) -> Result<&BracketSchedule, TaxError> {
        if let Some(schedule) = self.schedules.get(key) {
            return Ok(schedule);
        }

        if self.knows(key.jurisdiction) {
            Err(TaxError::MissingScheduleForYear {
                jurisdiction: key.jurisdiction,
                base: key.base,
                year: key.year,
                filing_mode: key.filing_mode,
            })
        } else {
            Err(TaxError::UnknownJurisdiction(
                key.jurisdiction.code().to_string(),
            ))
        }
    }

    /// Looks up a schedule that may legitimately be absent.
    pub fn find_schedule(
        &self,
        key: &ScheduleKey,
    ) -> Option<&BracketSchedule> {
        self.schedules.get(key).map(Arc::as_ref)
    }

    /// # Errors
    ///
    /// [`TaxError::MissingJurisdictionConfig`] when no config exists for
    /// that canton and year.
    pub fn jurisdiction_config(
        &self,
        canton: Canton,
        year: i32,
    ) -> Result<&JurisdictionConfig, TaxError> {
        self.jurisdictions
            .get(&(canton, year))
            .map(Arc::as_ref)
            .ok_or(TaxError::MissingJurisdictionConfig { canton, year })
    }

    /// # Errors
    ///
    /// [`TaxError::MissingTaxYearConfig`] when no limits exist for the year.
    pub fn tax_year_config(
        &self,
        year: i32,
    ) -> Result<&TaxYearConfig, TaxError> {
        self.tax_years
            .get(&year)
            .map(Arc::as_ref)
            .ok_or(TaxError::MissingTaxYearConfig(year))
    }

    /// True if at least one schedule is registered for the jurisdiction.
    pub fn knows(
        &self,
        jurisdiction: Jurisdiction,
    ) -> bool {
        self.schedules
            .keys()
            .any(|key| key.jurisdiction == jurisdiction)
    }

    /// Jurisdictions with at least one schedule, sorted.
    pub fn jurisdictions(&self) -> Vec<Jurisdiction> {
        let set: BTreeSet<_> = self.schedules.keys().map(|k| k.jurisdiction).collect();
        set.into_iter().collect()
    }

    /// Tax years with at least one schedule, sorted.
    pub fn years(&self) -> Vec<i32> {
        let set: BTreeSet<_> = self.schedules.keys().map(|k| k.year).collect();
        set.into_iter().collect()
    }

    pub fn schedule_count(&self) -> usize {
        self.schedules.len()
    }

    pub fn jurisdiction_config_count(&self) -> usize {
        self.jurisdictions.len()
    }

    pub fn tax_year_count(&self) -> usize {
        self.tax_years.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schedules.is_empty() && self.jurisdictions.is_empty() && self.tax_years.is_empty()
    }
}

/// Collects and validates entries before they are frozen.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    inner: ScheduleRegistry,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates `brackets` and registers them under `key`.
    ///
    /// # Errors
    ///
    /// * [`TaxError::InvalidBracketSchedule`]: the brackets violate a
    ///   schedule invariant; nothing is registered.
    /// * [`TaxError::AlreadyRegistered`]: `key` is taken.
    pub fn register_brackets(
        &mut self,
        key: ScheduleKey,
        label: impl Into<String>,
        brackets: Vec<Bracket>,
    ) -> Result<&mut Self, TaxError> {
        let schedule = BracketSchedule::new(key, label, brackets)?;
        self.register_schedule(schedule)
    }

    /// Registers an already validated schedule.
    ///
    /// # Errors
    ///
    /// [`TaxError::AlreadyRegistered`] if the schedule's key is taken.
    pub fn register_schedule(
        &mut self,
        schedule: BracketSchedule,
    ) -> Result<&mut Self, TaxError> {
        let key = *schedule.key();
        if self.inner.schedules.contains_key(&key) {
            return Err(TaxError::AlreadyRegistered(format!("schedule {key}")));
        }
        self.inner.schedules.insert(key, Arc::new(schedule));
        Ok(self)
    }

    /// # Errors
    ///
    /// * [`TaxError::InvalidConfig`]: the config fails validation.
    /// * [`TaxError::AlreadyRegistered`]: the canton already has a config
    ///   for that year.
    pub fn register_jurisdiction(
        &mut self,
        config: JurisdictionConfig,
    ) -> Result<&mut Self, TaxError> {
        config.validate()?;

        let key = (config.canton, config.tax_year);
        if self.inner.jurisdictions.contains_key(&key) {
            return Err(TaxError::AlreadyRegistered(format!(
                "jurisdiction config {} {}",
                key.0, key.1
            )));
        }
        self.inner.jurisdictions.insert(key, Arc::new(config));
        Ok(self)
    }

    /// # Errors
    ///
    /// * [`TaxError::InvalidConfig`]: the limits fail validation.
    /// * [`TaxError::AlreadyRegistered`]: the year already has limits.
    pub fn register_tax_year(
        &mut self,
        config: TaxYearConfig,
    ) -> Result<&mut Self, TaxError> {
        config.validate()?;

        if self.inner.tax_years.contains_key(&config.tax_year) {
            return Err(TaxError::AlreadyRegistered(format!(
                "deduction limits {}",
                config.tax_year
            )));
        }
        self.inner.tax_years.insert(config.tax_year, Arc::new(config));
        Ok(self)
    }

    pub fn build(self) -> ScheduleRegistry {
        self.inner
    }
}
