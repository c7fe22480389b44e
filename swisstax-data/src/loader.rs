use std::collections::BTreeMap;
use std::io::Read;

use rust_decimal::Decimal;
use serde::Deserialize;
use swisstax_core::{
    Bracket, Canton, ConfessionalRates, FilingMode, Jurisdiction, JurisdictionConfig,
    RegistryBuilder, ScheduleKey, ScheduleRegistry, TaxBase, TaxError, TaxYearConfig,
};
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur when loading tax tables.
#[derive(Debug, Error)]
pub enum ScheduleLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Unknown jurisdiction '{0}' (expected CH or a canton code)")]
    UnknownJurisdiction(String),

    #[error("Unknown canton '{0}'")]
    UnknownCanton(String),

    #[error("Unknown tax base '{0}' (expected income or wealth)")]
    UnknownBase(String),

    #[error("Unknown filing mode '{0}' (expected single, married or both)")]
    UnknownFilingMode(String),

    #[error("Registry error: {0}")]
    Registry(#[from] TaxError),
}

impl From<csv::Error> for ScheduleLoaderError {
    fn from(err: csv::Error) -> Self {
        ScheduleLoaderError::CsvParse(err.to_string())
    }
}

/// Maps a filing mode token to the schedules it stands for.
///
/// - `single` → single
/// - `married` → married
/// - `both` → single and married (tables that do not depend on civil status)
fn filing_mode_tokens(token: &str) -> Result<Vec<FilingMode>, ScheduleLoaderError> {
    match token.trim().to_ascii_lowercase().as_str() {
        "both" => Ok(FilingMode::ALL.to_vec()),
        other => FilingMode::parse(other)
            .map(|mode| vec![mode])
            .ok_or_else(|| ScheduleLoaderError::UnknownFilingMode(token.to_string())),
    }
}

/// One bracket row of the schedules CSV file.
///
/// - `tax_year`: e.g. 2025
/// - `jurisdiction`: `CH` for the federal tax or a canton code
/// - `base`: `income` or `wealth`
/// - `filing_mode`: `single`, `married` or `both`
/// - `threshold`: lower bound of the bracket
/// - `rate`: marginal rate as a decimal (0.05 for 5%)
/// - `label`: optional display name of the schedule
///
/// Rows of one schedule must appear in ascending threshold order.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BracketRecord {
    pub tax_year: i32,
    pub jurisdiction: String,
    pub base: String,
    pub filing_mode: String,
    pub threshold: Decimal,
    pub rate: Decimal,
    #[serde(default)]
    pub label: String,
}

/// One row of the jurisdictions CSV file: a canton's reference commune for
/// one tax year. An empty `splitting_divisor` means the canton has a
/// dedicated married schedule.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct JurisdictionRecord {
    pub tax_year: i32,
    pub canton: String,
    pub label: String,
    pub communal_coefficient: Decimal,
    pub reformed_rate: Decimal,
    pub roman_catholic_rate: Decimal,
    pub christ_catholic_rate: Decimal,
    pub levies_wealth_tax: bool,
    pub wealth_exemption_single: Decimal,
    pub wealth_exemption_married: Decimal,
    pub wealth_exemption_per_child: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub splitting_divisor: Option<Decimal>,
}

impl JurisdictionRecord {
    fn into_config(self) -> Result<JurisdictionConfig, ScheduleLoaderError> {
        let canton = Canton::parse(&self.canton)
            .ok_or_else(|| ScheduleLoaderError::UnknownCanton(self.canton.clone()))?;

        Ok(JurisdictionConfig {
            canton,
            tax_year: self.tax_year,
            label: self.label,
            communal_coefficient: self.communal_coefficient,
            confessional_rates: ConfessionalRates {
                reformed: self.reformed_rate,
                roman_catholic: self.roman_catholic_rate,
                christ_catholic: self.christ_catholic_rate,
            },
            levies_wealth_tax: self.levies_wealth_tax,
            wealth_exemption_single: self.wealth_exemption_single,
            wealth_exemption_married: self.wealth_exemption_married,
            wealth_exemption_per_child: self.wealth_exemption_per_child,
            splitting_divisor: self.splitting_divisor,
        })
    }
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Counts of entries registered by a load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub bracket_rows: usize,
    pub schedules: usize,
    pub jurisdiction_configs: usize,
    pub tax_years: usize,
}

/// Loader for tax tables in CSV form.
///
/// Parsing only checks the CSV shape. All domain validation (bracket order,
/// rate ranges, duplicate keys) happens when the parsed records are
/// registered, so a table that loads is a table the engine accepts.
pub struct ScheduleLoader;

impl ScheduleLoader {
    /// Parse bracket rows from a CSV reader.
    pub fn parse_brackets<R: Read>(reader: R) -> Result<Vec<BracketRecord>, ScheduleLoaderError> {
        Self::parse(reader)
    }

    /// Parse canton configs from a CSV reader.
    pub fn parse_jurisdictions<R: Read>(
        reader: R
    ) -> Result<Vec<JurisdictionRecord>, ScheduleLoaderError> {
        Self::parse(reader)
    }

    /// Parse yearly deduction limits from a CSV reader. Column names are
    /// the [`TaxYearConfig`] field names.
    pub fn parse_limits<R: Read>(reader: R) -> Result<Vec<TaxYearConfig>, ScheduleLoaderError> {
        Self::parse(reader)
    }

    fn parse<R, T>(reader: R) -> Result<Vec<T>, ScheduleLoaderError>
    where
        R: Read,
        T: serde::de::DeserializeOwned,
    {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: T = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Groups bracket rows into schedules and registers them.
    ///
    /// Rows are grouped by (tax year, jurisdiction, base, filing mode). A
    /// `both` group is registered once per filing mode. The schedule label
    /// is the first non-empty label of its group.
    ///
    /// Returns the number of schedules registered.
    pub fn load_brackets(
        builder: &mut RegistryBuilder,
        records: &[BracketRecord],
    ) -> Result<usize, ScheduleLoaderError> {
        let mut groups: BTreeMap<(i32, String, String, String), Vec<&BracketRecord>> =
            BTreeMap::new();

        for record in records {
            groups
                .entry((
                    record.tax_year,
                    record.jurisdiction.trim().to_ascii_uppercase(),
                    record.base.trim().to_ascii_lowercase(),
                    record.filing_mode.trim().to_ascii_lowercase(),
                ))
                .or_default()
                .push(record);
        }

        let mut registered = 0;
        for ((tax_year, jurisdiction, base, filing_mode), rows) in groups {
            let jurisdiction = Jurisdiction::parse(&jurisdiction)
                .ok_or(ScheduleLoaderError::UnknownJurisdiction(jurisdiction))?;
            let base = TaxBase::parse(&base).ok_or(ScheduleLoaderError::UnknownBase(base))?;

            let label = rows
                .iter()
                .map(|row| row.label.trim())
                .find(|label| !label.is_empty())
                .unwrap_or_default();
            let brackets: Vec<Bracket> = rows
                .iter()
                .map(|row| Bracket::new(row.threshold, row.rate))
                .collect();

            for mode in filing_mode_tokens(&filing_mode)? {
                let key = ScheduleKey::new(jurisdiction, base, tax_year, mode);
                builder.register_brackets(key, label, brackets.clone())?;
                debug!(%key, brackets = brackets.len(), "registered schedule");
                registered += 1;
            }
        }

        Ok(registered)
    }

    /// Registers canton configs. Returns the number registered.
    pub fn load_jurisdictions(
        builder: &mut RegistryBuilder,
        records: Vec<JurisdictionRecord>,
    ) -> Result<usize, ScheduleLoaderError> {
        let count = records.len();
        for record in records {
            builder.register_jurisdiction(record.into_config()?)?;
        }
        Ok(count)
    }

    /// Registers yearly deduction limits. Returns the number registered.
    pub fn load_limits(
        builder: &mut RegistryBuilder,
        records: Vec<TaxYearConfig>,
    ) -> Result<usize, ScheduleLoaderError> {
        let count = records.len();
        for record in records {
            builder.register_tax_year(record)?;
        }
        Ok(count)
    }

    /// Parses and registers all three tables into a fresh registry.
    pub fn registry_from_readers<B, J, L>(
        brackets: B,
        jurisdictions: J,
        limits: L,
    ) -> Result<(ScheduleRegistry, LoadSummary), ScheduleLoaderError>
    where
        B: Read,
        J: Read,
        L: Read,
    {
        let mut builder = RegistryBuilder::new();
        let summary = Self::load_into(&mut builder, brackets, jurisdictions, limits)?;
        Ok((builder.build(), summary))
    }

    /// Parses and registers all three tables on top of `builder`, e.g. to
    /// add a new tax year to a running registry.
    pub fn load_into<B, J, L>(
        builder: &mut RegistryBuilder,
        brackets: B,
        jurisdictions: J,
        limits: L,
    ) -> Result<LoadSummary, ScheduleLoaderError>
    where
        B: Read,
        J: Read,
        L: Read,
    {
        let bracket_rows = Self::parse_brackets(brackets)?;
        let jurisdiction_rows = Self::parse_jurisdictions(jurisdictions)?;
        let limit_rows = Self::parse_limits(limits)?;

        let summary = LoadSummary {
            bracket_rows: bracket_rows.len(),
            schedules: Self::load_brackets(builder, &bracket_rows)?,
            jurisdiction_configs: Self::load_jurisdictions(builder, jurisdiction_rows)?,
            tax_years: Self::load_limits(builder, limit_rows)?,
        };

        info!(
            bracket_rows = summary.bracket_rows,
            schedules = summary.schedules,
            jurisdiction_configs = summary.jurisdiction_configs,
            tax_years = summary.tax_years,
            "tax tables loaded"
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    const BRACKETS_HEADER: &str = "tax_year,jurisdiction,base,filing_mode,threshold,rate,label\n";

    const JURISDICTIONS_CSV: &str = "tax_year,canton,label,communal_coefficient,reformed_rate,roman_catholic_rate,christ_catholic_rate,levies_wealth_tax,wealth_exemption_single,wealth_exemption_married,wealth_exemption_per_child,splitting_divisor
2025,GE,Genève,0.455,0,0,0,true,86833,173666,43417,2
2025,ZH,Zürich,1.19,0.10,0.10,0.14,true,80000,159000,31000,
";

    fn brackets(rows: &str) -> Vec<BracketRecord> {
        ScheduleLoader::parse_brackets(format!("{BRACKETS_HEADER}{rows}").as_bytes())
            .expect("Failed to parse CSV")
    }

    // =========================================================================
    // parsing
    // =========================================================================

    #[test]
    fn test_parse_bracket_row() {
        let records = brackets("2025,ZH,income,single,7000,0.02,Zurich basic tariff\n");

        assert_eq!(
            records,
            vec![BracketRecord {
                tax_year: 2025,
                jurisdiction: "ZH".to_string(),
                base: "income".to_string(),
                filing_mode: "single".to_string(),
                threshold: dec!(7000),
                rate: dec!(0.02),
                label: "Zurich basic tariff".to_string(),
            }]
        );
    }

    #[test]
    fn test_parse_bracket_row_without_label() {
        let records = brackets("2025,CH,income,single,0,0,\n");

        assert_eq!(records[0].label, "");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let records = brackets("2025, ZH , income , married , 13900 , 0.02 ,\n");

        assert_eq!(records[0].jurisdiction, "ZH");
        assert_eq!(records[0].threshold, dec!(13900));
    }

    #[test]
    fn test_parse_jurisdictions_with_optional_divisor() {
        let records =
            ScheduleLoader::parse_jurisdictions(JURISDICTIONS_CSV.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].splitting_divisor, Some(dec!(2)));
        assert_eq!(records[1].splitting_divisor, None);
        assert!(records[1].levies_wealth_tax);
    }

    #[test]
    fn test_parse_invalid_csv_missing_column() {
        let csv = "tax_year,jurisdiction,base\n2025,ZH,income";

        let result = ScheduleLoader::parse_brackets(csv.as_bytes());

        let err = result.expect_err("Should fail for missing column");
        let ScheduleLoaderError::CsvParse(msg) = err else {
            panic!("Expected CsvParse error, got: {:?}", err);
        };
        assert!(
            msg.contains("missing field"),
            "Expected 'missing field' in error, got: {}",
            msg
        );
    }

    #[test]
    fn test_parse_invalid_decimal() {
        let csv = format!("{BRACKETS_HEADER}2025,ZH,income,single,abc,0.02,\n");

        let result = ScheduleLoader::parse_brackets(csv.as_bytes());

        assert!(matches!(result, Err(ScheduleLoaderError::CsvParse(_))));
    }

    #[test]
    fn test_parse_empty_csv() {
        let records = brackets("");

        assert!(records.is_empty());
    }

    // =========================================================================
    // registration
    // =========================================================================

    #[test]
    fn test_load_groups_rows_into_schedules() {
        let records = brackets(
            "2025,ZH,income,single,0,0,Zurich basic tariff
2025,ZH,income,single,7000,0.02,
2025,ZH,income,married,0,0,Zurich married tariff
2025,ZH,income,married,13900,0.02,
",
        );
        let mut builder = RegistryBuilder::new();

        let count = ScheduleLoader::load_brackets(&mut builder, &records).expect("Failed to load");

        assert_eq!(count, 2);
        let registry = builder.build();
        let single = registry
            .get_schedule("ZH", TaxBase::Income, 2025, FilingMode::Single)
            .unwrap();
        assert_eq!(single.label(), "Zurich basic tariff");
        assert_eq!(single.brackets().len(), 2);
    }

    #[test]
    fn test_load_both_registers_each_filing_mode() {
        let records = brackets("2025,ZH,wealth,both,0,0.0005,Zurich wealth tariff\n");
        let mut builder = RegistryBuilder::new();

        let count = ScheduleLoader::load_brackets(&mut builder, &records).expect("Failed to load");

        assert_eq!(count, 2);
        let registry = builder.build();
        for mode in FilingMode::ALL {
            assert!(registry.get_schedule("ZH", TaxBase::Wealth, 2025, mode).is_ok());
        }
    }

    #[test]
    fn test_load_unknown_jurisdiction() {
        let records = brackets("2025,XX,income,single,0,0,\n");

        let result = ScheduleLoader::load_brackets(&mut RegistryBuilder::new(), &records);

        match result {
            Err(ScheduleLoaderError::UnknownJurisdiction(ref code)) => assert_eq!(code, "XX"),
            other => panic!("expected UnknownJurisdiction, got {other:?}"),
        }
    }

    #[test]
    fn test_load_unknown_base() {
        let records = brackets("2025,ZH,property,single,0,0,\n");

        let result = ScheduleLoader::load_brackets(&mut RegistryBuilder::new(), &records);

        assert!(matches!(result, Err(ScheduleLoaderError::UnknownBase(_))));
    }

    #[test]
    fn test_load_unknown_filing_mode() {
        let records = brackets("2025,ZH,income,widowed,0,0,\n");

        let result = ScheduleLoader::load_brackets(&mut RegistryBuilder::new(), &records);

        assert!(matches!(result, Err(ScheduleLoaderError::UnknownFilingMode(_))));
    }

    #[test]
    fn test_load_rejects_decreasing_rates() {
        let records = brackets(
            "2025,ZH,income,single,0,0.05,
2025,ZH,income,single,10000,0.02,
",
        );

        let result = ScheduleLoader::load_brackets(&mut RegistryBuilder::new(), &records);

        assert!(matches!(
            result,
            Err(ScheduleLoaderError::Registry(TaxError::InvalidBracketSchedule { .. }))
        ));
    }

    #[test]
    fn test_load_jurisdictions() {
        let records =
            ScheduleLoader::parse_jurisdictions(JURISDICTIONS_CSV.as_bytes()).expect("Failed to parse CSV");
        let mut builder = RegistryBuilder::new();

        let count = ScheduleLoader::load_jurisdictions(&mut builder, records).expect("Failed to load");

        assert_eq!(count, 2);
        let registry = builder.build();
        let geneva = registry.jurisdiction_config(Canton::Ge, 2025).unwrap();
        assert_eq!(geneva.cantonal_income_mode(FilingMode::Married), FilingMode::Single);
    }

    #[test]
    fn test_load_jurisdictions_unknown_canton() {
        let csv = JURISDICTIONS_CSV.replace("2025,GE,", "2025,CH,");
        let records = ScheduleLoader::parse_jurisdictions(csv.as_bytes()).expect("Failed to parse CSV");

        let result = ScheduleLoader::load_jurisdictions(&mut RegistryBuilder::new(), records);

        assert!(matches!(result, Err(ScheduleLoaderError::UnknownCanton(_))));
    }

    #[test]
    fn test_filing_mode_tokens() {
        assert_eq!(filing_mode_tokens("single").unwrap(), vec![FilingMode::Single]);
        assert_eq!(filing_mode_tokens("Married").unwrap(), vec![FilingMode::Married]);
        assert_eq!(
            filing_mode_tokens("both").unwrap(),
            vec![FilingMode::Single, FilingMode::Married]
        );
    }
}
