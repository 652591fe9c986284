//! # Dataset Index Module
//!
//! Normalizes the three static input documents into code-keyed lookup tables.
//!
//! ## Inputs
//! - Case/hospitalization document: object keyed by country code, each entry
//!   carrying a `data` array of daily samples
//! - Vaccination document: array of `{ iso_code, data: [...] }`
//! - Country document: flat array of metadata records keyed by `cca3`
//!
//! ## Invariants
//! - Nothing is mutated after construction.
//! - A code absent from any one table is "no data" for every higher layer,
//!   never an error.
//! - Tables are `BTreeMap`s so that every pass over all countries visits them in
//!   the same order, which keeps floating point aggregation reproducible.
//! - Only ISO-3166 alpha-3 shaped codes are indexed; regional aggregates such as
//!   `OWID_WRL` would otherwise be counted twice by the global sums.

use crate::config::Config;
use crate::error::DatasetError;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

/// One daily case/hospitalization sample. Every metric is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CaseSample {
    pub date: NaiveDate,
    pub new_cases: Option<f64>,
    pub new_cases_per_million: Option<f64>,
    pub new_cases_smoothed_per_million: Option<f64>,
    pub hosp_patients: Option<f64>,
    pub hosp_patients_per_million: Option<f64>,
    pub icu_patients: Option<f64>,
    pub icu_patients_per_million: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VaccinationSample {
    pub date: NaiveDate,
    pub people_vaccinated_per_hundred: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountrySeries {
    pub samples: Vec<CaseSample>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VaccinationSeries {
    pub samples: Vec<VaccinationSample>,
}

/// Static metadata for one country
#[derive(Debug, Clone, PartialEq)]
pub struct CountryInfo {
    pub code: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub region: Option<String>,
    pub subregion: Option<String>,
}

/// Selector for the optional numeric fields of a `CaseSample`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CaseMetric {
    NewCases,
    NewCasesPerMillion,
    NewCasesSmoothedPerMillion,
    HospPatients,
    HospPatientsPerMillion,
    IcuPatients,
    IcuPatientsPerMillion,
}

impl CaseMetric {
    pub fn of(self, sample: &CaseSample) -> Option<f64> {
        match self {
            CaseMetric::NewCases => sample.new_cases,
            CaseMetric::NewCasesPerMillion => sample.new_cases_per_million,
            CaseMetric::NewCasesSmoothedPerMillion => sample.new_cases_smoothed_per_million,
            CaseMetric::HospPatients => sample.hosp_patients,
            CaseMetric::HospPatientsPerMillion => sample.hosp_patients_per_million,
            CaseMetric::IcuPatients => sample.icu_patients,
            CaseMetric::IcuPatientsPerMillion => sample.icu_patients_per_million,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            CaseMetric::NewCases => "new_cases",
            CaseMetric::NewCasesPerMillion => "new_cases_per_million",
            CaseMetric::NewCasesSmoothedPerMillion => "new_cases_smoothed_per_million",
            CaseMetric::HospPatients => "hosp_patients",
            CaseMetric::HospPatientsPerMillion => "hosp_patients_per_million",
            CaseMetric::IcuPatients => "icu_patients",
            CaseMetric::IcuPatientsPerMillion => "icu_patients_per_million",
        }
    }
}

// Raw document shapes. Unrecognized fields are ignored by serde.

#[derive(Deserialize)]
struct RawCountryCases {
    #[serde(default)]
    data: Vec<CaseSample>,
}

#[derive(Deserialize)]
struct RawVaccinations {
    iso_code: String,
    #[serde(default)]
    data: Vec<VaccinationSample>,
}

#[derive(Deserialize)]
struct RawCountryName {
    common: String,
}

#[derive(Deserialize)]
struct RawCountry {
    cca3: String,
    name: RawCountryName,
    #[serde(default)]
    latlng: Vec<f64>,
    region: Option<String>,
    subregion: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DatasetIndex {
    cases: BTreeMap<String, CountrySeries>,
    vaccinations: BTreeMap<String, VaccinationSeries>,
    countries: BTreeMap<String, CountryInfo>,
}

fn is_country_code(code: &str) -> bool {
    code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase())
}

fn parse_cases(json: &str) -> Result<BTreeMap<String, CountrySeries>, serde_json::Error> {
    let raw: BTreeMap<String, RawCountryCases> = serde_json::from_str(json)?;
    Ok(raw
        .into_iter()
        .filter(|(code, _)| is_country_code(code))
        .map(|(code, entry)| (code, CountrySeries { samples: entry.data }))
        .collect())
}

fn parse_vaccinations(
    json: &str,
) -> Result<BTreeMap<String, VaccinationSeries>, serde_json::Error> {
    let raw: Vec<RawVaccinations> = serde_json::from_str(json)?;
    let mut table = BTreeMap::new();
    for entry in raw {
        if !is_country_code(&entry.iso_code) {
            continue;
        }
        // First record for a code wins.
        table
            .entry(entry.iso_code)
            .or_insert(VaccinationSeries { samples: entry.data });
    }
    Ok(table)
}

fn parse_countries(json: &str) -> Result<BTreeMap<String, CountryInfo>, serde_json::Error> {
    let raw: Vec<RawCountry> = serde_json::from_str(json)?;
    let mut table = BTreeMap::new();
    for entry in raw {
        let (latitude, longitude) = match entry.latlng.as_slice() {
            [lat, lng, ..] => (*lat, *lng),
            _ => {
                log::debug!("Country {} has no centroid, skipping", entry.cca3);
                continue;
            }
        };
        table.entry(entry.cca3.clone()).or_insert(CountryInfo {
            code: entry.cca3,
            name: entry.name.common,
            latitude,
            longitude,
            region: entry.region,
            subregion: entry.subregion,
        });
    }
    Ok(table)
}

fn parse_error(path: &Path) -> impl FnOnce(serde_json::Error) -> DatasetError {
    let path = path.to_path_buf();
    move |source| DatasetError::ParseFailed { path, source }
}

async fn read_dataset(path: &Path) -> Result<String, DatasetError> {
    let start = Instant::now();
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| DatasetError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
    log::info!("Loaded {} in {:?}", path.display(), start.elapsed());
    Ok(contents)
}

impl DatasetIndex {
    /// Read all three datasets concurrently; nothing is indexed until every
    /// read has succeeded.
    pub async fn load(config: &Config) -> Result<Self, DatasetError> {
        let cases_path = config.cases_path();
        let vaccinations_path = config.vaccinations_path();
        let countries_path = config.countries_path();

        let (cases, vaccinations, countries) = tokio::try_join!(
            read_dataset(&cases_path),
            read_dataset(&vaccinations_path),
            read_dataset(&countries_path),
        )?;

        let index = Self {
            cases: parse_cases(&cases).map_err(parse_error(&cases_path))?,
            vaccinations: parse_vaccinations(&vaccinations)
                .map_err(parse_error(&vaccinations_path))?,
            countries: parse_countries(&countries).map_err(parse_error(&countries_path))?,
        };
        log::info!(
            "Indexed {} case series, {} vaccination series, {} countries",
            index.cases.len(),
            index.vaccinations.len(),
            index.countries.len()
        );
        Ok(index)
    }

    pub fn from_json(
        cases: &str,
        vaccinations: &str,
        countries: &str,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            cases: parse_cases(cases)?,
            vaccinations: parse_vaccinations(vaccinations)?,
            countries: parse_countries(countries)?,
        })
    }

    pub fn lookup_country(&self, code: &str) -> Option<&CountrySeries> {
        self.cases.get(code)
    }

    pub fn lookup_vaccination(&self, code: &str) -> Option<&VaccinationSeries> {
        self.vaccinations.get(code)
    }

    pub fn lookup_info(&self, code: &str) -> Option<&CountryInfo> {
        self.countries.get(code)
    }

    /// All case series in code order
    pub fn case_series(&self) -> impl Iterator<Item = (&str, &CountrySeries)> {
        self.cases.iter().map(|(code, series)| (code.as_str(), series))
    }

    /// All vaccination series in code order
    pub fn vaccination_series(&self) -> impl Iterator<Item = (&str, &VaccinationSeries)> {
        self.vaccinations
            .iter()
            .map(|(code, series)| (code.as_str(), series))
    }

    /// All country metadata records in code order
    pub fn countries(&self) -> impl Iterator<Item = &CountryInfo> {
        self.countries.values()
    }

    /// Latest case sample date for `code`, or over all countries when `code`
    /// has no case data.
    pub fn last_case_date(&self, code: &str) -> Option<NaiveDate> {
        self.lookup_country(code)
            .and_then(|series| series.samples.last())
            .map(|sample| sample.date)
            .or_else(|| {
                self.cases
                    .values()
                    .filter_map(|series| series.samples.last().map(|s| s.date))
                    .max()
            })
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::DatasetIndex;

    pub const CASES: &str = r#"{
        "FIN": {
            "location": "Finland",
            "data": [
                { "date": "2021-05-31", "new_cases": 200, "new_cases_per_million": 36.1,
                  "new_cases_smoothed_per_million": 110, "hosp_patients": 40,
                  "hosp_patients_per_million": 7.2, "icu_patients": 5 },
                { "date": "2021-06-01", "new_cases": 650, "new_cases_per_million": 117.3,
                  "new_cases_smoothed_per_million": 120, "hosp_patients": 35,
                  "hosp_patients_per_million": 6.3, "icu_patients": 4,
                  "icu_patients_per_million": 0.7, "stringency_index": 51.2 },
                { "date": "2021-06-02", "new_cases_smoothed_per_million": 0 }
            ]
        },
        "SWE": {
            "data": [
                { "date": "2021-06-01", "new_cases": 1000, "new_cases_per_million": 98.9,
                  "new_cases_smoothed_per_million": 90, "icu_patients_per_million": 1.3 },
                { "date": "2021-06-03", "new_cases": 300, "new_cases_per_million": 29.7 }
            ]
        },
        "BRA": {
            "data": [
                { "date": "2021-06-01", "new_cases": 5000, "new_cases_per_million": 23.5,
                  "new_cases_smoothed_per_million": 300 }
            ]
        },
        "OWID_WRL": {
            "data": [ { "date": "2021-06-01", "new_cases": 999999 } ]
        }
    }"#;

    pub const VACCINATIONS: &str = r#"[
        { "country": "Finland", "iso_code": "FIN", "data": [
            { "date": "2021-05-20", "people_vaccinated_per_hundred": 38.0 },
            { "date": "2021-05-28", "people_vaccinated_per_hundred": 45.2 },
            { "date": "2021-06-05", "total_vaccinations": 123 },
            { "date": "2021-06-10", "people_vaccinated_per_hundred": 51.0 }
        ]},
        { "country": "Sweden", "iso_code": "SWE", "data": [
            { "date": "2021-06-02", "people_vaccinated_per_hundred": 40.0 }
        ]},
        { "country": "Brazil", "iso_code": "BRA", "data": [
            { "date": "2021-05-01", "people_vaccinated_per_hundred": 20.0 }
        ]},
        { "country": "World", "iso_code": "OWID_WRL", "data": [
            { "date": "2021-06-01", "people_vaccinated_per_hundred": 10.0 }
        ]}
    ]"#;

    pub const COUNTRIES: &str = r#"[
        { "cca3": "FIN", "name": { "common": "Finland", "official": "Republic of Finland" },
          "latlng": [64.0, 26.0], "region": "Europe", "subregion": "Northern Europe" },
        { "cca3": "SWE", "name": { "common": "Sweden" },
          "latlng": [62.0, 15.0], "region": "Europe", "subregion": "Northern Europe" },
        { "cca3": "BRA", "name": { "common": "Brazil" },
          "latlng": [-10.0, -55.0], "region": "Americas", "subregion": "South America" },
        { "cca3": "NOR", "name": { "common": "Norway" },
          "latlng": [62.0, 10.0], "region": "Europe" },
        { "cca3": "ATA", "name": { "common": "Antarctica" }, "latlng": [] }
    ]"#;

    pub fn index() -> DatasetIndex {
        DatasetIndex::from_json(CASES, VACCINATIONS, COUNTRIES).expect("fixture parses")
    }
}
