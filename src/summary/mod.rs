pub mod api;
pub mod cache;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use api::{HttpSummaryApi, SummaryApi};
pub use cache::{SummaryCache, SummaryCacheStats};

/// Collection holding one cached summary per country slug.
pub const SUMMARY_COLLECTION: &str = "summary";

/// Per-country statistics as served by the summary API and stored in the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CountrySummary {
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub country_code: String,
    pub slug: String,
    #[serde(default)]
    pub new_confirmed: u64,
    #[serde(default)]
    pub total_confirmed: u64,
    #[serde(default)]
    pub new_deaths: u64,
    #[serde(default)]
    pub total_deaths: u64,
    #[serde(default)]
    pub new_recovered: u64,
    #[serde(default)]
    pub total_recovered: u64,
    /// When the statistics were computed
    pub date: DateTime<Utc>,
}

impl CountrySummary {
    /// Confirmed cases that are neither recovered nor dead.
    pub fn active(&self) -> u64 {
        self.total_confirmed
            .saturating_sub(self.total_recovered)
            .saturating_sub(self.total_deaths)
    }
}

/// Body of `GET /summary`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SummaryResponse {
    #[serde(default)]
    pub countries: Vec<CountrySummary>,
}

/// First entry whose slug equals `key`, ignoring case.
pub fn find_by_slug(countries: Vec<CountrySummary>, key: &str) -> Option<CountrySummary> {
    let key = key.to_lowercase();
    countries
        .into_iter()
        .find(|summary| summary.slug.to_lowercase() == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(slug: &str, confirmed: u64) -> CountrySummary {
        CountrySummary {
            country: slug.to_string(),
            country_code: String::new(),
            slug: slug.to_string(),
            new_confirmed: 0,
            total_confirmed: confirmed,
            new_deaths: 0,
            total_deaths: 10,
            new_recovered: 0,
            total_recovered: 20,
            date: "2020-04-05T06:37:00Z".parse().unwrap(),
        }
    }

    #[test]
    fn test_parse_api_response() {
        let body = r#"{
            "Global": {"NewConfirmed": 1, "TotalConfirmed": 2},
            "Countries": [{
                "Country": "Italy",
                "CountryCode": "IT",
                "Slug": "italy",
                "NewConfirmed": 4805,
                "TotalConfirmed": 124632,
                "NewDeaths": 681,
                "TotalDeaths": 15362,
                "NewRecovered": 1238,
                "TotalRecovered": 20996,
                "Date": "2020-04-05T06:37:00Z"
            }],
            "Date": "2020-04-05T06:37:00Z"
        }"#;

        let response: SummaryResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.countries.len(), 1);
        let italy = &response.countries[0];
        assert_eq!(italy.country_code, "IT");
        assert_eq!(italy.total_confirmed, 124632);
        assert_eq!(italy.active(), 124632 - 20996 - 15362);
    }

    #[test]
    fn test_find_by_slug_ignores_case_and_takes_first() {
        let countries = vec![summary("france", 1), summary("Italy", 2), summary("italy", 3)];
        let found = find_by_slug(countries.clone(), "ITALY").unwrap();
        assert_eq!(found.total_confirmed, 2);
        assert!(find_by_slug(countries, "ital").is_none());
    }

    #[test]
    fn test_active_never_underflows() {
        let mut s = summary("italy", 5);
        s.total_recovered = 100;
        assert_eq!(s.active(), 0);
    }
}
