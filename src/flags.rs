use std::collections::BTreeMap;

use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use serde::Deserialize;

use crate::data::model::CountryKey;

// ---------------------------------------------------------------------------
// Lookup result
// ---------------------------------------------------------------------------

/// Outcome of a best-effort remote lookup. Callers can tell "nothing exists
/// for this country" apart from "the call itself failed".
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
    Failed(String),
}

impl<T> Lookup<T> {
    pub fn found(&self) -> Option<&T> {
        match self {
            Lookup::Found(v) => Some(v),
            _ => None,
        }
    }
}

/// Flag and "About" facts for one country.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CountryProfile {
    /// SVG flag when offered, PNG otherwise.
    pub flag_url: String,
    pub flag_png: Option<String>,
    pub capital: Vec<String>,
    pub region: Option<String>,
    pub area_km2: Option<f64>,
    pub borders: Vec<String>,
    pub currencies: Vec<String>,
    pub languages: Vec<String>,
    pub timezones: Vec<String>,
}

/// Source of country profiles; the seam between the view builder and the network.
pub trait CountryLookup {
    fn lookup(&self, country: &CountryKey) -> Lookup<CountryProfile>;
}

/// Used when no HTTP client could be built.
pub struct OfflineLookup;

impl CountryLookup for OfflineLookup {
    fn lookup(&self, _country: &CountryKey) -> Lookup<CountryProfile> {
        Lookup::Failed("country lookups are disabled".to_string())
    }
}

// ---------------------------------------------------------------------------
// REST Countries client
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RestCountry {
    #[serde(default)]
    flags: RestFlags,
    #[serde(default)]
    capital: Vec<String>,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    area: Option<f64>,
    #[serde(default)]
    borders: Vec<String>,
    #[serde(default)]
    currencies: BTreeMap<String, RestCurrency>,
    #[serde(default)]
    languages: BTreeMap<String, String>,
    #[serde(default)]
    timezones: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RestFlags {
    svg: Option<String>,
    png: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RestCurrency {
    name: Option<String>,
}

/// Blocking client for `GET {endpoint}/{country name}`. One request per
/// lookup, library default timeouts, no retries.
pub struct RestCountriesClient {
    client: Client,
    endpoint: String,
}

impl RestCountriesClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(concat!("world-dashboard/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Endpoint URL with the country name appended as one encoded path segment.
    fn url_for(&self, country: &CountryKey) -> Result<Url, String> {
        let mut url = Url::parse(&self.endpoint).map_err(|e| format!("bad endpoint: {e}"))?;
        url.path_segments_mut()
            .map_err(|_| format!("endpoint {} cannot take a path", self.endpoint))?
            .pop_if_empty()
            .push(country.as_str());
        Ok(url)
    }
}

impl CountryLookup for RestCountriesClient {
    fn lookup(&self, country: &CountryKey) -> Lookup<CountryProfile> {
        let url = match self.url_for(country) {
            Ok(url) => url,
            Err(reason) => return Lookup::Failed(reason),
        };
        log::debug!("GET {url}");

        let response = match self.client.get(url).send() {
            Ok(r) => r,
            Err(e) => {
                log::warn!("Country lookup for {country} failed: {e}");
                return Lookup::Failed(e.to_string());
            }
        };
        let status = response.status();
        match response.text() {
            Ok(body) => parse_response(status, &body),
            Err(e) => Lookup::Failed(e.to_string()),
        }
    }
}

/// Interpret a REST Countries response. The first entry of the JSON list is
/// used; an entry without any flag URL counts as not found.
pub fn parse_response(status: StatusCode, body: &str) -> Lookup<CountryProfile> {
    if status == StatusCode::NOT_FOUND {
        return Lookup::NotFound;
    }
    if !status.is_success() {
        return Lookup::Failed(format!("HTTP {status}"));
    }
    let entries: Vec<RestCountry> = match serde_json::from_str(body) {
        Ok(entries) => entries,
        Err(e) => return Lookup::Failed(format!("malformed response: {e}")),
    };
    let Some(first) = entries.into_iter().next() else {
        return Lookup::NotFound;
    };
    let Some(flag_url) = first.flags.svg.clone().or_else(|| first.flags.png.clone()) else {
        return Lookup::NotFound;
    };

    Lookup::Found(CountryProfile {
        flag_url,
        flag_png: first.flags.png,
        capital: first.capital,
        region: first.region,
        area_km2: first.area,
        borders: first.borders,
        currencies: first
            .currencies
            .into_iter()
            .map(|(code, c)| c.name.unwrap_or(code))
            .collect(),
        languages: first.languages.into_values().collect(),
        timezones: first.timezones,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const GERMANY: &str = r#"[{
        "name": {"common": "Germany"},
        "flags": {"png": "https://flagcdn.com/w320/de.png", "svg": "https://flagcdn.com/de.svg", "alt": "..."},
        "capital": ["Berlin"],
        "region": "Europe",
        "area": 357114.0,
        "borders": ["AUT", "BEL"],
        "currencies": {"EUR": {"name": "Euro", "symbol": "€"}},
        "languages": {"deu": "German"},
        "timezones": ["UTC+01:00"]
    }]"#;

    #[test]
    fn found_prefers_svg_and_collects_profile() {
        let Lookup::Found(profile) = parse_response(StatusCode::OK, GERMANY) else {
            panic!("expected a profile");
        };
        assert_eq!(profile.flag_url, "https://flagcdn.com/de.svg");
        assert_eq!(profile.flag_png.as_deref(), Some("https://flagcdn.com/w320/de.png"));
        assert_eq!(profile.capital, vec!["Berlin"]);
        assert_eq!(profile.currencies, vec!["Euro"]);
        assert_eq!(profile.languages, vec!["German"]);
        assert_eq!(profile.area_km2, Some(357114.0));
    }

    #[test]
    fn png_is_used_without_svg() {
        let body = r#"[{"flags": {"png": "https://x/y.png"}}]"#;
        let profile = parse_response(StatusCode::OK, body);
        assert_eq!(profile.found().map(|p| p.flag_url.as_str()), Some("https://x/y.png"));
    }

    #[test]
    fn missing_country_is_not_found() {
        let body = r#"{"status": 404, "message": "Not Found"}"#;
        assert_eq!(parse_response(StatusCode::NOT_FOUND, body), Lookup::NotFound);
        assert_eq!(parse_response(StatusCode::OK, "[]"), Lookup::NotFound);
        assert_eq!(parse_response(StatusCode::OK, r#"[{"capital": ["X"]}]"#), Lookup::NotFound);
    }

    #[test]
    fn errors_are_failures_not_misses() {
        assert!(matches!(
            parse_response(StatusCode::INTERNAL_SERVER_ERROR, ""),
            Lookup::Failed(_)
        ));
        assert!(matches!(parse_response(StatusCode::OK, "<html>"), Lookup::Failed(_)));
        assert!(matches!(
            parse_response(StatusCode::OK, r#"{"flags": {}}"#),
            Lookup::Failed(_)
        ));
    }

    #[test]
    fn country_name_is_one_encoded_segment() {
        let client = RestCountriesClient::new("https://restcountries.com/v3.1/name/").unwrap();
        let url = client.url_for(&CountryKey::from("Bosnia and Herzegovina")).unwrap();
        assert_eq!(
            url.as_str(),
            "https://restcountries.com/v3.1/name/Bosnia%20and%20Herzegovina"
        );
        let url = client.url_for(&CountryKey::from("Guinea/Bissau")).unwrap();
        assert!(url.as_str().ends_with("/name/Guinea%2FBissau"));
    }

    #[test]
    fn offline_lookup_always_fails() {
        assert!(matches!(OfflineLookup.lookup(&CountryKey::from("Chile")), Lookup::Failed(_)));
    }
}
