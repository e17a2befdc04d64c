use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::city_id::encode_city_id;

/// A city record from the search provider. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    /// See [`crate::city_id`]
    pub id: String,
    /// Provider record id
    pub record_id: String,
    pub name: String,
    pub country: String,
    pub population: u64,
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
    pub admin1: Option<String>,
    pub admin2: Option<String>,
    pub elevation: Option<f64>,
}

/// Sort direction forwarded verbatim to the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    /// Opaque `"<field> <direction>"` token
    pub fn token(&self) -> String {
        format!("{} {}", self.field, self.direction.as_str())
    }
}

/// Parameters of one city-search request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
    pub sort: Option<SortSpec>,
    /// Refinements by field; keys are unique
    pub filters: BTreeMap<String, String>,
    pub page_size: u32,
    pub page_offset: u32,
}

impl SearchParams {
    /// First page, no query, sort or filters
    pub fn new(page_size: u32) -> Self {
        Self {
            query: None,
            sort: None,
            filters: BTreeMap::new(),
            page_size,
            page_offset: 0,
        }
    }

    /// True when this request starts a fresh result list
    pub fn is_reset(&self) -> bool {
        self.page_offset == 0
    }

    /// Query-string pairs for the records search endpoint.
    pub fn query_pairs(&self, dataset: &str) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("dataset".to_string(), dataset.to_string()),
            ("rows".to_string(), self.page_size.to_string()),
            ("start".to_string(), self.page_offset.to_string()),
        ];

        if let Some(q) = self.query.as_deref().filter(|q| !q.is_empty()) {
            pairs.push(("q".to_string(), q.to_string()));
        }

        if let Some(sort) = &self.sort {
            pairs.push(("sort".to_string(), sort.token()));
        }

        for (field, value) in &self.filters {
            pairs.push((format!("refine.{}", field), value.clone()));
        }

        pairs
    }
}

/// One page of search results plus the provider's total hit count.
#[derive(Debug, Clone, PartialEq)]
pub struct CityPage {
    pub cities: Vec<City>,
    pub total: u64,
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct ApiSearchResponse {
    pub records: Vec<ApiRecord>,
    pub nhits: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiRecord {
    pub recordid: String,
    pub fields: ApiCityFields,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiCityFields {
    pub name: String,
    pub cou_name_en: String,
    #[serde(default)]
    pub population: u64,
    /// `[longitude, latitude]`
    pub coordinates: [f64; 2],
    pub timezone: String,
    pub admin1_name: Option<String>,
    pub admin2_name: Option<String>,
    pub elevation: Option<f64>,
}

impl From<ApiRecord> for City {
    fn from(record: ApiRecord) -> Self {
        let fields = record.fields;
        Self {
            id: encode_city_id(&fields.name, &record.recordid),
            record_id: record.recordid,
            name: fields.name,
            country: fields.cou_name_en,
            population: fields.population,
            longitude: fields.coordinates[0],
            latitude: fields.coordinates[1],
            timezone: fields.timezone,
            admin1: fields.admin1_name,
            admin2: fields.admin2_name,
            elevation: fields.elevation,
        }
    }
}
