//! Semantic query parameters -> provider wire format
//!
//! List filters are comma-joined, categorical signal strength maps to a
//! numeric floor, externally supplied ICP defaults fill in omitted employee
//! bounds and industry codes, and "disabled" sentinels (an explicit zero
//! employee ceiling) are physically omitted rather than sent as zero.

use std::sync::Arc;

use prospectarc_domain::{CompanyQuery, ContactQuery, EnrichQuery, IntentQuery};
use serde_json::{json, Map, Value};

use crate::ports::IcpDefaults;

/// Enrichment output fields requested when the caller names none
const DEFAULT_ENRICH_OUTPUT_FIELDS: &[&str] = &[
    "personId",
    "firstName",
    "lastName",
    "jobTitle",
    "managementLevel",
    "email",
    "phone",
    "companyId",
    "companyName",
    "contactAccuracyScore",
];

/// Builds wire bodies for each search kind
pub struct QueryBuilder {
    defaults: Arc<dyn IcpDefaults>,
    page_size: u32,
}

impl QueryBuilder {
    #[must_use]
    pub fn new(defaults: Arc<dyn IcpDefaults>, page_size: u32) -> Self {
        Self { defaults, page_size }
    }

    /// Wire body for `POST /search/intent`
    pub fn intent_body(&self, query: &IntentQuery, page: u32) -> Value {
        let mut body = Map::new();
        insert_joined(&mut body, "topics", &query.topics);

        // An explicit numeric floor wins over the categorical strength
        let floor = query
            .signal_score_min
            .or_else(|| query.signal_strength.and_then(|s| s.min_score_floor()));
        if let Some(floor) = floor {
            body.insert("signalScoreMin".into(), json!(floor));
        }

        self.insert_sic_codes(&mut body, &query.sic_codes);
        self.insert_employee_bounds(&mut body, query.employee_min, query.employee_max);
        self.insert_paging(&mut body, page);
        Value::Object(body)
    }

    /// Wire body for `POST /search/company`
    pub fn company_body(&self, query: &CompanyQuery, page: u32) -> Value {
        let mut body = Map::new();
        insert_joined(&mut body, "zipCodes", &query.zip_codes);
        if let Some(radius) = query.radius_miles {
            body.insert("radiusMiles".into(), json!(radius));
        }
        self.insert_sic_codes(&mut body, &query.sic_codes);
        self.insert_employee_bounds(&mut body, query.employee_min, query.employee_max);
        self.insert_paging(&mut body, page);
        Value::Object(body)
    }

    /// Wire body for `POST /search/contact`
    pub fn contact_body(&self, query: &ContactQuery, page: u32) -> Value {
        let mut body = Map::new();
        insert_joined(&mut body, "zipCodes", &query.zip_codes);
        if let Some(radius) = query.radius_miles {
            body.insert("radiusMiles".into(), json!(radius));
        }
        insert_joined(&mut body, "companyIds", &query.company_ids);

        let levels: Vec<String> =
            query.management_levels.iter().map(|l| l.wire_value().to_string()).collect();
        insert_joined(&mut body, "managementLevels", &levels);

        self.insert_employee_bounds(&mut body, query.employee_min, query.employee_max);
        self.insert_sic_codes(&mut body, &query.sic_codes);

        if let Some(floor) = query.accuracy_min {
            body.insert("contactAccuracyScoreMin".into(), json!(floor));
        }
        insert_joined(&mut body, "requiredFields", &query.required_fields);
        if let Some(mode) = query.location_mode {
            body.insert("locationSearchType".into(), json!(mode.wire_value()));
        }

        self.insert_paging(&mut body, page);
        Value::Object(body)
    }

    /// Wire body for `POST /enrich/contact`
    pub fn enrich_body(&self, query: &EnrichQuery) -> Value {
        let inputs: Vec<Value> =
            query.person_ids.iter().map(|id| json!({ "personId": id })).collect();

        let fields: Vec<String> = if query.output_fields.is_empty() {
            DEFAULT_ENRICH_OUTPUT_FIELDS.iter().map(|f| (*f).to_string()).collect()
        } else {
            query.output_fields.clone()
        };

        json!({ "matchPersonInput": inputs, "outputFields": fields })
    }

    fn insert_sic_codes(&self, body: &mut Map<String, Value>, codes: &[String]) {
        if codes.is_empty() {
            insert_joined(body, "sicCodes", &self.defaults.industry_codes());
        } else {
            insert_joined(body, "sicCodes", codes);
        }
    }

    /// Employee bounds with ICP defaults substituted for omitted values.
    ///
    /// `Some(0)` as a ceiling means "no ceiling" and is omitted entirely.
    fn insert_employee_bounds(
        &self,
        body: &mut Map<String, Value>,
        min: Option<u32>,
        max: Option<u32>,
    ) {
        let (default_min, default_max) = self.defaults.employee_bounds();

        let min = min.unwrap_or(default_min);
        if min > 0 {
            body.insert("employeeRangeMin".into(), json!(min));
        }

        match max.or(default_max) {
            Some(0) | None => {}
            Some(ceiling) => {
                body.insert("employeeRangeMax".into(), json!(ceiling));
            }
        }
    }

    fn insert_paging(&self, body: &mut Map<String, Value>, page: u32) {
        body.insert("rpp".into(), json!(self.page_size));
        body.insert("page".into(), json!(page));
    }
}

fn insert_joined(body: &mut Map<String, Value>, key: &str, values: &[String]) {
    if !values.is_empty() {
        body.insert(key.into(), json!(values.join(",")));
    }
}
