//! Route dispatch for the mock REST surface.

use std::collections::BTreeMap;
use std::thread;
use std::time::Duration;

use lazy_static::lazy_static;
use sandbench_kv::KeyValueStore;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::{db, ApiRequest, ApiResponse, ChaosConfig, ChaosState, Error, Method, MockDb, Upstream};

const API_PREFIX: &str = "/api/";

fn default_name_field() -> String {
    "name".to_string()
}

/// Per-collection shape rules: which field is the display name (used by `q`
/// filtering) and which fields a POST body must carry. The reference
/// `products` collection requires a `name` string and a numeric `price`;
/// collections without rules accept any JSON object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct CollectionRules {
    pub name_field: String,
    pub required_string: Option<String>,
    pub required_number: Option<String>,
}

impl Default for CollectionRules {
    fn default() -> Self {
        CollectionRules {
            name_field: default_name_field(),
            required_string: None,
            required_number: None,
        }
    }
}

impl CollectionRules {
    /// The reference rules for the `products` collection.
    pub fn products() -> Self {
        CollectionRules {
            name_field: "name".to_string(),
            required_string: Some("name".to_string()),
            required_number: Some("price".to_string()),
        }
    }

    fn validation_message(&self) -> String {
        match (&self.required_string, &self.required_number) {
            (Some(s), Some(n)) => format!("{} and {} required", s, n),
            (Some(s), None) => format!("{} required", s),
            (None, Some(n)) => format!("{} required", n),
            (None, None) => "invalid body".to_string(),
        }
    }

    /// Check a POST body against these rules. Returns the rejection message
    /// on failure.
    fn validate(&self, body: &serde_json::Map<String, Value>) -> Option<String> {
        let string_ok = match &self.required_string {
            Some(field) => body
                .get(field)
                .and_then(Value::as_str)
                .is_some_and(|s| !s.is_empty()),
            None => true,
        };
        let number_ok = match &self.required_number {
            Some(field) => body.get(field).is_some_and(Value::is_number),
            None => true,
        };

        if string_ok && number_ok {
            None
        } else {
            Some(self.validation_message())
        }
    }
}

/// The mock backend of one execution session.
///
/// Owns the per-session chaos state and the exercise-scoped persistence; the
/// snapshot itself is re-read from the store on every request so that a
/// backend constructed later over the same store (a reload without reset)
/// continues from the same state.
pub struct MockBackend<S> {
    exercise_id: String,
    store: S,
    seed: Option<MockDb>,
    chaos: ChaosState,
    rules: BTreeMap<String, CollectionRules>,
    upstream: Option<Box<dyn Upstream>>,
}

impl<S: KeyValueStore> MockBackend<S> {
    pub fn new(exercise_id: impl Into<String>, store: S) -> Self {
        MockBackend {
            exercise_id: exercise_id.into(),
            store,
            seed: None,
            chaos: ChaosState::new(ChaosConfig::default()),
            rules: BTreeMap::new(),
            upstream: None,
        }
    }

    /// Seed data used the first time this exercise is served with no
    /// persisted snapshot present.
    pub fn with_seed(mut self, seed: MockDb) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_chaos(mut self, config: ChaosConfig) -> Self {
        self.chaos = ChaosState::new(config);
        self
    }

    pub fn with_rules(mut self, rules: BTreeMap<String, CollectionRules>) -> Self {
        self.rules = rules;
        self
    }

    /// Transport for requests outside `/api/`.
    pub fn with_upstream(mut self, upstream: Box<dyn Upstream>) -> Self {
        self.upstream = Some(upstream);
        self
    }

    pub fn exercise_id(&self) -> &str {
        &self.exercise_id
    }

    /// Serve one intercepted request. Total: every failure mode comes back
    /// as a response, exactly as a real backend would answer.
    pub fn fetch(&mut self, request: &ApiRequest) -> ApiResponse {
        if !request.url.starts_with(API_PREFIX) {
            return self.passthrough(request);
        }

        let slow_ms = self.chaos.config().slow_ms;
        if slow_ms > 0 {
            thread::sleep(Duration::from_millis(slow_ms));
        }

        if let Some(reason) = self.chaos.next_failure() {
            return ApiResponse::server_error(reason);
        }

        match self.dispatch(request) {
            Ok(response) => response,
            Err(error) => {
                log::warn!(
                    "mock backend failure for {} {}: {}",
                    request.method.as_str(),
                    request.url,
                    error
                );
                ApiResponse::server_error("Mock backend failure")
            }
        }
    }

    /// Clear the persisted snapshot and restore chaos counters to their
    /// configured initial state. The execution context stays up.
    pub fn reset(&mut self) -> Result<(), Error> {
        db::clear(&mut self.store, &self.exercise_id)?;
        self.chaos.reset();
        Ok(())
    }

    fn dispatch(&mut self, request: &ApiRequest) -> Result<ApiResponse, Error> {
        lazy_static! {
            static ref SANDBOX_ORIGIN: Url = Url::parse("http://sandbox.invalid").unwrap();
        }

        let parsed = match SANDBOX_ORIGIN.join(&request.url) {
            Ok(parsed) => parsed,
            Err(_) => return Ok(ApiResponse::bad_request("Invalid request URL")),
        };
        let term = parsed
            .query_pairs()
            .find(|(key, _)| key == "q")
            .map(|(_, value)| value.into_owned());

        let segments: Vec<String> = parsed
            .path()
            .trim_start_matches(API_PREFIX)
            .split('/')
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        // Seed-on-first-access happens for every routed request, even ones
        // that will be rejected.
        let mut db = self.ensure_db()?;

        match segments.as_slice() {
            [collection] => self.collection_route(&mut db, collection, request, term.as_deref()),
            [collection, id] => match id.parse::<i64>() {
                Ok(id) => self.item_route(&mut db, collection, id, request),
                Err(_) => Ok(ApiResponse::not_found("Not Found")),
            },
            _ => Ok(ApiResponse::not_found("Not Found")),
        }
    }

    fn collection_route(
        &mut self,
        db: &mut MockDb,
        collection: &str,
        request: &ApiRequest,
        term: Option<&str>,
    ) -> Result<ApiResponse, Error> {
        match request.method {
            Method::GET => {
                let name_field = self.rules_for(collection).name_field;
                let rows: Vec<Value> = match term {
                    Some(term) => {
                        let term = term.to_lowercase();
                        db.records(collection)
                            .iter()
                            .filter(|record| {
                                record
                                    .get(&name_field)
                                    .and_then(Value::as_str)
                                    .is_some_and(|name| name.to_lowercase().contains(&term))
                            })
                            .cloned()
                            .collect()
                    }
                    None => db.records(collection).to_vec(),
                };
                Ok(ApiResponse::ok(Value::Array(rows)))
            }
            Method::POST => {
                let data = match parse_body(request) {
                    Ok(data) => data,
                    Err(response) => return Ok(response),
                };
                if let Some(message) = self.rules_for(collection).validate(&data) {
                    return Ok(ApiResponse::bad_request(&message));
                }
                let created = db.insert(collection, Value::Object(data));
                self.persist(db)?;
                Ok(ApiResponse::created(created))
            }
            _ => Ok(ApiResponse::not_found("Not Found")),
        }
    }

    fn item_route(
        &mut self,
        db: &mut MockDb,
        collection: &str,
        id: i64,
        request: &ApiRequest,
    ) -> Result<ApiResponse, Error> {
        match request.method {
            Method::GET => match db.find(collection, id) {
                Some(record) => Ok(ApiResponse::ok(record.clone())),
                None => Ok(ApiResponse::not_found("Record not found")),
            },
            Method::PUT | Method::PATCH => {
                let patch = match parse_body(request) {
                    Ok(patch) => patch,
                    Err(response) => return Ok(response),
                };
                match db.merge(collection, id, &Value::Object(patch)) {
                    Some(updated) => {
                        self.persist(db)?;
                        Ok(ApiResponse::ok(updated))
                    }
                    None => Ok(ApiResponse::not_found("Record not found")),
                }
            }
            Method::DELETE => {
                if db.remove(collection, id) {
                    self.persist(db)?;
                    Ok(ApiResponse::no_content())
                } else {
                    Ok(ApiResponse::not_found("Record not found"))
                }
            }
            Method::POST => Ok(ApiResponse::not_found("Not Found")),
        }
    }

    /// The working snapshot: the persisted one, or the seed persisted on
    /// first access so later requests (and reloads) see a consistent store.
    fn ensure_db(&mut self) -> Result<MockDb, Error> {
        match db::load(&self.store, &self.exercise_id)? {
            Some(existing) => Ok(existing),
            None => {
                let fresh = self.seed.clone().unwrap_or_default();
                db::save(&mut self.store, &self.exercise_id, &fresh)?;
                Ok(fresh)
            }
        }
    }

    fn persist(&mut self, db: &MockDb) -> Result<(), Error> {
        db::save(&mut self.store, &self.exercise_id, db)
    }

    fn rules_for(&self, collection: &str) -> CollectionRules {
        if let Some(rules) = self.rules.get(collection) {
            return rules.clone();
        }
        if collection == "products" {
            return CollectionRules::products();
        }
        CollectionRules::default()
    }

    fn passthrough(&mut self, request: &ApiRequest) -> ApiResponse {
        match &mut self.upstream {
            Some(upstream) => match upstream.fetch(request) {
                Ok(response) => response,
                Err(error) => {
                    log::warn!("passthrough to '{}' failed: {}", request.url, error);
                    ApiResponse::bad_gateway(&error.to_string())
                }
            },
            None => ApiResponse::bad_gateway("no upstream transport configured"),
        }
    }
}

/// Parse a request body that must be a JSON object. An absent body counts as
/// an empty object, as the reference surface treats it.
fn parse_body(request: &ApiRequest) -> Result<serde_json::Map<String, Value>, ApiResponse> {
    let raw = request.body.as_deref().unwrap_or("{}");
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(_) => Err(ApiResponse::bad_request("body must be a JSON object")),
        Err(_) => Err(ApiResponse::bad_request("Invalid JSON")),
    }
}

/// Host-addressable reset: clear the persisted mock state for one exercise
/// without touching any other exercise's snapshot.
pub fn reset_mock_db(store: &mut impl KeyValueStore, exercise_id: &str) -> Result<(), Error> {
    db::clear(store, exercise_id)
}
