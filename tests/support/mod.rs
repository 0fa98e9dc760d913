//! Shared fixtures: an in-memory search index that understands the query DSL
//! the services emit, a seeded catalogue, and a call-counting cache store.
#![allow(dead_code)]

use std::cmp::Ordering as CmpOrdering;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use kinoteka::application::repos::{IndexError, RawDocument, SearchIndex};
use kinoteka::cache::{CacheAside, CacheConfig, CacheStore, CacheStoreError, MemoryCacheStore};
use kinoteka::infra::http::ApiState;
use serde_json::{Value, json};
use uuid::Uuid;

pub const ACTION: Uuid = Uuid::from_u128(0x1001);
pub const DRAMA: Uuid = Uuid::from_u128(0x1002);
pub const COMEDY: Uuid = Uuid::from_u128(0x1003);

pub const STAR_WARS: Uuid = Uuid::from_u128(0x2001);
pub const STAR_TREK: Uuid = Uuid::from_u128(0x2002);
pub const AMELIE: Uuid = Uuid::from_u128(0x2003);
pub const LOST_WESTERN: Uuid = Uuid::from_u128(0x2004);

pub const HAMILL: Uuid = Uuid::from_u128(0x3001);
pub const LUCAS: Uuid = Uuid::from_u128(0x3002);
pub const GHOST: Uuid = Uuid::from_u128(0x3003);

/// Search index fake evaluating `match`, `match_all`, `bool.filter.term`,
/// `multi_match`, `sort`, `from` and `size` over in-memory documents.
#[derive(Default)]
pub struct CatalogueIndex {
    indices: HashMap<String, Vec<RawDocument>>,
    searches: AtomicUsize,
    gets: AtomicUsize,
    failing: AtomicBool,
}

impl CatalogueIndex {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_index(mut self, name: &str, documents: Vec<Value>) -> Self {
        let documents = documents
            .into_iter()
            .filter_map(|value| match value {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect();
        self.indices.insert(name.to_string(), documents);
        self
    }

    /// Films, genres and persons used across the integration tests.
    pub fn seeded() -> Self {
        Self::empty()
            .with_index(
                "genres",
                vec![
                    json!({ "id": ACTION, "name": "Action" }),
                    json!({ "id": DRAMA, "name": "Drama" }),
                    json!({ "id": COMEDY, "name": "Comedy" }),
                ],
            )
            .with_index(
                "movies",
                vec![
                    json!({
                        "id": STAR_WARS,
                        "title": "Star Wars",
                        "imdb_rating": 8.6,
                        "description": "A space opera",
                        "genre": ["Action", "Drama"],
                        "actors": [{ "id": HAMILL, "name": "Mark Hamill" }],
                        "writers": [{ "id": LUCAS, "name": "George Lucas" }],
                        "directors": [{ "id": LUCAS, "name": "George Lucas" }],
                    }),
                    json!({
                        "id": STAR_TREK,
                        "title": "Star Trek",
                        "imdb_rating": 7.9,
                        "description": "Space exploration",
                        "genre": ["Action"],
                        "actors": [{ "id": HAMILL, "name": "Mark Hamill" }],
                        "writers": [],
                        "directors": [],
                    }),
                    json!({
                        "id": AMELIE,
                        "title": "Amelie",
                        "imdb_rating": 8.3,
                        "description": "A shy waitress in Paris",
                        "genre": ["Comedy", "Drama"],
                        "actors": [],
                        "writers": [],
                        "directors": [],
                    }),
                    json!({
                        "id": LOST_WESTERN,
                        "title": "Lost Western",
                        "imdb_rating": 5.1,
                        "genre": ["Western"],
                    }),
                ],
            )
            .with_index(
                "persons",
                vec![
                    json!({
                        "id": HAMILL,
                        "full_name": "Mark Hamill",
                        "role": "actor",
                        "film_ids": [STAR_WARS, STAR_TREK],
                    }),
                    json!({
                        "id": LUCAS,
                        "full_name": "George Lucas",
                        "role": "director",
                        "film_ids": [STAR_WARS],
                    }),
                    json!({
                        "id": GHOST,
                        "full_name": "Ghost Writer",
                        "role": "writer",
                        "film_ids": [Uuid::from_u128(0xdead)],
                    }),
                ],
            )
    }

    pub fn searches(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.searches() + self.gets()
    }

    /// Make every subsequent call fail as if the index were unreachable.
    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    fn documents(&self, index: &str) -> Result<&[RawDocument], IndexError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(IndexError::transport("connection refused"));
        }
        self.indices
            .get(index)
            .map(Vec::as_slice)
            .ok_or_else(|| IndexError::NotFound(format!("no such index [{index}]")))
    }
}

#[async_trait]
impl SearchIndex for CatalogueIndex {
    async fn search(&self, index: &str, body: &Value) -> Result<Vec<RawDocument>, IndexError> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        let documents = self.documents(index)?;

        let query = &body["query"];
        let mut hits: Vec<RawDocument> = documents
            .iter()
            .filter(|document| matches_query(document, query))
            .cloned()
            .collect();

        if let Some((field, descending)) = sort_clause(body) {
            hits.sort_by(|left, right| {
                let ordering = compare_field(left.get(&field), right.get(&field));
                if descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }

        let from = body["from"].as_u64().unwrap_or(0) as usize;
        let size = body["size"].as_u64().unwrap_or(10) as usize;
        Ok(hits.into_iter().skip(from).take(size).collect())
    }

    async fn get(&self, index: &str, id: &str) -> Result<Option<RawDocument>, IndexError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        let documents = self.documents(index)?;
        Ok(documents
            .iter()
            .find(|document| document.get("id").and_then(Value::as_str) == Some(id))
            .cloned())
    }
}

fn matches_query(document: &RawDocument, query: &Value) -> bool {
    if query.get("match_all").is_some() {
        return true;
    }
    if let Some(clause) = query.get("match").and_then(Value::as_object) {
        return clause.iter().all(|(field, spec)| {
            let wanted = spec["query"].as_str().unwrap_or_default();
            field_values(document, field)
                .iter()
                .any(|value| value.eq_ignore_ascii_case(wanted))
        });
    }
    if let Some(clause) = query.get("bool") {
        let must = clause["must"]
            .as_array()
            .is_none_or(|clauses| clauses.iter().all(|inner| matches_query(document, inner)));
        let filter = clause["filter"].as_array().is_none_or(|clauses| {
            clauses.iter().all(|inner| {
                inner["term"].as_object().is_some_and(|term| {
                    term.iter().all(|(field, wanted)| {
                        let wanted = wanted.as_str().unwrap_or_default();
                        field_values(document, field).iter().any(|value| value == wanted)
                    })
                })
            })
        });
        return must && filter;
    }
    if let Some(clause) = query.get("multi_match") {
        let text = clause["query"].as_str().unwrap_or_default().to_lowercase();
        let fields = clause["fields"].as_array().cloned().unwrap_or_default();
        return fields.iter().filter_map(Value::as_str).any(|field| {
            field_values(document, field)
                .iter()
                .any(|value| value.to_lowercase().contains(&text))
        });
    }
    false
}

fn field_values(document: &RawDocument, field: &str) -> Vec<String> {
    match document.get(field) {
        Some(Value::String(value)) => vec![value.clone()],
        Some(Value::Array(values)) => values
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn sort_clause(body: &Value) -> Option<(String, bool)> {
    let clause = body["sort"].as_array()?.first()?.as_object()?;
    let (field, spec) = clause.iter().next()?;
    let field = field.strip_suffix(".raw").unwrap_or(field).to_string();
    Some((field, spec["order"].as_str() == Some("desc")))
}

fn compare_field(left: Option<&Value>, right: Option<&Value>) -> CmpOrdering {
    match (left, right) {
        (Some(Value::Number(l)), Some(Value::Number(r))) => l
            .as_f64()
            .partial_cmp(&r.as_f64())
            .unwrap_or(CmpOrdering::Equal),
        (Some(Value::String(l)), Some(Value::String(r))) => l.cmp(r),
        (Some(_), None) => CmpOrdering::Less,
        (None, Some(_)) => CmpOrdering::Greater,
        _ => CmpOrdering::Equal,
    }
}

/// Cache store counting reads, hits and writes over a memory store.
pub struct CountingStore {
    inner: MemoryCacheStore,
    pub reads: AtomicUsize,
    pub hits: AtomicUsize,
    pub writes: AtomicUsize,
}

impl CountingStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryCacheStore::with_capacity(1024),
            reads: AtomicUsize::new(0),
            hits: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CacheStore for CountingStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheStoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let value = self.inner.get(key).await?;
        if value.is_some() {
            self.hits.fetch_add(1, Ordering::SeqCst);
        }
        Ok(value)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheStoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value, ttl).await
    }
}

pub struct Harness {
    pub index: Arc<CatalogueIndex>,
    pub store: Arc<CountingStore>,
    pub state: ApiState,
}

impl Harness {
    pub fn seeded() -> Self {
        Self::over(CatalogueIndex::seeded())
    }

    pub fn over(index: CatalogueIndex) -> Self {
        let index = Arc::new(index);
        let store = Arc::new(CountingStore::new());
        let executor = Arc::new(CacheAside::new(index.clone(), store.clone()));
        let state = ApiState::from_executor(executor, &CacheConfig::default());
        Self {
            index,
            store,
            state,
        }
    }
}
