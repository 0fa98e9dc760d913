//! Search-index query descriptors.
//!
//! A [`QueryDescriptor`] is a plain value: two descriptors describing the same
//! logical query compare equal and derive the same cache key. `to_native` turns
//! it into the Elasticsearch request the index adapter sends.

use serde::Serialize;
use serde_json::{Map, Value, json};
use thiserror::Error;
use uuid::Uuid;

use crate::application::pagination::ResultWindow;
use crate::cache::keys::descriptor_key;

pub mod indices {
    pub const FILMS: &str = "movies";
    pub const GENRES: &str = "genres";
    pub const PERSONS: &str = "persons";
}

/// Hits fetched for a point match. Analyzed matches may score near-duplicates
/// above the exact value, so callers pick the exact hit from a short list.
pub const POINT_MATCH_SIZE: u64 = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("unknown sort field `{0}`")]
    UnknownSortField(String),
    #[error("search text must not be empty")]
    EmptySearchText,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Public sort name to index field.
#[derive(Debug, Clone, Copy)]
pub struct SortAliases(&'static [(&'static str, &'static str)]);

pub const FILM_SORT_FIELDS: SortAliases = SortAliases(&[
    ("imdb_rating", "imdb_rating"),
    ("rating", "imdb_rating"),
    ("title", "title.raw"),
]);

impl SortAliases {
    pub fn resolve(&self, public: &str) -> Option<&'static str> {
        self.0
            .iter()
            .find(|(name, _)| *name == public)
            .map(|(_, field)| *field)
    }
}

/// Sort on a resolved index field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SortSpec {
    pub field: &'static str,
    pub order: SortOrder,
}

impl SortSpec {
    /// Parse `name` or `-name` (descending) through an alias table.
    pub fn parse(aliases: &SortAliases, raw: &str) -> Result<Self, QueryError> {
        let raw = raw.trim();
        let (order, name) = match raw.strip_prefix('-') {
            Some(rest) => (SortOrder::Desc, rest),
            None => (SortOrder::Asc, raw.strip_prefix('+').unwrap_or(raw)),
        };

        let field = aliases
            .resolve(name)
            .ok_or_else(|| QueryError::UnknownSortField(raw.to_string()))?;

        Ok(Self { field, order })
    }

    fn to_native(self) -> Value {
        json!([{ self.field: { "order": self.order.as_str() } }])
    }
}

/// Exact-term restriction applied on top of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TermFilter {
    pub field: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum QueryShape {
    ById {
        id: String,
    },
    Match {
        field: &'static str,
        value: String,
    },
    Listing {
        sort: Option<SortSpec>,
        window: ResultWindow,
    },
    Filtered {
        sort: Option<SortSpec>,
        window: ResultWindow,
        filter: TermFilter,
    },
    Search {
        text: String,
        fields: &'static [&'static str],
        window: ResultWindow,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct QueryDescriptor {
    index: &'static str,
    #[serde(flatten)]
    shape: QueryShape,
}

/// What the index adapter should do with a descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeRequest {
    Get { id: String },
    Search { body: Value },
}

impl QueryDescriptor {
    pub fn by_id(index: &'static str, id: Uuid) -> Self {
        Self {
            index,
            shape: QueryShape::ById { id: id.to_string() },
        }
    }

    pub fn point(index: &'static str, field: &'static str, value: impl Into<String>) -> Self {
        Self {
            index,
            shape: QueryShape::Match {
                field,
                value: value.into(),
            },
        }
    }

    pub fn listing(index: &'static str, sort: Option<SortSpec>, window: ResultWindow) -> Self {
        Self {
            index,
            shape: QueryShape::Listing { sort, window },
        }
    }

    pub fn filtered(
        index: &'static str,
        sort: Option<SortSpec>,
        window: ResultWindow,
        filter: TermFilter,
    ) -> Self {
        Self {
            index,
            shape: QueryShape::Filtered {
                sort,
                window,
                filter,
            },
        }
    }

    pub fn search(
        index: &'static str,
        text: &str,
        fields: &'static [&'static str],
        window: ResultWindow,
    ) -> Result<Self, QueryError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(QueryError::EmptySearchText);
        }

        Ok(Self {
            index,
            shape: QueryShape::Search {
                text: text.to_string(),
                fields,
                window,
            },
        })
    }

    pub fn index(&self) -> &'static str {
        self.index
    }

    pub fn shape(&self) -> &QueryShape {
        &self.shape
    }

    pub fn cache_key(&self) -> String {
        descriptor_key(self)
    }

    pub fn to_native(&self) -> NativeRequest {
        let body = match &self.shape {
            QueryShape::ById { id } => return NativeRequest::Get { id: id.clone() },
            QueryShape::Match { field, value } => json!({
                "query": { "match": { *field: { "query": value } } },
                "size": POINT_MATCH_SIZE,
            }),
            QueryShape::Listing { sort, window } => {
                paged(json!({ "match_all": {} }), *sort, *window)
            }
            QueryShape::Filtered {
                sort,
                window,
                filter,
            } => paged(
                json!({
                    "bool": {
                        "must": [{ "match_all": {} }],
                        "filter": [{ "term": { filter.field: filter.value } }],
                    }
                }),
                *sort,
                *window,
            ),
            QueryShape::Search {
                text,
                fields,
                window,
            } => paged(
                json!({
                    "multi_match": {
                        "query": text,
                        "fields": fields,
                        "fuzziness": "AUTO",
                    }
                }),
                None,
                *window,
            ),
        };

        NativeRequest::Search { body }
    }
}

fn paged(query: Value, sort: Option<SortSpec>, window: ResultWindow) -> Value {
    let mut body = Map::new();
    body.insert("query".to_string(), query);
    body.insert("from".to_string(), json!(window.from));
    body.insert("size".to_string(), json!(window.size));
    if let Some(sort) = sort {
        body.insert("sort".to_string(), sort.to_native());
    }
    Value::Object(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::pagination::PageRequest;

    const FIELDS: &[&str] = &["title", "description"];

    fn window(number: u32, size: u32) -> ResultWindow {
        PageRequest::new(number, size).expect("valid page").window()
    }

    fn body(descriptor: &QueryDescriptor) -> Value {
        match descriptor.to_native() {
            NativeRequest::Search { body } => body,
            NativeRequest::Get { .. } => panic!("expected a search body"),
        }
    }

    #[test]
    fn sort_aliases_map_public_names() {
        let spec = SortSpec::parse(&FILM_SORT_FIELDS, "-imdb_rating").expect("known field");
        assert_eq!(spec.field, "imdb_rating");
        assert_eq!(spec.order, SortOrder::Desc);

        let spec = SortSpec::parse(&FILM_SORT_FIELDS, "title").expect("known field");
        assert_eq!(spec.field, "title.raw");
        assert_eq!(spec.order, SortOrder::Asc);
    }

    #[test]
    fn unknown_sort_field_is_rejected() {
        assert_eq!(
            SortSpec::parse(&FILM_SORT_FIELDS, "title.raw"),
            Err(QueryError::UnknownSortField("title.raw".to_string()))
        );
    }

    #[test]
    fn listing_body_carries_window_and_sort() {
        let sort = SortSpec::parse(&FILM_SORT_FIELDS, "title").ok();
        let descriptor = QueryDescriptor::listing(indices::FILMS, sort, window(2, 50));

        let body = body(&descriptor);
        assert_eq!(body["from"], 50);
        assert_eq!(body["size"], 50);
        assert_eq!(body["sort"][0]["title.raw"]["order"], "asc");
        assert!(body["query"]["match_all"].is_object());
    }

    #[test]
    fn listing_without_sort_omits_sort_clause() {
        let descriptor = QueryDescriptor::listing(indices::GENRES, None, ResultWindow::first(1000));
        assert!(body(&descriptor).get("sort").is_none());
    }

    #[test]
    fn filtered_body_uses_exact_term() {
        let descriptor = QueryDescriptor::filtered(
            indices::FILMS,
            None,
            window(1, 10),
            TermFilter {
                field: "genre",
                value: "Drama".to_string(),
            },
        );

        let body = body(&descriptor);
        assert_eq!(body["query"]["bool"]["filter"][0]["term"]["genre"], "Drama");
    }

    #[test]
    fn search_body_is_fuzzy_multi_field() {
        let descriptor =
            QueryDescriptor::search(indices::FILMS, " star wars ", FIELDS, window(1, 10))
                .expect("valid search");

        let body = body(&descriptor);
        assert_eq!(body["query"]["multi_match"]["query"], "star wars");
        assert_eq!(body["query"]["multi_match"]["fuzziness"], "AUTO");
        assert_eq!(body["query"]["multi_match"]["fields"][1], "description");
    }

    #[test]
    fn blank_search_text_is_rejected() {
        assert_eq!(
            QueryDescriptor::search(indices::FILMS, "   ", FIELDS, window(1, 10)),
            Err(QueryError::EmptySearchText)
        );
    }

    #[test]
    fn by_id_maps_to_document_get() {
        let id = Uuid::nil();
        let descriptor = QueryDescriptor::by_id(indices::FILMS, id);
        assert_eq!(
            descriptor.to_native(),
            NativeRequest::Get { id: id.to_string() }
        );
    }

    #[test]
    fn point_match_targets_field() {
        let descriptor = QueryDescriptor::point(indices::GENRES, "name", "Drama");
        let body = body(&descriptor);
        assert_eq!(body["query"]["match"]["name"]["query"], "Drama");
        assert_eq!(body["size"], POINT_MATCH_SIZE);
    }
}
