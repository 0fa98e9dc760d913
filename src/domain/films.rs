//! Film projections.
//!
//! Listings work with [`FilmSummary`]. Point lookups return [`FilmDetail`], which
//! embeds the summary and adds the fields that need a secondary lookup to build.
//! [`FilmDocument`] is the shape stored in the index, with genres still held as names.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::DomainError;
use super::genres::Genre;
use super::persons::PersonRef;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilmSummary {
    #[serde(alias = "uuid")]
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub imdb_rating: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilmDetail {
    #[serde(flatten)]
    pub summary: FilmSummary,
    pub description: Option<String>,
    pub genres: Vec<Genre>,
    pub actors: Vec<PersonRef>,
    pub writers: Vec<PersonRef>,
    pub directors: Vec<PersonRef>,
}

/// Film as indexed. `genre` carries genre names that still need resolving.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilmDocument {
    #[serde(flatten)]
    pub summary: FilmSummary,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub genre: Vec<String>,
    #[serde(default)]
    pub actors: Vec<PersonRef>,
    #[serde(default)]
    pub writers: Vec<PersonRef>,
    #[serde(default)]
    pub directors: Vec<PersonRef>,
}

impl FilmDocument {
    pub fn genre_names(&self) -> &[String] {
        &self.genre
    }
}

impl FilmDetail {
    /// Combine an indexed document with its resolved genres.
    ///
    /// `genres` must line up one-to-one with `document.genre`.
    pub fn assemble(document: FilmDocument, genres: Vec<Genre>) -> Result<Self, DomainError> {
        if genres.len() != document.genre.len() {
            return Err(DomainError::invariant(format!(
                "film {} lists {} genres but {} were resolved",
                document.summary.id,
                document.genre.len(),
                genres.len()
            )));
        }

        if let Some((name, genre)) = document
            .genre
            .iter()
            .zip(genres.iter())
            .find(|(name, genre)| **name != genre.name)
        {
            return Err(DomainError::invariant(format!(
                "film {} genre `{name}` resolved to `{}`",
                document.summary.id, genre.name
            )));
        }

        Ok(Self {
            summary: document.summary,
            description: document.description,
            genres,
            actors: document.actors,
            writers: document.writers,
            directors: document.directors,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn heist_document() -> FilmDocument {
        serde_json::from_value(json!({
            "id": "3d825f60-9fff-4dfe-b294-1a45fa1e115d",
            "title": "The Vault",
            "imdb_rating": 7.4,
            "description": "A heist film",
            "genre": ["Action", "Drama"],
            "actors": [{"id": "26e83050-29ef-4163-a99d-b546cac208f8", "name": "Ann Rowe"}],
            "writers": [],
            "directors": [{"id": "a5a8f573-3cee-4ccc-8a2b-91cb9f55250a", "full_name": "Lee Park"}]
        }))
        .expect("document decodes")
    }

    fn genre(name: &str) -> Genre {
        Genre {
            id: Uuid::new_v4(),
            name: name.to_string(),
        }
    }

    #[test]
    fn assemble_keeps_document_fields() {
        let detail = FilmDetail::assemble(heist_document(), vec![genre("Action"), genre("Drama")])
            .expect("assembled");

        assert_eq!(detail.summary.title, "The Vault");
        assert_eq!(detail.description.as_deref(), Some("A heist film"));
        assert_eq!(detail.genres[0].name, "Action");
        assert_eq!(detail.genres[1].name, "Drama");
        assert_eq!(detail.directors[0].name, "Lee Park");
    }

    #[test]
    fn assemble_rejects_missing_genres() {
        let err = FilmDetail::assemble(heist_document(), vec![genre("Action")])
            .expect_err("count mismatch");
        assert!(matches!(err, DomainError::Invariant { .. }));
    }

    #[test]
    fn assemble_rejects_reordered_genres() {
        let err = FilmDetail::assemble(heist_document(), vec![genre("Drama"), genre("Action")])
            .expect_err("order mismatch");
        assert!(matches!(err, DomainError::Invariant { .. }));
    }

    #[test]
    fn detail_serializes_flat() {
        let detail = FilmDetail::assemble(heist_document(), vec![genre("Action"), genre("Drama")])
            .expect("assembled");
        let value = serde_json::to_value(&detail).expect("serializes");

        assert_eq!(value["title"], "The Vault");
        assert_eq!(value["description"], "A heist film");
        assert!(value.get("summary").is_none());
    }

    #[test]
    fn summary_from_full_document_has_no_description() {
        let raw = serde_json::to_value(heist_document()).expect("serializes");
        let summary: FilmSummary = serde_json::from_value(raw).expect("summary decodes");
        let value = serde_json::to_value(&summary).expect("serializes");

        assert_eq!(summary.title, "The Vault");
        assert!(value.get("description").is_none());
    }
}
