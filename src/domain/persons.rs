use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A person as embedded in a film document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRef {
    #[serde(alias = "uuid")]
    pub id: Uuid,
    #[serde(alias = "full_name")]
    pub name: String,
}

/// A person as stored in the persons index: the embedded form plus role and filmography.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    #[serde(flatten)]
    pub base: PersonRef,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub film_ids: Vec<Uuid>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn person_accepts_index_field_names() {
        let raw = json!({
            "uuid": "a5a8f573-3cee-4ccc-8a2b-91cb9f55250a",
            "full_name": "George Lucas",
            "role": "director",
            "film_ids": ["3d825f60-9fff-4dfe-b294-1a45fa1e115d"]
        });

        let person: Person = serde_json::from_value(raw).expect("person decodes");
        assert_eq!(person.base.name, "George Lucas");
        assert_eq!(person.role, "director");
        assert_eq!(person.film_ids.len(), 1);
    }
}
