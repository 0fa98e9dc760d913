use uuid::Uuid;

use super::error::DomainError;

/// Parse an externally supplied entity identifier.
pub fn parse_entity_id(raw: &str) -> Result<Uuid, DomainError> {
    Uuid::parse_str(raw.trim())
        .map_err(|err| DomainError::validation(format!("malformed id `{raw}`: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hyphenated_uuid() {
        let id = parse_entity_id("3d825f60-9fff-4dfe-b294-1a45fa1e115d").expect("valid id");
        assert_eq!(id.to_string(), "3d825f60-9fff-4dfe-b294-1a45fa1e115d");
    }

    #[test]
    fn rejects_garbage() {
        let err = parse_entity_id("not-a-uuid").expect_err("invalid id");
        assert!(matches!(err, DomainError::Validation { .. }));
    }
}
