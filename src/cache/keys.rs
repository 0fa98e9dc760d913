//! Cache key derivation.
//!
//! Keys are `{index}::{sha256 of the canonical descriptor JSON}`. The descriptor
//! serializes fields in declaration order, so equal descriptors give byte-equal keys.

use sha2::{Digest, Sha256};

use crate::application::query::QueryDescriptor;

pub fn descriptor_key(descriptor: &QueryDescriptor) -> String {
    let canonical = serde_json::to_vec(descriptor)
        .unwrap_or_else(|_| format!("{descriptor:?}").into_bytes());
    let digest = Sha256::digest(&canonical);
    format!("{}::{}", descriptor.index(), hex::encode(digest))
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::application::pagination::PageRequest;
    use crate::application::query::{FILM_SORT_FIELDS, SortSpec, TermFilter, indices};

    fn listing(sort: &str, number: u32, size: u32) -> QueryDescriptor {
        QueryDescriptor::listing(
            indices::FILMS,
            SortSpec::parse(&FILM_SORT_FIELDS, sort).ok(),
            PageRequest::new(number, size).expect("valid").window(),
        )
    }

    #[test]
    fn equal_descriptors_share_a_key() {
        assert_eq!(
            descriptor_key(&listing("title", 1, 50)),
            descriptor_key(&listing("title", 1, 50))
        );
    }

    #[test]
    fn sort_aliases_collapse_to_one_key() {
        assert_eq!(
            descriptor_key(&listing("rating", 1, 50)),
            descriptor_key(&listing("imdb_rating", 1, 50))
        );
    }

    #[test]
    fn distinguishing_fields_change_the_key() {
        let base = descriptor_key(&listing("title", 1, 50));
        assert_ne!(base, descriptor_key(&listing("-title", 1, 50)));
        assert_ne!(base, descriptor_key(&listing("imdb_rating", 1, 50)));
        assert_ne!(base, descriptor_key(&listing("title", 2, 50)));
        assert_ne!(base, descriptor_key(&listing("title", 1, 25)));

        let filtered = QueryDescriptor::filtered(
            indices::FILMS,
            SortSpec::parse(&FILM_SORT_FIELDS, "title").ok(),
            PageRequest::new(1, 50).expect("valid").window(),
            TermFilter {
                field: "genre",
                value: "Drama".to_string(),
            },
        );
        assert_ne!(base, descriptor_key(&filtered));
    }

    #[test]
    fn point_lookups_by_field_do_not_collide() {
        let by_name = QueryDescriptor::point(indices::GENRES, "name", "Drama");
        let by_id = QueryDescriptor::point(indices::GENRES, "id", "Drama");
        assert_ne!(descriptor_key(&by_name), descriptor_key(&by_id));
    }

    #[test]
    fn key_is_prefixed_with_index() {
        let key = descriptor_key(&QueryDescriptor::by_id(indices::FILMS, Uuid::nil()));
        let (index, digest) = key.split_once("::").expect("separator");
        assert_eq!(index, "movies");
        assert_eq!(digest.len(), 64);
    }
}
