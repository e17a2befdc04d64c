//! URL-safe city identifiers.
//!
//! A city id is the lowercased display name with every non-word character
//! replaced by `-`, followed by `-` and the provider record id. Decoding takes
//! the last hyphen-delimited segment as the record id, so a record id that
//! itself contains `-` does not survive a round trip.

/// The two halves of a decoded city id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityIdParts {
    /// Lowercased, hyphenated name fragment (usable as a search query)
    pub name: String,
    pub record_id: String,
}

/// Build the city id for `name` and provider `record_id`.
pub fn encode_city_id(name: &str, record_id: &str) -> String {
    let slug: String = name
        .to_lowercase()
        .chars()
        .map(|c| if is_word_char(c) { c } else { '-' })
        .collect();
    format!("{}-{}", slug, record_id)
}

/// Split a city id into its name fragment and record id.
///
/// An id without any `-` decodes to an empty name and the whole input as
/// record id.
pub fn decode_city_id(city_id: &str) -> CityIdParts {
    match city_id.rsplit_once('-') {
        Some((name, record_id)) => CityIdParts {
            name: name.to_string(),
            record_id: record_id.to_string(),
        },
        None => CityIdParts {
            name: String::new(),
            record_id: city_id.to_string(),
        },
    }
}

// ASCII letters, digits and underscore
fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_simple_name() {
        assert_eq!(encode_city_id("Paris", "abc123"), "paris-abc123");
    }

    #[test]
    fn test_encode_replaces_every_non_word_char() {
        assert_eq!(
            encode_city_id("Saint-Denis d'Oléron", "r1"),
            "saint-denis-d-ol-ron-r1"
        );
        assert_eq!(encode_city_id("New York", "f00"), "new-york-f00");
    }

    #[test]
    fn test_round_trip_alphanumeric_and_spaces() {
        let id = encode_city_id("Rio de Janeiro 2", "9f8e7d");
        let parts = decode_city_id(&id);
        assert_eq!(parts.name, "rio-de-janeiro-2");
        assert_eq!(parts.record_id, "9f8e7d");
    }

    #[test]
    fn test_decode_splits_on_last_hyphen() {
        let parts = decode_city_id("los-angeles-77aa");
        assert_eq!(parts.name, "los-angeles");
        assert_eq!(parts.record_id, "77aa");
    }

    #[test]
    fn test_hyphenated_record_id_is_lossy() {
        let parts = decode_city_id(&encode_city_id("Oslo", "ab-cd"));
        assert_eq!(parts.name, "oslo-ab");
        assert_eq!(parts.record_id, "cd");
    }

    #[test]
    fn test_decode_without_hyphen() {
        let parts = decode_city_id("standalone");
        assert_eq!(parts.name, "");
        assert_eq!(parts.record_id, "standalone");
    }
}
