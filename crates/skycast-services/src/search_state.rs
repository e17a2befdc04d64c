use skycast_cities::{City, CityPage};

/// What a search results view renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPageState {
    pub items: Vec<City>,
    /// Total hits reported by the last successful response
    pub total_count: u64,
    /// No further pages. False until a response says otherwise.
    pub exhausted: bool,
    pub loading: bool,
    /// User-facing message of the last failed fetch
    pub error: Option<String>,
}

impl SearchPageState {
    pub(crate) fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// Replace (`reset`) or extend the items with a fetched page.
    pub(crate) fn apply(&mut self, page: CityPage, reset: bool) {
        if reset {
            self.items = page.cities;
        } else {
            self.items.extend(page.cities);
        }
        self.total_count = page.total;
        self.exhausted = self.items.len() as u64 >= self.total_count;
        self.loading = false;
        self.error = None;
    }

    /// Record a failure. Items and totals are left as they were.
    pub(crate) fn fail(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.error = Some(message.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn city(n: usize) -> City {
        City {
            id: format!("city-{}-r{}", n, n),
            record_id: format!("r{}", n),
            name: format!("City {}", n),
            country: "France".into(),
            population: 1000,
            latitude: 0.0,
            longitude: 0.0,
            timezone: "Europe/Paris".into(),
            admin1: None,
            admin2: None,
            elevation: None,
        }
    }

    fn page(range: std::ops::Range<usize>, total: u64) -> CityPage {
        CityPage {
            cities: range.map(city).collect(),
            total,
        }
    }

    #[test]
    fn test_initial_state() {
        let state = SearchPageState::default();
        assert!(state.items.is_empty());
        assert!(!state.exhausted);
        assert!(!state.loading);
    }

    #[test]
    fn test_reset_replaces_and_continuation_appends() {
        let mut state = SearchPageState::default();
        state.apply(page(0..20, 45), true);
        assert_eq!(state.items.len(), 20);
        assert!(!state.exhausted);

        state.apply(page(20..40, 45), false);
        assert_eq!(state.items.len(), 40);

        state.apply(page(0..5, 5), true);
        assert_eq!(state.items.len(), 5);
        assert!(state.exhausted);
    }

    #[test]
    fn test_failure_keeps_items() {
        let mut state = SearchPageState::default();
        state.apply(page(0..3, 10), true);
        state.begin();
        state.fail("The request timed out. Please try again.");

        assert_eq!(state.items.len(), 3);
        assert_eq!(state.total_count, 10);
        assert!(!state.loading);
        assert!(state.error.is_some());

        state.begin();
        assert!(state.error.is_none());
    }
}
