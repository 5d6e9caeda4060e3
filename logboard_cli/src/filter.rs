//! Filter form state and in-session address history

use chrono::NaiveDate;
use url::form_urlencoded;

/// The active filter constraints on the log table.
///
/// Mirrors the server's filter form: every field is optional and an
/// unset field is omitted from the serialized query entirely.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    pub ip_address: Option<String>,
    pub method: Option<String>,
    pub status_code: Option<u16>,
    pub path: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub query_param: Option<String>,
    pub query_value: Option<String>,
}

impl FilterState {
    /// Serialize to query pairs in the server's form-field order.
    ///
    /// The order is fixed so that the same state always produces the
    /// same serialization.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();

        if let Some(ip) = &self.ip_address {
            pairs.push(("ip_address".to_string(), ip.clone()));
        }
        if let Some(method) = &self.method {
            pairs.push(("method".to_string(), method.clone()));
        }
        if let Some(code) = self.status_code {
            pairs.push(("status_code".to_string(), code.to_string()));
        }
        if let Some(path) = &self.path {
            pairs.push(("path".to_string(), path.clone()));
        }
        if let Some(date) = self.start_date {
            pairs.push(("start_date".to_string(), date.format("%Y-%m-%d").to_string()));
        }
        if let Some(date) = self.end_date {
            pairs.push(("end_date".to_string(), date.format("%Y-%m-%d").to_string()));
        }
        if let Some(param) = &self.query_param {
            pairs.push(("query_param".to_string(), param.clone()));
            // A value filter only makes sense together with a parameter name
            if let Some(value) = &self.query_value {
                pairs.push(("query_value".to_string(), value.clone()));
            }
        }

        pairs
    }

    /// The externally visible query string for this state.
    ///
    /// This is what lands in the address history; the partial-request
    /// marker the client appends on the wire is never part of it.
    pub fn visible_query(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (name, value) in self.to_query_pairs() {
            serializer.append_pair(&name, &value);
        }
        serializer.finish()
    }

    pub fn is_empty(&self) -> bool {
        *self == FilterState::default()
    }
}

/// One history entry: the filter and the address it was shown under
#[derive(Debug, Clone)]
struct HistoryEntry {
    state: FilterState,
    address: String,
}

/// In-session address history.
///
/// Each successful filter application pushes an entry; back/forward
/// walk the stack and hand the stored state back to the caller for
/// re-application. Pushing while not at the top discards the forward
/// entries, the way browser history does.
#[derive(Debug, Default)]
pub struct History {
    entries: Vec<HistoryEntry>,
    pos: usize,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successfully applied filter
    pub fn push(&mut self, state: FilterState) {
        if self
            .current()
            .is_some_and(|current| *current == state)
        {
            return;
        }
        if !self.entries.is_empty() {
            self.entries.truncate(self.pos + 1);
        }
        let address = state.visible_query();
        self.entries.push(HistoryEntry { state, address });
        self.pos = self.entries.len() - 1;
    }

    /// Step back, returning the filter to re-apply
    pub fn back(&mut self) -> Option<FilterState> {
        if self.pos == 0 || self.entries.is_empty() {
            return None;
        }
        self.pos -= 1;
        Some(self.entries[self.pos].state.clone())
    }

    /// Step forward, returning the filter to re-apply
    pub fn forward(&mut self) -> Option<FilterState> {
        if self.pos + 1 >= self.entries.len() {
            return None;
        }
        self.pos += 1;
        Some(self.entries[self.pos].state.clone())
    }

    /// The filter currently shown
    pub fn current(&self) -> Option<&FilterState> {
        self.entries.get(self.pos).map(|e| &e.state)
    }

    /// The address currently shown
    pub fn current_address(&self) -> Option<&str> {
        self.entries.get(self.pos).map(|e| e.address.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_filter(code: u16) -> FilterState {
        FilterState {
            status_code: Some(code),
            ..Default::default()
        }
    }

    #[test]
    fn test_serialization_skips_unset_fields() {
        let state = FilterState {
            method: Some("GET".to_string()),
            status_code: Some(404),
            ..Default::default()
        };

        let pairs = state.to_query_pairs();
        assert_eq!(
            pairs,
            vec![
                ("method".to_string(), "GET".to_string()),
                ("status_code".to_string(), "404".to_string()),
            ]
        );
    }

    #[test]
    fn test_serialization_is_idempotent() {
        let state = FilterState {
            ip_address: Some("10.0.0.1".to_string()),
            path: Some("/api".to_string()),
            start_date: NaiveDate::from_ymd_opt(2025, 3, 1),
            query_param: Some("page".to_string()),
            query_value: Some("2".to_string()),
            ..Default::default()
        };

        assert_eq!(state.to_query_pairs(), state.to_query_pairs());
        assert_eq!(state.visible_query(), state.visible_query());
    }

    #[test]
    fn test_query_value_requires_param() {
        let state = FilterState {
            query_value: Some("orphan".to_string()),
            ..Default::default()
        };

        assert!(state.to_query_pairs().is_empty());
    }

    #[test]
    fn test_visible_query_has_no_marker() {
        let state = status_filter(404);
        let query = state.visible_query();
        assert_eq!(query, "status_code=404");
        assert!(!query.contains("ajax"));
    }

    #[test]
    fn test_history_back_and_forward() {
        let mut history = History::new();
        history.push(FilterState::default());
        history.push(status_filter(404));
        history.push(status_filter(500));

        assert_eq!(history.back(), Some(status_filter(404)));
        assert_eq!(history.back(), Some(FilterState::default()));
        assert_eq!(history.back(), None);
        assert_eq!(history.forward(), Some(status_filter(404)));
    }

    #[test]
    fn test_history_push_discards_forward_entries() {
        let mut history = History::new();
        history.push(FilterState::default());
        history.push(status_filter(404));
        history.back();

        history.push(status_filter(200));
        assert_eq!(history.len(), 2);
        assert_eq!(history.forward(), None);
        assert_eq!(history.current(), Some(&status_filter(200)));
    }

    #[test]
    fn test_history_skips_duplicate_push() {
        let mut history = History::new();
        history.push(status_filter(404));
        history.push(status_filter(404));
        assert_eq!(history.len(), 1);
    }
}
