//! Search Results

use crate::error::SearchError;

/// Outcome of [`Indexer::search`](crate::Indexer::search)
///
/// Holds either the resolved records or the error that stopped the
/// search. Check [`SearchResult::failed`] before trusting an empty result.
#[derive(Debug, Clone)]
pub struct SearchResult<R> {
    result: Result<Vec<R>, SearchError>,
}

impl<R> From<Result<Vec<R>, SearchError>> for SearchResult<R> {
    fn from(result: Result<Vec<R>, SearchError>) -> Self {
        Self { result }
    }
}

impl<R: Clone> SearchResult<R> {
    pub fn error(&self) -> Option<&SearchError> {
        self.result.as_ref().err()
    }

    pub fn failed(&self) -> bool {
        self.result.is_err()
    }

    /// First record, if the search succeeded and found any
    pub fn invoke_one(&self) -> Option<R> {
        self.result.as_ref().ok().and_then(|records| records.first().cloned())
    }

    /// All records, or `None` on failure
    pub fn invoke_all(&self) -> Option<Vec<R>> {
        self.result.as_ref().ok().cloned()
    }

    /// Visit records until `visit` returns false. Does nothing on failure.
    pub fn range<F>(&self, mut visit: F)
    where
        F: FnMut(&R) -> bool,
    {
        if let Ok(records) = &self.result {
            for record in records {
                if !visit(record) {
                    return;
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.result.as_ref().map(Vec::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_result(self) -> Result<Vec<R>, SearchError> {
        self.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success() {
        let result = SearchResult::from(Ok(vec![1, 2, 3]));
        assert!(!result.failed());
        assert_eq!(result.error(), None);
        assert_eq!(result.invoke_one(), Some(1));
        assert_eq!(result.invoke_all(), Some(vec![1, 2, 3]));
        assert_eq!(result.len(), 3);

        let mut seen = Vec::new();
        result.range(|v| {
            seen.push(*v);
            *v < 2
        });
        assert_eq!(seen, vec![1, 2]);
    }

    #[test]
    fn test_empty_success() {
        let result: SearchResult<u32> = SearchResult::from(Ok(Vec::new()));
        assert!(!result.failed());
        assert_eq!(result.invoke_one(), None);
        assert_eq!(result.invoke_all(), Some(Vec::new()));
    }

    #[test]
    fn test_failure() {
        let err = SearchError::IndexNotFound {
            index: "region".to_string(),
        };
        let result: SearchResult<u32> = SearchResult::from(Err(err.clone()));
        assert!(result.failed());
        assert_eq!(result.error(), Some(&err));
        assert_eq!(result.invoke_one(), None);
        assert_eq!(result.invoke_all(), None);
        assert!(result.is_empty());

        let mut visited = false;
        result.range(|_| {
            visited = true;
            true
        });
        assert!(!visited);
        assert_eq!(result.into_result(), Err(err));
    }
}
