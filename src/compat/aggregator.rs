use std::sync::{Arc, Mutex, PoisonError};

use super::CompatibilityResult;

/// Thread-safe collection of comparison results
///
/// Clones share the same storage, so every task can hold its own handle.
/// A poisoned lock is recovered: appends cannot leave the list half-written.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    inner: Arc<Mutex<Vec<CompatibilityResult>>>,
}

/// Results split by outcome, each half sorted by archive name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub problematic: Vec<CompatibilityResult>,
    pub compatible: Vec<CompatibilityResult>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_result(&self, result: CompatibilityResult) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(result);
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take the collected results and classify them
    pub fn finalize(self) -> Classification {
        let results = match Arc::try_unwrap(self.inner) {
            Ok(mutex) => mutex.into_inner().unwrap_or_else(PoisonError::into_inner),
            Err(shared) => shared
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        };

        classify_results(results)
    }
}

/// Sort by archive name (case-insensitive) and split into problematic and
/// fully compatible results, keeping the sorted order within each half.
pub fn classify_results(mut results: Vec<CompatibilityResult>) -> Classification {
    results.sort_by_cached_key(|r| r.jar_name.to_lowercase());

    let (compatible, problematic) = results
        .into_iter()
        .partition(CompatibilityResult::is_fully_compatible);

    Classification {
        problematic,
        compatible,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn result(name: &str, bin: u32, src: u32) -> CompatibilityResult {
        CompatibilityResult {
            bin_compatibility: bin,
            src_compatibility: src,
            ..CompatibilityResult::new(name)
        }
    }

    #[test]
    fn test_concurrent_appends_are_not_lost() {
        let results = ResultSet::new();

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let results = results.clone();
                thread::spawn(move || {
                    for i in 0..50 {
                        results.add_result(result(&format!("t{t}-{i}.jar"), 100, 100));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(results.len(), 400);
        let classification = results.finalize();
        assert_eq!(classification.compatible.len(), 400);
        assert!(classification.problematic.is_empty());
    }

    #[test]
    fn test_classification_sorts_case_insensitively() {
        let classification = classify_results(vec![
            result("zeta.jar", 100, 100),
            result("Beta.jar", 90, 100),
            result("alpha.jar", 100, 100),
            result("Gamma.jar", 100, 100),
            result("delta.jar", 100, 42),
        ]);

        let compatible: Vec<&str> = classification
            .compatible
            .iter()
            .map(|r| r.jar_name.as_str())
            .collect();
        let problematic: Vec<&str> = classification
            .problematic
            .iter()
            .map(|r| r.jar_name.as_str())
            .collect();

        assert_eq!(compatible, vec!["alpha.jar", "Gamma.jar", "zeta.jar"]);
        assert_eq!(problematic, vec!["Beta.jar", "delta.jar"]);
    }

    #[test]
    fn test_empty_set_classifies_to_empty() {
        let results = ResultSet::new();
        assert!(results.is_empty());
        assert_eq!(results.finalize(), Classification::default());
    }

    #[test]
    fn test_finalize_with_outstanding_handle() {
        let results = ResultSet::new();
        let handle = results.clone();
        handle.add_result(result("a.jar", 50, 50));

        let classification = results.finalize();
        assert_eq!(classification.problematic.len(), 1);
        drop(handle);
    }
}
