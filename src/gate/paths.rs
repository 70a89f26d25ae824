/// Ordered list of path prefixes reachable without a session credential.
///
/// An entry matches a path exactly or as a prefix followed by `/`, so
/// `/products` covers `/products/5` but not `/products-foo`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PublicPathSet {
    entries: Vec<String>,
}

impl PublicPathSet {
    pub fn new(entries: Vec<String>) -> Self {
        Self { entries }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.iter().any(|entry| matches_entry(entry, path))
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn matches_entry(entry: &str, path: &str) -> bool {
    path.strip_prefix(entry)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn storefront() -> PublicPathSet {
        PublicPathSet::new(
            ["/", "/login", "/products", "/auth/social-callback"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )
    }

    #[rstest]
    #[case("/")]
    #[case("/login")]
    #[case("/products")]
    #[case("/products/5")]
    #[case("/products/5/reviews")]
    #[case("/products/")]
    #[case("/auth/social-callback")]
    fn test_public_matches(#[case] path: &str) {
        assert!(storefront().contains(path), "{path} should be public");
    }

    #[rstest]
    #[case("/productsX")]
    #[case("/products-foo")]
    #[case("/orders")]
    #[case("/login2")]
    #[case("/auth")]
    #[case("/auth/social")]
    #[case("")]
    fn test_non_public(#[case] path: &str) {
        assert!(!storefront().contains(path), "{path} should not be public");
    }

    #[test]
    fn test_root_entry_matches_only_root() {
        let set = PublicPathSet::new(vec!["/".to_string()]);
        assert!(set.contains("/"));
        assert!(!set.contains("/orders"));
    }

    #[test]
    fn test_empty_set_is_closed() {
        let set = PublicPathSet::default();
        assert!(set.is_empty());
        assert!(!set.contains("/"));
        assert!(!set.contains("/login"));
    }
}
