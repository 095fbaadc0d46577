use url::Url;

/// One unit of crawl work: a claimed URL and the depth it was discovered at
///
/// Ownership moves with the unit, from its submitter to the queue to the
/// worker that runs its crawl step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskUnit {
    url: Url,
    depth: u32,
}

impl TaskUnit {
    /// Creates the depth-0 unit for a seed URL
    pub fn seed(url: Url) -> Self {
        Self { url, depth: 0 }
    }

    /// Creates a unit for a link discovered on this unit's page
    pub fn child(&self, url: Url) -> Self {
        Self {
            url,
            depth: self.depth + 1,
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Returns true if this unit must not be fetched under `max_depth`
    pub fn exceeds(&self, max_depth: u32) -> bool {
        self.depth >= max_depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_depth() {
        let seed = TaskUnit::seed(Url::parse("https://example.com/").unwrap());
        let child = seed.child(Url::parse("https://example.com/a").unwrap());
        let grandchild = child.child(Url::parse("https://example.com/b").unwrap());

        assert_eq!(seed.depth(), 0);
        assert_eq!(child.depth(), 1);
        assert_eq!(grandchild.depth(), 2);
        assert_eq!(grandchild.url().as_str(), "https://example.com/b");
    }

    #[test]
    fn test_depth_bound() {
        let seed = TaskUnit::seed(Url::parse("https://example.com/").unwrap());
        assert!(seed.exceeds(0));
        assert!(!seed.exceeds(1));

        let child = seed.child(Url::parse("https://example.com/a").unwrap());
        assert!(child.exceeds(1));
        assert!(!child.exceeds(2));
    }
}
