/// Name of the category that receives manually added and downloaded versions.
pub const CUSTOM_CATEGORY: &str = "Custom";

/// One installable or installed build: a label and a local path or URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Version {
    pub label: String,
    pub path: String,
}

impl Version {
    pub fn new(label: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
        }
    }

    /// Both fields are filled in.
    pub fn is_complete(&self) -> bool {
        !self.label.is_empty() && !self.path.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub versions: Vec<Version>,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            versions: Vec::new(),
        }
    }

    pub fn with_versions(name: impl Into<String>, versions: Vec<Version>) -> Self {
        Self {
            name: name.into(),
            versions,
        }
    }

    fn is_custom(&self) -> bool {
        self.name == CUSTOM_CATEGORY
    }
}

/// Ordered categories of versions. Exactly one `Custom` category exists and it is always last.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Registry {
    categories: Vec<Category>,
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            categories: vec![Category::new(CUSTOM_CATEGORY)],
        }
    }
}

impl Registry {
    /// Build a registry, folding every `Custom` category into a single trailing one.
    pub fn from_categories(categories: Vec<Category>) -> Self {
        let (custom, mut categories): (Vec<_>, Vec<_>) =
            categories.into_iter().partition(Category::is_custom);
        let versions = custom.into_iter().flat_map(|c| c.versions).collect();
        categories.push(Category::with_versions(CUSTOM_CATEGORY, versions));
        Self { categories }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn custom(&self) -> Option<&Category> {
        self.categories.last().filter(|c| c.is_custom())
    }

    /// Every version in category order.
    pub fn versions(&self) -> impl Iterator<Item = &Version> {
        self.categories.iter().flat_map(|c| c.versions.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.versions().next().is_none()
    }

    pub fn push_custom(&mut self, version: Version) {
        match self.categories.last_mut() {
            Some(category) if category.is_custom() => category.versions.push(version),
            _ => self.categories.push(Category::with_versions(
                CUSTOM_CATEGORY,
                vec![version],
            )),
        }
    }

    /// Remove the first entry matching both fields, scanning categories in order.
    pub fn remove_first(&mut self, label: &str, path: &str) -> Option<Version> {
        self.categories.iter_mut().find_map(|category| {
            let index = category
                .versions
                .iter()
                .position(|v| v.label == label && v.path == path)?;
            Some(category.versions.remove(index))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(registry: &Registry) -> Vec<&str> {
        registry
            .categories()
            .iter()
            .map(|c| c.name.as_str())
            .collect()
    }

    #[test]
    fn default_registry_has_only_custom() {
        let registry = Registry::default();
        assert_eq!(names(&registry), vec![CUSTOM_CATEGORY]);
        assert!(registry.is_empty());
    }

    #[test]
    fn folds_custom_categories_to_the_end() {
        let registry = Registry::from_categories(vec![
            Category::with_versions(CUSTOM_CATEGORY, vec![Version::new("a", "/a")]),
            Category::new("Stable"),
            Category::with_versions(CUSTOM_CATEGORY, vec![Version::new("b", "/b")]),
        ]);
        assert_eq!(names(&registry), vec!["Stable", CUSTOM_CATEGORY]);
        let custom = registry.custom().map(|c| c.versions.clone());
        assert_eq!(
            custom,
            Some(vec![Version::new("a", "/a"), Version::new("b", "/b")])
        );
    }

    #[test]
    fn appends_new_versions_to_custom() {
        let mut registry = Registry::from_categories(vec![Category::new("Stable")]);
        registry.push_custom(Version::new("mine", "/bin/game"));
        assert_eq!(names(&registry), vec!["Stable", CUSTOM_CATEGORY]);
        assert_eq!(registry.versions().count(), 1);
    }

    #[test]
    fn removes_only_the_first_match() {
        let mut registry = Registry::from_categories(vec![
            Category::with_versions(
                "Stable",
                vec![Version::new("v1", "/a"), Version::new("mine", "/path/b")],
            ),
            Category::with_versions(CUSTOM_CATEGORY, vec![Version::new("mine", "/path/b")]),
        ]);

        let removed = registry.remove_first("mine", "/path/b");

        assert_eq!(removed, Some(Version::new("mine", "/path/b")));
        assert_eq!(
            registry.categories()[0].versions,
            vec![Version::new("v1", "/a")]
        );
        assert_eq!(
            registry.custom().map(|c| c.versions.len()),
            Some(1)
        );
    }

    #[test]
    fn removal_requires_label_and_path_to_match() {
        let mut registry = Registry::default();
        registry.push_custom(Version::new("mine", "/path/b"));
        assert_eq!(registry.remove_first("mine", "/path/c"), None);
        assert_eq!(registry.remove_first("other", "/path/b"), None);
        assert_eq!(registry.versions().count(), 1);
    }
}
