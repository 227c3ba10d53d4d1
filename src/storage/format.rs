//! Line-oriented `installs.txt` / `versions.txt` format.
//!
//! ```text
//! # Category name
//! label: /path/or/url
//! ```

use crate::engine::models::{Category, Registry, Version};

const HEADER: &str = "Text above the first category (line starting with #) will be ignored. Text that
is not properly formatted will also be safely ignored.

Format for categories: Pound + space + name
Example:               # My Category Name

Format for versions:   label + colon + space + path (label may not have colons)
Example:               v0.0.0: https://example.org/download/version-0-0-0.zip

Given that the first non-empty line below starts with a pound+space pair, any
line that contains colons will be interpreted as a valid version. Be careful
if you write comments below them!

";

/// Parse registry text. Malformed lines are skipped.
pub fn parse(text: &str) -> Registry {
    let mut categories: Vec<Category> = Vec::new();

    for line in text.lines() {
        if line.len() < 3 {
            continue;
        }

        if let Some(rest) = line.strip_prefix('#') {
            if let Some(name) = rest.strip_prefix(' ') {
                categories.push(Category::new(name));
            }
            continue;
        }

        let Some(version) = parse_version_line(line) else {
            continue;
        };
        if let Some(category) = categories.last_mut() {
            category.versions.push(version);
        }
    }

    Registry::from_categories(categories)
}

fn parse_version_line(line: &str) -> Option<Version> {
    let sep = line.find(": ")?;
    if sep == 0 || line.len() < sep + 3 {
        return None;
    }
    // The label may not contain a colon of its own.
    if line.find(':') != Some(sep) {
        return None;
    }
    Some(Version::new(&line[..sep], &line[sep + 2..]))
}

/// Serialize a registry, header comment included.
pub fn serialize(registry: &Registry) -> String {
    let mut out = String::from(HEADER);
    for category in registry.categories() {
        out.push_str("\n# ");
        out.push_str(&category.name);
        out.push('\n');
        for version in &category.versions {
            out.push_str(&version.label);
            out.push_str(": ");
            out.push_str(&version.path);
            out.push('\n');
        }
    }
    out.push('\n');
    out
}
