//! Column lists accepted by index, key and constraint operations

use std::fmt;

/// An ordered list of columns (or index expressions)
///
/// Built from a single delimited string (`"a, b"`, `"a b"`) or from a list,
/// both normalize to the same tokens. A string containing parentheses is an
/// expression and is kept as a single token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ColumnList(Vec<String>);

impl ColumnList {
    /// Parse a delimited column string
    pub fn parse(spec: &str) -> Self {
        if spec.contains('(') {
            let spec = spec.trim();
            return if spec.is_empty() {
                Self::default()
            } else {
                Self(vec![spec.to_string()])
            };
        }
        Self(
            spec.split(|c: char| c == ',' || c.is_whitespace())
                .filter(|token| !token.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Columns joined with `", "`
    pub fn joined(&self) -> String {
        self.0.join(", ")
    }
}

impl fmt::Display for ColumnList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined())
    }
}

impl From<&str> for ColumnList {
    fn from(spec: &str) -> Self {
        Self::parse(spec)
    }
}

impl From<String> for ColumnList {
    fn from(spec: String) -> Self {
        Self::parse(&spec)
    }
}

impl From<&String> for ColumnList {
    fn from(spec: &String) -> Self {
        Self::parse(spec)
    }
}

impl From<Vec<String>> for ColumnList {
    fn from(columns: Vec<String>) -> Self {
        columns.iter().map(String::as_str).collect()
    }
}

impl From<Vec<&str>> for ColumnList {
    fn from(columns: Vec<&str>) -> Self {
        columns.into_iter().collect()
    }
}

impl From<&[&str]> for ColumnList {
    fn from(columns: &[&str]) -> Self {
        columns.iter().copied().collect()
    }
}

impl<const N: usize> From<[&str; N]> for ColumnList {
    fn from(columns: [&str; N]) -> Self {
        columns.into_iter().collect()
    }
}

impl From<&ColumnList> for ColumnList {
    fn from(columns: &ColumnList) -> Self {
        columns.clone()
    }
}

impl<'a> FromIterator<&'a str> for ColumnList {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_and_list_normalize_alike() {
        let from_str = ColumnList::from("customer_name, created_at");
        let from_list = ColumnList::from(["customer_name", "created_at"]);
        assert_eq!(from_str, from_list);
        assert_eq!(from_str.len(), 2);
    }

    #[test]
    fn test_space_separated_spec() {
        let columns = ColumnList::from("post_id tag_id");
        assert_eq!(columns.iter().collect::<Vec<_>>(), vec!["post_id", "tag_id"]);
    }

    #[test]
    fn test_expression_kept_whole() {
        let columns = ColumnList::from("LOWER(email), id");
        assert_eq!(columns.len(), 1);
        assert_eq!(columns.joined(), "LOWER(email), id");
    }

    #[test]
    fn test_blank_tokens_dropped() {
        assert!(ColumnList::from(" , ").is_empty());
        assert!(ColumnList::from(vec!["", "  "]).is_empty());
    }
}
