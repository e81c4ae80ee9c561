//! YAML front matter at the top of markdown documents.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};

use crate::error::MetadataError;

const DELIMITER: &str = "---";

/// Decoded front matter block.
///
/// Keys without a dedicated field are kept in [`extra`](Self::extra).
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub title: Option<String>,
    /// Required for the page to build in explicit mode.
    pub publish: bool,
    /// Excludes the page from draft-mode builds.
    pub draft: bool,
    pub permalink: Option<String>,
    #[serde(rename = "cssClasses", deserialize_with = "string_list")]
    pub css_classes: Vec<String>,
    #[serde(deserialize_with = "string_list")]
    pub aliases: Vec<String>,
    #[serde(deserialize_with = "string_list")]
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// Accept `key:` (null), a single string, or a list of strings.
fn string_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(value)) => vec![value],
        Some(OneOrMany::Many(values)) => values,
    })
}

/// Split a document into its raw front matter and body.
///
/// Front matter exists only when the first line is `---` and a later line
/// trims to `---`. The body after the closing line is trimmed; without
/// front matter the whole source is the body.
#[must_use]
pub fn split_front_matter(source: &str) -> (Option<&str>, &str) {
    let Some((first, rest)) = source.split_once('\n') else {
        return (None, source);
    };
    if first.trim() != DELIMITER {
        return (None, source);
    }

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim() == DELIMITER {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return (Some(yaml), body.trim());
        }
        offset += line.len();
    }
    (None, source)
}

/// Decode the front matter of `source` and return it with the body.
///
/// A document without front matter, or with an empty block, decodes to
/// [`FrontMatter::default`].
///
/// # Errors
///
/// Returns [`MetadataError::Parse`] if the block is not valid YAML or a
/// known key has the wrong type.
pub fn parse_front_matter(source: &str) -> Result<(FrontMatter, &str), MetadataError> {
    let (yaml, body) = split_front_matter(source);
    let yaml = yaml.map(str::trim).unwrap_or_default();
    if yaml.is_empty() {
        return Ok((FrontMatter::default(), body));
    }

    let front_matter = serde_yaml::from_str(yaml)
        .map_err(|e| MetadataError::Parse(format!("Invalid YAML: {e}")))?;
    Ok((front_matter, body))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_split_without_front_matter() {
        let source = "# Title\n\nBody\n";
        assert_eq!(split_front_matter(source), (None, source));
    }

    #[test]
    fn test_split_unclosed_block_is_body() {
        let source = "---\ntitle: x\nno closing line\n";
        assert_eq!(split_front_matter(source), (None, source));
    }

    #[test]
    fn test_split_trims_body() {
        let source = "---\ntitle: x\n---  \n\n# Heading\n\n";
        assert_eq!(
            split_front_matter(source),
            (Some("title: x\n"), "# Heading")
        );
    }

    #[test]
    fn test_split_horizontal_rule_later_is_not_front_matter() {
        let source = "Intro\n---\nMore\n";
        assert_eq!(split_front_matter(source), (None, source));
    }

    #[test]
    fn test_parse_known_fields() {
        let source = "---\ntitle: \"Garden Notes\"\npublish: true\npermalink: /garden/\n\
                      cssClasses: [wide, serif]\naliases: Notes\ntags:\n---\nBody text";
        let (meta, body) = parse_front_matter(source).unwrap();
        assert_eq!(meta.title.as_deref(), Some("Garden Notes"));
        assert!(meta.publish);
        assert!(!meta.draft);
        assert_eq!(meta.permalink.as_deref(), Some("/garden/"));
        assert_eq!(meta.css_classes, vec!["wide".to_owned(), "serif".to_owned()]);
        assert_eq!(meta.aliases, vec!["Notes".to_owned()]);
        assert!(meta.tags.is_empty());
        assert_eq!(body, "Body text");
    }

    #[test]
    fn test_parse_keeps_unknown_keys() {
        let (meta, _) = parse_front_matter("---\ndraft: true\nrating: 4\n---\n").unwrap();
        assert!(meta.draft);
        assert_eq!(
            meta.extra.get("rating"),
            Some(&serde_yaml::Value::Number(4.into()))
        );
    }

    #[test]
    fn test_parse_empty_block() {
        let (meta, body) = parse_front_matter("---\n---\ntext").unwrap();
        assert_eq!(meta, FrontMatter::default());
        assert_eq!(body, "text");
    }

    #[test]
    fn test_parse_malformed_yaml() {
        let result = parse_front_matter("---\ntitle: [unclosed\n---\nbody");
        assert!(matches!(result, Err(MetadataError::Parse(_))));
    }

    #[test]
    fn test_parse_wrong_type() {
        assert!(parse_front_matter("---\ndraft: [1, 2]\n---\n").is_err());
    }
}
