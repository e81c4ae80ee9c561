/// Turn a slash-separated path into a URL-friendly slug.
///
/// Per segment: spaces become `-`, `&` becomes `-and-`, `%` becomes
/// `-percent`, and `?` and `#` are dropped. A trailing `/` is trimmed.
#[must_use]
pub fn path_to_slug(path: &str) -> String {
    let slug = path
        .split('/')
        .map(slug_segment)
        .collect::<Vec<_>>()
        .join("/");
    match slug.strip_suffix('/') {
        Some(trimmed) => trimmed.to_owned(),
        None => slug,
    }
}

fn slug_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for c in segment.chars() {
        match c {
            ' ' => out.push('-'),
            '&' => out.push_str("-and-"),
            '%' => out.push_str("-percent"),
            '?' | '#' => {}
            _ => out.push(c),
        }
    }
    out
}
