const WORDS_PER_MINUTE: usize = 200;

/// Number of whitespace-delimited tokens in `text`.
#[must_use]
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Estimated reading time in whole minutes: zero for an empty page, at
/// least one otherwise.
#[must_use]
pub fn reading_time(words: usize) -> usize {
    if words == 0 {
        0
    } else {
        (words / WORDS_PER_MINUTE).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_words() {
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("  \n\t "), 0);
        assert_eq!(count_words("one two\nthree\tfour  five"), 5);
        assert_eq!(count_words("# Heading\n\n- item"), 4);
    }

    #[test]
    fn test_reading_time() {
        assert_eq!(reading_time(0), 0);
        assert_eq!(reading_time(1), 1);
        assert_eq!(reading_time(150), 1);
        assert_eq!(reading_time(399), 1);
        assert_eq!(reading_time(450), 2);
        assert_eq!(reading_time(2000), 10);
    }
}
