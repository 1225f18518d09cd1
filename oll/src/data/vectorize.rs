use crate::data::FeatureVector;
use crate::error::Error;

type Result<T> = std::result::Result<T, Error>;

/// Turns raw text into a [`FeatureVector`]
pub trait Vectorizer {
    fn vectorize(&self, content: &str) -> FeatureVector;
}

/// Counts overlapping character n-grams after stripping line breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NGramVectorizer {
    min: usize,
    max: usize,
}

impl Default for NGramVectorizer {
    fn default() -> Self {
        Self { min: 2, max: 6 }
    }
}

impl NGramVectorizer {
    pub fn new(min: usize, max: usize) -> Result<Self> {
        if min == 0 || min > max {
            return Err(Error::InvalidNGramRange { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn range(&self) -> (usize, usize) {
        (self.min, self.max)
    }
}

impl Vectorizer for NGramVectorizer {
    fn vectorize(&self, content: &str) -> FeatureVector {
        let chars = content
            .chars()
            .filter(|c| !matches!(c, '\r' | '\n'))
            .collect::<Vec<_>>();

        let mut vector = FeatureVector::new();
        for start in 0..chars.len() {
            for size in self.min..=self.max {
                let end = start + size;
                if end > chars.len() {
                    break;
                }
                vector.increment(chars[start..end].iter().collect::<String>());
            }
        }
        vector
    }
}

/// Vectorizes `content` with the default 2 to 6 character n-grams
///
/// # Example
///
/// ```
/// let x = oll::data::make_vector("abab");
/// assert_eq!(x.get("ab"), Some(2.0));
/// assert_eq!(x.get("abab"), Some(1.0));
/// assert_eq!(x.get("a"), None);
/// ```
pub fn make_vector(content: &str) -> FeatureVector {
    NGramVectorizer::default().vectorize(content)
}
