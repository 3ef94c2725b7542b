use serde::{Deserialize, Serialize};

/// One news article from the corpus.
///
/// `id` is the 0-based row position assigned at load time and doubles as
/// the article's position in the similarity index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: usize,
    pub article: String,
    pub date: String,
    pub heading: String,
    pub news_type: String,
}

impl Document {
    pub fn new(
        id: usize,
        article: impl Into<String>,
        date: impl Into<String>,
        heading: impl Into<String>,
        news_type: impl Into<String>,
    ) -> Self {
        Self {
            id,
            article: article.into(),
            date: date.into(),
            heading: heading.into(),
            news_type: news_type.into(),
        }
    }
}
