//! Static content: FAQ entries and promotional slider images.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Faq {
    pub id: i64,
    pub question: String,
    pub answer: String,
}

/// A promotional slider. `image` is a path relative to the media root;
/// responses carry an absolute URL built from the public base URL.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Slider {
    pub id: i64,
    pub image: String,
}
