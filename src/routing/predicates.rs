//! Keyword predicates that pick a response branch before or beside the
//! embedding match. All checks are case-insensitive substring tests.

/// Terms that route an utterance to the weather lookup.
pub const WEATHER_KEYWORDS: &[&str] = &["weather", "temperature"];

/// Phrases that route an utterance to product recommendations.
pub const RECOMMENDATION_KEYWORDS: &[&str] = &[
    "recommend",
    "suggest",
    "which",
    "what should i plant",
    "what to plant",
    "best",
    "which seeds",
    "buy seeds",
    "available products",
];

/// Resolved tags that also mean "recommend products".
pub const RECOMMENDATION_TAGS: &[&str] = &["product_recommendation", "plant_recommendations"];

/// Weather description words that mean rain is coming.
pub const RAIN_WORDS: &[&str] = &["rain", "drizzle", "shower"];

/// Inputs that only ask to look at an attached image.
pub const GENERIC_IMAGE_REQUESTS: &[&str] = &[
    "analyze this image",
    "scan this photo",
    "check this image",
    "image analysis",
    "",
];

/// Commands that end an interactive session.
pub const EXIT_COMMANDS: &[&str] = &["exit", "quit", "bye"];

fn contains_any(text: &str, needles: &[&str]) -> bool {
    let lowered = text.to_lowercase();
    needles.iter().any(|n| lowered.contains(n))
}

pub fn is_weather_query(text: &str) -> bool {
    contains_any(text, WEATHER_KEYWORDS)
}

pub fn is_recommendation_query(text: &str) -> bool {
    contains_any(text, RECOMMENDATION_KEYWORDS)
}

pub fn is_recommendation_tag(tag: &str) -> bool {
    RECOMMENDATION_TAGS.contains(&tag)
}

pub fn mentions_rain(description: &str) -> bool {
    contains_any(description, RAIN_WORDS)
}

/// Exact (trimmed, lowercased) match against the generic image phrases.
pub fn is_generic_image_request(text: &str) -> bool {
    GENERIC_IMAGE_REQUESTS.contains(&text.trim().to_lowercase().as_str())
}

pub fn is_exit_command(text: &str) -> bool {
    EXIT_COMMANDS.contains(&text.trim().to_lowercase().as_str())
}
