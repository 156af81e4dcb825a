use chrono::Utc;

/// Header tags written at the top of an exported PGN.
#[derive(Debug, Clone)]
pub struct GameMetadata {
    pub event: String,
    pub site: String,
    pub date: String, // "YYYY.MM.DD"
    pub white: String,
    pub black: String,
    pub result: String, // "1-0", "0-1", "1/2-1/2", "*"
}

impl GameMetadata {
    /// Metadata for a game started today with an undecided result.
    pub fn new(white: &str, black: &str) -> Self {
        Self {
            event: "Casual game".to_string(),
            site: "?".to_string(),
            date: Utc::now().format("%Y.%m.%d").to_string(),
            white: white.to_string(),
            black: black.to_string(),
            result: "*".to_string(),
        }
    }

    pub fn with_result(mut self, result: &str) -> Self {
        self.result = result.to_string();
        self
    }
}
