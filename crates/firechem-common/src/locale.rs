//! Display locale and the user-facing message catalogue.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    He,
    En,
}

impl Locale {
    /// Lenient parse; anything unrecognised falls back to Hebrew.
    pub fn parse(tag: Option<&str>) -> Self {
        match tag.map(|t| t.trim().to_ascii_lowercase()) {
            Some(t) if t == "en" || t.starts_with("en-") => Locale::En,
            _ => Locale::He,
        }
    }
}

/// Every message a caller can see.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    MissingStructures,
    QueryTooShort,
    MalformedRequest(String),
    NoProduct,
    PredictionTimeout,
    PredictorUnavailable,
    PredictorRejected,
    NotFound(String),
    Internal(String),
}

impl Message {
    pub fn render(&self, locale: Locale) -> String {
        match (self, locale) {
            (Message::MissingStructures, Locale::He) => "חסרים נתוני SMILES של שני החומרים".to_string(),
            (Message::MissingStructures, Locale::En) => "SMILES for both substances are required".to_string(),

            (Message::QueryTooShort, Locale::He) => "יש להזין שם חומר או מספר CAS (לפחות 2 תווים)".to_string(),
            (Message::QueryTooShort, Locale::En) => "Enter a substance name or CAS number (at least 2 characters)".to_string(),

            (Message::MalformedRequest(detail), Locale::He) => format!("בקשה לא תקינה: {detail}"),
            (Message::MalformedRequest(detail), Locale::En) => format!("Malformed request: {detail}"),

            (Message::NoProduct, Locale::He) => "המודל לא הצליח לחזות תוצר".to_string(),
            (Message::NoProduct, Locale::En) => "The model could not predict a product".to_string(),

            (Message::PredictionTimeout, Locale::He) => "שירות החיזוי לא החזיר תוצאה בזמן, נסה שוב".to_string(),
            (Message::PredictionTimeout, Locale::En) => "The prediction service did not answer in time, try again".to_string(),

            (Message::PredictorUnavailable, Locale::He) => "שגיאה בחיבור לשירות החיזוי".to_string(),
            (Message::PredictorUnavailable, Locale::En) => "Could not reach the prediction service".to_string(),

            (Message::PredictorRejected, Locale::He) => "שירות החיזוי דחה את הבקשה".to_string(),
            (Message::PredictorRejected, Locale::En) => "The prediction service rejected the request".to_string(),

            (Message::NotFound(query), Locale::He) => format!("לא נמצא חומר: {query}"),
            (Message::NotFound(query), Locale::En) => format!("No substance found: {query}"),

            (Message::Internal(detail), Locale::He) => format!("שגיאה: {detail}"),
            (Message::Internal(detail), Locale::En) => format!("Error: {detail}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_parse() {
        assert_eq!(Locale::parse(None), Locale::He);
        assert_eq!(Locale::parse(Some("EN")), Locale::En);
        assert_eq!(Locale::parse(Some("en-GB")), Locale::En);
        assert_eq!(Locale::parse(Some("fr")), Locale::He);
    }

    #[test]
    fn test_not_found_includes_query() {
        let msg = Message::NotFound("unobtainium".to_string());
        assert!(msg.render(Locale::En).contains("unobtainium"));
        assert!(msg.render(Locale::He).contains("unobtainium"));
    }
}
