//! Mission briefing
//!
//! Asks a hosted text model for a short mission briefing before each session.
//! Every failure (no key, network, bad payload) collapses to a built-in
//! briefing, so the game never waits on or fails because of this service.

use serde::{Deserialize, Serialize};

/// Model used for `generateContent`
pub const MODEL: &str = "gemini-3-flash-preview";

const ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";

const PROMPT: &str =
    "Generate a cool, arcade-style mission briefing for a sci-fi plane shooter game.";

/// Visual theme hint returned with the briefing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Scifi,
    Modern,
    Retro,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Scifi => "scifi",
            Theme::Modern => "modern",
            Theme::Retro => "retro",
        }
    }
}

/// Briefing shown on the loading screen and in the HUD
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionBriefing {
    pub name: String,
    pub objective: String,
    pub pilot_callsign: String,
    pub theme: Theme,
}

impl MissionBriefing {
    /// Built-in briefing used whenever generation fails
    pub fn fallback() -> Self {
        Self {
            name: "Operation: Dark Star".to_string(),
            objective: "Intercept unknown bogies approaching our airspace.".to_string(),
            pilot_callsign: "Raven".to_string(),
            theme: Theme::Scifi,
        }
    }
}

impl Default for MissionBriefing {
    fn default() -> Self {
        Self::fallback()
    }
}

/// Why a generated briefing could not be used
#[derive(thiserror::Error, Debug)]
pub enum BriefingError {
    #[error("no API key configured")]
    MissingCredential,

    #[error("network error: {0}")]
    Network(String),

    #[error("response contained no text")]
    EmptyResponse,

    #[error("malformed briefing: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A required field was present but blank
    #[error("briefing field `{0}` is empty")]
    Incomplete(&'static str),
}

/// Result type for briefing operations
pub type Result<T> = std::result::Result<T, BriefingError>;

/// API key baked in at build time
pub fn api_key() -> Option<&'static str> {
    option_env!("SKY_ACE_API_KEY").filter(|k| !k.is_empty())
}

/// `generateContent` URL for `key`
pub fn request_url(key: &str) -> String {
    format!("{ENDPOINT}/{MODEL}:generateContent?key={key}")
}

/// JSON body asking for a structured briefing
pub fn request_body() -> serde_json::Value {
    serde_json::json!({
        "contents": [{ "parts": [{ "text": PROMPT }] }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    "name": { "type": "STRING" },
                    "objective": { "type": "STRING" },
                    "pilotCallsign": { "type": "STRING" },
                    "theme": { "type": "STRING", "enum": ["scifi", "modern", "retro"] }
                },
                "required": ["name", "objective", "pilotCallsign", "theme"]
            }
        }
    })
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Pull the model's text out of a `generateContent` response
pub fn extract_text(response_json: &str) -> Result<String> {
    let response: GenerateResponse = serde_json::from_str(response_json)?;
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text)
        .filter(|t| !t.trim().is_empty())
        .ok_or(BriefingError::EmptyResponse)
}

/// Parse and validate the briefing JSON produced by the model
pub fn parse_briefing(text: &str) -> Result<MissionBriefing> {
    let briefing: MissionBriefing = serde_json::from_str(text)?;
    for (field, value) in [
        ("name", &briefing.name),
        ("objective", &briefing.objective),
        ("pilotCallsign", &briefing.pilot_callsign),
    ] {
        if value.trim().is_empty() {
            return Err(BriefingError::Incomplete(field));
        }
    }
    Ok(briefing)
}

/// Collapse any failure to the built-in briefing
pub fn resolve(result: Result<MissionBriefing>) -> MissionBriefing {
    match result {
        Ok(briefing) => {
            log::info!("Mission briefing generated: {}", briefing.name);
            briefing
        }
        Err(e) => {
            log::warn!("Using fallback mission briefing: {}", e);
            MissionBriefing::fallback()
        }
    }
}

/// Generate a briefing, never failing
pub async fn generate() -> MissionBriefing {
    resolve(request().await)
}

#[cfg(target_arch = "wasm32")]
async fn request() -> Result<MissionBriefing> {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{Request, RequestInit, RequestMode, Response};

    let key = api_key().ok_or(BriefingError::MissingCredential)?;
    let network = |e: wasm_bindgen::JsValue| BriefingError::Network(format!("{:?}", e));

    let init = RequestInit::new();
    init.set_method("POST");
    init.set_mode(RequestMode::Cors);
    init.set_body(&wasm_bindgen::JsValue::from_str(&request_body().to_string()));

    let request = Request::new_with_str_and_init(&request_url(key), &init).map_err(network)?;
    request
        .headers()
        .set("Content-Type", "application/json")
        .map_err(network)?;

    let window = web_sys::window().ok_or_else(|| BriefingError::Network("no window".into()))?;
    let response: Response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(network)?
        .dyn_into()
        .map_err(network)?;
    if !response.ok() {
        return Err(BriefingError::Network(format!("HTTP {}", response.status())));
    }

    let body = JsFuture::from(response.text().map_err(network)?)
        .await
        .map_err(network)?
        .as_string()
        .ok_or(BriefingError::EmptyResponse)?;

    parse_briefing(&extract_text(&body)?)
}

/// Native builds have no fetch; only the key check runs
#[cfg(not(target_arch = "wasm32"))]
async fn request() -> Result<MissionBriefing> {
    api_key().ok_or(BriefingError::MissingCredential)?;
    Err(BriefingError::Network("no HTTP client on native builds".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD: &str = r#"{
        "name": "Operation: Iron Gale",
        "objective": "Break the blockade over the northern ridge.",
        "pilotCallsign": "Viper",
        "theme": "retro"
    }"#;

    #[test]
    fn test_parse_valid_briefing() {
        let b = parse_briefing(GOOD).unwrap();
        assert_eq!(b.name, "Operation: Iron Gale");
        assert_eq!(b.pilot_callsign, "Viper");
        assert_eq!(b.theme, Theme::Retro);
    }

    #[test]
    fn test_unknown_theme_is_malformed() {
        let text = GOOD.replace("retro", "steampunk");
        assert!(matches!(parse_briefing(&text), Err(BriefingError::Malformed(_))));
    }

    #[test]
    fn test_missing_field_is_malformed() {
        let text = r#"{"name": "X", "objective": "Y", "theme": "scifi"}"#;
        assert!(matches!(parse_briefing(text), Err(BriefingError::Malformed(_))));
    }

    #[test]
    fn test_blank_field_is_incomplete() {
        let text = GOOD.replace("Viper", "  ");
        assert!(matches!(
            parse_briefing(&text),
            Err(BriefingError::Incomplete("pilotCallsign"))
        ));
    }

    #[test]
    fn test_extract_candidate_text() {
        let response = serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": GOOD }] } }]
        })
        .to_string();
        let text = extract_text(&response).unwrap();
        assert_eq!(parse_briefing(&text).unwrap().theme, Theme::Retro);
    }

    #[test]
    fn test_extract_without_candidates() {
        assert!(matches!(extract_text("{}"), Err(BriefingError::EmptyResponse)));
        let blank = r#"{"candidates":[{"content":{"parts":[{"text":""}]}}]}"#;
        assert!(matches!(extract_text(blank), Err(BriefingError::EmptyResponse)));
        assert!(matches!(extract_text("not json"), Err(BriefingError::Malformed(_))));
    }

    #[test]
    fn test_resolve_falls_back_on_any_error() {
        let fallback = MissionBriefing::fallback();
        assert_eq!(resolve(Err(BriefingError::MissingCredential)), fallback);
        assert_eq!(resolve(Err(BriefingError::Network("timeout".into()))), fallback);
        assert_eq!(resolve(Err(BriefingError::EmptyResponse)), fallback);

        let good = parse_briefing(GOOD).unwrap();
        assert_eq!(resolve(Ok(good.clone())), good);
    }

    #[test]
    fn test_fallback_text() {
        let b = MissionBriefing::default();
        assert_eq!(b.name, "Operation: Dark Star");
        assert_eq!(b.objective, "Intercept unknown bogies approaching our airspace.");
        assert_eq!(b.pilot_callsign, "Raven");
        assert_eq!(b.theme, Theme::Scifi);
    }

    #[test]
    fn test_request_body_schema() {
        let body = request_body();
        let schema = &body["generationConfig"]["responseSchema"];
        assert_eq!(schema["required"].as_array().unwrap().len(), 4);
        assert_eq!(schema["properties"]["theme"]["enum"][2], "retro");
        assert!(request_url("abc").ends_with(":generateContent?key=abc"));
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(MissionBriefing::fallback()).unwrap();
        assert_eq!(json["pilotCallsign"], "Raven");
        assert_eq!(json["theme"], "scifi");
        for theme in [Theme::Scifi, Theme::Modern, Theme::Retro] {
            assert_eq!(serde_json::to_value(theme).unwrap(), theme.as_str());
        }
    }
}
