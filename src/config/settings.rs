// Configuration structs

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// Gemini API key; when absent, chat replies degrade to canned responses
    pub gemini_api_key: Option<String>,

    /// Gemini model name
    pub gemini_model: Option<String>,

    /// Google Natural Language API key; when absent, sentiment falls back to
    /// the lexicon scorer
    pub sentiment_api_key: Option<String>,

    /// Google Speech-to-Text API key; when absent, /voice/transcribe returns
    /// an upstream error
    pub speech_api_key: Option<String>,

    /// Optional override for the crisis keyword tables
    pub crisis_keywords_path: Option<PathBuf>,

    /// Directory for the sled-backed crisis-alert database
    pub alert_db_path: PathBuf,
}

impl Config {
    pub fn new() -> Self {
        let data_dir = dirs::home_dir()
            .map(|home| home.join(".solace"))
            .unwrap_or_else(|| PathBuf::from(".solace"));

        Self {
            gemini_api_key: None,
            gemini_model: None,
            sentiment_api_key: None,
            speech_api_key: None,
            crisis_keywords_path: None,
            alert_db_path: data_dir.join("alerts"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
