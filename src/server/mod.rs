// Solace - HTTP server module
// Wires the session, conversation, crisis, and journal components behind an
// axum router

mod handlers;
mod journal_handlers;
mod middleware;

pub use handlers::{create_router, health_check, metrics_endpoint};
pub use middleware::{session_middleware, SESSION_HEADER};

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tower_http::trace::TraceLayer;

use crate::chat::ConversationStore;
use crate::classifier::SentimentScore;
use crate::config::Config;
use crate::crisis::{
    generate_crisis_response, safety_fallback_response, AlertStore, CrisisAlert, CrisisDetector,
    CrisisResponse, RiskAnalysis, SledAlertStore, PATTERN_WINDOW,
};
use crate::journal::JournalStore;
use crate::metrics::Metrics;
use crate::providers::{
    CannedReplies, GeminiProvider, GoogleSentimentProvider, GoogleSpeechProvider,
    LanguageProvider, SentimentProvider, TranscriptionProvider,
};
use crate::session::SessionManager;

/// Configuration for the HTTP server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:8090")
    pub bind_address: String,
    /// Upper bound on any single upstream provider call
    pub provider_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8090".to_string(),
            provider_timeout_secs: 30,
        }
    }
}

/// Main application server
pub struct AppServer {
    sessions: SessionManager,
    conversations: ConversationStore,
    journal: JournalStore,
    detector: CrisisDetector,
    alerts: Box<dyn AlertStore>,
    language: Option<Arc<dyn LanguageProvider>>,
    sentiment: Option<Arc<dyn SentimentProvider>>,
    transcription: Option<Arc<dyn TranscriptionProvider>>,
    canned: CannedReplies,
    metrics: Metrics,
    config: ServerConfig,
}

impl AppServer {
    /// Assemble a server from explicit components. Stores and providers are
    /// injected so tests can run with in-memory backings and no network.
    pub fn new(
        server_config: ServerConfig,
        detector: CrisisDetector,
        alerts: Box<dyn AlertStore>,
        language: Option<Arc<dyn LanguageProvider>>,
        sentiment: Option<Arc<dyn SentimentProvider>>,
        transcription: Option<Arc<dyn TranscriptionProvider>>,
        canned: CannedReplies,
    ) -> Result<Self> {
        Ok(Self {
            sessions: SessionManager::new(),
            conversations: ConversationStore::new(),
            journal: JournalStore::new(),
            detector,
            alerts,
            language,
            sentiment,
            transcription,
            canned,
            metrics: Metrics::new()?,
            config: server_config,
        })
    }

    /// Build the production wiring from loaded configuration: sled-backed
    /// alert store, keyword tables from disk when configured, and whichever
    /// providers have keys.
    pub fn from_config(config: Config, server_config: ServerConfig) -> Result<Self> {
        let detector = match &config.crisis_keywords_path {
            Some(path) => CrisisDetector::load_from_file(path)?,
            None => CrisisDetector::default(),
        };

        let alerts: Box<dyn AlertStore> = Box::new(SledAlertStore::open(&config.alert_db_path)?);

        let language: Option<Arc<dyn LanguageProvider>> = match &config.gemini_api_key {
            Some(key) => {
                let mut provider = GeminiProvider::new(key.clone())?;
                if let Some(model) = &config.gemini_model {
                    provider = provider.with_model(model.clone());
                }
                Some(Arc::new(provider))
            }
            None => None,
        };

        let sentiment: Option<Arc<dyn SentimentProvider>> = match &config.sentiment_api_key {
            Some(key) => Some(Arc::new(GoogleSentimentProvider::new(key.clone())?)),
            None => None,
        };

        let transcription: Option<Arc<dyn TranscriptionProvider>> = match &config.speech_api_key {
            Some(key) => Some(Arc::new(GoogleSpeechProvider::new(key.clone())?)),
            None => None,
        };

        Self::new(
            server_config,
            detector,
            alerts,
            language,
            sentiment,
            transcription,
            CannedReplies::new(),
        )
    }

    /// Start the HTTP server
    pub async fn serve(self) -> Result<()> {
        let addr: SocketAddr = self.config.bind_address.parse()?;

        let app_state = Arc::new(self);
        let app = create_router(app_state).layer(TraceLayer::new_for_http());

        tracing::info!("Starting Solace server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn conversations(&self) -> &ConversationStore {
        &self.conversations
    }

    pub fn journal(&self) -> &JournalStore {
        &self.journal
    }

    pub fn alerts(&self) -> &dyn AlertStore {
        self.alerts.as_ref()
    }

    pub fn transcription(&self) -> Option<&Arc<dyn TranscriptionProvider>> {
        self.transcription.as_ref()
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.config.provider_timeout_secs)
    }

    /// Score a message with the external sentiment provider. Any failure or
    /// timeout degrades to None so the caller falls back to the lexicon.
    pub(crate) async fn fetch_sentiment(&self, text: &str) -> Option<SentimentScore> {
        let provider = self.sentiment.as_ref()?;

        match timeout(self.provider_timeout(), provider.analyze_sentiment(text)).await {
            Ok(Ok(score)) => Some(score),
            Ok(Err(error)) => {
                tracing::warn!(error = %error, "Sentiment provider failed, using lexicon");
                self.metrics
                    .provider_failures_total
                    .with_label_values(&[provider.name()])
                    .inc();
                None
            }
            Err(_) => {
                tracing::warn!("Sentiment provider timed out, using lexicon");
                self.metrics
                    .provider_failures_total
                    .with_label_values(&[provider.name()])
                    .inc();
                None
            }
        }
    }

    /// Generate the companion's next turn for a session. Provider errors and
    /// timeouts degrade to a canned supportive reply; this path never fails.
    pub(crate) async fn companion_reply(&self, session_id: &str) -> String {
        // Transcript is cloned out of the store; no map guard is held while
        // the provider call is in flight
        let history = self
            .conversations
            .history(session_id)
            .map(|snapshot| snapshot.messages)
            .unwrap_or_default();

        if let Some(provider) = self.language.as_ref() {
            match timeout(self.provider_timeout(), provider.generate_reply(&history)).await {
                Ok(Ok(text)) => return text,
                Ok(Err(error)) => {
                    tracing::warn!(error = %error, "Language provider failed, using canned reply");
                    self.metrics
                        .provider_failures_total
                        .with_label_values(&[provider.name()])
                        .inc();
                }
                Err(_) => {
                    tracing::warn!("Language provider timed out, using canned reply");
                    self.metrics
                        .provider_failures_total
                        .with_label_values(&[provider.name()])
                        .inc();
                }
            }
        }

        self.canned.pick().to_string()
    }

    /// Run the full crisis pipeline for a message: weighted analysis against
    /// the recent history, tiered response selection, and durable alert
    /// persistence for any level above Low.
    ///
    /// The risk path never fails silently: if alert persistence errors, the
    /// caller still receives the fixed safety payload with helpline contacts.
    pub(crate) fn run_crisis_pipeline(
        &self,
        session_id: &str,
        text: &str,
        history: Vec<String>,
        sentiment: Option<SentimentScore>,
    ) -> (RiskAnalysis, CrisisResponse, bool) {
        let analysis = self.detector.analyze(text, &history, sentiment);
        let response = generate_crisis_response(&analysis);

        if !analysis.level.is_elevated() {
            return (analysis, response, false);
        }

        let alert = CrisisAlert::from_analysis(session_id, text, &analysis, history);
        match self.alerts.put(&alert) {
            Ok(()) => {
                self.metrics
                    .crisis_alerts_total
                    .with_label_values(&[analysis.level.as_str()])
                    .inc();
                (analysis, response, true)
            }
            Err(error) => {
                tracing::error!(error = %error, "Failed to persist crisis alert");
                (analysis, safety_fallback_response(), false)
            }
        }
    }

    /// Recent user messages used as the pattern window for crisis analysis
    pub(crate) fn pattern_history(&self, session_id: &str) -> Vec<String> {
        self.conversations
            .recent_user_texts(session_id, PATTERN_WINDOW)
    }
}
