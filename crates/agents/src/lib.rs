use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use chrono::Utc;
use parking_lot::Mutex;
use rand::RngExt;
use safenest_core::{
    classify, dashboard_view, restrictions_for_age, select_reply, validate_login,
    validate_registration, Account, ChatExchange, ChatInput, ChatMessage, CompanionSession,
    DashboardView, IndexSource, LoginForm, RegistrationForm, RestrictionsView, SentimentLabel,
    SessionHandle, ToggleKind, DEMO_LOGIN_AGE, GREETING,
};
use safenest_observability::AppMetrics;
use safenest_storage::{AccountRepository, SessionRepository};
use thiserror::Error;
use tracing::{info, instrument};
use uuid::Uuid;

pub const DEFAULT_TYPING_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug, Error)]
#[error("unknown session: {0}")]
pub struct SessionNotFound(pub String);

/// Draws reply indices from the thread-local rng.
pub struct RandomIndexSource;

impl IndexSource for RandomIndexSource {
    fn next_index(&mut self, bound: usize) -> usize {
        rand::rng().random_range(0..bound)
    }
}

#[derive(Clone)]
pub struct CompanionAgent<S>
where
    S: SessionRepository + AccountRepository,
{
    store: Arc<S>,
    metrics: Arc<AppMetrics>,
    typing_delay: Duration,
    replies: Arc<Mutex<Box<dyn IndexSource + Send>>>,
}

impl<S> CompanionAgent<S>
where
    S: SessionRepository + AccountRepository,
{
    pub fn new(store: Arc<S>, metrics: Arc<AppMetrics>) -> Self {
        Self::with_reply_source(
            store,
            metrics,
            DEFAULT_TYPING_DELAY,
            Box::new(RandomIndexSource),
        )
    }

    pub fn with_typing_delay(
        store: Arc<S>,
        metrics: Arc<AppMetrics>,
        typing_delay: Duration,
    ) -> Self {
        Self::with_reply_source(store, metrics, typing_delay, Box::new(RandomIndexSource))
    }

    pub fn with_reply_source(
        store: Arc<S>,
        metrics: Arc<AppMetrics>,
        typing_delay: Duration,
        replies: Box<dyn IndexSource + Send>,
    ) -> Self {
        Self {
            store,
            metrics,
            typing_delay,
            replies: Arc::new(Mutex::new(replies)),
        }
    }

    pub fn typing_delay(&self) -> Duration {
        self.typing_delay
    }

    #[instrument(skip(self, form))]
    pub async fn register(&self, form: RegistrationForm) -> Result<SessionHandle> {
        let today = Utc::now().date_naive();
        let age = match validate_registration(&form, today) {
            Ok(age) => age,
            Err(error) => {
                self.metrics.inc_validation_failure();
                return Err(error.into());
            }
        };

        let name = form.name.trim().to_string();
        self.store
            .upsert_account(&Account {
                name: name.clone(),
                password: form.password,
                age,
                created_at: Utc::now(),
            })
            .await?;

        let handle = self.open_session(name, age).await?;
        info!(session_id = %handle.session_id, age, "registration completed");
        Ok(handle)
    }

    /// Mock login: any non-empty credentials open a session. A registered
    /// account supplies its age, anything else gets the demo profile.
    #[instrument(skip(self, form))]
    pub async fn login(&self, form: LoginForm) -> Result<SessionHandle> {
        if let Err(error) = validate_login(&form) {
            self.metrics.inc_validation_failure();
            return Err(error.into());
        }

        let name = form.name.trim().to_string();
        let age = self
            .store
            .find_account(&name)
            .await?
            .map(|account| account.age)
            .unwrap_or(DEMO_LOGIN_AGE);

        let handle = self.open_session(name, age).await?;
        info!(session_id = %handle.session_id, age, "login completed");
        Ok(handle)
    }

    pub async fn open_session(&self, display_name: String, age: u8) -> Result<SessionHandle> {
        let greeting = assistant_message(GREETING.to_string());

        let session = CompanionSession {
            session_id: Uuid::new_v4().to_string(),
            display_name,
            age,
            started_at: Utc::now(),
            messages: vec![greeting.clone()],
            web_protection: true,
            app_protection: true,
        };
        self.store.upsert_session(&session).await?;
        self.metrics.inc_session();

        Ok(SessionHandle {
            session_id: session.session_id,
            display_name: session.display_name,
            age,
            greeting,
        })
    }

    #[instrument(skip(self))]
    pub async fn logout(&self, session_id: &str) -> Result<bool> {
        let removed = self.store.remove_session(session_id).await?;
        if removed {
            info!(session_id, "session closed");
        }
        Ok(removed)
    }

    #[instrument(skip(self, input))]
    pub async fn handle_message(&self, input: ChatInput) -> Result<ChatExchange> {
        let started = Instant::now();
        let text = input.text.trim();
        if text.is_empty() {
            bail!("chat text must not be empty");
        }

        let mut session = self
            .store
            .load_session(&input.session_id)
            .await?
            .ok_or_else(|| SessionNotFound(input.session_id.clone()))?;

        let sentiment = classify(text);
        let user_message = ChatMessage {
            id: Uuid::new_v4().to_string(),
            text: text.to_string(),
            from_user: true,
            created_at: Utc::now(),
            sentiment: Some(sentiment),
        };
        session.messages.push(user_message.clone());
        self.store.upsert_session(&session).await?;
        self.metrics.inc_message();

        tokio::time::sleep(self.typing_delay).await;

        // The session may have been closed while the reply was "typing";
        // deliver nothing in that case.
        let Some(mut session) = self.store.load_session(&input.session_id).await? else {
            self.metrics.inc_suppressed_reply();
            info!(session_id = %input.session_id, "reply suppressed, session closed");
            return Ok(ChatExchange {
                session_id: input.session_id,
                user_message,
                reply: None,
            });
        };

        let reply_text = {
            let mut replies = self.replies.lock();
            select_reply(sentiment, replies.as_mut())
        };
        let reply = assistant_message(reply_text.to_string());
        session.messages.push(reply.clone());
        self.store.upsert_session(&session).await?;

        self.metrics.inc_reply();
        self.metrics.observe_turn_latency(started.elapsed());
        info!(
            session_id = %session.session_id,
            sentiment = sentiment.as_code(),
            "chat turn handled"
        );

        Ok(ChatExchange {
            session_id: input.session_id,
            user_message,
            reply: Some(reply),
        })
    }

    pub async fn transcript(&self, session_id: &str) -> Result<Vec<ChatMessage>> {
        Ok(self.require_session(session_id).await?.messages)
    }

    pub async fn restrictions(&self, session_id: &str) -> Result<RestrictionsView> {
        let session = self.require_session(session_id).await?;
        Ok(restrictions_for_age(session.age))
    }

    pub async fn dashboard(&self, session_id: &str) -> Result<DashboardView> {
        let session = self.require_session(session_id).await?;
        Ok(dashboard_view(&session))
    }

    pub async fn set_toggle(
        &self,
        session_id: &str,
        toggle: ToggleKind,
        enabled: bool,
    ) -> Result<DashboardView> {
        let mut session = self.require_session(session_id).await?;
        match toggle {
            ToggleKind::WebProtection => session.web_protection = enabled,
            ToggleKind::AppProtection => session.app_protection = enabled,
        }
        self.store.upsert_session(&session).await?;
        Ok(dashboard_view(&session))
    }

    async fn require_session(&self, session_id: &str) -> Result<CompanionSession> {
        self.store
            .load_session(session_id)
            .await?
            .ok_or_else(|| SessionNotFound(session_id.to_string()).into())
    }
}

// Assistant messages always carry a positive label, matching the product's
// companion persona.
fn assistant_message(text: String) -> ChatMessage {
    ChatMessage {
        id: Uuid::new_v4().to_string(),
        text,
        from_user: false,
        created_at: Utc::now(),
        sentiment: Some(SentimentLabel::Positive),
    }
}
