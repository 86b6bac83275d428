use serde::{Deserialize, Serialize};

/// Per-request identity and options threaded through every stage
///
/// Built once when a request enters the system and never mutated afterwards.
/// Tool execution receives the app, user, and channel from here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// Application the conversation belongs to
    pub app_id: String,
    /// End user on the realtime front-end
    pub user_id: String,
    /// Realtime channel the user is connected to
    pub channel: String,
    /// Model requested for this completion
    pub model: String,
    /// Whether the caller asked for a streamed response
    pub stream: bool,
}

impl RequestContext {
    /// Create a context for a non-streaming request
    pub fn new(
        app_id: impl Into<String>,
        user_id: impl Into<String>,
        channel: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            app_id: app_id.into(),
            user_id: user_id.into(),
            channel: channel.into(),
            model: model.into(),
            stream: false,
        }
    }

    /// Same context with streaming toggled
    #[must_use]
    pub const fn streaming(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }
}
