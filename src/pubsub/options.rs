use serde_json::Value;

/// Upper bound on messages returned by one pull
pub const MAX_MESSAGES: u32 = 100_000;
pub const DEFAULT_ACK_DEADLINE_SECONDS: u32 = 10;

#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub project_id: Option<String>,
    pub page_size: Option<u32>,
    pub page_token: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SubscriptionOptions {
    pub project_id: Option<String>,
    /// Push endpoint configuration; pull delivery when absent
    pub push_config: Option<Value>,
    pub ack_deadline_seconds: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct PullOptions {
    pub project_id: Option<String>,
    /// Defaults to `true`
    pub return_immediately: Option<bool>,
    pub max_messages: Option<u32>,
}
