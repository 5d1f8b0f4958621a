//! Shared fixtures: a scripted in-memory channel and a manual clock

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use parking_lot::Mutex;

use copilot_agent_mcp::error::{AgentError, Result};
use copilot_agent_mcp::transport::ChannelTransport;
use copilot_agent_mcp::types::{
    Activity, ActivityId, ActivitySet, AgentCatalog, AgentDefinition, AgentSecret, ChannelAccount,
    ConversationId, ConversationStart, Watermark,
};
use copilot_agent_mcp::{Clock, SessionManager, TurnOptions};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ============================================================================
// CLOCK
// ============================================================================

/// Clock that only moves when something sleeps on it
#[derive(Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap())),
        }
    }

    pub fn advance(&self, duration: Duration) {
        *self.now.lock() += TimeDelta::from_std(duration).unwrap();
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }

    async fn sleep(&self, duration: Duration) {
        self.advance(duration);
        tokio::task::yield_now().await;
    }
}

// ============================================================================
// SCRIPTED CHANNEL
// ============================================================================

/// How the scripted agent answers a posted message
#[derive(Debug, Clone)]
pub enum Script {
    /// One bot message: `re: <query>`
    Echo,
    /// Only a typing indicator, never a message
    Silent,
    /// A `DynamicPlanFinished` event without any message
    PlanFinished,
    /// Several bot messages in the same window
    Parts(Vec<String>),
}

struct Scheduled {
    activity: Activity,
    visible_from_poll: u32,
}

struct Conversation {
    activities: Vec<Scheduled>,
    polls: u32,
    next_id: u32,
    rewind_next_poll: bool,
    last_echo: Option<ActivityId>,
}

impl Conversation {
    fn new() -> Self {
        Self {
            activities: Vec::new(),
            polls: 0,
            next_id: 0,
            rewind_next_poll: false,
            last_echo: None,
        }
    }

    fn next_activity_id(&mut self, conversation_id: &str) -> ActivityId {
        self.next_id += 1;
        ActivityId::from(format!("{conversation_id}|{:07}", self.next_id))
    }
}

#[derive(Default)]
struct State {
    next_conversation: u32,
    conversations: HashMap<String, Conversation>,
    script: Option<Script>,
    reply_after_polls: u32,
    late_reply: Option<String>,
    post_failures: VecDeque<AgentError>,
    poll_failures: VecDeque<AgentError>,
    start_calls: usize,
    post_calls: usize,
    poll_calls: usize,
    requested_watermarks: Vec<(String, Option<String>)>,
    posted: Vec<(String, String)>,
}

/// In-memory channel mimicking Direct Line conversation semantics
///
/// Watermarks are the count of visible activities. Replies become visible
/// `reply_after_polls` polls after the post.
#[derive(Clone)]
pub struct ScriptedChannel {
    clock: ManualClock,
    state: Arc<Mutex<State>>,
}

impl ScriptedChannel {
    pub fn new(clock: ManualClock) -> Self {
        let state = State {
            script: Some(Script::Echo),
            reply_after_polls: 1,
            ..State::default()
        };
        Self {
            clock,
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn set_script(&self, script: Script) {
        self.state.lock().script = Some(script);
    }

    pub fn set_reply_after_polls(&self, polls: u32) {
        self.state.lock().reply_after_polls = polls.max(1);
    }

    /// On the next post, answer the previous message first, with `text`
    pub fn answer_previous_on_next_post(&self, text: &str) {
        self.state.lock().late_reply = Some(text.to_string());
    }

    pub fn fail_next_post(&self, error: AgentError) {
        self.state.lock().post_failures.push_back(error);
    }

    pub fn fail_next_poll(&self, error: AgentError) {
        self.state.lock().poll_failures.push_back(error);
    }

    /// Make the next poll of `conversation_id` replay the whole history with a stale watermark
    pub fn rewind_next_poll(&self, conversation_id: &ConversationId) {
        if let Some(conversation) = self.state.lock().conversations.get_mut(conversation_id.as_str()) {
            conversation.rewind_next_poll = true;
        }
    }

    pub fn start_calls(&self) -> usize {
        self.state.lock().start_calls
    }

    pub fn post_calls(&self) -> usize {
        self.state.lock().post_calls
    }

    pub fn poll_calls(&self) -> usize {
        self.state.lock().poll_calls
    }

    pub fn total_calls(&self) -> usize {
        let state = self.state.lock();
        state.start_calls + state.post_calls + state.poll_calls
    }

    /// Watermarks the client sent for `conversation_id`, in order
    pub fn requested_watermarks(&self, conversation_id: &ConversationId) -> Vec<Option<String>> {
        self.state
            .lock()
            .requested_watermarks
            .iter()
            .filter(|(id, _)| id == conversation_id.as_str())
            .map(|(_, mark)| mark.clone())
            .collect()
    }

    /// Messages posted to `conversation_id`, in order
    pub fn posted(&self, conversation_id: &ConversationId) -> Vec<String> {
        self.state
            .lock()
            .posted
            .iter()
            .filter(|(id, _)| id == conversation_id.as_str())
            .map(|(_, text)| text.clone())
            .collect()
    }
}

fn bot_message(
    id: ActivityId,
    text: &str,
    at: DateTime<Utc>,
    reply_to_id: Option<ActivityId>,
) -> Activity {
    Activity {
        id: Some(id),
        activity_type: "message".to_string(),
        from: ChannelAccount {
            id: "cr_agent".to_string(),
            name: Some("Agent".to_string()),
            role: Some("bot".to_string()),
        },
        text: Some(text.to_string()),
        timestamp: Some(at),
        name: None,
        reply_to_id,
    }
}

impl ChannelTransport for ScriptedChannel {
    async fn start_session(&self, _agent: &AgentDefinition) -> Result<ConversationStart> {
        let mut state = self.state.lock();
        state.start_calls += 1;
        state.next_conversation += 1;

        let conversation_id = format!("conv-{}", state.next_conversation);
        state
            .conversations
            .insert(conversation_id.clone(), Conversation::new());

        Ok(ConversationStart {
            conversation_id: ConversationId::from(conversation_id),
            stream_token: Some(uuid::Uuid::new_v4().to_string()),
            expires_in: Some(3600),
            stream_url: None,
        })
    }

    async fn post_message(
        &self,
        _agent: &AgentDefinition,
        conversation_id: &ConversationId,
        text: &str,
    ) -> Result<ActivityId> {
        tokio::task::yield_now().await;
        let now = self.clock.now();
        let mut state = self.state.lock();
        state.post_calls += 1;
        if let Some(error) = state.post_failures.pop_front() {
            return Err(error);
        }
        state
            .posted
            .push((conversation_id.to_string(), text.to_string()));

        let script = state.script.clone().unwrap_or(Script::Echo);
        let reply_after = state.reply_after_polls;
        let late_reply = state.late_reply.take();
        let conversation = state
            .conversations
            .get_mut(conversation_id.as_str())
            .ok_or_else(|| AgentError::conversation_expired("HTTP 404 Not Found"))?;

        let echo_id = conversation.next_activity_id(conversation_id.as_str());
        let mut echo = Activity::user_message(text);
        echo.id = Some(echo_id.clone());
        echo.timestamp = Some(now);
        let polls = conversation.polls;
        conversation.activities.push(Scheduled {
            activity: echo,
            visible_from_poll: polls + 1,
        });

        let previous_echo = conversation.last_echo.replace(echo_id.clone());
        if let Some(text) = late_reply {
            let late = bot_message(
                conversation.next_activity_id(conversation_id.as_str()),
                &text,
                now + TimeDelta::milliseconds(100),
                previous_echo,
            );
            conversation.activities.push(Scheduled {
                activity: late,
                visible_from_poll: polls + 1,
            });
        }

        let reply_at = now + TimeDelta::seconds(1);
        let visible_from_poll = polls + reply_after;
        let replies = match script {
            Script::Echo => vec![bot_message(
                conversation.next_activity_id(conversation_id.as_str()),
                &format!("re: {text}"),
                reply_at,
                Some(echo_id.clone()),
            )],
            Script::Silent => {
                let mut typing = bot_message(
                    conversation.next_activity_id(conversation_id.as_str()),
                    "",
                    reply_at,
                    None,
                );
                typing.activity_type = "typing".to_string();
                typing.text = None;
                vec![typing]
            }
            Script::PlanFinished => {
                let mut event = bot_message(
                    conversation.next_activity_id(conversation_id.as_str()),
                    "",
                    reply_at,
                    None,
                );
                event.activity_type = "event".to_string();
                event.text = None;
                event.name = Some("DynamicPlanFinished".to_string());
                vec![event]
            }
            Script::Parts(parts) => parts
                .iter()
                .map(|part| {
                    bot_message(
                        conversation.next_activity_id(conversation_id.as_str()),
                        part,
                        reply_at,
                        Some(echo_id.clone()),
                    )
                })
                .collect(),
        };
        for activity in replies {
            conversation.activities.push(Scheduled {
                activity,
                visible_from_poll,
            });
        }

        Ok(echo_id)
    }

    async fn get_activities(
        &self,
        _agent: &AgentDefinition,
        conversation_id: &ConversationId,
        watermark: Option<&Watermark>,
    ) -> Result<ActivitySet> {
        let mut state = self.state.lock();
        state.poll_calls += 1;
        state.requested_watermarks.push((
            conversation_id.to_string(),
            watermark.map(|w| w.as_str().to_string()),
        ));
        if let Some(error) = state.poll_failures.pop_front() {
            return Err(error);
        }

        let conversation = state
            .conversations
            .get_mut(conversation_id.as_str())
            .ok_or_else(|| AgentError::conversation_expired("HTTP 404 Not Found"))?;
        conversation.polls += 1;

        let visible = conversation
            .activities
            .iter()
            .take_while(|s| s.visible_from_poll <= conversation.polls)
            .count();

        if std::mem::take(&mut conversation.rewind_next_poll) {
            return Ok(ActivitySet {
                activities: conversation.activities[..visible]
                    .iter()
                    .map(|s| s.activity.clone())
                    .collect(),
                watermark: Some(Watermark::from("1")),
            });
        }

        let from = watermark
            .and_then(|w| w.as_str().parse::<usize>().ok())
            .unwrap_or(0)
            .min(visible);

        Ok(ActivitySet {
            activities: conversation.activities[from..visible]
                .iter()
                .map(|s| s.activity.clone())
                .collect(),
            watermark: Some(Watermark::from(visible.to_string())),
        })
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub fn agent(name: &str) -> AgentDefinition {
    AgentDefinition::new(
        name,
        format!("{name} agent"),
        "https://directline.example.com/v3/directline",
        AgentSecret::new(format!("{name}-secret")),
    )
    .unwrap()
}

pub fn catalog() -> Arc<AgentCatalog> {
    Arc::new(AgentCatalog::new(vec![agent("HR Helper"), agent("IT Desk")]).unwrap())
}

pub fn options() -> TurnOptions {
    TurnOptions {
        timeout: Duration::from_secs(5),
        poll_interval: Duration::from_secs(1),
        ..TurnOptions::default()
    }
}

/// Manager over a scripted channel; returns handles to the channel and clock
pub fn manager() -> (
    SessionManager<ScriptedChannel, ManualClock>,
    ScriptedChannel,
    ManualClock,
) {
    init_logging();
    let clock = ManualClock::new();
    let channel = ScriptedChannel::new(clock.clone());
    let manager = SessionManager::with_clock(catalog(), channel.clone(), clock.clone())
        .with_defaults(options());
    (manager, channel, clock)
}
