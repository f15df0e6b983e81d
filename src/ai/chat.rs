use super::CompletionService;
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender as ReplySender};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const WELCOME_MESSAGE: &str = "Welcome to Padboard! 🎉 I'm ready to help! Try asking me:\n\n\
• \"Analyze my notes\" - I'll review your content\n\
• \"Generate study questions\" - Create practice questions\n\
• \"Summarize my notes\" - Get key points\n\
• Or ask me anything else!";

/// Text shown in place of a reply that has not arrived yet.
pub const PENDING_TEXT: &str = "Thinking...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    Pending,
    Text(String),
}

impl MessageBody {
    pub fn text(&self) -> &str {
        match self {
            MessageBody::Pending => PENDING_TEXT,
            MessageBody::Text(t) => t,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: u64,
    pub sender: Sender,
    pub body: MessageBody,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatCommand {
    AnalyzeNotes,
    StudyQuestions,
    Summarize,
    Chat,
}

impl ChatCommand {
    /// Classify a message by case-insensitive substring match.
    pub fn detect(message: &str) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("analyze notes") || lower.contains("analyze my notes") {
            ChatCommand::AnalyzeNotes
        } else if lower.contains("study questions") || lower.contains("generate questions") {
            ChatCommand::StudyQuestions
        } else if lower.contains("summarize") || lower.contains("summary") {
            ChatCommand::Summarize
        } else {
            ChatCommand::Chat
        }
    }

    fn instruction(self) -> Option<&'static str> {
        match self {
            ChatCommand::AnalyzeNotes => Some(
                "Please analyze these notes and provide insights, key themes, and suggestions for improvement:",
            ),
            ChatCommand::StudyQuestions => Some(
                "Based on these notes, generate 5-8 study questions that would help someone review and understand the material better. Include a mix of recall, comprehension, and application questions:",
            ),
            ChatCommand::Summarize => Some(
                "Please provide a concise summary of these notes, highlighting the main points and key takeaways:",
            ),
            ChatCommand::Chat => None,
        }
    }

    fn heading(self) -> Option<&'static str> {
        match self {
            ChatCommand::AnalyzeNotes => Some("📊 **Notes Analysis:**\n\n"),
            ChatCommand::StudyQuestions => Some("📚 **Study Questions:**\n\n"),
            ChatCommand::Summarize => Some("📝 **Notes Summary:**\n\n"),
            ChatCommand::Chat => None,
        }
    }

    fn empty_notes_reply(self) -> Option<&'static str> {
        match self {
            ChatCommand::AnalyzeNotes => {
                Some("I don't see any notes to analyze. Please write some notes first!")
            }
            ChatCommand::StudyQuestions => Some(
                "I need some notes to generate study questions from. Please write some notes first!",
            ),
            ChatCommand::Summarize => {
                Some("I don't see any notes to summarize. Please write some notes first!")
            }
            ChatCommand::Chat => None,
        }
    }
}

/// What to do with an outgoing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prepared {
    /// Answer immediately without contacting the service.
    Local(String),
    Remote {
        prompt: String,
        heading: Option<&'static str>,
    },
}

/// Turn a user message into a request. `notes` is the plain text of the
/// notebook, used by the note commands.
pub fn prepare(message: &str, notes: &str) -> Prepared {
    let command = ChatCommand::detect(message);
    match command.instruction() {
        None => Prepared::Remote {
            prompt: message.to_string(),
            heading: None,
        },
        Some(instruction) => {
            let notes = notes.trim();
            if notes.is_empty() {
                let reply = command.empty_notes_reply().unwrap_or_default();
                return Prepared::Local(reply.to_string());
            }
            Prepared::Remote {
                prompt: format!("{instruction}\n\n{notes}"),
                heading: command.heading(),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    EmptyMessage,
}

impl std::fmt::Display for ChatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatError::EmptyMessage => write!(f, "message is empty"),
        }
    }
}

impl std::error::Error for ChatError {}

struct Completed {
    id: u64,
    text: String,
}

/// Chat transcript plus the plumbing that fills in replies from worker
/// threads. Replies are delivered through `poll`, which the UI calls
/// every frame.
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    next_id: u64,
    service: Arc<dyn CompletionService>,
    tx: ReplySender<Completed>,
    rx: Receiver<Completed>,
}

impl ChatSession {
    pub fn new(service: Arc<dyn CompletionService>) -> Self {
        let (tx, rx) = channel();
        let mut session = Self {
            messages: Vec::new(),
            next_id: 0,
            service,
            tx,
            rx,
        };
        session.push(Sender::Assistant, MessageBody::Text(WELCOME_MESSAGE.into()));
        session
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn pending_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.body == MessageBody::Pending)
            .count()
    }

    fn push(&mut self, sender: Sender, body: MessageBody) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.messages.push(ChatMessage { id, sender, body });
        id
    }

    /// Append the user's message and start answering it. Returns the id of
    /// the assistant entry that will hold the reply.
    pub fn send(&mut self, message: &str, notes: &str) -> Result<u64, ChatError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        self.push(Sender::User, MessageBody::Text(message.to_string()));

        match prepare(message, notes) {
            Prepared::Local(reply) => Ok(self.push(Sender::Assistant, MessageBody::Text(reply))),
            Prepared::Remote { prompt, heading } => {
                let id = self.push(Sender::Assistant, MessageBody::Pending);
                let service = Arc::clone(&self.service);
                let tx = self.tx.clone();
                std::thread::spawn(move || {
                    let text = match service.complete(&prompt) {
                        Ok(reply) => format!("{}{}", heading.unwrap_or_default(), reply),
                        Err(e) => {
                            tracing::error!("AI request failed: {e}");
                            e.bucket().message().to_string()
                        }
                    };
                    let _ = tx.send(Completed { id, text });
                });
                tracing::debug!(id, "AI request dispatched");
                Ok(id)
            }
        }
    }

    /// Apply any replies that have arrived. Returns how many were applied.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(done) = self.rx.try_recv() {
            if self.resolve(done) {
                applied += 1;
            }
        }
        applied
    }

    /// Block until every pending reply has arrived or `timeout` elapses.
    /// Returns `true` when nothing is left pending.
    pub fn wait_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.pending_count() > 0 {
            let left = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(left) {
                Ok(done) => {
                    self.resolve(done);
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    return false;
                }
            }
        }
        true
    }

    fn resolve(&mut self, done: Completed) -> bool {
        match self
            .messages
            .iter_mut()
            .find(|m| m.id == done.id && m.body == MessageBody::Pending)
        {
            Some(msg) => {
                msg.body = MessageBody::Text(done.text);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::AiError;
    use std::sync::Mutex;

    struct Echo {
        prompts: Mutex<Vec<String>>,
    }

    impl CompletionService for Echo {
        fn complete(&self, prompt: &str) -> Result<String, AiError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok("reply".into())
        }
    }

    struct Failing(u16);

    impl CompletionService for Failing {
        fn complete(&self, _prompt: &str) -> Result<String, AiError> {
            Err(AiError::Status(self.0))
        }
    }

    fn echo() -> Arc<Echo> {
        Arc::new(Echo {
            prompts: Mutex::new(Vec::new()),
        })
    }

    #[test]
    fn commands_are_detected_case_insensitively() {
        assert_eq!(ChatCommand::detect("Please ANALYZE my notes"), ChatCommand::AnalyzeNotes);
        assert_eq!(ChatCommand::detect("generate questions"), ChatCommand::StudyQuestions);
        assert_eq!(ChatCommand::detect("Give me a Summary"), ChatCommand::Summarize);
        assert_eq!(ChatCommand::detect("what is rust"), ChatCommand::Chat);
    }

    #[test]
    fn note_commands_without_notes_answer_locally() {
        assert_eq!(
            prepare("summarize", "   "),
            Prepared::Local(
                "I don't see any notes to summarize. Please write some notes first!".into()
            )
        );
    }

    #[test]
    fn session_starts_with_welcome() {
        let session = ChatSession::new(echo());
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].body.text(), WELCOME_MESSAGE);
    }

    #[test]
    fn empty_message_is_rejected() {
        let mut session = ChatSession::new(echo());
        assert_eq!(session.send("  ", ""), Err(ChatError::EmptyMessage));
        assert_eq!(session.messages().len(), 1);
    }

    #[test]
    fn reply_replaces_placeholder_with_heading() {
        let service = echo();
        let mut session = ChatSession::new(service.clone());
        let id = session.send("Analyze my notes", "Page 1: cells\n\n").unwrap();
        assert!(session.wait_idle(Duration::from_secs(5)));

        let reply = session.messages().iter().find(|m| m.id == id).unwrap();
        assert_eq!(reply.body.text(), "📊 **Notes Analysis:**\n\nreply");
        let prompts = service.prompts.lock().unwrap();
        assert!(prompts[0].starts_with("Please analyze these notes"));
        assert!(prompts[0].ends_with("Page 1: cells"));
    }

    #[test]
    fn failures_become_canned_messages() {
        let mut session = ChatSession::new(Arc::new(Failing(400)));
        let id = session.send("hello", "").unwrap();
        assert_eq!(session.pending_count(), 1);
        assert!(session.wait_idle(Duration::from_secs(5)));
        let reply = session.messages().iter().find(|m| m.id == id).unwrap();
        assert_eq!(
            reply.body.text(),
            "There was an issue with the request format. Please try rephrasing your question."
        );
    }
}
