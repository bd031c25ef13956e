/// Side effect requested by the dispatcher.
///
/// The dispatcher never touches the socket; the connection loop applies
/// effects in order after each inbound line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotEffect {
    /// Send a message to a channel.
    Say { channel: String, text: String },

    /// Whisper a user.
    Whisper { user: String, text: String },

    /// Stop the connection loop after the current iteration.
    Terminate,
}

impl BotEffect {
    pub fn say(channel: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Say {
            channel: channel.into(),
            text: text.into(),
        }
    }
}
