use crate::chat::TurnReply;

/// Internal events produced by the chat itself
#[derive(Debug)]
pub enum ChatUpdate {
    /// A dispatched turn finished
    Reply(TurnReply),
    /// The typing timer fired
    Tick,
}

/// Everything the main loop reacts to
#[derive(Debug)]
pub enum AppEvent {
    /// Key press, resize, paste, ...
    Terminal(crossterm::event::Event),
    Chat(ChatUpdate),
    /// The terminal event stream ended or failed
    InputClosed,
}
