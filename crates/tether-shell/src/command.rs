/// Lifecycle notification posted by the OS event thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    InitWindow,
    TermWindow,
    WindowResized,
    WindowRedrawNeeded,
    ContentRectChanged,
    GainedFocus,
    LostFocus,
    LowMemory,
    Start,
    Resume,
    SaveState,
    Pause,
    Stop,
    Destroy,
}

impl Command {
    pub const ALL: [Command; 14] = [
        Command::InitWindow,
        Command::TermWindow,
        Command::WindowResized,
        Command::WindowRedrawNeeded,
        Command::ContentRectChanged,
        Command::GainedFocus,
        Command::LostFocus,
        Command::LowMemory,
        Command::Start,
        Command::Resume,
        Command::SaveState,
        Command::Pause,
        Command::Stop,
        Command::Destroy,
    ];

    /// Wire code used by the native activity glue.
    pub const fn code(self) -> i32 {
        match self {
            Command::InitWindow => 1,
            Command::TermWindow => 2,
            Command::WindowResized => 3,
            Command::WindowRedrawNeeded => 4,
            Command::ContentRectChanged => 5,
            Command::GainedFocus => 6,
            Command::LostFocus => 7,
            Command::LowMemory => 9,
            Command::Start => 10,
            Command::Resume => 11,
            Command::SaveState => 12,
            Command::Pause => 13,
            Command::Stop => 14,
            Command::Destroy => 15,
        }
    }

    /// Decodes a wire code. Codes the shell does not act on (input queue and
    /// configuration changes) decode to `None` along with unknown values.
    pub fn from_code(code: i32) -> Option<Command> {
        Self::ALL.into_iter().find(|command| command.code() == code)
    }
}
