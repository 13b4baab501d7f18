use super::state::Screen;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    NextScreen,
    PrevScreen,
    SetScreen(Screen),

    SidebarUp,
    SidebarDown,
    ListUp,
    ListDown,
    GoTop,
    GoBottom,
    Resize,

    // Player
    TogglePause,
    VolumeUp,
    VolumeDown,
    SeekBy(f64),
    SeekTo(f64),
    SeekFraction(f64),
    RateUp,
    RateDown,
    CycleViewMode,
    ToggleTranslations,
    PrevSegment,
    NextSegment,

    // Library
    OpenSelected,
    RefreshLibrary,
    AddSong,
    EditSelected,
    DownloadSelected,
    SearchLyricsSelected,
    VerifySelected,
    ProcessSelected,
    RemoveSelected,

    // Prompt line
    PromptChar(char),
    PromptBackspace,
    PromptSubmit,
    PromptCancel,
}
