use logwire_types::FilterCategory;

/// All possible actions in the application (command pattern)
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Quit,

    // Unlock prompt
    CredentialInput(char),
    CredentialBackspace,
    SubmitCredential,
    ToggleRemember,
    DismissNotice,

    // Category tabs
    SelectCategory(FilterCategory),
    NextCategory,
    PrevCategory,

    // Scrolling (row 0 is the newest event)
    ScrollUp(usize),
    ScrollDown(usize),
    ScrollToTop,
    ScrollToBottom,
    PageUp,
    PageDown,

    // Text search in the log viewer
    OpenSearch,
    CloseSearch,
    SearchInput(char),
    SearchBackspace,
    SearchClear,
    ApplyFilter,
    ClearFilter,
    ToggleCaseSensitive,

    // UI toggles
    ToggleStats,
    ToggleHelp,

    ExportLogs,
    Logout,

    DismissMessage,

    Render,
}
