//! Events that drive the attention cycle

/// Inputs to the attention transition function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttentionEvent {
    /// The widget was expanded.
    WidgetOpened,
    /// The widget was collapsed.
    WidgetClosed,
    /// The user touched the toggle control without necessarily changing
    /// the open state; `widget_open` is the state after the interaction.
    Interacted { widget_open: bool },
    /// The armed timer for the current phase ran out.
    TimerElapsed,
}
