//! DEC private and ANSI mode bits.
//!
//! Generalizes the teacher's `terminal::modes::TerminalModes` (which
//! covered DECCKM/DECOM/DECAWM/DECTCEM, the mouse-protocol family,
//! bracketed paste, synchronized output, focus events, alt-screen, IRM,
//! LNM) with the VT420+ modes the spec's dispatcher names: DECSCLM
//! (slow-scroll), DECARM (auto-repeat), DECLRMM (left/right margin mode,
//! gates DECSLRM/`CSI s`), DECNCSM (suppress DECCOLM's implicit clear),
//! and DECXRLM (XON/XOFF flow control).

/// DEC private and ANSI mode flags tracked per session.
#[derive(Debug, Clone)]
pub struct TerminalModes {
    /// DECCKM: cursor key mode (application vs normal).
    pub cursor_keys_application: bool,
    /// DECSCLM: slow scroll.
    pub slow_scroll: bool,
    /// DECOM: origin mode.
    pub origin: bool,
    /// DECAWM: auto-wrap mode.
    pub autowrap: bool,
    /// DECARM: auto-repeat mode.
    pub auto_repeat: bool,
    /// DECTCEM: text cursor visible.
    pub cursor_visible: bool,
    /// Mouse tracking (mode 1000).
    pub mouse_tracking: bool,
    /// Mouse motion tracking (mode 1002).
    pub mouse_motion: bool,
    /// Mouse all-motion tracking (mode 1003).
    pub mouse_all_motion: bool,
    /// SGR mouse reporting (mode 1006).
    pub sgr_mouse: bool,
    /// UTF-8 mouse reporting (mode 1005).
    pub utf8_mouse: bool,
    /// Alternate scroll mode (mode 1007).
    pub alternate_scroll: bool,
    /// Bracketed paste mode (mode 2004).
    pub bracketed_paste: bool,
    /// Synchronized output mode (mode 2026).
    pub synchronized_output: bool,
    /// Focus events (mode 1004).
    pub focus_events: bool,
    /// Alternate screen active (1047/1049 family).
    pub alt_screen: bool,
    /// Insert mode (IRM).
    pub insert: bool,
    /// Line feed / new line mode (LNM).
    pub linefeed_newline: bool,
    /// DECLRMM: left/right margin mode. Gates whether DECSLRM sets margins
    /// (vs. `CSI s` meaning SCO save-cursor) and whether margins other than
    /// the full row width are honored.
    pub left_right_margin: bool,
    /// DECNCSM: when set, DECCOLM's 80/132-column switch does not clear
    /// the grid.
    pub no_clear_on_column_change: bool,
    /// DECXRLM: enables XON/XOFF flow control on the input pipeline.
    pub xon_xoff: bool,
}

impl Default for TerminalModes {
    fn default() -> Self {
        Self {
            cursor_keys_application: false,
            slow_scroll: false,
            origin: false,
            autowrap: true,
            auto_repeat: true,
            cursor_visible: true,
            mouse_tracking: false,
            mouse_motion: false,
            mouse_all_motion: false,
            sgr_mouse: false,
            utf8_mouse: false,
            alternate_scroll: false,
            bracketed_paste: false,
            synchronized_output: false,
            focus_events: false,
            alt_screen: false,
            insert: false,
            linefeed_newline: false,
            left_right_margin: false,
            no_clear_on_column_change: false,
            xon_xoff: false,
        }
    }
}

impl TerminalModes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset modes to their soft-reset (DECSTR) defaults. Per spec, soft
    /// reset clears modes to defaults but (unlike RIS) doesn't touch grid
    /// contents, so this only ever lives here, not in `Session::hard_reset`.
    pub fn soft_reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_power_on_state() {
        let modes = TerminalModes::new();
        assert!(modes.autowrap);
        assert!(modes.auto_repeat);
        assert!(modes.cursor_visible);
        assert!(!modes.left_right_margin);
        assert!(!modes.xon_xoff);
    }

    #[test]
    fn soft_reset_restores_defaults() {
        let mut modes = TerminalModes::new();
        modes.origin = true;
        modes.left_right_margin = true;
        modes.alt_screen = true;
        modes.soft_reset();
        assert!(!modes.origin);
        assert!(!modes.left_right_margin);
        assert!(!modes.alt_screen);
    }
}
