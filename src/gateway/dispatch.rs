//! Gateway command execution, against a whole [`crate::terminal::Terminal`].
//!
//! Mirrors the scanning style of `gateway::scanner` (itself modeled on the
//! teacher's tmux control-mode parsers): tokenize with `Scanner`, apply
//! what parses, silently leave untouched what doesn't. Per the gateway's
//! "never crash, never mutate on error" contract, a malformed subcommand
//! is reported through the error collaborator and otherwise ignored.

use base64::Engine;

use crate::callbacks::{ErrorLevel, ErrorSource};
use crate::cell::CellFlags;
use crate::color::Color;
use crate::error::GatewayError;
use crate::gateway::scanner::Scanner;
use crate::gateway::GatewayCommand;
use crate::terminal::Terminal;

fn report(term: &mut Terminal, err: GatewayError) {
    term.collaborators.report_error(ErrorLevel::Warning, ErrorSource::Gateway, &err.to_string());
}

/// The only gateway class this core handles itself; anything else is
/// forwarded verbatim to the embedder's `GatewayHandler`.
const CORE_CLASS: &str = "KTERM";

pub fn execute(term: &mut Terminal, cmd: GatewayCommand) {
    if cmd.class != CORE_CLASS {
        term.collaborators
            .emit_gateway(&cmd.class, &cmd.id, &cmd.command, &cmd.params);
        return;
    }

    let mut scan = Scanner::new(&cmd.params);
    match cmd.command.as_str() {
        "SET" => dispatch_set(term, &mut scan),
        "RESET" => dispatch_reset(term, &mut scan),
        "INIT" => dispatch_init(term, &mut scan),
        "PIPE" => dispatch_pipe(term, &mut scan),
        other => report(term, GatewayError::UnknownCommand(other.to_string())),
    }
}

fn dispatch_set(term: &mut Terminal, scan: &mut Scanner) {
    match scan.identifier() {
        Some("SESSION") => match scan.int() {
            Some(n) => {
                let clamped = n.clamp(0, crate::config::MAX_SESSIONS as i64 - 1) as usize;
                term.gateway_target_session = Some(clamped);
            }
            None => report(term, GatewayError::ParamOutOfRange),
        },
        Some("WIDTH") => match scan.int() {
            Some(w) => {
                let rows = term.session(term.routed_session()).map(|s| s.rows()).unwrap_or(24);
                let w = clamp_dimension(w);
                term.resize_bypass_throttle(w, rows);
            }
            None => report(term, GatewayError::ParamOutOfRange),
        },
        Some("HEIGHT") => match scan.int() {
            Some(h) => {
                let cols = term.session(term.routed_session()).map(|s| s.cols()).unwrap_or(80);
                let h = clamp_dimension(h);
                term.resize_bypass_throttle(cols, h);
            }
            None => report(term, GatewayError::ParamOutOfRange),
        },
        Some("SIZE") => match (scan.int(), scan.int()) {
            (Some(w), Some(h)) => term.resize_bypass_throttle(clamp_dimension(w), clamp_dimension(h)),
            _ => report(term, GatewayError::ParamOutOfRange),
        },
        Some("DEBUG") => match scan.boolean() {
            Some(b) => {
                term.debug = b;
                let target = term.routed_session();
                if let Some(session) = term.session_mut(target) {
                    session.debug = b;
                }
            }
            None => report(term, GatewayError::ParamOutOfRange),
        },
        Some("ATTR") => {
            let target = term.routed_session();
            if let Some(session) = term.session_mut(target) {
                apply_attrs(session, scan.remaining());
            }
        }
        Some("SIXEL_SESSION") => match scan.int() {
            Some(n) => {
                let clamped = n.clamp(0, crate::config::MAX_SESSIONS as i64 - 1) as usize;
                term.sixel_target_session = Some(clamped);
            }
            None => report(term, GatewayError::ParamOutOfRange),
        },
        other => report(term, GatewayError::UnknownCommand(format!("SET {}", other.unwrap_or_default()))),
    }
}

fn dispatch_reset(term: &mut Terminal, scan: &mut Scanner) {
    match scan.identifier() {
        Some("SESSION") => term.gateway_target_session = None,
        Some("SIXEL_SESSION") => term.sixel_target_session = None,
        Some("SIXEL") => {
            let target = term.routed_session();
            if let Some(session) = term.session_mut(target) {
                session.sixel = Default::default();
            }
        }
        other => report(term, GatewayError::UnknownCommand(format!("RESET {}", other.unwrap_or_default()))),
    }
}

fn dispatch_init(term: &mut Terminal, scan: &mut Scanner) {
    if let Some("SIXEL_SESSION") = scan.identifier() {
        let target = term.routed_session();
        if let Some(session) = term.session_mut(target) {
            session.sixel = Default::default();
        }
    }
}

fn dispatch_pipe(term: &mut Terminal, scan: &mut Scanner) {
    match scan.identifier() {
        Some("VT") => {
            let encoding = scan.identifier().unwrap_or("RAW");
            let payload = scan.remaining().trim();
            let bytes = match encoding {
                "RAW" => Some(payload.as_bytes().to_vec()),
                "HEX" => decode_hex(payload),
                "B64" => base64::engine::general_purpose::STANDARD.decode(payload).ok(),
                _ => None,
            };
            match bytes {
                Some(bytes) => {
                    let target = term.routed_session();
                    term.write_string(target, &bytes);
                }
                None => {
                    let err = match encoding {
                        "HEX" => GatewayError::InvalidHex,
                        "B64" => GatewayError::InvalidBase64,
                        other => GatewayError::UnknownCommand(format!("PIPE VT {other}")),
                    };
                    report(term, err);
                }
            }
        }
        Some("BANNER") => pipe_banner(term, scan.remaining()),
        other => report(term, GatewayError::UnknownCommand(format!("PIPE {}", other.unwrap_or_default()))),
    }
}

fn clamp_dimension(v: i64) -> u16 {
    v.clamp(
        crate::config::MIN_DIMENSION as i64,
        crate::config::MAX_DIMENSION as i64,
    ) as u16
}

fn decode_hex(payload: &str) -> Option<Vec<u8>> {
    let payload = payload.trim();
    if payload.len() % 2 != 0 {
        return None;
    }
    (0..payload.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&payload[i..i + 2], 16).ok())
        .collect()
}

/// `ATTR KEY=VAL[;KEY=VAL...]`, editing the target session's current pen
/// (the SGR state subsequently-written cells pick up).
fn apply_attrs(session: &mut crate::session::Session, text: &str) {
    for pair in text.split(';') {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }
        let Some((key, value)) = pair.split_once('=') else { continue };
        let value = value.trim();
        match key.trim() {
            "FG" => {
                if let Some(color) = parse_color(value) {
                    session.cursor.fg = color;
                }
            }
            "BG" => {
                if let Some(color) = parse_color(value) {
                    session.cursor.bg = color;
                }
            }
            "BOLD" => set_flag(session, CellFlags::BOLD, value),
            "ITALIC" => set_flag(session, CellFlags::ITALIC, value),
            "UNDERLINE" => session.cursor.underline = parse_underline(value),
            "REVERSE" => set_flag(session, CellFlags::REVERSE, value),
            _ => {}
        }
    }
}

fn set_flag(session: &mut crate::session::Session, flag: CellFlags, value: &str) {
    let on = matches!(value.to_ascii_uppercase().as_str(), "1" | "ON" | "TRUE");
    if on {
        session.cursor.attrs.insert(flag);
    } else {
        session.cursor.attrs.remove(flag);
    }
}

fn parse_underline(value: &str) -> crate::cell::UnderlineStyle {
    use crate::cell::UnderlineStyle;
    match value.to_ascii_uppercase().as_str() {
        "1" | "SINGLE" => UnderlineStyle::Single,
        "2" | "DOUBLE" => UnderlineStyle::Double,
        "3" | "CURLY" => UnderlineStyle::Curly,
        "4" | "DOTTED" => UnderlineStyle::Dotted,
        "5" | "DASHED" => UnderlineStyle::Dashed,
        _ => UnderlineStyle::None,
    }
}

fn parse_color(value: &str) -> Option<Color> {
    if let Some(hex) = value.strip_prefix('#') {
        if hex.len() == 6 {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            return Some(Color::Rgb(r, g, b));
        }
        return None;
    }
    value.parse::<u8>().ok().map(Color::Indexed)
}

fn pipe_banner(term: &mut Terminal, text: &str) {
    let mut align = "LEFT".to_string();
    let mut gradient: Option<(String, String)> = None;
    let mut message = String::new();

    for token in split_banner_options(text) {
        if let Some(rest) = token.strip_prefix("ALIGN=") {
            align = rest.to_string();
        } else if let Some(rest) = token.strip_prefix("GRADIENT=") {
            if let Some((a, b)) = rest.split_once('|') {
                gradient = Some((a.to_string(), b.to_string()));
            }
        } else if let Some(rest) = token.strip_prefix("TEXT=") {
            message = rest.to_string();
        }
        // FIXED/FONT= are rendering concerns outside the core; parsed
        // away so they don't fall through to the text field above.
    }

    let target = term.routed_session();
    let cols = term.session(target).map(|s| s.cols() as usize).unwrap_or(80);
    let pad = cols.saturating_sub(message.chars().count());
    let leading = match align.as_str() {
        "CENTER" => pad / 2,
        "RIGHT" => pad,
        _ => 0,
    };

    let mut bytes = Vec::new();
    if let Some((start, end)) = gradient {
        if let (Some(start), Some(end)) = (parse_color(&start), parse_color(&end)) {
            emit_gradient_sgr(&mut bytes, start, end);
        }
    }
    bytes.extend(std::iter::repeat(b' ').take(leading));
    bytes.extend_from_slice(message.as_bytes());
    bytes.extend_from_slice(b"\x1b[0m");

    term.write_string(target, &bytes);
}

fn split_banner_options(text: &str) -> Vec<String> {
    // Options are separated by `;`, except within a `TEXT=` value, which
    // runs to the end of the string (banner text may itself contain `;`).
    if let Some(idx) = text.find("TEXT=") {
        let (head, tail) = text.split_at(idx);
        let mut out: Vec<String> = head.split(';').filter(|s| !s.is_empty()).map(str::to_string).collect();
        out.push(tail.trim_end_matches(';').to_string());
        out
    } else {
        text.split(';').filter(|s| !s.is_empty()).map(str::to_string).collect()
    }
}

fn emit_gradient_sgr(bytes: &mut Vec<u8>, start: Color, end: Color) {
    if let (Color::Rgb(r, g, b), Color::Rgb(..)) = (start, end) {
        bytes.extend_from_slice(format!("\x1b[38;2;{r};{g};{b}m").as_bytes());
    }
    let _ = end;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callbacks::{ErrorLevel as Level, ErrorReporter, ErrorSource as Source};
    use crate::config::CreateConfig;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct RecordingReporter(Rc<RefCell<Vec<String>>>);

    impl ErrorReporter for RecordingReporter {
        fn report(&mut self, _level: Level, _source: Source, message: &str) {
            self.0.borrow_mut().push(message.to_string());
        }
    }

    #[test]
    fn unknown_pipe_encoding_reports_gateway_error() {
        let mut term = Terminal::create(CreateConfig::default()).unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));
        term.collaborators.error = Some(Box::new(RecordingReporter(log.clone())));
        execute(
            &mut term,
            GatewayCommand {
                class: "KTERM".into(),
                id: "1".into(),
                command: "PIPE".into(),
                params: "VT HEX zz".into(),
            },
        );
        assert_eq!(log.borrow()[0], GatewayError::InvalidHex.to_string());
    }

    #[test]
    fn unknown_set_subcommand_reports_gateway_error() {
        let mut term = Terminal::create(CreateConfig::default()).unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));
        term.collaborators.error = Some(Box::new(RecordingReporter(log.clone())));
        execute(
            &mut term,
            GatewayCommand {
                class: "KTERM".into(),
                id: "1".into(),
                command: "SET".into(),
                params: "BOGUS 1".into(),
            },
        );
        assert_eq!(log.borrow()[0], GatewayError::UnknownCommand("SET BOGUS".into()).to_string());
    }

    #[test]
    fn set_width_resizes_routed_session() {
        let mut term = Terminal::create(CreateConfig::default()).unwrap();
        execute(
            &mut term,
            GatewayCommand {
                class: "KTERM".into(),
                id: "1".into(),
                command: "SET".into(),
                params: "WIDTH 40".into(),
            },
        );
        assert_eq!(term.session(0).unwrap().cols(), 40);
    }

    #[test]
    fn set_session_then_reset_restores_active_routing() {
        let mut term = Terminal::create(CreateConfig::default()).unwrap();
        term.init_session(1).unwrap();
        execute(
            &mut term,
            GatewayCommand {
                class: "KTERM".into(),
                id: "1".into(),
                command: "SET".into(),
                params: "SESSION 1".into(),
            },
        );
        assert_eq!(term.gateway_target_session, Some(1));
        execute(
            &mut term,
            GatewayCommand {
                class: "KTERM".into(),
                id: "1".into(),
                command: "RESET".into(),
                params: "SESSION".into(),
            },
        );
        assert_eq!(term.gateway_target_session, None);
    }

    #[test]
    fn unknown_class_routes_to_embedder_callback() {
        let mut term = Terminal::create(CreateConfig::default()).unwrap();
        execute(
            &mut term,
            GatewayCommand {
                class: "TMUX".into(),
                id: "9".into(),
                command: "NOTIFY".into(),
                params: "whatever".into(),
            },
        );
        // No panic, no mutation to core state; embedder callback is a
        // no-op in this test since none was installed.
        assert_eq!(term.gateway_target_session, None);
    }

    #[test]
    fn pipe_vt_hex_decodes_and_injects() {
        let mut term = Terminal::create(CreateConfig::default()).unwrap();
        execute(
            &mut term,
            GatewayCommand {
                class: "KTERM".into(),
                id: "1".into(),
                command: "PIPE".into(),
                params: "VT HEX 41".into(),
            },
        );
        term.update();
        assert_eq!(term.session(0).unwrap().active_grid().visible_row(0).cells[0].c, 'A');
    }

    #[test]
    fn pipe_banner_right_align_pads_with_leading_spaces() {
        let mut term = Terminal::create(CreateConfig::default()).unwrap();
        let cols = term.session(0).unwrap().cols() as usize;
        execute(
            &mut term,
            GatewayCommand {
                class: "KTERM".into(),
                id: "1".into(),
                command: "PIPE".into(),
                params: "BANNER ALIGN=RIGHT TEXT=hi".into(),
            },
        );
        term.update();
        let row = term.session(0).unwrap().active_grid().visible_row(0);
        let expected_start = cols - 2;
        assert_eq!(row.cells[expected_start].c, 'h');
        assert_eq!(row.cells[expected_start + 1].c, 'i');
        assert_eq!(row.cells[0].c, ' ');
    }
}
