//! OSC dispatch: window title (0/2) and clipboard access (52).
//!
//! Grounded on the teacher's `handle_osc`/`handle_osc_52` in
//! `terminal/state.rs`, trimmed to the subset that's terminal-core rather
//! than shell-integration (OSC 7 cwd tracking and OSC 133 shell-prompt
//! markers are PTY/shell concerns the teacher's embedder owns, not this
//! crate).

use base64::Engine;

use super::dispatch::DispatchCtx;

pub fn dispatch(ctx: &mut DispatchCtx, params: &[&[u8]]) {
    if params.is_empty() {
        return;
    }
    match std::str::from_utf8(params[0]).unwrap_or("") {
        "0" | "2" => {
            if let Some(title) = params.get(1) {
                ctx.session.title = String::from_utf8_lossy(title).to_string();
            }
        }
        "52" => clipboard(ctx, params),
        _ => {}
    }
}

fn clipboard(ctx: &mut DispatchCtx, params: &[&[u8]]) {
    if params.len() < 3 {
        return;
    }
    let target = std::str::from_utf8(params[1]).unwrap_or("c");
    let payload = std::str::from_utf8(params[2]).unwrap_or("");

    if payload == "?" {
        // No read-back clipboard store lives in the core; reply with an
        // empty payload rather than fabricating clipboard contents.
        let reply = format!("\x1b]52;{};\x1b\\", target);
        ctx.session.queue_response(reply.as_bytes());
        return;
    }

    if let Ok(decoded) = base64::engine::general_purpose::STANDARD.decode(payload.as_bytes()) {
        let text = String::from_utf8_lossy(&decoded).to_string();
        ctx.collaborators.emit_gateway("OSC52", target, "CLIPBOARD_WRITE", &text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callbacks::Collaborators;
    use crate::op_queue::OpQueue;
    use crate::session::Session;

    #[test]
    fn title_sequence_sets_title() {
        let mut session = Session::new(10, 5, 0);
        let mut queue = OpQueue::new();
        let mut collab = Collaborators::default();
        let palette = crate::color::DEFAULT_PALETTE;
        let mut ctx = DispatchCtx {
            session_index: 0,
            session: &mut session,
            queue: &mut queue,
            collaborators: &mut collab,
            palette: &palette,
            gateway_queue: &mut Vec::new(),
        };
        dispatch(&mut ctx, &[b"0", b"my title"]);
        assert_eq!(ctx.session.title, "my title");
    }
}
