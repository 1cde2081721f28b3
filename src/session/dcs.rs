//! DCS hook/put/unhook: selects a sub-parser by final letter (`q` Sixel,
//! `p` ReGIS, `$q` DECRQSS) or by literal payload prefix (`GATE` →
//! Gateway, sniffed because real DCS final-byte selection can't express a
//! four-character literal), accumulating the passthrough body into
//! `session.dcs.buffer` bounded by `MAX_COMMAND_BUFFER`.

use crate::gateway::GatewayCommand;
use crate::graphics::{regis, sixel};

use super::dispatch::DispatchCtx;
use super::{DcsMode, MAX_COMMAND_BUFFER};

pub fn hook(ctx: &mut DispatchCtx, intermediates: &[u8], action: char) {
    ctx.session.dcs.buffer.clear();
    ctx.session.dcs.mode = match (intermediates, action) {
        ([], 'q') => DcsMode::Sixel,
        ([], 'p') => DcsMode::Regis,
        ([b'$'], 'q') => DcsMode::Decrqss,
        ([], 'G') => DcsMode::Gateway,
        _ => DcsMode::None,
    };
}

pub fn put(ctx: &mut DispatchCtx, byte: u8) {
    if ctx.session.dcs.mode == DcsMode::None {
        return;
    }
    if ctx.session.dcs.buffer.len() < MAX_COMMAND_BUFFER {
        ctx.session.dcs.buffer.push(byte);
    }
}

pub fn unhook(ctx: &mut DispatchCtx) {
    let mode = ctx.session.dcs.mode;
    let buffer = std::mem::take(&mut ctx.session.dcs.buffer);
    match mode {
        DcsMode::Sixel => sixel::finish(&mut ctx.session.sixel, &buffer),
        DcsMode::Regis => {
            let max_y = ctx.session.rows() as i32;
            regis::execute(&mut ctx.session.regis, &buffer, max_y);
        }
        DcsMode::Decrqss => {
            let selector = String::from_utf8_lossy(&buffer).to_string();
            super::reporting::decrqss(ctx, &selector);
        }
        DcsMode::Gateway => {
            // `hook` already consumed the literal 'G'; the buffer holds
            // "ATE;class;id;command;params".
            let text = String::from_utf8_lossy(&buffer).to_string();
            if let Some(rest) = text.strip_prefix("ATE;") {
                if let Some(cmd) = GatewayCommand::parse(rest) {
                    ctx.gateway_queue.push(cmd);
                }
            }
        }
        DcsMode::None => {}
    }
    ctx.session.dcs.mode = DcsMode::None;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callbacks::Collaborators;
    use crate::op_queue::OpQueue;
    use crate::session::Session;

    fn ctx_fixture<'a>(
        session: &'a mut Session,
        queue: &'a mut OpQueue,
        collab: &'a mut Collaborators,
        palette: &'a [(u8, u8, u8); 16],
        gateway_queue: &'a mut Vec<GatewayCommand>,
    ) -> DispatchCtx<'a> {
        DispatchCtx {
            session_index: 0,
            session,
            queue,
            collaborators: collab,
            palette,
            gateway_queue,
        }
    }

    #[test]
    fn gateway_sequence_round_trip() {
        let mut session = Session::new(10, 5, 0);
        let mut queue = OpQueue::new();
        let mut collab = Collaborators::default();
        let palette = crate::color::DEFAULT_PALETTE;
        let mut gateway_queue = Vec::new();
        let mut ctx = ctx_fixture(&mut session, &mut queue, &mut collab, &palette, &mut gateway_queue);

        hook(&mut ctx, &[], 'G');
        for &b in b"ATE;KTERM;1;SET;WIDTH 120" {
            put(&mut ctx, b);
        }
        unhook(&mut ctx);

        assert_eq!(gateway_queue.len(), 1);
        assert_eq!(gateway_queue[0].class, "KTERM");
        assert_eq!(gateway_queue[0].command, "SET");
    }

    #[test]
    fn sixel_sequence_marks_active() {
        let mut session = Session::new(10, 5, 0);
        let mut queue = OpQueue::new();
        let mut collab = Collaborators::default();
        let palette = crate::color::DEFAULT_PALETTE;
        let mut gateway_queue = Vec::new();
        let mut ctx = ctx_fixture(&mut session, &mut queue, &mut collab, &palette, &mut gateway_queue);

        hook(&mut ctx, &[], 'q');
        for &b in b"!10?" {
            put(&mut ctx, b);
        }
        unhook(&mut ctx);

        assert!(ctx.session.sixel.active);
    }
}
