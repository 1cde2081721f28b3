//! Kitty-style chunked image uploads, riding the APC channel (`ESC _ G
//! <k>=<v>,... ; <base64> ST`).
//!
//! Grounded on the teacher's Kitty image event scaffold
//! (`TerminalEvent::KittyImage` in `render/frame.rs`, which already
//! carries `image_id`/`placement_id`/`action`/chunked `data_base64`);
//! this builds the real `_G` key=value parser that feeds that shape,
//! rather than replacing it.

use base64::Engine;

use crate::session::KittyState;

/// A fully-assembled (all chunks received) Kitty graphics command.
#[derive(Debug, Clone)]
pub struct KittyCommand {
    pub action: char,
    pub image_id: Option<u64>,
    pub placement_id: Option<u64>,
    pub format: Option<u32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub x: Option<i32>,
    pub y: Option<i32>,
    /// `screen_head` captured when the placement lands, so history-scroll
    /// later can tell whether the image has aged out of the viewport.
    pub start_row: usize,
    pub data: Vec<u8>,
}

/// APC payload is `G<k>=<v>,<k>=<v>,...;<base64-data>` (the parser's
/// pre-scanner already stripped the leading `ESC _` and trailing `ST`).
/// Returns `Some` once every chunk of a transfer has arrived; `None`
/// while a multi-chunk (`m=1`) transfer is still in progress.
pub fn feed(state: &mut KittyState, payload: &[u8], screen_head: usize) -> Option<KittyCommand> {
    let payload = payload.strip_prefix(b"G").unwrap_or(payload);
    let mut parts = payload.splitn(2, |&b| b == b';');
    let keyvals = parts.next().unwrap_or(b"");
    let data_part = parts.next().unwrap_or(b"");

    let mut action = 't';
    let mut image_id = None;
    let mut placement_id = None;
    let mut format = None;
    let mut width = None;
    let mut height = None;
    let mut x = None;
    let mut y = None;
    let mut more_chunks = false;

    for pair in keyvals.split(|&b| b == b',') {
        let mut kv = pair.splitn(2, |&b| b == b'=');
        let key = kv.next().unwrap_or(b"");
        let value = kv.next().unwrap_or(b"");
        let value_str = std::str::from_utf8(value).unwrap_or("");
        match key {
            b"a" => action = value_str.chars().next().unwrap_or('t'),
            b"i" => image_id = value_str.parse().ok(),
            b"p" => placement_id = value_str.parse().ok(),
            b"f" => format = value_str.parse().ok(),
            b"s" => width = value_str.parse().ok(),
            b"v" => height = value_str.parse().ok(),
            b"x" => x = value_str.parse().ok(),
            b"y" => y = value_str.parse().ok(),
            b"m" => more_chunks = value_str == "1",
            _ => {}
        }
    }

    let decoded = base64::engine::general_purpose::STANDARD
        .decode(data_part)
        .unwrap_or_default();

    if more_chunks {
        if state.pending_id.is_none() {
            state.pending_id = image_id;
            state.buffer.clear();
        }
        state.buffer.extend_from_slice(&decoded);
        return None;
    }

    let mut data = std::mem::take(&mut state.buffer);
    data.extend_from_slice(&decoded);
    let final_id = state.pending_id.take().or(image_id);

    Some(KittyCommand {
        action,
        image_id: final_id,
        placement_id,
        format,
        width,
        height,
        x,
        y,
        start_row: screen_head,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_chunk_transfer_completes_immediately() {
        let mut state = KittyState::default();
        let payload = b"Ga=t,i=7,f=32;aGVsbG8=";
        let cmd = feed(&mut state, payload, 3).unwrap();
        assert_eq!(cmd.action, 't');
        assert_eq!(cmd.image_id, Some(7));
        assert_eq!(cmd.data, b"hello");
        assert_eq!(cmd.start_row, 3);
    }

    #[test]
    fn multi_chunk_transfer_accumulates_until_m0() {
        let mut state = KittyState::default();
        assert!(feed(&mut state, b"Ga=t,i=9,m=1;aGVs", 0).is_none());
        let cmd = feed(&mut state, b"Ga=t,m=0;bG8=", 0).unwrap();
        assert_eq!(cmd.image_id, Some(9));
        assert_eq!(cmd.data, b"hello");
    }
}
