//! Gateway protocol: `DCS GATE ; class ; id ; command ; params ST`.
//!
//! Wire-format parsing happens where the DCS payload is accumulated
//! (`session::dcs`, which recognizes the `GATE` literal prefix and splits
//! the passthrough text on `;` into a [`GatewayCommand`]). Execution
//! happens here, against a whole `Terminal` (`dispatch::execute`), since
//! most gateway commands route to or mutate a session other than the one
//! that received the DCS sequence.

pub mod dispatch;
pub mod scanner;

/// A fully-parsed (but not yet executed) gateway command.
#[derive(Debug, Clone)]
pub struct GatewayCommand {
    pub class: String,
    pub id: String,
    pub command: String,
    pub params: String,
}

impl GatewayCommand {
    /// Parse `class ; id ; command ; params...` (params rejoined verbatim,
    /// since individual gateway commands scan it themselves). Returns
    /// `None` on too few fields; per spec, malformed gateway input is
    /// silently ignored rather than causing a parse error.
    pub fn parse(payload: &str) -> Option<Self> {
        let mut parts = payload.splitn(4, ';');
        let class = parts.next()?.trim().to_string();
        let id = parts.next()?.trim().to_string();
        let command = parts.next()?.trim().to_string();
        let params = parts.next().unwrap_or("").trim().to_string();
        if class.is_empty() || command.is_empty() {
            return None;
        }
        Some(Self {
            class,
            id,
            command,
            params,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_four_semicolon_fields() {
        let cmd = GatewayCommand::parse("KTERM;1;SET;WIDTH 3000").unwrap();
        assert_eq!(cmd.class, "KTERM");
        assert_eq!(cmd.id, "1");
        assert_eq!(cmd.command, "SET");
        assert_eq!(cmd.params, "WIDTH 3000");
    }

    #[test]
    fn rejects_too_few_fields() {
        assert!(GatewayCommand::parse("KTERM;1").is_none());
    }
}
