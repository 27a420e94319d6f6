//! Terminal clipboard
//!
//! Copies through the OSC 52 escape sequence, which most terminal
//! emulators (and tmux with `set-clipboard on`) forward to the system
//! clipboard. Nothing is read back, so a successful write is the only
//! confirmation available. When the sink is not a terminal the escape would
//! land in a pipe or file, so nothing is written and the copy fails.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::io::{self, IsTerminal, Stdout, Write};

use crate::error::{VaultError, VaultResult};

/// Destination for copied text
pub trait Clipboard {
    fn copy(&mut self, text: &str) -> VaultResult<()>;
}

/// OSC 52 writer over any byte sink (normally stdout)
pub struct Osc52Clipboard<W: Write> {
    out: W,
    is_terminal: bool,
}

impl Osc52Clipboard<Stdout> {
    pub fn stdout() -> Self {
        let out = io::stdout();
        let is_terminal = out.is_terminal();
        Self::new(out, is_terminal)
    }
}

impl<W: Write> Osc52Clipboard<W> {
    /// `is_terminal` tells whether `out` reaches a terminal emulator
    pub fn new(out: W, is_terminal: bool) -> Self {
        Self { out, is_terminal }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// `ESC ] 52 ; c ; <base64> BEL`
pub fn osc52_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", STANDARD.encode(text.as_bytes()))
}

impl<W: Write> Clipboard for Osc52Clipboard<W> {
    fn copy(&mut self, text: &str) -> VaultResult<()> {
        if !self.is_terminal {
            return Err(VaultError::clipboard_error("stdout is not a terminal"));
        }
        self.out.write_all(osc52_sequence(text).as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_osc52_sequence() {
        assert_eq!(osc52_sequence("hello"), "\x1b]52;c;aGVsbG8=\x07");
    }

    #[test]
    fn test_copy_writes_sequence() {
        let mut clipboard = Osc52Clipboard::new(Vec::new(), true);
        clipboard.copy("abc").unwrap();
        assert_eq!(clipboard.into_inner(), b"\x1b]52;c;YWJj\x07".to_vec());
    }

    #[test]
    fn test_non_terminal_writes_nothing() {
        let mut clipboard = Osc52Clipboard::new(Vec::new(), false);
        let err = clipboard.copy("secret").unwrap_err();
        assert_eq!(err.code, ErrorCode::ClipboardError);
        assert!(clipboard.into_inner().is_empty());
    }

    #[test]
    fn test_write_failure_is_error() {
        let mut clipboard = Osc52Clipboard::new(BrokenPipe, true);
        assert!(clipboard.copy("abc").is_err());
    }
}
