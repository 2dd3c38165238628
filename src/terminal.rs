use std::io::Write;

use tokio::sync::watch;

use crate::detector::{AffordanceView, AttachError, Document};

/// A [`Document`] that lives in the terminal: the location is fed in through
/// a `watch` channel and the affordance is printed instead of rendered.
pub struct TerminalDocument<W: Write> {
    location: watch::Receiver<String>,
    out: W,
    next_id: u64,
}

impl<W: Write> TerminalDocument<W> {
    pub fn new(location: watch::Receiver<String>, out: W) -> Self {
        Self {
            location,
            out,
            next_id: 1,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Document for TerminalDocument<W> {
    type Handle = u64;

    fn location(&self) -> String {
        self.location.borrow().clone()
    }

    fn mount(&mut self, view: &AffordanceView) -> Result<u64, AttachError> {
        let id = self.next_id;
        writeln!(self.out, "[+] #{id} {} ({})", view.label, view.accent)
            .map_err(|e| AttachError::Rejected(e.to_string()))?;
        self.next_id += 1;
        Ok(id)
    }

    fn unmount(&mut self, handle: u64) {
        let _ = writeln!(self.out, "[-] #{handle}");
    }
}
