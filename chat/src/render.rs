//! Rendering the conversation.
//!
//! The session calls [`Render::render`] after every mutation. The terminal
//! renderer cannot redraw in place, so it remembers how much it has already
//! written and prints only what is new: fresh messages and the appended
//! suffix of the growing last message.

use std::io::{self, Write};

use protocol::Role;

use crate::state::conversation::Conversation;

pub trait Render {
    /// Bring the display up to date with `conversation`.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from the output device.
    fn render(&mut self, conversation: &Conversation) -> io::Result<()>;
}

const RESET: &str = "\x1b[0m";
const USER_STYLE: &str = "\x1b[1;36m";
const ASSISTANT_STYLE: &str = "\x1b[1;32m";

/// Append-only renderer for a line-oriented terminal.
pub struct TerminalRenderer<W> {
    out: W,
    color: bool,
    /// Index of the message currently being written.
    shown: usize,
    /// Bytes of that message's content already written.
    offset: usize,
    /// Whether that message's label has been written.
    open: bool,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color, shown: 0, offset: 0, open: false }
    }

    fn write_label(&mut self, role: Role) -> io::Result<()> {
        let (style, label) = match role {
            Role::User => (USER_STYLE, "You"),
            Role::Assistant => (ASSISTANT_STYLE, "Agent"),
            Role::System => (RESET, "System"),
        };
        if self.color {
            write!(self.out, "{style}{label}:{RESET} ")
        } else {
            write!(self.out, "{label}: ")
        }
    }
}

impl<W: Write> Render for TerminalRenderer<W> {
    fn render(&mut self, conversation: &Conversation) -> io::Result<()> {
        let messages = conversation.messages();

        while let Some(message) = messages.get(self.shown) {
            if !self.open {
                self.write_label(message.role)?;
                self.open = true;
                self.offset = 0;
            }

            let tail = message.content.get(self.offset..).unwrap_or("");
            self.out.write_all(tail.as_bytes())?;
            self.offset += tail.len();

            // The last message stays open while a reply can still grow it.
            let is_last = self.shown + 1 == messages.len();
            if is_last && conversation.is_sending() {
                break;
            }
            writeln!(self.out)?;
            self.shown += 1;
            self.open = false;
        }

        self.out.flush()
    }
}

#[cfg(test)]
#[path = "render_test.rs"]
mod tests;
