use std::mem::take;

use crate::{
    courier::{Command, Response},
    util::{Rope, RopeError},
};

/// The buffer owned by one connection.
#[derive(Debug, Default)]
pub struct Document {
    rope: Rope,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rope(&self) -> &Rope {
        &self.rope
    }

    /// Applies one command. Bounds are checked before the rope is handed to
    /// the consuming operation, so a rejected command leaves the document as
    /// it was.
    pub fn apply(&mut self, command: Command) -> Result<Option<Response>, RopeError> {
        match command {
            Command::Insert { position, text } => self.insert(position, &text)?,
            Command::Space { position } => self.insert(position, b" ")?,
            Command::Newline { position } => self.insert(position, b"\n")?,
            Command::Delete { from, to } => {
                let (from, to) = (from as isize, to as isize);
                self.rope.resolve_range(from, to)?;
                self.rope = take(&mut self.rope).delete(from, to)?;
            }
            Command::Print => {
                let text = self.rope.to_bytes();
                return Ok(Some(Response { text }));
            }
        }

        Ok(None)
    }

    fn insert(&mut self, position: i32, text: &[u8]) -> Result<(), RopeError> {
        let position = position as isize;
        self.rope.resolve(position)?;
        self.rope = take(&mut self.rope).insert(position, text)?;
        Ok(())
    }
}
