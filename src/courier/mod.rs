mod command;
mod error;
mod text;
mod wire;

pub(crate) use self::command::{Command, Response};
pub(crate) use self::error::CourierError;
pub(crate) use self::text::TextReader;
pub(crate) use self::wire::Courier;
