mod document;

pub(crate) mod client;
pub(crate) mod server;

pub(crate) use self::document::Document;
