/// Prefix of the search command, trailing space included.
pub const SEARCH_PREFIX: &str = "/search ";

/// What an incoming text asks the bot to do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Catalog search. An empty query means "ask the user for one".
    Search(String),
    Start,
    Help,
    /// Anything unrecognized, carried verbatim.
    Fallback(String),
}

/// Map message text to a [`Command`].
///
/// Literal and case-sensitive, against the trimmed text: `/search ` must be a
/// prefix, `/start` and `/help` must match exactly.
pub fn route(text: &str) -> Command {
    if let Some(rest) = text.trim_start().strip_prefix(SEARCH_PREFIX) {
        return Command::Search(rest.trim().to_string());
    }

    match text.trim() {
        "/start" => Command::Start,
        "/help" => Command::Help,
        _ => Command::Fallback(text.to_string()),
    }
}
