//! Commit-type emoji annotation.

/// Commit types and the emoji prefixed to them.
const EMOJI_TABLE: &[(&str, &str)] = &[
    ("feat", "✨"),
    ("fix", "🚑"),
    ("docs", "📝"),
    ("style", "💄"),
    ("refactor", "♻️"),
    ("test", "✅"),
    ("chore", "🔧"),
];

/// Returns the emoji for a commit type, if it has one.
pub fn emoji_for(commit_type: &str) -> Option<&'static str> {
    EMOJI_TABLE
        .iter()
        .find(|(name, _)| *name == commit_type)
        .map(|(_, emoji)| *emoji)
}

/// Prefixes `message` with the emoji of its commit type.
///
/// The type is the leading run of ASCII letters, so `feat(ui): x` and
/// `fix: y` are both recognized. The lookup is case-sensitive, and unknown
/// types leave the message as is.
pub fn apply_emoji(message: &str) -> String {
    let type_len = message
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(message.len());
    match emoji_for(&message[..type_len]) {
        Some(emoji) => format!("{emoji} {message}"),
        None => message.to_string(),
    }
}
