//! Text normalization — tokenizes free text for the vector space.
//!
//! Lowercases, splits on non-alphanumeric characters (Unicode-aware, so
//! accented Spanish words survive intact), drops short tokens and stop words.

/// Spanish stop words filtered during tokenization.
///
/// Only words of three or more characters appear here — shorter tokens are
/// removed by the length filter before this list is consulted.
const STOP_WORDS: &[&str] = &[
    "que", "los", "las", "del", "una", "uno", "unos", "unas", "por", "con", "para", "como",
    "más", "pero", "sus", "sobre", "entre", "este", "esta", "estos", "estas", "ese", "esa",
    "esos", "esas", "también", "hasta", "hay", "donde", "quien", "desde", "todo", "todos",
    "toda", "todas", "otro", "otra", "otros", "otras", "ser", "son", "era", "eran", "fue",
    "fueron", "está", "están", "estaba", "estaban", "tiene", "tienen", "tenía", "hace",
    "hacen", "puede", "pueden", "muy", "sin", "nos", "les", "algo", "cada", "porque",
    "cuando", "mientras", "durante", "aunque", "además", "ante", "contra", "según", "tras",
];

/// Tokenize free text: lowercase, split on non-alphanumeric, drop tokens of
/// two characters or fewer, drop stop words.
///
/// Pure and deterministic; empty input yields an empty vec. Length is counted
/// in characters, not bytes, so accented tokens are measured correctly.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() > 2)
        .filter(|w| !STOP_WORDS.contains(w))
        .map(|w| w.to_string())
        .collect()
}
