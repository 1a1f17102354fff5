//! Free-text command classification.
//!
//! Commands are matched against an ordered table of `(kind, patterns,
//! extractor)` rows. The first kind whose pattern list matches wins; within a
//! kind, patterns are tried in declaration order and the first match's
//! captured groups populate the intent's parameters. Classification is pure,
//! deterministic, and case-insensitive; text that matches nothing resolves to
//! [`Intent::Unknown`], which is an outcome, not an error.

use std::sync::OnceLock;

use regex::{Captures, Regex};
use rust_decimal::Decimal;

/// Canonical action resolved from a free-text command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Query the sender's token balance.
    Balance,
    /// Transfer tokens to another registered handle.
    Send {
        /// Whole-token amount, exact decimal, strictly positive as written.
        amount: Decimal,
        /// Recipient handle as typed, leading `@` stripped.
        recipient_handle: String,
    },
    /// Look up the price of an asset.
    Price {
        /// Upper-cased asset symbol.
        symbol: String,
    },
    /// Create a donation collector.
    Donate {
        /// Free-text cause captured from the command remainder.
        cause: Option<String>,
    },
    /// Nothing matched.
    Unknown,
}

/// Page context accompanying a command.
///
/// `quoted_text` carries the post the command replied to; a `$SYMBOL` token
/// in it overrides the textually matched price symbol, so a generic "price?"
/// reply to a post about a specific asset resolves correctly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandContext {
    /// Text quoted or replied to alongside the command.
    pub quoted_text: Option<String>,
}

type Extractor = fn(&Captures<'_>, &CommandContext) -> Option<Intent>;

struct ClassifierRow {
    patterns: Vec<Regex>,
    extract: Extractor,
}

static TABLE: OnceLock<Vec<ClassifierRow>> = OnceLock::new();
static QUOTED_SYMBOL: OnceLock<Regex> = OnceLock::new();

fn pattern(source: &str) -> Regex {
    Regex::new(source).unwrap_or_else(|error| panic!("classifier pattern failed to compile: {error}"))
}

fn table() -> &'static [ClassifierRow] {
    TABLE.get_or_init(|| {
        vec![
            ClassifierRow {
                patterns: vec![
                    pattern(r"\b(?:check|get|fetch|show)\b.*\bbalance\b"),
                    pattern(r"\bwhat(?:'s|\s+is)?\b.*\bbalance\b"),
                    pattern(r"\bbalance\b\s*\?"),
                ],
                extract: |_, _| Some(Intent::Balance),
            },
            ClassifierRow {
                // Tolerates "transaction [of]" between verb and amount and an
                // optional unit word before "to". A bare "." has no digits and
                // cannot match, so it classifies as Unknown rather than a NaN
                // send.
                patterns: vec![pattern(
                    r"\b(?:send|transfer)\s+(?:(?:a\s+)?transaction\s+(?:of\s+)?)?(\d+(?:\.\d+)?|\.\d+)\s*(?:[a-z]+\s+)?to\s+@?([a-z0-9_]+)",
                )],
                extract: extract_send,
            },
            ClassifierRow {
                patterns: vec![
                    pattern(r"price\s+of\s+\$?([a-z0-9]+)"),
                    pattern(r"\$?([a-z0-9]+)\s+price\b"),
                ],
                extract: extract_price,
            },
            ClassifierRow {
                patterns: vec![pattern(
                    r"\b(?:donate|donation)\b(?:\s+(?:for|to)\s+(.+))?",
                )],
                extract: extract_donate,
            },
        ]
    })
}

fn extract_send(caps: &Captures<'_>, _: &CommandContext) -> Option<Intent> {
    let amount: Decimal = caps.get(1)?.as_str().parse().ok()?;
    let recipient_handle = caps.get(2)?.as_str().to_owned();
    Some(Intent::Send {
        amount,
        recipient_handle,
    })
}

fn extract_price(caps: &Captures<'_>, context: &CommandContext) -> Option<Intent> {
    let matched = caps.get(1)?.as_str().to_uppercase();
    let symbol = quoted_symbol(context).unwrap_or(matched);
    Some(Intent::Price { symbol })
}

fn extract_donate(caps: &Captures<'_>, _: &CommandContext) -> Option<Intent> {
    let cause = caps
        .get(1)
        .map(|m| m.as_str().trim().trim_end_matches(['.', '!']).to_owned())
        .filter(|c| !c.is_empty());
    Some(Intent::Donate { cause })
}

/// `$SYMBOL` token from the quoted page context, if any.
fn quoted_symbol(context: &CommandContext) -> Option<String> {
    let quoted = context.quoted_text.as_deref()?;
    let re = QUOTED_SYMBOL.get_or_init(|| pattern(r"\$([A-Za-z][A-Za-z0-9]*)"));
    re.captures(quoted)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_uppercase())
}

/// Deterministic pattern-table classifier for free-text commands.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntentResolver;

impl IntentResolver {
    /// Classify a command, lower-cased and trimmed first.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::intent::{CommandContext, Intent, IntentResolver};
    ///
    /// let intent = IntentResolver.resolve("Check my balance", &CommandContext::default());
    /// assert_eq!(intent, Intent::Balance);
    /// ```
    pub fn resolve(&self, text: &str, context: &CommandContext) -> Intent {
        let lowered = text.trim().to_lowercase();
        for row in table() {
            for regex in &row.patterns {
                if let Some(caps) = regex.captures(&lowered) {
                    if let Some(intent) = (row.extract)(&caps, context) {
                        return intent;
                    }
                }
            }
        }
        Intent::Unknown
    }
}
