//! Fixed text markers shared by the extraction engine and the orchestrator.

use once_cell::sync::Lazy;
use regex::Regex;

/// A concrete copyright statement: "Copyright 2020", "(c) 1999", "Copyright the ...".
pub static COPYRIGHT_MENTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bcopyright\s+(?:\(c\)\s*|©\s*)?(?:\d{4}|the\s|by\s)|(?:\(c\)|©)\s*\d{4}")
        .unwrap()
});

/// Any use of the word or symbol.
pub static COPYRIGHT_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)copyright|\(c\)|©").unwrap());

/// Content that can open a copyright block.
pub static COPYRIGHT_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:copyright\b|\(c\)|©|portions\b.*\b(?:copyright|created by)\b|(?:(?:originally |initially )?written|contributed|developed|created) by\b|authors?:|the initial developer\b)",
    )
    .unwrap()
});

/// Text that only appears inside license conditions.
pub static LICENSE_FRAGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)Permission\s+is\s+hereby\s+granted|Redistribution\s+and\s+use\s+in\s+source|Licensed\s+under\s+the\b|TH(?:IS|E)\s+SOFTWARE\s+IS\s+PROVIDED|General\s+Public\s+License|Mozilla\s+Public\s+License",
    )
    .unwrap()
});

/// A line that belongs to some other license block (its opening or closing words).
pub static OTHER_LICENSE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)limitations\s+under\s+the\s+License\.|SUCH\s+DAMAGE\.|IN\s+THE\s+SOFTWARE\.|^\W*SOFTWARE\.\s*$|from\s+any\s+source\s+distribution\.|Permission\s+is\s+hereby\s+granted|Redistribution\s+and\s+use\s+in\s+source|Licensed\s+under\s+the\b",
    )
    .unwrap()
});
