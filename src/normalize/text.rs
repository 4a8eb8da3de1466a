//! Claim text and link normalization.
//!
//! Claim bodies are noisy: markdown, URLs, @-mentions, and boilerplate label
//! lines ("Wallet: ...") dominate the raw text and would swamp any similarity
//! comparison. Normalization reduces a body to its distinctive tokens so the
//! template-matching detectors compare what the claimant actually wrote.

use regex::Regex;
use std::sync::OnceLock;

const STOP_TOKENS: &[&str] = &[
    "claim",
    "claiming",
    "bounty",
    "wallet",
    "miner",
    "issue",
    "github",
    "timezone",
    "proof",
    "ready",
    "start",
    "immediately",
    "implementation",
    "plan",
    "approach",
    "eta",
    "rtc",
];

fn url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"https?://[^\s<>()\]]+").expect("hardcoded pattern compiles"))
}

fn mention_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"@[a-z0-9_-]+").expect("hardcoded pattern compiles"))
}

fn code_span_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"`[^`]*`").expect("hardcoded pattern compiles"))
}

fn label_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?im)^\s*(?:wallet|miner[_\-\s]?id|eta|timezone|github|proof|claimant|applicant)\s*[:：\-].*$",
        )
        .expect("hardcoded pattern compiles")
    })
}

fn token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[a-z0-9_]{3,}").expect("hardcoded pattern compiles"))
}

/// Normalize a claim body for similarity matching: lower-case, mask URLs,
/// mentions and inline code, drop label lines and stop tokens, collapse
/// whitespace.
pub fn normalize_body(text: &str) -> String {
    let lowered = text.to_lowercase();
    let masked = url_re().replace_all(&lowered, " ");
    let masked = mention_re().replace_all(&masked, " user ");
    let masked = label_line_re().replace_all(&masked, " ");
    let masked = code_span_re().replace_all(&masked, " token ");

    let cleaned: String = masked
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    let tokens: Vec<&str> = token_re()
        .find_iter(&cleaned)
        .map(|m| m.as_str())
        .filter(|tok| !STOP_TOKENS.contains(tok))
        .collect();
    tokens.join(" ")
}

/// Canonicalize a single proof link: lower-case scheme and host, strip
/// trailing punctuation, the fragment, and a trailing slash.
pub fn canonical_link(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches([')', '.', ',', ';', '!', '?']);
    let without_fragment = match trimmed.split_once('#') {
        Some((head, _)) => head,
        None => trimmed,
    };

    let (scheme_host, path) = match without_fragment.find("://") {
        Some(idx) => {
            let after = &without_fragment[idx + 3..];
            match after.find('/') {
                Some(slash) => (
                    &without_fragment[..idx + 3 + slash],
                    &without_fragment[idx + 3 + slash..],
                ),
                None => (without_fragment, ""),
            }
        }
        None => (without_fragment, ""),
    };

    let mut canonical = scheme_host.to_lowercase();
    let path = path.trim_end_matches('/');
    canonical.push_str(path);
    canonical
}

/// Canonicalize, deduplicate, and sort a set of proof links.
pub fn canonicalize_links(links: &[String]) -> Vec<String> {
    let mut out: Vec<String> = links
        .iter()
        .map(|l| canonical_link(l))
        .filter(|l| !l.is_empty())
        .collect();
    out.sort_unstable();
    out.dedup();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_masks_urls_and_mentions() {
        let out = normalize_body("I will fix this, see https://example.com/x and ping @alice");
        assert!(!out.contains("https"));
        assert!(!out.contains("alice"));
        assert!(out.contains("user"));
        assert!(out.contains("fix"));
    }

    #[test]
    fn body_drops_label_lines() {
        let out = normalize_body("Working on it now\nWallet: rtc_alice_01\nETA: tomorrow");
        assert!(!out.contains("rtc_alice_01"));
        assert!(!out.contains("tomorrow"));
        assert!(out.contains("working"));
    }

    #[test]
    fn body_drops_stop_tokens_and_short_tokens() {
        let out = normalize_body("Claiming this bounty, am ready to start");
        assert_eq!(out, "");
    }

    #[test]
    fn identical_templates_normalize_identically() {
        let a = normalize_body("Claiming!\nWallet: rtc_a\nI have deep expertise in parsers.");
        let b = normalize_body("claiming\nwallet: rtc_b\nI have deep expertise in parsers!");
        assert_eq!(a, b);
        assert!(!a.is_empty());
    }

    #[test]
    fn link_canonicalization_is_case_and_slash_insensitive() {
        assert_eq!(
            canonical_link("HTTPS://GitHub.com/Alice/Demo/"),
            "https://github.com/Alice/Demo"
        );
        assert_eq!(
            canonical_link("https://example.com/a#section"),
            "https://example.com/a"
        );
        assert_eq!(
            canonical_link("https://example.com/a),"),
            "https://example.com/a"
        );
    }

    #[test]
    fn link_path_case_is_preserved() {
        // Only scheme and host are case-insensitive per URL semantics.
        assert_eq!(
            canonical_link("https://example.com/CaseSensitive"),
            "https://example.com/CaseSensitive"
        );
    }

    #[test]
    fn links_deduplicate_after_canonicalization() {
        let links = vec![
            "https://example.com/a/".to_string(),
            "https://EXAMPLE.com/a".to_string(),
            "https://example.com/b".to_string(),
        ];
        assert_eq!(
            canonicalize_links(&links),
            vec![
                "https://example.com/a".to_string(),
                "https://example.com/b".to_string(),
            ]
        );
    }
}
