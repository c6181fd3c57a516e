use chat_warden::rules::{evaluate, LinkAllowMatch, RuleSet, Settings, Verdict};

fn rules(words: &[&str], links: &[&str]) -> RuleSet {
    RuleSet {
        forbidden_words: words.iter().map(|w| w.to_string()).collect(),
        allowed_links: links.iter().map(|l| l.to_string()).collect(),
    }
}

#[test]
fn exact_token_match_triggers_word_verdict() {
    let verdict = evaluate("don't spam here", &rules(&["spam"], &[]), &Settings::default());
    assert_eq!(verdict, Verdict::ForbiddenWord("spam".to_string()));
}

#[test]
fn substring_of_a_token_does_not_match() {
    let verdict = evaluate("that spammer is back", &rules(&["spam"], &[]), &Settings::default());
    assert_eq!(verdict, Verdict::Allow);
}

#[test]
fn word_matching_is_case_insensitive() {
    let verdict = evaluate("DON'T SPAM HERE", &rules(&["spam"], &[]), &Settings::default());
    assert_eq!(verdict, Verdict::ForbiddenWord("spam".to_string()));
}

#[test]
fn word_violation_wins_over_link_violation() {
    let verdict = evaluate(
        "spam https://evil.example",
        &rules(&["spam"], &[]),
        &Settings::default(),
    );
    assert_eq!(verdict, Verdict::ForbiddenWord("spam".to_string()));
}

#[test]
fn link_without_allowlist_entry_violates() {
    let verdict = evaluate(
        "check this https://evil.example",
        &rules(&[], &[]),
        &Settings::default(),
    );
    assert_eq!(verdict, Verdict::ForbiddenLink);
}

#[test]
fn plain_http_link_violates_too() {
    let verdict = evaluate("http://evil.example", &rules(&[], &[]), &Settings::default());
    assert_eq!(verdict, Verdict::ForbiddenLink);
}

#[test]
fn exact_allowlisted_link_is_exempt() {
    let ruleset = rules(&[], &["https://example.com/rules"]);
    let settings = Settings::default();
    assert_eq!(evaluate("https://example.com/rules", &ruleset, &settings), Verdict::Allow);
    // Surrounding whitespace is trimmed before the comparison.
    assert_eq!(
        evaluate("  https://example.com/rules  ", &ruleset, &settings),
        Verdict::Allow
    );
}

#[test]
fn allowlist_entry_inside_longer_text_does_not_exempt_in_exact_mode() {
    let verdict = evaluate(
        "see https://example.com/rules please",
        &rules(&[], &["https://example.com/rules"]),
        &Settings::default(),
    );
    assert_eq!(verdict, Verdict::ForbiddenLink);
}

#[test]
fn substring_mode_exempts_text_containing_an_entry() {
    let settings = Settings {
        link_allow_match: LinkAllowMatch::Substring,
        ..Settings::default()
    };
    let verdict = evaluate(
        "see https://example.com/rules please",
        &rules(&[], &["https://example.com/rules"]),
        &settings,
    );
    assert_eq!(verdict, Verdict::Allow);
}

#[test]
fn disabling_anti_links_allows_every_link() {
    let settings = Settings {
        anti_links: false,
        ..Settings::default()
    };
    let verdict = evaluate("https://evil.example", &rules(&[], &[]), &settings);
    assert_eq!(verdict, Verdict::Allow);
}

#[test]
fn empty_and_whitespace_text_never_violate() {
    let ruleset = rules(&["spam"], &[]);
    let settings = Settings::default();
    assert_eq!(evaluate("", &ruleset, &settings), Verdict::Allow);
    assert_eq!(evaluate("   \n\t ", &ruleset, &settings), Verdict::Allow);
}

#[test]
fn evaluation_is_deterministic() {
    let ruleset = rules(&["spam", "scam"], &["https://example.com/rules"]);
    let settings = Settings::default();
    let text = "a scam and some spam";
    assert_eq!(
        evaluate(text, &ruleset, &settings),
        evaluate(text, &ruleset, &settings)
    );
}
