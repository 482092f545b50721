/// Keyword heuristics for role discovery (spec §4.4: "Role discovery uses
/// keyword heuristics; unrecognized roles remain labeled by symbol").
///
/// These are hints surfaced to the LLM alongside each symbol so it can
/// assign a role without touching the underlying value; the LLM's own
/// answer is authoritative, this is a fallback when its output is silent
/// or unparseable for a given symbol.
const ROLE_KEYWORDS: &[(&str, &str)] = &[
    ("debt", "client_debt"),
    ("owe", "client_debt"),
    ("income", "client_income"),
    ("salary", "client_income"),
    ("earn", "client_income"),
    ("asset", "client_assets"),
    ("saving", "client_assets"),
    ("maximum", "upper_limit"),
    ("limit", "upper_limit"),
    ("cap", "upper_limit"),
    ("minimum", "lower_limit"),
    ("threshold", "upper_limit"),
    ("fee", "fee"),
    ("payment", "monthly_payment"),
    ("monthly", "monthly_payment"),
];

/// Scan a window of text surrounding a symbol for a recognized keyword and
/// return the role it implies, or `None` if nothing matches.
pub fn discover_role(surrounding_text: &str) -> Option<String> {
    let lower = surrounding_text.to_lowercase();
    ROLE_KEYWORDS
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, role)| role.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_debt_keyword() {
        assert_eq!(discover_role("their total debt is"), Some("client_debt".to_string()));
    }

    #[test]
    fn recognizes_limit_keyword() {
        assert_eq!(discover_role("the DRO maximum debt limit"), Some("upper_limit".to_string()));
    }

    #[test]
    fn returns_none_for_unrecognized_context() {
        assert_eq!(discover_role("a value appeared here"), None);
    }
}
