use glob::Pattern;

use super::Suggestion;

/// One rule of a filter expression, matched against suggestion file paths
#[derive(Debug, Clone)]
pub struct FilterRule {
    pub include: bool,
    pub pattern: Pattern,
}

/// Parse a comma-separated filter expression like `+src/**,-*.lock` into a
/// list of rules. A bare pattern means include. Invalid globs are skipped.
pub fn parse_filter_expr(expr: &str) -> Vec<FilterRule> {
    let mut rules = Vec::new();
    for segment in expr.split(',') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }

        let (include, body) = if let Some(rest) = segment.strip_prefix('-') {
            (false, rest.trim())
        } else if let Some(rest) = segment.strip_prefix('+') {
            (true, rest.trim())
        } else {
            (true, segment)
        };

        if body.is_empty() {
            continue;
        }

        if let Ok(pattern) = Pattern::new(body) {
            rules.push(FilterRule { include, pattern });
        }
        // Invalid globs silently skipped
    }
    rules
}

/// Keep the suggestions whose path survives the rules. With no include
/// rules everything starts included and excludes carve away; with any
/// include rule, a path must match one to stay.
pub fn filter_suggestions(suggestions: Vec<Suggestion>, rules: &[FilterRule]) -> Vec<Suggestion> {
    if rules.is_empty() {
        return suggestions;
    }
    let has_includes = rules.iter().any(|r| r.include);

    suggestions
        .into_iter()
        .filter(|s| {
            let mut keep = !has_includes;
            for rule in rules {
                if rule.pattern.matches(&s.file_path) {
                    keep = rule.include;
                }
            }
            keep
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(path: &str) -> Suggestion {
        Suggestion {
            file_path: path.into(),
            line_number: 1,
            suggested_code: String::new(),
            description: None,
        }
    }

    fn paths(suggestions: &[Suggestion]) -> Vec<&str> {
        suggestions.iter().map(|s| s.file_path.as_str()).collect()
    }

    #[test]
    fn include_only_keeps_matches() {
        let rules = parse_filter_expr("*.rs");
        let kept = filter_suggestions(vec![s("a.rs"), s("b.lock"), s("c.rs")], &rules);
        assert_eq!(paths(&kept), vec!["a.rs", "c.rs"]);
    }

    #[test]
    fn exclude_only_removes_matches() {
        let rules = parse_filter_expr("-*.lock");
        let kept = filter_suggestions(vec![s("a.rs"), s("b.lock")], &rules);
        assert_eq!(paths(&kept), vec!["a.rs"]);
    }

    #[test]
    fn later_rules_override_earlier() {
        let rules = parse_filter_expr("+src/**,-src/gen/**");
        let kept = filter_suggestions(
            vec![s("src/a.rs"), s("src/gen/b.rs"), s("docs/c.md")],
            &rules,
        );
        assert_eq!(paths(&kept), vec!["src/a.rs"]);
    }

    #[test]
    fn empty_expression_keeps_everything() {
        let kept = filter_suggestions(vec![s("a.rs")], &parse_filter_expr(""));
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn invalid_glob_is_skipped() {
        let rules = parse_filter_expr("[bad,*.rs");
        assert_eq!(rules.len(), 1);
        assert!(rules[0].pattern.matches("a.rs"));
    }
}
