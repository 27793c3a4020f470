//! Table name wrapping
//!
//! A wrapped table name looks like `{{%post}}`. The `%` marks the place where
//! the collaborator inserts its table prefix when it resolves the name, so
//! migrations stay prefix-agnostic.

/// Wrap a table name as `{{%name}}`
///
/// Existing wrap markers are stripped first, so the operation is idempotent:
/// `wrap(&wrap(x)) == wrap(x)`.
pub fn wrap(name: &str) -> String {
    let bare = name
        .trim_start_matches(['{', '%'])
        .trim_end_matches('}');
    format!("{{{{%{bare}}}}}")
}

/// Wrap `name` only when `enabled`
pub fn auto_wrap(name: &str, enabled: bool) -> String {
    if enabled {
        wrap(name)
    } else {
        name.to_string()
    }
}

/// Whether the name carries `{{ }}` markers
pub fn is_wrapped(name: &str) -> bool {
    name.contains("{{") && name.contains("}}")
}

/// Resolve every `{{name}}` / `{{%name}}` in `name` to a raw table name
///
/// `%` is replaced with `prefix`. Text outside the markers is kept, and a
/// name without markers is returned unchanged.
pub fn resolve(name: &str, prefix: &str) -> String {
    if !is_wrapped(name) {
        return name.to_string();
    }
    let mut out = String::with_capacity(name.len() + prefix.len());
    let mut rest = name;
    while let Some(start) = rest.find("{{") {
        let Some(len) = rest[start + 2..].find("}}") else {
            break;
        };
        out.push_str(&rest[..start]);
        out.push_str(&rest[start + 2..start + 2 + len].replace('%', prefix));
        rest = &rest[start + 2 + len + 2..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_bare_name() {
        assert_eq!(wrap("post"), "{{%post}}");
    }

    #[test]
    fn test_wrap_is_idempotent() {
        for name in ["post", "{{%post}}", "{{post}}", "%post", "post}}", "user_profile"] {
            let once = wrap(name);
            assert_eq!(wrap(&once), once, "wrap not idempotent for {name}");
        }
    }

    #[test]
    fn test_auto_wrap_disabled_keeps_name() {
        assert_eq!(auto_wrap("post", false), "post");
        assert_eq!(auto_wrap("post", true), "{{%post}}");
    }

    #[test]
    fn test_resolve_substitutes_prefix() {
        assert_eq!(resolve("{{%post}}", "tbl_"), "tbl_post");
        assert_eq!(resolve("{{%post}}", ""), "post");
        assert_eq!(resolve("{{post}}", "tbl_"), "post");
        assert_eq!(resolve("post", "tbl_"), "post");
        assert_eq!(resolve("public.{{%post}}", "x_"), "public.x_post");
    }

    #[test]
    fn test_resolve_unterminated_marker_is_left_alone() {
        assert_eq!(resolve("{{%post", "x_"), "{{%post");
        assert_eq!(resolve("%post}}", "x_"), "%post}}");
    }

    #[test]
    fn test_is_wrapped() {
        assert!(is_wrapped("{{%post}}"));
        assert!(!is_wrapped("post"));
    }
}
