//! Common utility functions shared across the codebase.

/// Strip exactly one trailing `.ts` or `.js` suffix from an import path.
///
/// Only a single suffix is removed, so `user.model.ts` becomes `user.model`
/// and `user.model` stays untouched.
///
/// # Examples
///
/// ```
/// use remodel::utils::strip_source_suffix;
///
/// assert_eq!(strip_source_suffix("user.ts"), "user");
/// assert_eq!(strip_source_suffix("user.model.js"), "user.model");
/// assert_eq!(strip_source_suffix("user"), "user");
/// ```
pub fn strip_source_suffix(path: &str) -> &str {
    path.strip_suffix(".ts")
        .or_else(|| path.strip_suffix(".js"))
        .unwrap_or(path)
}

/// Convert a single name to kebab-case.
///
/// Handles camelCase, PascalCase, snake_case, and acronym runs:
/// `BaseModel` -> `base-model`, `adminUser` -> `admin-user`,
/// `URLShortener` -> `url-shortener`.
pub fn kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let chars: Vec<char> = name.chars().collect();

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == ' ' {
            if !out.ends_with('-') && !out.is_empty() {
                out.push('-');
            }
            continue;
        }
        if c.is_uppercase() {
            let prev_lower = i > 0 && chars[i - 1].is_lowercase();
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let prev_upper = i > 0 && chars[i - 1].is_uppercase();
            if (prev_lower || (prev_upper && next_lower)) && !out.ends_with('-') && !out.is_empty()
            {
                out.push('-');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }

    out
}

/// Kebab-case every `/`-separated segment of an import path remainder.
pub fn kebab_case_path(path: &str) -> String {
    path.split('/')
        .map(kebab_case)
        .collect::<Vec<_>>()
        .join("/")
}

/// Convert a kebab-case (or snake_case) name to PascalCase.
///
/// Only the last `/` segment is used so nested canonical names still
/// produce a usable identifier: `admin/user` -> `User`.
pub fn pascal_case(name: &str) -> String {
    let last = name.rsplit('/').next().unwrap_or(name);
    let mut out = String::with_capacity(last.len());
    let mut upper_next = true;

    for c in last.chars() {
        if c == '-' || c == '_' || c == '.' {
            upper_next = true;
            continue;
        }
        if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }

    out
}

/// Strip the common leading whitespace from every non-blank line.
///
/// Used when relocating class members so the original relative indentation
/// survives while the absolute indentation is normalized.
pub fn dedent(text: &str) -> String {
    let common = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    text.lines()
        .map(|line| {
            if line.len() >= common {
                &line[common..]
            } else {
                line.trim_start()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Indent every non-blank line by `spaces` spaces.
pub fn indent(text: &str, spaces: usize) -> String {
    let pad = " ".repeat(spaces);
    text.lines()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("{pad}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::utils::*;

    #[test]
    fn test_strip_source_suffix() {
        assert_eq!(strip_source_suffix("user.ts"), "user");
        assert_eq!(strip_source_suffix("user.js"), "user");
        assert_eq!(strip_source_suffix("user.model.ts"), "user.model");
        assert_eq!(strip_source_suffix("user"), "user");
        assert_eq!(strip_source_suffix("dir/user.js"), "dir/user");
    }

    #[test]
    fn test_kebab_case() {
        assert_eq!(kebab_case("user"), "user");
        assert_eq!(kebab_case("BaseModel"), "base-model");
        assert_eq!(kebab_case("adminUser"), "admin-user");
        assert_eq!(kebab_case("URLShortener"), "url-shortener");
        assert_eq!(kebab_case("already-kebab"), "already-kebab");
        assert_eq!(kebab_case("snake_case"), "snake-case");
    }

    #[test]
    fn test_kebab_case_path() {
        assert_eq!(kebab_case_path("admin/BaseUser"), "admin/base-user");
        assert_eq!(kebab_case_path("user"), "user");
    }

    #[test]
    fn test_pascal_case() {
        assert_eq!(pascal_case("user"), "User");
        assert_eq!(pascal_case("base-model"), "BaseModel");
        assert_eq!(pascal_case("admin/user"), "User");
        assert_eq!(pascal_case("snake_case"), "SnakeCase");
    }

    #[test]
    fn test_dedent() {
        let text = "    get displayName() {\n      return this.name;\n    }";
        assert_eq!(dedent(text), "get displayName() {\n  return this.name;\n}");
    }

    #[test]
    fn test_indent_skips_blank_lines() {
        assert_eq!(indent("a\n\nb", 2), "  a\n\n  b");
    }
}
