use std::sync::OnceLock;

use regex::{Captures, Regex};

fn captures(mask: &str) -> Option<Captures<'_>> {
    static MASK: OnceLock<Regex> = OnceLock::new();
    MASK.get_or_init(|| {
        Regex::new("^:?(?P<nick>[^!@]*)(?:!(?P<user>[^@]*))?(?:@(?P<host>.*))?$").unwrap()
    })
    .captures(mask)
}

fn part(mask: &str, name: &str) -> String {
    captures(mask)
        .and_then(|caps| caps.name(name).map(|m| m.as_str().to_string()))
        .unwrap_or_default()
}

pub fn nick_from_mask(mask: &str) -> String {
    part(mask, "nick")
}

pub fn user_from_mask(mask: &str) -> String {
    part(mask, "user")
}

pub fn host_from_mask(mask: &str) -> String {
    part(mask, "host")
}

pub fn hostmask(nick: &str, user: &str, host: &str) -> String {
    format!("{}!{}@{}", nick, user, host)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_mask() {
        assert_eq!(nick_from_mask("alice!ali@example.org"), "alice");
        assert_eq!(user_from_mask("alice!ali@example.org"), "ali");
        assert_eq!(host_from_mask("alice!ali@example.org"), "example.org");
    }

    #[test]
    fn prefixed_mask() {
        assert_eq!(nick_from_mask(":alice!~ali@127.0.0.1"), "alice");
        assert_eq!(user_from_mask(":alice!~ali@127.0.0.1"), "~ali");
    }

    #[test]
    fn bare_nick() {
        assert_eq!(nick_from_mask("alice"), "alice");
        assert_eq!(user_from_mask("alice"), "");
        assert_eq!(host_from_mask("alice"), "");
    }

    #[test]
    fn nick_and_host() {
        assert_eq!(nick_from_mask("alice@host"), "alice");
        assert_eq!(user_from_mask("alice@host"), "");
        assert_eq!(host_from_mask("alice@host"), "host");
    }

    #[test]
    fn format() {
        assert_eq!(hostmask("a", "b", "c"), "a!b@c");
    }
}
