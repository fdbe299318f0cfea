//! Flag parsing helpers for the `hackscout` binary. Flags are
//! `--name value` pairs plus bare switches like `--dry-run`.

/// Value of `--name value`, if present.
pub fn flag_value(args: &[String], name: &str) -> Option<String> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

/// Whether a bare switch like `--dry-run` is present.
pub fn has_flag(args: &[String], name: &str) -> bool {
    args.iter().any(|a| a == name)
}

/// Parsed `--name value` as an integer, or `default` when absent.
pub fn flag_usize(args: &[String], name: &str, default: usize) -> anyhow::Result<usize> {
    match flag_value(args, name) {
        Some(v) => v
            .parse()
            .map_err(|_| anyhow::anyhow!("{name} expects a non-negative integer, got {v}")),
        None => Ok(default),
    }
}

/// Parsed `--name value` as a signed integer, or `default` when absent.
pub fn flag_i64(args: &[String], name: &str, default: i64) -> anyhow::Result<i64> {
    match flag_value(args, name) {
        Some(v) => v
            .parse()
            .map_err(|_| anyhow::anyhow!("{name} expects an integer, got {v}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn flag_value_returns_following_arg() {
        let args = args(&["--query", "rust devs", "--dry-run"]);
        assert_eq!(flag_value(&args, "--query").as_deref(), Some("rust devs"));
        assert_eq!(flag_value(&args, "--limit"), None);
    }

    #[test]
    fn has_flag_matches_exact_switch() {
        let args = args(&["--dry-run", "--limit", "5"]);
        assert!(has_flag(&args, "--dry-run"));
        assert!(!has_flag(&args, "--dry"));
    }

    #[test]
    fn numeric_flags_fall_back_to_defaults_and_reject_garbage() {
        let args = args(&["--limit", "7"]);
        assert_eq!(flag_usize(&args, "--limit", 10).unwrap(), 7);
        assert_eq!(flag_usize(&args, "--count", 10).unwrap(), 10);
        assert_eq!(flag_i64(&args, "--count", -1).unwrap(), -1);

        let bad = self::args(&["--limit", "seven"]);
        assert!(flag_usize(&bad, "--limit", 10).is_err());
    }
}
