//! Shared helper functions for CLI commands.

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("droom.in", 20), "droom.in");
        assert_eq!(truncate("https://www.bikewale.com/used/", 12), "https://w...");
    }
}
