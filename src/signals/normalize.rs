/// Clean a raw block before classification.
///
/// Emoji markers and any other non-ASCII characters are dropped, every line is
/// trimmed and blank lines are removed. An empty result means the block has
/// nothing to parse.
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii)
        .collect::<String>()
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_decorative_glyphs() {
        let raw = "💎 BTC/USDT LONG 🟢\n⚡️Entry: 45000\n🔴 Stop: 44000 ✳️";
        assert_eq!(normalize(raw), "BTC/USDT LONG\nEntry: 45000\nStop: 44000");
    }

    #[test]
    fn strips_non_ascii_text() {
        let raw = "BTC/USDT LONG\nورود: 45000\nTarget: 48000";
        assert_eq!(normalize(raw), "BTC/USDT LONG\n: 45000\nTarget: 48000");
    }

    #[test]
    fn drops_blank_lines_and_trims() {
        let raw = "\n\n   BTC/USDT   \r\n\n\t\nEntry: 1  \n";
        assert_eq!(normalize(raw), "BTC/USDT\nEntry: 1");
    }

    #[test]
    fn keeps_ascii_punctuation() {
        assert_eq!(normalize("Entry: 45000-46000"), "Entry: 45000-46000");
        assert_eq!(normalize("Entry: 1e-5"), "Entry: 1e-5");
    }

    #[test]
    fn whitespace_only_is_empty() {
        for raw in ["", "   ", "\n\n\n", "  \n  \n  "] {
            assert_eq!(normalize(raw), "");
        }
    }

    #[test]
    fn normalization_is_idempotent() {
        let raw = "  🚀 ETH/USDT SHORT\n\n Entry 3200 \n TP: 3000, 2900\n";
        let once = normalize(raw);
        assert_eq!(normalize(&once), once);
    }
}
