use std::path::PathBuf;

/// Prefix of the `--progress-template` lines yt-dlp is asked to print.
pub const PROGRESS_PREFIX: &str = "progress:";
/// Prefix of the `--print after_move:` line carrying the final file path.
pub const SAVED_PREFIX: &str = "saved:";

/// Parses `progress: 42.5%` into `0.425`. Values are clamped to 0.0..=1.0.
pub fn parse_progress_from_line(line: &str) -> Option<f32> {
    let rest = line.trim().strip_prefix(PROGRESS_PREFIX)?;
    let number = rest.trim().strip_suffix('%')?;
    let v = number.trim().parse::<f32>().ok()?;
    Some((v / 100.0).clamp(0.0, 1.0))
}

/// Path yt-dlp wrote the finished file to, from a `saved:<path>` line.
pub fn parse_saved_path(line: &str) -> Option<PathBuf> {
    let rest = line.trim_end_matches(['\r', '\n']).strip_prefix(SAVED_PREFIX)?;
    let path = rest.trim();
    if path.is_empty() || path == "NA" {
        return None;
    }
    Some(PathBuf::from(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_line_is_a_fraction() {
        assert_eq!(parse_progress_from_line("progress: 50.0%"), Some(0.5));
        assert_eq!(parse_progress_from_line("progress:100%"), Some(1.0));
        let v = parse_progress_from_line("  progress:  7.5% ").unwrap();
        assert!((v - 0.075).abs() < 1e-6);
        assert_eq!(parse_progress_from_line("progress: 250%"), Some(1.0));
    }

    #[test]
    fn unrelated_or_unparseable_lines_are_ignored() {
        assert_eq!(parse_progress_from_line("[youtube] abc: Downloading webpage"), None);
        assert_eq!(parse_progress_from_line("progress: N/A"), None);
        assert_eq!(parse_progress_from_line("progress: 12.0"), None);
    }

    #[test]
    fn saved_line_yields_path() {
        assert_eq!(
            parse_saved_path("saved:/music/Some Song [abc].webm"),
            Some(PathBuf::from("/music/Some Song [abc].webm"))
        );
        assert_eq!(parse_saved_path("saved:NA"), None);
        assert_eq!(parse_saved_path("progress: 3.0%"), None);
    }
}
