use anyhow::{Context, Result};
use std::path::Path;

/// Returns all hosts from newline delimited text, e.g.
///
/// ```text
/// host0
/// host1
/// host2
/// ```
///
/// White space surrounding the hosts is stripped and empty lines are
/// discarded. Order and duplicates are kept.
pub fn parse_hosts(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|host| !host.is_empty())
        .map(str::to_string)
        .collect()
}

pub async fn load_hosts(path: &Path) -> Result<Vec<String>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("unable to open file '{}'", path.display()))?;
    Ok(parse_hosts(&text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_getting_hosts_trims_white_space() {
        let cases = [
            ("leading_space", " host1\n host2"),
            ("trailing_space", "host1  \nhost2       "),
            ("extra_space", "  host1  \n   host2     "),
            ("empty_lines", "  host1  \n \n \n  host2  \n "),
            ("crlf", "host1\r\nhost2\r\n"),
        ];

        for (name, text) in cases {
            assert_eq!(parse_hosts(text), vec!["host1", "host2"], "case {name}");
        }
    }

    #[test]
    fn test_duplicates_are_kept() {
        assert_eq!(parse_hosts("h1\nh2\nh1\n"), vec!["h1", "h2", "h1"]);
    }

    #[tokio::test]
    async fn test_load_hosts_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "i-1\n\n  i-2  ").unwrap();

        let hosts = load_hosts(file.path()).await.unwrap();
        assert_eq!(hosts, vec!["i-1", "i-2"]);
    }

    #[tokio::test]
    async fn test_missing_file_names_path() {
        let err = load_hosts(Path::new("/nonexistent/hosts.txt")).await.unwrap_err();
        assert!(err.to_string().contains("/nonexistent/hosts.txt"));
    }
}
