// ABOUTME: Stable window identity derivation for deduplicating product windows.
// ABOUTME: Identities double as Tauri window labels, so the charset is restricted.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use url::Url;

const MAX_PATH_SEGMENTS: usize = 4;

/// Derives the stable identity for a (product, url) pair: product id plus the
/// normalized hostname and up to four path segments. Deterministic and
/// infallible; two requests that normalize to the same identity are the same
/// logical window.
///
/// Example:
/// ```rust,ignore
/// let id = derive_identity("jira", "https://acme.atlassian.net/jira/projects/DEV");
/// assert_eq!(id, "jira-acme-atlassian-net-jira-projects-dev");
/// ```
pub fn derive_identity(product_id: &str, url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => {
            let host = parsed.host_str().unwrap_or("").to_lowercase();
            let mut key = format!("{}-{}", product_id, host);
            if let Some(segments) = parsed.path_segments() {
                for segment in segments.filter(|s| !s.is_empty()).take(MAX_PATH_SEGMENTS) {
                    key.push('-');
                    key.push_str(&segment.to_lowercase());
                }
            }
            sanitize_label(&key)
        }
        // Unparsable URLs still need a usable, approximately unique key; the
        // raw URL is carried through a reversible encoding.
        Err(_) => format!(
            "{}-{}",
            sanitize_label(product_id),
            URL_SAFE_NO_PAD.encode(url)
        ),
    }
}

fn sanitize_label(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_url_same_identity() {
        let a = derive_identity("jira", "https://acme.atlassian.net/jira/projects/DEV");
        let b = derive_identity("jira", "https://acme.atlassian.net/jira/projects/DEV");
        assert_eq!(a, b);
    }

    #[test]
    fn test_identity_normalizes_case() {
        let a = derive_identity("jira", "https://ACME.Atlassian.Net/Jira/Projects");
        let b = derive_identity("jira", "https://acme.atlassian.net/jira/projects");
        assert_eq!(a, b);
    }

    #[test]
    fn test_identity_truncates_to_four_path_segments() {
        let a = derive_identity("jira", "https://acme.atlassian.net/a/b/c/d/e");
        let b = derive_identity("jira", "https://acme.atlassian.net/a/b/c/d/other");
        assert_eq!(a, b, "segments past the fourth do not contribute");

        let c = derive_identity("jira", "https://acme.atlassian.net/a/b/c/other");
        assert_ne!(a, c);
    }

    #[test]
    fn test_identity_distinguishes_products() {
        let a = derive_identity("jira", "https://acme.atlassian.net/x");
        let b = derive_identity("confluence", "https://acme.atlassian.net/x");
        assert_ne!(a, b);
    }

    #[test]
    fn test_identity_fallback_on_parse_failure() {
        let a = derive_identity("jira", "not a url");
        let b = derive_identity("jira", "not a url");
        assert_eq!(a, b, "fallback must stay deterministic");

        let c = derive_identity("jira", "also not a url");
        assert_ne!(a, c, "fallback must preserve uniqueness");
        assert!(a.starts_with("jira-"));
    }

    #[test]
    fn test_identity_is_label_safe() {
        let cases = [
            derive_identity("jira", "https://acme.atlassian.net/jira/projects?filter=1#top"),
            derive_identity("jira", "no scheme at all"),
            derive_identity("teams", "https://teams.atlassian.com/people/1234"),
        ];
        for identity in cases {
            assert!(
                identity
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'),
                "identity must be a valid window label: {}",
                identity
            );
        }
    }
}
