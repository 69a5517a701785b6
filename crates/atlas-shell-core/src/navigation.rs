// ABOUTME: Navigation routing policy for webview windows.
// ABOUTME: Decides between in-place navigation, allowing, and external handoff.

use crate::catalog::is_in_workspace;

/// Disposition for a request to open a separate browsing context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewWindowDisposition {
    /// Navigate the requesting window in place instead of opening a context.
    NavigateInPlace,
    /// Hand the URL to the user's default browser; never silently dropped.
    OpenExternal,
}

/// Disposition for an in-page navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationDisposition {
    Allow,
    OpenExternal,
}

pub fn route_new_window(entry_url: &str, target: &str) -> NewWindowDisposition {
    if is_in_workspace(target, entry_url) {
        NewWindowDisposition::NavigateInPlace
    } else {
        NewWindowDisposition::OpenExternal
    }
}

/// `page_url` is the window's last committed URL; `None` means nothing has
/// committed yet (the shell's own initial load) and is trusted. Navigations
/// originating from a non-workspace page are externalized regardless of
/// where they point.
pub fn route_navigation(
    entry_url: &str,
    page_url: Option<&str>,
    target: &str,
) -> NavigationDisposition {
    let source_in_workspace = page_url.map_or(true, |page| is_in_workspace(page, entry_url));
    if !source_in_workspace {
        return NavigationDisposition::OpenExternal;
    }
    if is_in_workspace(target, entry_url) {
        NavigationDisposition::Allow
    } else {
        NavigationDisposition::OpenExternal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DEFAULT_ENTRY_URL;

    #[test]
    fn test_new_window_request_stays_in_workspace() {
        assert_eq!(
            route_new_window(DEFAULT_ENTRY_URL, "https://acme.atlassian.net/browse/DEV-1"),
            NewWindowDisposition::NavigateInPlace
        );
    }

    #[test]
    fn test_new_window_request_externalizes_foreign_urls() {
        assert_eq!(
            route_new_window(DEFAULT_ENTRY_URL, "https://example.com/docs"),
            NewWindowDisposition::OpenExternal
        );
        assert_eq!(
            route_new_window(DEFAULT_ENTRY_URL, "not a url"),
            NewWindowDisposition::OpenExternal
        );
    }

    #[test]
    fn test_new_window_request_honors_entry_url_prefix() {
        let entry = "https://jira.internal.example.com";
        assert_eq!(
            route_new_window(entry, "https://jira.internal.example.com/browse/DEV-1"),
            NewWindowDisposition::NavigateInPlace
        );
    }

    #[test]
    fn test_new_window_request_classifies_on_target_alone() {
        // Unlike in-page navigation, a new-window request carries no source
        // page: a workspace target navigates in place even when the request
        // came from a foreign page.
        let target = "https://acme.atlassian.net/browse/DEV-1";
        assert_eq!(
            route_new_window(DEFAULT_ENTRY_URL, target),
            NewWindowDisposition::NavigateInPlace
        );
        assert_eq!(
            route_navigation(
                DEFAULT_ENTRY_URL,
                Some("https://example.com/embedded"),
                target,
            ),
            NavigationDisposition::OpenExternal,
            "the source-page rule applies to in-page navigation only"
        );
    }

    #[test]
    fn test_navigation_within_workspace_is_allowed() {
        assert_eq!(
            route_navigation(
                DEFAULT_ENTRY_URL,
                Some("https://acme.atlassian.net/jira"),
                "https://acme.atlassian.net/wiki/home",
            ),
            NavigationDisposition::Allow
        );
    }

    #[test]
    fn test_navigation_to_external_target_is_externalized() {
        assert_eq!(
            route_navigation(
                DEFAULT_ENTRY_URL,
                Some("https://acme.atlassian.net/jira"),
                "https://example.com",
            ),
            NavigationDisposition::OpenExternal
        );
    }

    #[test]
    fn test_navigation_from_foreign_page_is_externalized_even_to_workspace() {
        // Asymmetric rule: the source page governs even when the target looks
        // like it belongs in the workspace.
        assert_eq!(
            route_navigation(
                DEFAULT_ENTRY_URL,
                Some("https://example.com/embedded"),
                "https://acme.atlassian.net/jira",
            ),
            NavigationDisposition::OpenExternal
        );
    }

    #[test]
    fn test_initial_load_with_no_committed_page_is_trusted() {
        assert_eq!(
            route_navigation(DEFAULT_ENTRY_URL, None, DEFAULT_ENTRY_URL),
            NavigationDisposition::Allow
        );
    }
}
