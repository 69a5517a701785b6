// ABOUTME: Context-menu policy: turns a right-click into an ordered action list.
// ABOUTME: Workspace links gain open-in-new-window actions with a product fallback.

use serde::Deserialize;

use crate::catalog::{is_in_workspace, ProductCatalog};

/// Right-click parameters forwarded from the webview bridge.
///
/// Example:
/// ```rust,ignore
/// let request = ContextMenuRequest {
///     x: 24.0,
///     y: 310.0,
///     link_url: "https://acme.atlassian.net/wiki/home".to_string(),
///     page_url: "https://acme.atlassian.net/jira".to_string(),
///     selection_text: String::new(),
///     is_editable: false,
///     can_go_back: true,
///     can_go_forward: false,
/// };
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextMenuRequest {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub link_url: String,
    #[serde(default)]
    pub page_url: String,
    #[serde(default)]
    pub selection_text: String,
    #[serde(default)]
    pub is_editable: bool,
    #[serde(default)]
    pub can_go_back: bool,
    #[serde(default)]
    pub can_go_forward: bool,
}

/// One entry in the menu, in display order.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextAction {
    Copy,
    Cut,
    Paste,
    Separator,
    OpenInNewWindow {
        url: String,
        product_id: String,
        title: String,
    },
    OpenInBackground {
        url: String,
        product_id: String,
        title: String,
    },
    Back { enabled: bool },
    Forward { enabled: bool },
    Reload,
    InspectElement { x: f64, y: f64 },
}

/// Builds the ordered action list for a right-click. Links whose product
/// cannot be identified still get open actions, carrying the generic
/// workspace descriptor.
pub fn build_context_actions(
    catalog: &ProductCatalog,
    entry_url: &str,
    request: &ContextMenuRequest,
    dev_tools: bool,
) -> Vec<ContextAction> {
    let mut actions = Vec::new();

    if !request.selection_text.is_empty() {
        actions.push(ContextAction::Copy);
    }
    if request.is_editable {
        if !request.selection_text.is_empty() {
            actions.push(ContextAction::Cut);
        }
        actions.push(ContextAction::Paste);
    }

    let workspace_link =
        !request.link_url.is_empty() && is_in_workspace(&request.link_url, entry_url);
    if workspace_link {
        if !actions.is_empty() {
            actions.push(ContextAction::Separator);
        }
        let product = catalog
            .identify_product(&request.link_url)
            .unwrap_or_else(|| catalog.generic_product());
        actions.push(ContextAction::OpenInNewWindow {
            url: request.link_url.clone(),
            product_id: product.id.to_string(),
            title: format!("Open {} in New Window", product.name),
        });
        actions.push(ContextAction::OpenInBackground {
            url: request.link_url.clone(),
            product_id: product.id.to_string(),
            title: format!("Open {} in Background", product.name),
        });
    }

    if !actions.is_empty() {
        actions.push(ContextAction::Separator);
    }
    actions.push(ContextAction::Back {
        enabled: request.can_go_back,
    });
    actions.push(ContextAction::Forward {
        enabled: request.can_go_forward,
    });
    actions.push(ContextAction::Reload);

    if dev_tools {
        actions.push(ContextAction::Separator);
        actions.push(ContextAction::InspectElement {
            x: request.x,
            y: request.y,
        });
    }

    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DEFAULT_ENTRY_URL;

    fn request() -> ContextMenuRequest {
        ContextMenuRequest {
            x: 0.0,
            y: 0.0,
            link_url: String::new(),
            page_url: "https://acme.atlassian.net/jira".to_string(),
            selection_text: String::new(),
            is_editable: false,
            can_go_back: false,
            can_go_forward: false,
        }
    }

    #[test]
    fn test_plain_page_gets_navigation_actions_only() {
        let catalog = ProductCatalog::new();
        let actions = build_context_actions(&catalog, DEFAULT_ENTRY_URL, &request(), false);
        assert_eq!(
            actions,
            vec![
                ContextAction::Back { enabled: false },
                ContextAction::Forward { enabled: false },
                ContextAction::Reload,
            ]
        );
    }

    #[test]
    fn test_selection_adds_copy_and_editable_adds_cut_paste() {
        let catalog = ProductCatalog::new();
        let mut req = request();
        req.selection_text = "DEV-1".to_string();
        req.is_editable = true;

        let actions = build_context_actions(&catalog, DEFAULT_ENTRY_URL, &req, false);
        assert_eq!(&actions[..3], &[ContextAction::Copy, ContextAction::Cut, ContextAction::Paste]);
    }

    #[test]
    fn test_editable_without_selection_skips_cut() {
        let catalog = ProductCatalog::new();
        let mut req = request();
        req.is_editable = true;

        let actions = build_context_actions(&catalog, DEFAULT_ENTRY_URL, &req, false);
        assert_eq!(actions[0], ContextAction::Paste);
        assert!(!actions.contains(&ContextAction::Cut));
        assert!(!actions.contains(&ContextAction::Copy));
    }

    #[test]
    fn test_workspace_link_gets_open_actions_with_product_name() {
        let catalog = ProductCatalog::new();
        let mut req = request();
        req.link_url = "https://acme.atlassian.net/wiki/spaces/DEV".to_string();

        let actions = build_context_actions(&catalog, DEFAULT_ENTRY_URL, &req, false);
        assert!(actions.iter().any(|a| matches!(
            a,
            ContextAction::OpenInNewWindow { product_id, title, .. }
                if product_id == "confluence" && title == "Open Confluence in New Window"
        )));
        assert!(actions.iter().any(|a| matches!(
            a,
            ContextAction::OpenInBackground { product_id, .. } if product_id == "confluence"
        )));
    }

    #[test]
    fn test_unidentified_workspace_link_falls_back_to_generic_product() {
        let catalog = ProductCatalog::new();
        let entry = "https://jira.internal.example.com";
        let mut req = request();
        // In-workspace through the entry prefix, but no product pattern and
        // not a provider host: the action still succeeds with the generic
        // descriptor attached.
        req.link_url = format!("{}/browse/DEV-1", entry);

        let actions = build_context_actions(&catalog, entry, &req, false);
        let open = actions.iter().find_map(|a| match a {
            ContextAction::OpenInNewWindow { product_id, .. } => Some(product_id.clone()),
            _ => None,
        });
        assert_eq!(open.as_deref(), Some("atlassian"));
    }

    #[test]
    fn test_external_link_gets_no_open_actions() {
        let catalog = ProductCatalog::new();
        let mut req = request();
        req.link_url = "https://example.com/docs".to_string();

        let actions = build_context_actions(&catalog, DEFAULT_ENTRY_URL, &req, false);
        assert!(!actions
            .iter()
            .any(|a| matches!(a, ContextAction::OpenInNewWindow { .. })));
    }

    #[test]
    fn test_inspect_element_only_in_dev_builds() {
        let catalog = ProductCatalog::new();
        let prod = build_context_actions(&catalog, DEFAULT_ENTRY_URL, &request(), false);
        assert!(!prod
            .iter()
            .any(|a| matches!(a, ContextAction::InspectElement { .. })));

        let dev = build_context_actions(&catalog, DEFAULT_ENTRY_URL, &request(), true);
        assert!(matches!(
            dev.last(),
            Some(ContextAction::InspectElement { .. })
        ));
    }

    #[test]
    fn test_back_forward_enabled_flags_pass_through() {
        let catalog = ProductCatalog::new();
        let mut req = request();
        req.can_go_back = true;

        let actions = build_context_actions(&catalog, DEFAULT_ENTRY_URL, &req, false);
        assert!(actions.contains(&ContextAction::Back { enabled: true }));
        assert!(actions.contains(&ContextAction::Forward { enabled: false }));
    }
}
