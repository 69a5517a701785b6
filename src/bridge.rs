// ABOUTME: Injected bridge script for product webviews, the preload analog.
// ABOUTME: Intercepts window.open, _blank clicks, and right-clicks before page JS sees them.

/// Runs before any page script in every product window. The hosted pages are
/// remote and unmodified, so everything the shell needs from them is captured
/// here and forwarded over IPC.
pub const INIT_SCRIPT: &str = r#"
(function () {
  if (window.__ATLAS_BRIDGE__) { return; }
  window.__ATLAS_BRIDGE__ = true;

  const invoke = (cmd, args) => window.__TAURI_INTERNALS__.invoke(cmd, args);

  // window.open never yields a popup; the shell routes the URL instead.
  const nativeOpen = window.open;
  window.open = function (url) {
    if (typeof url === 'string' && url.length > 0) {
      const resolved = new URL(url, window.location.href).href;
      invoke('open_from_page', { url: resolved });
      return null;
    }
    return nativeOpen.apply(window, arguments);
  };

  // Anchor clicks targeting a new tab get the same treatment.
  document.addEventListener('click', (event) => {
    const anchor = event.target && event.target.closest ? event.target.closest('a[href]') : null;
    if (!anchor) { return; }
    const wantsNewContext = anchor.target === '_blank'
      || event.metaKey || event.ctrlKey || event.button === 1;
    if (!wantsNewContext) { return; }
    event.preventDefault();
    event.stopPropagation();
    const resolved = new URL(anchor.getAttribute('href'), window.location.href).href;
    invoke('open_from_page', { url: resolved });
  }, true);

  document.addEventListener('contextmenu', (event) => {
    event.preventDefault();
    const anchor = event.target && event.target.closest ? event.target.closest('a[href]') : null;
    const selection = window.getSelection ? String(window.getSelection()) : '';
    const editable = event.target && (event.target.isContentEditable
      || event.target.tagName === 'INPUT'
      || event.target.tagName === 'TEXTAREA');
    invoke('show_context_menu', {
      request: {
        x: event.clientX,
        y: event.clientY,
        linkUrl: anchor ? new URL(anchor.getAttribute('href'), window.location.href).href : '',
        pageUrl: window.location.href,
        selectionText: selection,
        isEditable: !!editable,
        canGoBack: window.history.length > 1,
        canGoForward: false,
      },
    });
  }, true);
})();
"#;
