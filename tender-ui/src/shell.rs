use std::rc::Rc;

use dioxus::prelude::*;

use crate::api::{HttpBackend, TenderBackend};
use crate::components::{ProposalEditorView, SearchView};
use crate::config::{ClientConfig, RequestContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Editor,
    Search,
}

impl Screen {
    fn label(self) -> &'static str {
        match self {
            Self::Editor => "Proposal Editor",
            Self::Search => "AI Search",
        }
    }
}

const SHELL_STYLES: &str = r#"
.shell {
    display: flex;
    flex-direction: column;
    height: 100vh;
    font-family: system-ui, sans-serif;
}

.shell-nav {
    display: flex;
    gap: 0.25rem;
    padding: 0.35rem 0.75rem;
    background: var(--titlebar-bg);
    border-bottom: 1px solid var(--border-color);
}

.shell-nav-btn {
    font-size: 0.8rem;
    padding: 0.25rem 0.7rem;
    border: none;
    border-radius: 0.25rem;
    background: transparent;
    color: var(--text-secondary);
    cursor: pointer;
}

.shell-nav-btn--active {
    background: var(--hover-bg);
    color: var(--text-primary);
}

.shell-body { flex: 1; min-height: 0; }
"#;

/// Root of the client. Reads configuration and the credential once, then
/// provides the backend to every screen.
#[component]
pub fn AppShell() -> Element {
    let config = use_context_provider(ClientConfig::from_browser);
    use_context_provider(|| {
        let ctx = RequestContext::from_browser(&config);
        if !ctx.has_credential() {
            log::warn!("no stored credential; requests will be sent unauthenticated");
        }
        log::info!("backend context: {ctx:?}");
        Rc::new(HttpBackend::new(ctx)) as Rc<dyn TenderBackend>
    });

    let mut screen = use_signal(|| Screen::Editor);
    let current = screen();

    rsx! {
        style { {SHELL_STYLES} }
        div {
            class: "shell",
            nav {
                class: "shell-nav",
                for target in [Screen::Editor, Screen::Search] {
                    button {
                        class: if target == current { "shell-nav-btn shell-nav-btn--active" } else { "shell-nav-btn" },
                        onclick: move |_| screen.set(target),
                        {target.label()}
                    }
                }
            }
            div {
                class: "shell-body",
                {match current {
                    Screen::Editor => rsx! { ProposalEditorView {} },
                    Screen::Search => rsx! { SearchView {} },
                }}
            }
        }
    }
}
