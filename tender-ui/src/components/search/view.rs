use std::rc::Rc;

use dioxus::prelude::*;
use shared_types::QueryMode;

use super::history::HistoryTicket;
use super::session::{health_line, SearchSession, SEARCH_MODES};
use crate::api::TenderBackend;
use crate::components::editor::styles::format_score;
use crate::config::ClientConfig;

const SEARCH_VIEW_STYLES: &str = r#"
.search-root {
    display: flex;
    height: 100%;
    background: var(--window-bg);
    color: var(--text-primary);
    overflow: hidden;
}

.search-main {
    flex: 1;
    display: flex;
    flex-direction: column;
    gap: 0.75rem;
    padding: 1rem;
    overflow-y: auto;
    min-width: 0;
}

.search-bar {
    display: flex;
    gap: 0.4rem;
}

.search-input {
    flex: 1;
    font-size: 0.9rem;
    padding: 0.45rem 0.6rem;
    border: 1px solid var(--border-color);
    border-radius: 0.35rem;
    background: var(--window-bg);
    color: var(--text-primary);
}

.search-health {
    font-size: 0.7rem;
    color: var(--text-muted);
}

.search-answer {
    white-space: pre-wrap;
    font-size: 0.85rem;
    line-height: 1.5;
    padding: 0.75rem;
    border-radius: 0.35rem;
    background: var(--hover-bg);
}

.search-history {
    width: 16rem;
    flex-shrink: 0;
    border-left: 1px solid var(--border-color);
    overflow-y: auto;
}

.search-history-item {
    display: block;
    width: 100%;
    text-align: left;
    padding: 0.45rem 0.75rem;
    border: none;
    border-bottom: 1px solid var(--border-color);
    background: transparent;
    color: inherit;
    cursor: pointer;
    font-size: 0.8rem;
}

.search-history-item:hover { background: var(--hover-bg); }
.search-history-date { font-size: 0.65rem; color: var(--text-muted); }
"#;

async fn refresh_history(
    backend: Rc<dyn TenderBackend>,
    mut session: Signal<SearchSession>,
    ticket: HistoryTicket,
) {
    let result = backend.rag_history().await;
    session.write().history.complete_refresh(ticket, result);
}

async fn run_query(backend: Rc<dyn TenderBackend>, mut session: Signal<SearchSession>) {
    let begun = session.write().begin_query();
    let ticket = match begun {
        Ok(ticket) => ticket,
        Err(e) => {
            log::debug!("query not started: {e}");
            return;
        }
    };
    let result = backend.rag_query(ticket.request()).await;
    let refresh = session.write().complete_query(ticket, result);
    if let Some(refresh) = refresh {
        spawn(refresh_history(backend, session, refresh));
    }
}

#[component]
pub fn SearchView() -> Element {
    let backend = use_context::<Rc<dyn TenderBackend>>();
    let config = use_context::<ClientConfig>();

    let mut session = use_signal(|| SearchSession::new(&config));
    let mut health = use_signal(|| None::<String>);

    {
        let backend = backend.clone();
        use_hook(move || {
            let ticket = session.write().history.begin_refresh();
            spawn(refresh_history(backend.clone(), session, ticket));
            spawn(async move {
                match backend.rag_health().await {
                    Ok(report) => health.set(Some(health_line(&report))),
                    Err(e) => {
                        log::warn!("engine health unavailable: {e}");
                        health.set(Some(format!("Engine status unavailable: {e}")));
                    }
                }
            });
        });
    }

    let submit = {
        let backend = backend.clone();
        use_callback(move |_: ()| {
            spawn(run_query(backend.clone(), session));
        })
    };

    let state = session.read();
    let query = state.query().to_string();
    let mode = state.mode();
    let busy = state.is_busy();
    let answer = state.answer().map(str::to_owned);
    let error = state.error().map(str::to_owned);
    let sources: Vec<_> = state
        .sources()
        .iter()
        .map(|s| {
            (
                format_score(s.score),
                s.origin().unwrap_or("Knowledge base").to_string(),
                s.text.clone(),
            )
        })
        .collect();
    let history: Vec<_> = state
        .history
        .entries()
        .iter()
        .map(|e| {
            let date = e
                .created_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default();
            (e.id, e.query.clone(), date)
        })
        .collect();
    let history_error = state.history.error().map(str::to_owned);
    drop(state);

    rsx! {
        style { {SEARCH_VIEW_STYLES} }
        div {
            class: "search-root",
            div {
                class: "search-main",
                div {
                    class: "search-bar",
                    input {
                        class: "search-input",
                        placeholder: "Ask anything about your proposals, team, projects...",
                        value: "{query}",
                        oninput: move |e| session.write().set_query(e.value()),
                        onkeydown: move |e: KeyboardEvent| {
                            if e.key() == Key::Enter {
                                submit.call(());
                            }
                        },
                    }
                    select {
                        class: "search-input",
                        style: "flex: 0 0 auto;",
                        onchange: move |e| {
                            let mode = match e.value().as_str() {
                                "search" => QueryMode::Search,
                                _ => QueryMode::Qa,
                            };
                            session.write().set_mode(mode);
                        },
                        for option_mode in SEARCH_MODES {
                            option {
                                value: option_mode.as_str(),
                                selected: option_mode == mode,
                                if option_mode == QueryMode::Search { "Search only" } else { "Answer" }
                            }
                        }
                    }
                    button {
                        class: "search-input",
                        style: "flex: 0 0 auto; cursor: pointer;",
                        disabled: busy,
                        onclick: move |_| submit.call(()),
                        if busy { "Searching..." } else { "Search" }
                    }
                }
                if let Some(line) = health() {
                    div { class: "search-health", "{line}" }
                }
                if let Some(message) = error {
                    div { style: "font-size: 0.8rem; color: var(--danger-text);", "{message}" }
                }
                if let Some(text) = answer {
                    div { class: "search-answer", "{text}" }
                }
                for (i, (score, origin, text)) in sources.into_iter().enumerate() {
                    div {
                        key: "{i}",
                        class: "search-answer",
                        style: "background: transparent; border: 1px solid var(--border-color);",
                        div {
                            style: "font-size: 0.7rem; color: var(--text-secondary);",
                            "{origin} · {score}"
                        }
                        "{text}"
                    }
                }
            }

            div {
                class: "search-history",
                div {
                    style: "padding: 0.45rem 0.75rem; font-size: 0.8rem; color: var(--text-secondary);",
                    "Recent queries"
                }
                if let Some(message) = history_error {
                    div { style: "padding: 0 0.75rem; font-size: 0.7rem; color: var(--danger-text);", "{message}" }
                }
                for (id, past_query, date) in history {
                    button {
                        key: "{id}",
                        class: "search-history-item",
                        onclick: move |_| {
                            session.write().select_history(id);
                        },
                        div { "{past_query}" }
                        div { class: "search-history-date", "{date}" }
                    }
                }
            }
        }
    }
}
