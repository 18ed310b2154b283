//! Main ProposalEditorView component

use std::rc::Rc;

use dioxus::prelude::*;
use gloo_timers::future::TimeoutFuture;
use shared_types::{ProposalId, SectionStatus};

use super::assist::{dispatch, AssistAction, AssistTuning};
use super::session::EditorSession;
use super::store::DetailTicket;
use super::styles::*;
use super::types::StorePhase;
use crate::api::TenderBackend;
use crate::config::ClientConfig;

async fn load_detail(
    backend: Rc<dyn TenderBackend>,
    mut session: Signal<EditorSession>,
    ticket: DetailTicket,
) {
    let result = backend.get_proposal(ticket.proposal_id()).await;
    session.write().complete_detail(ticket, result);
}

async fn load_list(backend: Rc<dyn TenderBackend>, mut session: Signal<EditorSession>, limit: u32) {
    let ticket = session.write().store.begin_list_load();
    let result = backend.list_proposals(limit).await;
    let auto_select = session.write().store.complete_list_load(ticket, result);
    if let Some(ticket) = auto_select {
        load_detail(backend, session, ticket).await;
    }
}

async fn save_active_section(
    backend: Rc<dyn TenderBackend>,
    mut session: Signal<EditorSession>,
    saved_indicator_ms: u32,
) {
    let begun = session.write().store.begin_save();
    let ticket = match begun {
        Ok(ticket) => ticket,
        Err(e) => {
            log::debug!("save not started: {e}");
            return;
        }
    };

    let generation = ticket.generation();
    let result = backend
        .update_section(ticket.proposal_id(), ticket.section_id(), ticket.update())
        .await;
    let refresh = session.write().store.complete_save(ticket, result);
    let Some(refresh) = refresh else {
        return;
    };

    spawn(async move {
        TimeoutFuture::new(saved_indicator_ms).await;
        session.write().store.expire_saved_indicator(generation);
    });
    load_detail(backend, session, refresh).await;
}

async fn run_assist(
    backend: Rc<dyn TenderBackend>,
    mut session: Signal<EditorSession>,
    action: AssistAction,
) {
    let begun = session.write().begin_assist(action);
    match begun {
        Ok(ticket) => {
            let result = dispatch(&*backend, ticket.request()).await;
            session.write().complete_assist(ticket, result);
        }
        Err(e) => log::debug!("assist not started: {e}"),
    }
}

#[component]
pub fn ProposalEditorView() -> Element {
    let backend = use_context::<Rc<dyn TenderBackend>>();
    let config = use_context::<ClientConfig>();
    let list_limit = config.proposal_list_limit;
    let saved_indicator_ms = config.saved_indicator_ms;

    let mut session = use_signal(|| EditorSession::new(AssistTuning::from(&config)));
    let mut instructions = use_signal(String::new);
    let mut custom_query = use_signal(String::new);

    {
        let backend = backend.clone();
        use_hook(move || {
            spawn(load_list(backend, session, list_limit));
        });
    }

    let reload_list = {
        let backend = backend.clone();
        use_callback(move |_: ()| {
            spawn(load_list(backend.clone(), session, list_limit));
        })
    };

    let open_proposal = {
        let backend = backend.clone();
        use_callback(move |id: ProposalId| {
            let begun = session.write().select_proposal(id);
            match begun {
                Ok(ticket) => {
                    spawn(load_detail(backend.clone(), session, ticket));
                }
                Err(e) => log::warn!("cannot open proposal: {e}"),
            }
        })
    };

    let open_section = use_callback(move |index: usize| {
        if let Err(e) = session.write().set_active_section(index) {
            log::warn!("cannot open section: {e}");
        }
    });

    let save = {
        let backend = backend.clone();
        use_callback(move |_: ()| {
            spawn(save_active_section(backend.clone(), session, saved_indicator_ms));
        })
    };

    let assist = {
        let backend = backend.clone();
        use_callback(move |action: AssistAction| {
            spawn(run_assist(backend.clone(), session, action));
        })
    };

    let insert = use_callback(move |_: ()| {
        if let Err(e) = session.write().insert() {
            log::debug!("insert skipped: {e}");
        }
    });

    let on_keydown = use_callback(move |e: KeyboardEvent| {
        let modifiers = e.modifiers();
        if (modifiers.ctrl() || modifiers.meta()) && e.key() == Key::Character("s".to_string()) {
            e.prevent_default();
            save.call(());
        }
    });

    // Snapshot for rendering.
    let state = session.read();
    let phase = state.store.phase();
    let error = state.store.error().map(str::to_owned);
    let selected_id = state.store.selected_id();
    let proposals: Vec<_> = state
        .store
        .proposals()
        .iter()
        .map(|p| (p.id, p.title.clone(), p.status.label()))
        .collect();
    let total = state.store.total();
    let proposal_title = state.store.detail().map(|d| d.proposal.title.clone());
    let tabs: Vec<_> = state
        .store
        .sections()
        .iter()
        .enumerate()
        .map(|(index, s)| {
            let status_class = format!("section-status--{}", s.status.as_str());
            (index, s.id, s.title.clone(), status_class)
        })
        .collect();
    let active_index = state.store.active_index();
    let editable = state.store.is_editable();
    let buffer = state.store.buffer().to_string();
    let dirty = state.store.is_dirty();
    let save_state = state.store.save_state().clone();
    let status_value = state
        .store
        .effective_status()
        .unwrap_or_default()
        .as_str();
    let assist_busy = state.assist.is_busy();
    let assist_running = state.assist.in_flight().map(|a| a.label());
    let assist_result = state.assist.result().cloned();
    let assist_error = state.assist.error().map(str::to_owned);
    drop(state);

    let controls_disabled = !editable || assist_busy;
    let no_proposals = proposals.is_empty();

    rsx! {
        style { {EDITOR_STYLES} }
        div {
            class: "editor-root",
            onkeydown: move |e| on_keydown.call(e),

            div {
                class: "editor-sidebar",
                div {
                    class: "editor-sidebar-header",
                    span { "Proposals ({total})" }
                    button {
                        class: "editor-toolbar-btn",
                        disabled: phase == StorePhase::LoadingList,
                        onclick: move |_| reload_list.call(()),
                        "Reload"
                    }
                }
                if phase == StorePhase::LoadingList {
                    div { class: "editor-placeholder", "Loading proposals..." }
                }
                for (id, title, status_label) in proposals {
                    button {
                        key: "{id}",
                        class: if selected_id == Some(id) { "editor-proposal editor-proposal--active" } else { "editor-proposal" },
                        onclick: move |_| open_proposal.call(id),
                        div { class: "editor-proposal-title", "{title}" }
                        div { class: "editor-proposal-meta", "{status_label}" }
                    }
                }
            }

            div {
                class: "editor-main",
                if let Some(message) = error {
                    div {
                        class: "editor-error",
                        span { "{message}" }
                        div {
                            style: "display: flex; gap: 0.35rem;",
                            if phase == StorePhase::Error {
                                button {
                                    class: "editor-toolbar-btn",
                                    onclick: move |_| reload_list.call(()),
                                    "Retry"
                                }
                            }
                            button {
                                class: "editor-toolbar-btn",
                                onclick: move |_| session.write().store.dismiss_error(),
                                "Dismiss"
                            }
                        }
                    }
                }

                {match phase {
                    StorePhase::Empty | StorePhase::LoadingList => rsx! {},
                    StorePhase::ListReady if no_proposals => rsx! {
                        div { class: "editor-placeholder", "No proposals yet." }
                    },
                    StorePhase::LoadingDetail => rsx! {
                        div { class: "editor-placeholder", "Loading proposal..." }
                    },
                    StorePhase::Error => rsx! {
                        div {
                            class: "editor-placeholder",
                            "The proposal could not be loaded. Retry, or pick another proposal."
                        }
                    },
                    StorePhase::DetailReady if tabs.is_empty() => rsx! {
                        div { class: "editor-placeholder", "This proposal has no sections." }
                    },
                    _ if proposal_title.is_none() => rsx! {},
                    _ => rsx! {
                        div {
                            class: "editor-toolbar",
                            span {
                                style: "font-size: 0.85rem; font-weight: 500; flex: 1;",
                                {proposal_title.clone().unwrap_or_default()}
                            }
                            select {
                                class: "editor-toolbar-btn",
                                disabled: !editable,
                                value: status_value,
                                onchange: move |e| {
                                    if let Some(status) = SectionStatus::parse(&e.value()) {
                                        if let Err(err) = session.write().store.set_section_status(status) {
                                            log::debug!("status not staged: {err}");
                                        }
                                    }
                                },
                                for status in SectionStatus::ALL {
                                    option {
                                        value: status.as_str(),
                                        selected: status.as_str() == status_value,
                                        {status.label()}
                                    }
                                }
                            }
                            {render_save_status(&save_state, dirty)}
                            button {
                                class: "editor-toolbar-btn",
                                disabled: !editable || save_state.is_saving(),
                                onclick: move |_| save.call(()),
                                "Save"
                            }
                        }

                        div {
                            class: "editor-tabs",
                            for (index, section_id, title, status_class) in tabs.clone() {
                                button {
                                    key: "{section_id}",
                                    class: if index == active_index { "editor-tab editor-tab--active" } else { "editor-tab" },
                                    onclick: move |_| open_section.call(index),
                                    span { class: "{status_class}", "● " }
                                    "{title}"
                                }
                            }
                        }

                        textarea {
                            class: "editor-textarea",
                            disabled: !editable,
                            placeholder: "Start writing this section...",
                            value: "{buffer}",
                            oninput: move |e| session.write().store.edit_buffer(e.value()),
                        }
                    },
                }}
            }

            div {
                class: "assist-panel",
                span { style: "font-size: 0.8rem; font-weight: 600;", "AI Assist" }

                input {
                    class: "assist-input",
                    placeholder: "Instructions for \"Write this section\" (optional)",
                    value: "{instructions}",
                    oninput: move |e| instructions.set(e.value()),
                }
                div {
                    class: "assist-actions",
                    button {
                        class: "editor-toolbar-btn",
                        disabled: controls_disabled,
                        onclick: move |_| assist.call(AssistAction::WriteSection { instructions: instructions() }),
                        "Write this section"
                    }
                    button {
                        class: "editor-toolbar-btn",
                        disabled: controls_disabled,
                        onclick: move |_| assist.call(AssistAction::ImproveText),
                        "Improve current text"
                    }
                    button {
                        class: "editor-toolbar-btn",
                        disabled: controls_disabled,
                        onclick: move |_| assist.call(AssistAction::CheckCompliance),
                        "Check compliance"
                    }
                    button {
                        class: "editor-toolbar-btn",
                        disabled: controls_disabled,
                        onclick: move |_| assist.call(AssistAction::FindContent),
                        "Find relevant content"
                    }
                }

                div {
                    style: "display: flex; gap: 0.35rem;",
                    input {
                        class: "assist-input",
                        placeholder: "Ask anything about this section",
                        value: "{custom_query}",
                        oninput: move |e| custom_query.set(e.value()),
                    }
                    button {
                        class: "editor-toolbar-btn",
                        disabled: controls_disabled,
                        onclick: move |_| assist.call(AssistAction::Custom { query: custom_query() }),
                        "Ask"
                    }
                }

                if let Some(label) = assist_running {
                    div { class: "assist-busy", "{label}..." }
                }
                if let Some(message) = assist_error {
                    div { class: "assist-error", "{message}" }
                }
                if let Some(result) = assist_result {
                    div { class: "assist-answer", {result.answer.clone()} }
                    button {
                        class: "editor-toolbar-btn",
                        disabled: !editable,
                        onclick: move |_| insert.call(()),
                        "Insert into section"
                    }
                    for (i, source) in result.sources.into_iter().enumerate() {
                        div {
                            key: "{i}",
                            class: "assist-source",
                            span { class: "assist-source-score", {format_score(source.score)} }
                            if let Some(origin) = source.origin() {
                                " · {origin}"
                            }
                            div { {excerpt(&source.text, 240)} }
                        }
                    }
                }
            }
        }
    }
}

/// First `max_chars` characters, with an ellipsis when cut.
fn excerpt(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
