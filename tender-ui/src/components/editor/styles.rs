//! Editor styles and save-status rendering

use dioxus::prelude::*;

use super::types::SaveState;

pub const EDITOR_STYLES: &str = r#"
.editor-root {
    display: flex;
    height: 100%;
    background: var(--window-bg);
    color: var(--text-primary);
    overflow: hidden;
}

/* ── Proposal sidebar ── */
.editor-sidebar {
    width: 15rem;
    flex-shrink: 0;
    border-right: 1px solid var(--border-color);
    display: flex;
    flex-direction: column;
    overflow-y: auto;
}

.editor-sidebar-header {
    display: flex;
    align-items: center;
    justify-content: space-between;
    padding: 0.4rem 0.75rem;
    font-size: 0.8rem;
    color: var(--text-secondary);
    border-bottom: 1px solid var(--border-color);
}

.editor-proposal {
    padding: 0.5rem 0.75rem;
    cursor: pointer;
    border-bottom: 1px solid var(--border-color);
    background: transparent;
    border-left: 2px solid transparent;
    text-align: left;
    color: inherit;
}

.editor-proposal:hover { background: var(--hover-bg); }
.editor-proposal--active {
    border-left-color: var(--accent-bg);
    background: var(--hover-bg);
}

.editor-proposal-title { font-size: 0.85rem; font-weight: 500; }
.editor-proposal-meta { font-size: 0.7rem; color: var(--text-muted); }

/* ── Main column ── */
.editor-main {
    flex: 1;
    display: flex;
    flex-direction: column;
    min-width: 0;
}

.editor-toolbar {
    display: flex;
    align-items: center;
    gap: 0.5rem;
    padding: 0.3rem 0.75rem;
    background: var(--titlebar-bg);
    border-bottom: 1px solid var(--border-color);
    flex-shrink: 0;
}

.editor-toolbar-btn {
    font-size: 0.75rem;
    padding: 0.2rem 0.6rem;
    border: 1px solid var(--border-color);
    border-radius: 0.25rem;
    background: var(--window-bg);
    color: var(--text-primary);
    cursor: pointer;
}

.editor-toolbar-btn:disabled { opacity: 0.5; cursor: default; }

.editor-tabs {
    display: flex;
    gap: 0.25rem;
    padding: 0.3rem 0.75rem;
    overflow-x: auto;
    border-bottom: 1px solid var(--border-color);
}

.editor-tab {
    font-size: 0.75rem;
    padding: 0.2rem 0.5rem;
    border-radius: 0.25rem;
    border: 1px solid transparent;
    background: transparent;
    color: var(--text-secondary);
    cursor: pointer;
    white-space: nowrap;
}

.editor-tab--active {
    border-color: var(--accent-bg);
    color: var(--text-primary);
}

.section-status--todo        { color: var(--text-muted); }
.section-status--in_progress { color: var(--accent-bg); }
.section-status--in_review   { color: var(--warning-bg); }
.section-status--approved    { color: var(--success-bg); }

.editor-textarea {
    flex: 1;
    resize: none;
    border: none;
    outline: none;
    padding: 1rem;
    font-family: inherit;
    font-size: 0.9rem;
    line-height: 1.5;
    background: var(--window-bg);
    color: var(--text-primary);
}

.editor-error {
    display: flex;
    align-items: center;
    justify-content: space-between;
    padding: 0.3rem 0.75rem;
    font-size: 0.8rem;
    color: var(--danger-text);
    background: color-mix(in srgb, var(--danger-bg) 12%, transparent);
}

.editor-placeholder {
    padding: 2rem;
    text-align: center;
    color: var(--text-secondary);
    font-size: 0.85rem;
}

/* ── Assist panel ── */
.assist-panel {
    width: 20rem;
    flex-shrink: 0;
    border-left: 1px solid var(--border-color);
    display: flex;
    flex-direction: column;
    gap: 0.5rem;
    padding: 0.75rem;
    overflow-y: auto;
}

.assist-actions {
    display: grid;
    grid-template-columns: 1fr 1fr;
    gap: 0.35rem;
}

.assist-input {
    width: 100%;
    font-size: 0.8rem;
    padding: 0.3rem 0.4rem;
    border: 1px solid var(--border-color);
    border-radius: 0.25rem;
    background: var(--window-bg);
    color: var(--text-primary);
}

.assist-answer {
    white-space: pre-wrap;
    font-size: 0.8rem;
    line-height: 1.45;
    padding: 0.5rem;
    border-radius: 0.25rem;
    background: var(--hover-bg);
}

.assist-source {
    font-size: 0.7rem;
    padding: 0.35rem 0.5rem;
    border-left: 2px solid var(--border-color);
    color: var(--text-secondary);
}

.assist-source-score { color: var(--accent-bg); font-weight: 500; }
.assist-busy { font-size: 0.75rem; color: var(--accent-bg); }
.assist-error { font-size: 0.75rem; color: var(--danger-text); }
"#;

/// Render save status indicator
pub fn render_save_status(save_state: &SaveState, dirty: bool) -> Element {
    match save_state {
        SaveState::Saving => rsx! {
            span { style: "font-size: 0.8rem; color: var(--accent-bg);", "Saving..." }
        },
        SaveState::Saved => rsx! {
            span { style: "font-size: 0.8rem; color: var(--success-bg);", "Saved" }
        },
        SaveState::Failed(_) => rsx! {
            span { style: "font-size: 0.8rem; color: var(--danger-text);", "Save failed" }
        },
        SaveState::Idle if dirty => rsx! {
            span { style: "font-size: 0.8rem; color: var(--warning-bg);", "Unsaved changes" }
        },
        SaveState::Idle => rsx! {
            span { style: "font-size: 0.8rem; color: var(--text-secondary);", "" }
        },
    }
}

/// Relevance as a whole percentage.
pub fn format_score(score: f64) -> String {
    format!("{:.0}%", score.clamp(0.0, 1.0) * 100.0)
}
