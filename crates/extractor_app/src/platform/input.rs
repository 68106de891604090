use std::path::PathBuf;

use extractor_core::{AppViewModel, Msg};

use super::ui::constants::*;

/// What one line typed at the prompt asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Dispatch(Vec<Msg>),
    /// Open a document; the caller reads its size from disk.
    Open(PathBuf),
    Help,
    Quit,
    Unknown(String),
}

/// Parses a prompt line against the current screen, so field numbers refer
/// to the rows the user sees.
pub fn parse_line(line: &str, view: &AppViewModel) -> Action {
    let line = line.trim();
    if line.is_empty() {
        return Action::Dispatch(vec![Msg::NoOp]);
    }

    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    match command.to_lowercase().as_str() {
        CMD_OPEN if !rest.is_empty() => Action::Open(dropped_path(rest)),
        CMD_REMOVE if rest.is_empty() => Action::Dispatch(vec![Msg::FileRemoved]),
        CMD_NEW if rest.is_empty() => Action::Dispatch(vec![Msg::ResetClicked]),
        CMD_ALL if rest.is_empty() => Action::Dispatch(vec![Msg::SelectAll]),
        CMD_NONE if rest.is_empty() => Action::Dispatch(vec![Msg::DeselectAll]),
        CMD_PREVIEW if rest.is_empty() => Action::Dispatch(vec![Msg::PreviewClicked]),
        CMD_SAVE_PREVIEW if rest.is_empty() => Action::Dispatch(vec![Msg::ExportPreviewClicked]),
        CMD_PROCESS if rest.is_empty() => Action::Dispatch(vec![Msg::ProcessClicked]),
        CMD_DOWNLOAD if rest.is_empty() => Action::Dispatch(vec![Msg::DownloadClicked]),
        CMD_HELP | "?" if rest.is_empty() => Action::Help,
        CMD_QUIT | "exit" | "q" if rest.is_empty() => Action::Quit,
        _ => parse_toggles(line, view)
            .map(Action::Dispatch)
            .unwrap_or_else(|| {
                if looks_like_path(line) {
                    Action::Open(dropped_path(line))
                } else {
                    Action::Unknown(line.to_string())
                }
            }),
    }
}

/// `1 3`, `2,4` or field ids, each toggling one checkbox.
fn parse_toggles(line: &str, view: &AppViewModel) -> Option<Vec<Msg>> {
    if !view.fields_visible || view.fields.is_empty() {
        return None;
    }
    line.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| {
            let field = match token.parse::<usize>() {
                Ok(number) => number.checked_sub(1).and_then(|index| view.fields.get(index)),
                Err(_) => view.fields.iter().find(|field| field.id == token),
            }?;
            Some(Msg::FieldToggled {
                field_id: field.id.clone(),
            })
        })
        .collect()
}

fn looks_like_path(line: &str) -> bool {
    line.contains('/') || line.contains('\\') || line.contains('.')
}

/// Terminals paste dropped files quoted or with escaped spaces.
fn dropped_path(text: &str) -> PathBuf {
    let text = text.trim();
    let unquoted = ['\'', '"']
        .iter()
        .find_map(|quote| {
            text.strip_prefix(*quote)
                .and_then(|inner| inner.strip_suffix(*quote))
        })
        .unwrap_or(text);
    PathBuf::from(unquoted.replace("\\ ", " "))
}
