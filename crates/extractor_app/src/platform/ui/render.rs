use extractor_core::{AppViewModel, PreviewTable, MAX_FILE_SIZE};

use super::constants::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Muted,
    Success,
    Error,
}

/// One element of the screen, drawn top to bottom by the terminal backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiCommand {
    ClearScreen,
    Heading(String),
    Line { text: String, tone: Tone },
    Checkbox { index: usize, label: String, checked: bool },
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    ProgressBar { percent: u8, label: String },
    Blank,
}

/// Transient UI owned by the front end rather than the wizard state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overlay {
    pub alert: Option<String>,
    pub notice: Option<String>,
    pub show_help: bool,
}

pub fn render(view: &AppViewModel, overlay: &Overlay) -> Vec<UiCommand> {
    let mut cmds = vec![UiCommand::ClearScreen];

    if let Some(alert) = &overlay.alert {
        cmds.push(line(format!("⚠ {alert}"), Tone::Error));
        cmds.push(line("Нажмите Enter, чтобы продолжить", Tone::Muted));
        return cmds;
    }

    render_upload(view, &mut cmds);
    if view.fields_visible {
        render_fields(view, &mut cmds);
    }
    if view.preview_visible {
        render_preview(view, &mut cmds);
    }
    if view.process_visible || view.process_busy {
        render_process(view, &mut cmds);
    }
    if view.result_visible {
        render_result(view, &mut cmds);
    }

    if let Some(notice) = &overlay.notice {
        cmds.push(UiCommand::Blank);
        cmds.push(line(notice.clone(), Tone::Success));
    }
    cmds.push(UiCommand::Blank);
    if overlay.show_help {
        cmds.extend(help_lines());
    } else {
        cmds.push(line(format!("Команды: {CMD_HELP}"), Tone::Muted));
    }
    cmds
}

fn render_upload(view: &AppViewModel, cmds: &mut Vec<UiCommand>) {
    cmds.push(UiCommand::Heading("Шаг 1. Загрузка документа".to_string()));
    match &view.file {
        Some(file) => {
            cmds.push(line(
                format!("{} ({})", file.name, file.size_label),
                Tone::Plain,
            ));
            if view.uploading {
                cmds.push(line("Загрузка файла...", Tone::Muted));
            }
        }
        None => {
            cmds.push(line(
                format!(
                    "Перетащите файл .docx или .pdf сюда или введите {CMD_OPEN} <путь> (до {} МБ)",
                    MAX_FILE_SIZE / (1024 * 1024)
                ),
                Tone::Muted,
            ));
        }
    }
}

fn render_fields(view: &AppViewModel, cmds: &mut Vec<UiCommand>) {
    cmds.push(UiCommand::Blank);
    cmds.push(UiCommand::Heading("Шаг 2. Выбор полей".to_string()));
    if view.fields.is_empty() {
        cmds.push(line("В документе не найдено полей", Tone::Muted));
        return;
    }
    for (index, field) in view.fields.iter().enumerate() {
        let label = match &field.kind {
            Some(kind) => format!("{} [{kind}]", field.name),
            None => field.name.clone(),
        };
        cmds.push(UiCommand::Checkbox {
            index: index + 1,
            label,
            checked: field.checked,
        });
    }
    cmds.push(line(
        format!("Выбрано полей: {}", view.selected_count),
        Tone::Muted,
    ));
}

fn render_preview(view: &AppViewModel, cmds: &mut Vec<UiCommand>) {
    cmds.push(UiCommand::Blank);
    cmds.push(UiCommand::Heading("Шаг 3. Предпросмотр".to_string()));
    if view.preview_loading {
        cmds.push(line("Генерация превью...", Tone::Muted));
        return;
    }
    match &view.preview {
        Some(table) if table.is_empty() => {
            cmds.push(line(PreviewTable::empty_message(), Tone::Muted));
        }
        Some(table) => {
            cmds.push(UiCommand::Table {
                headers: table.headers.clone(),
                rows: table.rows.clone(),
            });
            if let Some(note) = table.note() {
                cmds.push(line(note, Tone::Muted));
            }
        }
        None => {}
    }
    if let Some(path) = &view.exported_preview {
        cmds.push(line(format!("HTML: {}", path.display()), Tone::Muted));
    }
}

fn render_process(view: &AppViewModel, cmds: &mut Vec<UiCommand>) {
    cmds.push(UiCommand::Blank);
    cmds.push(UiCommand::Heading("Шаг 4. Обработка".to_string()));
    match &view.progress {
        Some(progress) => cmds.push(UiCommand::ProgressBar {
            percent: progress.percent,
            label: progress.label.clone(),
        }),
        None if view.process_enabled => cmds.push(line(
            format!("Введите {CMD_PROCESS}, чтобы извлечь выбранные поля"),
            Tone::Muted,
        )),
        None => {}
    }
}

fn render_result(view: &AppViewModel, cmds: &mut Vec<UiCommand>) {
    cmds.push(UiCommand::Blank);
    cmds.push(UiCommand::Heading("Шаг 5. Результат".to_string()));
    if let Some(url) = &view.download_url {
        cmds.push(line(format!("Файл готов: {url}"), Tone::Success));
    }
    if view.download_in_flight {
        cmds.push(line("Скачивание...", Tone::Muted));
    } else if let Some(path) = &view.saved_download {
        cmds.push(line(format!("Сохранено: {}", path.display()), Tone::Success));
    } else {
        cmds.push(line(
            format!("Введите {CMD_DOWNLOAD}, чтобы сохранить файл"),
            Tone::Muted,
        ));
    }
    cmds.push(line(
        format!("Введите {CMD_NEW}, чтобы обработать другой файл"),
        Tone::Muted,
    ));
}

fn help_lines() -> Vec<UiCommand> {
    [
        format!("{CMD_OPEN} <путь>    загрузить документ (или перетащите файл)"),
        "1 3 / <id>        отметить или снять поле".to_string(),
        format!("{CMD_ALL} / {CMD_NONE}        выбрать все / снять все"),
        format!("{CMD_PREVIEW}           предпросмотр"),
        format!("{CMD_SAVE_PREVIEW}      сохранить предпросмотр в HTML"),
        format!("{CMD_PROCESS}           обработать файл"),
        format!("{CMD_DOWNLOAD}          скачать результат"),
        format!("{CMD_REMOVE}            убрать файл"),
        format!("{CMD_NEW}               начать заново"),
        format!("{CMD_QUIT}              выход"),
    ]
    .into_iter()
    .map(|text| line(text, Tone::Muted))
    .collect()
}

fn line(text: impl Into<String>, tone: Tone) -> UiCommand {
    UiCommand::Line {
        text: text.into(),
        tone,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use extractor_core::{FieldRowView, FileInfo, ProgressView};
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn texts(cmds: &[UiCommand]) -> Vec<String> {
        cmds.iter()
            .filter_map(|cmd| match cmd {
                UiCommand::Heading(text) | UiCommand::Line { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    fn uploaded_view() -> AppViewModel {
        AppViewModel {
            file: Some(FileInfo::new(PathBuf::from("a.pdf"), "a.pdf", 2048)),
            fields_visible: true,
            fields: vec![
                FieldRowView {
                    id: "inn".into(),
                    name: "ИНН".into(),
                    kind: Some("text".into()),
                    checked: true,
                },
                FieldRowView {
                    id: "date".into(),
                    name: "Дата".into(),
                    kind: None,
                    checked: false,
                },
            ],
            selected_count: 1,
            process_visible: true,
            process_enabled: true,
            ..AppViewModel::default()
        }
    }

    #[test]
    fn empty_view_shows_only_upload_prompt() {
        let cmds = render(&AppViewModel::default(), &Overlay::default());
        let headings: Vec<_> = cmds
            .iter()
            .filter(|cmd| matches!(cmd, UiCommand::Heading(_)))
            .collect();
        assert_eq!(headings.len(), 1);
        assert!(texts(&cmds).iter().any(|t| t.contains("50 МБ")));
    }

    #[test]
    fn fields_render_as_numbered_checkboxes_with_count() {
        let cmds = render(&uploaded_view(), &Overlay::default());
        assert!(cmds.contains(&UiCommand::Checkbox {
            index: 1,
            label: "ИНН [text]".into(),
            checked: true,
        }));
        assert!(cmds.contains(&UiCommand::Checkbox {
            index: 2,
            label: "Дата".into(),
            checked: false,
        }));
        assert!(texts(&cmds).contains(&"Выбрано полей: 1".to_string()));
        assert!(texts(&cmds).contains(&"Шаг 4. Обработка".to_string()));
    }

    #[test]
    fn alert_replaces_the_screen() {
        let overlay = Overlay {
            alert: Some("Файл слишком большой".into()),
            ..Overlay::default()
        };
        let cmds = render(&uploaded_view(), &overlay);
        assert_eq!(
            texts(&cmds),
            vec![
                "⚠ Файл слишком большой".to_string(),
                "Нажмите Enter, чтобы продолжить".to_string()
            ]
        );
    }

    #[test]
    fn empty_preview_shows_placeholder() {
        let view = AppViewModel {
            preview_visible: true,
            preview: Some(PreviewTable::default()),
            ..uploaded_view()
        };
        let cmds = render(&view, &Overlay::default());
        assert!(texts(&cmds).contains(&"Нет данных для отображения".to_string()));
        assert!(!cmds.iter().any(|cmd| matches!(cmd, UiCommand::Table { .. })));
    }

    #[test]
    fn truncated_preview_carries_note() {
        let table = PreviewTable {
            headers: vec!["ИНН".into()],
            rows: vec![vec!["1".into()]; 10],
            total_rows: 12,
        };
        let view = AppViewModel {
            preview_visible: true,
            preview: Some(table),
            ..uploaded_view()
        };
        let cmds = render(&view, &Overlay::default());
        assert!(texts(&cmds).contains(&"Показано 10 из 12 записей".to_string()));
    }

    #[test]
    fn running_process_shows_progress_bar() {
        let view = AppViewModel {
            process_enabled: false,
            process_busy: true,
            progress: Some(ProgressView {
                percent: 30,
                label: "Обработка файла...".into(),
            }),
            ..uploaded_view()
        };
        let cmds = render(&view, &Overlay::default());
        assert!(cmds.contains(&UiCommand::ProgressBar {
            percent: 30,
            label: "Обработка файла...".into(),
        }));
    }

    #[test]
    fn result_offers_download_then_shows_saved_path() {
        let ready = AppViewModel {
            result_visible: true,
            download_url: Some("/api/download/out.xlsx".into()),
            ..uploaded_view()
        };
        let cmds = render(&ready, &Overlay::default());
        assert!(texts(&cmds).contains(&"Файл готов: /api/download/out.xlsx".to_string()));
        assert!(texts(&cmds).contains(&"Введите download, чтобы сохранить файл".to_string()));

        let saved = AppViewModel {
            saved_download: Some(PathBuf::from("downloads/out.xlsx")),
            ..ready
        };
        let cmds = render(&saved, &Overlay::default());
        assert!(texts(&cmds)
            .iter()
            .any(|t| t.starts_with("Сохранено: ") && t.ends_with("out.xlsx")));
    }
}
