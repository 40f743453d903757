mod api;
mod editor;

use tokio::io::{AsyncBufReadExt, BufReader};

use std::env;

use api::NoteApi;
use editor::{NoteEditor, format_timestamp};

const HELP: &str = "\
Lines you type are appended to the draft. Commands:
  :show     print the draft
  :save     save the draft to the server
  :reload   drop local changes and load the note again
  :clear    empty the draft
  :status   print status and timestamps
  :help     print this help
  :quit     exit without saving";

#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Show,
    Save,
    Reload,
    Clear,
    Status,
    Help,
    Quit,
    Unknown(&'a str),
    Append(&'a str),
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Self {
        let Some(cmd) = line.strip_prefix(':') else {
            return Self::Append(line);
        };
        match cmd.trim() {
            "show" => Self::Show,
            "save" | "w" => Self::Save,
            "reload" | "e" => Self::Reload,
            "clear" => Self::Clear,
            "status" => Self::Status,
            "help" | "h" => Self::Help,
            "quit" | "q" => Self::Quit,
            // "::text" is an escaped line starting with ':'
            _ if cmd.starts_with(':') => Self::Append(cmd),
            other => Self::Unknown(other),
        }
    }
}

fn print_status(editor: &NoteEditor) {
    println!(
        "[{}] last loaded: {} | last saved: {}",
        editor.status_text(),
        format_timestamp(editor.last_loaded_at()),
        format_timestamp(editor.last_saved_at()),
    );
}

fn print_draft(editor: &NoteEditor) {
    println!("----- note -----");
    if !editor.draft().is_empty() {
        println!("{}", editor.draft());
    }
    println!("----------------");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Log setup, stdout belongs to the editor
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let addr = env::var("NOTEPAD_URL").unwrap_or_else(|_| "http://127.0.0.1:5001".to_string());
    println!("Notepad at {addr} (:help for commands)");

    let api = NoteApi::new(&addr);
    let mut editor = NoteEditor::new();
    print_status(&editor);
    editor.load(&api).await;
    print_status(&editor);
    print_draft(&editor);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match Command::parse(&line) {
            Command::Append(text) => {
                if !editor.append_line(text) {
                    print_status(&editor);
                }
            }
            Command::Show => print_draft(&editor),
            Command::Save => {
                if editor.can_save() {
                    println!("Saving…");
                    editor.save(&api).await;
                }
                print_status(&editor);
            }
            Command::Reload => {
                if editor.can_reload() {
                    println!("Loading…");
                    editor.reload(&api).await;
                    print_draft(&editor);
                }
                print_status(&editor);
            }
            Command::Clear => {
                editor.edit(String::new());
            }
            Command::Status => print_status(&editor),
            Command::Help => println!("{HELP}"),
            Command::Quit => break,
            Command::Unknown(cmd) => println!("Unknown command ':{cmd}', try :help"),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_lines_are_appended() {
        assert_eq!(Command::parse("buy milk"), Command::Append("buy milk"));
        assert_eq!(Command::parse(""), Command::Append(""));
    }

    #[test]
    fn commands_and_aliases() {
        assert_eq!(Command::parse(":save"), Command::Save);
        assert_eq!(Command::parse(":w"), Command::Save);
        assert_eq!(Command::parse(":reload "), Command::Reload);
        assert_eq!(Command::parse(":q"), Command::Quit);
        assert_eq!(Command::parse(":show"), Command::Show);
    }

    #[test]
    fn double_colon_escapes_a_literal_line() {
        assert_eq!(Command::parse("::save"), Command::Append(":save"));
    }

    #[test]
    fn unknown_command_is_reported() {
        assert_eq!(Command::parse(":frobnicate"), Command::Unknown("frobnicate"));
    }
}
