//! Interactive console shell
//!
//! One line per command. The shell keeps a single compose session and the
//! hits of the latest search so they can be activated by position.

use std::str::FromStr;

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use shared::{process_debug, process_warn, ProcessId, RetrievalHit, SelectionKind};
use crate::compose::ComposeWorkflow;
use crate::console_impl::Console;
use crate::core::workflow::{to_list, BEAT_FAILED, COMPOSE_FAILED, PLAN_FAILED};
use crate::error::{ConsoleError, ConsoleResult};
use crate::panels::retrieval::{self, SearchInput};
use crate::traits::ConsoleApi;

pub const PROMPT: &str = "sv> ";
pub const INVALID_INPUT: &str = "error: input line is not valid UTF-8";

pub const HELP: &str = "\
commands:
  search <query>            search the active banks
  activate <n>              activate hit n of the last search
  active                    list active selections
  drop <kind> <doc_id>      deactivate one document
  clear [kind]              clear selections
  frame <id> | query <text> | k <n> | beats <a,b,...>
  plan | compose | beat <name>
  bankset <id,...>          choose banks
  harness [name]            show or set the generation harness
  health                    last health check
  help | quit";

/// A parsed shell line
#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Search(String),
    Activate(usize),
    Active,
    Drop { kind: SelectionKind, doc_id: String },
    Clear(Option<SelectionKind>),
    Frame(String),
    Query(String),
    K(u32),
    Beats(String),
    Plan,
    Compose,
    Beat(String),
    Bankset(Vec<String>),
    Harness(Option<String>),
    Health,
    Help,
    Quit,
}

fn usage(text: &str) -> ConsoleError {
    ConsoleError::validation(format!("usage: {}", text))
}

fn kind(input: &str) -> ConsoleResult<SelectionKind> {
    SelectionKind::from_str(input).map_err(|e| ConsoleError::validation(e.to_string()))
}

impl FromStr for ShellCommand {
    type Err = ConsoleError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let command = match verb.to_lowercase().as_str() {
            "search" if !rest.is_empty() => ShellCommand::Search(rest.to_string()),
            "search" => return Err(usage("search <query>")),
            "activate" => ShellCommand::Activate(rest.parse().map_err(|_| usage("activate <n>"))?),
            "active" => ShellCommand::Active,
            "drop" => match rest.split_once(char::is_whitespace) {
                Some((k, doc_id)) if !doc_id.trim().is_empty() => ShellCommand::Drop {
                    kind: kind(k)?,
                    doc_id: doc_id.trim().to_string(),
                },
                _ => return Err(usage("drop <kind> <doc_id>")),
            },
            "clear" if rest.is_empty() => ShellCommand::Clear(None),
            "clear" => ShellCommand::Clear(Some(kind(rest)?)),
            "frame" => ShellCommand::Frame(rest.to_string()),
            "query" => ShellCommand::Query(rest.to_string()),
            "k" => ShellCommand::K(rest.parse().map_err(|_| usage("k <n>"))?),
            "beats" => ShellCommand::Beats(rest.to_string()),
            "plan" => ShellCommand::Plan,
            "compose" => ShellCommand::Compose,
            "beat" => ShellCommand::Beat(rest.to_string()),
            "bankset" => ShellCommand::Bankset(to_list(rest)),
            "harness" if rest.is_empty() => ShellCommand::Harness(None),
            "harness" => ShellCommand::Harness(Some(rest.to_string())),
            "health" => ShellCommand::Health,
            "help" | "?" => ShellCommand::Help,
            "quit" | "exit" => ShellCommand::Quit,
            other => return Err(ConsoleError::validation(format!("unknown command: {} (try help)", other))),
        };
        Ok(command)
    }
}

/// What the loop does after a command
#[derive(Debug, Clone, PartialEq)]
pub enum ShellReply {
    Output(String),
    Quit,
}

pub struct Shell<A: ConsoleApi> {
    console: Console<A>,
    session: ComposeWorkflow<A>,
    last_hits: Vec<RetrievalHit>,
}

impl<A: ConsoleApi + 'static> Shell<A> {
    pub fn new(console: Console<A>) -> Self {
        let session = console.compose_session();
        Self {
            console,
            session,
            last_hits: Vec::new(),
        }
    }

    pub fn session(&self) -> &ComposeWorkflow<A> {
        &self.session
    }

    /// Parse and run one line; errors come back as text for the operator
    pub async fn handle_line(&mut self, line: &str) -> ShellReply {
        if line.trim().is_empty() {
            return ShellReply::Output(String::new());
        }
        let command = match line.parse::<ShellCommand>() {
            Ok(command) => command,
            Err(e) => return ShellReply::Output(format!("error: {}", e)),
        };
        self.execute(command).await
    }

    pub async fn execute(&mut self, command: ShellCommand) -> ShellReply {
        process_debug!(ProcessId::current(), "Shell command: {:?}", command);
        let state = self.console.state().clone();

        let output = match command {
            ShellCommand::Quit => return ShellReply::Quit,
            ShellCommand::Help => HELP.to_string(),
            ShellCommand::Search(query) => {
                match retrieval::search(self.console.api(), SearchInput::new(query)).await {
                    Ok(result) => {
                        self.last_hits = result.hits;
                        render_hits(&retrieval::annotate_hits(&self.last_hits, &state.selections))
                    }
                    Err(e) => failure(&e, retrieval::FAILED),
                }
            }
            ShellCommand::Activate(position) => match position.checked_sub(1).and_then(|i| self.last_hits.get(i)) {
                Some(hit) => {
                    let added = self.console.activate(hit.clone());
                    if added {
                        format!("activated {} ({})", hit.doc_id, hit.selection_kind())
                    } else {
                        format!("{} is already active", hit.doc_id)
                    }
                }
                None => format!("error: no hit #{} in the last search", position),
            },
            ShellCommand::Active => render_json(&state.selections.to_payload()),
            ShellCommand::Drop { kind, doc_id } => {
                if state.selections.remove(kind, &doc_id) {
                    format!("dropped {} from {}", doc_id, kind)
                } else {
                    format!("{} is not active under {}", doc_id, kind)
                }
            }
            ShellCommand::Clear(kind) => {
                state.selections.clear(kind);
                match kind {
                    Some(kind) => format!("cleared {}", kind),
                    None => "cleared all selections".to_string(),
                }
            }
            ShellCommand::Frame(frame_id) => {
                self.session.edit(|s| s.set_frame_id(&frame_id)).await;
                format!("frame = {}", frame_id)
            }
            ShellCommand::Query(query) => {
                self.session.edit(|s| s.set_query(&query)).await;
                format!("query = {}", query)
            }
            ShellCommand::K(k) => {
                self.session.edit(|s| s.set_k(k)).await;
                format!("k = {}", k)
            }
            ShellCommand::Beats(beats) => {
                self.session.set_beats_input(&beats).await;
                format!("beats = {}", self.session.resolve_beats().await.join(","))
            }
            ShellCommand::Plan => {
                let (frame_id, query, k) = self.session_inputs().await;
                match self.session.run_plan(&frame_id, &query, k).await {
                    Ok(plan) => format!(
                        "plan: {}{}",
                        plan.beat_names().join(", "),
                        render_warnings(&plan.warnings)
                    ),
                    Err(e) => failure(&e, PLAN_FAILED),
                }
            }
            ShellCommand::Compose => {
                let (frame_id, query, _) = self.session_inputs().await;
                match self.session.run_compose(&frame_id, &query, None).await {
                    Ok(result) => {
                        let mut lines: Vec<String> = result
                            .prompts
                            .beats
                            .iter()
                            .map(|(beat, sections)| format!("[{}]\n{}", beat, render_json(&Value::Object(sections.clone()))))
                            .collect();
                        lines.push(render_warnings(&result.warnings));
                        lines.join("\n")
                    }
                    Err(e) => failure(&e, COMPOSE_FAILED),
                }
            }
            ShellCommand::Beat(beat) => {
                let (frame_id, query, _) = self.session_inputs().await;
                match self.session.run_beat(&beat, &frame_id, &query).await {
                    Ok(outcome) => format!("[{}]\n{}", outcome.beat, render_json(&Value::Object(outcome.prompts))),
                    Err(e) => failure(&e, BEAT_FAILED),
                }
            }
            ShellCommand::Bankset(ids) => {
                let applied = self.console.apply_bankset(ids).await;
                format!("bankset = {}", applied.join(","))
            }
            ShellCommand::Harness(None) => {
                let config = &state.config;
                format!("harness = {} ({:?})", config.harness(), config.harness_kind())
            }
            ShellCommand::Harness(Some(candidate)) => format!("harness = {}", self.console.set_harness(&candidate)),
            ShellCommand::Health => {
                let health = state.health().await;
                render_json(&serde_json::to_value(&health).unwrap_or(Value::Null))
            }
        };
        ShellReply::Output(output)
    }

    async fn session_inputs(&self) -> (String, String, u32) {
        self.session
            .inspect(|s| (s.frame_id().to_string(), s.query().to_string(), s.k()))
            .await
    }

    /// Read commands until `quit` or end of input
    pub async fn run<R, W>(&mut self, reader: R, mut writer: W) -> ConsoleResult<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut segments = reader.split(b'\n');
        loop {
            writer.write_all(PROMPT.as_bytes()).await?;
            writer.flush().await?;

            let Some(segment) = segments.next_segment().await? else {
                break;
            };
            let reply = match String::from_utf8(segment) {
                Ok(line) => self.handle_line(line.trim_end_matches('\r')).await,
                Err(e) => {
                    process_warn!(ProcessId::current(), "⚠️ Skipping unreadable input line: {}", e);
                    ShellReply::Output(INVALID_INPUT.to_string())
                }
            };
            match reply {
                ShellReply::Quit => break,
                ShellReply::Output(text) if text.is_empty() => {}
                ShellReply::Output(text) => {
                    writer.write_all(text.as_bytes()).await?;
                    writer.write_all(b"\n").await?;
                }
            }
        }
        self.session.close().await;
        Ok(())
    }
}

fn failure(error: &ConsoleError, fallback: &str) -> String {
    format!("error: {}", error.user_message(fallback))
}

fn render_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn render_warnings(warnings: &[String]) -> String {
    if warnings.is_empty() {
        String::new()
    } else {
        format!("\nwarnings: {}", warnings.join("; "))
    }
}

fn render_hits(hits: &[retrieval::HitView]) -> String {
    if hits.is_empty() {
        return "no hits".to_string();
    }
    hits.iter()
        .enumerate()
        .map(|(i, view)| {
            format!(
                "{:>2}. {}{} [{}] {:.3}",
                i + 1,
                if view.active { "*" } else { " " },
                view.hit.doc_id,
                view.hit.kind,
                view.hit.score
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!("search  a door ".parse::<ShellCommand>().unwrap(), ShellCommand::Search("a door".to_string()));
        assert_eq!("ACTIVATE 2".parse::<ShellCommand>().unwrap(), ShellCommand::Activate(2));
        assert_eq!("clear".parse::<ShellCommand>().unwrap(), ShellCommand::Clear(None));
        assert_eq!(
            "clear metaphor".parse::<ShellCommand>().unwrap(),
            ShellCommand::Clear(Some(SelectionKind::Metaphors))
        );
        assert_eq!(
            "drop schemas path".parse::<ShellCommand>().unwrap(),
            ShellCommand::Drop { kind: SelectionKind::Schemas, doc_id: "path".to_string() }
        );
        assert_eq!(
            "bankset default, noir".parse::<ShellCommand>().unwrap(),
            ShellCommand::Bankset(vec!["default".to_string(), "noir".to_string()])
        );
        assert_eq!(
            "bankset noir, ,archive,".parse::<ShellCommand>().unwrap(),
            ShellCommand::Bankset(vec!["noir".to_string(), "archive".to_string()])
        );
        assert_eq!("harness".parse::<ShellCommand>().unwrap(), ShellCommand::Harness(None));
        assert_eq!("exit".parse::<ShellCommand>().unwrap(), ShellCommand::Quit);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("search".parse::<ShellCommand>().unwrap_err().to_string(), "usage: search <query>");
        assert_eq!("k many".parse::<ShellCommand>().unwrap_err().to_string(), "usage: k <n>");
        assert!("drop schemas".parse::<ShellCommand>().is_err());
        assert!("clear widgets".parse::<ShellCommand>().is_err());
        assert!("dance".parse::<ShellCommand>().unwrap_err().to_string().starts_with("unknown command"));
    }

    #[test]
    fn test_render_hits_marks_active() {
        let hits = vec![
            retrieval::HitView { hit: RetrievalHit::new("path", "schema", 0.9), active: true },
            retrieval::HitView { hit: RetrievalHit::new("journey", "frame", 0.5), active: false },
        ];
        let rendered = render_hits(&hits);
        assert!(rendered.contains(" 1. *path [schema] 0.900"));
        assert!(rendered.contains(" 2.  journey [frame] 0.500"));
        assert_eq!(render_hits(&[]), "no hits");
    }
}
