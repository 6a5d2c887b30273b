//! Interactive shell tests over in-memory input

use serde_json::json;
use tokio::io::BufReader;

use shared::SelectionKind;
use sv_console::shell::INVALID_INPUT;
use sv_console::{Shell, ShellCommand, ShellReply};

mod common;
use common::{ConsoleBuilder, TestFixtures, TestHelpers};

#[tokio::test]
async fn test_search_then_activate_by_position() {
    let console = ConsoleBuilder::new()
        .with_api(|api| {
            api.expect_search()
                .times(1)
                .returning(|_| Ok(TestFixtures::search_result()));
        })
        .build();
    let selections = console.state().selections.clone();
    let mut shell = Shell::new(console);

    let ShellReply::Output(listing) = shell.handle_line("search a door of light").await else {
        panic!("search should not quit");
    };
    assert!(listing.contains(" 1.  path [schema]"));

    assert_eq!(
        shell.handle_line("activate 2").await,
        ShellReply::Output("activated time_is_motion (metaphors)".to_string())
    );
    assert_eq!(
        shell.handle_line("activate 9").await,
        ShellReply::Output("error: no hit #9 in the last search".to_string())
    );
    assert!(selections.contains(SelectionKind::Metaphors, "time_is_motion"));

    shell.execute(ShellCommand::Drop { kind: SelectionKind::Metaphors, doc_id: "time_is_motion".to_string() }).await;
    assert!(selections.is_empty());
}

#[tokio::test]
async fn test_scripted_session_runs_the_workflow() {
    let console = ConsoleBuilder::new()
        .with_api(|api| *api = TestHelpers::happy_path_api())
        .build();
    let mut shell = Shell::new(console);

    let script = format!(
        "frame {}\nquery {}\n\nplan\ncompose\nbeat hook\nquit\nsearch never reached\n",
        TestFixtures::FRAME_ID,
        TestFixtures::QUERY
    );
    let mut output = Vec::new();
    shell.run(BufReader::new(script.as_bytes()), &mut output).await.unwrap();
    let output = String::from_utf8(output).unwrap();

    assert!(output.contains("frame = journey"));
    assert!(output.contains("plan: hook, setup"));
    assert!(output.contains("[setup]"));
    assert!(output.contains("warnings: gate list empty"));
    assert!(output.contains("The light narrows."));
    assert!(shell.session().inspect(|state| state.is_closed()).await);
}

#[tokio::test]
async fn test_errors_are_reported_inline() {
    let console = ConsoleBuilder::new()
        .with_api(|api| {
            api.expect_compose_beat().times(0);
        })
        .build();
    let mut shell = Shell::new(console);

    assert_eq!(
        shell.handle_line("beat hook").await,
        ShellReply::Output("error: Frame ID and query are required".to_string())
    );
    assert_eq!(
        shell.handle_line("teleport").await,
        ShellReply::Output("error: unknown command: teleport (try help)".to_string())
    );
    assert_eq!(shell.handle_line("quit").await, ShellReply::Quit);
}

#[tokio::test]
async fn test_harness_and_bankset_commands() {
    let console = ConsoleBuilder::new().build();
    let config = console.state().config.clone();
    let mut shell = Shell::new(console);

    assert_eq!(
        shell.handle_line("harness OpenAI").await,
        ShellReply::Output("harness = openai".to_string())
    );
    assert_eq!(
        shell.handle_line("bankset noir,archive").await,
        ShellReply::Output("bankset = noir,archive".to_string())
    );
    assert_eq!(config.bankset(), vec!["noir", "archive"]);

    let ShellReply::Output(active) = shell.handle_line("active").await else {
        panic!("active should not quit");
    };
    let payload: serde_json::Value = serde_json::from_str(&active).unwrap();
    assert_eq!(payload["schemas"], json!([]));
}

#[tokio::test]
async fn test_unreadable_line_does_not_end_the_session() {
    let console = ConsoleBuilder::new().build();
    let mut shell = Shell::new(console);

    let script: &[u8] = b"\xff\xfe hook\r\nframe journey\r\nquit\n";
    let mut output = Vec::new();
    shell.run(BufReader::new(script), &mut output).await.unwrap();
    let output = String::from_utf8(output).unwrap();

    assert!(output.contains(INVALID_INPUT));
    assert!(output.contains("frame = journey"));
    assert_eq!(shell.session().inspect(|state| state.frame_id().to_string()).await, "journey");
}
