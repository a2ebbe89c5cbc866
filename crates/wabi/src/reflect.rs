// SPDX-FileCopyrightText: 2026 Wabi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `wabi reflect` command implementation.
//!
//! Interactive REPL with a colored prompt and readline history. Collects
//! the written reflection and an emotion, then alternates turns with the
//! companion until the user saves with `/save` or discards with `/quit`.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use wabi_anthropic::AnthropicAssistant;
use wabi_config::WabiConfig;
use wabi_core::error::WabiError;
use wabi_core::traits::AssistantAdapter;
use wabi_core::types::{EventId, Reflection};
use wabi_reflect::{AppState, EmotionTag, ReflectOn, SessionSettings};

/// Explicit flags win; otherwise the next unreflected event, if any.
pub fn pick_target(
    app: &AppState,
    event: Option<EventId>,
    name: Option<String>,
    today: NaiveDate,
) -> Option<ReflectOn> {
    match (event, name) {
        (Some(id), _) => Some(ReflectOn::Event(id)),
        (None, Some(name)) => Some(ReflectOn::Name(name)),
        (None, None) => app.next_event(today).map(|e| ReflectOn::Event(e.id)),
    }
}

/// Runs the `wabi reflect` REPL.
pub async fn run_reflect(
    app: &mut AppState,
    config: &WabiConfig,
    target: Option<ReflectOn>,
) -> Result<(), WabiError> {
    let assistant: Arc<dyn AssistantAdapter> = Arc::new(AnthropicAssistant::new(&config.assistant)?);

    let mut rl = DefaultEditor::new()
        .map_err(|e| WabiError::Internal(format!("failed to initialize readline: {e}")))?;

    let target = match target {
        Some(target) => target,
        None => {
            println!("No upcoming event to reflect on.");
            let Some(name) = read_line(&mut rl, "What are you reflecting on? ")? else {
                return Ok(());
            };
            ReflectOn::Name(name)
        }
    };

    let agent = config.agent.name.clone();
    let mut session = app.begin_reflection(target, assistant, SessionSettings::from_config(config))?;
    let typing = spawn_typing_indicator(session.typing(), agent.clone());

    println!(
        "{} {}",
        "Reflecting on".bold().green(),
        session.target().event_name.bold()
    );
    println!("How did it go? Write a few sentences.\n");

    let submitted = loop {
        let Some((text, emotion)) = read_reflection(&mut rl)? else {
            break false;
        };
        match session.submit(&text, Some(emotion)).await {
            Ok(reply) => {
                print_reply(&agent, &reply);
                break true;
            }
            Err(e) if e.is_validation() => eprintln!("{}", e.to_string().yellow()),
            Err(e) => {
                typing.abort();
                return Err(e);
            }
        }
    };

    if submitted {
        println!(
            "{}",
            "Keep chatting, or type /save to save your reflection (/quit to discard).".dimmed()
        );
        while let Some(line) = read_line(&mut rl, "you> ")? {
            match line.as_str() {
                "/save" => {
                    typing.abort();
                    let saved = app.finish(&mut session, Local::now()).await?;
                    print_saved(saved);
                    return Ok(());
                }
                "/quit" => break,
                _ => match session.respond(&line).await {
                    Ok(reply) => print_reply(&agent, &reply),
                    Err(e) if e.is_validation() => eprintln!("{}", e.to_string().yellow()),
                    Err(e) => {
                        typing.abort();
                        return Err(e);
                    }
                },
            }
        }
    }

    typing.abort();
    println!("{}", "Reflection discarded.".dimmed());
    Ok(())
}

/// Where the REPL reads its input from.
trait LineSource {
    /// One raw line. `None` on Ctrl+C / Ctrl+D.
    fn raw_line(&mut self, prompt: &str) -> Result<Option<String>, WabiError>;
}

impl LineSource for DefaultEditor {
    fn raw_line(&mut self, prompt: &str) -> Result<Option<String>, WabiError> {
        match self.readline(&prompt.cyan().to_string()) {
            Ok(line) => {
                let trimmed = line.trim();
                if !trimmed.is_empty() {
                    let _ = self.add_history_entry(trimmed);
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => Ok(None),
            Err(e) => Err(WabiError::Internal(format!("readline failed: {e}"))),
        }
    }
}

/// Reads one trimmed, non-empty line. `None` on Ctrl+C / Ctrl+D.
fn read_line<S: LineSource>(source: &mut S, prompt: &str) -> Result<Option<String>, WabiError> {
    while let Some(line) = source.raw_line(prompt)? {
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            return Ok(Some(trimmed.to_string()));
        }
    }
    Ok(None)
}

/// Reads the reflection text and its emotion. `None` if the user leaves
/// at either prompt.
fn read_reflection<S: LineSource>(
    source: &mut S,
) -> Result<Option<(String, EmotionTag)>, WabiError> {
    let Some(text) = read_line(source, "reflection> ")? else {
        return Ok(None);
    };
    Ok(ask_emotion(source)?.map(|emotion| (text, emotion)))
}

/// Asks until a recognizable emotion is entered. `None` on Ctrl+C / Ctrl+D.
fn ask_emotion<S: LineSource>(source: &mut S) -> Result<Option<EmotionTag>, WabiError> {
    let options: Vec<String> = EmotionTag::ALL
        .iter()
        .enumerate()
        .map(|(i, tag)| format!("{}) {tag}", i + 1))
        .collect();
    println!("How did you feel?  {}", options.join("   "));

    while let Some(answer) = read_line(source, "feeling> ")? {
        match EmotionTag::parse(&answer) {
            Some(tag) => return Ok(Some(tag)),
            None => eprintln!("{}", "Pick 1, 2 or 3.".yellow()),
        }
    }
    Ok(None)
}

/// Prints a typing notice whenever the session starts waiting on the companion.
fn spawn_typing_indicator(mut typing: watch::Receiver<bool>, agent: String) -> JoinHandle<()> {
    tokio::spawn(async move {
        while typing.changed().await.is_ok() {
            if *typing.borrow_and_update() {
                println!("{}", format!("{agent} is typing...").dimmed());
            }
        }
    })
}

fn print_reply(agent: &str, reply: &str) {
    println!("{} {reply}\n", format!("{agent}:").bold().magenta());
}

fn print_saved(reflection: &Reflection) {
    println!(
        "\n{} #{} {} {}",
        "Saved reflection".bold().green(),
        reflection.id,
        reflection.emotion,
        reflection.event_name
    );
    println!("{}", "Highlights".bold());
    for highlight in &reflection.highlights {
        println!("  • {highlight}");
    }
    println!("{} {}", "Goal for next time:".bold(), reflection.goal_for_next.green());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    use chrono::NaiveTime;
    use wabi_core::types::{Event, EventCategory, RecordSet};
    use wabi_test_utils::MemoryStore;

    /// Replays scripted lines, then behaves like Ctrl+D.
    struct Scripted(VecDeque<&'static str>);

    impl Scripted {
        fn new(lines: &[&'static str]) -> Self {
            Self(lines.iter().copied().collect())
        }
    }

    impl LineSource for Scripted {
        fn raw_line(&mut self, _prompt: &str) -> Result<Option<String>, WabiError> {
            Ok(self.0.pop_front().map(str::to_string))
        }
    }

    fn event(id: u64, date: NaiveDate) -> Event {
        Event {
            id: EventId(id),
            name: format!("Event {id}"),
            date,
            time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            category: EventCategory::Social,
            location: None,
            goal: None,
            type_color: EventCategory::Social.color().into(),
        }
    }

    async fn app_with(events: Vec<Event>, completed: Vec<EventId>) -> AppState {
        let records = RecordSet {
            events,
            completed_event_ids: completed,
            ..RecordSet::default()
        };
        AppState::load(Arc::new(MemoryStore::with_records(records)))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn explicit_flags_win() {
        let today = NaiveDate::from_ymd_opt(2026, 6, 3).unwrap();
        let app = app_with(vec![event(1, today)], vec![]).await;

        assert_eq!(
            pick_target(&app, Some(EventId(7)), None, today),
            Some(ReflectOn::Event(EventId(7)))
        );
        assert_eq!(
            pick_target(&app, None, Some("Coffee chat".into()), today),
            Some(ReflectOn::Name("Coffee chat".into()))
        );
    }

    #[tokio::test]
    async fn defaults_to_next_unreflected_event() {
        let today = NaiveDate::from_ymd_opt(2026, 6, 3).unwrap();
        let app = app_with(vec![event(1, today), event(2, today)], vec![EventId(1)]).await;
        assert_eq!(
            pick_target(&app, None, None, today),
            Some(ReflectOn::Event(EventId(2)))
        );

        let app = app_with(vec![event(1, today)], vec![EventId(1)]).await;
        assert_eq!(pick_target(&app, None, None, today), None);
    }

    #[test]
    fn reflection_and_emotion_are_read_together() {
        let mut source = Scripted::new(&["  ", "I stayed for an hour. ", "maybe", "3"]);
        let read = read_reflection(&mut source).unwrap();
        assert_eq!(
            read,
            Some(("I stayed for an hour.".to_string(), EmotionTag::Positive))
        );
    }

    #[test]
    fn leaving_at_feeling_prompt_ends_the_reflection() {
        let mut source = Scripted::new(&["I stayed for an hour.", "not sure"]);
        assert_eq!(read_reflection(&mut source).unwrap(), None);
        assert!(source.0.is_empty());
    }

    #[test]
    fn leaving_at_reflection_prompt_ends_the_reflection() {
        let mut source = Scripted::new(&[]);
        assert_eq!(read_reflection(&mut source).unwrap(), None);
    }
}
