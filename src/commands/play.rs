use std::io;
use std::time::Duration;

use crate::llm;
use crate::question::Question;
use crate::session::{Phase, QuizSession};
use crate::tui::Theme;
use crate::utils::{pluralize, trim_line};

use anyhow::{Context, Result};
use async_openai::{Client, config::OpenAIConfig};
use crossterm::event::KeyModifiers;
use crossterm::{
    event::{
        self, Event, KeyCode, KeyEventKind, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    text::Line,
    widgets::{Paragraph, Wrap},
};

const FAREWELL: &str = "You have chosen to quit the quiz. Thank you for participating!";

pub async fn run(topic: Option<String>) -> Result<()> {
    // Fail fast on a missing API key, before any terminal state changes.
    let client = llm::ensure_client()?;

    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_ALL_KEYS_AS_ESCAPE_CODES
                | KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
        )
    )
    .context("failed to configure terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to start terminal")?;
    terminal.hide_cursor().context("failed to hide cursor")?;

    let result = run_session(&mut terminal, &client, topic).await;
    teardown_terminal(&mut terminal)?;

    if result.is_ok() {
        println!("{FAREWELL}");
    }
    result
}

type Tui = Terminal<CrosstermBackend<io::Stdout>>;

async fn run_session(
    terminal: &mut Tui,
    client: &Client<OpenAIConfig>,
    initial_topic: Option<String>,
) -> Result<()> {
    let mut session = QuizSession::new();
    let mut topic_input = String::new();

    if let Some(topic) = initial_topic
        && let Some(trimmed) = trim_line(&topic)
    {
        session.topic = trimmed.to_string();
        fetch_question(terminal, client, &mut session).await?;
    }

    loop {
        if session.phase == Phase::Quit {
            break Ok(());
        }

        terminal
            .draw(|frame| {
                let area = frame.area();
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(5), Constraint::Length(4)])
                    .split(area);

                let body = Paragraph::new(content_lines(&session, &topic_input))
                    .block(Theme::panel_with_line(header_line(&session)))
                    .wrap(Wrap { trim: false });
                frame.render_widget(body, chunks[0]);

                let footer = Paragraph::new(instructions_text(&session))
                    .block(Theme::panel_with_line(Theme::section_header("Controls")));
                frame.render_widget(footer, chunks[1]);
            })
            .context("failed to render frame")?;

        if event::poll(Duration::from_millis(16))?
            && let Event::Key(key) = event::read()?
        {
            if key.kind != KeyEventKind::Press {
                continue;
            }

            if key.code == KeyCode::Esc
                || (key.code == KeyCode::Char('c')
                    && key.modifiers.contains(KeyModifiers::CONTROL))
            {
                session.quit();
                continue;
            }

            match session.phase {
                Phase::AwaitingTopic => match key.code {
                    KeyCode::Enter => {
                        if let Some(topic) = trim_line(&topic_input) {
                            session.topic = topic.to_string();
                            topic_input.clear();
                            fetch_question(terminal, client, &mut session).await?;
                        }
                    }
                    KeyCode::Backspace => {
                        topic_input.pop();
                    }
                    KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                        topic_input.push(c);
                    }
                    _ => {}
                },
                Phase::QuestionDisplayed | Phase::AnsweredIncorrect => match key.code {
                    KeyCode::Up => session.select_previous(),
                    KeyCode::Down => session.select_next(),
                    KeyCode::Enter | KeyCode::Char(' ') => {
                        session.submit_answer();
                    }
                    KeyCode::Char('q') | KeyCode::Char('Q') => session.quit(),
                    KeyCode::Char('t') | KeyCode::Char('T') => session.reset_topic(),
                    _ => {}
                },
                Phase::AnsweredCorrect => match key.code {
                    KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Enter
                        if session.next_question_allowed() =>
                    {
                        fetch_question(terminal, client, &mut session).await?;
                    }
                    KeyCode::Char('t') | KeyCode::Char('T') => session.reset_topic(),
                    KeyCode::Char('q') | KeyCode::Char('Q') => session.quit(),
                    _ => {}
                },
                Phase::Quit => {}
            }
        }
    }
}

/// Draw a waiting frame, then await the fetch inline. Exactly one request is
/// outstanding at a time and no input is handled until it resolves; a failed
/// fetch propagates up and ends the session instead of leaving a stale
/// question on screen.
async fn fetch_question(
    terminal: &mut Tui,
    client: &Client<OpenAIConfig>,
    session: &mut QuizSession,
) -> Result<()> {
    let topic = session.topic.clone();
    terminal
        .draw(|frame| {
            let area = frame.area();
            let waiting = Paragraph::new(format!(
                "Generating a question on '{topic}'...\n\nPlease wait."
            ))
            .block(Theme::panel_with_line(header_line(session)))
            .wrap(Wrap { trim: false });
            frame.render_widget(waiting, area);
        })
        .context("failed to render frame")?;

    let question = llm::request_question(client, &topic).await?;
    session.show_question(question);
    Ok(())
}

fn teardown_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        PopKeyboardEnhancementFlags,
        LeaveAlternateScreen
    )
    .context("failed to restore terminal")?;
    terminal.show_cursor().context("failed to show cursor")?;
    Ok(())
}

fn header_line(session: &QuizSession) -> Line<'static> {
    let mut spans = vec![Theme::label_span(" quizzer ")];
    if !session.topic.is_empty() {
        spans.push(Theme::bullet());
        spans.push(Theme::span(session.topic.clone()));
    }
    if session.questions_served > 0 {
        spans.push(Theme::bullet());
        spans.push(Theme::span(pluralize("question", session.questions_served)));
    }
    Line::from(spans)
}

fn content_lines(session: &QuizSession, topic_input: &str) -> Vec<Line<'static>> {
    match session.phase {
        Phase::AwaitingTopic => vec![
            Line::from(Theme::span("Enter the topic for the quiz:")).style(Theme::emphasis()),
            Line::default(),
            Line::from(Theme::span(format!("> {topic_input}▌"))),
            Line::default(),
            Line::from(Theme::span("An introductory STEM question will be generated."))
                .style(Theme::dim()),
        ],
        Phase::Quit => Vec::new(),
        _ => {
            let Some(question) = &session.question else {
                return Vec::new();
            };

            let mut lines = vec![
                Line::from(Theme::span(question.text.clone())).style(Theme::emphasis()),
                Line::default(),
            ];
            lines.extend(choice_lines(question, session.selected));

            match session.phase {
                Phase::AnsweredCorrect => {
                    lines.push(Line::default());
                    lines.push(Line::from(Theme::span("Correct!")).style(Theme::success()));
                }
                Phase::AnsweredIncorrect => {
                    lines.push(Line::default());
                    lines.push(
                        Line::from(Theme::span("Incorrect. Try again.")).style(Theme::danger()),
                    );
                    lines.push(
                        Line::from(Theme::span(format!(
                            "Explanation: {}",
                            question.explanation
                        )))
                        .style(Theme::dim()),
                    );
                }
                _ => {}
            }
            lines
        }
    }
}

fn choice_lines(question: &Question, selected: usize) -> Vec<Line<'static>> {
    question
        .choices
        .iter()
        .enumerate()
        .map(|(idx, choice)| {
            if idx == selected {
                Line::from(Theme::span(format!(" (•) {choice} "))).style(Theme::selected())
            } else {
                Line::from(Theme::span(format!(" ( ) {choice} ")))
            }
        })
        .collect()
}

fn instructions_text(session: &QuizSession) -> Vec<Line<'static>> {
    let mut line = match session.phase {
        Phase::AwaitingTopic => vec![
            Theme::key_chip("Enter"),
            Theme::span(" start quiz"),
        ],
        Phase::QuestionDisplayed | Phase::AnsweredIncorrect => vec![
            Theme::key_chip("↑/↓"),
            Theme::span(" choose"),
            Theme::bullet(),
            Theme::key_chip("Enter"),
            Theme::span(" submit answer"),
            Theme::bullet(),
            Theme::key_chip("T"),
            Theme::span(" new topic"),
            Theme::bullet(),
            Theme::key_chip("Q"),
            Theme::span(" quit"),
        ],
        Phase::AnsweredCorrect => vec![
            Theme::key_chip("N"),
            Theme::span(" next question"),
            Theme::bullet(),
            Theme::key_chip("T"),
            Theme::span(" new topic"),
            Theme::bullet(),
            Theme::key_chip("Q"),
            Theme::span(" quit"),
        ],
        Phase::Quit => Vec::new(),
    };

    line.push(Theme::bullet());
    line.push(Theme::key_chip("Esc"));
    line.push(Theme::span(" / "));
    line.push(Theme::key_chip("Ctrl+C"));
    line.push(Theme::span(" exit"));

    vec![Line::from(line)]
}
