//! A terminal harness that runs the full pipeline against a simulated
//! forum thread.

#[macro_use]
extern crate tracing;

use std::io::Write as _;
use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use threadbot::commands::{self, CommandReply};
use threadbot::config::BotConfig;
use threadbot::platform::{Color, Embed, InboundMessage};
use threadbot_core::{
    ChannelId, ChannelKind, ConversationStore, HeuristicTrigger, Reply,
    Responder, TriggerPolicy,
};
use threadbot_openai_completion::OpenAIProvider;
use tokio::io::{self, AsyncBufReadExt};

/// The literal token that counts as mentioning the assistant in the
/// harness.
const MENTION_TOKEN: &str = "@assistant";

/// The simulated thread every plain input line is posted in.
const THREAD_CHANNEL: ChannelId = ChannelId(100);

const BAR_CHAR: &str = "▎";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = match BotConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return;
        }
    };
    if !config.is_configured() {
        eprintln!(
            "OPENAI_API_KEY is not set; every question will get an \
             unconfigured notice"
        );
    }

    // Without a configured forum channel, simulate one so the trigger
    // policy has something to match.
    let forum_channel = if config.forum_channel() == ChannelId(0) {
        ChannelId(1)
    } else {
        config.forum_channel()
    };
    let trigger = HeuristicTrigger::new(forum_channel);

    let openai_config = config.openai_config();
    let model = openai_config.model().to_owned();
    let provider = OpenAIProvider::new(openai_config);
    let store = Arc::new(ConversationStore::new(include_str!(
        "./default_persona.md"
    )));
    let responder = Responder::new(provider, Arc::clone(&store))
        .with_mention_token(MENTION_TOKEN);

    println!(
        "{}",
        "Plain lines are posted in a simulated forum thread. Commands: \
         /ask <q>, /clear, /persona <text>, /stats, /quit."
            .dimmed()
    );

    loop {
        print!("> ");
        std::io::stdout().flush().unwrap();

        let Some(line) = read_line().await else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix('/') {
            if command == "quit" {
                break;
            }
            handle_command(command, &responder, &store, &model).await;
            continue;
        }

        let msg = InboundMessage {
            channel: THREAD_CHANNEL,
            kind: ChannelKind::Thread {
                parent: forum_channel,
            },
            content: line.to_owned(),
            author_is_bot: false,
            author_name: "you".to_owned(),
            mentions_assistant: line.contains(MENTION_TOKEN),
        };
        if !trigger.should_engage(&msg.meta()) {
            println!("{}", "(the assistant stays quiet)".dimmed());
            continue;
        }
        let Some(thread) = msg.thread() else {
            continue;
        };

        let progress_bar = spinner();
        let reply = responder.handle_message(thread, &msg.content).await;
        progress_bar.finish_and_clear();
        print_reply(reply);
    }
}

async fn handle_command(
    command: &str,
    responder: &Responder,
    store: &ConversationStore,
    model: &str,
) {
    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };

    let reply = match name {
        "ask" => {
            if arg.is_empty() {
                println!("usage: /ask <question>");
                return;
            }
            let progress_bar = spinner();
            let reply = commands::ask(responder, "you", arg).await;
            progress_bar.finish_and_clear();
            reply
        }
        "clear" => commands::clear_chat(
            store,
            Some(threadbot_core::ThreadId(THREAD_CHANNEL.0)),
        ),
        "persona" => {
            if arg.is_empty() {
                println!("usage: /persona <text>");
                return;
            }
            // The harness operator is the administrator.
            commands::set_persona(store, true, arg)
        }
        "stats" => commands::stats(store, model),
        _ => {
            println!("unknown command: /{name}");
            return;
        }
    };

    match reply {
        CommandReply::Text(messages) => {
            for message in messages {
                println!("{}{}", BAR_CHAR.bright_cyan(), message);
            }
        }
        CommandReply::Embed(embed) => print_embed(&embed),
    }
}

fn print_reply(reply: Reply) {
    match reply {
        Reply::Answer(chunks) => {
            for chunk in chunks {
                println!(
                    "{}🤖 {}",
                    BAR_CHAR.bright_cyan(),
                    chunk.bright_white()
                );
            }
        }
        Reply::Failure(notice) => {
            println!("{}{}", BAR_CHAR.bright_yellow(), notice);
        }
    }
}

fn print_embed(embed: &Embed) {
    let bar = tinted_bar(embed.color);
    println!("{bar}{}", embed.title.bright_white().bold());
    for line in embed.description.lines() {
        println!("{bar}{line}");
    }
    if let Some(footer) = &embed.footer {
        println!("{bar}{}", footer.dimmed());
    }
}

fn tinted_bar(color: Color) -> String {
    if color == Color::GREEN {
        BAR_CHAR.green().to_string()
    } else if color == Color::ORANGE {
        BAR_CHAR.yellow().to_string()
    } else {
        BAR_CHAR.bright_cyan().to_string()
    }
}

fn spinner() -> ProgressBar {
    let style = ProgressStyle::with_template("{spinner} {wide_msg}")
        .unwrap()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
    let progress_bar = ProgressBar::new_spinner();
    progress_bar.set_style(style);
    progress_bar.set_message("🤔 Thinking...");
    progress_bar.enable_steady_tick(Duration::from_millis(100));
    progress_bar
}

async fn read_line() -> Option<String> {
    let mut stdin = io::BufReader::new(io::stdin());
    let mut line = String::new();

    match stdin.read_line(&mut line).await {
        Ok(count) => {
            if count == 0 {
                return None;
            }
            Some(line)
        }
        Err(err) => {
            error!("error reading input: {}", err);
            None
        }
    }
}
