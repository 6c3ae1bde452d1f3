use std::io::{self, Write};

use agent_chat::chat_mock::multi_agent_demo;
use agent_chat::chat_types::ToolCall;
use agent_chat::templates::ALL_CATEGORY;
use agent_chat::{
    build_timeline, categories, find_template, message_timeline, templates_in, ChatSession,
    ReplyUpdate, StreamReducer, TimelineItem,
};

use crate::commands::{parse_slash_command, SlashCommand, HELP_TEXT};

/// Line-oriented front end over one [`ChatSession`].
pub struct ChatCli {
    session: ChatSession,
    should_exit: bool,
}

impl ChatCli {
    pub fn new(session: ChatSession) -> Self {
        Self {
            session,
            should_exit: false,
        }
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    pub fn should_exit(&self) -> bool {
        self.should_exit
    }

    pub async fn handle_input<W: Write>(&mut self, input: &str, out: &mut W) -> io::Result<()> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(());
        }

        let Some(command) = parse_slash_command(input) else {
            return self.send(input, out).await;
        };

        match command {
            SlashCommand::Help => writeln!(out, "{HELP_TEXT}"),
            SlashCommand::New(title) => {
                let id = self
                    .session
                    .store()
                    .create_thread(title.as_deref());
                writeln!(out, "Started thread {id}")
            }
            SlashCommand::Threads => self.list_threads(out),
            SlashCommand::Select(id) => {
                let found = self.session.store().with(|store| {
                    store.select_thread(&id);
                    store.current_thread_id() == Some(id.as_str())
                });
                if found {
                    writeln!(out, "Switched to {id}")
                } else {
                    writeln!(out, "No thread {id}")
                }
            }
            SlashCommand::Delete(id) => {
                let found = self.session.store().with(|store| {
                    let exists = store.thread(&id).is_some();
                    store.delete_thread(&id);
                    exists
                });
                if found {
                    writeln!(out, "Deleted {id}")
                } else {
                    writeln!(out, "No thread {id}")
                }
            }
            SlashCommand::Clear => {
                self.session.store().with(|store| store.clear_all_threads());
                writeln!(out, "All threads deleted")
            }
            SlashCommand::Templates(category) => {
                list_templates(category.as_deref().unwrap_or(ALL_CATEGORY), out)
            }
            SlashCommand::Use(id) => match find_template(&id) {
                Some(template) => self.send(template.prompt, out).await,
                None => writeln!(out, "No template {id}"),
            },
            SlashCommand::Demo => {
                let mut reducer = StreamReducer::new();
                for event in multi_agent_demo() {
                    reducer.apply(event);
                }
                write_timeline(&build_timeline(reducer.agent_blocks(), reducer.tool_calls()), out)
            }
            SlashCommand::Quit => {
                self.should_exit = true;
                Ok(())
            }
            SlashCommand::MissingArgument(command) => {
                writeln!(out, "{command} needs an argument (try /help)")
            }
            SlashCommand::Unknown(command) => {
                writeln!(out, "Unknown command: {command} (try /help)")
            }
        }
    }

    /// Sends `text` and prints the reply while it streams, followed by the
    /// tool calls it made.
    async fn send<W: Write>(&mut self, text: &str, out: &mut W) -> io::Result<()> {
        let current = self
            .session
            .store()
            .with(|store| store.current_thread_id().map(ToOwned::to_owned));

        let mut printer = StreamPrinter::default();
        let outcome = self
            .session
            .send_message_observed(current.as_deref(), text, Vec::new(), None, |update| {
                printer.observe(update, &mut *out)
            })
            .await;
        printer.finish(&mut *out)?;

        if outcome.cancelled {
            return writeln!(out, "(cancelled)");
        }
        let timeline = self
            .session
            .store()
            .message(&outcome.thread_id, &outcome.assistant_message_id)
            .map(|message| message_timeline(&message))
            .unwrap_or_default();
        for item in &timeline {
            if let TimelineItem::ToolGroup(calls) = item {
                for call in calls {
                    writeln!(out, "  {}", describe_tool_call(call))?;
                }
            }
        }
        Ok(())
    }

    fn list_threads<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let rows: Vec<String> = self.session.store().with(|store| {
            let current = store.current_thread_id();
            store
                .threads()
                .iter()
                .map(|thread| {
                    let marker = if Some(thread.id.as_str()) == current { '*' } else { ' ' };
                    format!(
                        "{marker} {}  {} ({} messages)",
                        thread.id,
                        thread.title,
                        thread.messages.len()
                    )
                })
                .collect()
        });

        if rows.is_empty() {
            return writeln!(out, "No threads");
        }
        for row in rows {
            writeln!(out, "{row}")?;
        }
        Ok(())
    }
}

fn list_templates<W: Write>(category: &str, out: &mut W) -> io::Result<()> {
    if !categories().iter().any(|known| *known == category) {
        return writeln!(out, "Unknown category {category}; one of {}", categories().join(", "));
    }
    let templates = templates_in(category);
    if templates.is_empty() {
        return writeln!(out, "No templates in {category}");
    }
    for template in templates {
        writeln!(out, "{}  {}: {}", template.id, template.title, template.description)?;
    }
    Ok(())
}

/// Writes reply text as deltas of the accumulated content. The first write
/// error is kept and reported once the send completes.
#[derive(Debug, Default)]
struct StreamPrinter {
    printed: String,
    error: Option<io::Error>,
}

impl StreamPrinter {
    fn observe<W: Write>(&mut self, update: ReplyUpdate<'_>, out: &mut W) {
        if self.error.is_some() {
            return;
        }
        if let Err(error) = self.write_update(update, out) {
            self.error = Some(error);
        }
    }

    fn write_update<W: Write>(&mut self, update: ReplyUpdate<'_>, out: &mut W) -> io::Result<()> {
        match update {
            ReplyUpdate::Fallback { reason } => {
                self.end_line(out)?;
                writeln!(out, "(backend unavailable: {reason}; showing demo reply)")
            }
            ReplyUpdate::Patch(patch) => {
                let Some(content) = patch.content.as_deref() else {
                    return Ok(());
                };
                match content.strip_prefix(self.printed.as_str()) {
                    Some(delta) => write!(out, "{delta}")?,
                    None => {
                        self.end_line(out)?;
                        write!(out, "{content}")?;
                    }
                }
                self.printed = content.to_string();
                out.flush()
            }
        }
    }

    fn end_line<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        if self.printed.is_empty() {
            return Ok(());
        }
        self.printed.clear();
        writeln!(out)
    }

    fn finish<W: Write>(mut self, out: &mut W) -> io::Result<()> {
        if let Some(error) = self.error.take() {
            return Err(error);
        }
        self.end_line(out)
    }
}

fn write_timeline<W: Write>(timeline: &[TimelineItem], out: &mut W) -> io::Result<()> {
    for item in timeline {
        match item {
            TimelineItem::Agent(block) => writeln!(out, "[{}] {}", block.agent_name, block.content)?,
            TimelineItem::ToolGroup(calls) => {
                for call in calls {
                    writeln!(out, "  {}", describe_tool_call(call))?;
                }
            }
        }
    }
    Ok(())
}

fn describe_tool_call(call: &ToolCall) -> String {
    format!("tool {} ({})", call.name, call.status.as_str())
}
