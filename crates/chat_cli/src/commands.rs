#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Help,
    New(Option<String>),
    Threads,
    Select(String),
    Delete(String),
    Clear,
    Templates(Option<String>),
    Use(String),
    Demo,
    Quit,
    /// Known command given without its required argument.
    MissingArgument(&'static str),
    Unknown(String),
}

pub const HELP_TEXT: &str = "Commands:
  /help                 show this help
  /new [title]          start a new thread
  /threads              list threads
  /select <id>          switch to a thread
  /delete <id>          delete a thread
  /clear                delete every thread
  /templates [category] list prompt templates
  /use <template-id>    send a template prompt
  /demo                 replay the multi-agent demo
  /quit                 exit
Anything else is sent as a message.";

pub fn parse_slash_command(input: &str) -> Option<SlashCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let (command, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (trimmed, ""),
    };
    let argument = (!rest.is_empty()).then(|| rest.to_string());

    let parsed = match command {
        "/help" => SlashCommand::Help,
        "/new" => SlashCommand::New(argument),
        "/threads" => SlashCommand::Threads,
        "/select" => argument.map_or(SlashCommand::MissingArgument("/select"), SlashCommand::Select),
        "/delete" => argument.map_or(SlashCommand::MissingArgument("/delete"), SlashCommand::Delete),
        "/clear" => SlashCommand::Clear,
        "/templates" => SlashCommand::Templates(argument),
        "/use" => argument.map_or(SlashCommand::MissingArgument("/use"), SlashCommand::Use),
        "/demo" => SlashCommand::Demo,
        "/quit" | "/exit" => SlashCommand::Quit,
        _ => SlashCommand::Unknown(command.to_string()),
    };

    Some(parsed)
}
