use std::fmt::Write;

use chatweave_types::{Message, Thread, User, UserInformation};

fn author(message: &Message) -> String {
    let name = format!("{} {}", message.first_name, message.last_name);
    let name = name.trim();
    if name.is_empty() {
        message.display_name()
    } else {
        name.to_string()
    }
}

/// Numbered "1. Name: text" lines
pub fn transcript(messages: &[Message]) -> String {
    let mut out = String::new();
    for (i, message) in messages.iter().enumerate() {
        let _ = writeln!(out, "{}. {}: {}", i + 1, author(message), message.text);
    }
    out
}

pub fn thread_classification_prompt(
    message: &Message,
    threads: &[Thread],
    max_theme_chars: usize,
) -> String {
    let mut sb = String::new();
    sb.push_str(
        "You sort group chat messages into discussion threads. Decide whether the new \
         message continues one of the existing threads.\n\n",
    );
    let _ = writeln!(sb, "New message from {}:", author(message));
    let _ = writeln!(sb, "{}\n", message.text);

    sb.push_str("Existing threads:\n");
    for thread in threads {
        let _ = writeln!(sb, "- id: {}", thread.id);
        let _ = writeln!(sb, "  theme: {}", thread.theme);
        let _ = writeln!(sb, "  summary: {}", thread.summary);
    }

    sb.push_str(
        "\nFor every thread give a match probability between 0.0 and 1.0 and a short reason. \
         Use the exact thread ids above.\n",
    );
    let _ = writeln!(
        sb,
        "If no thread fits, suggest a theme for a new thread (at most {} characters) with \
         your confidence that it is a new topic.",
        max_theme_chars
    );
    sb
}

pub fn thread_summary_prompt(messages: &[Message], max_theme_chars: usize) -> String {
    let mut sb = String::from(
        "Summarize this discussion thread from a group chat.\n\nMessages:\n",
    );
    sb.push_str(&transcript(messages));
    let _ = write!(
        sb,
        "\nReturn a theme of 5-10 words (at most {} characters) and a summary of 2-3 sentences.",
        max_theme_chars
    );
    sb
}

pub fn response_analysis_prompt(
    thread: &Thread,
    recent: &[Message],
    message: &Message,
    strategy_names: &[String],
) -> String {
    let mut sb = String::from(
        "You are an assistant in a group chat. Decide whether the bot should reply to the \
         newest message.\n\n",
    );
    let _ = writeln!(sb, "Thread theme: {}", thread.theme);
    let _ = writeln!(sb, "Thread summary: {}\n", thread.summary);
    sb.push_str("Recent messages:\n");
    sb.push_str(&transcript(recent));
    let _ = writeln!(sb, "\nNewest message from {}: {}\n", author(message), message.text);

    sb.push_str(
        "Reply only when it adds value: a direct question, a self-introduction, a doubtful \
         claim, a decision or a commitment worth recording. Otherwise stay silent.\n",
    );
    let _ = writeln!(
        sb,
        "If you reply, suggest the best fitting strategy from: {}.",
        strategy_names.join(", ")
    );
    sb
}

pub fn general_response_prompt(thread: &Thread, recent: &[Message], message: &Message) -> String {
    let mut sb = String::from("Write a helpful reply for a group chat.\n\n");
    let _ = writeln!(sb, "Thread: {}\n", thread.theme);
    sb.push_str("Discussion:\n");
    sb.push_str(&transcript(recent));
    let _ = writeln!(sb, "\n{}: {}\n", author(message), message.text);
    sb.push_str("Keep it short, friendly and to the point.");
    sb
}

pub fn user_information_prompt(message: &Message) -> String {
    let mut sb = String::from(
        "Extract what this person says about themselves.\n\
         Only use explicitly stated facts. The bio is at most two sentences. Interests are \
         topics they follow or study, hobbies are things they do in their free time. Leave \
         fields empty when nothing is mentioned.\n\n",
    );
    let _ = writeln!(sb, "Message from {}:", author(message));
    let _ = writeln!(sb, "\"{}\"", message.text);
    sb
}

pub fn introduction_confirmation_prompt(message: &Message, info: &UserInformation) -> String {
    let mut sb = String::from(
        "Write a warm welcome for someone who just introduced themselves in a group chat.\n\n",
    );
    let _ = writeln!(sb, "Name: {}", author(message));
    let _ = writeln!(sb, "Their message: \"{}\"", message.text);
    if !info.bio.is_empty() {
        let _ = writeln!(sb, "Bio: {}", info.bio);
    }
    if !info.interests.is_empty() {
        let _ = writeln!(sb, "Interests: {}", info.interests.join(", "));
    }
    if !info.hobbies.is_empty() {
        let _ = writeln!(sb, "Hobbies: {}", info.hobbies.join(", "));
    }
    sb.push_str(
        "\nMention something specific they shared and address them by first name. \
         At most 300 characters.",
    );
    sb
}

pub fn fact_check_needed_prompt(message: &Message) -> String {
    format!(
        "Does this message contain a factual claim that is worth verifying?\n\n\"{}\"",
        message.text
    )
}

pub fn fact_check_prompt(recent: &[Message], message: &Message) -> String {
    let mut sb = String::from("Fact-check the claim in the newest message.\n\nContext:\n");
    sb.push_str(&transcript(recent));
    let _ = writeln!(sb, "\nClaim by {}: {}\n", author(message), message.text);
    sb.push_str(
        "State whether it is accurate, how confident you are, a short explanation and any \
         useful additional information.",
    );
    sb
}

pub fn agreements_prompt(recent: &[Message], message: &Message) -> String {
    let mut sb = String::from(
        "List the agreements or decisions the participants reached in this conversation.\n\n",
    );
    sb.push_str(&transcript(recent));
    let _ = writeln!(sb, "{}: {}\n", author(message), message.text);
    sb.push_str("For each: topic, what was decided, who agreed, and your confidence.");
    sb
}

pub fn reminders_prompt(recent: &[Message], message: &Message) -> String {
    let mut sb = String::from(
        "List the commitments, tasks and deadlines mentioned in this conversation.\n\n",
    );
    sb.push_str(&transcript(recent));
    let _ = writeln!(sb, "{}: {}\n", author(message), message.text);
    sb.push_str("For each: who, what, when (as written), and priority (high, medium or low).");
    sb
}

pub fn assessment_needed_prompt(recent: &[Message], message: &Message) -> String {
    let mut sb = String::from(
        "The bot asked this user a question earlier. Is the newest message an answer that \
         deserves feedback?\n\nConversation:\n",
    );
    sb.push_str(&conversation(recent));
    let _ = writeln!(sb, "User: {}", message.text);
    sb
}

pub fn assessment_prompt(recent: &[Message], message: &Message) -> String {
    let mut sb = String::from(
        "Assess the user's answer to the bot's question. Give a score from 0 to 10, short \
         constructive feedback and, if useful, one follow-up question.\n\nConversation:\n",
    );
    sb.push_str(&conversation(recent));
    let _ = writeln!(sb, "User: {}", message.text);
    sb
}

/// "User:"/"Bot:" labelled lines
fn conversation(messages: &[Message]) -> String {
    let mut out = String::new();
    for message in messages {
        let speaker = if message.is_bot { "Bot" } else { "User" };
        let _ = writeln!(out, "{}: {}", speaker, message.text);
    }
    out
}

pub fn user_question_prompt(user: Option<&User>, profile_summary: &str) -> String {
    let name = user
        .map(|u| u.first_name.clone())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "this member".to_string());
    let mut sb = String::new();
    let _ = writeln!(
        sb,
        "Write one friendly, open question for {} to get the group talking.",
        name
    );
    if !profile_summary.is_empty() {
        let _ = writeln!(sb, "What we know about them: {}", profile_summary);
        sb.push_str("Tie the question to their interests or hobbies.\n");
    }
    sb.push_str("Address them by name. One or two sentences, no preamble.");
    sb
}
