use indoc::formatdoc;

/// Prompt asking for a reply draft to one archived email.
pub fn reply_prompt(subject: &str, snippet: &str) -> String {
    formatdoc! {r#"
        You are an assistant drafting replies to emails on behalf of their recipient.
        Write a short, polite reply to the email below. Respond with the reply text only.

        Subject: {subject}
        Email: {snippet}

        Reply:"#,
    subject = subject.trim(),
    snippet = snippet.trim()}
}
