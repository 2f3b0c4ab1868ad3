//! Transcript page rendering

use pulldown_cmark::{html, Event, Options, Parser};
use sdk::{Speaker, TranscriptEntry};

/// Render assistant markdown to HTML.
///
/// Raw HTML in the source is shown as text, never passed through.
pub fn render_markdown(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH)
        .map(|event| match event {
            Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
            other => other,
        });

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Escape text for an HTML body or attribute
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn render_entry(entry: &TranscriptEntry) -> String {
    let (class, who, body) = match entry.speaker {
        Speaker::User => ("user", "You", format!("<p>{}</p>", escape_html(&entry.text))),
        Speaker::Assistant => ("assistant", "Bakebot", render_markdown(&entry.text)),
    };

    format!(
        "<div class=\"message {class}\"><div class=\"who\">{who} <time>{time}</time></div>{body}</div>\n",
        class = class,
        who = who,
        time = entry.sent_at.format("%H:%M"),
        body = body
    )
}

/// Full chat page: transcript plus the message form
pub fn render_page(transcript: &[TranscriptEntry]) -> String {
    let messages: String = if transcript.is_empty() {
        "<p class=\"empty\">Ask for a bake or a drink to get started.</p>\n".to_string()
    } else {
        transcript.iter().map(render_entry).collect()
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Bakebot</title>
    <style>
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            max-width: 800px;
            margin: 40px auto;
            padding: 20px;
            background: #faf6f0;
        }}
        .message {{
            background: white;
            padding: 12px 18px;
            margin: 12px 0;
            border-radius: 8px;
            box-shadow: 0 1px 3px rgba(0,0,0,0.1);
        }}
        .message.user {{ border-left: 4px solid #c47f3a; }}
        .message.assistant {{ border-left: 4px solid #6b8e23; }}
        .who {{ font-weight: bold; color: #555; }}
        .who time {{ font-weight: normal; color: #999; font-size: 0.85em; }}
        .empty {{ color: #888; }}
        form {{ display: flex; gap: 8px; margin-top: 20px; }}
        input[type=text] {{ flex: 1; padding: 10px; border-radius: 6px; border: 1px solid #ccc; }}
        button {{ padding: 10px 18px; border-radius: 6px; border: none; background: #c47f3a; color: white; }}
    </style>
</head>
<body>
    <h1>Bakebot</h1>
    <div class="transcript">
{messages}    </div>
    <form action="/consume_message" method="post">
        <input type="text" name="user_message" autocomplete="off" autofocus required>
        <button type="submit">Send</button>
    </form>
</body>
</html>"#,
        messages = messages
    )
}
