//! Decode one payload and describe it

use crate::cli::Target;
use anyhow::Result;
use tgwire_codec::{Codec, Decoded, Diagnostic, PathSegment, WireEntity};
use tgwire_types::{Chat, Message, Update, User, WebhookInfo};

/// Summary of one decoded record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub summary: String,
    /// Diagnostics raised while decoding this record
    pub diagnostics: usize,
}

/// What to print for one payload
#[derive(Debug, Default)]
pub struct Report {
    /// One line per decoded record
    pub lines: Vec<Line>,
    /// Re-encoded JSON, one entry per record
    pub reencoded: Vec<String>,
}

impl Report {
    pub fn diagnostics(&self) -> usize {
        self.lines.iter().map(|line| line.diagnostics).sum()
    }
}

/// Output switches
#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    pub reencode: bool,
    pub pretty: bool,
}

pub fn inspect(codec: &Codec, target: Target, bytes: &[u8], options: Options) -> Result<Report> {
    match target {
        Target::Update => single(codec, codec.decode_update(bytes)?, options, describe_update),
        Target::Updates => {
            let decoded = codec.decode_updates(bytes)?;
            let mut report = Report::default();
            for (index, update) in decoded.value.iter().enumerate() {
                report.lines.push(Line {
                    summary: describe_update(update),
                    diagnostics: count_at(&decoded.diagnostics, index),
                });
                if options.reencode {
                    report.reencoded.push(render(codec, update, options.pretty)?);
                }
            }
            Ok(report)
        }
        Target::Message => single(codec, codec.decode_message(bytes)?, options, describe_message),
        Target::Chat => single(codec, codec.decode_chat(bytes)?, options, describe_chat),
        Target::WebhookInfo => single(
            codec,
            codec.decode_webhook_info(bytes)?,
            options,
            describe_webhook_info,
        ),
        Target::User => single(codec, codec.decode_user(bytes)?, options, describe_user),
    }
}

fn single<T: WireEntity>(
    codec: &Codec,
    decoded: Decoded<T>,
    options: Options,
    describe: fn(&T) -> String,
) -> Result<Report> {
    let mut report = Report {
        lines: vec![Line {
            summary: describe(&decoded.value),
            diagnostics: decoded.diagnostics.len(),
        }],
        ..Report::default()
    };
    if options.reencode {
        report
            .reencoded
            .push(render(codec, &decoded.value, options.pretty)?);
    }
    Ok(report)
}

/// Diagnostics whose path starts at `[index]` of a batch
fn count_at(diagnostics: &[Diagnostic], index: usize) -> usize {
    diagnostics
        .iter()
        .filter(|d| d.path().segments().first() == Some(&PathSegment::Index(index)))
        .count()
}

fn render<T: WireEntity>(codec: &Codec, value: &T, pretty: bool) -> Result<String> {
    let bytes = codec.encode(value)?;
    if pretty {
        let json: serde_json::Value = serde_json::from_slice(&bytes)?;
        Ok(serde_json::to_string_pretty(&json)?)
    } else {
        Ok(String::from_utf8(bytes)?)
    }
}

fn describe_update(update: &Update) -> String {
    let kind = update.kind_name().unwrap_or("<unknown>");
    match update.message() {
        Some(message) => format!(
            "update {} {kind}: {}",
            update.update_id,
            describe_message(message)
        ),
        None => format!("update {} {kind}", update.update_id),
    }
}

fn describe_message(message: &Message) -> String {
    let mut line = format!(
        "message {} in {} {} {}",
        message.message_id,
        message.chat.chat_type,
        message.chat.id,
        message.content_field().unwrap_or("<unknown>")
    );
    if let Some(date) = message.date_time() {
        line.push_str(&format!(" at {}", date.to_rfc3339()));
    }
    if let Some(from) = &message.from {
        line.push_str(&format!(" from {}", from.full_name()));
    }
    line
}

fn describe_chat(chat: &Chat) -> String {
    format!(
        "chat {} {} {}",
        chat.id,
        chat.chat_type,
        chat.display_name().unwrap_or_default()
    )
    .trim_end()
    .to_string()
}

fn describe_webhook_info(info: &WebhookInfo) -> String {
    let mut line = if info.is_set() {
        format!("webhook {} pending={}", info.url, info.pending_update_count)
    } else {
        format!("webhook <not set> pending={}", info.pending_update_count)
    };
    if let (Some(at), Some(message)) = (info.last_error_at(), &info.last_error_message) {
        line.push_str(&format!(" last_error=\"{message}\" at {}", at.to_rfc3339()));
    }
    line
}

fn describe_user(user: &User) -> String {
    let bot = if user.is_bot { " (bot)" } else { "" };
    match &user.username {
        Some(username) => format!("user {} {} @{username}{bot}", user.id, user.full_name()),
        None => format!("user {} {}{bot}", user.id, user.full_name()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tgwire_codec::CodecConfig;

    const UPDATE: &[u8] = br#"{
        "update_id": 10,
        "message": {
            "message_id": 3,
            "date": 0,
            "chat": { "id": 42, "type": "private", "first_name": "Ada" },
            "from": { "id": 42, "is_bot": false, "first_name": "Ada", "last_name": "L" },
            "text": "hi"
        }
    }"#;

    #[test]
    fn test_update_summary() {
        let report = inspect(&Codec::default(), Target::Update, UPDATE, Options::default()).unwrap();
        assert_eq!(
            report.lines,
            vec![Line {
                summary: "update 10 message: message 3 in private 42 text at 1970-01-01T00:00:00+00:00 from Ada L".to_string(),
                diagnostics: 0,
            }]
        );
        assert_eq!(report.diagnostics(), 0);
        assert!(report.reencoded.is_empty());
    }

    #[test]
    fn test_reencode_updates() {
        let options = Options {
            reencode: true,
            pretty: false,
        };
        let payload = br#"[{"update_id": 1}, {"update_id": 2, "poll": {"id": "p"}}]"#;
        let report = inspect(&Codec::default(), Target::Updates, payload, options).unwrap();
        let summaries: Vec<&str> = report.lines.iter().map(|l| l.summary.as_str()).collect();
        assert_eq!(summaries, vec!["update 1 <unknown>", "update 2 poll"]);
        assert_eq!(report.diagnostics(), 1);
        assert_eq!(
            report.reencoded,
            vec![r#"{"update_id":1}"#, r#"{"update_id":2,"poll":{"id":"p"}}"#]
        );
    }

    #[test]
    fn test_strict_failure_surfaces() {
        let payload = br#"{"message_id": 1, "date": 0, "chat": {"id": 1, "type": "group"},
            "text": "a", "new_chat_title": "b"}"#;
        let strict = Codec::new(CodecConfig::strict());
        assert!(inspect(&strict, Target::Message, payload, Options::default()).is_err());
        assert!(inspect(&Codec::default(), Target::Message, payload, Options::default()).is_ok());
    }

    #[test]
    fn test_webhook_info_summary() {
        let payload = br#"{"url": "", "has_custom_certificate": false, "pending_update_count": 4}"#;
        let report =
            inspect(&Codec::default(), Target::WebhookInfo, payload, Options::default()).unwrap();
        assert_eq!(report.lines[0].summary, "webhook <not set> pending=4");
    }

    #[test]
    fn test_user_summary() {
        let payload = br#"{"id": 5, "is_bot": true, "first_name": "Helper", "username": "helper_bot"}"#;
        let report = inspect(&Codec::default(), Target::User, payload, Options::default()).unwrap();
        assert_eq!(report.lines[0].summary, "user 5 Helper @helper_bot (bot)");
    }

    #[test]
    fn test_batch_diagnostics_are_counted_per_update() {
        let payload = br#"[
            {"update_id": 1, "poll": {"id": "p"}},
            {"update_id": 2},
            {"update_id": 3, "message": {"message_id": 1, "date": 0,
                "chat": {"id": 1, "type": "group"}, "text": "a", "new_chat_title": "b"}}
        ]"#;
        let report = inspect(&Codec::default(), Target::Updates, payload, Options::default()).unwrap();
        let counts: Vec<usize> = report.lines.iter().map(|l| l.diagnostics).collect();
        assert_eq!(counts, vec![0, 1, 1]);
        assert_eq!(report.diagnostics(), 2);
    }
}
